//! Physical table names and the fixed join chain every aggregation starts from.
//!
//! Fragments never see physical table names. They reference the fixed
//! aliases in [`alias`], which the base chain binds:
//!
//! ```text
//! codings_values  AS T_codings_values
//!   ⋈ codings        AS T_codings         (coding_id = coding_id)
//!   ⋈ coded_articles AS T_coded_articles  (coded_article_id = id)
//!   ⋈ articles       AS T_articles        (article_id = article_id)
//! ```

use serde::{Deserialize, Serialize};

use crate::model::Entity;
use crate::sql::{table_col, ExprExt, Join, TableRef};

/// Aliases bound by the base join chain.
pub mod alias {
    pub const CODING_VALUES: &str = "T_codings_values";
    pub const CODINGS: &str = "T_codings";
    pub const CODED_ARTICLES: &str = "T_coded_articles";
    pub const ARTICLES: &str = "T_articles";
}

/// Column names of the coding schema.
pub mod column {
    pub const CODING_ID: &str = "coding_id";
    pub const CODED_ARTICLE_ID: &str = "coded_article_id";
    pub const ID: &str = "id";
    pub const ARTICLE_ID: &str = "article_id";
    pub const CODINGJOB_ID: &str = "codingjob_id";
    pub const FIELD_ID: &str = "field_id";
    pub const INTVAL: &str = "intval";
    pub const DATE: &str = "date";
}

/// Physical table names, configurable per deployment.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Schema {
    pub coding_values: String,
    pub codings: String,
    pub coded_articles: String,
    pub articles: String,
    pub media: String,
}

impl Default for Schema {
    fn default() -> Self {
        Self {
            coding_values: "codings_values".to_string(),
            codings: "codings".to_string(),
            coded_articles: "coded_articles".to_string(),
            articles: "articles".to_string(),
            media: "media".to_string(),
        }
    }
}

impl Schema {
    /// The FROM table: coding values under its fixed alias.
    pub fn base_table(&self) -> TableRef {
        TableRef::new(&self.coding_values).with_alias(alias::CODING_VALUES)
    }

    /// coding values → codings → coded articles → articles.
    pub fn base_joins(&self) -> Vec<Join> {
        vec![
            Join::inner(
                TableRef::new(&self.codings).with_alias(alias::CODINGS),
                table_col(alias::CODING_VALUES, column::CODING_ID)
                    .eq(table_col(alias::CODINGS, column::CODING_ID)),
            ),
            Join::inner(
                TableRef::new(&self.coded_articles).with_alias(alias::CODED_ARTICLES),
                table_col(alias::CODINGS, column::CODED_ARTICLE_ID)
                    .eq(table_col(alias::CODED_ARTICLES, column::ID)),
            ),
            Join::inner(
                TableRef::new(&self.articles).with_alias(alias::ARTICLES),
                table_col(alias::CODED_ARTICLES, column::ARTICLE_ID)
                    .eq(table_col(alias::ARTICLES, column::ARTICLE_ID)),
            ),
        ]
    }

    /// Table holding rows of `entity`.
    pub fn entity_table(&self, entity: Entity) -> &str {
        match entity {
            Entity::Medium => &self.media,
        }
    }
}

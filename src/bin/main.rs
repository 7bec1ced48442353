//! Tally CLI - run aggregations over coded articles
//!
//! Usage:
//!   tally sql --category <spec>... --value <spec>... --codings <ids> [--dialect <dialect>]
//!   tally run --db <file> --category <spec>... --value <spec>... (--codings <ids> | --articles <ids> --jobs <ids>)
//!
//! Category specs: `interval:<granularity>`, `medium`, `field:<id>`.
//! Value specs: `count`, `avg:<id>`.
//!
//! Examples:
//!   tally sql --category medium --value count --codings 1,2,3
//!   tally run --db codings.db --category interval:month --value avg:7 --articles 10,11 --jobs 2 --flat

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use tally::aggregate::{Aggregator, Category, CodingSelection, Value};
use tally::backend::SqliteBackend;
use tally::config::Settings;
use tally::sql::{Dialect, SqlDialect};

#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Tally - dynamic aggregation queries over coded articles")]
#[command(version)]
struct Cli {
    /// Config file (defaults to TALLY_CONFIG, ./tally.toml, then the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the SQL an aggregation compiles to
    Sql {
        #[command(flatten)]
        request: Request,

        /// Coding ids to aggregate over
        #[arg(long, value_delimiter = ',', required = true)]
        codings: Vec<i64>,

        /// SQL dialect to generate (defaults to the configured dialect)
        #[arg(short, long)]
        dialect: Option<DialectArg>,

        /// Output format
        #[arg(short, long, default_value = "sql")]
        output: OutputFormat,
    },

    /// Run an aggregation against a SQLite database and print JSON rows
    Run {
        #[command(flatten)]
        request: Request,

        /// SQLite database file (defaults to the configured path)
        #[arg(long)]
        db: Option<PathBuf>,

        /// Coding ids to aggregate over
        #[arg(long, value_delimiter = ',', conflicts_with_all = ["articles", "jobs"])]
        codings: Option<Vec<i64>>,

        /// Select codings of these articles (requires --jobs)
        #[arg(long, value_delimiter = ',', requires = "jobs")]
        articles: Option<Vec<i64>>,

        /// Select codings in these coding jobs (requires --articles)
        #[arg(long, value_delimiter = ',', requires = "articles")]
        jobs: Option<Vec<i64>>,

        /// Unwrap singleton category/value tuples
        #[arg(long)]
        flat: bool,
    },
}

#[derive(Args)]
struct Request {
    /// Category to group by, in order (repeatable)
    #[arg(short, long = "category")]
    categories: Vec<String>,

    /// Value to measure, in order (repeatable)
    #[arg(short, long = "value", required = true)]
    values: Vec<String>,
}

impl Request {
    fn parse(&self) -> Result<(Vec<Category>, Vec<Value>), tally::AggregateError> {
        let categories = self
            .categories
            .iter()
            .map(|s| s.parse())
            .collect::<Result<Vec<Category>, _>>()?;
        let values = self
            .values
            .iter()
            .map(|s| s.parse())
            .collect::<Result<Vec<Value>, _>>()?;
        Ok((categories, values))
    }
}

#[derive(Clone, ValueEnum)]
enum DialectArg {
    Postgres,
    Duckdb,
    Sqlite,
}

impl From<DialectArg> for Dialect {
    fn from(arg: DialectArg) -> Self {
        match arg {
            DialectArg::Postgres => Dialect::Postgres,
            DialectArg::Duckdb => Dialect::DuckDb,
            DialectArg::Sqlite => Dialect::Sqlite,
        }
    }
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Output SQL only
    Sql,
    /// Output SQL with parameters as comments
    Verbose,
    /// Output SQL and parameters as JSON
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::from_file(path),
        None => Settings::load(),
    };
    let settings = match settings {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    tally::logging::init(&settings.logging.filter);

    match cli.command {
        Commands::Sql {
            request,
            codings,
            dialect,
            output,
        } => cmd_sql(&settings, request, codings, dialect, output),
        Commands::Run {
            request,
            db,
            codings,
            articles,
            jobs,
            flat,
        } => cmd_run(&settings, request, db, codings, articles.zip(jobs), flat),
    }
}

fn cmd_sql(
    settings: &Settings,
    request: Request,
    codings: Vec<i64>,
    dialect: Option<DialectArg>,
    output: OutputFormat,
) -> ExitCode {
    let (categories, values) = match request.parse() {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    let dialect = dialect.map(Dialect::from).unwrap_or(settings.database.dialect);

    let compiled = match tally::aggregate::compile_aggregate(
        &settings.schema,
        dialect,
        &categories,
        &values,
        &CodingSelection::new(codings),
    ) {
        Ok(compiled) => compiled,
        Err(e) => {
            eprintln!("Compilation error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match output {
        OutputFormat::Sql => {
            println!("{}", compiled.sql);
        }
        OutputFormat::Verbose => {
            println!("-- Tally Compiled SQL");
            println!("-- Dialect: {}", dialect);
            for (i, param) in compiled.params.iter().enumerate() {
                println!("-- {}: {:?}", dialect.placeholder(i + 1), param);
            }
            println!();
            println!("{}", compiled.sql);
        }
        OutputFormat::Json => match serde_json::to_string_pretty(&compiled) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Serialization error: {}", e);
                return ExitCode::FAILURE;
            }
        },
    }
    ExitCode::SUCCESS
}

fn cmd_run(
    settings: &Settings,
    request: Request,
    db: Option<PathBuf>,
    codings: Option<Vec<i64>>,
    articles_and_jobs: Option<(Vec<i64>, Vec<i64>)>,
    flat: bool,
) -> ExitCode {
    match run(settings, request, db, codings, articles_and_jobs, flat) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(
    settings: &Settings,
    request: Request,
    db: Option<PathBuf>,
    codings: Option<Vec<i64>>,
    articles_and_jobs: Option<(Vec<i64>, Vec<i64>)>,
    flat: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let (categories, values) = request.parse()?;
    let path = match db {
        Some(path) => path,
        None => settings.database.resolved_path()?,
    };
    let backend = SqliteBackend::open(&path, settings.schema.clone())?;

    let selection = match (codings, articles_and_jobs) {
        (Some(ids), _) => CodingSelection::new(ids),
        (None, Some((articles, jobs))) => CodingSelection::from_articles(
            &backend,
            &settings.schema,
            Dialect::Sqlite,
            &articles,
            &jobs,
        )?,
        (None, None) => return Err("either --codings or --articles with --jobs is required".into()),
    };

    let rows = Aggregator::new(&backend, selection)
        .with_schema(settings.schema.clone())
        .with_dialect(Dialect::Sqlite)
        .flat(flat || settings.aggregate.flat)
        .aggregate(&categories, &values)?;

    for row in rows {
        println!("{}", serde_json::to_string(&row)?);
    }
    Ok(())
}

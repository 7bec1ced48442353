//! Values flowing out of an aggregation: raw cells and resolved entities.

mod cell;
mod entity;

pub use cell::{format_timestamp, parse_timestamp, Cell};
pub use entity::{Entity, EntityObject};

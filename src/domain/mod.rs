//! Domain entities and value objects, free of persistence and transport concerns.

pub mod product;
pub mod types;

//! Diesel row models and their conversions to domain types.

pub mod product;
pub mod product_image;
#[cfg(feature = "server")]
pub mod config;

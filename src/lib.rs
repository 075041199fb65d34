//! Core library exports for the Unistyle catalog service.
//!
//! The `data` feature exposes the domain types, Diesel models and
//! repositories. The default `server` feature adds the image storage client,
//! the product synchronizer services and the Actix-web routes.

pub mod db;
pub mod domain;
pub mod error_conversions;
pub mod models;
pub mod repository;
pub mod schema;

#[cfg(feature = "server")]
pub mod dto;
#[cfg(feature = "server")]
pub mod forms;
#[cfg(feature = "server")]
pub mod routes;
#[cfg(feature = "server")]
pub mod services;
#[cfg(feature = "server")]
pub mod storage;

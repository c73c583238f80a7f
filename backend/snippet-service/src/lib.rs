//! Snippet service - data access and aggregation for posts, folders,
//! comments, and user profiles backed by a document store.
//!
//! Layers:
//! - `store`: the document-store boundary (trait, query model, in-memory impl)
//! - `models`: domain types with store field mappings and timestamp handling
//! - `services`: business logic (CRUD, search, counters, aggregation, watches)
//! - `rest`: fallback HTTP client for the legacy API
//! - `validation`: request payload schemas

pub mod config;
pub mod error;
pub mod models;
pub mod rest;
pub mod services;
pub mod store;
pub mod validation;

pub use config::Config;
pub use error::{AppError, Result};

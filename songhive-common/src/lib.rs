//! # SongHive Common Library
//!
//! Shared code for the SongHive backend:
//! - Error and result types
//! - Bootstrap configuration (TOML + overrides)
//! - Per-resource record types
//! - Document store port with MongoDB and in-memory adapters
//! - Password hashing for user credentials

pub mod config;
pub mod credentials;
pub mod error;
pub mod models;
pub mod store;

pub use error::{Error, Result};
pub use models::Document;
pub use store::{Collection, DocumentStore, Filter, PrimaryKey, Update};

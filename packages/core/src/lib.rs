//! ModelGraph Core Loader Layer
//!
//! This crate turns model-description documents (JSON model cards) into a
//! property graph. Node identities are derived from document content, so
//! loading the same or overlapping documents again converges onto the same
//! nodes instead of duplicating them.
//!
//! # Architecture
//!
//! - **Declarative mapping**: each document becomes a [`models::GraphWrite`]
//!   (nodes first, then relationships) without touching the store
//! - **Content identity**: entities without a natural key are keyed by a
//!   canonical SHA-256 digest of their record
//! - **Idempotent upserts**: the store merges nodes by key and relates
//!   endpoints only once, so re-running a batch is always safe
//! - **SurrealDB**: embedded RocksDB or remote HTTP backend behind the
//!   [`db::GraphStore`] trait
//!
//! # Modules
//!
//! - [`models`] - Document view and graph write set types
//! - [`utils`] - Flattening and content identity helpers
//! - [`mapping`] - Document to graph schema mapper
//! - [`db`] - Store abstraction and SurrealDB implementation
//! - [`services`] - Validator, loader, batch orchestrator and verifier
//! - [`config`] - Environment-driven loader configuration

pub mod config;
pub mod db;
pub mod mapping;
pub mod models;
pub mod services;
pub mod utils;

// Re-export commonly used types
pub use config::{ConfigError, LoaderConfig};
pub use models::*;
pub use services::*;

//! Database Layer
//!
//! This module handles all graph store interactions:
//!
//! - The [`GraphStore`] abstraction the loader services depend on
//! - The SurrealDB implementation (embedded RocksDB or remote HTTP)
//! - Error classification between batch-fatal and document-scoped failures
//!
//! # Architecture
//!
//! Each node label maps to a SCHEMALESS table whose record IDs are the node
//! keys, and each relationship type maps to a `TYPE RELATION` table. A unique
//! index on every label's key property backs the identity guarantee.

mod error;
mod graph_store;
mod surreal_store;

pub use error::DatabaseError;
pub use graph_store::GraphStore;
pub use surreal_store::{StoreCredentials, SurrealStore, DEFAULT_DATABASE, DEFAULT_NAMESPACE};

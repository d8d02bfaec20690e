//! GraphStore Trait - Store Abstraction Layer
//!
//! This module defines the `GraphStore` trait between the loader services and
//! a concrete graph engine. The loader only needs four capabilities from a
//! store:
//!
//! 1. Merge a node by its key and overwrite declared properties
//! 2. Merge a directed, typed relationship between two existing nodes
//! 3. Declare a uniqueness constraint on a label's key property
//! 4. Count nodes and relationships
//!
//! # Design Decisions
//!
//! 1. **Async-First**: all methods are async so embedded and remote backends
//!    share one interface
//! 2. **Write Sets**: writes arrive as a whole [`GraphWrite`] so a backend
//!    with transactions can apply one document atomically
//! 3. **Idempotence**: applying the same write set twice must leave the store
//!    unchanged after the first application
//!
//! # Examples
//!
//! ```rust,no_run
//! use modelgraph_core::db::{GraphStore, SurrealStore};
//! use modelgraph_core::models::GraphSchema;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store: Arc<dyn GraphStore> =
//!         Arc::new(SurrealStore::new_embedded("./data/graph.db").await?);
//!
//!     store.ensure_schema(&GraphSchema::default()).await?;
//!     Ok(())
//! }
//! ```

use super::DatabaseError;
use crate::models::{GraphSchema, GraphWrite, NodeLabel, RelationshipType};
use async_trait::async_trait;

/// Abstraction over the graph engine used by the loader
///
/// Implementations must be `Send + Sync` so services can share them across
/// tasks behind an `Arc`.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Declare node tables, relationship tables and uniqueness constraints
    ///
    /// Must be safe to call repeatedly.
    async fn ensure_schema(&self, schema: &GraphSchema) -> Result<(), DatabaseError>;

    /// Remove every node and relationship of the given schema
    ///
    /// Constraints stay in place.
    async fn reset(&self, schema: &GraphSchema) -> Result<(), DatabaseError>;

    /// Apply one write set as a single unit of work
    ///
    /// Nodes are merged in order, then relationships in order. A relationship
    /// between two nodes is created only if no relationship of the same type
    /// already joins them.
    ///
    /// # Errors
    ///
    /// On error nothing from this write set is guaranteed to be visible.
    /// Applying the same write set again is always safe.
    async fn apply(&self, write: &GraphWrite) -> Result<(), DatabaseError>;

    /// Number of nodes carrying a label
    async fn count_nodes(&self, label: NodeLabel) -> Result<u64, DatabaseError>;

    /// Number of relationships of a type
    async fn count_relationships(&self, rel_type: RelationshipType)
        -> Result<u64, DatabaseError>;
}

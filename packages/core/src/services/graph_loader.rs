//! Graph Loader
//!
//! Maps one validated document onto the graph schema and applies the
//! resulting write set to the store as a single unit of work. Every write is
//! keyed by identity, so loading the same document again (including after a
//! failed attempt) converges on the same graph.

use super::error::LoadError;
use crate::db::GraphStore;
use crate::mapping::map_document;
use crate::models::{ModelDocument, NodeLabel};
use std::sync::Arc;

/// What one document contributed to the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadSummary {
    /// Model name (natural key)
    pub model: String,
    /// Node merges applied
    pub nodes: usize,
    /// Distinct nodes those merges touched
    pub distinct_nodes: usize,
    /// Relationship merges applied
    pub relationships: usize,
}

/// Executes document write sets against a graph store
pub struct GraphLoader {
    store: Arc<dyn GraphStore>,
}

impl GraphLoader {
    pub fn new(store: Arc<dyn GraphStore>) -> Self {
        Self { store }
    }

    /// Load one document
    ///
    /// # Errors
    ///
    /// - [`LoadError::Mapping`] if the document cannot be mapped
    /// - [`LoadError::Store`] if the store rejects the write set
    pub async fn load_document(&self, document: &ModelDocument) -> Result<LoadSummary, LoadError> {
        let write = map_document(document)?;

        let inference_merges = write.nodes_with_label(NodeLabel::ModelInference).count();
        if inference_merges > 1 {
            tracing::warn!(
                "Model '{}' has {} inference records; only the last is kept on its ModelInference node",
                document.name,
                inference_merges
            );
        }

        self.store.apply(&write).await?;

        let distinct_nodes = write.node_refs().len();
        let content_addressed = write
            .nodes
            .iter()
            .filter(|merge| merge.label().is_content_addressed())
            .count();
        tracing::debug!(
            "Loaded model '{}': {} nodes ({} distinct, {} content-addressed), {} relationships",
            document.name,
            write.node_count(),
            distinct_nodes,
            content_addressed,
            write.relationship_count()
        );

        Ok(LoadSummary {
            model: document.name.clone(),
            nodes: write.node_count(),
            distinct_nodes,
            relationships: write.relationship_count(),
        })
    }
}

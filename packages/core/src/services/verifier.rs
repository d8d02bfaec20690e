//! Post-load Verifier
//!
//! Read-only sanity check run once after a batch: counts nodes per label and
//! relationships per type so an operator can confirm the load.

use crate::db::{DatabaseError, GraphStore};
use crate::models::{NodeLabel, RelationshipType};
use std::fmt;
use std::sync::Arc;

/// Node and relationship counts, in declaration order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationReport {
    pub nodes: Vec<(NodeLabel, u64)>,
    pub relationships: Vec<(RelationshipType, u64)>,
}

impl VerificationReport {
    pub fn node_count(&self, label: NodeLabel) -> u64 {
        self.nodes
            .iter()
            .find(|(l, _)| *l == label)
            .map(|(_, count)| *count)
            .unwrap_or(0)
    }

    pub fn relationship_count(&self, rel_type: RelationshipType) -> u64 {
        self.relationships
            .iter()
            .find(|(t, _)| *t == rel_type)
            .map(|(_, count)| *count)
            .unwrap_or(0)
    }

    pub fn total_nodes(&self) -> u64 {
        self.nodes.iter().map(|(_, count)| count).sum()
    }

    pub fn total_relationships(&self) -> u64 {
        self.relationships.iter().map(|(_, count)| count).sum()
    }
}

impl fmt::Display for VerificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Knowledge Graph Statistics:")?;
        writeln!(f, "{}", "-".repeat(40))?;
        for (label, count) in &self.nodes {
            writeln!(f, "{:<28}{:>12}", label.as_str(), count)?;
        }
        writeln!(f, "{}", "-".repeat(40))?;
        for (rel_type, count) in &self.relationships {
            writeln!(f, "{:<28}{:>12}", rel_type.as_str(), count)?;
        }
        writeln!(f, "{}", "-".repeat(40))?;
        writeln!(f, "{:<28}{:>12}", "Relationships", self.total_relationships())
    }
}

/// Counts what a batch left in the store
pub struct GraphVerifier {
    store: Arc<dyn GraphStore>,
}

impl GraphVerifier {
    pub fn new(store: Arc<dyn GraphStore>) -> Self {
        Self { store }
    }

    pub async fn verify(&self) -> Result<VerificationReport, DatabaseError> {
        let mut nodes = Vec::with_capacity(NodeLabel::ALL.len());
        for label in NodeLabel::ALL {
            nodes.push((label, self.store.count_nodes(label).await?));
        }

        let mut relationships = Vec::with_capacity(RelationshipType::ALL.len());
        for rel_type in RelationshipType::ALL {
            relationships.push((rel_type, self.store.count_relationships(rel_type).await?));
        }

        let report = VerificationReport {
            nodes,
            relationships,
        };
        tracing::debug!(
            "Verified graph: {} nodes, {} relationships",
            report.total_nodes(),
            report.total_relationships()
        );
        Ok(report)
    }
}

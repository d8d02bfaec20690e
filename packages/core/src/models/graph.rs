//! Graph write set types
//!
//! The mapper describes *what* to write as a [`GraphWrite`]; stores decide
//! *how*. Every node is addressed by `(label, key)` where the key is either a
//! natural key or a content digest, never a generated identifier.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Node types emitted for a model document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NodeLabel {
    Model,
    Dataset,
    Service,
    ProblemType,
    ModelArchitecture,
    ModelTraining,
    Parameters,
    Hyperparameters,
    Device,
    ModelInference,
}

impl NodeLabel {
    /// All labels in declaration order
    pub const ALL: [NodeLabel; 10] = [
        NodeLabel::Model,
        NodeLabel::Dataset,
        NodeLabel::Service,
        NodeLabel::ProblemType,
        NodeLabel::ModelArchitecture,
        NodeLabel::ModelTraining,
        NodeLabel::Parameters,
        NodeLabel::Hyperparameters,
        NodeLabel::Device,
        NodeLabel::ModelInference,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeLabel::Model => "Model",
            NodeLabel::Dataset => "Dataset",
            NodeLabel::Service => "Service",
            NodeLabel::ProblemType => "ProblemType",
            NodeLabel::ModelArchitecture => "ModelArchitecture",
            NodeLabel::ModelTraining => "ModelTraining",
            NodeLabel::Parameters => "Parameters",
            NodeLabel::Hyperparameters => "Hyperparameters",
            NodeLabel::Device => "Device",
            NodeLabel::ModelInference => "ModelInference",
        }
    }

    /// Property holding the identity key
    pub fn key_property(&self) -> &'static str {
        match self {
            NodeLabel::Model
            | NodeLabel::Dataset
            | NodeLabel::Service
            | NodeLabel::ProblemType => "name",
            NodeLabel::ModelArchitecture => "type",
            NodeLabel::ModelTraining | NodeLabel::Parameters | NodeLabel::ModelInference => {
                "model"
            }
            NodeLabel::Hyperparameters | NodeLabel::Device => "contentHash",
        }
    }

    /// Whether the key is a content digest rather than a natural key
    pub fn is_content_addressed(&self) -> bool {
        matches!(self, NodeLabel::Hyperparameters | NodeLabel::Device)
    }
}

impl fmt::Display for NodeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Directed relationship types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationshipType {
    TrainedOn,
    Provides,
    SolutionFor,
    Utilizes,
    TrainsOn,
    RunsOn,
    Contains,
    Uses,
    InferenceOn,
}

impl RelationshipType {
    pub const ALL: [RelationshipType; 9] = [
        RelationshipType::TrainedOn,
        RelationshipType::Provides,
        RelationshipType::SolutionFor,
        RelationshipType::Utilizes,
        RelationshipType::TrainsOn,
        RelationshipType::RunsOn,
        RelationshipType::Contains,
        RelationshipType::Uses,
        RelationshipType::InferenceOn,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RelationshipType::TrainedOn => "TRAINED_ON",
            RelationshipType::Provides => "PROVIDES",
            RelationshipType::SolutionFor => "SOLUTION_FOR",
            RelationshipType::Utilizes => "UTILIZES",
            RelationshipType::TrainsOn => "TRAINS_ON",
            RelationshipType::RunsOn => "RUNS_ON",
            RelationshipType::Contains => "CONTAINS",
            RelationshipType::Uses => "USES",
            RelationshipType::InferenceOn => "INFERENCE_ON",
        }
    }
}

impl fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Address of one node
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeRef {
    pub label: NodeLabel,
    pub key: String,
}

impl NodeRef {
    pub fn new(label: NodeLabel, key: impl Into<String>) -> Self {
        Self {
            label,
            key: key.into(),
        }
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.label, self.key)
    }
}

/// Merge-or-create a node, then overwrite its mutable properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeMerge {
    pub node: NodeRef,
    /// Properties to overwrite; includes the key property
    pub properties: Map<String, Value>,
}

impl NodeMerge {
    /// Build a node merge
    ///
    /// The key property is inserted after all other properties so that a
    /// dynamic property with the same name cannot change the node's identity.
    pub fn new(label: NodeLabel, key: impl Into<String>, properties: Map<String, Value>) -> Self {
        let node = NodeRef::new(label, key);
        let mut properties = properties;
        properties.insert(
            label.key_property().to_string(),
            Value::String(node.key.clone()),
        );
        Self { node, properties }
    }

    pub fn label(&self) -> NodeLabel {
        self.node.label
    }

    pub fn key(&self) -> &str {
        &self.node.key
    }
}

/// Merge-or-create a directed relationship between two existing nodes
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RelationshipMerge {
    pub from: NodeRef,
    pub rel_type: RelationshipType,
    pub to: NodeRef,
}

impl RelationshipMerge {
    pub fn new(from: NodeRef, rel_type: RelationshipType, to: NodeRef) -> Self {
        Self { from, rel_type, to }
    }
}

impl fmt::Display for RelationshipMerge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})-[:{}]->({})", self.from, self.rel_type, self.to)
    }
}

/// Everything one document writes, applied as one unit of work
///
/// Stores apply `nodes` in order, then `relationships` in order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphWrite {
    pub nodes: Vec<NodeMerge>,
    pub relationships: Vec<RelationshipMerge>,
}

impl GraphWrite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn merge_node(&mut self, merge: NodeMerge) -> NodeRef {
        let node = merge.node.clone();
        self.nodes.push(merge);
        node
    }

    /// Add a relationship; an identical one already in the set is not repeated
    pub fn relate(&mut self, from: &NodeRef, rel_type: RelationshipType, to: &NodeRef) {
        let rel = RelationshipMerge::new(from.clone(), rel_type, to.clone());
        if !self.relationships.contains(&rel) {
            self.relationships.push(rel);
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn relationship_count(&self) -> usize {
        self.relationships.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.relationships.is_empty()
    }

    /// Distinct nodes touched by this write set, in first-merge order
    pub fn node_refs(&self) -> Vec<&NodeRef> {
        let mut refs: Vec<&NodeRef> = Vec::with_capacity(self.nodes.len());
        for merge in &self.nodes {
            if !refs.contains(&&merge.node) {
                refs.push(&merge.node);
            }
        }
        refs
    }

    /// Merges targeting a given label, in write order
    pub fn nodes_with_label(&self, label: NodeLabel) -> impl Iterator<Item = &NodeMerge> {
        self.nodes.iter().filter(move |n| n.label() == label)
    }

    /// Whether every relationship endpoint is merged by this write set
    pub fn is_endpoint_complete(&self) -> bool {
        self.relationships.iter().all(|rel| {
            self.nodes.iter().any(|n| n.node == rel.from)
                && self.nodes.iter().any(|n| n.node == rel.to)
        })
    }
}

/// Uniqueness constraint on a label's key property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniqueConstraint {
    pub label: NodeLabel,
    pub property: &'static str,
}

impl UniqueConstraint {
    /// Stable constraint name, e.g. `model_name`
    pub fn name(&self) -> String {
        format!(
            "{}_{}",
            to_snake_case(self.label.as_str()),
            to_snake_case(self.property)
        )
    }
}

/// Declared graph shape installed before loading
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphSchema {
    pub labels: Vec<NodeLabel>,
    pub relationship_types: Vec<RelationshipType>,
}

impl Default for GraphSchema {
    fn default() -> Self {
        Self {
            labels: NodeLabel::ALL.to_vec(),
            relationship_types: RelationshipType::ALL.to_vec(),
        }
    }
}

impl GraphSchema {
    /// One uniqueness constraint per label on its key property
    pub fn constraints(&self) -> Vec<UniqueConstraint> {
        self.labels
            .iter()
            .map(|label| UniqueConstraint {
                label: *label,
                property: label.key_property(),
            })
            .collect()
    }
}

fn to_snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, ch) in name.chars().enumerate() {
        if ch.is_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

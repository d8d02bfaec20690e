//! Data Models
//!
//! This module contains the core data structures used throughout ModelGraph:
//!
//! - `ModelDocument` - Typed view over one model-description JSON document
//! - `GraphWrite` - Declarative node/relationship set produced by the mapper
//!
//! Documents flow in as `ModelDocument`, the mapper turns them into
//! `GraphWrite`s, and stores apply those write sets.

mod document;
mod graph;

pub use document::{
    ArchitectureSection, DatasetSection, DocumentError, InferenceSection, ModelDocument,
    ParametersSection, Record, ServiceSection, TrainingSection,
};
pub use graph::{
    GraphSchema, GraphWrite, NodeLabel, NodeMerge, NodeRef, RelationshipMerge, RelationshipType,
    UniqueConstraint,
};

//! Schema Mapping
//!
//! Translates one validated [`ModelDocument`](crate::models::ModelDocument)
//! into the fixed set of nodes and relationships it contributes to the graph.
//! Mapping is pure: the result is a [`GraphWrite`](crate::models::GraphWrite)
//! that any store can apply.

mod error;
mod mapper;

pub use error::MappingError;
pub use mapper::map_document;

#[cfg(test)]
#[path = "mapper_test.rs"]
mod mapper_test;

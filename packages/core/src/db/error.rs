//! Database Error Types
//!
//! This module defines error types for store operations and classifies them:
//! transport failures end a batch, statement failures only fail the document
//! being written.

use thiserror::Error;

/// Store operation errors
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to establish the store connection
    #[error("Failed to connect to graph store at {endpoint}: {source}")]
    ConnectionFailed {
        endpoint: String,
        #[source]
        source: surrealdb::Error,
    },

    /// Store became unreachable or rejected the session mid-batch
    #[error("Graph store unavailable during {context}: {source}")]
    Unavailable {
        context: String,
        #[source]
        source: surrealdb::Error,
    },

    /// A statement failed; the connection is still usable
    #[error("Query failed during {context}: {source}")]
    QueryFailed {
        context: String,
        #[source]
        source: surrealdb::Error,
    },

    /// Query result did not have the expected shape
    #[error("Failed to decode result of {context}: {message}")]
    Decode { context: String, message: String },

    /// Invalid endpoint or store configuration
    #[error("Invalid store configuration: {0}")]
    InvalidConfiguration(String),
}

impl DatabaseError {
    /// Create a connection failed error
    pub fn connection_failed(endpoint: impl Into<String>, source: surrealdb::Error) -> Self {
        Self::ConnectionFailed {
            endpoint: endpoint.into(),
            source,
        }
    }

    /// Classify an error returned while sending a query
    ///
    /// Client/API level errors mean the store could not be reached or the
    /// session is unusable; database level errors are statement failures.
    pub fn from_send(context: impl Into<String>, source: surrealdb::Error) -> Self {
        let context = context.into();
        match source {
            surrealdb::Error::Api(_) => Self::Unavailable { context, source },
            _ => Self::QueryFailed { context, source },
        }
    }

    /// Create a statement failure error
    pub fn query_failed(context: impl Into<String>, source: surrealdb::Error) -> Self {
        Self::QueryFailed {
            context: context.into(),
            source,
        }
    }

    /// Create a decode error
    pub fn decode(context: impl Into<String>, message: impl ToString) -> Self {
        Self::Decode {
            context: context.into(),
            message: message.to_string(),
        }
    }

    /// Create an invalid configuration error
    pub fn invalid_configuration(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    /// Whether the error should abort the whole batch
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed { .. } | Self::Unavailable { .. } | Self::InvalidConfiguration(_)
        )
    }
}

//! Error types for ptmnet

use thiserror::Error;

/// Result type alias for ptmnet operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for ptmnet
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Table error: {0}")]
    Table(#[from] csv::Error),

    #[error("Snapshot encoding error: {0}")]
    SnapshotEncode(#[from] bincode::error::EncodeError),

    #[error("Snapshot decoding error: {0}")]
    SnapshotDecode(#[from] bincode::error::DecodeError),

    #[error("Resource {resource} does not provide data for organism {ncbi_tax_id}")]
    UnsupportedOrganism { resource: String, ncbi_tax_id: u32 },

    #[error("Unknown organism: {0}")]
    UnknownOrganism(String),

    #[error("Unknown identifier type: {0}")]
    UnknownIdType(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an unsupported organism error
    pub fn unsupported_organism(resource: impl Into<String>, ncbi_tax_id: u32) -> Self {
        Self::UnsupportedOrganism {
            resource: resource.into(),
            ncbi_tax_id,
        }
    }
}

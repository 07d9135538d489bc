//! ptmnet Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types, utilities, and error handling for the ptmnet workspace.
//!
//! # Overview
//!
//! - **Error Handling**: the workspace error type and result alias
//! - **Logging**: tracing subscriber setup shared by every binary
//! - **Identifiers**: the identifier namespaces understood by the mappers
//! - **Taxonomy**: NCBI Taxonomy ids and the organism names resources expect
//!
//! # Example
//!
//! ```no_run
//! use ptmnet_common::{taxonomy, IdType, Result};
//!
//! fn resolve(organism: &str) -> Result<(u32, IdType)> {
//!     let ncbi_tax_id = taxonomy::ensure_ncbi_tax_id(organism)?;
//!     Ok((ncbi_tax_id, "genesymbol".parse()?))
//! }
//! ```

pub mod error;
pub mod ids;
pub mod logging;
pub mod taxonomy;

// Re-export commonly used types
pub use error::{Error, Result};
pub use ids::IdType;

//! ptmnet Ingest Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Enzyme-substrate interactions from post-translational modification
//! resources, normalized to UniProt accessions and to residues verified
//! against reference proteomes.
//!
//! # Overview
//!
//! - **Processor**: one resource, one organism, an iterator of interactions
//! - **Homology processor**: interactions of other organisms translated onto the target
//! - **Aggregator**: all resources merged, indexed, exported and summarized
//! - **Services**: identifier mapping, sequences, orthology and raw inputs
//!
//! # Example
//!
//! ```no_run
//! use ptmnet_ingest::{EnzymeSubstrateAggregator, IngestConfig, Services};
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = IngestConfig::load()?;
//! let services = Services::from_config(&config)?;
//!
//! let mut aggregator = EnzymeSubstrateAggregator::new(config.to_aggregator_options());
//! aggregator.build(&services)?;
//! println!("{} interactions", aggregator.len());
//! # Ok(())
//! # }
//! ```

pub mod aggregator;
pub mod config;
pub mod export;
pub mod homology;
pub mod homology_processor;
pub mod inputs;
pub mod io;
pub mod mapping;
pub mod models;
pub mod processor;
pub mod record;
pub mod sequence;
pub mod services;
pub mod snapshot;
pub mod summary;

pub use aggregator::{AggregatorOptions, EnzymeSubstrateAggregator, InteractionNetwork};
pub use config::IngestConfig;
pub use homology_processor::{EnzymeSubstrateHomologyProcessor, HomologyOptions};
pub use inputs::{InputArgs, InputMethod, InputRegistry, PtmInput, Resource};
pub use models::{Domain, DomainMotif, EnzSubMap, Motif, Ptm, PtmKey, ReferenceTable, Residue};
pub use processor::{EnzymeSubstrateProcessor, ProcessorOptions};
pub use record::RawPtmRecord;
pub use services::Services;

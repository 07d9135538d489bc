//! Services the processors consume
//!
//! Identifier mapping, sequences, orthology and the raw inputs are owned by
//! the caller and borrowed by every processor for the duration of a build.

use ptmnet_common::Result;
use tracing::info;

use crate::config::IngestConfig;
use crate::homology::{OrthologyService, OrthologyTable};
use crate::inputs::InputRegistry;
use crate::mapping::{IdMapper, MappingTable};
use crate::sequence::{ProteomeStore, SequenceStore};

pub struct Services {
    pub mapper: Box<dyn IdMapper>,
    pub sequences: Box<dyn SequenceStore>,
    pub orthology: Box<dyn OrthologyService>,
    pub inputs: InputRegistry,
}

impl Services {
    pub fn new(
        mapper: impl IdMapper + 'static,
        sequences: impl SequenceStore + 'static,
        orthology: impl OrthologyService + 'static,
        inputs: InputRegistry,
    ) -> Self {
        Self {
            mapper: Box::new(mapper),
            sequences: Box::new(sequences),
            orthology: Box::new(orthology),
            inputs,
        }
    }

    /// File-backed services laid out as described by the configuration
    pub fn from_config(config: &IngestConfig) -> Result<Self> {
        let mapper = MappingTable::new()
            .with_mapping_dir(&config.mapping_dir)
            .with_proteome_dir(&config.proteome_dir);
        let sequences = ProteomeStore::with_fasta_dir(&config.proteome_dir);
        let orthology = if config.orthology_dir.is_dir() {
            OrthologyTable::from_dir(&config.orthology_dir)?
        } else {
            OrthologyTable::new()
        };
        let inputs = InputRegistry::with_data_dir(&config.data_dir);

        info!(
            data_dir = %config.data_dir.display(),
            proteome_dir = %config.proteome_dir.display(),
            "Services initialized"
        );
        Ok(Self::new(mapper, sequences, orthology, inputs))
    }
}

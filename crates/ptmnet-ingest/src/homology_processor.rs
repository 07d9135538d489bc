//! Enzyme-substrate interactions translated from other organisms

use ptmnet_common::{taxonomy, Error, IdType, Result};
use tracing::info;

use crate::homology::HomologyTranslator;
use crate::inputs::{InputArgs, InputMethod};
use crate::models::DomainMotif;
use crate::processor::{EnzymeSubstrateProcessor, ProcessorOptions};
use crate::services::Services;

/// Options of an [`EnzymeSubstrateHomologyProcessor`]
#[derive(Debug, Clone)]
pub struct HomologyOptions {
    pub input_method: InputMethod,
    /// Target organism
    pub ncbi_tax_id: u32,
    /// Organisms to translate from, in order
    pub source_taxa: Vec<u32>,
    /// Use curated homologous sites only
    pub strict: bool,
    pub enzyme_id_type: IdType,
    pub substrate_id_type: IdType,
    pub trace: bool,
    pub input_args: InputArgs,
}

impl HomologyOptions {
    pub fn new(input_method: impl Into<InputMethod>, ncbi_tax_id: u32) -> Self {
        Self {
            input_method: input_method.into(),
            ncbi_tax_id,
            source_taxa: vec![taxonomy::HUMAN],
            strict: false,
            enzyme_id_type: IdType::GeneSymbol,
            substrate_id_type: IdType::GeneSymbol,
            trace: false,
            input_args: InputArgs::new(),
        }
    }

    pub fn source_taxa(mut self, source_taxa: impl IntoIterator<Item = u32>) -> Self {
        self.source_taxa = source_taxa.into_iter().collect();
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    pub fn input_args(mut self, input_args: InputArgs) -> Self {
        self.input_args = input_args;
        self
    }
}

/// Runs one processor per source organism and projects its output onto the target
pub struct EnzymeSubstrateHomologyProcessor<'a> {
    services: &'a Services,
    ncbi_tax_id: u32,
    strict: bool,
    processors: Vec<(u32, EnzymeSubstrateProcessor<'a>)>,
}

impl<'a> EnzymeSubstrateHomologyProcessor<'a> {
    /// Sources the resource cannot serve are skipped
    pub fn new(services: &'a Services, options: HomologyOptions) -> Result<Self> {
        services.sequences.load_proteome(options.ncbi_tax_id)?;

        let mut processors = Vec::new();
        for source in options.source_taxa.iter().copied() {
            if source == options.ncbi_tax_id {
                continue;
            }

            let processor_options = ProcessorOptions::new(options.input_method.clone())
                .organism(source)
                .id_types(options.enzyme_id_type, options.substrate_id_type)
                .trace(options.trace)
                .allow_mixed_organisms(true)
                .input_args(options.input_args.clone());

            match EnzymeSubstrateProcessor::new(services, processor_options) {
                Ok(processor) => processors.push((source, processor)),
                Err(Error::UnsupportedOrganism { resource, ncbi_tax_id }) => {
                    info!(resource = %resource, ncbi_tax_id, "Resource has no data for source organism, skipping");
                },
                Err(e) => return Err(e),
            }
        }

        Ok(Self {
            services,
            ncbi_tax_id: options.ncbi_tax_id,
            strict: options.strict,
            processors,
        })
    }

    pub fn ncbi_tax_id(&self) -> u32 {
        self.ncbi_tax_id
    }

    /// Source organisms with a processor
    pub fn source_taxa(&self) -> impl Iterator<Item = u32> + '_ {
        self.processors.iter().map(|(source, _)| *source)
    }

    /// Raw record count over all source organisms
    pub fn len(&self) -> usize {
        self.processors.iter().map(|(_, p)| p.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Translated interactions of every source organism, not deduplicated
    pub fn iter(&mut self) -> Box<dyn Iterator<Item = DomainMotif> + '_> {
        let translator = HomologyTranslator::new(self.services, self.ncbi_tax_id, self.strict);

        Box::new(self.processors.iter_mut().flat_map(move |(source, processor)| {
            let source = *source;
            processor
                .iter()
                .flat_map(move |dm| translator.translate_domain_motif(&dm, source))
        }))
    }
}

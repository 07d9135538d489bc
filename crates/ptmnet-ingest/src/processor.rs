//! Single resource, single organism enzyme-substrate processing
//!
//! A processor pulls the raw records of one input and turns each record into
//! zero or more validated [`DomainMotif`]s: identifiers are mapped to UniProt,
//! and only (substrate, isoform) pairs whose sequence really carries the
//! claimed residue (and window, if given) survive.

use ptmnet_common::{taxonomy, Error, IdType, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{debug, info};

use crate::inputs::{InputArgs, InputMethod, Resource};
use crate::models::{Domain, DomainMotif, Motif, MotifExtras, Ptm, Residue};
use crate::record::RawPtmRecord;
use crate::sequence::{ProteinSequence, Region, DEFAULT_FLANK};
use crate::services::Services;

/// Options of an [`EnzymeSubstrateProcessor`]
#[derive(Debug, Clone)]
pub struct ProcessorOptions {
    pub input_method: InputMethod,
    pub ncbi_tax_id: u32,
    pub enzyme_id_type: IdType,
    pub substrate_id_type: IdType,
    pub trace: bool,
    /// Accept enzymes and substrates of other organisms
    pub allow_mixed_organisms: bool,
    pub input_args: InputArgs,
}

impl ProcessorOptions {
    pub fn new(input_method: impl Into<InputMethod>) -> Self {
        Self {
            input_method: input_method.into(),
            ncbi_tax_id: taxonomy::HUMAN,
            enzyme_id_type: IdType::GeneSymbol,
            substrate_id_type: IdType::GeneSymbol,
            trace: false,
            allow_mixed_organisms: false,
            input_args: InputArgs::new(),
        }
    }

    pub fn organism(mut self, ncbi_tax_id: u32) -> Self {
        self.ncbi_tax_id = ncbi_tax_id;
        self
    }

    pub fn id_types(mut self, enzyme: IdType, substrate: IdType) -> Self {
        self.enzyme_id_type = enzyme;
        self.substrate_id_type = substrate;
        self
    }

    pub fn trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    pub fn allow_mixed_organisms(mut self, allow: bool) -> Self {
        self.allow_mixed_organisms = allow;
        self
    }

    pub fn input_args(mut self, input_args: InputArgs) -> Self {
        self.input_args = input_args;
        self
    }
}

/// A substrate site no isoform could confirm
#[derive(Debug, Clone, PartialEq)]
pub struct UnmatchedSite {
    pub substrate: String,
    pub accessions: BTreeSet<String>,
    pub resaa: char,
    pub resnum: u32,
    pub instance: Option<String>,
    /// `ACC-ISO:window` around `resnum` for every candidate isoform
    pub windows: Vec<String>,
}

/// Mapping diagnostics collected when tracing is enabled
#[derive(Debug, Clone, Default)]
pub struct TraceLog {
    /// First seen substrate names mapping to several accessions
    pub substrate_ambiguity: BTreeMap<String, BTreeSet<String>>,
    /// First seen enzyme names mapping to several accessions
    pub enzyme_ambiguity: BTreeMap<String, BTreeSet<String>>,
    pub unmatched: Vec<UnmatchedSite>,
}

/// Emits the validated interactions of one resource in one organism
pub struct EnzymeSubstrateProcessor<'a> {
    services: &'a Services,
    name: String,
    resource: Option<Resource>,
    ncbi_tax_id: u32,
    enzyme_id_type: IdType,
    substrate_id_types: Vec<IdType>,
    default_modification: &'static str,
    allow_mixed_organisms: bool,
    trace_enabled: bool,
    input_args: InputArgs,
    data: Vec<RawPtmRecord>,
    trace: TraceLog,
}

impl<'a> EnzymeSubstrateProcessor<'a> {
    /// Load proteomes, resolve the input, apply the resource profile and fetch the records
    pub fn new(services: &'a Services, options: ProcessorOptions) -> Result<Self> {
        let ncbi_tax_id = options.ncbi_tax_id;

        // Step 1: proteomes
        services.sequences.load_proteome(ncbi_tax_id)?;
        if options.allow_mixed_organisms {
            for taxon in taxonomy::MIXED_ORGANISM_TAXA {
                if taxon != ncbi_tax_id {
                    services.sequences.load_proteome(taxon)?;
                }
            }
        }

        // Step 2: input method
        let resolved = services.inputs.resolve(&options.input_method);
        let profile = resolved
            .resource
            .map(|resource| resource.profile())
            .unwrap_or_default();

        // Steps 3-4: resource profile
        let mut input_args = options.input_args;
        if let Some(resource) = resolved.resource {
            if !profile.supports(ncbi_tax_id) {
                return Err(Error::unsupported_organism(resource.name(), ncbi_tax_id));
            }
            profile.apply_defaults(resource, &mut input_args, ncbi_tax_id);
        }
        let enzyme_id_type = profile
            .raw_enzyme_id_type
            .unwrap_or(options.enzyme_id_type);
        let substrate_id_types = profile
            .substrate_id_types
            .map(<[IdType]>::to_vec)
            .unwrap_or_else(|| vec![options.substrate_id_type]);

        // Step 5: raw records
        let data = resolved.input.fetch(&input_args)?;
        for record in &data {
            record.validate()?;
        }

        info!(
            resource = %resolved.name,
            ncbi_tax_id,
            records = data.len(),
            enzyme_id_type = enzyme_id_type.as_str(),
            "Loaded enzyme-substrate records"
        );

        Ok(Self {
            services,
            name: resolved.name,
            resource: resolved.resource,
            ncbi_tax_id,
            enzyme_id_type,
            substrate_id_types,
            default_modification: profile.default_modification,
            allow_mixed_organisms: options.allow_mixed_organisms,
            trace_enabled: options.trace,
            input_args,
            data,
            trace: TraceLog::default(),
        })
    }

    /// Source name of the emitted interactions
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn resource(&self) -> Option<Resource> {
        self.resource
    }

    pub fn ncbi_tax_id(&self) -> u32 {
        self.ncbi_tax_id
    }

    /// Arguments the input was called with, defaults included
    pub fn input_args(&self) -> &InputArgs {
        &self.input_args
    }

    pub fn enzyme_id_type(&self) -> IdType {
        self.enzyme_id_type
    }

    pub fn substrate_id_types(&self) -> &[IdType] {
        &self.substrate_id_types
    }

    /// Number of raw records
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn trace(&self) -> &TraceLog {
        &self.trace
    }

    /// Validated interactions, record by record, not deduplicated
    pub fn iter(&mut self) -> impl Iterator<Item = DomainMotif> + '_ {
        let context = RecordContext {
            services: self.services,
            source: &self.name,
            ncbi_tax_id: self.ncbi_tax_id,
            enzyme_id_type: self.enzyme_id_type,
            substrate_id_types: &self.substrate_id_types,
            default_modification: self.default_modification,
            allow_mixed_organisms: self.allow_mixed_organisms,
            trace_enabled: self.trace_enabled,
        };
        let trace = &mut self.trace;

        self.data
            .iter()
            .flat_map(move |record| context.process(record, trace))
    }
}

/// What per-record processing needs from the processor
struct RecordContext<'c> {
    services: &'c Services,
    source: &'c str,
    ncbi_tax_id: u32,
    enzyme_id_type: IdType,
    substrate_id_types: &'c [IdType],
    default_modification: &'static str,
    allow_mixed_organisms: bool,
    trace_enabled: bool,
}

impl RecordContext<'_> {
    fn process(&self, record: &RawPtmRecord, trace: &mut TraceLog) -> Vec<DomainMotif> {
        if !record.has_enzyme() || record.substrate.starts_with("HLA") {
            return Vec::new();
        }

        let mapper = &self.services.mapper;
        let substrates: BTreeSet<String> = self
            .substrate_id_types
            .iter()
            .flat_map(|id_type| {
                mapper.map_name(&record.substrate, *id_type, IdType::Uniprot, self.ncbi_tax_id)
            })
            .collect();

        if self.trace_enabled && substrates.len() > 1 {
            trace
                .substrate_ambiguity
                .entry(record.substrate.clone())
                .or_insert_with(|| substrates.clone());
        }

        let sites = self.matching_sites(record, &substrates);
        if sites.is_empty() {
            if self.trace_enabled && !substrates.is_empty() {
                self.trace_unmatched(record, &substrates, trace);
            }
            return Vec::new();
        }

        let mut enzymes = BTreeSet::new();
        for name in record.enzymes.iter().filter(|e| !e.trim().is_empty()) {
            let mapped = mapper.map_name(name, self.enzyme_id_type, IdType::Uniprot, self.ncbi_tax_id);
            if self.trace_enabled && mapped.len() > 1 {
                trace
                    .enzyme_ambiguity
                    .entry(name.clone())
                    .or_insert_with(|| mapped.clone());
            }
            enzymes.extend(mapped);
        }

        let typ = record
            .typ
            .as_deref()
            .map(str::to_lowercase)
            .unwrap_or_else(|| self.default_modification.to_string());
        let extras = MotifExtras::from_record(record);

        let mut interactions = Vec::new();
        for enzyme in &enzymes {
            if !self.allow_mixed_organisms
                && self.services.sequences.organism(enzyme) != Some(self.ncbi_tax_id)
            {
                continue;
            }

            for (sequence, isoform, region) in &sites {
                if !self.allow_mixed_organisms && sequence.ncbi_tax_id != self.ncbi_tax_id {
                    continue;
                }

                let residue = Residue::new(record.resnum, record.resaa, sequence.accession.clone(), *isoform);
                let motif = Motif {
                    protein: sequence.accession.clone(),
                    start: region.start,
                    end: region.end,
                    instance: region.instance.clone(),
                    isoform: *isoform,
                };
                let ptm = Ptm::new(motif, residue, typ.clone(), self.source);
                interactions.push(
                    DomainMotif::new(Domain::new(enzyme.clone()), ptm, self.source, record.references.iter().cloned())
                        .with_extras(extras.clone()),
                );
            }
        }

        interactions
    }

    /// Every (sequence, isoform, window) confirming the record's site
    fn matching_sites(
        &self,
        record: &RawPtmRecord,
        substrates: &BTreeSet<String>,
    ) -> Vec<(Arc<ProteinSequence>, u32, Region)> {
        substrates
            .iter()
            .filter_map(|accession| self.services.sequences.sequence(accession))
            .flat_map(|sequence| {
                sequence
                    .isoforms()
                    .filter_map(|isoform| site_region(&sequence, record, isoform).map(|region| (isoform, region)))
                    .collect::<Vec<_>>()
                    .into_iter()
                    .map(move |(isoform, region)| (Arc::clone(&sequence), isoform, region))
            })
            .collect()
    }

    fn trace_unmatched(&self, record: &RawPtmRecord, substrates: &BTreeSet<String>, trace: &mut TraceLog) {
        let mut windows = Vec::new();
        for accession in substrates {
            let Some(sequence) = self.services.sequences.sequence(accession) else {
                windows.push(format!("{accession}:<no sequence>"));
                continue;
            };
            for isoform in sequence.isoforms() {
                let window = sequence
                    .region(record.resnum, None, None, isoform)
                    .map(|region| region.instance)
                    .unwrap_or_else(|| format!("<out of range, length {}>", sequence.isoform(isoform).map_or(0, str::len)));
                windows.push(format!("{accession}-{isoform}:{window}"));
            }
        }

        debug!(
            resource = self.source,
            substrate = %record.substrate,
            site = %format!("{}{}", record.resaa, record.resnum),
            instance = record.instance.as_deref().unwrap_or(""),
            windows = %windows.join(" "),
            flank = DEFAULT_FLANK,
            "No isoform matches the site"
        );

        trace.unmatched.push(UnmatchedSite {
            substrate: record.substrate.clone(),
            accessions: substrates.clone(),
            resaa: record.resaa,
            resnum: record.resnum,
            instance: record.instance.clone(),
            windows,
        });
    }
}

/// Window of a record's site in one isoform, `None` when the isoform does not carry it
///
/// The residue letter must match at `resnum`. A claimed instance must match
/// at its bounds, or anywhere covering `resnum` when no bounds are given.
fn site_region(sequence: &ProteinSequence, record: &RawPtmRecord, isoform: u32) -> Option<Region> {
    if !sequence.match_residue(record.resaa, record.resnum, isoform) {
        return None;
    }

    match (record.instance.as_deref(), record.start, record.end) {
        (Some(instance), Some(start), Some(end)) => {
            if !sequence.match_instance(instance, start, end, isoform) {
                return None;
            }
            sequence.region(record.resnum, Some(start), Some(end), isoform)
        },
        (Some(instance), _, _) => {
            let (start, end) = sequence.locate_instance(instance, record.resnum, isoform)?;
            sequence.region(record.resnum, Some(start), Some(end), isoform)
        },
        (None, Some(start), Some(end)) if start <= record.resnum && record.resnum <= end => {
            sequence.region(record.resnum, Some(start), Some(end), isoform)
        },
        _ => sequence.region(record.resnum, None, None, isoform),
    }
}

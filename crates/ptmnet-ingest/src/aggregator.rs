//! Enzyme-substrate aggregation over many resources
//!
//! The aggregator runs a direct processor per input, and a homology processor
//! when source organisms are configured, then merges equal interactions so
//! that each (enzyme, site, modification) appears once per enzyme-substrate
//! pair with the union of its provenance.
//!
//! # Example
//!
//! ```no_run
//! use ptmnet_ingest::{AggregatorOptions, EnzymeSubstrateAggregator, IngestConfig, Services};
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = IngestConfig::load()?;
//! let services = Services::from_config(&config)?;
//! let mut aggregator = EnzymeSubstrateAggregator::new(AggregatorOptions::default());
//! aggregator.build(&services)?;
//! aggregator.export_table(std::path::Path::new("enz_sub.tsv"), services.mapper.as_ref(), false)?;
//! # Ok(())
//! # }
//! ```

use indicatif::{ProgressBar, ProgressStyle};
use ptmnet_common::{taxonomy, Error, Result};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::export::{self, EnzSubRow};
use crate::homology_processor::{EnzymeSubstrateHomologyProcessor, HomologyOptions};
use crate::inputs::{InputArgs, InputMethod, DEFAULT_INPUTS};
use crate::mapping::IdMapper;
use crate::models::{DomainMotif, EnzSubMap, InteractionKey, PtmKey, ReferenceTable};
use crate::processor::{EnzymeSubstrateProcessor, ProcessorOptions};
use crate::services::Services;
use crate::snapshot;
use crate::summary::{self, ResourceSummary};

/// Options of an [`EnzymeSubstrateAggregator`]
#[derive(Debug, Clone)]
pub struct AggregatorOptions {
    pub input_methods: Vec<InputMethod>,
    pub ncbi_tax_id: u32,
    /// Organisms to translate interactions from; never contains the target
    pub map_by_homology_from: BTreeSet<u32>,
    /// Query resources directly for a non-human target
    pub nonhuman_direct_lookup: bool,
    /// Extra input arguments keyed by lower-case resource name
    pub inputargs: HashMap<String, InputArgs>,
    pub trace: bool,
    pub ptm_homology_strict: bool,
    pub snapshot_file: Option<PathBuf>,
    /// Write the snapshot after building
    pub save_snapshot: bool,
    /// Restore an existing snapshot instead of processing the inputs
    pub restore_snapshot: bool,
    pub show_progress: bool,
}

impl Default for AggregatorOptions {
    fn default() -> Self {
        Self {
            input_methods: DEFAULT_INPUTS.iter().copied().map(InputMethod::from).collect(),
            ncbi_tax_id: taxonomy::HUMAN,
            map_by_homology_from: BTreeSet::new(),
            nonhuman_direct_lookup: true,
            inputargs: HashMap::new(),
            trace: false,
            ptm_homology_strict: false,
            snapshot_file: None,
            save_snapshot: false,
            restore_snapshot: false,
            show_progress: false,
        }
    }
}

impl AggregatorOptions {
    pub fn organism(mut self, ncbi_tax_id: u32) -> Self {
        self.ncbi_tax_id = ncbi_tax_id;
        self.map_by_homology_from.remove(&ncbi_tax_id);
        self
    }

    pub fn input_methods<I, M>(mut self, input_methods: I) -> Self
    where
        I: IntoIterator<Item = M>,
        M: Into<InputMethod>,
    {
        self.input_methods = input_methods.into_iter().map(Into::into).collect();
        self
    }

    /// Source organisms for homology translation; the target is dropped
    pub fn map_by_homology_from(mut self, taxa: impl IntoIterator<Item = u32>) -> Self {
        self.map_by_homology_from = taxa
            .into_iter()
            .filter(|taxon| *taxon != self.ncbi_tax_id)
            .collect();
        self
    }

    pub fn nonhuman_direct_lookup(mut self, direct: bool) -> Self {
        self.nonhuman_direct_lookup = direct;
        self
    }

    pub fn inputargs(mut self, resource: &str, args: InputArgs) -> Self {
        self.inputargs.insert(resource.to_lowercase(), args);
        self
    }

    pub fn trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    pub fn ptm_homology_strict(mut self, strict: bool) -> Self {
        self.ptm_homology_strict = strict;
        self
    }

    /// Snapshot path; `save` writes it after a build
    pub fn snapshot_file(mut self, path: impl Into<PathBuf>, save: bool) -> Self {
        self.snapshot_file = Some(path.into());
        self.save_snapshot = save;
        self
    }

    /// Restore the snapshot file when it exists
    pub fn restore_snapshot(mut self, restore: bool) -> Self {
        self.restore_snapshot = restore;
        self
    }

    pub fn show_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }
}

/// A network whose edges can carry enzyme-substrate interactions
pub trait InteractionNetwork {
    fn has_interaction(&self, a: &str, b: &str) -> bool;

    fn add_ptms(&mut self, a: &str, b: &str, ptms: &[DomainMotif]);
}

/// Merged enzyme-substrate interactions of all configured resources
#[derive(Debug, Clone)]
pub struct EnzymeSubstrateAggregator {
    options: AggregatorOptions,
    enz_sub: EnzSubMap,
    references: ReferenceTable,
    ptm_to_enzyme: BTreeMap<PtmKey, BTreeSet<String>>,
    summaries: Vec<ResourceSummary>,
}

impl EnzymeSubstrateAggregator {
    pub fn new(mut options: AggregatorOptions) -> Self {
        options.map_by_homology_from.remove(&options.ncbi_tax_id);
        Self {
            options,
            enz_sub: EnzSubMap::new(),
            references: ReferenceTable::new(),
            ptm_to_enzyme: BTreeMap::new(),
            summaries: Vec::new(),
        }
    }

    pub fn options(&self) -> &AggregatorOptions {
        &self.options
    }

    pub fn ncbi_tax_id(&self) -> u32 {
        self.options.ncbi_tax_id
    }

    /// Restore the snapshot if enabled and present, otherwise process every input
    pub fn build(&mut self, services: &Services) -> Result<()> {
        if let Some(path) = self.existing_snapshot() {
            info!(path = %path.display(), "Restoring aggregate from snapshot");
            return self.load_from_snapshot(&path);
        }

        self.build_list(services)?;
        self.unique();
        self.update_ptm_to_enzyme();

        info!(
            ncbi_tax_id = self.options.ncbi_tax_id,
            pairs = self.enz_sub.len(),
            interactions = self.len(),
            "Built enzyme-substrate aggregate"
        );

        if self.options.save_snapshot {
            if let Some(path) = self.options.snapshot_file.clone() {
                self.save_to_snapshot(&path)?;
            }
        }
        Ok(())
    }

    fn existing_snapshot(&self) -> Option<PathBuf> {
        if !self.options.restore_snapshot {
            return None;
        }
        self.options
            .snapshot_file
            .as_ref()
            .filter(|path| path.is_file())
            .cloned()
    }

    /// Run the processors of every input and collect their interactions
    pub fn build_list(&mut self, services: &Services) -> Result<()> {
        let target = self.options.ncbi_tax_id;
        let direct = target == taxonomy::HUMAN || self.options.nonhuman_direct_lookup;
        let methods = self.options.input_methods.clone();

        let progress = if self.options.show_progress {
            let bar = ProgressBar::new(methods.len() as u64);
            bar.set_style(
                ProgressStyle::default_bar()
                    .template("{msg:>16} [{bar:40.cyan/blue}] {pos}/{len}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("=>-"),
            );
            bar
        } else {
            ProgressBar::hidden()
        };

        for method in &methods {
            let label = method.label();
            progress.set_message(label.clone());
            let input_args = self
                .options
                .inputargs
                .get(&label.to_lowercase())
                .cloned()
                .unwrap_or_default();

            if direct {
                let options = ProcessorOptions::new(method.clone())
                    .organism(target)
                    .trace(self.options.trace)
                    .input_args(input_args.clone());

                match EnzymeSubstrateProcessor::new(services, options) {
                    Ok(mut processor) => {
                        let before = self.len();
                        self.extend_lists(processor.iter());
                        debug!(
                            resource = processor.name(),
                            records = processor.len(),
                            interactions = self.len() - before,
                            "Processed resource"
                        );
                    },
                    Err(Error::UnsupportedOrganism { resource, ncbi_tax_id }) => {
                        info!(
                            resource = %resource,
                            ncbi_tax_id,
                            "Resource does not cover the organism, skipping direct lookup"
                        );
                    },
                    Err(e) => return Err(e),
                }
            }

            if !self.options.map_by_homology_from.is_empty() {
                let options = HomologyOptions::new(method.clone(), target)
                    .source_taxa(self.options.map_by_homology_from.iter().copied())
                    .strict(self.options.ptm_homology_strict)
                    .trace(self.options.trace)
                    .input_args(input_args);

                let mut processor = EnzymeSubstrateHomologyProcessor::new(services, options)?;
                let before = self.len();
                self.extend_lists(processor.iter());
                debug!(
                    input = %label,
                    records = processor.len(),
                    interactions = self.len() - before,
                    "Processed resource by homology"
                );
            }

            progress.inc(1);
        }

        progress.finish_and_clear();
        Ok(())
    }

    /// Add interactions to their enzyme-substrate pairs and record their references
    pub fn extend_lists(&mut self, interactions: impl IntoIterator<Item = DomainMotif>) {
        for dm in interactions {
            let key = dm.key();
            for source in &dm.sources {
                self.references
                    .entry(source.clone())
                    .or_default()
                    .entry(key.clone())
                    .or_default()
                    .extend(dm.refs.iter().cloned());
            }
            self.enz_sub.entry(key).or_default().push(dm);
        }
    }

    /// Merge equal interactions within each pair, keeping the first occurrence
    pub fn unique(&mut self) {
        for interactions in self.enz_sub.values_mut() {
            *interactions = uniq_enz_sub(std::mem::take(interactions));
        }
    }

    pub fn update_ptm_to_enzyme(&mut self) {
        self.ptm_to_enzyme.clear();
        for dm in self.enz_sub.values().flatten() {
            self.ptm_to_enzyme
                .entry(dm.ptm.key())
                .or_default()
                .insert(dm.domain.protein.clone());
        }
    }

    pub fn ptm_to_enzyme(&self) -> &BTreeMap<PtmKey, BTreeSet<String>> {
        &self.ptm_to_enzyme
    }

    /// Enzymes modifying a site
    pub fn enzymes_for_ptm(&self, key: &PtmKey) -> Option<&BTreeSet<String>> {
        self.ptm_to_enzyme.get(key)
    }

    pub fn enz_sub(&self) -> &EnzSubMap {
        &self.enz_sub
    }

    pub fn references(&self) -> &ReferenceTable {
        &self.references
    }

    pub fn iter(&self) -> impl Iterator<Item = &DomainMotif> {
        self.enz_sub.values().flatten()
    }

    /// Number of interactions
    pub fn len(&self) -> usize {
        self.enz_sub.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get_enz_sub(&self, enzyme: &str, substrate: &str) -> Option<&[DomainMotif]> {
        self.enz_sub
            .get(&(enzyme.to_string(), substrate.to_string()))
            .map(Vec::as_slice)
    }

    pub fn enz_sub_by_enzyme<'s>(&'s self, enzyme: &'s str) -> impl Iterator<Item = &'s DomainMotif> + 's {
        self.enz_sub
            .iter()
            .filter(move |((e, _), _)| e == enzyme)
            .flat_map(|(_, interactions)| interactions)
    }

    pub fn enz_sub_by_substrate<'s>(&'s self, substrate: &'s str) -> impl Iterator<Item = &'s DomainMotif> + 's {
        self.enz_sub
            .iter()
            .filter(move |((_, s), _)| s == substrate)
            .flat_map(|(_, interactions)| interactions)
    }

    /// Names of the resources contributing interactions
    pub fn resources(&self) -> BTreeSet<&str> {
        self.references.keys().map(String::as_str).collect()
    }

    /// Attach interactions to the existing edges of a network, in either direction
    ///
    /// Returns the number of edges that received interactions.
    pub fn assign_to_network(&self, network: &mut impl InteractionNetwork) -> usize {
        let mut assigned = 0;
        for ((enzyme, substrate), interactions) in &self.enz_sub {
            if network.has_interaction(enzyme, substrate) {
                network.add_ptms(enzyme, substrate, interactions);
                assigned += 1;
            } else if network.has_interaction(substrate, enzyme) {
                network.add_ptms(substrate, enzyme, interactions);
                assigned += 1;
            }
        }
        info!(edges = assigned, "Assigned interactions to network");
        assigned
    }

    pub fn save_to_snapshot(&self, path: &Path) -> Result<()> {
        snapshot::save(path, self.options.ncbi_tax_id, &self.enz_sub, &self.references)?;
        Ok(())
    }

    /// Replace the aggregate with a snapshot; the reverse index is rebuilt
    pub fn load_from_snapshot(&mut self, path: &Path) -> Result<()> {
        let (_, enz_sub, references) = snapshot::load(path)?;
        self.enz_sub = enz_sub;
        self.references = references;
        self.update_ptm_to_enzyme();
        self.summaries.clear();
        Ok(())
    }

    pub fn update_summaries(&mut self) {
        self.summaries = summary::summarize(&self.enz_sub, &self.references);
    }

    /// Summaries from the last [`EnzymeSubstrateAggregator::update_summaries`]
    pub fn summaries(&self) -> &[ResourceSummary] {
        &self.summaries
    }

    /// Summary table with its header row first
    pub fn summaries_tab(&self) -> Vec<Vec<String>> {
        let (header, rows) = summary::table(&self.summaries);
        std::iter::once(header).chain(rows).collect()
    }

    /// Write the summaries, computing them first when needed
    pub fn export_summaries(&mut self, path: &Path) -> Result<()> {
        if self.summaries.is_empty() {
            self.update_summaries();
        }
        summary::write_summaries(path, &self.summaries)
    }

    /// One row per enzyme, substrate, residue and modification type
    pub fn make_df(&self, mapper: &dyn IdMapper, tax_id: bool) -> Vec<EnzSubRow> {
        export::rows(&self.enz_sub, mapper, self.options.ncbi_tax_id, tax_id)
    }

    pub fn export_table(&self, path: &Path, mapper: &dyn IdMapper, tax_id: bool) -> Result<()> {
        export::write_rows(path, &self.make_df(mapper, tax_id), tax_id)
    }
}

/// Merge equal interactions into their first occurrence
pub fn uniq_enz_sub(interactions: Vec<DomainMotif>) -> Vec<DomainMotif> {
    let mut unique: Vec<DomainMotif> = Vec::with_capacity(interactions.len());
    for dm in interactions {
        match unique.iter_mut().find(|u| u.same_interaction(&dm)) {
            Some(existing) => existing.merge(&dm),
            None => unique.push(dm),
        }
    }
    unique
}

/// Interaction keys shared by a list of interactions
pub fn interaction_keys<'d>(interactions: impl IntoIterator<Item = &'d DomainMotif>) -> BTreeSet<InteractionKey> {
    interactions.into_iter().map(DomainMotif::key).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::homology::OrthologyTable;
    use crate::inputs::{FnInput, InputRegistry, Resource};
    use crate::mapping::MappingTable;
    use crate::models::{Domain, Motif, Ptm, Residue, DEFAULT_MODIFICATION};
    use crate::record::RawPtmRecord;
    use crate::sequence::{ProteinSequence, ProteomeStore};
    use proptest::prelude::*;

    fn interaction(resnum: u32, source: &str, refs: &[&str]) -> DomainMotif {
        let residue = Residue::new(resnum, 'S', "P04637", 1);
        let motif = Motif {
            protein: "P04637".to_string(),
            start: resnum,
            end: resnum,
            instance: "S".to_string(),
            isoform: 1,
        };
        DomainMotif::new(
            Domain::new("P31749"),
            Ptm::new(motif, residue, DEFAULT_MODIFICATION, source),
            source,
            refs.iter().copied(),
        )
    }

    fn services() -> Services {
        let mapper = MappingTable::new();
        mapper.insert(ptmnet_common::IdType::GeneSymbol, ptmnet_common::IdType::Uniprot, 9606, "AKT1", "P31749");
        mapper.insert(ptmnet_common::IdType::GeneSymbol, ptmnet_common::IdType::Uniprot, 9606, "TP53", "P04637");

        let store = ProteomeStore::new();
        store.insert(ProteinSequence::new("P31749", 9606, "MSDVAIVKEG"));
        store.insert(ProteinSequence::new("P04637", 9606, "MEEPQSDPSVEPPLSQETFSDLWKLLPENN"));

        let mut inputs = InputRegistry::new();
        inputs.register(
            Resource::Hprd,
            FnInput::new("HPRD", |_: &InputArgs| {
                Ok(vec![RawPtmRecord::new(["AKT1"], "TP53", 'S', 15).with_references(["1", "2"])])
            }),
        );
        inputs.register(
            Resource::Signor,
            FnInput::new("SIGNOR", |_: &InputArgs| {
                Ok(vec![
                    RawPtmRecord::new(["P31749"], "P04637", 'S', 15).with_references(["2", "3"]),
                    RawPtmRecord::new(["P31749"], "P04637", 'S', 20),
                ])
            }),
        );
        Services::new(mapper, store, OrthologyTable::new(), inputs)
    }

    #[test]
    fn test_unique_merges_provenance() {
        let mut aggregator = EnzymeSubstrateAggregator::new(AggregatorOptions::default());
        aggregator.extend_lists([
            interaction(15, "HPRD", &["1"]),
            interaction(20, "HPRD", &[]),
            interaction(15, "SIGNOR", &["2"]),
        ]);
        assert_eq!(aggregator.len(), 3);

        aggregator.unique();
        assert_eq!(aggregator.len(), 2);
        let merged = &aggregator.get_enz_sub("P31749", "P04637").unwrap()[0];
        assert_eq!(merged.ptm.residue.number, 15);
        assert_eq!(merged.sources.len(), 2);
        assert_eq!(merged.refs.len(), 2);

        let snapshot = aggregator.enz_sub().clone();
        aggregator.unique();
        assert_eq!(aggregator.enz_sub(), &snapshot);
    }

    #[test]
    fn test_build_merges_two_resources() {
        let services = services();
        let options = AggregatorOptions::default().input_methods([Resource::Hprd, Resource::Signor]);
        let mut aggregator = EnzymeSubstrateAggregator::new(options);
        aggregator.build(&services).unwrap();

        let interactions = aggregator.get_enz_sub("P31749", "P04637").unwrap();
        assert_eq!(interactions.len(), 2);

        let s15 = &interactions[0];
        assert_eq!(s15.ptm.residue.number, 15);
        assert_eq!(s15.sources, BTreeSet::from(["HPRD".to_string(), "SIGNOR".to_string()]));
        assert_eq!(s15.refs.len(), 3);

        let key = ("P31749".to_string(), "P04637".to_string());
        assert_eq!(aggregator.references()["HPRD"][&key].len(), 2);
        assert_eq!(aggregator.references()["SIGNOR"][&key].len(), 2);
        assert_eq!(aggregator.resources(), BTreeSet::from(["HPRD", "SIGNOR"]));

        assert_eq!(aggregator.enzymes_for_ptm(&s15.ptm.key()).unwrap().len(), 1);
        assert_eq!(aggregator.enz_sub_by_enzyme("P31749").count(), 2);
        assert_eq!(aggregator.enz_sub_by_substrate("P31749").count(), 0);
    }

    #[test]
    fn test_human_only_resource_is_skipped_for_mouse() {
        let services = services();
        let options = AggregatorOptions::default()
            .organism(10090)
            .input_methods([Resource::Hprd]);
        let mut aggregator = EnzymeSubstrateAggregator::new(options);

        aggregator.build(&services).unwrap();
        assert!(aggregator.is_empty());
    }

    #[test]
    fn test_snapshot_restores_reverse_index() {
        let services = services();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("enz_sub.snapshot");

        let options = AggregatorOptions::default()
            .input_methods([Resource::Hprd, Resource::Signor])
            .snapshot_file(&path, true);
        let mut built = EnzymeSubstrateAggregator::new(options.clone());
        built.build(&services).unwrap();
        assert!(path.is_file());

        // Restored without any input
        let mut restored = EnzymeSubstrateAggregator::new(options.restore_snapshot(true));
        restored.build(&Services::new(
            MappingTable::new(),
            ProteomeStore::new(),
            OrthologyTable::new(),
            InputRegistry::new(),
        ))
        .unwrap();

        assert_eq!(restored.enz_sub(), built.enz_sub());
        assert_eq!(restored.references(), built.references());
        assert_eq!(restored.ptm_to_enzyme(), built.ptm_to_enzyme());
    }

    #[test]
    fn test_build_overwrites_existing_snapshot() {
        let services = services();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("enz_sub.snapshot");
        EnzymeSubstrateAggregator::new(AggregatorOptions::default())
            .save_to_snapshot(&path)
            .unwrap();

        let options = AggregatorOptions::default()
            .input_methods([Resource::Hprd])
            .snapshot_file(&path, true);
        let mut built = EnzymeSubstrateAggregator::new(options.clone());
        built.build(&services).unwrap();
        assert_eq!(built.len(), 1);

        let options = options
            .input_methods(Vec::<InputMethod>::new())
            .restore_snapshot(true);
        let mut restored = EnzymeSubstrateAggregator::new(options);
        restored.build(&services).unwrap();
        assert_eq!(restored.enz_sub(), built.enz_sub());
    }

    #[derive(Default)]
    struct Edges {
        edges: BTreeMap<(String, String), Vec<DomainMotif>>,
    }

    impl InteractionNetwork for Edges {
        fn has_interaction(&self, a: &str, b: &str) -> bool {
            self.edges.contains_key(&(a.to_string(), b.to_string()))
        }

        fn add_ptms(&mut self, a: &str, b: &str, ptms: &[DomainMotif]) {
            if let Some(edge) = self.edges.get_mut(&(a.to_string(), b.to_string())) {
                edge.extend_from_slice(ptms);
            }
        }
    }

    #[test]
    fn test_assign_to_network_in_either_direction() {
        let mut aggregator = EnzymeSubstrateAggregator::new(AggregatorOptions::default());
        aggregator.extend_lists([interaction(15, "HPRD", &["1"])]);

        let mut network = Edges::default();
        network.edges.insert(("P04637".to_string(), "P31749".to_string()), Vec::new());
        network.edges.insert(("P00533".to_string(), "P04637".to_string()), Vec::new());

        assert_eq!(aggregator.assign_to_network(&mut network), 1);
        assert_eq!(network.edges[&("P04637".to_string(), "P31749".to_string())].len(), 1);
    }

    #[test]
    fn test_homology_sources_drop_target() {
        let options = AggregatorOptions::default()
            .organism(10090)
            .map_by_homology_from([9606, 10090]);
        assert_eq!(options.map_by_homology_from, BTreeSet::from([9606]));

        let aggregator = EnzymeSubstrateAggregator::new(AggregatorOptions {
            map_by_homology_from: BTreeSet::from([9606, 10116]),
            ncbi_tax_id: 9606,
            ..Default::default()
        });
        assert_eq!(aggregator.options().map_by_homology_from, BTreeSet::from([10116]));
    }

    proptest! {
        #[test]
        fn prop_merge_is_order_independent(
            specs in prop::collection::vec((10u32..13, 0usize..3, 0usize..4), 1..12),
        ) {
            let sources = ["HPRD", "SIGNOR", "KEA"];
            let refs = ["1", "2", "3", "4"];
            let interactions: Vec<_> = specs
                .iter()
                .map(|(resnum, s, r)| interaction(*resnum, sources[*s], &[refs[*r]]))
                .collect();

            let mut reversed = interactions.clone();
            reversed.reverse();

            let mut forward = uniq_enz_sub(interactions);
            let mut backward = uniq_enz_sub(reversed);
            forward.sort_by_key(|dm| dm.ptm.key());
            backward.sort_by_key(|dm| dm.ptm.key());

            prop_assert_eq!(forward.len(), backward.len());
            for (f, b) in forward.iter().zip(&backward) {
                prop_assert!(f.same_interaction(b));
                prop_assert_eq!(&f.sources, &b.sources);
                prop_assert_eq!(&f.refs, &b.refs);
            }
            prop_assert_eq!(interaction_keys(&forward), interaction_keys(&backward));
        }
    }
}

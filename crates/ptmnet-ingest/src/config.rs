//! Configuration management

use ptmnet_common::taxonomy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::aggregator::AggregatorOptions;
use crate::inputs::{InputMethod, Resource};

// ============================================================================
// Data Layout Constants
// ============================================================================

/// Default directory of the resource tables.
pub const DEFAULT_DATA_DIR: &str = "./data";

/// Default directory of the `{ncbi_tax_id}.fasta[.gz]` proteomes.
pub const DEFAULT_PROTEOME_DIR: &str = "./data/proteomes";

/// Default directory of the `{from}_{to}_{ncbi_tax_id}.tsv` mapping tables.
pub const DEFAULT_MAPPING_DIR: &str = "./data/mapping";

/// Default directory of the orthology tables.
pub const DEFAULT_ORTHOLOGY_DIR: &str = "./data/orthology";

// ============================================================================
// Aggregation Constants
// ============================================================================

/// Default target organism (human).
pub const DEFAULT_NCBI_TAX_ID: u32 = taxonomy::HUMAN;

/// Default for querying resources directly for non-human targets.
pub const DEFAULT_NONHUMAN_DIRECT_LOOKUP: bool = true;

/// Default for translating sites by curated homology only.
pub const DEFAULT_PTM_HOMOLOGY_STRICT: bool = false;

/// Ingestion configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestConfig {
    pub data_dir: PathBuf,
    pub proteome_dir: PathBuf,
    pub mapping_dir: PathBuf,
    pub orthology_dir: PathBuf,
    /// Snapshot to restore from, or to write after a build
    pub snapshot_file: Option<PathBuf>,
    pub ncbi_tax_id: u32,
    /// Source organisms for homology translation
    pub homology_from: Vec<u32>,
    /// Resource names; empty means the default inputs
    pub resources: Vec<String>,
    pub ptm_homology_strict: bool,
    pub nonhuman_direct_lookup: bool,
    pub trace: bool,
}

impl IngestConfig {
    /// Load configuration from environment and defaults
    ///
    /// - `PTMNET_DATA_DIR`, `PTMNET_PROTEOME_DIR`, `PTMNET_MAPPING_DIR`,
    ///   `PTMNET_ORTHOLOGY_DIR`: data layout
    /// - `PTMNET_SNAPSHOT`: snapshot file
    /// - `PTMNET_ORGANISM`: taxonomy id or organism name
    /// - `PTMNET_HOMOLOGY_FROM`: comma separated taxonomy ids or names
    /// - `PTMNET_RESOURCES`: comma separated resource names
    /// - `PTMNET_HOMOLOGY_STRICT`, `PTMNET_NONHUMAN_DIRECT_LOOKUP`, `PTMNET_TRACE`: true/false
    pub fn load() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from any variable source
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let ncbi_tax_id = match var("PTMNET_ORGANISM") {
            Some(organism) => taxonomy::ensure_ncbi_tax_id(&organism)?,
            None => DEFAULT_NCBI_TAX_ID,
        };

        let homology_from = var("PTMNET_HOMOLOGY_FROM")
            .map(|list| {
                split_list(&list)
                    .map(|organism| taxonomy::ensure_ncbi_tax_id(&organism))
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()?
            .unwrap_or_default();

        let config = IngestConfig {
            data_dir: var("PTMNET_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
            proteome_dir: var("PTMNET_PROTEOME_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_PROTEOME_DIR)),
            mapping_dir: var("PTMNET_MAPPING_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_MAPPING_DIR)),
            orthology_dir: var("PTMNET_ORTHOLOGY_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_ORTHOLOGY_DIR)),
            snapshot_file: var("PTMNET_SNAPSHOT").map(PathBuf::from),
            ncbi_tax_id,
            homology_from,
            resources: var("PTMNET_RESOURCES")
                .map(|list| split_list(&list).collect())
                .unwrap_or_default(),
            ptm_homology_strict: var("PTMNET_HOMOLOGY_STRICT")
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_PTM_HOMOLOGY_STRICT),
            nonhuman_direct_lookup: var("PTMNET_NONHUMAN_DIRECT_LOOKUP")
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_NONHUMAN_DIRECT_LOOKUP),
            trace: var("PTMNET_TRACE")
                .and_then(|s| s.parse().ok())
                .unwrap_or(false),
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.ncbi_tax_id == 0 {
            anyhow::bail!("Target organism must be a valid NCBI Taxonomy id");
        }

        if self.homology_from.contains(&0) {
            anyhow::bail!("Homology source organisms must be valid NCBI Taxonomy ids");
        }

        if self.resources.iter().any(|name| name.trim().is_empty()) {
            anyhow::bail!("Resource names cannot be empty");
        }

        // Unknown names may still be registered as custom inputs
        for name in &self.resources {
            if name.parse::<Resource>().is_err() {
                tracing::warn!(resource = %name, "Not a built-in resource");
            }
        }

        if !self.data_dir.is_dir() {
            tracing::warn!(
                data_dir = %self.data_dir.display(),
                "Data directory does not exist - resources will yield no records"
            );
        }

        Ok(())
    }

    /// Create a builder for fluent configuration
    pub fn builder() -> IngestConfigBuilder {
        IngestConfigBuilder::default()
    }

    /// Aggregator options for this configuration
    pub fn to_aggregator_options(&self) -> AggregatorOptions {
        let mut options = AggregatorOptions::default()
            .organism(self.ncbi_tax_id)
            .map_by_homology_from(self.homology_from.iter().copied())
            .nonhuman_direct_lookup(self.nonhuman_direct_lookup)
            .ptm_homology_strict(self.ptm_homology_strict)
            .trace(self.trace);

        if !self.resources.is_empty() {
            options = options.input_methods(self.resources.iter().cloned().map(InputMethod::from));
        }
        if let Some(snapshot_file) = &self.snapshot_file {
            options = options.snapshot_file(snapshot_file, true).restore_snapshot(true);
        }
        options
    }
}

/// Builder for IngestConfig
#[derive(Default)]
pub struct IngestConfigBuilder {
    config: IngestConfig,
}

impl IngestConfigBuilder {
    /// Data directory; the proteome, mapping and orthology directories are its subdirectories
    pub fn data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        self.config.proteome_dir = dir.join("proteomes");
        self.config.mapping_dir = dir.join("mapping");
        self.config.orthology_dir = dir.join("orthology");
        self.config.data_dir = dir;
        self
    }

    pub fn proteome_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.proteome_dir = dir.into();
        self
    }

    pub fn snapshot_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.snapshot_file = Some(path.into());
        self
    }

    pub fn ncbi_tax_id(mut self, ncbi_tax_id: u32) -> Self {
        self.config.ncbi_tax_id = ncbi_tax_id;
        self
    }

    pub fn homology_from(mut self, taxa: impl IntoIterator<Item = u32>) -> Self {
        self.config.homology_from = taxa.into_iter().collect();
        self
    }

    pub fn resources<I, S>(mut self, resources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.resources = resources.into_iter().map(Into::into).collect();
        self
    }

    pub fn ptm_homology_strict(mut self, strict: bool) -> Self {
        self.config.ptm_homology_strict = strict;
        self
    }

    pub fn nonhuman_direct_lookup(mut self, direct: bool) -> Self {
        self.config.nonhuman_direct_lookup = direct;
        self
    }

    pub fn trace(mut self, trace: bool) -> Self {
        self.config.trace = trace;
        self
    }

    pub fn build(self) -> IngestConfig {
        self.config
    }
}

fn split_list(list: &str) -> impl Iterator<Item = String> + '_ {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            proteome_dir: PathBuf::from(DEFAULT_PROTEOME_DIR),
            mapping_dir: PathBuf::from(DEFAULT_MAPPING_DIR),
            orthology_dir: PathBuf::from(DEFAULT_ORTHOLOGY_DIR),
            snapshot_file: None,
            ncbi_tax_id: DEFAULT_NCBI_TAX_ID,
            homology_from: Vec::new(),
            resources: Vec::new(),
            ptm_homology_strict: DEFAULT_PTM_HOMOLOGY_STRICT,
            nonhuman_direct_lookup: DEFAULT_NONHUMAN_DIRECT_LOOKUP,
            trace: false,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::collections::{BTreeSet, HashMap};

    fn from_vars(vars: &[(&str, &str)]) -> anyhow::Result<IngestConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        IngestConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = from_vars(&[]).unwrap();
        assert_eq!(config, IngestConfig::default());
        assert_eq!(config.proteome_dir, PathBuf::from("./data/proteomes"));
    }

    #[test]
    fn test_organisms_by_name() {
        let config = from_vars(&[
            ("PTMNET_ORGANISM", "mouse"),
            ("PTMNET_HOMOLOGY_FROM", "9606, rat"),
            ("PTMNET_RESOURCES", "SIGNOR,PhosphoSite"),
            ("PTMNET_HOMOLOGY_STRICT", "true"),
        ])
        .unwrap();

        assert_eq!(config.ncbi_tax_id, 10090);
        assert_eq!(config.homology_from, vec![9606, 10116]);
        assert_eq!(config.resources, vec!["SIGNOR", "PhosphoSite"]);
        assert!(config.ptm_homology_strict);
    }

    #[test]
    fn test_unknown_organism_is_rejected() {
        assert!(from_vars(&[("PTMNET_ORGANISM", "unicorn")]).is_err());
        assert!(from_vars(&[("PTMNET_ORGANISM", "0")]).is_err());
    }

    #[test]
    fn test_builder_data_dir_layout() {
        let config = IngestConfig::builder()
            .data_dir("/srv/ptmnet")
            .proteome_dir("/srv/uniprot")
            .build();

        assert_eq!(config.mapping_dir, PathBuf::from("/srv/ptmnet/mapping"));
        assert_eq!(config.orthology_dir, PathBuf::from("/srv/ptmnet/orthology"));
        assert_eq!(config.proteome_dir, PathBuf::from("/srv/uniprot"));
    }

    #[test]
    fn test_aggregator_options() {
        let config = IngestConfig::builder()
            .ncbi_tax_id(10090)
            .homology_from([9606, 10090])
            .resources(["HPRD"])
            .snapshot_file("cache/mouse.snapshot")
            .build();
        let options = config.to_aggregator_options();

        assert_eq!(options.ncbi_tax_id, 10090);
        assert_eq!(options.map_by_homology_from, BTreeSet::from([9606]));
        assert_eq!(options.input_methods.len(), 1);
        assert_eq!(options.input_methods[0].label(), "HPRD");
        assert!(options.save_snapshot);
        assert!(options.restore_snapshot);
    }
}

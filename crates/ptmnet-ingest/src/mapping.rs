//! Identifier mapping
//!
//! Raw records name enzymes and substrates by gene symbol, UniProt or RefSeq
//! protein ids. Processors translate every name to all plausible UniProt
//! accessions of the target organism through an [`IdMapper`].
//!
//! [`MappingTable`] loads mapping files lazily, per (from, to, organism):
//!
//! ```text
//! <mapping_dir>/<from>_<to>_<ncbi_tax_id>.tsv[.gz]   two columns, from -> to
//! <mapping_dir>/<to>_<from>_<ncbi_tax_id>.tsv[.gz]   read reversed
//! <proteome_dir>/<ncbi_tax_id>.fasta[.gz]            GN= tags, genesymbol <-> uniprot
//! ```

use ptmnet_common::{IdType, Result};
use regex::Regex;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, PoisonError, RwLock};
use tracing::{debug, warn};

use crate::io::{find_file, open_reader, tsv_reader};
use crate::sequence::parse_fasta;

static UNIPROT_ACCESSION: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"^([OPQ][0-9][A-Z0-9]{3}[0-9]|[A-NR-Z][0-9]([A-Z][A-Z0-9]{2}[0-9]){1,2})(-\d+)?$").ok()
});

/// True for a syntactically valid UniProtKB accession, isoform suffix allowed
pub fn is_uniprot_accession(name: &str) -> bool {
    UNIPROT_ACCESSION
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(name))
}

/// Organism-aware identifier translation
pub trait IdMapper {
    /// Every target identifier `name` maps to; empty when unmappable
    fn map_name(&self, name: &str, from: IdType, to: IdType, ncbi_tax_id: u32) -> BTreeSet<String>;

    /// Union of [`IdMapper::map_name`] over several names
    fn map_names(&self, names: &[String], from: IdType, to: IdType, ncbi_tax_id: u32) -> BTreeSet<String> {
        names
            .iter()
            .flat_map(|name| self.map_name(name, from, to, ncbi_tax_id))
            .collect()
    }
}

type TableKey = (IdType, IdType, u32);

#[derive(Debug, Default)]
struct MappingState {
    tables: HashMap<TableKey, HashMap<String, BTreeSet<String>>>,
    loaded: HashSet<TableKey>,
}

/// In-memory [`IdMapper`], optionally backed by mapping files
#[derive(Debug, Default)]
pub struct MappingTable {
    mapping_dir: Option<PathBuf>,
    proteome_dir: Option<PathBuf>,
    state: RwLock<MappingState>,
}

impl MappingTable {
    /// Empty table; pairs are added with [`MappingTable::insert`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load two-column mapping files from `dir` on demand
    pub fn with_mapping_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.mapping_dir = Some(dir.into());
        self
    }

    /// Derive gene symbol mappings from the `GN=` tags of proteome FASTA files
    pub fn with_proteome_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.proteome_dir = Some(dir.into());
        self
    }

    /// Add one pair, and its reverse
    pub fn insert(&self, from: IdType, to: IdType, ncbi_tax_id: u32, name: &str, target: &str) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        insert_pair(&mut state, (from, to, ncbi_tax_id), name, target);
    }

    fn ensure_loaded(&self, key: TableKey) {
        {
            let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
            if state.loaded.contains(&key) {
                return;
            }
        }

        let pairs = match self.read_pairs(key) {
            Ok(pairs) => pairs,
            Err(e) => {
                warn!(
                    from = key.0.as_str(),
                    to = key.1.as_str(),
                    ncbi_tax_id = key.2,
                    error = %e,
                    "Failed to load mapping table"
                );
                Vec::new()
            },
        };

        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        for (name, target) in &pairs {
            insert_pair(&mut state, key, name, target);
        }
        state.loaded.insert(key);
        state.loaded.insert((key.1, key.0, key.2));
    }

    /// Pairs oriented `from -> to` from the first source that exists
    fn read_pairs(&self, (from, to, ncbi_tax_id): TableKey) -> Result<Vec<(String, String)>> {
        if let Some(dir) = &self.mapping_dir {
            let forward = format!("{}_{}_{}", from.as_str(), to.as_str(), ncbi_tax_id);
            if let Some(path) = find_file(dir, &forward, &["tsv"]) {
                return read_two_columns(&path, false);
            }
            let reverse = format!("{}_{}_{}", to.as_str(), from.as_str(), ncbi_tax_id);
            if let Some(path) = find_file(dir, &reverse, &["tsv"]) {
                return read_two_columns(&path, true);
            }
        }

        let gene_symbol_pair = matches!(
            (from, to),
            (IdType::GeneSymbol, IdType::Uniprot) | (IdType::Uniprot, IdType::GeneSymbol)
        );
        if let (true, Some(dir)) = (gene_symbol_pair, &self.proteome_dir) {
            if let Some(path) = find_file(dir, &ncbi_tax_id.to_string(), &["fasta", "fa"]) {
                let pairs = read_gene_names(&path, ncbi_tax_id)?;
                return Ok(if from == IdType::GeneSymbol {
                    pairs
                } else {
                    pairs.into_iter().map(|(g, u)| (u, g)).collect()
                });
            }
        }

        debug!(
            from = from.as_str(),
            to = to.as_str(),
            ncbi_tax_id,
            "No mapping source available"
        );
        Ok(Vec::new())
    }

    fn lookup(&self, key: TableKey, name: &str) -> BTreeSet<String> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        let Some(table) = state.tables.get(&key) else {
            return BTreeSet::new();
        };
        table
            .get(name)
            .or_else(|| table.get(&name.to_ascii_uppercase()))
            .cloned()
            .unwrap_or_default()
    }
}

fn insert_pair(state: &mut MappingState, (from, to, ncbi_tax_id): TableKey, name: &str, target: &str) {
    state
        .tables
        .entry((from, to, ncbi_tax_id))
        .or_default()
        .entry(name.to_string())
        .or_default()
        .insert(target.to_string());
    state
        .tables
        .entry((to, from, ncbi_tax_id))
        .or_default()
        .entry(target.to_string())
        .or_default()
        .insert(name.to_string());
}

fn read_two_columns(path: &Path, reversed: bool) -> Result<Vec<(String, String)>> {
    let mut reader = tsv_reader(open_reader(path)?);
    let mut pairs = Vec::new();

    for row in reader.records() {
        let row = row?;
        let (Some(a), Some(b)) = (row.get(0), row.get(1)) else {
            continue;
        };
        let (a, b) = (a.trim(), b.trim());
        if a.is_empty() || b.is_empty() {
            continue;
        }
        pairs.push(if reversed {
            (b.to_string(), a.to_string())
        } else {
            (a.to_string(), b.to_string())
        });
    }

    debug!(path = %path.display(), pairs = pairs.len(), "Read mapping table");
    Ok(pairs)
}

/// (gene symbol, accession) pairs of the canonical entries of a proteome
fn read_gene_names(path: &Path, ncbi_tax_id: u32) -> Result<Vec<(String, String)>> {
    Ok(parse_fasta(open_reader(path)?)?
        .into_iter()
        .filter(|entry| entry.isoform == 1 && entry.ncbi_tax_id.is_none_or(|t| t == ncbi_tax_id))
        .filter_map(|entry| entry.gene_name.map(|gene| (gene, entry.accession)))
        .collect())
}

impl IdMapper for MappingTable {
    fn map_name(&self, name: &str, from: IdType, to: IdType, ncbi_tax_id: u32) -> BTreeSet<String> {
        let name = name.trim();
        if name.is_empty() {
            return BTreeSet::new();
        }

        if from == to {
            return match to {
                IdType::Uniprot if !is_uniprot_accession(name) => BTreeSet::new(),
                IdType::Uniprot => {
                    let base = name.split_once('-').map_or(name, |(base, _)| base);
                    BTreeSet::from([base.to_string()])
                },
                _ => BTreeSet::from([name.to_string()]),
            };
        }

        let key = (from, to, ncbi_tax_id);
        self.ensure_loaded(key);
        self.lookup(key, name)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_uniprot_accession_pattern() {
        assert!(is_uniprot_accession("P04637"));
        assert!(is_uniprot_accession("P04637-2"));
        assert!(is_uniprot_accession("A0A024R161"));
        assert!(!is_uniprot_accession("TP53"));
        assert!(!is_uniprot_accession("NP_000537"));
    }

    #[test]
    fn test_uniprot_identity_drops_isoform_suffix() {
        let mapper = MappingTable::new();
        let mapped = mapper.map_name("P04637-2", IdType::Uniprot, IdType::Uniprot, 9606);
        assert_eq!(mapped, BTreeSet::from(["P04637".to_string()]));
        assert!(mapper
            .map_name("TP53", IdType::Uniprot, IdType::Uniprot, 9606)
            .is_empty());
    }

    #[test]
    fn test_insert_is_bidirectional_and_organism_scoped() {
        let mapper = MappingTable::new();
        mapper.insert(IdType::GeneSymbol, IdType::Uniprot, 9606, "AKT1", "P31749");

        assert_eq!(
            mapper.map_name("AKT1", IdType::GeneSymbol, IdType::Uniprot, 9606),
            BTreeSet::from(["P31749".to_string()])
        );
        assert_eq!(
            mapper.map_name("P31749", IdType::Uniprot, IdType::GeneSymbol, 9606),
            BTreeSet::from(["AKT1".to_string()])
        );
        assert!(mapper
            .map_name("AKT1", IdType::GeneSymbol, IdType::Uniprot, 10090)
            .is_empty());
    }

    #[test]
    fn test_map_names_unions() {
        let mapper = MappingTable::new();
        mapper.insert(IdType::GeneSymbol, IdType::Uniprot, 9606, "AKT1", "P31749");
        mapper.insert(IdType::GeneSymbol, IdType::Uniprot, 9606, "AKT2", "P31751");

        let names = vec!["AKT1".to_string(), "AKT2".to_string(), "NOPE".to_string()];
        let mapped = mapper.map_names(&names, IdType::GeneSymbol, IdType::Uniprot, 9606);
        assert_eq!(mapped.len(), 2);
    }

    #[test]
    fn test_files_forward_reverse_and_fasta() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("refseqp_uniprot_9606.tsv"),
            "refseqp\tuniprot\nNP_000537\tP04637\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("9606.fasta"),
            ">sp|P31749|AKT1_HUMAN RAC-alpha OS=Homo sapiens OX=9606 GN=AKT1 PE=1\nMSDVAIVKEG\n",
        )
        .unwrap();

        let mapper = MappingTable::new()
            .with_mapping_dir(dir.path())
            .with_proteome_dir(dir.path());

        assert_eq!(
            mapper.map_name("NP_000537", IdType::RefSeqProtein, IdType::Uniprot, 9606),
            BTreeSet::from(["P04637".to_string()])
        );
        assert_eq!(
            mapper.map_name("P04637", IdType::Uniprot, IdType::RefSeqProtein, 9606),
            BTreeSet::from(["NP_000537".to_string()])
        );
        assert_eq!(
            mapper.map_name("akt1", IdType::GeneSymbol, IdType::Uniprot, 9606),
            BTreeSet::from(["P31749".to_string()])
        );
    }
}

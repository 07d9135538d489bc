//! Protein sequences and the proteome store
//!
//! Modification sites are only accepted when the claimed residue really exists
//! in a known isoform. [`SequenceStore`] is the capability the processors use
//! for that; [`ProteomeStore`] implements it over UniProt FASTA files, one per
//! organism (`<dir>/<ncbi_tax_id>.fasta[.gz]`), with isoforms as `ACC-N` entries.

use ptmnet_common::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info, warn};

use crate::io::{find_file, open_reader};

/// Residues on each side of a site in a derived motif window
pub const DEFAULT_FLANK: u32 = 7;

/// A sequence window: `instance` is `start..=end` (1-based) of an isoform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub start: u32,
    pub end: u32,
    pub instance: String,
}

/// Canonical sequence and isoforms of one UniProt entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProteinSequence {
    pub accession: String,
    pub ncbi_tax_id: u32,
    isoforms: BTreeMap<u32, String>,
}

impl ProteinSequence {
    /// New entry with its canonical sequence as isoform 1
    pub fn new(accession: impl Into<String>, ncbi_tax_id: u32, canonical: &str) -> Self {
        let mut sequence = Self {
            accession: accession.into(),
            ncbi_tax_id,
            isoforms: BTreeMap::new(),
        };
        sequence.add_isoform(1, canonical);
        sequence
    }

    pub fn add_isoform(&mut self, isoform: u32, sequence: &str) {
        self.isoforms.insert(isoform, sequence.trim().to_ascii_uppercase());
    }

    pub fn with_isoform(mut self, isoform: u32, sequence: &str) -> Self {
        self.add_isoform(isoform, sequence);
        self
    }

    /// Isoform indices in ascending order
    pub fn isoforms(&self) -> impl Iterator<Item = u32> + '_ {
        self.isoforms.keys().copied()
    }

    pub fn isoform(&self, isoform: u32) -> Option<&str> {
        self.isoforms.get(&isoform).map(String::as_str)
    }

    pub fn residue_at(&self, resnum: u32, isoform: u32) -> Option<char> {
        let index = usize::try_from(resnum.checked_sub(1)?).ok()?;
        self.isoform(isoform)?.as_bytes().get(index).map(|b| *b as char)
    }

    /// Residue letter at `resnum` equals `residue`
    pub fn match_residue(&self, residue: char, resnum: u32, isoform: u32) -> bool {
        self.residue_at(resnum, isoform)
            .is_some_and(|aa| aa.eq_ignore_ascii_case(&residue))
    }

    /// `start..=end`, 1-based and inclusive
    pub fn slice(&self, start: u32, end: u32, isoform: u32) -> Option<&str> {
        if start == 0 || end < start {
            return None;
        }
        self.isoform(isoform)?.get((start - 1) as usize..end as usize)
    }

    /// Literal `instance` found at `start..=end`
    pub fn match_instance(&self, instance: &str, start: u32, end: u32, isoform: u32) -> bool {
        self.slice(start, end, isoform)
            .is_some_and(|window| window.eq_ignore_ascii_case(instance))
    }

    /// Bounds of the first occurrence of `instance` that covers `resnum`
    pub fn locate_instance(&self, instance: &str, resnum: u32, isoform: u32) -> Option<(u32, u32)> {
        let sequence = self.isoform(isoform)?.as_bytes();
        let needle = instance.to_ascii_uppercase().into_bytes();
        if needle.is_empty() || needle.len() > sequence.len() {
            return None;
        }
        let width = needle.len() as u32;

        sequence
            .windows(needle.len())
            .enumerate()
            .filter(|(_, window)| *window == needle.as_slice())
            .map(|(i, _)| i as u32 + 1)
            .find(|&start| start <= resnum && resnum < start + width)
            .map(|start| (start, start + width - 1))
    }

    /// Window for a site
    ///
    /// Explicit bounds win, clipped to the sequence; otherwise `resnum` +/-
    /// [`DEFAULT_FLANK`] clipped to the sequence.
    pub fn region(&self, resnum: u32, start: Option<u32>, end: Option<u32>, isoform: u32) -> Option<Region> {
        let length = self.isoform(isoform)?.len() as u32;
        let (start, end) = match (start, end) {
            (Some(start), Some(end)) if start.max(1) <= end.min(length) => (start.max(1), end.min(length)),
            _ => {
                if resnum == 0 || resnum > length {
                    return None;
                }
                (
                    resnum.saturating_sub(DEFAULT_FLANK).max(1),
                    (resnum + DEFAULT_FLANK).min(length),
                )
            },
        };

        self.slice(start, end, isoform).map(|instance| Region {
            start,
            end,
            instance: instance.to_string(),
        })
    }
}

/// Access to protein sequences, per organism
pub trait SequenceStore {
    /// Make the proteome of an organism available; loading twice is a no-op
    fn load_proteome(&self, ncbi_tax_id: u32) -> Result<()>;

    fn sequence(&self, accession: &str) -> Option<Arc<ProteinSequence>>;

    /// Organism an accession belongs to
    fn organism(&self, accession: &str) -> Option<u32> {
        self.sequence(accession).map(|s| s.ncbi_tax_id)
    }
}

/// One record of a UniProt FASTA file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FastaEntry {
    /// Accession without isoform suffix
    pub accession: String,
    pub isoform: u32,
    pub ncbi_tax_id: Option<u32>,
    pub gene_name: Option<String>,
    pub sequence: String,
}

/// Parse UniProt FASTA
///
/// # Format
/// ```text
/// >sp|{accession}[-{isoform}]|{entry_name} {protein_name} OS={organism} OX={taxid} GN={gene}
/// {sequence wrapped at 60 chars}
/// ```
pub fn parse_fasta<R: BufRead>(reader: R) -> Result<Vec<FastaEntry>> {
    let mut entries = Vec::new();
    let mut current: Option<FastaEntry> = None;

    for line in reader.lines() {
        let line = line?;
        let line = line.trim_end();

        if let Some(header) = line.strip_prefix('>') {
            entries.extend(current.take());
            current = Some(parse_header(header)?);
        } else if let Some(entry) = current.as_mut() {
            entry.sequence.push_str(line.trim());
        } else if !line.trim().is_empty() {
            return Err(Error::parse("FASTA sequence line before the first header"));
        }
    }
    entries.extend(current);

    Ok(entries)
}

fn parse_header(header: &str) -> Result<FastaEntry> {
    let id = header
        .split_whitespace()
        .next()
        .ok_or_else(|| Error::parse("Empty FASTA header"))?;

    let accession = match id.split('|').collect::<Vec<_>>().as_slice() {
        [_, accession, ..] => *accession,
        _ => id,
    };

    let (accession, isoform) = match accession.rsplit_once('-') {
        Some((base, suffix)) => match suffix.parse::<u32>() {
            Ok(isoform) => (base, isoform),
            Err(_) => (accession, 1),
        },
        None => (accession, 1),
    };

    Ok(FastaEntry {
        accession: accession.to_string(),
        isoform,
        ncbi_tax_id: header_tag(header, "OX=").and_then(|v| v.parse().ok()),
        gene_name: header_tag(header, "GN=").map(str::to_string),
        sequence: String::new(),
    })
}

/// Value of a `KEY=value` field of a UniProt header
fn header_tag<'h>(header: &'h str, tag: &str) -> Option<&'h str> {
    header
        .split_whitespace()
        .find_map(|token| token.strip_prefix(tag))
        .filter(|value| !value.is_empty())
}

#[derive(Debug, Default)]
struct StoreState {
    sequences: HashMap<String, Arc<ProteinSequence>>,
    loaded: HashSet<u32>,
}

/// In-memory [`SequenceStore`], optionally backed by a directory of FASTA files
#[derive(Debug, Default)]
pub struct ProteomeStore {
    fasta_dir: Option<PathBuf>,
    state: RwLock<StoreState>,
}

impl ProteomeStore {
    /// Empty store; sequences are added with [`ProteomeStore::insert`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that loads `<dir>/<ncbi_tax_id>.fasta[.gz]` on demand
    pub fn with_fasta_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            fasta_dir: Some(dir.into()),
            state: RwLock::default(),
        }
    }

    pub fn insert(&self, sequence: ProteinSequence) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state
            .sequences
            .insert(sequence.accession.clone(), Arc::new(sequence));
    }

    /// Number of entries currently loaded
    pub fn len(&self) -> usize {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .sequences
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Load a FASTA file; entries without `OX=` are assigned `ncbi_tax_id`
    pub fn load_fasta(&self, path: &Path, ncbi_tax_id: u32) -> Result<usize> {
        let entries = parse_fasta(open_reader(path)?)?;
        let mut grouped: BTreeMap<String, ProteinSequence> = BTreeMap::new();

        for entry in entries {
            let taxon = entry.ncbi_tax_id.unwrap_or(ncbi_tax_id);
            grouped
                .entry(entry.accession.clone())
                .or_insert_with(|| ProteinSequence {
                    accession: entry.accession.clone(),
                    ncbi_tax_id: taxon,
                    isoforms: BTreeMap::new(),
                })
                .add_isoform(entry.isoform, &entry.sequence);
        }

        let count = grouped.len();
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        for (accession, sequence) in grouped {
            let merged = match state.sequences.get(&accession) {
                Some(existing) => {
                    let mut merged = existing.as_ref().clone();
                    merged.isoforms.extend(sequence.isoforms);
                    merged
                },
                None => sequence,
            };
            state.sequences.insert(accession, Arc::new(merged));
        }

        info!(path = %path.display(), entries = count, "Loaded proteome");
        Ok(count)
    }
}

impl SequenceStore for ProteomeStore {
    fn load_proteome(&self, ncbi_tax_id: u32) -> Result<()> {
        {
            let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
            if state.loaded.contains(&ncbi_tax_id) {
                return Ok(());
            }
        }

        match &self.fasta_dir {
            Some(dir) => match find_file(dir, &ncbi_tax_id.to_string(), &["fasta", "fa"]) {
                Some(path) => {
                    self.load_fasta(&path, ncbi_tax_id)?;
                },
                None => warn!(
                    ncbi_tax_id,
                    dir = %dir.display(),
                    "No proteome file found; no site of this organism can be validated"
                ),
            },
            None => debug!(ncbi_tax_id, "In-memory proteome store, nothing to load"),
        }

        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .loaded
            .insert(ncbi_tax_id);
        Ok(())
    }

    fn sequence(&self, accession: &str) -> Option<Arc<ProteinSequence>> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .sequences
            .get(accession)
            .cloned()
    }
}

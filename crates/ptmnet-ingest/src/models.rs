//! Enzyme-substrate interaction models
//!
//! The unit of the aggregate is a [`DomainMotif`]: an enzyme ([`Domain`]) acting
//! on a modification site ([`Ptm`]) of a substrate, together with the resources
//! and references reporting it.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::record::RawPtmRecord;

/// Modification type assumed when a record does not state one
pub const DEFAULT_MODIFICATION: &str = "phosphorylation";

/// (enzyme UniProt accession, substrate UniProt accession)
pub type InteractionKey = (String, String);

/// Interactions grouped by enzyme-substrate pair
pub type EnzSubMap = BTreeMap<InteractionKey, Vec<DomainMotif>>;

/// resource -> interaction -> reference ids
pub type ReferenceTable = BTreeMap<String, BTreeMap<InteractionKey, BTreeSet<String>>>;

/// A modified residue of a specific protein isoform
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Residue {
    /// 1-based position in the isoform sequence
    pub number: u32,
    /// One letter amino acid code
    pub name: char,
    /// UniProt accession of the protein
    pub protein: String,
    /// Isoform index (1 = canonical)
    pub isoform: u32,
}

impl Residue {
    pub fn new(number: u32, name: char, protein: impl Into<String>, isoform: u32) -> Self {
        Self {
            number,
            name: name.to_ascii_uppercase(),
            protein: protein.into(),
            isoform,
        }
    }
}

impl fmt::Display for Residue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name, self.number)
    }
}

/// Sequence window around a modification site
///
/// `instance` is the substring `start..=end` (1-based) of the isoform sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Motif {
    pub protein: String,
    pub start: u32,
    pub end: u32,
    pub instance: String,
    pub isoform: u32,
}

/// The enzyme side of an interaction; no domain boundaries are resolved
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Domain {
    pub protein: String,
}

impl Domain {
    pub fn new(protein: impl Into<String>) -> Self {
        Self {
            protein: protein.into(),
        }
    }
}

/// Identity of a modification site, shared by every resource reporting it
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PtmKey {
    pub protein: String,
    pub isoform: u32,
    pub residue_number: u32,
    pub residue_name: char,
    pub typ: String,
}

/// A post-translational modification site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ptm {
    pub protein: String,
    pub isoform: u32,
    pub motif: Motif,
    pub residue: Residue,
    pub typ: String,
    pub sources: BTreeSet<String>,
}

impl Ptm {
    pub fn new(motif: Motif, residue: Residue, typ: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            protein: residue.protein.clone(),
            isoform: residue.isoform,
            motif,
            residue,
            typ: typ.into(),
            sources: BTreeSet::from([source.into()]),
        }
    }

    pub fn key(&self) -> PtmKey {
        PtmKey {
            protein: self.protein.clone(),
            isoform: self.isoform,
            residue_number: self.residue.number,
            residue_name: self.residue.name,
            typ: self.typ.clone(),
        }
    }

    /// Same protein, isoform, residue and modification type
    pub fn same_site(&self, other: &Ptm) -> bool {
        self.protein == other.protein
            && self.isoform == other.isoform
            && self.residue == other.residue
            && self.typ == other.typ
    }
}

/// Resource specific evidence carried along with an interaction
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MotifExtras {
    /// Databases MIMP collected the site from
    pub mimp_sources: BTreeSet<String>,
    /// Number of PubMed ids MIMP reports for the site
    pub npmid: Option<u32>,
    /// phosphoNetworks confidence score
    pub pnetw_score: Option<f64>,
    /// Original databases of dbPTM records
    pub dbptm_sources: BTreeSet<String>,
    /// Evidence databases listed by ProtMapper
    pub evidences: BTreeSet<String>,
}

impl MotifExtras {
    /// Collect whichever extra fields the record carries
    pub fn from_record(record: &RawPtmRecord) -> Self {
        Self {
            mimp_sources: record.databases.iter().cloned().collect(),
            npmid: record.npmid,
            pnetw_score: record.score,
            dbptm_sources: record.source.iter().cloned().collect(),
            evidences: record.evidences.iter().cloned().collect(),
        }
    }

    pub fn merge(&mut self, other: &MotifExtras) {
        self.mimp_sources.extend(other.mimp_sources.iter().cloned());
        self.dbptm_sources.extend(other.dbptm_sources.iter().cloned());
        self.evidences.extend(other.evidences.iter().cloned());
        self.npmid = self.npmid.max(other.npmid);
        self.pnetw_score = match (self.pnetw_score, other.pnetw_score) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };
    }
}

/// An enzyme-substrate interaction at one modification site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainMotif {
    pub domain: Domain,
    pub ptm: Ptm,
    pub sources: BTreeSet<String>,
    pub refs: BTreeSet<String>,
    pub extras: MotifExtras,
}

impl DomainMotif {
    pub fn new<I, S>(domain: Domain, ptm: Ptm, source: impl Into<String>, refs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            domain,
            ptm,
            sources: BTreeSet::from([source.into()]),
            refs: refs.into_iter().map(Into::into).collect(),
            extras: MotifExtras::default(),
        }
    }

    pub fn with_extras(mut self, extras: MotifExtras) -> Self {
        self.extras = extras;
        self
    }

    pub fn key(&self) -> InteractionKey {
        (self.domain.protein.clone(), self.ptm.protein.clone())
    }

    /// Same enzyme acting on the same site with the same modification type
    ///
    /// This is the identity used for deduplication; sources, references and
    /// extras are not compared.
    pub fn same_interaction(&self, other: &DomainMotif) -> bool {
        self.domain.protein == other.domain.protein && self.ptm.same_site(&other.ptm)
    }

    /// Union provenance of an equal interaction into this one
    pub fn merge(&mut self, other: &DomainMotif) {
        self.sources.extend(other.sources.iter().cloned());
        self.refs.extend(other.refs.iter().cloned());
        self.ptm.sources.extend(other.ptm.sources.iter().cloned());
        self.extras.merge(&other.extras);
    }
}

impl fmt::Display for DomainMotif {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} => {}-{} {} {} [{}]",
            self.domain.protein,
            self.ptm.protein,
            self.ptm.isoform,
            self.ptm.residue,
            self.ptm.typ,
            self.sources.iter().cloned().collect::<Vec<_>>().join(",")
        )
    }
}

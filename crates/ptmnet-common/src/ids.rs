//! Identifier namespaces

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Identifier namespace of an enzyme or substrate name in a raw record
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum IdType {
    /// Gene symbol (e.g., "TP53")
    #[default]
    GeneSymbol,
    /// UniProtKB accession (e.g., "P04637")
    Uniprot,
    /// RefSeq protein accession (e.g., "NP_000537")
    #[serde(rename = "refseqp")]
    RefSeqProtein,
}

impl IdType {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdType::GeneSymbol => "genesymbol",
            IdType::Uniprot => "uniprot",
            IdType::RefSeqProtein => "refseqp",
        }
    }
}

impl std::str::FromStr for IdType {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "genesymbol" | "gene_symbol" | "symbol" => Ok(IdType::GeneSymbol),
            "uniprot" => Ok(IdType::Uniprot),
            "refseqp" | "refseq" => Ok(IdType::RefSeqProtein),
            _ => Err(Error::UnknownIdType(s.to_string())),
        }
    }
}

impl std::fmt::Display for IdType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

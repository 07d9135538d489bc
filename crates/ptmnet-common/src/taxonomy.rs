//! NCBI Taxonomy helpers
//!
//! Resources name organisms in different ways: some take NCBI Taxonomy ids,
//! PhosphoSite takes common names ("human", "mouse"), others use Latin names.
//! This module translates between the forms for the taxa the workspace supports.

use crate::error::{Error, Result};

/// NCBI Taxonomy id of Homo sapiens
pub const HUMAN: u32 = 9606;
/// NCBI Taxonomy id of Mus musculus
pub const MOUSE: u32 = 10090;
/// NCBI Taxonomy id of Rattus norvegicus
pub const RAT: u32 = 10116;

/// Mammalian taxa loaded alongside the target organism when mixed organisms are allowed
pub const MIXED_ORGANISM_TAXA: [u32; 3] = [HUMAN, MOUSE, RAT];

/// (taxonomy id, common name, Latin name)
const ORGANISMS: &[(u32, &str, &str)] = &[
    (HUMAN, "human", "Homo sapiens"),
    (MOUSE, "mouse", "Mus musculus"),
    (RAT, "rat", "Rattus norvegicus"),
    (9913, "cow", "Bos taurus"),
    (9031, "chicken", "Gallus gallus"),
    (7955, "zebrafish", "Danio rerio"),
    (7227, "fruit fly", "Drosophila melanogaster"),
    (6239, "nematode", "Caenorhabditis elegans"),
    (4932, "yeast", "Saccharomyces cerevisiae"),
];

/// Common name of a taxon (e.g., 9606 -> "human")
pub fn common_name(ncbi_tax_id: u32) -> Option<&'static str> {
    ORGANISMS
        .iter()
        .find(|(id, _, _)| *id == ncbi_tax_id)
        .map(|(_, common, _)| *common)
}

/// Latin name of a taxon (e.g., 10090 -> "Mus musculus")
pub fn latin_name(ncbi_tax_id: u32) -> Option<&'static str> {
    ORGANISMS
        .iter()
        .find(|(id, _, _)| *id == ncbi_tax_id)
        .map(|(_, _, latin)| *latin)
}

/// Resolve a taxonomy id, a common name or a Latin name to a taxonomy id
pub fn ensure_ncbi_tax_id(organism: &str) -> Result<u32> {
    let organism = organism.trim();

    if let Ok(id) = organism.parse::<u32>() {
        return Ok(id);
    }

    ORGANISMS
        .iter()
        .find(|(_, common, latin)| {
            common.eq_ignore_ascii_case(organism) || latin.eq_ignore_ascii_case(organism)
        })
        .map(|(id, _, _)| *id)
        .ok_or_else(|| Error::UnknownOrganism(organism.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_ncbi_tax_id() {
        assert_eq!(ensure_ncbi_tax_id("9606").unwrap(), HUMAN);
        assert_eq!(ensure_ncbi_tax_id("Mouse").unwrap(), MOUSE);
        assert_eq!(ensure_ncbi_tax_id("rattus norvegicus").unwrap(), RAT);
        assert!(matches!(
            ensure_ncbi_tax_id("unicorn"),
            Err(Error::UnknownOrganism(_))
        ));
    }

    #[test]
    fn test_names() {
        assert_eq!(common_name(RAT), Some("rat"));
        assert_eq!(latin_name(HUMAN), Some("Homo sapiens"));
        assert_eq!(common_name(1), None);
    }
}

//! Orthology and translation of interactions between organisms
//!
//! Interactions found in a source organism are projected onto the target
//! organism: the enzyme through its orthologs, the modification site either
//! through curated homologous sites (strict) or by looking for the same
//! residue at the same offset in every ortholog isoform (heuristic).

use ptmnet_common::Result;
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use tracing::{debug, info, warn};

use crate::io::{find_file, open_reader, tsv_reader};
use crate::models::{Domain, DomainMotif, Motif, Ptm, Residue};
use crate::services::Services;

/// A residue of a target organism protein homologous to a source site
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HomologousSite {
    pub protein: String,
    pub isoform: u32,
    pub resnum: u32,
    pub residue: char,
}

/// Orthologous proteins and homologous sites between organisms
pub trait OrthologyService {
    /// Accessions in `target` orthologous to `accession` in `source`
    fn orthologs(&self, accession: &str, source: u32, target: u32) -> BTreeSet<String>;

    /// Curated homologous sites in `target` for a modified residue in `source`
    fn homologous_sites(&self, residue: &Residue, source: u32, target: u32) -> Vec<HomologousSite>;
}

type SiteKey = (String, u32, u32, u32, u32);

/// In-memory [`OrthologyService`], optionally read from TSV files
///
/// # Format
/// ```text
/// orthologs.tsv          source_taxon  source  target_taxon  target
/// homologous_sites.tsv   source_taxon  source  source_isoform  source_resnum
///                        target_taxon  protein  isoform  resnum  residue
/// ```
#[derive(Debug, Default)]
pub struct OrthologyTable {
    orthologs: HashMap<(String, u32, u32), BTreeSet<String>>,
    sites: HashMap<SiteKey, Vec<HomologousSite>>,
}

#[derive(Debug, Deserialize)]
struct OrthologRow {
    source_taxon: u32,
    source: String,
    target_taxon: u32,
    target: String,
}

#[derive(Debug, Deserialize)]
struct SiteRow {
    source_taxon: u32,
    source: String,
    source_isoform: u32,
    source_resnum: u32,
    target_taxon: u32,
    protein: String,
    isoform: u32,
    resnum: u32,
    residue: char,
}

impl OrthologyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read `orthologs.tsv[.gz]` and `homologous_sites.tsv[.gz]`; missing files are empty
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let mut table = Self::new();

        match find_file(dir, "orthologs", &["tsv"]) {
            Some(path) => {
                let mut reader = tsv_reader(open_reader(&path)?);
                for row in reader.deserialize::<OrthologRow>() {
                    let row = row?;
                    table.insert_orthologs(row.source_taxon, &row.source, row.target_taxon, &row.target);
                }
            },
            None => warn!(dir = %dir.display(), "No ortholog table found"),
        }

        if let Some(path) = find_file(dir, "homologous_sites", &["tsv"]) {
            let mut reader = tsv_reader(open_reader(&path)?);
            for row in reader.deserialize::<SiteRow>() {
                let row = row?;
                table.insert_site(
                    (row.source, row.source_isoform, row.source_resnum),
                    row.source_taxon,
                    row.target_taxon,
                    HomologousSite {
                        protein: row.protein,
                        isoform: row.isoform,
                        resnum: row.resnum,
                        residue: row.residue,
                    },
                );
            }
        }

        info!(
            dir = %dir.display(),
            orthologs = table.orthologs.len(),
            sites = table.sites.len(),
            "Loaded orthology tables"
        );
        Ok(table)
    }

    /// Record an ortholog pair, in both directions
    pub fn insert_orthologs(&mut self, source_taxon: u32, source: &str, target_taxon: u32, target: &str) {
        self.orthologs
            .entry((source.to_string(), source_taxon, target_taxon))
            .or_default()
            .insert(target.to_string());
        self.orthologs
            .entry((target.to_string(), target_taxon, source_taxon))
            .or_default()
            .insert(source.to_string());
    }

    /// Record a curated site for `(accession, isoform, resnum)` in the source organism
    pub fn insert_site(&mut self, source_site: (String, u32, u32), source_taxon: u32, target_taxon: u32, site: HomologousSite) {
        let (accession, isoform, resnum) = source_site;
        self.sites
            .entry((accession, isoform, resnum, source_taxon, target_taxon))
            .or_default()
            .push(site);
    }
}

impl OrthologyService for OrthologyTable {
    fn orthologs(&self, accession: &str, source: u32, target: u32) -> BTreeSet<String> {
        self.orthologs
            .get(&(accession.to_string(), source, target))
            .cloned()
            .unwrap_or_default()
    }

    fn homologous_sites(&self, residue: &Residue, source: u32, target: u32) -> Vec<HomologousSite> {
        self.sites
            .get(&(residue.protein.clone(), residue.isoform, residue.number, source, target))
            .cloned()
            .unwrap_or_default()
    }
}

/// Projects interactions onto a target organism
#[derive(Clone, Copy)]
pub struct HomologyTranslator<'a> {
    services: &'a Services,
    target: u32,
    strict: bool,
}

impl<'a> HomologyTranslator<'a> {
    pub fn new(services: &'a Services, target: u32, strict: bool) -> Self {
        Self {
            services,
            target,
            strict,
        }
    }

    /// Every target organism version of an interaction
    ///
    /// The cartesian product of enzyme orthologs and translated sites, each
    /// with a window taken from the target sequence. Provenance is copied.
    pub fn translate_domain_motif(&self, dm: &DomainMotif, source: u32) -> Vec<DomainMotif> {
        let enzymes = self.translate_protein(&dm.domain.protein, source);
        if enzymes.is_empty() {
            return Vec::new();
        }

        let mut translated = Vec::new();
        for site in self.translate_site(&dm.ptm.residue, source) {
            let Some(sequence) = self.services.sequences.sequence(&site.protein) else {
                continue;
            };
            let Some(region) = sequence.region(site.resnum, None, None, site.isoform) else {
                continue;
            };

            let residue = Residue::new(site.resnum, site.residue, site.protein.clone(), site.isoform);
            let motif = Motif {
                protein: site.protein.clone(),
                start: region.start,
                end: region.end,
                instance: region.instance,
                isoform: site.isoform,
            };
            let ptm = Ptm {
                sources: dm.ptm.sources.clone(),
                ..Ptm::new(motif, residue, dm.ptm.typ.clone(), "")
            };

            for enzyme in &enzymes {
                translated.push(DomainMotif {
                    domain: Domain::new(enzyme.clone()),
                    ptm: ptm.clone(),
                    sources: dm.sources.clone(),
                    refs: dm.refs.clone(),
                    extras: dm.extras.clone(),
                });
            }
        }

        debug!(
            interaction = %dm,
            source,
            target = self.target,
            translated = translated.len(),
            "Translated interaction"
        );
        translated
    }

    /// Proteins already in the target organism are kept
    fn translate_protein(&self, accession: &str, source: u32) -> BTreeSet<String> {
        if self.services.sequences.organism(accession) == Some(self.target) {
            return BTreeSet::from([accession.to_string()]);
        }
        self.services.orthology.orthologs(accession, source, self.target)
    }

    fn translate_site(&self, residue: &Residue, source: u32) -> Vec<HomologousSite> {
        let sequences = &self.services.sequences;

        if sequences.organism(&residue.protein) == Some(self.target) {
            return vec![HomologousSite {
                protein: residue.protein.clone(),
                isoform: residue.isoform,
                resnum: residue.number,
                residue: residue.name,
            }];
        }

        if self.strict {
            return self
                .services
                .orthology
                .homologous_sites(residue, source, self.target)
                .into_iter()
                .filter(|site| {
                    sequences
                        .sequence(&site.protein)
                        .is_some_and(|s| s.match_residue(site.residue, site.resnum, site.isoform))
                })
                .collect();
        }

        self.services
            .orthology
            .orthologs(&residue.protein, source, self.target)
            .into_iter()
            .filter_map(|ortholog| sequences.sequence(&ortholog))
            .flat_map(|sequence| {
                sequence
                    .isoforms()
                    .filter(|&isoform| sequence.match_residue(residue.name, residue.number, isoform))
                    .map(|isoform| HomologousSite {
                        protein: sequence.accession.clone(),
                        isoform,
                        resnum: residue.number,
                        residue: residue.name,
                    })
                    .collect::<Vec<_>>()
            })
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::inputs::InputRegistry;
    use crate::mapping::MappingTable;
    use crate::models::DEFAULT_MODIFICATION;
    use crate::sequence::{ProteinSequence, ProteomeStore};

    const MOUSE: u32 = 10090;
    const HUMAN: u32 = 9606;

    fn services(orthology: OrthologyTable) -> Services {
        let store = ProteomeStore::new();
        store.insert(ProteinSequence::new("P31750", MOUSE, "MNDVAIVKEGWLHKRGEYIKTWRPRYFLLKNDGTFIGYKERPQDVDQ"));
        store.insert(ProteinSequence::new("P02340", MOUSE, "MTAMEESQSDISLELPLSQETFSGLWKLLPPEDILPSPHCMDDLLL"));
        store.insert(ProteinSequence::new("P31749", HUMAN, "MSDVAIVKEG"));
        store.insert(ProteinSequence::new("P04637", HUMAN, "MEEPQSDPSVEPPLSQETFSDLWKLLPENN"));
        Services::new(MappingTable::new(), store, orthology, InputRegistry::new())
    }

    fn human_interaction() -> DomainMotif {
        let residue = Residue::new(15, 'S', "P04637", 1);
        let motif = Motif {
            protein: "P04637".to_string(),
            start: 8,
            end: 22,
            instance: "PSVEPPLSQETFSDL".to_string(),
            isoform: 1,
        };
        let ptm = Ptm::new(motif, residue, DEFAULT_MODIFICATION, "SIGNOR");
        DomainMotif::new(Domain::new("P31749"), ptm, "SIGNOR", ["12345"])
    }

    fn orthologs() -> OrthologyTable {
        let mut table = OrthologyTable::new();
        table.insert_orthologs(HUMAN, "P31749", MOUSE, "P31750");
        table.insert_orthologs(HUMAN, "P04637", MOUSE, "P02340");
        table
    }

    #[test]
    fn test_heuristic_translation_requires_same_residue() {
        let services = services(orthologs());
        let translator = HomologyTranslator::new(&services, MOUSE, false);

        // Mouse p53 has no serine at 15
        assert!(translator
            .translate_domain_motif(&human_interaction(), HUMAN)
            .is_empty());

        let mut at_s9 = human_interaction();
        at_s9.ptm.residue = Residue::new(9, 'S', "P04637", 1);
        let translated = translator.translate_domain_motif(&at_s9, HUMAN);

        assert_eq!(translated.len(), 1);
        let dm = &translated[0];
        assert_eq!(dm.key(), ("P31750".to_string(), "P02340".to_string()));
        assert_eq!(dm.ptm.residue.number, 9);
        assert_eq!(dm.ptm.motif.instance, "TAMEESQSDISLELP");
        assert_eq!((dm.ptm.motif.start, dm.ptm.motif.end), (2, 16));
        assert!(dm.sources.contains("SIGNOR"));
        assert!(dm.refs.contains("12345"));
    }

    #[test]
    fn test_strict_translation_uses_curated_sites() {
        let mut table = orthologs();
        table.insert_site(
            ("P04637".to_string(), 1, 15),
            HUMAN,
            MOUSE,
            HomologousSite {
                protein: "P02340".to_string(),
                isoform: 1,
                resnum: 18,
                residue: 'S',
            },
        );
        let services = services(table);
        let translator = HomologyTranslator::new(&services, MOUSE, true);

        let translated = translator.translate_domain_motif(&human_interaction(), HUMAN);
        assert_eq!(translated.len(), 1);
        assert_eq!(translated[0].ptm.residue.to_string(), "S18");
        assert_eq!(translated[0].ptm.protein, "P02340");
    }

    #[test]
    fn test_no_ortholog_no_translation() {
        let services = services(OrthologyTable::new());
        let translator = HomologyTranslator::new(&services, MOUSE, false);
        assert!(translator
            .translate_domain_motif(&human_interaction(), HUMAN)
            .is_empty());
    }

    #[test]
    fn test_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("orthologs.tsv"),
            "source_taxon\tsource\ttarget_taxon\ttarget\n9606\tP31749\t10090\tP31750\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("homologous_sites.tsv"),
            "source_taxon\tsource\tsource_isoform\tsource_resnum\ttarget_taxon\tprotein\tisoform\tresnum\tresidue\n\
             9606\tP04637\t1\t15\t10090\tP02340\t1\t18\tS\n",
        )
        .unwrap();

        let table = OrthologyTable::from_dir(dir.path()).unwrap();
        assert!(table.orthologs("P31750", MOUSE, HUMAN).contains("P31749"));
        let sites = table.homologous_sites(&Residue::new(15, 'S', "P04637", 1), HUMAN, MOUSE);
        assert_eq!(sites.len(), 1);
        assert_eq!(sites[0].resnum, 18);
    }
}

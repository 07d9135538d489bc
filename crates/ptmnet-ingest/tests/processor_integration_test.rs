//! Integration tests for the single-resource processors
//!
//! Synthetic inputs run against in-memory services; the fixture data set is
//! read through the file-backed services.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use ptmnet_common::{Error, IdType};
use ptmnet_ingest::homology::OrthologyTable;
use ptmnet_ingest::inputs::FnInput;
use ptmnet_ingest::mapping::MappingTable;
use ptmnet_ingest::sequence::{ProteinSequence, ProteomeStore};
use ptmnet_ingest::{
    EnzymeSubstrateHomologyProcessor, EnzymeSubstrateProcessor, HomologyOptions, IngestConfig, InputArgs,
    InputRegistry, ProcessorOptions, RawPtmRecord, Resource, Services,
};
use std::collections::BTreeSet;
use std::path::PathBuf;

fn fixture_config() -> IngestConfig {
    let data_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("data");
    IngestConfig::builder()
        .data_dir(data_dir)
        .build()
}

fn synthetic_services(map_substrate: bool) -> Services {
    let mapper = MappingTable::new();
    mapper.insert(IdType::GeneSymbol, IdType::Uniprot, 9606, "AKT1", "P31749");
    if map_substrate {
        mapper.insert(IdType::GeneSymbol, IdType::Uniprot, 9606, "TP53", "P04637");
    }

    let store = ProteomeStore::new();
    store.insert(ProteinSequence::new("P31749", 9606, "MSDVAIVKEGWLHKRGEYIK"));
    store.insert(ProteinSequence::new("P04637", 9606, "MEEPQSDPSVEPPLSQETFSDLWKLLPENN"));

    let mut inputs = InputRegistry::new();
    inputs.register_named(
        "synthetic",
        FnInput::new("synthetic", |_: &InputArgs| {
            Ok(vec![RawPtmRecord::new(["AKT1"], "TP53", 'S', 15).with_references(["12345"])])
        }),
    );
    Services::new(mapper, store, OrthologyTable::new(), inputs)
}

#[test]
fn test_single_record_yields_one_interaction() {
    let services = synthetic_services(true);
    let mut processor = EnzymeSubstrateProcessor::new(&services, ProcessorOptions::new("synthetic")).unwrap();

    let interactions: Vec<_> = processor.iter().collect();
    assert_eq!(interactions.len(), 1);

    let dm = &interactions[0];
    assert_eq!(dm.domain.protein, "P31749");
    assert_eq!(dm.ptm.protein, "P04637");
    assert_eq!(dm.ptm.residue.name, 'S');
    assert_eq!(dm.ptm.residue.number, 15);
    assert_eq!(dm.ptm.typ, "phosphorylation");
    assert_eq!(dm.sources, BTreeSet::from(["synthetic".to_string()]));
    assert_eq!(dm.refs, BTreeSet::from(["12345".to_string()]));
    assert!(dm.ptm.motif.instance.contains('S'));
}

#[test]
fn test_unmapped_substrate_yields_nothing() {
    let services = synthetic_services(false);
    let mut processor = EnzymeSubstrateProcessor::new(&services, ProcessorOptions::new("synthetic")).unwrap();

    assert_eq!(processor.len(), 1);
    assert_eq!(processor.iter().count(), 0);
}

#[test]
fn test_human_only_resource_rejects_mouse() {
    let services = Services::from_config(&fixture_config()).unwrap();
    let result = EnzymeSubstrateProcessor::new(&services, ProcessorOptions::new(Resource::Hprd).organism(10090));

    match result {
        Err(Error::UnsupportedOrganism { resource, ncbi_tax_id }) => {
            assert_eq!(resource, "HPRD");
            assert_eq!(ncbi_tax_id, 10090);
        },
        Err(e) => panic!("unexpected error: {e}"),
        Ok(_) => panic!("mouse must be rejected by a human-only resource"),
    }
}

#[test]
fn test_fixture_table_drops_unverified_sites() {
    let services = Services::from_config(&fixture_config()).unwrap();
    let mut processor = EnzymeSubstrateProcessor::new(&services, ProcessorOptions::new(Resource::Hprd)).unwrap();
    assert_eq!(processor.len(), 6);

    let interactions: Vec<_> = processor.iter().collect();
    // S9, S15 and S20 in both TP53 isoforms, S33 in the canonical one only
    assert_eq!(interactions.len(), 7);
    assert!(interactions.iter().all(|dm| dm.ptm.protein == "P04637"));
    assert!(interactions.iter().all(|dm| dm.ptm.residue.name == 'S'));
    assert!(!interactions.iter().any(|dm| dm.refs.contains("99999")));
    assert!(!interactions.iter().any(|dm| dm.refs.contains("11111")));

    let gsk3b: Vec<_> = interactions.iter().filter(|dm| dm.domain.protein == "P49841").collect();
    assert_eq!(gsk3b.len(), 1);
    assert_eq!(gsk3b[0].ptm.isoform, 1);
    assert!(gsk3b[0].refs.is_empty());
}

#[test]
fn test_json_lines_table_is_filtered_by_organism() {
    let services = Services::from_config(&fixture_config()).unwrap();

    let mut human = EnzymeSubstrateProcessor::new(&services, ProcessorOptions::new(Resource::Signor)).unwrap();
    assert_eq!(human.len(), 2);
    assert_eq!(human.iter().count(), 3);

    let mut mouse =
        EnzymeSubstrateProcessor::new(&services, ProcessorOptions::new(Resource::Signor).organism(10090)).unwrap();
    let interactions: Vec<_> = mouse.iter().collect();
    assert_eq!(interactions.len(), 1);
    assert_eq!(interactions[0].key(), ("P31750".to_string(), "P02340".to_string()));
}

#[test]
fn test_homology_translates_conserved_sites_only() {
    let services = Services::from_config(&fixture_config()).unwrap();
    let options = HomologyOptions::new(Resource::Hprd, 10090);
    let mut processor = EnzymeSubstrateHomologyProcessor::new(&services, options).unwrap();

    let translated: Vec<_> = processor.iter().collect();
    // S9 of both human isoforms lands on mouse S9; S15 and S20 are not
    // conserved and GSK3B has no mouse ortholog in the fixtures
    assert_eq!(translated.len(), 2);
    for dm in &translated {
        assert_eq!(dm.key(), ("P31750".to_string(), "P02340".to_string()));
        assert_eq!(dm.ptm.residue.number, 9);
        assert_eq!(dm.ptm.isoform, 1);
        assert_eq!(dm.sources, BTreeSet::from(["HPRD".to_string()]));
    }
}

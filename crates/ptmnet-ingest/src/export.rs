//! Tabular export of the aggregate
//!
//! One row per enzyme, substrate, residue and modification type; the
//! isoforms carrying the site are listed together.

use ptmnet_common::{IdType, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::info;

use crate::mapping::IdMapper;
use crate::models::EnzSubMap;

pub const COLUMNS: [&str; 10] = [
    "enzyme",
    "substrate",
    "enzyme_genesymbol",
    "substrate_genesymbol",
    "isoforms",
    "residue_type",
    "residue_offset",
    "modification",
    "sources",
    "references",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnzSubRow {
    pub enzyme: String,
    pub substrate: String,
    pub enzyme_genesymbol: String,
    pub substrate_genesymbol: String,
    pub isoforms: BTreeSet<u32>,
    pub residue_type: char,
    pub residue_offset: u32,
    pub modification: String,
    pub sources: BTreeSet<String>,
    pub references: BTreeSet<String>,
    pub ncbi_tax_id: Option<u32>,
}

impl EnzSubRow {
    fn fields(&self) -> Vec<String> {
        let mut fields = vec![
            self.enzyme.clone(),
            self.substrate.clone(),
            self.enzyme_genesymbol.clone(),
            self.substrate_genesymbol.clone(),
            join(self.isoforms.iter()),
            self.residue_type.to_string(),
            self.residue_offset.to_string(),
            self.modification.clone(),
            join(self.sources.iter()),
            join(self.references.iter()),
        ];
        if let Some(ncbi_tax_id) = self.ncbi_tax_id {
            fields.push(ncbi_tax_id.to_string());
        }
        fields
    }
}

fn join<T: ToString>(values: impl Iterator<Item = T>) -> String {
    values.map(|v| v.to_string()).collect::<Vec<_>>().join(";")
}

/// First gene symbol of an accession, empty when there is none
fn gene_symbol(mapper: &dyn IdMapper, accession: &str, ncbi_tax_id: u32) -> String {
    mapper
        .map_name(accession, IdType::Uniprot, IdType::GeneSymbol, ncbi_tax_id)
        .into_iter()
        .next()
        .unwrap_or_default()
}

/// Table rows; `with_tax_id` adds the organism column
pub fn rows(enz_sub: &EnzSubMap, mapper: &dyn IdMapper, ncbi_tax_id: u32, with_tax_id: bool) -> Vec<EnzSubRow> {
    let mut rows = Vec::new();

    for ((enzyme, substrate), interactions) in enz_sub {
        let enzyme_genesymbol = gene_symbol(mapper, enzyme, ncbi_tax_id);
        let substrate_genesymbol = gene_symbol(mapper, substrate, ncbi_tax_id);

        let mut sites: BTreeMap<(u32, char, &str), EnzSubRow> = BTreeMap::new();
        for dm in interactions {
            let residue = &dm.ptm.residue;
            let row = sites
                .entry((residue.number, residue.name, dm.ptm.typ.as_str()))
                .or_insert_with(|| EnzSubRow {
                    enzyme: enzyme.clone(),
                    substrate: substrate.clone(),
                    enzyme_genesymbol: enzyme_genesymbol.clone(),
                    substrate_genesymbol: substrate_genesymbol.clone(),
                    isoforms: BTreeSet::new(),
                    residue_type: residue.name,
                    residue_offset: residue.number,
                    modification: dm.ptm.typ.clone(),
                    sources: BTreeSet::new(),
                    references: BTreeSet::new(),
                    ncbi_tax_id: with_tax_id.then_some(ncbi_tax_id),
                });
            row.isoforms.insert(dm.ptm.isoform);
            row.sources.extend(dm.sources.iter().cloned());
            row.references.extend(dm.refs.iter().cloned());
        }
        rows.extend(sites.into_values());
    }

    rows
}

/// Write rows as TSV with a header line
pub fn write_rows(path: &Path, rows: &[EnzSubRow], with_tax_id: bool) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(path)?;

    let mut header: Vec<&str> = COLUMNS.to_vec();
    if with_tax_id {
        header.push("ncbi_tax_id");
    }
    writer.write_record(&header)?;
    for row in rows {
        writer.write_record(row.fields())?;
    }
    writer.flush()?;

    info!(path = %path.display(), rows = rows.len(), "Exported enzyme-substrate table");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::mapping::MappingTable;
    use crate::models::{Domain, DomainMotif, Motif, Ptm, Residue, DEFAULT_MODIFICATION};

    fn interaction(isoform: u32, source: &str, reference: &str) -> DomainMotif {
        let residue = Residue::new(15, 'S', "P04637", isoform);
        let motif = Motif {
            protein: "P04637".to_string(),
            start: 14,
            end: 16,
            instance: "LSQ".to_string(),
            isoform,
        };
        let ptm = Ptm::new(motif, residue, DEFAULT_MODIFICATION, source);
        DomainMotif::new(Domain::new("P31749"), ptm, source, [reference])
    }

    #[test]
    fn test_isoforms_share_a_row() {
        let mut enz_sub = EnzSubMap::new();
        enz_sub.insert(
            ("P31749".to_string(), "P04637".to_string()),
            vec![interaction(1, "SIGNOR", "1"), interaction(2, "HPRD", "2")],
        );
        let mapper = MappingTable::new();
        mapper.insert(IdType::GeneSymbol, IdType::Uniprot, 9606, "AKT1", "P31749");

        let rows = rows(&enz_sub, &mapper, 9606, true);
        assert_eq!(rows.len(), 1);
        let fields = rows[0].fields();
        assert_eq!(
            fields,
            vec![
                "P31749", "P04637", "AKT1", "", "1;2", "S", "15", "phosphorylation", "HPRD;SIGNOR", "1;2", "9606"
            ]
        );
    }

    #[test]
    fn test_write_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("enz_sub.tsv");
        let mut enz_sub = EnzSubMap::new();
        enz_sub.insert(
            ("P31749".to_string(), "P04637".to_string()),
            vec![interaction(1, "SIGNOR", "1")],
        );

        write_rows(&path, &rows(&enz_sub, &MappingTable::new(), 9606, false), false).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();

        assert_eq!(lines[0], COLUMNS.join("\t"));
        assert_eq!(lines[1], "P31749\tP04637\t\t\t1\tS\t15\tphosphorylation\tSIGNOR\t1");
    }
}

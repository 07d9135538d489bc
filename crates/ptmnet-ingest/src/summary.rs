//! Per-resource statistics of the aggregate
//!
//! *Unique* counts what a resource reports alone, *shared* what at least one
//! other resource also reports. Curation effort is the number of distinct
//! (interaction, reference) pairs.

use ptmnet_common::Result;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;
use tracing::info;

use crate::models::{EnzSubMap, InteractionKey, ReferenceTable};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResourceSummary {
    pub resource: String,
    pub n_total: usize,
    pub n_unique: usize,
    pub n_shared: usize,
    pub n_enzymes: usize,
    pub n_substrates: usize,
    pub n_references: usize,
    pub n_references_unique: usize,
    pub n_references_shared: usize,
    pub curation_effort: usize,
    pub curation_effort_unique: usize,
    pub curation_effort_shared: usize,
    /// Interactions per modification type, zero for types the resource lacks
    pub modifications: BTreeMap<String, usize>,
}

const COLUMNS: [&str; 12] = [
    "resource",
    "n_total",
    "n_unique",
    "n_shared",
    "n_enzymes",
    "n_substrates",
    "n_references",
    "n_references_unique",
    "n_references_shared",
    "curation_effort",
    "curation_effort_unique",
    "curation_effort_shared",
];

/// One summary per resource, in resource name order
pub fn summarize(enz_sub: &EnzSubMap, references: &ReferenceTable) -> Vec<ResourceSummary> {
    let modification_types: BTreeSet<&str> = enz_sub
        .values()
        .flatten()
        .map(|dm| dm.ptm.typ.as_str())
        .collect();

    let mut resources: BTreeSet<&str> = references.keys().map(String::as_str).collect();
    resources.extend(enz_sub.values().flatten().flat_map(|dm| dm.sources.iter().map(String::as_str)));

    // How many resources cite each reference, and each (interaction, reference)
    let mut reference_resources: HashMap<&str, usize> = HashMap::new();
    let mut effort_resources: HashMap<(&InteractionKey, &str), usize> = HashMap::new();
    for per_key in references.values() {
        let cited: BTreeSet<&str> = per_key.values().flatten().map(String::as_str).collect();
        for reference in cited {
            *reference_resources.entry(reference).or_default() += 1;
        }
        for (key, refs) in per_key {
            for reference in refs {
                *effort_resources.entry((key, reference.as_str())).or_default() += 1;
            }
        }
    }

    resources
        .into_iter()
        .map(|resource| {
            let mut summary = ResourceSummary {
                resource: resource.to_string(),
                modifications: modification_types.iter().map(|t| (t.to_string(), 0)).collect(),
                ..Default::default()
            };
            let mut enzymes = BTreeSet::new();
            let mut substrates = BTreeSet::new();

            for dm in enz_sub.values().flatten().filter(|dm| dm.sources.contains(resource)) {
                summary.n_total += 1;
                if dm.sources.len() == 1 {
                    summary.n_unique += 1;
                }
                enzymes.insert(dm.domain.protein.as_str());
                substrates.insert(dm.ptm.protein.as_str());
                *summary.modifications.entry(dm.ptm.typ.clone()).or_default() += 1;
            }
            summary.n_shared = summary.n_total - summary.n_unique;
            summary.n_enzymes = enzymes.len();
            summary.n_substrates = substrates.len();

            if let Some(per_key) = references.get(resource) {
                let cited: BTreeSet<&str> = per_key.values().flatten().map(String::as_str).collect();
                summary.n_references = cited.len();
                summary.n_references_unique = cited
                    .iter()
                    .filter(|r| reference_resources.get(*r) == Some(&1))
                    .count();

                for (key, refs) in per_key {
                    for reference in refs {
                        summary.curation_effort += 1;
                        if effort_resources.get(&(key, reference.as_str())) == Some(&1) {
                            summary.curation_effort_unique += 1;
                        }
                    }
                }
            }
            summary.n_references_shared = summary.n_references - summary.n_references_unique;
            summary.curation_effort_shared = summary.curation_effort - summary.curation_effort_unique;

            summary
        })
        .collect()
}

/// Header and rows of the summary table, one column per modification type after the counts
pub fn table(summaries: &[ResourceSummary]) -> (Vec<String>, Vec<Vec<String>>) {
    let modification_types: BTreeSet<&str> = summaries
        .iter()
        .flat_map(|s| s.modifications.keys().map(String::as_str))
        .collect();

    let mut header: Vec<String> = COLUMNS.iter().map(|c| c.to_string()).collect();
    header.extend(modification_types.iter().map(|t| t.to_string()));

    let rows = summaries
        .iter()
        .map(|s| {
            let mut record = vec![
                s.resource.clone(),
                s.n_total.to_string(),
                s.n_unique.to_string(),
                s.n_shared.to_string(),
                s.n_enzymes.to_string(),
                s.n_substrates.to_string(),
                s.n_references.to_string(),
                s.n_references_unique.to_string(),
                s.n_references_shared.to_string(),
                s.curation_effort.to_string(),
                s.curation_effort_unique.to_string(),
                s.curation_effort_shared.to_string(),
            ];
            record.extend(
                modification_types
                    .iter()
                    .map(|t| s.modifications.get(*t).copied().unwrap_or(0).to_string()),
            );
            record
        })
        .collect();

    (header, rows)
}

/// Write summaries as TSV
pub fn write_summaries(path: &Path, summaries: &[ResourceSummary]) -> Result<()> {
    let (header, rows) = table(summaries);

    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(path)?;
    writer.write_record(&header)?;
    for row in &rows {
        writer.write_record(row)?;
    }
    writer.flush()?;

    info!(path = %path.display(), resources = summaries.len(), "Exported resource summaries");
    Ok(())
}

//! File-backed input reading normalized resource tables
//!
//! # Format
//!
//! `<data_dir>/<resource>.tsv[.gz]` with a header row of [`RawPtmRecord`]
//! field names, or `<data_dir>/<resource>.jsonl[.gz]` with one JSON object
//! per line. The resource name is lower-cased (`signor.tsv`, `phosphoelm.jsonl`).
//!
//! # Arguments
//!
//! - `organism`: keep records curated in this organism (id or name); records
//!   without an organism are kept
//! - `ltp_only`: drop records flagged as high-throughput only
//! - `strict`: drop records without references

use ptmnet_common::{taxonomy, Error, Result};
use serde_json::Value;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::{InputArgs, PtmInput};
use crate::io::{find_file, open_reader, tsv_reader};
use crate::record::RawPtmRecord;

#[derive(Debug, Clone)]
pub struct TableInput {
    name: String,
    data_dir: PathBuf,
}

impl TableInput {
    pub fn new(name: impl Into<String>, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            data_dir: data_dir.into(),
        }
    }

    fn read(&self, path: &Path) -> Result<Vec<RawPtmRecord>> {
        let file_name = path.file_name().and_then(|s| s.to_str()).unwrap_or_default();
        if file_name.contains(".jsonl") {
            read_json_lines(path)
        } else {
            read_tsv(path)
        }
    }
}

fn read_json_lines(path: &Path) -> Result<Vec<RawPtmRecord>> {
    let mut records = Vec::new();
    for (i, line) in open_reader(path)?.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record: RawPtmRecord = serde_json::from_str(&line)
            .map_err(|e| Error::parse(format!("{}:{}: {}", path.display(), i + 1, e)))?;
        records.push(record);
    }
    Ok(records)
}

fn read_tsv(path: &Path) -> Result<Vec<RawPtmRecord>> {
    let mut reader = tsv_reader(open_reader(path)?);
    reader
        .deserialize::<RawPtmRecord>()
        .map(|row| row.map_err(|e| Error::parse(format!("{}: {}", path.display(), e))))
        .collect()
}

fn flag(args: &InputArgs, key: &str) -> bool {
    args.get(key).and_then(Value::as_bool).unwrap_or(false)
}

fn organism_arg(args: &InputArgs) -> Result<Option<u32>> {
    match args.get("organism") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_u64()
            .and_then(|id| u32::try_from(id).ok())
            .map(Some)
            .ok_or_else(|| Error::UnknownOrganism(n.to_string())),
        Some(Value::String(s)) => taxonomy::ensure_ncbi_tax_id(s).map(Some),
        Some(other) => Err(Error::UnknownOrganism(other.to_string())),
    }
}

impl PtmInput for TableInput {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self, args: &InputArgs) -> Result<Vec<RawPtmRecord>> {
        let stem = self.name.to_lowercase();
        let Some(path) = find_file(&self.data_dir, &stem, &["tsv", "jsonl"]) else {
            warn!(
                resource = %self.name,
                dir = %self.data_dir.display(),
                "No table found for resource"
            );
            return Ok(Vec::new());
        };

        let organism = organism_arg(args)?;
        let ltp_only = flag(args, "ltp_only");
        let strict = flag(args, "strict");

        let records = self.read(&path)?;
        let total = records.len();
        let mut kept = Vec::with_capacity(total);

        for record in records {
            record.validate()?;

            if let (Some(wanted), Some(curated)) = (organism, record.organism.as_deref()) {
                match taxonomy::ensure_ncbi_tax_id(curated) {
                    Ok(id) if id == wanted => {},
                    Ok(_) => continue,
                    Err(_) => {
                        debug!(organism = curated, "Record organism not recognized");
                        continue;
                    },
                }
            }
            if ltp_only && record.ltp == Some(false) {
                continue;
            }
            if strict && record.references.is_empty() {
                continue;
            }
            kept.push(record);
        }

        info!(
            resource = %self.name,
            path = %path.display(),
            total,
            kept = kept.len(),
            "Read resource table"
        );
        Ok(kept)
    }
}

//! Aggregate snapshots
//!
//! # Format
//!
//! A gzip stream of two bincode values (standard configuration, serde mode):
//!
//! 1. [`SnapshotHeader`]
//! 2. `(EnzSubMap, ReferenceTable)`
//!
//! The reverse index is not stored; it is rebuilt from the interactions.

use chrono::{DateTime, Utc};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use ptmnet_common::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::info;

use crate::models::{EnzSubMap, ReferenceTable};

/// Bumped whenever the serialized models change
pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotHeader {
    pub format_version: u32,
    pub created_at: DateTime<Utc>,
    pub ncbi_tax_id: u32,
    pub interactions: u64,
}

/// Write a snapshot, replacing any file at `path`
pub fn save(path: &Path, ncbi_tax_id: u32, enz_sub: &EnzSubMap, references: &ReferenceTable) -> Result<SnapshotHeader> {
    let header = SnapshotHeader {
        format_version: FORMAT_VERSION,
        created_at: Utc::now(),
        ncbi_tax_id,
        interactions: enz_sub.values().map(|v| v.len() as u64).sum(),
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut encoder = GzEncoder::new(BufWriter::new(File::create(path)?), Compression::default());
    bincode::serde::encode_into_std_write(&header, &mut encoder, bincode::config::standard())?;
    bincode::serde::encode_into_std_write((enz_sub, references), &mut encoder, bincode::config::standard())?;
    encoder.finish()?.flush()?;

    info!(
        path = %path.display(),
        interactions = header.interactions,
        "Saved snapshot"
    );
    Ok(header)
}

/// Read a snapshot written by [`save`]
pub fn load(path: &Path) -> Result<(SnapshotHeader, EnzSubMap, ReferenceTable)> {
    let mut decoder = GzDecoder::new(BufReader::new(File::open(path)?));

    let header: SnapshotHeader = bincode::serde::decode_from_std_read(&mut decoder, bincode::config::standard())?;
    if header.format_version != FORMAT_VERSION {
        return Err(Error::parse(format!(
            "Snapshot {} has format version {}, expected {}",
            path.display(),
            header.format_version,
            FORMAT_VERSION
        )));
    }

    let (enz_sub, references): (EnzSubMap, ReferenceTable) =
        bincode::serde::decode_from_std_read(&mut decoder, bincode::config::standard())?;

    info!(
        path = %path.display(),
        interactions = header.interactions,
        created_at = %header.created_at,
        "Loaded snapshot"
    );
    Ok((header, enz_sub, references))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("enz_sub.snapshot");

        let saved = save(&path, 10090, &EnzSubMap::new(), &ReferenceTable::new()).unwrap();
        let (header, enz_sub, references) = load(&path).unwrap();

        assert_eq!(header, saved);
        assert_eq!(header.ncbi_tax_id, 10090);
        assert!(enz_sub.is_empty());
        assert!(references.is_empty());
    }

    #[test]
    fn test_garbage_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.snapshot");
        std::fs::write(&path, b"not a snapshot").unwrap();

        assert!(load(&path).is_err());
    }
}

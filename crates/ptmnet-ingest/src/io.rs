//! File helpers shared by the file-backed inputs and stores

use flate2::read::GzDecoder;
use ptmnet_common::Result;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Open a file for buffered reading
///
/// Automatically handles .gz compression based on file extension
pub fn open_reader(path: &Path) -> Result<Box<dyn BufRead>> {
    let file = File::open(path)?;

    if path.extension().and_then(|s| s.to_str()) == Some("gz") {
        Ok(Box::new(BufReader::new(GzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// First existing `<dir>/<stem>.<ext>` (and `.gz` variant) for the given extensions
pub fn find_file(dir: &Path, stem: &str, extensions: &[&str]) -> Option<PathBuf> {
    extensions
        .iter()
        .flat_map(|ext| [format!("{stem}.{ext}"), format!("{stem}.{ext}.gz")])
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

/// Tab separated reader with a header row
pub fn tsv_reader(reader: Box<dyn BufRead>) -> csv::Reader<Box<dyn BufRead>> {
    csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .comment(Some(b'#'))
        .flexible(true)
        .from_reader(reader)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use flate2::{write::GzEncoder, Compression};
    use std::io::{Read, Write};

    #[test]
    fn test_find_file_prefers_listed_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("signor.jsonl"), "").unwrap();
        std::fs::write(dir.path().join("signor.tsv.gz"), "").unwrap();

        let found = find_file(dir.path(), "signor", &["tsv", "jsonl"]).unwrap();
        assert_eq!(found.file_name().unwrap(), "signor.tsv.gz");
        assert!(find_file(dir.path(), "hprd", &["tsv"]).is_none());
    }

    #[test]
    fn test_open_reader_decompresses_gz() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.tsv.gz");
        let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        encoder.write_all(b"a\tb\n1\t2\n").unwrap();
        encoder.finish().unwrap();

        let mut content = String::new();
        open_reader(&path).unwrap().read_to_string(&mut content).unwrap();
        assert_eq!(content, "a\tb\n1\t2\n");
    }
}

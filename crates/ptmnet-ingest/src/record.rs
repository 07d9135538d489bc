//! Normalized raw enzyme-substrate record
//!
//! Every input produces [`RawPtmRecord`]s. Tables use the raw column names of
//! the resources (`kinase`, `substrate`, `resaa`, `resnum`, ...); list valued
//! columns are `;` separated in TSV and may be arrays in JSON lines.

use ptmnet_common::{Error, Result};
use serde::de::{self, Deserializer, SeqAccess, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One enzyme-substrate claim as reported by a resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPtmRecord {
    /// Enzyme identifiers (one record may name several enzymes)
    #[serde(rename = "kinase", alias = "enzyme", deserialize_with = "one_or_many", default)]
    pub enzymes: Vec<String>,
    /// Substrate identifier
    pub substrate: String,
    /// Residue letter
    pub resaa: char,
    /// 1-based residue position
    pub resnum: u32,
    /// Literal sequence window around the site
    #[serde(default)]
    pub instance: Option<String>,
    /// Window start (1-based)
    #[serde(default)]
    pub start: Option<u32>,
    /// Window end (1-based, inclusive)
    #[serde(default)]
    pub end: Option<u32>,
    /// Modification type, `phosphorylation` when absent
    #[serde(default)]
    pub typ: Option<String>,
    /// Literature references (PubMed ids)
    #[serde(deserialize_with = "one_or_many", default)]
    pub references: Vec<String>,
    /// Organism the record was curated in (taxonomy id or name)
    #[serde(default)]
    pub organism: Option<String>,
    /// Low-throughput evidence flag
    #[serde(default)]
    pub ltp: Option<bool>,

    // === Resource specific fields ===
    /// MIMP source databases
    #[serde(deserialize_with = "one_or_many", default)]
    pub databases: Vec<String>,
    /// MIMP number of PubMed ids
    #[serde(default)]
    pub npmid: Option<u32>,
    /// ProtMapper evidence databases
    #[serde(deserialize_with = "one_or_many", default)]
    pub evidences: Vec<String>,
    /// phosphoNetworks score
    #[serde(default)]
    pub score: Option<f64>,
    /// dbPTM original source
    #[serde(default)]
    pub source: Option<String>,
}

impl RawPtmRecord {
    /// Minimal record: enzymes, substrate and the site
    pub fn new<I, S>(enzymes: I, substrate: impl Into<String>, resaa: char, resnum: u32) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            enzymes: enzymes.into_iter().map(Into::into).collect(),
            substrate: substrate.into(),
            resaa,
            resnum,
            instance: None,
            start: None,
            end: None,
            typ: None,
            references: Vec::new(),
            organism: None,
            ltp: None,
            databases: Vec::new(),
            npmid: None,
            evidences: Vec::new(),
            score: None,
            source: None,
        }
    }

    pub fn with_references<I, S>(mut self, references: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.references = references.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_instance(mut self, instance: impl Into<String>, start: u32, end: u32) -> Self {
        self.instance = Some(instance.into());
        self.start = Some(start);
        self.end = Some(end);
        self
    }

    pub fn with_typ(mut self, typ: impl Into<String>) -> Self {
        self.typ = Some(typ.into());
        self
    }

    /// True when the record names at least one non-empty enzyme
    pub fn has_enzyme(&self) -> bool {
        self.enzymes.iter().any(|e| !e.trim().is_empty())
    }

    /// Validate the record for consistency
    pub fn validate(&self) -> Result<()> {
        if self.substrate.trim().is_empty() {
            return Err(Error::parse("Substrate cannot be empty"));
        }
        if self.resnum == 0 {
            return Err(Error::parse(format!(
                "Residue number must be 1-based, got 0 for substrate {}",
                self.substrate
            )));
        }
        if !self.resaa.is_ascii_alphabetic() {
            return Err(Error::parse(format!(
                "Invalid residue letter '{}' for substrate {}",
                self.resaa, self.substrate
            )));
        }
        if let (Some(instance), Some(start), Some(end)) = (&self.instance, self.start, self.end) {
            let span = end.checked_sub(start).and_then(|d| d.checked_add(1));
            if start == 0 || span.map(|n| n as usize) != Some(instance.chars().count()) {
                return Err(Error::parse(format!(
                    "Instance '{}' does not span {}-{} for substrate {}",
                    instance, start, end, self.substrate
                )));
            }
        }
        Ok(())
    }
}

/// Accept a single value (split on `;`), a number, a list, or nothing
fn one_or_many<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    struct OneOrMany;

    impl<'de> Visitor<'de> for OneOrMany {
        type Value = Vec<String>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a string, a number or a list of strings")
        }

        fn visit_str<E: de::Error>(self, value: &str) -> std::result::Result<Self::Value, E> {
            Ok(value
                .split(';')
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .collect())
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> std::result::Result<Self::Value, E> {
            Ok(vec![value.to_string()])
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> std::result::Result<Self::Value, E> {
            Ok(vec![value.to_string()])
        }

        fn visit_f64<E: de::Error>(self, value: f64) -> std::result::Result<Self::Value, E> {
            Ok(vec![value.to_string()])
        }

        fn visit_none<E: de::Error>(self) -> std::result::Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_unit<E: de::Error>(self) -> std::result::Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_some<D2: Deserializer<'de>>(self, deserializer: D2) -> std::result::Result<Self::Value, D2::Error> {
            deserializer.deserialize_any(OneOrMany)
        }

        fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<Self::Value, A::Error> {
            let mut values = Vec::new();
            while let Some(Scalar(value)) = seq.next_element::<Scalar>()? {
                if !value.trim().is_empty() {
                    values.push(value.trim().to_string());
                }
            }
            Ok(values)
        }
    }

    deserializer.deserialize_any(OneOrMany)
}

/// A list element that may be written as a string or a bare number
struct Scalar(String);

impl<'de> Deserialize<'de> for Scalar {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct ScalarVisitor;

        impl Visitor<'_> for ScalarVisitor {
            type Value = Scalar;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a string or a number")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> std::result::Result<Scalar, E> {
                Ok(Scalar(value.to_string()))
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> std::result::Result<Scalar, E> {
                Ok(Scalar(value.to_string()))
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> std::result::Result<Scalar, E> {
                Ok(Scalar(value.to_string()))
            }

            fn visit_f64<E: de::Error>(self, value: f64) -> std::result::Result<Scalar, E> {
                Ok(Scalar(value.to_string()))
            }
        }

        deserializer.deserialize_any(ScalarVisitor)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_json_with_list_fields() {
        let line = r#"{"kinase": ["AKT1", "AKT2"], "substrate": "TP53", "resaa": "S", "resnum": 15, "references": [12345, "67890"]}"#;
        let record: RawPtmRecord = serde_json::from_str(line).unwrap();

        assert_eq!(record.enzymes, vec!["AKT1", "AKT2"]);
        assert_eq!(record.references, vec!["12345", "67890"]);
        assert_eq!(record.instance, None);
    }

    #[test]
    fn test_deserialize_json_with_joined_fields() {
        let line = r#"{"kinase": "AKT1;AKT2", "substrate": "TP53", "resaa": "S", "resnum": 15, "references": "1;2", "score": 0.7}"#;
        let record: RawPtmRecord = serde_json::from_str(line).unwrap();
        assert_eq!(record.enzymes, vec!["AKT1", "AKT2"]);
        assert_eq!(record.references, vec!["1", "2"]);
        assert_eq!(record.score, Some(0.7));
    }

    #[test]
    fn test_validate() {
        let record = RawPtmRecord::new(["AKT1"], "TP53", 'S', 15);
        assert!(record.validate().is_ok());

        let bad_window = record.clone().with_instance("PLSQ", 13, 17);
        assert!(bad_window.validate().is_err());

        let zero = RawPtmRecord::new(["AKT1"], "TP53", 'S', 0);
        assert!(zero.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_extreme_window_bounds() {
        let record = RawPtmRecord::new(["AKT1"], "TP53", 'S', 15);

        let full_range = record.clone().with_instance("PLSQE", 0, u32::MAX);
        assert!(matches!(full_range.validate(), Err(Error::Parse(_))));

        let zero_start = record.clone().with_instance("M", 0, 0);
        assert!(matches!(zero_start.validate(), Err(Error::Parse(_))));

        let max_end = record.with_instance("S", u32::MAX, u32::MAX);
        assert!(max_end.validate().is_ok());
    }

    #[test]
    fn test_has_enzyme() {
        assert!(RawPtmRecord::new(["AKT1"], "TP53", 'S', 15).has_enzyme());
        assert!(!RawPtmRecord::new(Vec::<String>::new(), "TP53", 'S', 15).has_enzyme());
        assert!(!RawPtmRecord::new([" "], "TP53", 'S', 15).has_enzyme());
    }
}

//! Built-in enzyme-substrate resources and their processing profiles

use ptmnet_common::{taxonomy, Error, IdType};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use super::InputArgs;
use crate::models::DEFAULT_MODIFICATION;

/// Enzyme-substrate resources with a known processing profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Resource {
    PhosphoSite,
    PhosphoElm,
    Signor,
    Hprd,
    DbPtm,
    Li2012,
    Mimp,
    PhosphoNetworks,
    ProtMapper,
    Kea,
    Depod,
}

/// Resources an aggregator processes when none are given
pub const DEFAULT_INPUTS: [Resource; 10] = [
    Resource::Signor,
    Resource::Mimp,
    Resource::PhosphoNetworks,
    Resource::PhosphoElm,
    Resource::DbPtm,
    Resource::PhosphoSite,
    Resource::Hprd,
    Resource::Li2012,
    Resource::ProtMapper,
    Resource::Kea,
];

const HUMAN_ONLY: &[u32] = &[taxonomy::HUMAN];
const HUMAN_AND_MOUSE: &[u32] = &[taxonomy::HUMAN, taxonomy::MOUSE];

impl Resource {
    pub const ALL: [Resource; 11] = [
        Resource::PhosphoSite,
        Resource::PhosphoElm,
        Resource::Signor,
        Resource::Hprd,
        Resource::DbPtm,
        Resource::Li2012,
        Resource::Mimp,
        Resource::PhosphoNetworks,
        Resource::ProtMapper,
        Resource::Kea,
        Resource::Depod,
    ];

    /// Name used as the `source` of every interaction from this resource
    pub fn name(&self) -> &'static str {
        match self {
            Resource::PhosphoSite => "PhosphoSite",
            Resource::PhosphoElm => "phosphoELM",
            Resource::Signor => "SIGNOR",
            Resource::Hprd => "HPRD",
            Resource::DbPtm => "dbPTM",
            Resource::Li2012 => "Li2012",
            Resource::Mimp => "MIMP",
            Resource::PhosphoNetworks => "phosphoNetworks",
            Resource::ProtMapper => "ProtMapper",
            Resource::Kea => "KEA",
            Resource::Depod => "DEPOD",
        }
    }

    pub fn profile(&self) -> ResourceProfile {
        let base = ResourceProfile::default();
        match self {
            Resource::PhosphoSite => ResourceProfile {
                organism_scoped: true,
                organism_param: OrganismParam::CommonName,
                raw_enzyme_id_type: Some(IdType::Uniprot),
                defaults: &[("strict", false)],
                ..base
            },
            Resource::PhosphoElm => ResourceProfile {
                organism_scoped: true,
                organism_param: OrganismParam::LatinName,
                raw_enzyme_id_type: Some(IdType::Uniprot),
                substrate_id_types: Some(&[IdType::Uniprot]),
                ..base
            },
            Resource::Signor => ResourceProfile {
                organism_scoped: true,
                raw_enzyme_id_type: Some(IdType::Uniprot),
                substrate_id_types: Some(&[IdType::Uniprot]),
                ..base
            },
            Resource::DbPtm => ResourceProfile {
                organism_scoped: true,
                ..base
            },
            Resource::Hprd | Resource::Li2012 | Resource::PhosphoNetworks => ResourceProfile {
                supported_organisms: Some(HUMAN_ONLY),
                ..base
            },
            Resource::Mimp => ResourceProfile {
                supported_organisms: Some(HUMAN_ONLY),
                substrate_id_types: Some(&[IdType::GeneSymbol, IdType::RefSeqProtein]),
                ..base
            },
            Resource::ProtMapper => ResourceProfile {
                supported_organisms: Some(HUMAN_ONLY),
                raw_enzyme_id_type: Some(IdType::Uniprot),
                substrate_id_types: Some(&[IdType::Uniprot]),
                ..base
            },
            Resource::Kea => ResourceProfile {
                supported_organisms: Some(HUMAN_AND_MOUSE),
                ..base
            },
            Resource::Depod => ResourceProfile {
                supported_organisms: Some(HUMAN_ONLY),
                default_modification: "dephosphorylation",
                ..base
            },
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Resource {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "phosphosite" | "psite" | "psp" => Ok(Resource::PhosphoSite),
            "phosphoelm" | "phospho.elm" => Ok(Resource::PhosphoElm),
            "signor" => Ok(Resource::Signor),
            "hprd" => Ok(Resource::Hprd),
            "dbptm" => Ok(Resource::DbPtm),
            "li2012" => Ok(Resource::Li2012),
            "mimp" => Ok(Resource::Mimp),
            "phosphonetworks" | "pnetworks" => Ok(Resource::PhosphoNetworks),
            "protmapper" => Ok(Resource::ProtMapper),
            "kea" => Ok(Resource::Kea),
            "depod" => Ok(Resource::Depod),
            other => Err(Error::config(format!("Unknown resource: {other}"))),
        }
    }
}

/// How an organism-scoped resource expects the organism argument
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrganismParam {
    #[default]
    TaxId,
    CommonName,
    LatinName,
}

impl OrganismParam {
    /// Argument value for a taxon, `None` when the resource cannot name it
    pub fn value(&self, ncbi_tax_id: u32) -> Option<Value> {
        match self {
            OrganismParam::TaxId => Some(Value::from(ncbi_tax_id)),
            OrganismParam::CommonName => taxonomy::common_name(ncbi_tax_id).map(Value::from),
            OrganismParam::LatinName => taxonomy::latin_name(ncbi_tax_id).map(Value::from),
        }
    }
}

/// Per-resource processing rules
#[derive(Debug, Clone, Copy)]
pub struct ResourceProfile {
    /// The input takes an `organism` argument
    pub organism_scoped: bool,
    pub organism_param: OrganismParam,
    /// `None` means any organism
    pub supported_organisms: Option<&'static [u32]>,
    /// Identifier type of the raw enzyme names, if fixed by the resource
    pub raw_enzyme_id_type: Option<IdType>,
    /// Substrate identifier types, tried in order and unioned; fixed by the resource if set
    pub substrate_id_types: Option<&'static [IdType]>,
    pub default_modification: &'static str,
    /// Flags applied unless the caller gives them
    pub defaults: &'static [(&'static str, bool)],
}

impl Default for ResourceProfile {
    fn default() -> Self {
        Self {
            organism_scoped: false,
            organism_param: OrganismParam::TaxId,
            supported_organisms: None,
            raw_enzyme_id_type: None,
            substrate_id_types: None,
            default_modification: DEFAULT_MODIFICATION,
            defaults: &[],
        }
    }
}

impl ResourceProfile {
    pub fn supports(&self, ncbi_tax_id: u32) -> bool {
        self.supported_organisms
            .is_none_or(|taxa| taxa.contains(&ncbi_tax_id))
    }

    /// Fill in default arguments and the organism argument
    ///
    /// Caller-supplied arguments are never overwritten. For phosphoELM
    /// `ltp_only` defaults to true for human only.
    pub fn apply_defaults(&self, resource: Resource, args: &mut InputArgs, ncbi_tax_id: u32) {
        for (key, value) in self.defaults {
            args.entry(*key).or_insert(Value::Bool(*value));
        }

        if resource == Resource::PhosphoElm {
            args.entry("ltp_only")
                .or_insert_with(|| Value::Bool(ncbi_tax_id == taxonomy::HUMAN));
        }

        if self.organism_scoped && !args.contains_key("organism") {
            if let Some(value) = self.organism_param.value(ncbi_tax_id) {
                args.insert("organism".to_string(), value);
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for resource in Resource::ALL {
            assert_eq!(resource.name().parse::<Resource>().unwrap(), resource);
        }
        assert_eq!("phospho.ELM".parse::<Resource>().unwrap(), Resource::PhosphoElm);
        assert!("Reactome".parse::<Resource>().is_err());
    }

    #[test]
    fn test_organism_policies() {
        assert!(Resource::Hprd.profile().supports(9606));
        assert!(!Resource::Hprd.profile().supports(10090));
        assert!(Resource::Kea.profile().supports(10090));
        assert!(!Resource::Kea.profile().supports(10116));
        assert!(Resource::Signor.profile().supports(10116));
    }

    #[test]
    fn test_phosphosite_takes_common_name_and_is_not_strict() {
        let mut args = InputArgs::new();
        Resource::PhosphoSite
            .profile()
            .apply_defaults(Resource::PhosphoSite, &mut args, 10090);

        assert_eq!(args["organism"], Value::from("mouse"));
        assert_eq!(args["strict"], Value::Bool(false));
    }

    #[test]
    fn test_phosphoelm_ltp_only_depends_on_organism() {
        let profile = Resource::PhosphoElm.profile();

        let mut human = InputArgs::new();
        profile.apply_defaults(Resource::PhosphoElm, &mut human, 9606);
        assert_eq!(human["ltp_only"], Value::Bool(true));
        assert_eq!(human["organism"], Value::from("Homo sapiens"));

        let mut mouse = InputArgs::new();
        profile.apply_defaults(Resource::PhosphoElm, &mut mouse, 10090);
        assert_eq!(mouse["ltp_only"], Value::Bool(false));

        let mut given = InputArgs::new();
        given.insert("ltp_only".to_string(), Value::Bool(true));
        given.insert("organism".to_string(), Value::from(10090));
        profile.apply_defaults(Resource::PhosphoElm, &mut given, 10090);
        assert_eq!(given["ltp_only"], Value::Bool(true));
        assert_eq!(given["organism"], Value::from(10090));
    }

    #[test]
    fn test_unscoped_resources_get_no_organism() {
        let mut args = InputArgs::new();
        Resource::Hprd
            .profile()
            .apply_defaults(Resource::Hprd, &mut args, 9606);
        assert!(args.is_empty());
    }
}

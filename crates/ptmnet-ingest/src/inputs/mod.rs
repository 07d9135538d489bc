//! Raw enzyme-substrate inputs
//!
//! An input is anything that produces [`RawPtmRecord`]s from a JSON argument
//! map. Processors name their input with an [`InputMethod`], which the
//! [`InputRegistry`] resolves in this order:
//!
//! 1. a callable input, used as is
//! 2. a built-in [`Resource`] name (case-insensitive)
//! 3. a named input, by full name or by the last segment of a dotted path
//!
//! Anything else resolves to an input producing nothing.

pub mod resources;
pub mod table;

pub use resources::{OrganismParam, Resource, ResourceProfile, DEFAULT_INPUTS};
pub use table::TableInput;

use ptmnet_common::Result;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::record::RawPtmRecord;

/// Keyword arguments forwarded to an input
pub type InputArgs = serde_json::Map<String, Value>;

/// A producer of raw enzyme-substrate records
pub trait PtmInput {
    /// Resource name reported as the source of the interactions
    fn name(&self) -> &str;

    fn fetch(&self, args: &InputArgs) -> Result<Vec<RawPtmRecord>>;
}

/// Input backed by a closure
pub struct FnInput<F> {
    name: String,
    fetch: F,
}

impl<F> FnInput<F>
where
    F: Fn(&InputArgs) -> Result<Vec<RawPtmRecord>>,
{
    pub fn new(name: impl Into<String>, fetch: F) -> Self {
        Self {
            name: name.into(),
            fetch,
        }
    }
}

impl<F> PtmInput for FnInput<F>
where
    F: Fn(&InputArgs) -> Result<Vec<RawPtmRecord>>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self, args: &InputArgs) -> Result<Vec<RawPtmRecord>> {
        (self.fetch)(args)
    }
}

/// Input that produces nothing
#[derive(Debug, Clone)]
pub struct NoopInput {
    name: String,
}

impl NoopInput {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl PtmInput for NoopInput {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self, _args: &InputArgs) -> Result<Vec<RawPtmRecord>> {
        Ok(Vec::new())
    }
}

/// How a processor names its input
#[derive(Clone)]
pub enum InputMethod {
    Callable(Arc<dyn PtmInput>),
    /// A resource name or a dotted method path
    Name(String),
}

impl InputMethod {
    pub fn callable(input: impl PtmInput + 'static) -> Self {
        InputMethod::Callable(Arc::new(input))
    }

    pub fn label(&self) -> String {
        match self {
            InputMethod::Callable(input) => input.name().to_string(),
            InputMethod::Name(name) => name.clone(),
        }
    }
}

impl fmt::Debug for InputMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputMethod::Callable(input) => f.debug_tuple("Callable").field(&input.name()).finish(),
            InputMethod::Name(name) => f.debug_tuple("Name").field(name).finish(),
        }
    }
}

impl From<&str> for InputMethod {
    fn from(name: &str) -> Self {
        InputMethod::Name(name.to_string())
    }
}

impl From<String> for InputMethod {
    fn from(name: String) -> Self {
        InputMethod::Name(name)
    }
}

impl From<Resource> for InputMethod {
    fn from(resource: Resource) -> Self {
        InputMethod::Name(resource.name().to_string())
    }
}

impl From<Arc<dyn PtmInput>> for InputMethod {
    fn from(input: Arc<dyn PtmInput>) -> Self {
        InputMethod::Callable(input)
    }
}

/// Outcome of input resolution
#[derive(Clone)]
pub struct ResolvedInput {
    pub input: Arc<dyn PtmInput>,
    /// Set when the input is a built-in resource with a profile
    pub resource: Option<Resource>,
    /// Source name of the produced interactions
    pub name: String,
}

/// Concrete inputs for the built-in resources and for extra named inputs
#[derive(Default)]
pub struct InputRegistry {
    resources: HashMap<Resource, Arc<dyn PtmInput>>,
    named: HashMap<String, Arc<dyn PtmInput>>,
}

impl InputRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with a [`TableInput`] in `dir` for every built-in resource
    pub fn with_data_dir(dir: &Path) -> Self {
        let mut registry = Self::new();
        for resource in Resource::ALL {
            registry.register(resource, TableInput::new(resource.name(), dir));
        }
        registry
    }

    pub fn register(&mut self, resource: Resource, input: impl PtmInput + 'static) {
        self.resources.insert(resource, Arc::new(input));
    }

    /// Register an input under a free-form, case-insensitive name
    pub fn register_named(&mut self, name: &str, input: impl PtmInput + 'static) {
        self.named.insert(name.to_lowercase(), Arc::new(input));
    }

    pub fn resolve(&self, method: &InputMethod) -> ResolvedInput {
        match method {
            InputMethod::Callable(input) => ResolvedInput {
                input: Arc::clone(input),
                resource: input.name().parse().ok(),
                name: input.name().to_string(),
            },
            InputMethod::Name(name) => self.resolve_name(name),
        }
    }

    fn resolve_name(&self, name: &str) -> ResolvedInput {
        if let Ok(resource) = name.parse::<Resource>() {
            let input = match self.resources.get(&resource) {
                Some(input) => Arc::clone(input),
                None => {
                    warn!(resource = resource.name(), "No input registered for resource");
                    Arc::new(NoopInput::new(resource.name()))
                },
            };
            return ResolvedInput {
                input,
                resource: Some(resource),
                name: resource.name().to_string(),
            };
        }

        let last = name.rsplit('.').next().unwrap_or(name);
        for candidate in [name, last] {
            if let Some(input) = self.named.get(&candidate.to_lowercase()) {
                debug!(method = name, input = input.name(), "Resolved named input");
                return ResolvedInput {
                    input: Arc::clone(input),
                    resource: input.name().parse().ok(),
                    name: input.name().to_string(),
                };
            }
        }

        warn!(method = name, "Could not resolve input method, it will produce nothing");
        ResolvedInput {
            input: Arc::new(NoopInput::new(last)),
            resource: None,
            name: last.to_string(),
        }
    }
}

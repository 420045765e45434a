//! Environment override handling
//!
//! Folds the parameter values given on the command line into the env table
//! written to the installed kernel.json.

use crate::{
    core::manifest::InstallerManifest,
    error::{InstallerError, Result},
};
use std::collections::BTreeMap;
use tracing::{debug, instrument};

/// A value supplied for a parameter, tagged with its argv position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvidedValue {
    /// Index of the value on the command line
    pub position: usize,
    /// Parameter flag name
    pub parameter: String,
    /// Value as typed, before alias resolution
    pub raw: String,
}

/// Ordered collection of parameter values from the command line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvOverrides {
    values: Vec<ProvidedValue>,
}

impl EnvOverrides {
    /// Create an empty set of overrides
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a value for `parameter` seen at argv `position`
    pub fn push(&mut self, position: usize, parameter: impl Into<String>, raw: impl Into<String>) {
        self.values.push(ProvidedValue {
            position,
            parameter: parameter.into(),
            raw: raw.into(),
        });
    }

    /// Whether no value was given on the command line
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Resolve every value against the manifest, then apply defaults
    #[instrument(skip(self, manifest))]
    pub fn resolve(&self, manifest: &InstallerManifest) -> Result<BTreeMap<String, String>> {
        let mut ordered: Vec<&ProvidedValue> = self.values.iter().collect();
        ordered.sort_by_key(|v| v.position);

        let mut env = BTreeMap::new();
        for provided in ordered {
            let param = manifest.parameter(&provided.parameter).ok_or_else(|| {
                InstallerError::parameter(&provided.parameter, "no such parameter")
            })?;
            let value = param.resolve_value(&provided.raw)?;
            debug!("{} -> {}={}", provided.parameter, param.env_var, value);
            param.apply(value, &mut env);
        }

        // Defaults are keyed by variable, so any value for the same variable wins
        for param in &manifest.parameters {
            if let Some(default) = &param.default {
                if !env.contains_key(&param.env_var) {
                    let value = param.resolve_value(default)?;
                    debug!("{} defaults to {}={}", param.name, param.env_var, value);
                    env.insert(param.env_var.clone(), value);
                }
            }
        }

        Ok(env)
    }
}

/// Split a `NAME=VALUE` assignment given to `--param`
pub fn parse_param_assignment(assignment: &str) -> Result<(String, String)> {
    match assignment.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(InstallerError::validation(format!(
            "Parameter must be of the form 'NAME=VALUE' but was '{assignment}'"
        ))),
    }
}

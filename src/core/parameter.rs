//! Installer parameter definitions
//!
//! A parameter is a CLI flag that sets one environment variable in the
//! installed kernel.json. Values pass through the parameter's alias table
//! before they are validated against its kind.

use crate::error::{InstallerError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Flag names and argument ids owned by the installer itself
pub const RESERVED_NAMES: &[&str] = &[
    "user",
    "sys-prefix",
    "sys_prefix",
    "prefix",
    "replace",
    "help",
    "legacy",
    "python",
    "manifest",
    "param",
    "params",
    "debug",
    "version",
];

const NAME_PATTERN: &str = r"^[a-zA-Z][-_a-zA-Z0-9]*$";
const ENV_VAR_PATTERN: &str = r"^[a-zA-Z_][a-zA-Z0-9_]*$";

/// Separator used to join repeated values of a list parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListSeparator {
    /// The platform's path-list separator (`:` or `;`)
    Path,
    /// The platform's directory separator (`/` or `\`)
    File,
    /// A fixed string
    Literal(String),
}

impl ListSeparator {
    /// The concrete separator string for the current platform
    pub fn as_str(&self) -> &str {
        match self {
            Self::Path => {
                if cfg!(windows) {
                    ";"
                } else {
                    ":"
                }
            }
            Self::File => std::path::MAIN_SEPARATOR_STR,
            Self::Literal(sep) => sep,
        }
    }
}

impl Default for ListSeparator {
    fn default() -> Self {
        Self::Literal(" ".to_string())
    }
}

/// How a parameter's values are validated and stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ParameterKind {
    /// Any string, last occurrence wins
    String,
    /// A value that must parse as a floating point number
    Number,
    /// Every occurrence is appended, joined by the separator
    List {
        #[serde(default)]
        separator: ListSeparator,
    },
    /// One of a fixed set of values
    OneOf {
        #[serde(default)]
        values: Vec<String>,
    },
}

/// A single installer parameter as declared in the manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSpec {
    /// Flag name, used as `--<name>`
    pub name: String,
    /// Environment variable the value is stored under
    pub env_var: String,
    /// Value kind
    #[serde(flatten)]
    pub kind: ParameterKind,
    /// Help text shown for the flag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Shorthand spellings mapped to their full values
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub aliases: BTreeMap<String, String>,
    /// Value used when the flag is not given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

impl ParameterSpec {
    /// Create a parameter with no description, aliases or default
    pub fn new(name: impl Into<String>, env_var: impl Into<String>, kind: ParameterKind) -> Self {
        Self {
            name: name.into(),
            env_var: env_var.into(),
            kind,
            description: None,
            aliases: BTreeMap::new(),
            default: None,
        }
    }

    /// Check the declaration itself: names, kind settings and default
    pub fn validate(&self) -> Result<()> {
        let env_re = Regex::new(ENV_VAR_PATTERN)
            .map_err(|e| InstallerError::validation(format!("Failed to compile regex: {e}")))?;
        let name_re = Regex::new(NAME_PATTERN)
            .map_err(|e| InstallerError::validation(format!("Failed to compile regex: {e}")))?;

        if !env_re.is_match(&self.env_var) {
            return Err(InstallerError::parameter(
                &self.name,
                format!(
                    "environment variable name must match '[a-zA-Z_][a-zA-Z0-9_]*' but was '{}'",
                    self.env_var
                ),
            ));
        }

        if !name_re.is_match(&self.name) {
            return Err(InstallerError::parameter(
                &self.name,
                "name must match '[a-zA-Z][-_a-zA-Z0-9]*'",
            ));
        }

        if RESERVED_NAMES.contains(&self.name.as_str()) {
            return Err(InstallerError::parameter(
                &self.name,
                format!("name cannot be one of {RESERVED_NAMES:?}"),
            ));
        }

        if let ParameterKind::OneOf { values } = &self.kind {
            if values.is_empty() {
                return Err(InstallerError::parameter(
                    &self.name,
                    "one_of parameter declares no values",
                ));
            }
        }

        if let Some(default) = &self.default {
            self.resolve_value(default)?;
        }

        Ok(())
    }

    /// Map a raw CLI value through the aliases and validate it
    pub fn resolve_value(&self, raw: &str) -> Result<String> {
        let value = self.aliases.get(raw).map_or(raw, String::as_str);

        match &self.kind {
            ParameterKind::Number => {
                if value.trim().parse::<f64>().is_err() {
                    return Err(InstallerError::parameter(
                        &self.name,
                        format!("expects a number value but was given '{value}'"),
                    ));
                }
            }
            ParameterKind::OneOf { values } => {
                if !values.iter().any(|v| v == value) {
                    return Err(InstallerError::parameter(
                        &self.name,
                        format!("expects one of {values:?} but was given '{value}'"),
                    ));
                }
            }
            ParameterKind::String | ParameterKind::List { .. } => {}
        }

        Ok(value.to_string())
    }

    /// Store an already resolved value in the environment table
    pub fn apply(&self, value: String, env: &mut BTreeMap<String, String>) {
        match &self.kind {
            ParameterKind::List { separator } => {
                env.entry(self.env_var.clone())
                    .and_modify(|current| {
                        current.push_str(separator.as_str());
                        current.push_str(&value);
                    })
                    .or_insert(value);
            }
            _ => {
                env.insert(self.env_var.clone(), value);
            }
        }
    }

    /// Help text for the generated flag
    pub fn help(&self) -> Option<String> {
        let choices = match &self.kind {
            ParameterKind::OneOf { values } => Some(format!("[possible values: {}]", values.join(", "))),
            _ => None,
        };

        match (&self.description, choices) {
            (Some(description), Some(choices)) => Some(format!("{description} {choices}")),
            (Some(description), None) => Some(description.clone()),
            (None, choices) => choices,
        }
    }
}

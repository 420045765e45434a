//! Installer manifest handling
//!
//! The manifest ships beside the installer and names the kernel, the
//! bundled kernelspec directory and the parameter flags exposed on the
//! command line.

use crate::{
    core::parameter::ParameterSpec,
    error::{InstallerError, Result},
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};
use tracing::{debug, instrument};

/// Default manifest file name looked up beside the installer binary
pub const MANIFEST_FILE_NAME: &str = "installer.json";

/// Name of the template file inside the kernelspec directory
pub const KERNEL_JSON: &str = "kernel.json";

fn default_kernel_directory() -> PathBuf {
    PathBuf::from("kernel")
}

/// Installer manifest describing what gets installed and how
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InstallerManifest {
    /// Kernel name, used as the kernelspec directory name in the registry
    pub kernel_name: String,
    /// Bundled kernelspec directory, relative to the manifest
    #[serde(default = "default_kernel_directory")]
    pub kernel_directory: PathBuf,
    /// Human readable name used in messages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Parameters exposed as CLI flags
    #[serde(default)]
    pub parameters: Vec<ParameterSpec>,
    /// Directory the manifest was loaded from
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl InstallerManifest {
    /// Create a manifest for `kernel_name` rooted at `base_dir`
    pub fn new(kernel_name: impl Into<String>, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            kernel_name: kernel_name.into(),
            kernel_directory: default_kernel_directory(),
            display_name: None,
            parameters: Vec::new(),
            base_dir: base_dir.into(),
        }
    }

    /// Load and validate a manifest from disk
    #[instrument]
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading installer manifest: {}", path.display());

        let content = std::fs::read_to_string(path)
            .map_err(|e| InstallerError::file_system("read", path, e))?;

        let mut manifest: Self = serde_json::from_str(&content).map_err(|e| {
            InstallerError::manifest_with_source("Manifest is not valid JSON", path, e)
        })?;

        manifest.base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        manifest.validate().map_err(|e| match e {
            InstallerError::Parameter { .. } => e,
            other => InstallerError::manifest(other.to_string(), path),
        })?;

        debug!(
            "Manifest declares kernel '{}' with {} parameter(s)",
            manifest.kernel_name,
            manifest.parameters.len()
        );
        Ok(manifest)
    }

    /// Validate the kernel name and every parameter declaration
    pub fn validate(&self) -> Result<()> {
        let kernel_name_re = Regex::new(r"^[a-z0-9._-]+$")
            .map_err(|e| InstallerError::validation(format!("Failed to compile regex: {e}")))?;

        if !kernel_name_re.is_match(&self.kernel_name.to_lowercase()) {
            return Err(InstallerError::validation(format!(
                "Invalid kernel name '{}': only letters, digits, '.', '_' and '-' are allowed",
                self.kernel_name
            )));
        }

        let mut seen = HashSet::new();
        for param in &self.parameters {
            param.validate()?;
            if !seen.insert(param.name.as_str()) {
                return Err(InstallerError::parameter(
                    &param.name,
                    "declared more than once",
                ));
            }
        }

        Ok(())
    }

    /// Look up a parameter by flag name
    pub fn parameter(&self, name: &str) -> Option<&ParameterSpec> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// The bundled kernelspec directory
    pub fn kernel_source_dir(&self) -> PathBuf {
        self.base_dir.join(&self.kernel_directory)
    }

    /// The bundled template kernel.json
    pub fn template_kernel_json(&self) -> PathBuf {
        self.kernel_source_dir().join(KERNEL_JSON)
    }

    /// Name shown to the user
    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.kernel_name)
    }

    /// One line description for `--help`
    pub fn about(&self) -> String {
        format!("Install the {} kernel.", self.kernel_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::parameter::ParameterKind;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_sets_base_dir_and_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(MANIFEST_FILE_NAME);
        fs::write(
            &path,
            r#"{
                "kernel_name": "demo",
                "parameters": [
                    {"name": "opts", "env_var": "DEMO_OPTS", "type": "string"}
                ]
            }"#,
        )
        .unwrap();

        let manifest = InstallerManifest::load(&path).unwrap();
        assert_eq!(manifest.kernel_name, "demo");
        assert_eq!(manifest.base_dir, temp_dir.path());
        assert_eq!(
            manifest.kernel_source_dir(),
            temp_dir.path().join("kernel")
        );
        assert_eq!(
            manifest.template_kernel_json(),
            temp_dir.path().join("kernel").join("kernel.json")
        );
        assert!(manifest.parameter("opts").is_some());
        assert!(manifest.parameter("missing").is_none());
        assert_eq!(manifest.about(), "Install the demo kernel.");
    }

    #[test]
    fn test_load_rejects_malformed_json() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(MANIFEST_FILE_NAME);
        fs::write(&path, "{ not json").unwrap();

        let err = InstallerManifest::load(&path).unwrap_err();
        assert!(matches!(err, InstallerError::Manifest { .. }));
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = InstallerManifest::load(&temp_dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, InstallerError::FileSystem { .. }));
    }

    #[test]
    fn test_validate_kernel_name() {
        let manifest = InstallerManifest::new("Java-11.x", ".");
        assert!(manifest.validate().is_ok());

        let manifest = InstallerManifest::new("my kernel", ".");
        assert!(manifest.validate().is_err());

        let manifest = InstallerManifest::new("", ".");
        assert!(manifest.validate().is_err());
    }

    #[test]
    fn test_validate_duplicate_parameters() {
        let mut manifest = InstallerManifest::new("demo", ".");
        manifest
            .parameters
            .push(ParameterSpec::new("opts", "A", ParameterKind::String));
        manifest
            .parameters
            .push(ParameterSpec::new("opts", "B", ParameterKind::String));

        let err = manifest.validate().unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_about_names_the_kernel_not_its_display_name() {
        let mut manifest = InstallerManifest::new("ijava", ".");
        manifest.display_name = Some("Java".into());
        assert_eq!(manifest.display_name(), "Java");
        assert_eq!(manifest.about(), "Install the ijava kernel.");
    }
}

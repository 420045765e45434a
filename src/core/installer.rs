//! Kernelspec installation
//!
//! Copies the bundled kernelspec into its destination and writes the
//! rendered kernel.json over the copied template.

use crate::{
    config::Config,
    core::{
        destination::DestinationResolver,
        kernel_json::{self, KernelSpec},
        manifest::KERNEL_JSON,
    },
    error::{InstallerError, Result},
    utils::fs::FileSystemUtils,
};
use std::{collections::BTreeMap, path::PathBuf};
use tracing::{debug, info, instrument, warn};

/// Installs the kernelspec described by a [`Config`]
pub struct KernelInstaller {
    config: Config,
    resolver: DestinationResolver,
    fs_utils: FileSystemUtils,
}

/// Outcome of a successful install
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    /// Kernel name as registered
    pub kernel_name: String,
    /// Directory the kernelspec was installed into
    pub destination: PathBuf,
    /// Environment overrides written to kernel.json
    pub env: BTreeMap<String, String>,
    /// Whether an existing kernelspec was replaced
    pub replaced: bool,
}

impl KernelInstaller {
    /// Create a new installer with the given configuration
    pub fn new(config: Config, resolver: DestinationResolver) -> Self {
        Self {
            config,
            resolver,
            fs_utils: FileSystemUtils::new(),
        }
    }

    /// Install the kernelspec and return where it went
    #[instrument(skip(self))]
    pub fn install(&self) -> Result<InstallReport> {
        let manifest = &self.config.manifest;
        let destination = self
            .resolver
            .kernel_dir(&self.config.location, &manifest.kernel_name)?;

        info!(
            "Installing kernelspec '{}' into {}",
            manifest.kernel_name,
            destination.display()
        );

        let replaced = self.clear_destination(&destination)?;

        let source_dir = manifest.kernel_source_dir();
        let copied = self
            .fs_utils
            .copy_dir_all(&source_dir, &destination)
            .map_err(|e| InstallerError::file_system("copy kernelspec", &source_dir, e))?;
        debug!("Copied {} file(s) from {}", copied, source_dir.display());

        self.write_kernel_json(&destination)?;

        Ok(InstallReport {
            kernel_name: manifest.kernel_name.clone(),
            destination,
            env: self.config.env.clone(),
            replaced,
        })
    }

    /// Remove an existing install when replacing, refuse otherwise
    fn clear_destination(&self, destination: &std::path::Path) -> Result<bool> {
        if !destination.exists() {
            return Ok(false);
        }

        if !self.config.replace {
            return Err(InstallerError::already_installed(destination));
        }

        info!("Removing existing kernelspec at {}", destination.display());
        self.fs_utils
            .remove_dir_all_if_exists(destination)
            .map_err(|e| InstallerError::file_system("remove", destination, e))
    }

    /// Render the bundled template into the installed kernel.json
    fn write_kernel_json(&self, destination: &std::path::Path) -> Result<()> {
        let template_path = self.config.manifest.template_kernel_json();
        let template = self
            .fs_utils
            .read_file_to_string(&template_path)
            .map_err(|e| InstallerError::file_system("read", &template_path, e))?;

        let rendered = kernel_json::render(&template, destination, &self.config.env, &template_path)?;

        for problem in KernelSpec::problems(&rendered) {
            warn!("{}", problem);
        }

        let installed_path = destination.join(KERNEL_JSON);
        self.fs_utils
            .write_file(&installed_path, rendered.as_bytes())
            .map_err(|e| InstallerError::file_system("write", &installed_path, e))?;

        debug!("Wrote {}", installed_path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{
        destination::{InstallLocation, JupyterPaths},
        manifest::InstallerManifest,
    };
    use serde_json::Value;
    use std::fs;
    use tempfile::TempDir;

    fn bundle(root: &std::path::Path) -> InstallerManifest {
        let kernel_dir = root.join("bundle").join("kernel");
        fs::create_dir_all(&kernel_dir).unwrap();
        fs::write(
            kernel_dir.join("kernel.json"),
            r#"{"argv": ["@KERNEL_INSTALL_DIRECTORY@/run"], "display_name": "Demo", "env": {"A": "1"}}"#,
        )
        .unwrap();
        fs::write(kernel_dir.join("run"), "#!/bin/sh\n").unwrap();

        InstallerManifest::new("Demo", root.join("bundle"))
    }

    fn installer(root: &std::path::Path, replace: bool, env: BTreeMap<String, String>) -> KernelInstaller {
        let config = Config {
            debug: false,
            manifest: bundle(root),
            location: InstallLocation::Prefix(root.join("env")),
            replace,
            python: "python3".into(),
            env,
        };
        let paths = JupyterPaths {
            user_data_dir: None,
            system_data_dir: root.join("system"),
            home_dir: None,
        };
        let resolver = DestinationResolver::new(paths, "python3", false);
        KernelInstaller::new(config, resolver)
    }

    #[test]
    fn test_install_copies_and_rewrites() {
        let temp_dir = TempDir::new().unwrap();
        let mut env = BTreeMap::new();
        env.insert("B".to_string(), "2".to_string());

        let report = installer(temp_dir.path(), false, env).install().unwrap();
        let expected = temp_dir.path().join("env/share/jupyter/kernels/demo");

        assert_eq!(report.destination, expected);
        assert_eq!(report.kernel_name, "Demo");
        assert!(!report.replaced);
        assert!(expected.join("run").is_file());

        let installed: Value =
            serde_json::from_str(&fs::read_to_string(expected.join("kernel.json")).unwrap()).unwrap();
        assert_eq!(
            installed["argv"][0],
            format!("{}/run", expected.to_string_lossy())
        );
        assert_eq!(installed["env"]["A"], "1");
        assert_eq!(installed["env"]["B"], "2");

        // The bundled template is left untouched
        let template =
            fs::read_to_string(temp_dir.path().join("bundle/kernel/kernel.json")).unwrap();
        assert!(template.contains("@KERNEL_INSTALL_DIRECTORY@"));
    }

    #[test]
    fn test_existing_install_requires_replace() {
        let temp_dir = TempDir::new().unwrap();
        installer(temp_dir.path(), false, BTreeMap::new())
            .install()
            .unwrap();

        let err = installer(temp_dir.path(), false, BTreeMap::new())
            .install()
            .unwrap_err();
        assert!(matches!(err, InstallerError::AlreadyInstalled { .. }));
    }

    #[test]
    fn test_replace_removes_stale_files() {
        let temp_dir = TempDir::new().unwrap();
        let report = installer(temp_dir.path(), false, BTreeMap::new())
            .install()
            .unwrap();
        fs::write(report.destination.join("stale.txt"), "old").unwrap();

        let report = installer(temp_dir.path(), true, BTreeMap::new())
            .install()
            .unwrap();
        assert!(report.replaced);
        assert!(!report.destination.join("stale.txt").exists());
        assert!(report.destination.join("kernel.json").is_file());
    }

    #[test]
    fn test_invalid_template_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let installer = installer(temp_dir.path(), false, BTreeMap::new());
        fs::write(temp_dir.path().join("bundle/kernel/kernel.json"), "not json").unwrap();

        let err = installer.install().unwrap_err();
        assert!(matches!(err, InstallerError::KernelJson { .. }));
    }
}

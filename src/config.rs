//! Configuration management for the kernel installer
//!
//! Combines the parsed command line with the installer manifest and
//! validates the result before anything is written.

use crate::{
    cli::Args,
    core::{
        destination::{InstallLocation, default_python},
        manifest::InstallerManifest,
    },
    error::{InstallerError, Result},
    utils::{env::EnvOverrides, fs::FileSystemUtils},
};
use std::collections::BTreeMap;

/// Main configuration structure
#[derive(Debug, Clone)]
pub struct Config {
    /// Enable debug logging
    pub debug: bool,
    /// What to install
    pub manifest: InstallerManifest,
    /// Where to install it
    pub location: InstallLocation,
    /// Overwrite an existing kernelspec with the same name
    pub replace: bool,
    /// Python executable for sys.prefix lookups
    pub python: String,
    /// Environment overrides for the installed kernel.json
    pub env: BTreeMap<String, String>,
}

impl Config {
    /// Create configuration from command line arguments
    pub fn from_args(
        args: &Args,
        manifest: InstallerManifest,
        overrides: &EnvOverrides,
    ) -> Result<Self> {
        let env = overrides.resolve(&manifest)?;

        let config = Self {
            debug: args.debug,
            location: Self::location_from_args(args),
            replace: args.replace,
            python: args
                .python
                .clone()
                .unwrap_or_else(|| default_python().to_string()),
            env,
            manifest,
        };

        config.validate()?;
        Ok(config)
    }

    /// Pick the install location from the mutually exclusive flags
    fn location_from_args(args: &Args) -> InstallLocation {
        if args.user {
            InstallLocation::User
        } else if args.sys_prefix {
            InstallLocation::SysPrefix
        } else if args.legacy {
            InstallLocation::Legacy
        } else if let Some(prefix) = args.prefix.as_ref().filter(|p| !p.as_os_str().is_empty()) {
            InstallLocation::Prefix(prefix.clone())
        } else {
            InstallLocation::System
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let fs_utils = FileSystemUtils::new();

        let source_dir = self.manifest.kernel_source_dir();
        if !fs_utils.is_dir(&source_dir) {
            return Err(InstallerError::validation(format!(
                "Kernel directory not found: {}",
                source_dir.display()
            )));
        }

        let template = self.manifest.template_kernel_json();
        if !fs_utils.is_file(&template) {
            return Err(InstallerError::validation(format!(
                "kernel.json not found in kernel directory: {}",
                template.display()
            )));
        }

        Ok(())
    }
}

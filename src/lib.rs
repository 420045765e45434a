//! # Kernelspec Installer
//!
//! Installs a bundled Jupyter kernelspec into a kernel registry.
//! The installer copies the kernelspec directory into the per-user, prefix,
//! `sys.prefix` or system registry, points the `@KERNEL_INSTALL_DIRECTORY@`
//! token in its kernel.json at the install location, and merges environment
//! overrides given on the command line into the kernel's `env`.
//!
//! ## Features
//!
//! - Install destinations matching `jupyter kernelspec install`
//! - Manifest-declared parameters exposed as CLI flags, with aliases,
//!   number and choice validation, and list accumulation
//! - kernel.json rewriting with sorted, indented output
//!
//! ## Example
//!
//! ```no_run
//! use kernelspec_installer::core::{
//!     DestinationResolver, InstallLocation, JupyterPaths, InstallerManifest,
//! };
//! use std::path::Path;
//!
//! let manifest = InstallerManifest::load(Path::new("installer.json"))?;
//! let resolver = DestinationResolver::new(JupyterPaths::from_env(), "python3", false);
//! let dir = resolver.kernel_dir(&InstallLocation::User, &manifest.kernel_name)?;
//! println!("{} would be installed into {}", manifest.kernel_name, dir.display());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod utils;

use anyhow::Result;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging with appropriate verbosity
///
/// Logs go to stderr; stdout carries only the install result.
pub fn setup_logging(debug: bool) -> Result<()> {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_level(true)
                .compact(),
        )
        .with(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

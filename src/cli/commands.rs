//! Command implementations for the CLI

use crate::{
    config::Config,
    core::{
        destination::{DestinationResolver, JupyterPaths},
        installer::{InstallReport, KernelInstaller},
    },
};
use anyhow::Context;
use tracing::{debug, info, instrument};

/// Install the kernelspec and report where it went
#[instrument(skip(config))]
pub fn execute_install(config: &Config) -> anyhow::Result<InstallReport> {
    let manifest = &config.manifest;
    info!("Installing the {} kernel...", manifest.display_name());

    let resolver = DestinationResolver::new(JupyterPaths::from_env(), &config.python, config.debug);
    let installer = KernelInstaller::new(config.clone(), resolver);

    let report = installer
        .install()
        .with_context(|| format!("Failed to install the {} kernel", manifest.kernel_name))?;

    for (key, value) in &report.env {
        debug!("env {}={}", key, value);
    }
    if report.replaced {
        info!("Replaced the previously installed kernelspec");
    }

    println!(
        "Installed {} kernel into \"{}\"",
        report.kernel_name,
        report.destination.display()
    );

    Ok(report)
}

#![allow(clippy::cargo_common_metadata)]
use anyhow::{Context, Result};
use kernelspec_installer::{cli, config::Config, core::InstallerManifest, setup_logging};
use std::ffi::OsString;

fn main() -> Result<()> {
    let argv: Vec<OsString> = std::env::args_os().collect();

    // The manifest declares the parameter flags, so load it before parsing
    let manifest_path = cli::manifest_path(&argv)?;
    let manifest = InstallerManifest::load(&manifest_path).with_context(|| {
        format!(
            "Failed to load installer manifest {}",
            manifest_path.display()
        )
    })?;

    let invocation = cli::parse_args(&manifest, &argv);

    setup_logging(invocation.args.debug)?;

    let config = Config::from_args(&invocation.args, manifest, &invocation.overrides)?;

    cli::execute_install(&config)?;
    Ok(())
}

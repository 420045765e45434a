//! Command-line argument parsing and validation
//!
//! The fixed flags are declared with clap's derive API. Every parameter in
//! the installer manifest adds one more `--<name> VALUE` flag at runtime.

use crate::{
    core::{
        manifest::{InstallerManifest, MANIFEST_FILE_NAME},
        parameter::ParameterSpec,
    },
    error::{InstallerError, Result},
    utils::env::{EnvOverrides, parse_param_assignment},
};
use clap::{
    Arg, ArgAction, ArgGroup, ArgMatches, CommandFactory, FromArgMatches, Parser,
    builder::TypedValueParser, error::ErrorKind,
};
use std::{
    collections::BTreeSet,
    ffi::OsString,
    path::PathBuf,
};

/// Install a Jupyter kernelspec into a kernel registry
#[derive(Parser, Debug)]
#[command(author, version, long_about = None)]
#[command(name = "install-kernel")]
#[command(group(ArgGroup::new("location").multiple(false)))]
pub struct Args {
    /// Install to the per-user kernel registry.
    #[arg(long, group = "location")]
    pub user: bool,

    /// Install to Python's sys.prefix. Useful in conda/virtual environments.
    #[arg(long = "sys-prefix", group = "location")]
    pub sys_prefix: bool,

    /// Specify a prefix to install to, e.g. an env. The kernelspec will be
    /// installed in PREFIX/share/jupyter/kernels/
    #[arg(
        long,
        value_name = "PREFIX",
        group = "location",
        value_parser = clap::builder::OsStringValueParser::new().map(PathBuf::from)
    )]
    pub prefix: Option<PathBuf>,

    /// Install to $HOME/.ipython. Not recommended but available if needed.
    #[arg(long, group = "location")]
    pub legacy: bool,

    /// Replace any existing kernel spec with this name.
    #[arg(long)]
    pub replace: bool,

    /// Python executable used to resolve sys.prefix
    #[arg(long, value_name = "PYTHON")]
    pub python: Option<String>,

    /// Installer manifest (defaults to installer.json beside this executable)
    #[arg(long, value_name = "PATH")]
    pub manifest: Option<PathBuf>,

    /// Set a kernel parameter by name
    #[arg(long = "param", value_name = "NAME=VALUE")]
    pub params: Vec<String>,

    /// Enable debug output
    #[arg(long)]
    pub debug: bool,
}

/// Parsed command line: fixed flags plus parameter values in argv order
#[derive(Debug)]
pub struct Invocation {
    pub args: Args,
    pub overrides: EnvOverrides,
}

/// Build the full command for `manifest`
pub fn build_command(manifest: &InstallerManifest) -> clap::Command {
    let known: BTreeSet<String> = manifest.parameters.iter().map(|p| p.name.clone()).collect();

    let command = Args::command()
        .about(manifest.about())
        .mut_arg("params", move |arg| {
            arg.value_parser(move |raw: &str| -> Result<String> {
                let (name, _) = parse_param_assignment(raw)?;
                if known.contains(&name) {
                    Ok(raw.to_string())
                } else {
                    Err(InstallerError::parameter(name, "no such parameter"))
                }
            })
        });

    manifest
        .parameters
        .iter()
        .fold(command, |command, param| command.arg(parameter_arg(param)))
}

/// The `--<name> VALUE` flag for one parameter
fn parameter_arg(param: &ParameterSpec) -> Arg {
    let spec = param.clone();

    let arg = Arg::new(param.name.clone())
        .long(param.name.clone())
        .value_name(param.env_var.clone())
        .action(ArgAction::Append)
        .value_parser(move |raw: &str| spec.resolve_value(raw).map(|_| raw.to_string()));

    match param.help() {
        Some(help) => arg.help(help),
        None => arg,
    }
}

/// Parse `argv` against `manifest`, exiting with a usage error on failure
pub fn parse_args<I, T>(manifest: &InstallerManifest, argv: I) -> Invocation
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    try_parse_args_from(manifest, argv).unwrap_or_else(|e| e.exit())
}

/// Parse `argv` against `manifest`
pub fn try_parse_args_from<I, T>(manifest: &InstallerManifest, argv: I) -> clap::error::Result<Invocation>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let mut command = build_command(manifest);
    let matches = command.try_get_matches_from_mut(argv)?;
    let args = Args::from_arg_matches(&matches)?;
    let overrides = collect_overrides(manifest, &matches)
        .map_err(|e| command.error(ErrorKind::ValueValidation, e.to_string()))?;

    Ok(Invocation { args, overrides })
}

/// Gather parameter values from direct flags and `--param`, keeping positions
fn collect_overrides(manifest: &InstallerManifest, matches: &ArgMatches) -> Result<EnvOverrides> {
    let mut overrides = EnvOverrides::new();

    for param in &manifest.parameters {
        if let (Some(values), Some(indices)) = (
            matches.get_many::<String>(&param.name),
            matches.indices_of(&param.name),
        ) {
            for (value, index) in values.zip(indices) {
                overrides.push(index, &param.name, value);
            }
        }
    }

    if let (Some(values), Some(indices)) = (
        matches.get_many::<String>("params"),
        matches.indices_of("params"),
    ) {
        for (assignment, index) in values.zip(indices) {
            let (name, value) = parse_param_assignment(assignment)?;
            overrides.push(index, name, value);
        }
    }

    Ok(overrides)
}

/// Find the manifest path before the full command can be built
///
/// Looks for `--manifest PATH` or `--manifest=PATH` in `argv`, falling back
/// to [`MANIFEST_FILE_NAME`] next to the running executable.
pub fn manifest_path(argv: &[OsString]) -> Result<PathBuf> {
    let mut iter = argv.iter().skip(1);
    while let Some(arg) = iter.next() {
        let arg = arg.to_string_lossy();
        if arg == "--" {
            break;
        }
        if arg == "--manifest" {
            if let Some(path) = iter.next() {
                return Ok(PathBuf::from(path));
            }
        } else if let Some(path) = arg.strip_prefix("--manifest=") {
            return Ok(PathBuf::from(path));
        }
    }

    let exe = std::env::current_exe()
        .map_err(|e| InstallerError::file_system("locate executable", "", e))?;
    let dir = exe
        .parent()
        .ok_or_else(|| InstallerError::validation("Installer executable has no parent directory"))?;
    Ok(dir.join(MANIFEST_FILE_NAME))
}

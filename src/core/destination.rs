//! Install destination resolution
//!
//! Maps the location chosen on the command line onto a Jupyter data
//! directory, following the same lookup rules `jupyter_client` uses, and from
//! there onto `<data dir>/kernels/<kernel name>`.

use crate::{
    error::{InstallerError, Result},
    utils::process::ProcessRunner,
};
use std::{env, path::PathBuf};
use tracing::{debug, instrument};

/// Script printing the interpreter's `sys.prefix`
const SYS_PREFIX_SCRIPT: &str = "import sys; print(sys.prefix)";

/// Where the kernelspec is installed
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InstallLocation {
    /// System wide registry, shared by all users
    #[default]
    System,
    /// Per-user registry
    User,
    /// `sys.prefix` of the configured python, for conda/virtual environments
    SysPrefix,
    /// `<prefix>/share/jupyter`
    Prefix(PathBuf),
    /// `$HOME/.ipython`, for old IPython installs
    Legacy,
}

/// Platform directories the destination is derived from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JupyterPaths {
    /// Per-user Jupyter data directory
    pub user_data_dir: Option<PathBuf>,
    /// First entry of the system Jupyter path
    pub system_data_dir: PathBuf,
    /// Home directory, for legacy installs
    pub home_dir: Option<PathBuf>,
}

impl JupyterPaths {
    /// Read the directories from the environment and platform conventions
    pub fn from_env() -> Self {
        let home_dir = dirs::home_dir();

        let user_data_dir = match env::var_os("JUPYTER_DATA_DIR") {
            Some(dir) if !dir.is_empty() => Some(PathBuf::from(dir)),
            _ if cfg!(target_os = "macos") => {
                home_dir.as_ref().map(|home| home.join("Library").join("Jupyter"))
            }
            _ => dirs::data_dir().map(|dir| dir.join("jupyter")),
        };

        let system_data_dir = if cfg!(windows) {
            env::var_os("PROGRAMDATA")
                .map_or_else(|| PathBuf::from(r"C:\ProgramData"), PathBuf::from)
                .join("jupyter")
        } else {
            PathBuf::from("/usr/local/share/jupyter")
        };

        Self {
            user_data_dir,
            system_data_dir,
            home_dir,
        }
    }
}

/// Resolves an [`InstallLocation`] to concrete directories
#[derive(Debug)]
pub struct DestinationResolver {
    paths: JupyterPaths,
    python: String,
    process_runner: ProcessRunner,
}

impl DestinationResolver {
    /// Create a resolver using `python` to answer `sys.prefix` queries
    pub fn new(paths: JupyterPaths, python: impl Into<String>, debug: bool) -> Self {
        Self {
            paths,
            python: python.into(),
            process_runner: ProcessRunner::new(debug),
        }
    }

    /// The Jupyter data directory for `location`
    #[instrument(skip(self))]
    pub fn data_dir(&self, location: &InstallLocation) -> Result<PathBuf> {
        let dir = match location {
            InstallLocation::System => self.paths.system_data_dir.clone(),
            InstallLocation::User => self.paths.user_data_dir.clone().ok_or_else(|| {
                InstallerError::destination("Could not determine the per-user Jupyter data directory")
            })?,
            InstallLocation::Prefix(prefix) if prefix.as_os_str().is_empty() => {
                self.paths.system_data_dir.clone()
            }
            InstallLocation::Prefix(prefix) => std::path::absolute(prefix)
                .map_err(|e| InstallerError::file_system("resolve prefix", prefix, e))?
                .join("share")
                .join("jupyter"),
            InstallLocation::SysPrefix => self.sys_prefix()?.join("share").join("jupyter"),
            InstallLocation::Legacy => self
                .paths
                .home_dir
                .as_ref()
                .ok_or_else(|| InstallerError::destination("Could not find home directory"))?
                .join(".ipython"),
        };

        debug!("Jupyter data directory: {}", dir.display());
        Ok(dir)
    }

    /// The kernelspec directory for `kernel_name` under `location`
    pub fn kernel_dir(&self, location: &InstallLocation, kernel_name: &str) -> Result<PathBuf> {
        Ok(self
            .data_dir(location)?
            .join("kernels")
            .join(kernel_name.to_lowercase()))
    }

    /// Ask the configured python for its `sys.prefix`
    fn sys_prefix(&self) -> Result<PathBuf> {
        let result = self
            .process_runner
            .run_command_with_output(&self.python, &["-c", SYS_PREFIX_SCRIPT])?;

        let prefix = result.stdout.trim();
        if prefix.is_empty() {
            return Err(InstallerError::destination(format!(
                "'{}' did not report a sys.prefix",
                self.python
            )));
        }

        debug!("sys.prefix of {}: {}", self.python, prefix);
        Ok(PathBuf::from(prefix))
    }
}

/// Interpreter used when `--python` is not given
pub fn default_python() -> &'static str {
    if cfg!(windows) { "python" } else { "python3" }
}

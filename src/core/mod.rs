//! Core functionality for kernelspec installation
//!
//! Contains the manifest and parameter model, destination resolution,
//! kernel.json rewriting and the installer that ties them together.

pub mod destination;
pub mod installer;
pub mod kernel_json;
pub mod manifest;
pub mod parameter;

pub use destination::{DestinationResolver, InstallLocation, JupyterPaths};
pub use installer::{InstallReport, KernelInstaller};
pub use manifest::InstallerManifest;
pub use parameter::{ListSeparator, ParameterKind, ParameterSpec};

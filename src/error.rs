//! Error types for the kernel installer
//!
//! Provides structured error handling with context and proper error chains.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the kernel installer
#[derive(Error, Debug)]
pub enum InstallerError {
    /// Errors related to reading or validating the installer manifest
    #[error("Manifest error: {message}")]
    Manifest {
        message: String,
        path: PathBuf,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A parameter definition or a value supplied for it was rejected
    #[error("Parameter '{name}': {message}")]
    Parameter { name: String, message: String },

    /// The install destination could not be determined
    #[error("Destination error: {message}")]
    Destination { message: String },

    /// A kernelspec with the same name is already installed
    #[error("Kernel already installed at {}; pass --replace to overwrite it", path.display())]
    AlreadyInstalled { path: PathBuf },

    /// Errors related to rewriting kernel.json
    #[error("kernel.json error: {message}")]
    KernelJson {
        message: String,
        path: PathBuf,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// File system operation errors
    #[error("File system error: {operation} failed on {}", path.display())]
    FileSystem {
        operation: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Process execution errors
    #[error(
        "Process error: {command} failed{}: {}",
        exit_code.map(|code| format!(" with exit code {code}")).unwrap_or_default(),
        stderr.trim()
    )]
    Process {
        command: String,
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
    },

    /// Validation errors
    #[error("Validation error: {message}")]
    Validation { message: String },
}

impl InstallerError {
    /// Create a new manifest error
    pub fn manifest<P: Into<PathBuf>>(message: impl Into<String>, path: P) -> Self {
        Self::Manifest {
            message: message.into(),
            path: path.into(),
            source: None,
        }
    }

    /// Create a new manifest error caused by another error
    pub fn manifest_with_source<P, E>(message: impl Into<String>, path: P, source: E) -> Self
    where
        P: Into<PathBuf>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Manifest {
            message: message.into(),
            path: path.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new parameter error
    pub fn parameter(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parameter {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create a new destination error
    pub fn destination(message: impl Into<String>) -> Self {
        Self::Destination {
            message: message.into(),
        }
    }

    /// Create a new already-installed error
    pub fn already_installed<P: Into<PathBuf>>(path: P) -> Self {
        Self::AlreadyInstalled { path: path.into() }
    }

    /// Create a new kernel.json error
    pub fn kernel_json<P: Into<PathBuf>>(message: impl Into<String>, path: P) -> Self {
        Self::KernelJson {
            message: message.into(),
            path: path.into(),
            source: None,
        }
    }

    /// Create a new kernel.json error caused by another error
    pub fn kernel_json_with_source<P, E>(message: impl Into<String>, path: P, source: E) -> Self
    where
        P: Into<PathBuf>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::KernelJson {
            message: message.into(),
            path: path.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new file system error
    pub fn file_system<P: Into<PathBuf>>(
        operation: impl Into<String>,
        path: P,
        source: std::io::Error,
    ) -> Self {
        Self::FileSystem {
            operation: operation.into(),
            path: path.into(),
            source,
        }
    }

    /// Create a new process error
    pub fn process(
        command: impl Into<String>,
        exit_code: Option<i32>,
        stdout: impl Into<String>,
        stderr: impl Into<String>,
    ) -> Self {
        Self::Process {
            command: command.into(),
            exit_code,
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    /// Create a new validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, InstallerError>;

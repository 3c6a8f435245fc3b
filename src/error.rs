//! Fatal errors for the entrypoint
//!
//! Anything wrong with the routes file is recovered in place and never
//! reaches this type. What remains stops the container from starting.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort startup with a non-zero exit status
#[derive(Debug, Error)]
pub enum EntrypointError {
    /// The Caddyfile template does not exist
    #[error("Caddyfile template not found at {}", .path.display())]
    TemplateNotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The Caddyfile template exists but could not be read
    #[error("Error reading Caddyfile template {}: {source}", .path.display())]
    TemplateRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The generated Caddyfile could not be written
    #[error("Error writing generated Caddyfile to {}: {source}", .path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The proxy executable is not installed or not on PATH
    #[error("Caddy command '{program}' not found. Ensure Caddy is installed and in PATH.")]
    ProxyNotFound {
        program: String,
        #[source]
        source: io::Error,
    },

    /// The proxy executable was found but could not be started
    #[error("Error executing Caddy: {source}")]
    Exec {
        program: String,
        #[source]
        source: io::Error,
    },
}

impl EntrypointError {
    /// Classify a failed template read
    pub fn template(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::NotFound {
            EntrypointError::TemplateNotFound { path, source }
        } else {
            EntrypointError::TemplateRead { path, source }
        }
    }

    /// Classify a failed process handoff
    pub fn exec(program: impl Into<String>, source: io::Error) -> Self {
        let program = program.into();
        if source.kind() == io::ErrorKind::NotFound {
            EntrypointError::ProxyNotFound { program, source }
        } else {
            EntrypointError::Exec { program, source }
        }
    }
}

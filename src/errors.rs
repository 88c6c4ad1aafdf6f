// src/errors.rs

//! Crate-wide error type and result alias.

use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchbinError {
    /// Network/transport failure while fetching from `url`.
    #[error("Fetch error for {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: anyhow::Error,
    },

    /// Open/create/write/read failure on the local filesystem.
    #[error("File IO error at {}: {source}", path.display())]
    FileIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Process error: {0}")]
    Process(#[from] ProcessError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown binary: {0}")]
    UnknownBinary(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Failure to start or complete a delegated child process.
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("could not start {}: {source}", program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} exited with {status}", program.display())]
    Exited { program: PathBuf, status: ExitStatus },

    #[error("{} did not finish within {timeout:?}", program.display())]
    TimedOut { program: PathBuf, timeout: Duration },
}

impl FetchbinError {
    pub(crate) fn fetch(url: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        FetchbinError::Fetch {
            url: url.into(),
            source: source.into(),
        }
    }

    pub(crate) fn file_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FetchbinError::FileIo {
            path: path.into(),
            source,
        }
    }

    /// Exit code a host should terminate with for this error.
    ///
    /// A delegated process that exited with a code passes it through;
    /// everything else maps to `1`.
    pub fn exit_code(&self) -> i32 {
        match self {
            FetchbinError::Process(ProcessError::Exited { status, .. }) => {
                status.code().filter(|c| *c != 0).unwrap_or(1)
            }
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, FetchbinError>;

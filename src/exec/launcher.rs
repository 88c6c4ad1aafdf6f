// src/exec/launcher.rs

//! Pluggable process launcher.
//!
//! The descriptor talks to a `ProcessLauncher` instead of building a
//! `Command` itself, so tests can record launches without spawning anything.
//!
//! - `TokioProcessLauncher` is the production implementation: the child
//!   inherits the environment and all three standard streams, and the call
//!   resolves when the child exits.

use std::fmt::Debug;
use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, info};

use crate::errors::{ProcessError, Result};

/// Trait abstracting how a materialized executable is run.
pub trait ProcessLauncher: Send + Sync + Debug {
    /// Run `program` with `args` to completion.
    ///
    /// Must fail with [`ProcessError::Spawn`] when the program cannot be
    /// started and [`ProcessError::Exited`] when it exits unsuccessfully.
    fn launch<'a>(
        &'a self,
        program: &'a Path,
        args: &'a [String],
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;
}

/// Real launcher used in production.
#[derive(Debug, Clone, Default)]
pub struct TokioProcessLauncher;

impl ProcessLauncher for TokioProcessLauncher {
    fn launch<'a>(
        &'a self,
        program: &'a Path,
        args: &'a [String],
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            info!(program = %program.display(), ?args, "starting delegated process");

            // Environment is inherited by default; stdio is set explicitly so
            // nothing is captured.
            let mut child = Command::new(program)
                .args(args)
                .stdin(Stdio::inherit())
                .stdout(Stdio::inherit())
                .stderr(Stdio::inherit())
                .kill_on_drop(true)
                .spawn()
                .map_err(|source| ProcessError::Spawn {
                    program: program.to_path_buf(),
                    source,
                })?;

            let status = child.wait().await.map_err(|source| ProcessError::Spawn {
                program: program.to_path_buf(),
                source,
            })?;

            debug!(
                program = %program.display(),
                exit_code = status.code().unwrap_or(-1),
                success = status.success(),
                "delegated process exited"
            );

            if status.success() {
                Ok(())
            } else {
                Err(ProcessError::Exited {
                    program: program.to_path_buf(),
                    status,
                }
                .into())
            }
        })
    }
}

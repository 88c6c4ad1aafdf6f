// src/lib.rs

pub mod binary;
pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod host;
pub mod http;
pub mod logging;
pub mod platform;
pub mod template;
pub mod types;

pub use binary::BinaryDescriptor;
pub use errors::{FetchbinError, ProcessError, Result};
pub use host::Host;

use std::io::Write;

use tracing::{debug, info};

use crate::cli::{CliArgs, Command};
use crate::config::{Manifest, default_manifest_path, load_and_validate};
use crate::fs::RealFileSystem;
use crate::platform::{PlatformOverride, SystemEnvironment};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - manifest loading
/// - the production [`Host`] (with `--os` / `--arch` overrides and the
///   manifest's deadline)
/// - dispatch of the selected subcommand
pub async fn run(args: CliArgs) -> Result<()> {
    let manifest_path = default_manifest_path(args.config.as_deref());
    let manifest = load_and_validate(&RealFileSystem, &manifest_path)?;
    debug!(path = %manifest_path.display(), binaries = manifest.binary.len(), "manifest loaded");

    let env = PlatformOverride {
        inner: SystemEnvironment,
        os: args.os.clone(),
        arch: args.arch.clone(),
    };
    let host = Host::system()?
        .with_env(env)
        .with_deadline(manifest.timeout());

    dispatch(&manifest, &host, args.command, &mut std::io::stdout()).await
}

/// Execute one subcommand against an already loaded manifest and host.
///
/// Command results (`list`, `url`, `path`) are written to `out`; the
/// delegated binary of `run` writes to the inherited stdout directly.
pub async fn dispatch<W>(manifest: &Manifest, host: &Host, command: Command, out: &mut W) -> Result<()>
where
    W: Write + Send,
{
    match command {
        Command::List => write_list(manifest, host, out),
        Command::Url { name } => {
            let descriptor = manifest.descriptor(&name, host.fs.as_ref())?;
            writeln!(out, "{}", descriptor.expand_url(host.env.as_ref()))?;
            Ok(())
        }
        Command::Path { name } => {
            let descriptor = manifest.descriptor(&name, host.fs.as_ref())?;
            writeln!(out, "{}", descriptor.executable_path().display())?;
            Ok(())
        }
        Command::Prepare { names } => {
            let names: Vec<String> = if names.is_empty() {
                manifest.names().map(str::to_string).collect()
            } else {
                names
            };
            for name in names {
                let descriptor = manifest.descriptor(&name, host.fs.as_ref())?;
                descriptor.prepare(host).await?;
                info!(
                    binary = %descriptor.name(),
                    path = %descriptor.executable_path().display(),
                    "prepared"
                );
            }
            Ok(())
        }
        Command::Run { name, args } => {
            let descriptor = manifest.descriptor(&name, host.fs.as_ref())?;
            descriptor.prepare_and_run(host, &args).await
        }
        Command::Embed { name, output } => {
            let mut descriptor = manifest.descriptor(&name, host.fs.as_ref())?;
            descriptor.download(host).await?;
            host.fs
                .write(&output, descriptor.embedded_data().as_bytes())
                .map_err(|source| FetchbinError::FileIo {
                    path: output.clone(),
                    source,
                })?;
            info!(binary = %descriptor.name(), output = %output.display(), "embedded payload written");
            Ok(())
        }
    }
}

/// Describe each binary: template, version, URL for the current platform
/// and where it lives.
fn write_list<W: Write>(manifest: &Manifest, host: &Host, out: &mut W) -> Result<()> {
    writeln!(out, "binaries ({}):", manifest.binary.len())?;
    for name in manifest.names() {
        let descriptor = manifest.descriptor(name, host.fs.as_ref())?;
        writeln!(out, "  - {}", descriptor.name())?;
        writeln!(out, "      template: {}", descriptor.url_template())?;
        if !descriptor.default_version().is_empty() {
            writeln!(out, "      version: {}", descriptor.default_version())?;
        }
        writeln!(out, "      url: {}", descriptor.expand_url(host.env.as_ref()))?;
        writeln!(out, "      path: {}", descriptor.executable_path().display())?;
        if !descriptor.embedded_data().is_empty() {
            writeln!(out, "      embedded: {} bytes (base64)", descriptor.embedded_data().len())?;
        }
        writeln!(out, "      saved: {}", descriptor.is_saved(host))?;
    }
    Ok(())
}

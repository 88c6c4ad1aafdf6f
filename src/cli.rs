// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Command-line arguments for `fetchbin`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "fetchbin",
    version,
    about = "Download, materialize and run external binaries declared in a manifest.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the manifest (TOML).
    ///
    /// Default: `FETCHBIN_CONFIG`, else `Fetchbin.toml` in the current
    /// working directory.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `FETCHBIN_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Override the value substituted for `$GOOS`.
    #[arg(long, value_name = "OS", global = true)]
    pub os: Option<String>,

    /// Override the value substituted for `$GOARCH`.
    #[arg(long, value_name = "ARCH", global = true)]
    pub arch: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Print every binary with its expanded URL and executable path.
    List,

    /// Print the expanded download URL of a binary.
    Url { name: String },

    /// Print the executable path of a binary.
    Path { name: String },

    /// Make sure the named binaries (default: all) exist on disk.
    Prepare { names: Vec<String> },

    /// Prepare a binary, then run it with the remaining arguments.
    Run {
        name: String,

        /// Arguments forwarded verbatim to the binary.
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Download a binary into memory and write its base64 payload to a
    /// file, for shipping alongside a host.
    Embed {
        name: String,

        #[arg(long, short, value_name = "FILE")]
        output: PathBuf,
    },
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

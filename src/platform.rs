// src/platform.rs

//! Environment provider: platform identifiers and variable lookup.
//!
//! URL templates are written against Go-style platform names (`linux`,
//! `darwin`, `amd64`, `arm64`, …) because that is how most release pages name
//! their artifacts. [`SystemEnvironment`] maps Rust's target constants onto
//! those names; [`StaticEnvironment`] pins everything for tests or for hosts
//! that want to fetch another platform's binary.

use std::collections::HashMap;
use std::fmt::Debug;

/// Supplies the values consulted while expanding a URL template.
pub trait Environment: Send + Sync + Debug {
    /// Operating system identifier substituted for `GOOS`.
    fn os(&self) -> String;

    /// Architecture identifier substituted for `GOARCH`.
    fn arch(&self) -> String;

    /// Look up an arbitrary variable. `None` when unset.
    fn var(&self, name: &str) -> Option<String>;
}

/// The running process: compile-time target and the real environment.
#[derive(Debug, Clone, Default)]
pub struct SystemEnvironment;

impl Environment for SystemEnvironment {
    fn os(&self) -> String {
        go_os(std::env::consts::OS).to_string()
    }

    fn arch(&self) -> String {
        go_arch(std::env::consts::ARCH).to_string()
    }

    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// Fixed platform and variable table.
#[derive(Debug, Clone)]
pub struct StaticEnvironment {
    os: String,
    arch: String,
    vars: HashMap<String, String>,
}

impl StaticEnvironment {
    pub fn new(os: impl Into<String>, arch: impl Into<String>) -> Self {
        Self {
            os: os.into(),
            arch: arch.into(),
            vars: HashMap::new(),
        }
    }

    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }
}

impl Environment for StaticEnvironment {
    fn os(&self) -> String {
        self.os.clone()
    }

    fn arch(&self) -> String {
        self.arch.clone()
    }

    fn var(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}

/// Overrides the platform of another provider while delegating variable
/// lookups to it. Used by the CLI's `--os` / `--arch` flags.
#[derive(Debug)]
pub struct PlatformOverride<E> {
    pub inner: E,
    pub os: Option<String>,
    pub arch: Option<String>,
}

impl<E: Environment> Environment for PlatformOverride<E> {
    fn os(&self) -> String {
        self.os.clone().unwrap_or_else(|| self.inner.os())
    }

    fn arch(&self) -> String {
        self.arch.clone().unwrap_or_else(|| self.inner.arch())
    }

    fn var(&self, name: &str) -> Option<String> {
        self.inner.var(name)
    }
}

/// Map a Rust `target_os` value to its Go `GOOS` spelling.
pub fn go_os(rust_os: &str) -> &str {
    match rust_os {
        "macos" => "darwin",
        other => other,
    }
}

/// Map a Rust `target_arch` value to its Go `GOARCH` spelling.
pub fn go_arch(rust_arch: &str) -> &str {
    match rust_arch {
        "x86_64" => "amd64",
        "x86" => "386",
        "aarch64" => "arm64",
        "powerpc64" => "ppc64",
        "loongarch64" => "loong64",
        other => other,
    }
}

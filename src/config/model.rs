// src/config/model.rs

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::binary::BinaryDescriptor;
use crate::errors::{FetchbinError, Result};
use crate::fs::FileSystem;
use crate::types::HttpStatusPolicy;

/// Manifest as read from a TOML file, before validation.
///
/// ```toml
/// [config]
/// download_path = ".bin"
/// timeout_secs = 600
/// http_status = "fail"
///
/// [binary.protoc]
/// url = "https://example.com/$GOOS/$GOARCH/v$VERSION/protoc"
/// version = "1.2.3"
/// ```
///
/// Only `[binary.<name>]` sections are required.
#[derive(Debug, Clone, Deserialize)]
pub struct RawManifest {
    /// Global settings from `[config]`.
    #[serde(default)]
    pub config: ConfigSection,

    /// All binaries from `[binary.<name>]`. Keys are the file names written
    /// to disk.
    #[serde(default)]
    pub binary: BTreeMap<String, BinaryConfig>,
}

/// `[config]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigSection {
    /// Directory binaries are materialized into unless a binary overrides
    /// it. Relative paths are resolved against the manifest's directory.
    #[serde(default = "default_download_path")]
    pub download_path: PathBuf,

    /// Deadline for a single download or delegated run.
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// `"ignore"` (default) or `"fail"` for non-2xx download responses.
    #[serde(default)]
    pub http_status: HttpStatusPolicy,
}

fn default_download_path() -> PathBuf {
    PathBuf::from(".bin")
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self {
            download_path: default_download_path(),
            timeout_secs: None,
            http_status: HttpStatusPolicy::default(),
        }
    }
}

/// `[binary.<name>]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct BinaryConfig {
    /// URL template; may reference `$GOOS`, `$GOARCH`, `$VERSION` and any
    /// environment variable.
    pub url: String,

    /// Value substituted for `$VERSION`.
    #[serde(default)]
    pub version: String,

    /// Per-binary override of `[config].download_path`.
    #[serde(default)]
    pub download_path: Option<PathBuf>,

    /// File holding a base64 copy of the binary, relative to the manifest's
    /// directory. When set, provisioning decodes it instead of downloading.
    #[serde(default)]
    pub embedded: Option<PathBuf>,

    /// Per-binary override of `[config].http_status`.
    #[serde(default)]
    pub http_status: Option<HttpStatusPolicy>,
}

/// A validated manifest.
///
/// Construct via `TryFrom<RawManifest>` (see `validate.rs`) or
/// [`load_and_validate`](crate::config::load_and_validate).
#[derive(Debug, Clone)]
pub struct Manifest {
    pub config: ConfigSection,
    pub binary: BTreeMap<String, BinaryConfig>,
    root: PathBuf,
}

impl Manifest {
    pub(crate) fn new_unchecked(
        config: ConfigSection,
        binary: BTreeMap<String, BinaryConfig>,
    ) -> Self {
        Self {
            config,
            binary,
            root: PathBuf::from("."),
        }
    }

    /// Directory relative paths in the manifest are resolved against.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.binary.keys().map(|s| s.as_str())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.config.timeout_secs.map(Duration::from_secs)
    }

    /// Build the descriptor for `name`, reading its embedded payload (if
    /// any) through `fs`.
    pub fn descriptor(&self, name: &str, fs: &dyn FileSystem) -> Result<BinaryDescriptor> {
        let entry = self
            .binary
            .get(name)
            .ok_or_else(|| FetchbinError::UnknownBinary(name.to_string()))?;

        let download_path = entry
            .download_path
            .as_deref()
            .unwrap_or(&self.config.download_path);

        let mut descriptor = BinaryDescriptor::new(
            name,
            self.root.join(download_path),
            entry.url.clone(),
            entry.version.clone(),
        )
        .with_status_policy(entry.http_status.unwrap_or(self.config.http_status));

        if let Some(ref embedded) = entry.embedded {
            let path = self.root.join(embedded);
            let text = fs
                .read_to_string(&path)
                .map_err(|e| FetchbinError::file_io(&path, e))?;
            // Payload files are often wrapped or end in a newline.
            let payload: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
            if payload.is_empty() {
                return Err(FetchbinError::Config(format!(
                    "binary '{}' has an empty embedded payload at {}",
                    name,
                    path.display()
                )));
            }
            descriptor = descriptor.with_embedded_data(payload);
        }

        Ok(descriptor)
    }
}

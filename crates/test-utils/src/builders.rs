#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use fetchbin::Host;
use fetchbin::config::{BinaryConfig, ConfigSection, Manifest, RawManifest};
use fetchbin::fs::mock::MockFileSystem;
use fetchbin::platform::StaticEnvironment;
use fetchbin::types::HttpStatusPolicy;

use crate::fakes::{FakeFetcher, RecordingLauncher};

/// Builder for `Manifest` to simplify test setup.
pub struct ManifestBuilder {
    manifest: RawManifest,
}

impl ManifestBuilder {
    pub fn new() -> Self {
        Self {
            manifest: RawManifest {
                config: ConfigSection::default(),
                binary: BTreeMap::new(),
            },
        }
    }

    pub fn with_binary(mut self, name: &str, binary: BinaryConfig) -> Self {
        self.manifest.binary.insert(name.to_string(), binary);
        self
    }

    pub fn with_download_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.manifest.config.download_path = path.into();
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.manifest.config.timeout_secs = Some(secs);
        self
    }

    pub fn with_http_status(mut self, policy: HttpStatusPolicy) -> Self {
        self.manifest.config.http_status = policy;
        self
    }

    pub fn raw(self) -> RawManifest {
        self.manifest
    }

    pub fn build(self) -> Manifest {
        Manifest::try_from(self.manifest).expect("Failed to build valid manifest from builder")
    }
}

impl Default for ManifestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `BinaryConfig`.
pub struct BinaryConfigBuilder {
    binary: BinaryConfig,
}

impl BinaryConfigBuilder {
    pub fn new(url: &str) -> Self {
        Self {
            binary: BinaryConfig {
                url: url.to_string(),
                version: String::new(),
                download_path: None,
                embedded: None,
                http_status: None,
            },
        }
    }

    pub fn version(mut self, version: &str) -> Self {
        self.binary.version = version.to_string();
        self
    }

    pub fn download_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.binary.download_path = Some(path.into());
        self
    }

    pub fn embedded(mut self, path: impl Into<PathBuf>) -> Self {
        self.binary.embedded = Some(path.into());
        self
    }

    pub fn http_status(mut self, policy: HttpStatusPolicy) -> Self {
        self.binary.http_status = Some(policy);
        self
    }

    pub fn build(self) -> BinaryConfig {
        self.binary
    }
}

/// A host made entirely of fakes: `linux/amd64`, in-memory filesystem,
/// scripted fetcher and recording launcher.
///
/// The returned handles share state with the ones inside the host.
pub struct FakeHost {
    pub host: Host,
    pub fs: MockFileSystem,
    pub http: FakeFetcher,
    pub launcher: RecordingLauncher,
}

impl FakeHost {
    pub fn new(http: FakeFetcher) -> Self {
        Self::with_env(http, StaticEnvironment::new("linux", "amd64"))
    }

    pub fn with_env(http: FakeFetcher, env: StaticEnvironment) -> Self {
        let fs = MockFileSystem::new();
        let launcher = RecordingLauncher::new();
        let host = Host::system()
            .expect("building system host")
            .with_env(env)
            .with_http(http.clone())
            .with_fs(fs.clone())
            .with_launcher(launcher.clone());
        Self {
            host,
            fs,
            http,
            launcher,
        }
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.host = self.host.with_deadline(Some(deadline));
        self
    }
}

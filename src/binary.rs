// src/binary.rs

//! The binary descriptor and its provisioning lifecycle.
//!
//! A [`BinaryDescriptor`] names one external executable: where to download
//! it from (a URL template), where to put it, and optionally a base64 copy
//! of its bytes already held in memory. The lifecycle is:
//!
//! 1. [`prepare`](BinaryDescriptor::prepare): make sure the executable exists
//!    on disk, either by streaming it from the network or by decoding the
//!    embedded copy. A regular file already at the target path wins.
//! 2. [`run`](BinaryDescriptor::run): delegate to the executable with
//!    inherited environment and standard streams.
//!
//! All side effects go through the capabilities bundled in [`Host`].

use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::anyhow;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use base64::write::EncoderStringWriter;
use futures_util::StreamExt;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::errors::{FetchbinError, ProcessError, Result};
use crate::host::Host;
use crate::http::HttpResponse;
use crate::platform::Environment;
use crate::template;
use crate::types::HttpStatusPolicy;

/// Base64 characters decoded per write in [`BinaryDescriptor::save`].
/// Must stay a multiple of 4 so every chunk but the last is padding-free.
const DECODE_CHUNK: usize = 64 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryDescriptor {
    name: String,
    download_path: PathBuf,
    url_template: String,
    default_version: String,
    embedded_data: String,
    status_policy: HttpStatusPolicy,
}

impl BinaryDescriptor {
    pub fn new(
        name: impl Into<String>,
        download_path: impl Into<PathBuf>,
        url_template: impl Into<String>,
        default_version: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            download_path: download_path.into(),
            url_template: url_template.into(),
            default_version: default_version.into(),
            embedded_data: String::new(),
            status_policy: HttpStatusPolicy::default(),
        }
    }

    /// Attach a base64 payload shipped with the host.
    pub fn with_embedded_data(mut self, data: impl Into<String>) -> Self {
        self.embedded_data = data.into();
        self
    }

    pub fn with_status_policy(mut self, policy: HttpStatusPolicy) -> Self {
        self.status_policy = policy;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn url_template(&self) -> &str {
        &self.url_template
    }

    pub fn default_version(&self) -> &str {
        &self.default_version
    }

    /// Base64 payload; empty when nothing is embedded.
    pub fn embedded_data(&self) -> &str {
        &self.embedded_data
    }

    pub fn status_policy(&self) -> HttpStatusPolicy {
        self.status_policy
    }

    /// Absolute path of the executable: `download_path/name`.
    ///
    /// Never fails: if the current directory cannot be determined, the joined
    /// (possibly relative) path is returned as is.
    pub fn executable_path(&self) -> PathBuf {
        let joined = self.download_path.join(&self.name);
        std::path::absolute(&joined).unwrap_or(joined)
    }

    /// Expand the URL template.
    ///
    /// `GOOS` and `GOARCH` come from the environment provider's platform,
    /// `VERSION` from the default version; any other name is looked up as a
    /// variable and becomes empty when unset.
    pub fn expand_url(&self, env: &dyn Environment) -> String {
        template::expand(&self.url_template, |name| match name {
            "GOOS" => env.os(),
            "GOARCH" => env.arch(),
            "VERSION" => self.default_version.clone(),
            other => env.var(other).unwrap_or_default(),
        })
    }

    /// Download the binary into memory as base64 and keep it as the
    /// embedded data.
    ///
    /// On failure the previous embedded data is left untouched.
    pub async fn download(&mut self, host: &Host) -> Result<()> {
        let url = self.expand_url(host.env.as_ref());
        info!(binary = %self.name, %url, "downloading into memory");

        let fetch = async {
            let mut response = self.open(host, &url).await?;
            let mut encoder = EncoderStringWriter::new(&STANDARD);
            while let Some(chunk) = response.body.next().await {
                let chunk = chunk.map_err(|e| FetchbinError::fetch(&url, e))?;
                // Writing into a String cannot fail.
                std::io::Write::write_all(&mut encoder, &chunk)?;
            }
            Ok::<_, FetchbinError>(encoder.into_inner())
        };

        let encoded = within(host.deadline, fetch, |limit| fetch_timeout(&url, limit)).await?;
        debug!(binary = %self.name, encoded_len = encoded.len(), "download buffered");
        self.embedded_data = encoded;
        Ok(())
    }

    /// Decode the embedded data into the executable path (mode 0755).
    ///
    /// Line breaks in the payload are skipped, so wrapped base64 (as written
    /// by `base64` at 76 columns) decodes as is. The first piece is decoded
    /// before the file is created; a failure after that removes the file
    /// again so a later [`prepare`](Self::prepare) does not mistake it for a
    /// finished binary.
    pub async fn save(&self, host: &Host) -> Result<()> {
        let path = self.executable_path();
        info!(binary = %self.name, path = %path.display(), "materializing embedded data");

        let payload: Vec<u8> = self
            .embedded_data
            .bytes()
            .filter(|b| !matches!(b, b'\r' | b'\n'))
            .collect();
        let mut pieces = payload.chunks(DECODE_CHUNK);
        let first = pieces
            .next()
            .map(|piece| decode_piece(&path, piece))
            .transpose()?;

        let mut file = host
            .fs
            .create_executable(&path)
            .map_err(|e| FetchbinError::file_io(&path, e))?;

        let written = async {
            if let Some(first) = first {
                file.write_all(&first)
                    .await
                    .map_err(|e| FetchbinError::file_io(&path, e))?;
            }
            for piece in pieces {
                let decoded = decode_piece(&path, piece)?;
                file.write_all(&decoded)
                    .await
                    .map_err(|e| FetchbinError::file_io(&path, e))?;
            }
            file.flush()
                .await
                .map_err(|e| FetchbinError::file_io(&path, e))
        }
        .await;

        drop(file);
        if written.is_err() {
            self.discard(host, &path);
        }
        written
    }

    /// Stream the binary from the network straight into the executable path,
    /// without buffering it in memory.
    ///
    /// The file is created only once the response has arrived. If the body
    /// fails midway or the deadline fires, the incomplete file is removed.
    pub async fn download_and_save(&self, host: &Host) -> Result<()> {
        let url = self.expand_url(host.env.as_ref());
        let path = self.executable_path();
        info!(binary = %self.name, %url, path = %path.display(), "downloading to disk");

        let mut created = false;
        let fetch = async {
            let mut response = self.open(host, &url).await?;
            let mut file = host
                .fs
                .create_executable(&path)
                .map_err(|e| FetchbinError::file_io(&path, e))?;
            created = true;

            let mut written: u64 = 0;
            while let Some(chunk) = response.body.next().await {
                let chunk = chunk.map_err(|e| FetchbinError::fetch(&url, e))?;
                file.write_all(&chunk)
                    .await
                    .map_err(|e| FetchbinError::file_io(&path, e))?;
                written += chunk.len() as u64;
            }
            file.flush()
                .await
                .map_err(|e| FetchbinError::file_io(&path, e))?;

            debug!(binary = %self.name, bytes = written, "download written");
            Ok::<_, FetchbinError>(())
        };

        let result = within(host.deadline, fetch, |limit| fetch_timeout(&url, limit)).await;
        if result.is_err() && created {
            self.discard(host, &path);
        }
        result
    }

    /// Whether a regular file already exists at the executable path.
    pub fn is_saved(&self, host: &Host) -> bool {
        host.fs.is_regular_file(&self.executable_path())
    }

    /// Make sure the executable exists on disk.
    ///
    /// An existing regular file is never overwritten; otherwise the embedded
    /// data is decoded if present, else the binary is downloaded.
    pub async fn prepare(&self, host: &Host) -> Result<()> {
        if self.is_saved(host) {
            debug!(binary = %self.name, "already materialized; nothing to do");
            return Ok(());
        }

        if self.embedded_data.is_empty() {
            debug!(binary = %self.name, "no embedded data; fetching from network");
            self.download_and_save(host).await
        } else {
            debug!(binary = %self.name, "using embedded data");
            self.save(host).await
        }
    }

    /// Run the executable with `args`, inheriting environment and stdio.
    pub async fn run(&self, host: &Host, args: &[String]) -> Result<()> {
        let path = self.executable_path();
        let launch = host.launcher.launch(&path, args);

        within(host.deadline, launch, |timeout| {
            ProcessError::TimedOut {
                program: path.clone(),
                timeout,
            }
            .into()
        })
        .await
    }

    /// [`prepare`](Self::prepare) followed by [`run`](Self::run).
    ///
    /// The first error is returned; terminating the host is the caller's
    /// decision.
    pub async fn prepare_and_run(&self, host: &Host, args: &[String]) -> Result<()> {
        self.prepare(host).await?;
        self.run(host, args).await
    }

    /// Remove a file this descriptor left incomplete.
    fn discard(&self, host: &Host, path: &Path) {
        match host.fs.remove_file(path) {
            Ok(()) => debug!(binary = %self.name, path = %path.display(), "removed incomplete file"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                binary = %self.name,
                path = %path.display(),
                error = %e,
                "could not remove incomplete file"
            ),
        }
    }

    async fn open(&self, host: &Host, url: &str) -> Result<HttpResponse> {
        let response = host.http.get(url).await?;
        if response.is_success() {
            return Ok(response);
        }

        match self.status_policy {
            HttpStatusPolicy::Ignore => {
                warn!(
                    binary = %self.name,
                    %url,
                    status = response.status,
                    "non-success HTTP status; using response body anyway"
                );
                Ok(response)
            }
            HttpStatusPolicy::Fail => Err(FetchbinError::fetch(
                url,
                anyhow!("HTTP status {}", response.status),
            )),
        }
    }
}

async fn within<T, F, E>(deadline: Option<Duration>, fut: F, on_timeout: E) -> Result<T>
where
    F: Future<Output = Result<T>>,
    E: FnOnce(Duration) -> FetchbinError,
{
    match deadline {
        Some(limit) => match tokio::time::timeout(limit, fut).await {
            Ok(result) => result,
            Err(_) => Err(on_timeout(limit)),
        },
        None => fut.await,
    }
}

fn decode_piece(path: &Path, piece: &[u8]) -> Result<Vec<u8>> {
    STANDARD.decode(piece).map_err(|e| {
        FetchbinError::file_io(path, std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    })
}

fn fetch_timeout(url: &str, limit: Duration) -> FetchbinError {
    FetchbinError::fetch(url, anyhow!("timed out after {limit:?}"))
}

// src/host.rs

//! The capabilities a [`BinaryDescriptor`](crate::binary::BinaryDescriptor)
//! calls into, bundled so they can be swapped together.

use std::sync::Arc;
use std::time::Duration;

use crate::errors::Result;
use crate::exec::{ProcessLauncher, TokioProcessLauncher};
use crate::fs::{FileSystem, RealFileSystem};
use crate::http::{HttpFetcher, ReqwestFetcher};
use crate::platform::{Environment, SystemEnvironment};

#[derive(Debug, Clone)]
pub struct Host {
    pub env: Arc<dyn Environment>,
    pub http: Arc<dyn HttpFetcher>,
    pub fs: Arc<dyn FileSystem>,
    pub launcher: Arc<dyn ProcessLauncher>,
    /// Upper bound for a single download or delegated run. `None` waits
    /// indefinitely.
    pub deadline: Option<Duration>,
}

impl Host {
    /// Production wiring: real environment, reqwest, local disk, tokio
    /// processes.
    pub fn system() -> Result<Self> {
        Ok(Self {
            env: Arc::new(SystemEnvironment),
            http: Arc::new(ReqwestFetcher::new()?),
            fs: Arc::new(RealFileSystem),
            launcher: Arc::new(TokioProcessLauncher),
            deadline: None,
        })
    }

    pub fn with_env(mut self, env: impl Environment + 'static) -> Self {
        self.env = Arc::new(env);
        self
    }

    pub fn with_http(mut self, http: impl HttpFetcher + 'static) -> Self {
        self.http = Arc::new(http);
        self
    }

    pub fn with_fs(mut self, fs: impl FileSystem + 'static) -> Self {
        self.fs = Arc::new(fs);
        self
    }

    pub fn with_launcher(mut self, launcher: impl ProcessLauncher + 'static) -> Self {
        self.launcher = Arc::new(launcher);
        self
    }

    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }
}

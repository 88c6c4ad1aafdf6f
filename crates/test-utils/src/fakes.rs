use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use fetchbin::errors::{FetchbinError, ProcessError, Result};
use fetchbin::exec::ProcessLauncher;
use fetchbin::http::{BodyStream, HttpFetcher, HttpResponse};
use futures_util::StreamExt;
use futures_util::stream;

/// One scripted answer of a [`FakeFetcher`].
#[derive(Debug, Clone)]
pub enum FakeReply {
    /// Respond with `status` and stream `chunks` in order.
    Body { status: u16, chunks: Vec<Vec<u8>> },
    /// Respond with `status`, stream `chunks`, then fail the body stream.
    BrokenBody { status: u16, chunks: Vec<Vec<u8>> },
    /// Respond with `status`, stream `chunks`, then never finish the body.
    Stall { status: u16, chunks: Vec<Vec<u8>> },
    /// Fail before any response arrives.
    TransportError(String),
    /// Never answer.
    Hang,
}

/// A fake fetcher that:
/// - records every requested URL
/// - answers each request with the same scripted reply.
#[derive(Debug, Clone)]
pub struct FakeFetcher {
    reply: FakeReply,
    requests: Arc<Mutex<Vec<String>>>,
}

impl FakeFetcher {
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self::with_reply(FakeReply::Body {
            status: 200,
            chunks: vec![body.into()],
        })
    }

    /// Serve `body` split into chunks of `size` bytes.
    pub fn chunked(body: &[u8], size: usize) -> Self {
        Self::with_reply(FakeReply::Body {
            status: 200,
            chunks: body.chunks(size).map(<[u8]>::to_vec).collect(),
        })
    }

    pub fn status(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self::with_reply(FakeReply::Body {
            status,
            chunks: vec![body.into()],
        })
    }

    pub fn with_reply(reply: FakeReply) -> Self {
        Self {
            reply,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// URLs requested so far. Shared between clones.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl HttpFetcher for FakeFetcher {
    fn get<'a>(
        &'a self,
        url: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse>> + Send + 'a>> {
        self.requests.lock().unwrap().push(url.to_string());
        let reply = self.reply.clone();

        Box::pin(async move {
            let (status, chunks, ending) = match reply {
                FakeReply::Body { status, chunks } => (status, chunks, Ending::Clean),
                FakeReply::BrokenBody { status, chunks } => (status, chunks, Ending::Broken),
                FakeReply::Stall { status, chunks } => (status, chunks, Ending::Stalled),
                FakeReply::TransportError(msg) => {
                    return Err(FetchbinError::Fetch {
                        url: url.to_string(),
                        source: anyhow::anyhow!(msg),
                    });
                }
                FakeReply::Hang => std::future::pending().await,
            };

            let mut items: Vec<std::io::Result<Bytes>> =
                chunks.into_iter().map(|c| Ok(Bytes::from(c))).collect();
            if let Ending::Broken = ending {
                items.push(Err(std::io::Error::new(
                    std::io::ErrorKind::ConnectionReset,
                    "connection reset mid-body",
                )));
            }

            let items = stream::iter(items);
            let body: BodyStream = match ending {
                Ending::Stalled => Box::pin(items.chain(stream::pending())),
                _ => Box::pin(items),
            };
            Ok(HttpResponse { status, body })
        })
    }
}

enum Ending {
    Clean,
    Broken,
    Stalled,
}

/// A launch observed by [`RecordingLauncher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Launch {
    pub program: PathBuf,
    pub args: Vec<String>,
}

/// A fake launcher that records launches and succeeds, or reports a spawn
/// failure when built with [`RecordingLauncher::failing`].
#[derive(Debug, Clone, Default)]
pub struct RecordingLauncher {
    launches: Arc<Mutex<Vec<Launch>>>,
    fail_spawn: bool,
}

impl RecordingLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail_spawn: true,
            ..Self::default()
        }
    }

    pub fn launches(&self) -> Vec<Launch> {
        self.launches.lock().unwrap().clone()
    }
}

impl ProcessLauncher for RecordingLauncher {
    fn launch<'a>(
        &'a self,
        program: &'a Path,
        args: &'a [String],
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            {
                let mut guard = self.launches.lock().unwrap();
                guard.push(Launch {
                    program: program.to_path_buf(),
                    args: args.to_vec(),
                });
            }

            if self.fail_spawn {
                return Err(ProcessError::Spawn {
                    program: program.to_path_buf(),
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
                }
                .into());
            }
            Ok(())
        })
    }
}

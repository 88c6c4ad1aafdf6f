// src/http.rs

//! HTTP fetch capability.
//!
//! The core only needs "GET this URL, give me a status and a byte stream".
//! [`ReqwestFetcher`] is the production implementation; tests swap in a
//! scripted fetcher through the same trait.

use std::fmt::Debug;
use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use futures_util::{Stream, StreamExt};

use crate::errors::{FetchbinError, Result};

/// Streaming response body. Dropping it releases the underlying connection.
pub type BodyStream = Pin<Box<dyn Stream<Item = std::io::Result<Bytes>> + Send>>;

/// A response whose headers have arrived and whose body is still streaming.
pub struct HttpResponse {
    pub status: u16,
    pub body: BodyStream,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl Debug for HttpResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

/// Trait abstracting how a URL is fetched.
///
/// Transport failures must come back as [`FetchbinError::Fetch`]. A
/// non-success status is NOT an error at this layer; the caller decides.
pub trait HttpFetcher: Send + Sync + Debug {
    fn get<'a>(
        &'a self,
        url: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse>> + Send + 'a>>;
}

/// `reqwest`-backed fetcher with default client settings.
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("fetchbin/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchbinError::Other(e.into()))?;
        Ok(Self { client })
    }
}

impl HttpFetcher for ReqwestFetcher {
    fn get<'a>(
        &'a self,
        url: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse>> + Send + 'a>> {
        Box::pin(async move {
            let response = self
                .client
                .get(url)
                .send()
                .await
                .map_err(|e| FetchbinError::fetch(url, e))?;

            let status = response.status().as_u16();
            let body = response
                .bytes_stream()
                .map(|chunk| chunk.map_err(std::io::Error::other));

            Ok(HttpResponse {
                status,
                body: Box::pin(body),
            })
        })
    }
}

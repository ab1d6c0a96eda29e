//! Status feed loading
//!
//! A feed lives either behind an HTTP URL or in a local file (the portal
//! writes `json/status.json` next to the static assets). `FeedSource`
//! abstracts the transport; `StatusFeedLoader` issues exactly one fetch per
//! call and decodes the status document.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use super::error::{StatusError, StatusResult};
use super::types::StatusDocument;

/// Transport primitive used to fetch a JSON document
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Location shown in logs
    fn describe(&self) -> String;

    /// Fetch the raw document body
    async fn fetch(&self) -> StatusResult<Vec<u8>>;
}

/// Where a feed is read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedLocation {
    Url(String),
    File(PathBuf),
}

impl FeedLocation {
    /// `http://` and `https://` locations are fetched over HTTP,
    /// everything else is a filesystem path
    pub fn parse(location: &str) -> Self {
        let trimmed = location.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            FeedLocation::Url(trimmed.to_string())
        } else {
            FeedLocation::File(PathBuf::from(trimmed))
        }
    }

    /// Build the matching source
    pub fn into_source(self, timeout: Duration) -> StatusResult<Arc<dyn FeedSource>> {
        let source: Arc<dyn FeedSource> = match self {
            FeedLocation::Url(url) => Arc::new(HttpSource::new(url, timeout)?),
            FeedLocation::File(path) => Arc::new(FileSource::new(path)),
        };
        Ok(source)
    }
}

/// Fetches a document with a GET request
pub struct HttpSource {
    client: Client,
    url: String,
}

impl HttpSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> StatusResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl FeedSource for HttpSource {
    fn describe(&self) -> String {
        self.url.clone()
    }

    async fn fetch(&self) -> StatusResult<Vec<u8>> {
        let response = self.client.get(&self.url).send().await.map_err(|e| {
            if e.is_timeout() {
                StatusError::Timeout(self.url.clone())
            } else {
                StatusError::Request(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(StatusError::Http {
                status: status.as_u16(),
                url: self.url.clone(),
            });
        }

        Ok(response.bytes().await?.to_vec())
    }
}

/// Reads a document from disk
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl FeedSource for FileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn fetch(&self) -> StatusResult<Vec<u8>> {
        tokio::fs::read(&self.path).await.map_err(|e| StatusError::Io {
            path: self.path.clone(),
            error: e.to_string(),
        })
    }
}

/// Serves a fixed body, for embedding and tests
pub struct MemorySource {
    body: Vec<u8>,
}

impl MemorySource {
    pub fn new(body: impl Into<Vec<u8>>) -> Self {
        Self { body: body.into() }
    }

    /// Serialize a document into a source
    pub fn from_document(document: &StatusDocument) -> StatusResult<Self> {
        Ok(Self::new(serde_json::to_vec(document)?))
    }
}

#[async_trait]
impl FeedSource for MemorySource {
    fn describe(&self) -> String {
        format!("memory ({} bytes)", self.body.len())
    }

    async fn fetch(&self) -> StatusResult<Vec<u8>> {
        Ok(self.body.clone())
    }
}

/// Fetch a source once and decode the body as `T`
pub async fn fetch_json<T: DeserializeOwned>(source: &dyn FeedSource) -> StatusResult<T> {
    let body = source.fetch().await?;
    Ok(serde_json::from_slice(&body)?)
}

/// Issues the status feed fetch
#[derive(Clone)]
pub struct StatusFeedLoader {
    source: Arc<dyn FeedSource>,
}

impl StatusFeedLoader {
    pub fn new(source: Arc<dyn FeedSource>) -> Self {
        Self { source }
    }

    /// Location of the underlying source
    pub fn describe(&self) -> String {
        self.source.describe()
    }

    /// Fetch and decode the status document
    pub async fn load(&self) -> StatusResult<StatusDocument> {
        tracing::debug!(source = %self.source.describe(), "Fetching status feed");

        let document: StatusDocument = fetch_json(self.source.as_ref()).await?;

        tracing::info!(
            source = %self.source.describe(),
            datasets = document.datasets.len(),
            fetch_time = %document.meta.fetch_time,
            "Status feed loaded"
        );
        Ok(document)
    }
}

//! Transfer function: fetches one remote resource into one local path.

pub mod error;
pub mod file;

use std::path::Path;

use reqwest::Client;

use self::error::DownloadError;

/// Writes the resource at `source_uri` to `destination`, or fails.
///
/// Callers only invoke this for destinations that do not exist yet; there
/// are no overwrite semantics.
#[async_trait::async_trait]
pub trait Transfer: Send + Sync {
    async fn fetch(&self, source_uri: &str, destination: &Path) -> Result<(), DownloadError>;
}

/// Plain HTTP(S) transfer. Content URIs are pre-signed, so no credentials
/// are attached.
#[derive(Debug, Clone)]
pub struct HttpTransfer {
    client: Client,
}

impl HttpTransfer {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Transfer for HttpTransfer {
    async fn fetch(&self, source_uri: &str, destination: &Path) -> Result<(), DownloadError> {
        file::download_file(&self.client, source_uri, destination).await
    }
}

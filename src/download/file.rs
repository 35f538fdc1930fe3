use std::ffi::OsString;
use std::path::{Path, PathBuf};

use futures_util::StreamExt;
use reqwest::{Client, Url};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

use super::error::DownloadError;

/// Suffix of the in-progress sibling. `#` never survives title sanitising,
/// so the temp name cannot collide with an archived photo.
const PART_SUFFIX: &str = "#part";

/// Sibling path the body is streamed into before the final rename.
fn part_path(download_path: &Path) -> PathBuf {
    let mut name = download_path
        .file_name()
        .map(OsString::from)
        .unwrap_or_default();
    name.push(PART_SUFFIX);
    download_path.with_file_name(name)
}

/// Validate a source URI before any I/O happens.
pub(crate) fn parse_source_uri(uri: &str) -> Result<Url, DownloadError> {
    let url = Url::parse(uri).map_err(|e| DownloadError::InvalidUri {
        uri: uri.to_string(),
        reason: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(DownloadError::InvalidUri {
            uri: uri.to_string(),
            reason: format!("unsupported scheme {:?}", other),
        }),
    }
}

/// Download `url` to `download_path` through a `#part` temp file.
///
/// The destination only appears once the body has been fully written, so an
/// interrupted transfer never leaves a file that later passes would count as
/// archived. Any stale `#part` from an earlier crash is discarded first.
pub async fn download_file(
    client: &Client,
    url: &str,
    download_path: &Path,
) -> Result<(), DownloadError> {
    let url = parse_source_uri(url)?;
    let part = part_path(download_path);
    let _ = fs::remove_file(&part).await;

    let result = attempt_download(client, url, download_path, &part).await;
    if result.is_err() {
        let _ = fs::remove_file(&part).await;
    }
    result
}

async fn attempt_download(
    client: &Client,
    url: Url,
    download_path: &Path,
    part_path: &Path,
) -> Result<(), DownloadError> {
    let path_str = download_path.display().to_string();
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| DownloadError::Http {
            source: e,
            path: path_str.clone(),
            bytes_written: 0,
        })?;

    if !response.status().is_success() {
        return Err(DownloadError::HttpStatus {
            status: response.status().as_u16(),
            path: path_str,
        });
    }

    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(part_path)
        .await
        .map_err(|e| DownloadError::disk(part_path, e))?;

    let mut bytes_written: u64 = 0;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| DownloadError::Http {
            source: e,
            path: path_str.clone(),
            bytes_written,
        })?;
        file.write_all(&chunk)
            .await
            .map_err(|e| DownloadError::disk(part_path, e))?;
        bytes_written += chunk.len() as u64;
    }
    file.flush()
        .await
        .map_err(|e| DownloadError::disk(part_path, e))?;
    drop(file);

    fs::rename(part_path, download_path)
        .await
        .map_err(|e| DownloadError::disk(download_path, e))?;

    tracing::debug!(bytes = bytes_written, path = %path_str, "Downloaded");
    Ok(())
}

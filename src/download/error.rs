use thiserror::Error;

/// Typed transfer errors. None of them are retried; any of them ends the pass.
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("Malformed source URI {uri:?}: {reason}")]
    InvalidUri { uri: String, reason: String },

    #[error("HTTP error {status} downloading {path}")]
    HttpStatus { status: u16, path: String },

    #[error("HTTP error downloading {path} (bytes_so_far={bytes_written}): {source}")]
    Http {
        source: reqwest::Error,
        path: String,
        bytes_written: u64,
    },

    #[error("Disk error writing {path}: {source}")]
    Disk {
        source: std::io::Error,
        path: String,
    },
}

impl DownloadError {
    pub(crate) fn disk(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Disk {
            source,
            path: path.display().to_string(),
        }
    }
}

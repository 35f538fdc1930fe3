use std::path::PathBuf;

use thiserror::Error;

use crate::download::error::DownloadError;
use crate::picasa::error::ListingError;

/// Errors that abort a pass. Alias failures are not here: they only warn.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Listing failed: {0}")]
    Listing(#[from] ListingError),

    #[error("Could not create album directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Transfer failed: {0}")]
    Download(#[from] DownloadError),

    #[error("Album '{name}' not found. Available albums: {available:?}")]
    UnknownAlbum {
        name: String,
        available: Vec<String>,
    },
}

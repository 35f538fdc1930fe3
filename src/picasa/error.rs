use thiserror::Error;

use crate::auth::error::AuthError;

/// Failures fetching an album or photo page.
#[derive(Debug, Error)]
pub enum ListingError {
    #[error("feed request for {what} failed with HTTP {status}")]
    HttpStatus { what: String, status: u16 },

    #[error("could not obtain an access token: {0}")]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("undecodable feed for {what}: {source}")]
    Decode {
        what: String,
        source: serde_json::Error,
    },
}

//! Remote listing source: album and photo feeds of the Picasa Web Albums
//! GData API. Albums arrive in one response; photos are paged with
//! `start-index` / `max-results` and the last page is the first short one.

pub mod error;
pub mod feed;
pub mod types;

pub use types::{Album, PageCursor, Photo, MAX_PAGE_SIZE};

use std::sync::Arc;

use reqwest::Client;

use self::error::ListingError;
use self::feed::{Entry, FeedResponse};
use crate::auth::CredentialProvider;

/// Ordered, paginated access to a user's albums and their photos.
#[async_trait::async_trait]
pub trait ListingSource: Send + Sync {
    /// Every album of `owner_id`, in feed order. Not paginated.
    async fn list_albums(&self, owner_id: &str) -> Result<Vec<Album>, ListingError>;

    /// One page of photos. Fewer than `cursor.page_size` entries means the
    /// album has no further pages.
    async fn list_photos(
        &self,
        owner_id: &str,
        album_id: &str,
        cursor: PageCursor,
    ) -> Result<Vec<Photo>, ListingError>;
}

/// HTTP client for the album feed API.
pub struct PicasaClient {
    http: Client,
    base_url: String,
    credentials: Arc<dyn CredentialProvider>,
}

impl std::fmt::Debug for PicasaClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PicasaClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl PicasaClient {
    pub fn new(
        http: Client,
        base_url: impl Into<String>,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
        }
    }

    fn albums_url(&self, owner_id: &str) -> String {
        format!("{}/user/{}", self.base_url, owner_id)
    }

    fn photos_url(&self, owner_id: &str, album_id: &str) -> String {
        format!("{}/user/{}/albumid/{}", self.base_url, owner_id, album_id)
    }

    async fn fetch_feed(
        &self,
        url: &str,
        query: &[(&str, String)],
        what: &str,
    ) -> Result<Vec<Entry>, ListingError> {
        let token = self.credentials.access_token().await?;

        let response = self
            .http
            .get(url)
            .query(query)
            .bearer_auth(token.secret())
            .header("GData-Version", "2")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ListingError::HttpStatus {
                what: what.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        let parsed: FeedResponse =
            serde_json::from_slice(&body).map_err(|source| ListingError::Decode {
                what: what.to_string(),
                source,
            })?;
        Ok(parsed.feed.entry)
    }
}

#[async_trait::async_trait]
impl ListingSource for PicasaClient {
    async fn list_albums(&self, owner_id: &str) -> Result<Vec<Album>, ListingError> {
        let query = [
            ("v", "2".to_string()),
            ("type", "albums".to_string()),
            ("alt", "json".to_string()),
        ];
        let what = format!("albums of user {}", owner_id);
        let entries = self
            .fetch_feed(&self.albums_url(owner_id), &query, &what)
            .await?;

        let total = entries.len();
        let albums: Vec<Album> = entries.into_iter().filter_map(Entry::into_album).collect();
        if albums.len() < total {
            tracing::warn!(
                skipped = total - albums.len(),
                "Ignoring album entries without an id"
            );
        }
        tracing::debug!(count = albums.len(), "Fetched album listing");
        Ok(albums)
    }

    async fn list_photos(
        &self,
        owner_id: &str,
        album_id: &str,
        cursor: PageCursor,
    ) -> Result<Vec<Photo>, ListingError> {
        let query = [
            ("v", "2".to_string()),
            ("imgmax", "d".to_string()),
            ("alt", "json".to_string()),
            ("start-index", cursor.start_index.to_string()),
            ("max-results", cursor.page_size.to_string()),
        ];
        let what = format!("album {} at index {}", album_id, cursor.start_index);
        let entries = self
            .fetch_feed(&self.photos_url(owner_id, album_id), &query, &what)
            .await?;
        Ok(entries.into_iter().map(Entry::into_photo).collect())
    }
}

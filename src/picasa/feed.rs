//! Wire types of the GData JSON feed (`alt=json`).
//!
//! Text values are wrapped as `{"$t": "..."}` and extension elements carry a
//! namespace prefix, e.g. `gphoto$id`.

use serde::Deserialize;

use super::types::{Album, Photo};

#[derive(Debug, Deserialize)]
pub struct FeedResponse {
    pub feed: Feed,
}

#[derive(Debug, Default, Deserialize)]
pub struct Feed {
    /// Omitted entirely when the feed is empty.
    #[serde(default)]
    pub entry: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
pub struct Entry {
    #[serde(rename = "gphoto$id", default)]
    pub gphoto_id: Option<TextNode>,
    #[serde(default)]
    pub title: Option<TextNode>,
    #[serde(default)]
    pub content: Option<Content>,
}

#[derive(Debug, Deserialize)]
pub struct TextNode {
    #[serde(rename = "$t", default)]
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub src: String,
}

impl Entry {
    fn title_text(&self) -> String {
        self.title.as_ref().map(|t| t.text.clone()).unwrap_or_default()
    }

    /// Albums are useless without an id; those are dropped.
    pub fn into_album(self) -> Option<Album> {
        let title = self.title_text();
        let id = self.gphoto_id.map(|n| n.text).filter(|id| !id.is_empty())?;
        Some(Album { id, title })
    }

    /// Every photo entry is kept so page sizes stay exact.
    pub fn into_photo(self) -> Photo {
        let title = self.title_text();
        let source_uri = self.content.map(|c| c.src).unwrap_or_default();
        Photo { title, source_uri }
    }
}

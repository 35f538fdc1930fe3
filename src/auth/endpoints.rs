//! URL endpoints of the OAuth2 token service and the album feed API.

#[derive(Debug, Clone)]
pub struct Endpoints {
    pub token: String,
    pub feed_api: String,
}

impl Endpoints {
    pub const TOKEN: &'static str = "https://accounts.google.com/o/oauth2/token";
    pub const FEED_API: &'static str = "https://picasaweb.google.com/data/feed/api";
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            token: Self::TOKEN.to_string(),
            feed_api: Self::FEED_API.to_string(),
        }
    }
}

//! OAuth2 credentials: exchanges a long-lived refresh token for short-lived
//! bearer tokens and caches them until shortly before they expire.

pub mod endpoints;
pub mod error;

use chrono::{DateTime, Duration, Utc};
use oauth2::basic::BasicClient;
use oauth2::{
    AuthType, ClientId, ClientSecret, EndpointNotSet, EndpointSet, RefreshToken, TokenResponse,
    TokenUrl,
};
use reqwest::Client;
use tokio::sync::Mutex;

use self::error::AuthError;

type RefreshClient =
    BasicClient<EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// Assumed lifetime when the token endpoint omits `expires_in`.
const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;

/// Refresh this long before the reported expiry so a token never lapses
/// between the freshness check and the request that uses it.
const EXPIRY_SKEW_SECS: i64 = 60;

/// A bearer token with its expiry.
#[derive(Clone)]
pub struct AccessToken {
    secret: String,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    pub fn new(secret: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            secret: secret.into(),
            expires_at,
        }
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(EXPIRY_SKEW_SECS) < self.expires_at
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("secret", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Supplies a valid bearer token on demand. Opaque to the sync engine.
#[async_trait::async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn access_token(&self) -> Result<AccessToken, AuthError>;
}

/// Client credentials plus the refresh token they authorise.
#[derive(Clone)]
pub struct OAuthCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

impl std::fmt::Debug for OAuthCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

/// [`CredentialProvider`] backed by the `refresh_token` grant.
pub struct RefreshTokenProvider {
    http: Client,
    oauth: RefreshClient,
    token_url: String,
    credentials: OAuthCredentials,
    cached: Mutex<Option<AccessToken>>,
}

impl std::fmt::Debug for RefreshTokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshTokenProvider")
            .field("token_url", &self.token_url)
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

impl RefreshTokenProvider {
    /// `http` should not follow redirects; the token endpoint is expected to
    /// answer directly.
    pub fn new(
        http: Client,
        token_url: impl Into<String>,
        credentials: OAuthCredentials,
    ) -> Result<Self, AuthError> {
        let token_url = token_url.into();
        let oauth = BasicClient::new(ClientId::new(credentials.client_id.clone()))
            .set_client_secret(ClientSecret::new(credentials.client_secret.clone()))
            .set_auth_type(AuthType::RequestBody)
            .set_token_uri(TokenUrl::new(token_url.clone())?);

        Ok(Self {
            http,
            oauth,
            token_url,
            credentials,
            cached: Mutex::new(None),
        })
    }

    /// Perform one refresh exchange, bypassing the cache.
    pub async fn refresh(&self) -> Result<AccessToken, AuthError> {
        let token_result = self
            .oauth
            .exchange_refresh_token(&RefreshToken::new(self.credentials.refresh_token.clone()))
            .request_async(&self.http)
            .await?;

        let expires_at = token_result
            .expires_in()
            .map(|d| Utc::now() + Duration::seconds(d.as_secs() as i64))
            .unwrap_or_else(|| Utc::now() + Duration::seconds(DEFAULT_TOKEN_LIFETIME_SECS));

        tracing::debug!(%expires_at, "Obtained access token");
        Ok(AccessToken::new(
            token_result.access_token().secret().as_str(),
            expires_at,
        ))
    }
}

#[async_trait::async_trait]
impl CredentialProvider for RefreshTokenProvider {
    async fn access_token(&self) -> Result<AccessToken, AuthError> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref() {
            if token.is_fresh(Utc::now()) {
                return Ok(token.clone());
            }
            tracing::debug!("Access token expired, refreshing");
        }
        let token = self.refresh().await?;
        *cached = Some(token.clone());
        Ok(token)
    }
}

/// Build a provider and prove the credentials work with one exchange.
///
/// Called at startup so bad credentials fail before any pass begins.
pub async fn authenticate(
    client: Client,
    token_url: &str,
    credentials: OAuthCredentials,
) -> Result<RefreshTokenProvider, AuthError> {
    let provider = RefreshTokenProvider::new(client, token_url, credentials)?;
    let token = provider.access_token().await?;
    tracing::info!(expires_at = %token.expires_at(), "Authenticated");
    Ok(provider)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn credentials() -> OAuthCredentials {
        OAuthCredentials {
            client_id: "client-1".into(),
            client_secret: "shh".into(),
            refresh_token: "1/refresh".into(),
        }
    }

    #[test]
    fn test_token_freshness_honours_skew() {
        let now = Utc::now();
        assert!(AccessToken::new("t", now + Duration::seconds(3600)).is_fresh(now));
        assert!(!AccessToken::new("t", now + Duration::seconds(30)).is_fresh(now));
        assert!(!AccessToken::new("t", now - Duration::seconds(1)).is_fresh(now));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let rendered = format!("{:?}", credentials());
        assert!(!rendered.contains("shh"));
        assert!(!rendered.contains("1/refresh"));
        let token = format!("{:?}", AccessToken::new("ya29.secret", Utc::now()));
        assert!(!token.contains("ya29.secret"));
    }

    #[tokio::test]
    async fn test_authenticate_exchanges_refresh_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=refresh_token"))
            .and(body_string_contains("client_id=client-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "ya29.first",
                "expires_in": 3600,
                "token_type": "Bearer"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let url = format!("{}/token", server.uri());
        let provider = authenticate(Client::new(), &url, credentials()).await.unwrap();

        // Second call is served from the cache; the mock expects one hit.
        let token = provider.access_token().await.unwrap();
        assert_eq!(token.secret(), "ya29.first");
    }

    #[tokio::test]
    async fn test_expired_token_is_refreshed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "ya29.short",
                "expires_in": 10,
                "token_type": "Bearer"
            })))
            .expect(2)
            .mount(&server)
            .await;

        let url = format!("{}/token", server.uri());
        let provider = RefreshTokenProvider::new(Client::new(), url, credentials()).unwrap();
        provider.access_token().await.unwrap();
        // 10s lifetime is inside the skew window, so the next call refreshes.
        provider.access_token().await.unwrap();
    }

    #[tokio::test]
    async fn test_rejected_refresh_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": "invalid_grant",
                "error_description": "Bad Request"
            })))
            .mount(&server)
            .await;

        let url = format!("{}/token", server.uri());
        let err = authenticate(Client::new(), &url, credentials())
            .await
            .unwrap_err();
        match err {
            AuthError::Rejected(message) => {
                assert_eq!(message, "invalid_grant: Bad Request");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_missing_access_token_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "expires_in": 3600,
                "token_type": "Bearer"
            })))
            .mount(&server)
            .await;

        let url = format!("{}/token", server.uri());
        let provider = RefreshTokenProvider::new(Client::new(), url, credentials()).unwrap();
        assert!(matches!(
            provider.refresh().await,
            Err(AuthError::Exchange(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_expiry_defaults_to_one_hour() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "ya29.forever",
                "token_type": "Bearer"
            })))
            .mount(&server)
            .await;

        let url = format!("{}/token", server.uri());
        let provider = RefreshTokenProvider::new(Client::new(), url, credentials()).unwrap();
        let token = provider.refresh().await.unwrap();
        let lifetime = token.expires_at() - Utc::now();
        assert!(lifetime > Duration::seconds(3500));
        assert!(lifetime <= Duration::seconds(DEFAULT_TOKEN_LIFETIME_SECS));
    }

    #[test]
    fn test_invalid_token_url_is_rejected() {
        let err = RefreshTokenProvider::new(Client::new(), "not a url", credentials()).unwrap_err();
        assert!(matches!(err, AuthError::InvalidTokenUrl(_)));
    }
}

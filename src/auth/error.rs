use oauth2::basic::BasicErrorResponse;
use oauth2::{HttpClientError, RequestTokenError};
use thiserror::Error;

/// Error type of a `refresh_token` exchange over reqwest.
pub type TokenRequestError = RequestTokenError<HttpClientError<reqwest::Error>, BasicErrorResponse>;

/// Failures exchanging the refresh token for an access token.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid token endpoint URL: {0}")]
    InvalidTokenUrl(#[from] oauth2::url::ParseError),

    #[error("token endpoint rejected the refresh token: {0}")]
    Rejected(String),

    #[error(transparent)]
    Exchange(TokenRequestError),
}

impl From<TokenRequestError> for AuthError {
    fn from(e: TokenRequestError) -> Self {
        match e {
            RequestTokenError::ServerResponse(resp) => {
                let code: &str = resp.error().as_ref();
                let message = match resp.error_description() {
                    Some(desc) => format!("{}: {}", code, desc),
                    None => code.to_string(),
                };
                AuthError::Rejected(message)
            }
            other => AuthError::Exchange(other),
        }
    }
}

use reqwest::StatusCode;

/// Errors surfaced by calls to the upstream API
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    /// Token endpoint could not be reached
    #[error("failed to get bearer token: {0}")]
    TokenRequest(#[source] reqwest::Error),

    /// Token endpoint answered with a non-200 status
    #[error("failed to get bearer token, status code: {0}")]
    TokenStatus(StatusCode),

    #[error("access token missing in response")]
    MissingAccessToken,

    /// Request was rejected with 401 even after re-authenticating
    #[error("authentication failed, request cannot be retried")]
    Unauthorized,

    #[error("response failed, status code: {0}")]
    Status(StatusCode),

    #[error("request to upstream failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("failed to decode upstream response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid upstream url: {0}")]
    Url(#[from] url::ParseError),
}

impl UpstreamError {
    /// True when the upstream could not be reached at all, as opposed to
    /// answering with an error.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::TokenRequest(_) | Self::Transport(_))
    }
}

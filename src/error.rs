use std::time::Duration;

/// Fallback `/login?error=` code when the upstream rejects an exchange without saying why.
pub const DEFAULT_EXCHANGE_ERROR: &str = "discord_auth_failed";

/// Code used whenever the upstream could not be reached or answered with garbage.
pub const SERVICE_UNAVAILABLE: &str = "service_unavailable";

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("OAuth client id is not configured")]
    MissingClientId,
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("upstream did not respond within {0:?}")]
    Timeout(Duration),
    #[error("upstream rejected the request: {0}")]
    Rejected(String),
    #[error("malformed upstream response: {0}")]
    Malformed(String),
    #[error("invalid tier: {0}")]
    InvalidTier(String),
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Error code to surface on the login page for a failed code exchange.
    #[must_use]
    pub fn redirect_code(&self) -> &str {
        match self {
            Self::Rejected(code) if !code.is_empty() => code,
            Self::Rejected(_) => DEFAULT_EXCHANGE_ERROR,
            _ => SERVICE_UNAVAILABLE,
        }
    }
}

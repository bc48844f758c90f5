use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Errors the HTTP layer answers with a JSON body instead of a redirect.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No Discord client id, so no authorization URL can be built.
    #[error("Discord OAuth not configured")]
    NotConfigured,

    /// Upstream API unreachable, too slow, or answering garbage.
    #[error("Service unavailable")]
    ServiceUnavailable,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "error": self.to_string() })),
        )
            .into_response()
    }
}

impl From<crate::error::Error> for AuthError {
    fn from(e: crate::error::Error) -> Self {
        match e {
            crate::error::Error::MissingClientId => Self::NotConfigured,
            other => {
                tracing::error!(error = %other, "Upstream call failed");
                Self::ServiceUnavailable
            }
        }
    }
}

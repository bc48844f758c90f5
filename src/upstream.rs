use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::COOKIE;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use url::Url;

use crate::error::Error;
use crate::types::SessionToken;

/// Header carrying the shared secret that marks calls as coming from this edge.
pub const INTERNAL_AUTH_HEADER: &str = "X-Internal-Auth";

/// Client for the upstream Owls Insight API.
///
/// Every call carries the internal shared secret and is bounded by one timeout.
#[derive(Clone)]
pub struct ApiClient {
    base_url: Url,
    internal_secret: String,
    timeout: Duration,
    http: reqwest::Client,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExchangeRequest<'a> {
    code: &'a str,
    redirect_uri: &'a str,
}

/// Body returned by the upstream code exchange.
#[derive(Debug, Clone, Default, Deserialize)]
#[non_exhaustive]
pub struct ExchangeResponse {
    #[serde(default)]
    pub token: Option<SessionToken>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Status and JSON body relayed from an upstream call.
#[derive(Debug, Clone)]
pub struct Relayed {
    pub status: StatusCode,
    pub body: JsonValue,
}

impl ApiClient {
    /// Create a client for the API rooted at `base_url` (e.g. `http://api/api/v1`).
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            internal_secret: String::new(),
            timeout: Duration::from_secs(15),
            http: reqwest::Client::new(),
        }
    }

    #[must_use]
    pub fn with_internal_secret(mut self, secret: impl Into<String>) -> Self {
        self.internal_secret = secret.into();
        self
    }

    /// Bound on every upstream call, body included (default 15 seconds).
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Use a custom HTTP client (for connection pool reuse or testing).
    #[must_use]
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http = client;
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url.as_str().trim_end_matches('/'))
    }

    /// Hand an authorization code to the upstream, which performs the
    /// provider token exchange and mints a session.
    ///
    /// # Errors
    ///
    /// - [`Error::Timeout`] if the upstream does not answer in time.
    /// - [`Error::Http`] on network failure.
    /// - [`Error::Malformed`] if the body is not the expected JSON shape.
    /// - [`Error::Rejected`] with the upstream's error code on a non-success status.
    pub async fn exchange_code(
        &self,
        provider: &str,
        code: &str,
        redirect_uri: &Url,
    ) -> Result<ExchangeResponse, Error> {
        let request = self
            .http
            .post(self.endpoint(&format!("auth/{provider}/callback")))
            .header(INTERNAL_AUTH_HEADER, &self.internal_secret)
            .json(&ExchangeRequest {
                code,
                redirect_uri: redirect_uri.as_str(),
            });

        let (status, bytes) = self.bounded(request).await?;
        let body: ExchangeResponse =
            serde_json::from_slice(&bytes).map_err(|e| Error::Malformed(e.to_string()))?;

        if !status.is_success() {
            return Err(Error::Rejected(body.error.unwrap_or_default()));
        }
        Ok(body)
    }

    /// Forward a password login body and relay the upstream answer.
    ///
    /// # Errors
    ///
    /// Transport, timeout and non-JSON failures; upstream statuses are relayed, not errors.
    pub async fn login(&self, body: &JsonValue) -> Result<Relayed, Error> {
        let request = self
            .http
            .post(self.endpoint("auth/login"))
            .header(INTERNAL_AUTH_HEADER, &self.internal_secret)
            .json(body);
        self.relay(request).await
    }

    /// Look up the current user with the browser's cookies.
    ///
    /// # Errors
    ///
    /// Transport, timeout and non-JSON failures; upstream statuses are relayed, not errors.
    pub async fn me(&self, cookies: Option<&str>) -> Result<Relayed, Error> {
        let request = self
            .http
            .get(self.endpoint("auth/me"))
            .header(INTERNAL_AUTH_HEADER, &self.internal_secret)
            .header(COOKIE, cookies.unwrap_or_default());
        self.relay(request).await
    }

    /// Tell the upstream the session is over.
    ///
    /// # Errors
    ///
    /// Transport and timeout failures. The response body is ignored.
    pub async fn logout(&self, cookies: Option<&str>) -> Result<StatusCode, Error> {
        let request = self
            .http
            .post(self.endpoint("auth/logout"))
            .header(INTERNAL_AUTH_HEADER, &self.internal_secret)
            .header(COOKIE, cookies.unwrap_or_default())
            .json(&serde_json::json!({}));
        let (status, _) = self.bounded(request).await?;
        Ok(status)
    }

    async fn relay(&self, request: reqwest::RequestBuilder) -> Result<Relayed, Error> {
        let (status, bytes) = self.bounded(request).await?;
        let body = serde_json::from_slice(&bytes).map_err(|e| Error::Malformed(e.to_string()))?;
        Ok(Relayed { status, body })
    }

    /// Send and read the whole body under the configured timeout.
    async fn bounded(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<(StatusCode, bytes::Bytes), Error> {
        let call = async {
            let response = request.send().await?;
            let status = response.status();
            let bytes = response.bytes().await?;
            Ok::<_, reqwest::Error>((status, bytes))
        };

        tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| Error::Timeout(self.timeout))?
            .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_keeps_base_path() {
        let client = ApiClient::new("http://api.internal/api/v1".parse().unwrap());
        assert_eq!(
            client.endpoint("auth/discord/callback"),
            "http://api.internal/api/v1/auth/discord/callback"
        );

        let client = ApiClient::new("http://api.internal/api/v1/".parse().unwrap());
        assert_eq!(client.endpoint("auth/me"), "http://api.internal/api/v1/auth/me");
    }

    #[test]
    fn test_exchange_response_shapes() {
        let ok: ExchangeResponse = serde_json::from_str(r#"{"token":"jwt1"}"#).unwrap();
        assert_eq!(ok.token.unwrap().as_str(), "jwt1");

        let err: ExchangeResponse = serde_json::from_str(r#"{"error":"invalid_grant"}"#).unwrap();
        assert!(err.token.is_none());
        assert_eq!(err.error.as_deref(), Some("invalid_grant"));

        assert!(serde_json::from_str::<ExchangeResponse>("[1,2]").is_err());
        assert!(serde_json::from_str::<ExchangeResponse>(r#"{"token":42}"#).is_err());
    }

    #[test]
    fn test_defaults() {
        let client = ApiClient::new("http://api.internal".parse().unwrap());
        assert_eq!(client.timeout(), Duration::from_secs(15));
        assert_eq!(client.base_url().as_str(), "http://api.internal/");
    }
}

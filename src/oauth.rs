use url::Url;

use crate::error::Error;
use crate::state_token;

/// Path segment naming the identity provider in both the browser-facing
/// routes and the upstream exchange endpoint.
pub const PROVIDER: &str = "discord";

/// Discord `OAuth2` configuration.
///
/// The client id is optional: a deployment without one still serves the
/// callback route, but `/authorize` answers 503 instead of redirecting.
///
/// ```rust,ignore
/// use owls_web::OAuthConfig;
///
/// let config = OAuthConfig::new("https://owlsinsight.com/api/auth/discord/callback".parse()?)
///     .with_client_id("1234567890");
/// ```
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct OAuthConfig {
    pub(crate) client_id: Option<String>,
    pub(crate) auth_url: Url,
    pub(crate) redirect_uri: Url,
    pub(crate) scopes: Vec<String>,
}

impl OAuthConfig {
    /// Create a configuration for the given callback URI with no client id.
    #[must_use]
    pub fn new(redirect_uri: Url) -> Self {
        Self {
            client_id: None,
            redirect_uri,
            auth_url: "https://discord.com/oauth2/authorize"
                .parse()
                .expect("valid default URL"),
            scopes: vec!["identify".into(), "email".into()],
        }
    }

    /// Set the Discord application client id.
    #[must_use]
    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    /// Override the Discord authorization endpoint.
    #[must_use]
    pub fn with_auth_url(mut self, url: Url) -> Self {
        self.auth_url = url;
        self
    }

    /// Override the `OAuth2` scopes (default: `["identify", "email"]`).
    #[must_use]
    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    #[must_use]
    pub fn client_id(&self) -> Option<&str> {
        self.client_id.as_deref()
    }

    #[must_use]
    pub fn auth_url(&self) -> &Url {
        &self.auth_url
    }

    /// Callback URI registered with Discord; also sent upstream with the code.
    #[must_use]
    pub fn redirect_uri(&self) -> &Url {
        &self.redirect_uri
    }

    #[must_use]
    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    /// Build the provider authorization URL around a fresh state token.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingClientId`] when no client id is configured.
    pub fn authorization_request(&self) -> Result<AuthorizationRequest, Error> {
        let client_id = self.client_id.as_deref().ok_or(Error::MissingClientId)?;
        let state = state_token::generate_state();
        let scope = self.scopes.join(" ");

        let mut url = self.auth_url.clone();
        url.query_pairs_mut()
            .append_pair("client_id", client_id)
            .append_pair("redirect_uri", self.redirect_uri.as_str())
            .append_pair("response_type", "code")
            .append_pair("scope", &scope)
            .append_pair("state", &state)
            .append_pair("prompt", "consent");

        Ok(AuthorizationRequest { url, state })
    }
}

/// Authorization URL plus the state it embeds, to be pinned in a cookie.
#[non_exhaustive]
pub struct AuthorizationRequest {
    pub url: Url,
    pub state: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> OAuthConfig {
        OAuthConfig::new("https://example.com/api/auth/discord/callback".parse().unwrap())
            .with_client_id("test-client")
    }

    fn query_value(url: &Url, key: &str) -> Option<String> {
        url.query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }

    #[test]
    fn test_authorization_url_parameters() {
        let req = test_config().authorization_request().unwrap();

        assert_eq!(req.url.host_str(), Some("discord.com"));
        assert_eq!(req.url.path(), "/oauth2/authorize");
        assert_eq!(query_value(&req.url, "client_id").as_deref(), Some("test-client"));
        assert_eq!(
            query_value(&req.url, "redirect_uri").as_deref(),
            Some("https://example.com/api/auth/discord/callback")
        );
        assert_eq!(query_value(&req.url, "response_type").as_deref(), Some("code"));
        assert_eq!(query_value(&req.url, "scope").as_deref(), Some("identify email"));
        assert_eq!(query_value(&req.url, "prompt").as_deref(), Some("consent"));
        assert_eq!(query_value(&req.url, "state"), Some(req.state.clone()));
    }

    #[test]
    fn test_authorization_state_unique_per_call() {
        let config = test_config();
        let req1 = config.authorization_request().unwrap();
        let req2 = config.authorization_request().unwrap();

        assert_ne!(req1.state, req2.state);
    }

    #[test]
    fn test_missing_client_id() {
        let config = OAuthConfig::new("https://example.com/cb".parse().unwrap());
        assert!(matches!(
            config.authorization_request(),
            Err(Error::MissingClientId)
        ));
    }

    #[test]
    fn test_config_with_overrides() {
        let config = test_config()
            .with_auth_url("https://discord.test/authorize".parse().unwrap())
            .with_scopes(vec!["identify".into()]);

        assert_eq!(config.auth_url().as_str(), "https://discord.test/authorize");
        assert_eq!(config.scopes(), &["identify"]);
        assert_eq!(config.client_id(), Some("test-client"));
    }
}

use std::time::Duration;

use url::Url;

use super::origin::OriginPolicy;
use crate::error::Error;
use crate::oauth::OAuthConfig;
use crate::upstream::ApiClient;

const DEFAULT_REDIRECT_URI: &str = "https://owlsinsight.com/api/auth/discord/callback";
const DEFAULT_API_BASE_URL: &str = "http://owls-insight-api-server/api/v1";
const DEFAULT_ALLOWED_ORIGINS: [&str; 3] = [
    "https://owlsinsight.com",
    "https://www.owlsinsight.com",
    "http://localhost:3000",
];

/// Shared web settings used by both config and runtime state.
#[derive(Debug, Clone)]
pub(crate) struct WebSettings {
    pub(crate) session_cookie_name: String,
    pub(crate) session_ttl_days: i64,
    pub(crate) flow_cookie_ttl_secs: i64,
    pub(crate) secure_cookies: bool,
    pub(crate) auth_path: String,
    pub(crate) login_path: String,
    pub(crate) dashboard_path: String,
    pub(crate) origins: OriginPolicy,
}

impl WebSettings {
    fn defaults(canonical_origin: String) -> Self {
        Self {
            session_cookie_name: "token".into(),
            session_ttl_days: 7,
            flow_cookie_ttl_secs: 300,
            secure_cookies: true,
            auth_path: "/api/auth".into(),
            login_path: "/login".into(),
            dashboard_path: "/dashboard".into(),
            origins: OriginPolicy::new(
                canonical_origin,
                DEFAULT_ALLOWED_ORIGINS.iter().map(|s| (*s).to_string()).collect(),
            ),
        }
    }
}

/// Web edge configuration, built once at startup and moved into the router.
///
/// Use [`from_env()`](WebConfig::from_env) for convention-based setup,
/// or [`new()`](WebConfig::new) with `with_*` methods for full control.
pub struct WebConfig {
    pub(super) oauth: OAuthConfig,
    pub(super) api: ApiClient,
    pub(super) settings: WebSettings,
}

impl WebConfig {
    /// Create config from the provider settings and the upstream client.
    ///
    /// The canonical origin defaults to the origin of the OAuth redirect URI.
    #[must_use]
    pub fn new(oauth: OAuthConfig, api: ApiClient) -> Self {
        let canonical = oauth.redirect_uri().origin().ascii_serialization();
        Self {
            oauth,
            api,
            settings: WebSettings::defaults(canonical),
        }
    }

    /// Create config from environment variables.
    ///
    /// # Optional env vars
    /// - `DISCORD_CLIENT_ID`: without it `/api/auth/discord` answers 503
    /// - `DISCORD_REDIRECT_URI`: callback URI registered with Discord
    /// - `DISCORD_AUTH_URL`: override the Discord authorize endpoint
    /// - `API_BASE_URL`: upstream API root, including its version prefix
    /// - `INTERNAL_AUTH_SECRET`: value of the `X-Internal-Auth` header
    /// - `UPSTREAM_TIMEOUT_SECS`: bound on every upstream call (default 15)
    /// - `APP_ENV`: `production` turns on `Secure` cookies
    /// - `CANONICAL_ORIGIN`: fallback origin for redirects
    /// - `ALLOWED_ORIGINS`: comma-separated origin allowlist
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a URL or number fails to parse.
    pub fn from_env() -> Result<Self, Error> {
        let redirect_uri = match parse_url_var("DISCORD_REDIRECT_URI")? {
            Some(url) => url,
            None => parse_url("DISCORD_REDIRECT_URI", DEFAULT_REDIRECT_URI)?,
        };

        let mut oauth = OAuthConfig::new(redirect_uri);
        if let Some(client_id) = non_empty_var("DISCORD_CLIENT_ID") {
            oauth = oauth.with_client_id(client_id);
        }
        if let Some(url) = parse_url_var("DISCORD_AUTH_URL")? {
            oauth = oauth.with_auth_url(url);
        }

        let api_base = match parse_url_var("API_BASE_URL")? {
            Some(url) => url,
            None => parse_url("API_BASE_URL", DEFAULT_API_BASE_URL)?,
        };
        let mut api = ApiClient::new(api_base)
            .with_internal_secret(non_empty_var("INTERNAL_AUTH_SECRET").unwrap_or_default());
        if let Some(secs) = non_empty_var("UPSTREAM_TIMEOUT_SECS") {
            let secs: u64 = secs
                .parse()
                .map_err(|e| Error::Config(format!("UPSTREAM_TIMEOUT_SECS: {e}")))?;
            api = api.with_timeout(Duration::from_secs(secs));
        }

        let production = non_empty_var("APP_ENV").as_deref() == Some("production");
        let mut config = Self::new(oauth, api).with_secure_cookies(production);

        if let Some(origin) = non_empty_var("CANONICAL_ORIGIN") {
            let canonical = parse_url("CANONICAL_ORIGIN", &origin)?
                .origin()
                .ascii_serialization();
            config = config.with_canonical_origin(canonical);
        }
        if let Some(list) = non_empty_var("ALLOWED_ORIGINS") {
            config = config.with_allowed_origins(
                list.split(',')
                    .map(|s| s.trim().trim_end_matches('/').to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
            );
        }

        Ok(config)
    }

    #[must_use]
    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.settings.secure_cookies = secure;
        self
    }

    #[must_use]
    pub fn with_session_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.settings.session_cookie_name = name.into();
        self
    }

    #[must_use]
    pub fn with_session_ttl_days(mut self, days: i64) -> Self {
        self.settings.session_ttl_days = days;
        self
    }

    #[must_use]
    pub fn with_auth_path(mut self, path: impl Into<String>) -> Self {
        self.settings.auth_path = path.into();
        self
    }

    #[must_use]
    pub fn with_canonical_origin(mut self, origin: impl Into<String>) -> Self {
        let allowed = self.settings.origins.allowed().to_vec();
        self.settings.origins = OriginPolicy::new(origin, allowed);
        self
    }

    #[must_use]
    pub fn with_allowed_origins(mut self, origins: Vec<String>) -> Self {
        let canonical = self.settings.origins.canonical().to_string();
        self.settings.origins = OriginPolicy::new(canonical, origins);
        self
    }

    #[must_use]
    pub fn oauth(&self) -> &OAuthConfig {
        &self.oauth
    }

    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    #[must_use]
    pub fn origins(&self) -> &OriginPolicy {
        &self.settings.origins
    }

    #[must_use]
    pub fn secure_cookies(&self) -> bool {
        self.settings.secure_cookies
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_url(name: &str, raw: &str) -> Result<Url, Error> {
    raw.parse()
        .map_err(|e| Error::Config(format!("{name}: {e}")))
}

fn parse_url_var(name: &str) -> Result<Option<Url>, Error> {
    non_empty_var(name).map(|raw| parse_url(name, &raw)).transpose()
}

use std::sync::Arc;

use super::config::{WebConfig, WebSettings};
use crate::oauth::OAuthConfig;
use crate::upstream::ApiClient;

/// Shared state for route handlers and the session gate.
#[derive(Clone)]
pub(super) struct AppState {
    pub(super) oauth: Arc<OAuthConfig>,
    pub(super) api: Arc<ApiClient>,
    pub(super) settings: Arc<WebSettings>,
}

impl From<WebConfig> for AppState {
    fn from(config: WebConfig) -> Self {
        Self {
            oauth: Arc::new(config.oauth),
            api: Arc::new(config.api),
            settings: Arc::new(config.settings),
        }
    }
}

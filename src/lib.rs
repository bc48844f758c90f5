//! Web edge for the Owls Insight odds API.
//!
//! Signs visitors in with Discord (authorization-code flow, cookie-pinned
//! CSRF state, code exchange delegated to the upstream API), issues the
//! session cookie, relays session calls to the upstream, and gates the
//! dashboard pages on the presence of that cookie.

pub mod error;
pub mod middleware;
pub mod oauth;
pub mod state_token;
pub mod types;
pub mod upstream;

// Re-exports for convenient access
pub use error::Error;
pub use middleware::{AuthError, OriginPolicy, WebConfig, web_routes};
pub use oauth::{AuthorizationRequest, OAuthConfig, PROVIDER};
pub use state_token::{generate_state, states_match};
pub use types::{SessionToken, Tier};
pub use upstream::{ApiClient, ExchangeResponse, INTERNAL_AUTH_HEADER, Relayed};

//! Axum integration: Discord sign-in routes, session proxy routes and the
//! dashboard session gate.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use owls_web::middleware::{WebConfig, web_routes};
//!
//! // 1. Configure from environment
//! let config = WebConfig::from_env()?;
//!
//! // 2. Mount auth routes in front of whatever serves the pages
//! let pages = axum::Router::new().fallback_service(tower_http::services::ServeDir::new("public"));
//! let app = web_routes(config, pages);
//! ```

mod config;
mod cookies;
mod error;
mod flow;
mod gate;
mod origin;
mod routes;
mod state;

pub use config::WebConfig;
pub use error::AuthError;
pub use flow::{CallbackOutcome, CallbackParams, VerifiedCallback, conclude, verify_callback};
pub use origin::OriginPolicy;
pub use routes::web_routes;

//! Callback decision logic, free of any HTTP framework.
//!
//! The handler gathers the query, the cookies and the exchange result; these
//! functions decide the outcome and where the browser goes next.

use url::form_urlencoded;

use crate::error::Error;
use crate::state_token;
use crate::types::{SessionToken, Tier};
use crate::upstream::ExchangeResponse;

pub const AUTHORIZATION_DENIED: &str = "authorization_denied";
pub const MISSING_PARAMS: &str = "missing_params";
pub const EXPIRED_STATE: &str = "expired_state";
pub const INVALID_STATE: &str = "invalid_state";

/// Query parameters Discord appends to the callback URL.
#[derive(Debug, Default)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

impl CallbackParams {
    /// Parse a raw query string. The first occurrence of a key wins and
    /// unknown keys are ignored, so no query string is ever rejected.
    #[must_use]
    pub fn from_query(query: Option<&str>) -> Self {
        let mut params = Self::default();
        for (key, value) in form_urlencoded::parse(query.unwrap_or_default().as_bytes()) {
            let slot = match &*key {
                "code" => &mut params.code,
                "state" => &mut params.state,
                "error" => &mut params.error,
                "error_description" => &mut params.error_description,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }
        params
    }
}

/// Terminal result of a callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackOutcome {
    Success {
        token: Option<SessionToken>,
        tier: Option<Tier>,
    },
    /// Provider reported an error, or `code`/`state` were missing.
    ProtocolError { code: &'static str },
    /// Stored state absent or not equal to the echoed one.
    CsrfError { code: &'static str },
    /// Exchange failed upstream.
    UpstreamError { code: String },
}

/// Authorization code that passed the CSRF check.
#[derive(Debug)]
pub struct VerifiedCallback {
    pub code: String,
}

/// Check the provider's answer against the state pinned in the cookie.
///
/// # Errors
///
/// Returns the terminal outcome when the callback must not reach the upstream.
pub fn verify_callback(
    params: &CallbackParams,
    stored_state: Option<&str>,
) -> Result<VerifiedCallback, CallbackOutcome> {
    if params.error.is_some() {
        return Err(CallbackOutcome::ProtocolError {
            code: AUTHORIZATION_DENIED,
        });
    }

    let (Some(code), Some(received)) = (
        params.code.as_deref().filter(|c| !c.is_empty()),
        params.state.as_deref().filter(|s| !s.is_empty()),
    ) else {
        return Err(CallbackOutcome::ProtocolError {
            code: MISSING_PARAMS,
        });
    };

    let Some(stored) = stored_state.filter(|s| !s.is_empty()) else {
        return Err(CallbackOutcome::CsrfError {
            code: EXPIRED_STATE,
        });
    };

    if !state_token::states_match(received, stored) {
        return Err(CallbackOutcome::CsrfError {
            code: INVALID_STATE,
        });
    }

    Ok(VerifiedCallback {
        code: code.to_string(),
    })
}

/// Turn the exchange result into the final outcome.
#[must_use]
pub fn conclude(exchange: Result<ExchangeResponse, Error>, tier: Option<Tier>) -> CallbackOutcome {
    match exchange {
        Ok(response) => CallbackOutcome::Success {
            token: response.token.filter(|t| !t.as_str().is_empty()),
            tier,
        },
        Err(e) => CallbackOutcome::UpstreamError {
            code: e.redirect_code().to_string(),
        },
    }
}

impl CallbackOutcome {
    /// `/login?error=` code, or `None` on success.
    #[must_use]
    pub fn error_code(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::ProtocolError { code } | Self::CsrfError { code } => Some(*code),
            Self::UpstreamError { code } => Some(code.as_str()),
        }
    }

    /// Absolute URL the browser is sent to.
    #[must_use]
    pub fn destination(&self, origin: &str, login_path: &str, dashboard_path: &str) -> String {
        match self {
            Self::Success {
                tier: Some(tier), ..
            } => format!("{origin}{dashboard_path}?start_checkout={tier}"),
            Self::Success { tier: None, .. } => format!("{origin}{dashboard_path}"),
            failure => {
                let code = urlencoding::encode(failure.error_code().unwrap_or_default());
                format!("{origin}{login_path}?error={code}")
            }
        }
    }
}

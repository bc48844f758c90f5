use axum::extract::{RawQuery, State};
use axum::http::header::{COOKIE, LOCATION};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Json, Router, middleware};
use axum_extra::extract::CookieJar;
use serde_json::{Value as JsonValue, json};
use url::form_urlencoded;

use super::config::WebConfig;
use super::cookies;
use super::error::AuthError;
use super::flow::{self, CallbackOutcome, CallbackParams};
use super::gate;
use super::state::AppState;
use crate::oauth::PROVIDER;
use crate::types::{SessionToken, Tier};

/// Create the web router.
///
/// `pages` is whatever serves the site itself (static files, a frontend
/// server); it is wrapped in the session gate. The auth API routes are not.
pub fn web_routes(config: WebConfig, pages: Router) -> Router {
    let auth_path = config.settings.auth_path.clone();
    let state = AppState::from(config);

    let gated = pages.layer(middleware::from_fn_with_state(
        state.clone(),
        gate::session_gate,
    ));

    Router::new()
        .route(&format!("{auth_path}/{PROVIDER}"), get(authorize))
        .route(&format!("{auth_path}/{PROVIDER}/callback"), get(callback))
        .route(&format!("{auth_path}/login"), post(login))
        .route(&format!("{auth_path}/me"), get(me))
        .route(&format!("{auth_path}/logout"), post(logout))
        .with_state(state)
        .merge(gated)
}

// ── Authorize ──────────────────────────────────────────────────────

async fn authorize(
    State(state): State<AppState>,
    jar: CookieJar,
    RawQuery(query): RawQuery,
) -> Result<(CookieJar, Response), AuthError> {
    let auth_req = state.oauth.authorization_request()?;
    let ttl = state.settings.flow_cookie_ttl_secs;
    let secure = state.settings.secure_cookies;

    let jar = jar.add(cookies::state_cookie(&auth_req.state, ttl, secure));

    // Unknown tiers are dropped, and a tier left by an abandoned flow is expired.
    let jar = match requested_tier(query.as_deref()) {
        Some(tier) => jar.add(cookies::tier_cookie(tier, ttl, secure)),
        None => jar.add(cookies::clear_tier_cookie()),
    };

    Ok((jar, found(auth_req.url.as_str())))
}

// ── Callback ───────────────────────────────────────────────────────

async fn callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    RawQuery(query): RawQuery,
) -> (CookieJar, Redirect) {
    let params = CallbackParams::from_query(query.as_deref());
    let origin = state.settings.origins.resolve_origin(&headers);
    let stored_state = cookies::get_state(&jar);
    let tier = cookies::get_tier(&jar);

    let outcome = match flow::verify_callback(&params, stored_state.as_deref()) {
        Ok(verified) => {
            let exchange = state
                .api
                .exchange_code(PROVIDER, &verified.code, state.oauth.redirect_uri())
                .await;
            if let Err(e) = &exchange {
                tracing::error!(error = %e, "Discord code exchange failed");
            }
            flow::conclude(exchange, tier)
        }
        Err(outcome) => outcome,
    };

    let mut jar = cookies::clear_flow_cookies(jar);
    match &outcome {
        CallbackOutcome::Success { token, tier } => {
            if let Some(token) = token {
                jar = jar.add(cookies::session_cookie(
                    &state.settings.session_cookie_name,
                    token,
                    state.settings.session_ttl_days,
                    state.settings.secure_cookies,
                ));
            }
            tracing::info!(
                session_issued = token.is_some(),
                checkout = tier.map(Tier::as_str),
                "Discord login successful"
            );
        }
        CallbackOutcome::ProtocolError { .. } => {
            tracing::warn!(
                code = outcome.error_code(),
                provider_error = params.error.as_deref(),
                description = params.error_description.as_deref(),
                "Discord callback rejected"
            );
        }
        CallbackOutcome::CsrfError { .. } | CallbackOutcome::UpstreamError { .. } => {
            tracing::warn!(code = outcome.error_code(), "Discord callback rejected");
        }
    }

    let destination = outcome.destination(
        &origin,
        &state.settings.login_path,
        &state.settings.dashboard_path,
    );
    (jar, Redirect::temporary(&destination))
}

// ── Password login ─────────────────────────────────────────────────

async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<JsonValue>,
) -> Result<(CookieJar, Response), AuthError> {
    let relayed = state.api.login(&body).await?;

    let token = relayed
        .status
        .is_success()
        .then(|| relayed.body.get("token").and_then(JsonValue::as_str))
        .flatten()
        .filter(|t| !t.is_empty())
        .map(|t| SessionToken::from(t.to_string()));

    let jar = match token {
        Some(token) => jar.add(cookies::session_cookie(
            &state.settings.session_cookie_name,
            &token,
            state.settings.session_ttl_days,
            state.settings.secure_cookies,
        )),
        None => jar,
    };

    Ok((jar, relay(relayed.status, relayed.body)))
}

// ── Current user ───────────────────────────────────────────────────

async fn me(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Result<(CookieJar, Response), AuthError> {
    let relayed = state.api.me(cookie_header(&headers)).await?;

    // A dead token would bounce the browser between /login and /dashboard.
    let jar = if relayed.status == StatusCode::UNAUTHORIZED {
        jar.add(cookies::clear_session_cookie(
            &state.settings.session_cookie_name,
            state.settings.secure_cookies,
        ))
    } else {
        jar
    };

    Ok((jar, relay(relayed.status, relayed.body)))
}

// ── Logout ─────────────────────────────────────────────────────────

async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
) -> (CookieJar, Json<JsonValue>) {
    if let Err(e) = state.api.logout(cookie_header(&headers)).await {
        tracing::warn!(error = %e, "Upstream logout failed");
    }

    let clear_cookie = cookies::clear_session_cookie(
        &state.settings.session_cookie_name,
        state.settings.secure_cookies,
    );
    (jar.add(clear_cookie), Json(json!({ "success": true })))
}

// ── Helpers ────────────────────────────────────────────────────────

/// Plain 302 with an absolute `Location`.
pub(super) fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(LOCATION, location.to_string())]).into_response()
}

fn requested_tier(query: Option<&str>) -> Option<Tier> {
    form_urlencoded::parse(query?.as_bytes())
        .find(|(key, _)| key == "tier")
        .and_then(|(_, value)| value.parse().ok())
}

fn relay(status: StatusCode, body: JsonValue) -> Response {
    (status, Json(body)).into_response()
}

fn cookie_header(headers: &HeaderMap) -> Option<&str> {
    headers.get(COOKIE).and_then(|v| v.to_str().ok())
}

use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use time::Duration;

use crate::types::{SessionToken, Tier};

pub(crate) const STATE_COOKIE_NAME: &str = "oauth_state";
pub(crate) const TIER_COOKIE_NAME: &str = "oauth_tier";

/// Short-lived cookie carrying one half of the in-flight OAuth flow.
fn flow_cookie(name: &'static str, value: String, ttl_secs: i64, secure: bool) -> Cookie<'static> {
    Cookie::build((name, value))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(Duration::seconds(ttl_secs))
        .build()
}

/// Create the state cookie for the authorization request.
pub(super) fn state_cookie(state: &str, ttl_secs: i64, secure: bool) -> Cookie<'static> {
    flow_cookie(STATE_COOKIE_NAME, state.to_string(), ttl_secs, secure)
}

/// Create the tier cookie preserving a checkout intent across the provider round-trip.
pub(super) fn tier_cookie(tier: Tier, ttl_secs: i64, secure: bool) -> Cookie<'static> {
    flow_cookie(TIER_COOKIE_NAME, tier.to_string(), ttl_secs, secure)
}

fn expired(name: &'static str) -> Cookie<'static> {
    Cookie::build((name, ""))
        .http_only(true)
        .path("/")
        .max_age(Duration::ZERO)
        .build()
}

/// Expire both flow cookies, whether or not the browser sent them.
pub(super) fn clear_flow_cookies(jar: CookieJar) -> CookieJar {
    jar.add(expired(STATE_COOKIE_NAME))
        .add(expired(TIER_COOKIE_NAME))
}

/// Expire a tier cookie left behind by an earlier, abandoned flow.
pub(super) fn clear_tier_cookie() -> Cookie<'static> {
    expired(TIER_COOKIE_NAME)
}

/// Create session cookie.
pub(super) fn session_cookie(
    name: &str,
    token: &SessionToken,
    ttl_days: i64,
    secure: bool,
) -> Cookie<'static> {
    Cookie::build((name.to_string(), token.as_str().to_string()))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(Duration::days(ttl_days))
        .build()
}

/// Create removal cookie for session.
pub(super) fn clear_session_cookie(name: &str, secure: bool) -> Cookie<'static> {
    Cookie::build((name.to_string(), ""))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(Duration::ZERO)
        .build()
}

/// Get the stored state from cookies.
pub(super) fn get_state(jar: &CookieJar) -> Option<String> {
    jar.get(STATE_COOKIE_NAME)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}

/// Get the preserved tier; unknown values count as absent.
pub(super) fn get_tier(jar: &CookieJar) -> Option<Tier> {
    jar.get(TIER_COOKIE_NAME)
        .and_then(|c| c.value().parse().ok())
}

/// Whether the browser holds a non-empty session cookie.
pub(super) fn has_session(jar: &CookieJar, name: &str) -> bool {
    jar.get(name).is_some_and(|c| !c.value().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_cookie_attributes() {
        let cookie = state_cookie("abc", 300, true);
        let rendered = cookie.to_string();

        assert_eq!(cookie.name(), "oauth_state");
        assert_eq!(cookie.value(), "abc");
        assert!(rendered.contains("HttpOnly"));
        assert!(rendered.contains("Secure"));
        assert!(rendered.contains("SameSite=Lax"));
        assert!(rendered.contains("Path=/"));
        assert!(rendered.contains("Max-Age=300"));
    }

    #[test]
    fn secure_follows_flag() {
        assert!(!state_cookie("abc", 300, false).to_string().contains("Secure"));
        assert!(!tier_cookie(Tier::Mvp, 300, false).to_string().contains("Secure"));
    }

    #[test]
    fn session_cookie_lasts_seven_days() {
        let token = SessionToken::from("jwt1".to_string());
        let rendered = session_cookie("token", &token, 7, false).to_string();
        assert!(rendered.starts_with("token=jwt1"));
        assert!(rendered.contains("Max-Age=604800"));
        assert!(rendered.contains("HttpOnly"));
    }

    #[test]
    fn clearing_emits_both_cookies_even_when_absent() {
        let jar = clear_flow_cookies(CookieJar::new());
        let names: Vec<String> = jar.iter().map(|c| c.name().to_string()).collect();
        assert!(names.contains(&STATE_COOKIE_NAME.to_string()));
        assert!(names.contains(&TIER_COOKIE_NAME.to_string()));
        for cookie in jar.iter() {
            assert_eq!(cookie.value(), "");
            assert_eq!(cookie.max_age(), Some(Duration::ZERO));
        }
    }

    #[test]
    fn unknown_tier_cookie_is_ignored() {
        let jar = CookieJar::new().add(Cookie::new(TIER_COOKIE_NAME, "platinum"));
        assert_eq!(get_tier(&jar), None);

        let jar = CookieJar::new().add(Cookie::new(TIER_COOKIE_NAME, "rookie"));
        assert_eq!(get_tier(&jar), Some(Tier::Rookie));
    }

    #[test]
    fn empty_session_cookie_is_no_session() {
        let jar = CookieJar::new().add(Cookie::new("token", ""));
        assert!(!has_session(&jar, "token"));

        let jar = CookieJar::new().add(Cookie::new("token", "jwt"));
        assert!(has_session(&jar, "token"));
    }
}

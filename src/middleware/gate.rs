use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::extract::CookieJar;
use url::Url;

use super::cookies;
use super::routes::found;
use super::state::AppState;

/// Redirect anonymous visitors away from the dashboard and signed-in
/// visitors away from the login page.
pub(super) async fn session_gate(
    State(state): State<AppState>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    let settings = &state.settings;
    let path = request.uri().path().to_owned();
    let signed_in = cookies::has_session(&jar, &settings.session_cookie_name);

    if path.starts_with(&settings.dashboard_path) && !signed_in {
        let origin = settings.origins.resolve_origin(request.headers());
        return found(&login_url(&origin, &settings.login_path, &path));
    }

    if path.starts_with(&settings.login_path) && signed_in {
        let origin = settings.origins.resolve_origin(request.headers());
        return found(&format!("{origin}{}", settings.dashboard_path));
    }

    next.run(request).await
}

fn login_url(origin: &str, login_path: &str, return_to: &str) -> String {
    let base = format!("{origin}{login_path}");
    match Url::parse(&base) {
        Ok(mut url) => {
            url.query_pairs_mut().append_pair("redirect", return_to);
            url.into()
        }
        Err(_) => base,
    }
}

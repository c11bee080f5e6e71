//! The `auth_token` session cookie.

use axum::http::HeaderMap;
use axum::http::header::{AUTHORIZATION, COOKIE};
use cookie::time::Duration;
use cookie::{Cookie, SameSite};

/// Name of the session cookie.
pub const AUTH_COOKIE: &str = "auth_token";

/// Session cookie storing `token` for `max_age_secs`.
#[must_use]
pub fn session_cookie(token: &str, max_age_secs: i64, secure: bool) -> Cookie<'static> {
    Cookie::build((AUTH_COOKIE, token.to_owned()))
        .path("/")
        .max_age(Duration::seconds(max_age_secs))
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

/// Session cookie with an empty value and `Max-Age=0`.
#[must_use]
pub fn cleared_cookie(secure: bool) -> Cookie<'static> {
    session_cookie("", 0, secure)
}

/// Session token from the `auth_token` cookie, else from `Authorization: Bearer`.
#[must_use]
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == AUTH_COOKIE && !cookie.value().is_empty())
        .map(|cookie| cookie.value().to_owned())
        .or_else(|| {
            headers
                .get(AUTHORIZATION)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.strip_prefix("Bearer "))
                .map(str::trim)
                .filter(|token| !token.is_empty())
                .map(str::to_owned)
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("abc", 604_800, false);
        assert_eq!(cookie.name(), AUTH_COOKIE);
        assert_eq!(cookie.value(), "abc");
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(Duration::seconds(604_800)));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_ne!(cookie.secure(), Some(true));

        let header = cookie.to_string();
        assert!(header.starts_with("auth_token=abc"));
        assert!(header.contains("Max-Age=604800"));
        assert!(!header.contains("Secure"));

        assert_eq!(session_cookie("abc", 1, true).secure(), Some(true));
    }

    #[test]
    fn test_cleared_cookie() {
        let header = cleared_cookie(false).to_string();
        assert!(header.starts_with("auth_token=;"));
        assert!(header.contains("Max-Age=0"));
    }

    #[test]
    fn test_cookie_preferred_over_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("theme=dark; auth_token=from-cookie"));
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer from-header"));
        assert_eq!(token_from_headers(&headers).as_deref(), Some("from-cookie"));
    }

    #[test]
    fn test_issued_cookie_reads_back() {
        let issued = session_cookie("aaa.bbb.ccc", 60, false);
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&issued.stripped().to_string()).unwrap(),
        );
        assert_eq!(token_from_headers(&headers).as_deref(), Some("aaa.bbb.ccc"));
    }

    #[test]
    fn test_bearer_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("auth_token="));
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer from-header"));
        assert_eq!(token_from_headers(&headers).as_deref(), Some("from-header"));
    }

    #[test]
    fn test_no_token() {
        let mut headers = HeaderMap::new();
        assert_eq!(token_from_headers(&headers), None);
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwYXNz"));
        assert_eq!(token_from_headers(&headers), None);
    }
}

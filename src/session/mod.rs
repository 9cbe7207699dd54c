//! Carries the session token between client and server in a cookie.

use axum::http::{
    header::{InvalidHeaderValue, COOKIE},
    HeaderMap, HeaderValue,
};
use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::auth::IssuedToken;
use crate::config::SecurityConfig;

pub const SESSION_COOKIE_NAME: &str = "token";

/// Cookie attributes shared by the set and clear paths.
#[derive(Debug, Clone)]
pub struct SessionCookies {
    domain: Option<String>,
    secure: bool,
    ttl: Duration,
}

impl SessionCookies {
    pub fn new(domain: Option<String>, secure: bool, ttl: Duration) -> Self {
        Self { domain, secure, ttl }
    }

    pub fn from_config(security: &SecurityConfig, ttl: Duration) -> Self {
        Self::new(security.api_domain.clone(), security.cookie_secure, ttl)
    }

    /// `Set-Cookie` value carrying `issued`. The cookie expires with the token.
    pub fn session_cookie(&self, issued: &IssuedToken) -> Result<HeaderValue, InvalidHeaderValue> {
        let max_age = self.ttl.num_seconds().max(0);
        let cookie = self.render(&issued.token, issued.expires_at, max_age);
        HeaderValue::from_str(&cookie)
    }

    /// `Set-Cookie` value that makes the client drop the session.
    pub fn clear_cookie(&self) -> Result<HeaderValue, InvalidHeaderValue> {
        let epoch = Utc.timestamp_opt(0, 0).single().unwrap_or_default();
        HeaderValue::from_str(&self.render("", epoch, 0))
    }

    fn render(&self, value: &str, expires: DateTime<Utc>, max_age: i64) -> String {
        let mut cookie = format!(
            "{SESSION_COOKIE_NAME}={value}; Path=/; Expires={}; Max-Age={max_age}; HttpOnly; SameSite=None",
            http_date(expires)
        );
        if let Some(domain) = &self.domain {
            cookie.push_str("; Domain=");
            cookie.push_str(domain);
        }
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

/// The session token from the request's `Cookie` headers, if any.
///
/// An empty value counts as absent.
pub fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            (name.trim() == SESSION_COOKIE_NAME).then(|| value.trim().trim_matches('"'))
        })
        .find(|value| !value.is_empty())
        .map(str::to_string)
}

fn http_date(at: DateTime<Utc>) -> String {
    at.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cookies(domain: Option<&str>, secure: bool) -> SessionCookies {
        SessionCookies::new(domain.map(str::to_string), secure, Duration::hours(12))
    }

    fn issued() -> IssuedToken {
        IssuedToken {
            token: "aaa.bbb.ccc".to_string(),
            expires_at: Utc.with_ymd_and_hms(2024, 3, 9, 20, 0, 0).unwrap(),
        }
    }

    #[test]
    fn session_cookie_carries_security_attributes() {
        let value = cookies(Some("api.example.com"), true).session_cookie(&issued()).unwrap();
        let value = value.to_str().unwrap();

        assert!(value.starts_with("token=aaa.bbb.ccc; "));
        assert!(value.contains("Path=/"));
        assert!(value.contains("HttpOnly"));
        assert!(value.contains("SameSite=None"));
        assert!(value.contains("Domain=api.example.com"));
        assert!(value.contains("Secure"));
        assert!(value.contains("Expires=Sat, 09 Mar 2024 20:00:00 GMT"));
        assert!(value.contains("Max-Age=43200"));
    }

    #[test]
    fn optional_attributes_are_omitted() {
        let value = cookies(None, false).session_cookie(&issued()).unwrap();
        let value = value.to_str().unwrap();
        assert!(!value.contains("Domain="));
        assert!(!value.contains("Secure"));
    }

    #[test]
    fn clear_cookie_expires_immediately() {
        let value = cookies(Some("api.example.com"), false).clear_cookie().unwrap();
        let value = value.to_str().unwrap();

        assert!(value.starts_with("token=; "));
        assert!(value.contains("Max-Age=0"));
        assert!(value.contains("Expires=Thu, 01 Jan 1970 00:00:00 GMT"));
        assert!(value.contains("Domain=api.example.com"));
        assert!(value.contains("HttpOnly"));
    }

    #[test]
    fn extracts_token_among_other_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("theme=dark; token=abc.def.ghi; lang=en"));
        assert_eq!(extract_session_token(&headers).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn extracts_across_multiple_cookie_headers() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("theme=dark"));
        headers.append(COOKIE, HeaderValue::from_static("token=xyz"));
        assert_eq!(extract_session_token(&headers).as_deref(), Some("xyz"));
    }

    #[test]
    fn missing_or_empty_token_is_none() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_session_token(&headers), None);

        headers.insert(COOKIE, HeaderValue::from_static("token=; other=1"));
        assert_eq!(extract_session_token(&headers), None);

        headers.insert(COOKIE, HeaderValue::from_static("tokens=abc"));
        assert_eq!(extract_session_token(&headers), None);
    }
}

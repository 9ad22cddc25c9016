//! Cookie transport for access tokens.
//!
//! Tokens ride in an HttpOnly cookie so browser scripts never see them.
//! Writes append `Set-Cookie` headers to an already-built response, which
//! keeps issuing and clearing tokens decoupled from handler bodies.

use axum::body::Body;
use http::header::{COOKIE, SET_COOKIE};
use http::{HeaderMap, HeaderValue, Response};

pub const DEFAULT_COOKIE_NAME: &str = "auth_token";

/// Reads and writes the access token cookie.
#[derive(Debug, Clone)]
pub struct CookieTokenAccessor {
    cookie_name: String,
}

impl Default for CookieTokenAccessor {
    fn default() -> Self {
        Self::new(DEFAULT_COOKIE_NAME)
    }
}

impl CookieTokenAccessor {
    pub fn new(cookie_name: impl Into<String>) -> Self {
        Self {
            cookie_name: cookie_name.into(),
        }
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Extract the token from the request's Cookie header, if present.
    pub fn get(&self, headers: &HeaderMap) -> Option<String> {
        let cookies = headers.get(COOKIE)?.to_str().ok()?;
        for pair in cookies.split(';') {
            // Pairs without '=' (flag cookies) must not end the scan.
            let Some((name, value)) = pair.trim().split_once('=') else {
                continue;
            };
            if name == self.cookie_name {
                return Some(value.to_string());
            }
        }
        None
    }

    /// Attach the token to `response` as a session cookie.
    ///
    /// HttpOnly keeps it out of script reach, Secure restricts it to TLS,
    /// and SameSite=Lax lets top-level navigations carry it while blocking
    /// cross-site subrequests.
    pub fn set(&self, response: &mut Response<Body>, token: &str) {
        let value = format!(
            "{}={}; HttpOnly; Secure; SameSite=Lax; Path=/",
            self.cookie_name, token
        );
        if let Ok(header) = HeaderValue::from_str(&value) {
            response.headers_mut().append(SET_COOKIE, header);
        }
    }

    /// Expire the cookie immediately. Safe to call when none is set.
    pub fn delete(&self, response: &mut Response<Body>) {
        let value = format!(
            "{}=; Max-Age=0; HttpOnly; Secure; SameSite=Lax; Path=/",
            self.cookie_name
        );
        if let Ok(header) = HeaderValue::from_str(&value) {
            response.headers_mut().append(SET_COOKIE, header);
        }
    }
}

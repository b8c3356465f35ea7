// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Ticket cookie reading and `Set-Cookie` rendering.

use std::fmt::Write as _;

use async_trait::async_trait;
use axum::http::{header, header::InvalidHeaderValue, Extensions, HeaderMap, HeaderValue};
use warden_config::CookieConfig;

use crate::auth::TicketCarrier;
use crate::error::ApiResult;

const EPOCH: &str = "Thu, 01 Jan 1970 00:00:00 GMT";

/// Carries ticket tokens in a cookie.
#[derive(Debug, Clone, Default)]
pub struct TicketCookie {
    config: CookieConfig,
}

impl TicketCookie {
    /// Creates a carrier from cookie settings.
    pub fn new(config: CookieConfig) -> Self {
        Self { config }
    }

    /// Returns the cookie settings.
    pub fn config(&self) -> &CookieConfig {
        &self.config
    }

    /// Returns the cookie name.
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Reads the ticket from the `Cookie` headers, first occurrence wins.
    pub fn read(&self, headers: &HeaderMap) -> Option<String> {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| name.trim() == self.config.name)
            .map(|(_, value)| value.trim().trim_matches('"').to_string())
            .filter(|value| !value.is_empty())
    }

    /// Renders a cookie carrying `token` for `max_age` seconds.
    pub fn set(&self, token: &str, max_age: u64) -> Result<HeaderValue, InvalidHeaderValue> {
        let mut cookie = format!("{}={}; Max-Age={}", self.config.name, token, max_age);
        self.push_attributes(&mut cookie);
        HeaderValue::from_str(&cookie)
    }

    /// Renders an expired, empty cookie.
    pub fn clear(&self) -> Result<HeaderValue, InvalidHeaderValue> {
        let mut cookie = format!("{}=; Max-Age=0; Expires={}", self.config.name, EPOCH);
        self.push_attributes(&mut cookie);
        HeaderValue::from_str(&cookie)
    }

    fn push_attributes(&self, cookie: &mut String) {
        let _ = write!(cookie, "; Path={}", self.config.path);
        if let Some(domain) = &self.config.domain {
            let _ = write!(cookie, "; Domain={}", domain);
        }
        if self.config.secure {
            cookie.push_str("; Secure");
        }
        if self.config.http_only {
            cookie.push_str("; HttpOnly");
        }
        let _ = write!(cookie, "; SameSite={}", self.config.same_site.as_str());
    }
}

#[async_trait]
impl TicketCarrier for TicketCookie {
    type Slot = ();

    async fn read_token(
        &self,
        headers: &HeaderMap,
        _extensions: &Extensions,
    ) -> ApiResult<(Option<String>, ())> {
        Ok((self.read(headers), ()))
    }

    async fn store_token(&self, _slot: &(), headers: &mut HeaderMap, token: &str, max_age: u64) {
        append_set_cookie(headers, self.set(token, max_age));
    }

    async fn clear_token(&self, _slot: &(), headers: &mut HeaderMap) {
        append_set_cookie(headers, self.clear());
    }
}

fn append_set_cookie(headers: &mut HeaderMap, value: Result<HeaderValue, InvalidHeaderValue>) {
    match value {
        Ok(value) => {
            headers.append(header::SET_COOKIE, value);
        }
        Err(e) => tracing::error!(error = %e, "Invalid Set-Cookie value"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_config::SameSite;

    fn headers(cookies: &[&'static str]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for cookie in cookies {
            map.append(header::COOKIE, HeaderValue::from_static(cookie));
        }
        map
    }

    #[test]
    fn test_read_finds_named_cookie() {
        let cookie = TicketCookie::default();
        let map = headers(&["theme=dark; AUTH_TKT=abc123; lang=en"]);
        assert_eq!(cookie.read(&map), Some("abc123".to_string()));
    }

    #[test]
    fn test_read_across_headers_and_quotes() {
        let cookie = TicketCookie::new(CookieConfig::named("tkt"));
        let map = headers(&["theme=dark", "tkt=\"xyz\""]);
        assert_eq!(cookie.read(&map), Some("xyz".to_string()));
    }

    #[test]
    fn test_read_ignores_missing_and_empty() {
        let cookie = TicketCookie::default();
        assert_eq!(cookie.read(&headers(&["AUTH_TKT_OLD=abc"])), None);
        assert_eq!(cookie.read(&headers(&["AUTH_TKT="])), None);
        assert_eq!(cookie.read(&HeaderMap::new()), None);
    }

    #[test]
    fn test_set_cookie_attributes() {
        let cookie = TicketCookie::default();
        let value = cookie.set("tok", 3600).unwrap();
        assert_eq!(
            value.to_str().unwrap(),
            "AUTH_TKT=tok; Max-Age=3600; Path=/; HttpOnly; SameSite=Lax"
        );
    }

    #[test]
    fn test_set_cookie_secure_domain() {
        let config = CookieConfig {
            domain: Some("example.com".to_string()),
            secure: true,
            same_site: SameSite::Strict,
            ..CookieConfig::default()
        };
        let value = TicketCookie::new(config).set("tok", 60).unwrap();
        let value = value.to_str().unwrap();
        assert!(value.contains("; Domain=example.com"));
        assert!(value.contains("; Secure"));
        assert!(value.ends_with("; SameSite=Strict"));
    }

    #[tokio::test]
    async fn test_carrier_appends_set_cookie() {
        let cookie = TicketCookie::default();
        let (token, ()) = cookie
            .read_token(&headers(&["AUTH_TKT=abc"]), &Extensions::new())
            .await
            .unwrap();
        assert_eq!(token.as_deref(), Some("abc"));

        let mut out = HeaderMap::new();
        cookie.store_token(&(), &mut out, "tok", 60).await;
        cookie.clear_token(&(), &mut out).await;

        let values: Vec<_> = out.get_all(header::SET_COOKIE).iter().collect();
        assert_eq!(values.len(), 2);
        assert!(values[0].to_str().unwrap().starts_with("AUTH_TKT=tok; Max-Age=60"));
        assert!(values[1].to_str().unwrap().starts_with("AUTH_TKT=; Max-Age=0"));
    }

    #[test]
    fn test_clear_cookie() {
        let value = TicketCookie::default().clear().unwrap();
        let value = value.to_str().unwrap();
        assert!(value.starts_with("AUTH_TKT=; Max-Age=0; Expires="));
        assert!(value.contains("Path=/"));
    }
}

//! # Cookie Jar
//!
//! Cookie-backed cart slots.
//!
//! ## Request / Response Cycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Request                                                                │
//! │  Cookie: 3f1c…_cart=100%2C2%3B101%2C1                                   │
//! │                │                                                        │
//! │                ▼                                                        │
//! │  CookieJar::from_request_header()  → read_raw() → "100,2;101,1"        │
//! │                                                                         │
//! │  CartEngine mutation  → write_raw() / delete_raw()                     │
//! │                │                                                        │
//! │                ▼                                                        │
//! │  Response                                                               │
//! │  Set-Cookie: 3f1c…_cart=100%2C3%3B101%2C1; Path=/;                      │
//! │              Expires=Thu, 22 Oct 2026 10:00:00 GMT                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rules
//! - Values are form-url-encoded
//! - Every write pushes the expiry to `now + max_age` (7 days by default)
//! - Deletion is a `Set-Cookie` with an empty value and an expiry in the past
//! - An encoded cookie longer than [`COOKIE_SIZE_LIMIT`] is rejected
//! - An expired cookie reads as absent

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use url::form_urlencoded;

use crate::adapter::PersistenceAdapter;
use crate::error::{PersistenceError, PersistenceResult};

/// Largest `name=value` a browser is guaranteed to keep.
pub const COOKIE_SIZE_LIMIT: usize = 4096;

/// Path scope of cart cookies.
pub const DEFAULT_COOKIE_PATH: &str = "/";

/// Lifetime of a cart cookie after its last write.
pub const DEFAULT_COOKIE_MAX_AGE_DAYS: i64 = 7;

const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

// =============================================================================
// Cookie
// =============================================================================

/// One cookie, with its value already decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub path: String,
    /// `None` for cookies parsed from a request header.
    pub expires: Option<DateTime<Utc>>,
}

impl Cookie {
    /// Returns true if the cookie has expired at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires.is_some_and(|expires| expires <= now)
    }

    /// The form-url-encoded value.
    pub fn encoded_value(&self) -> String {
        form_urlencoded::byte_serialize(self.value.as_bytes()).collect()
    }

    /// Size of the `name=value` pair as sent by the browser.
    pub fn encoded_len(&self) -> usize {
        self.name.len() + 1 + self.encoded_value().len()
    }

    /// Renders the `Set-Cookie` header value.
    pub fn to_set_cookie_header(&self) -> String {
        let mut header = format!("{}={}; Path={}", self.name, self.encoded_value(), self.path);
        if let Some(expires) = self.expires {
            header.push_str("; Expires=");
            header.push_str(&expires.format(HTTP_DATE_FORMAT).to_string());
        }
        header
    }
}

fn decode_value(raw: &str) -> String {
    // The encoded value never contains '=' or '&', so it parses as one key.
    form_urlencoded::parse(raw.as_bytes())
        .next()
        .map(|(key, _)| key.into_owned())
        .unwrap_or_default()
}

fn validate_cookie_name(name: &str) -> PersistenceResult<()> {
    let valid = !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_graphic() && !b"()<>@,;:\\\"/[]?={}".contains(&b));
    if valid {
        Ok(())
    } else {
        Err(PersistenceError::InvalidSlot {
            slot: name.to_string(),
            reason: "not a valid cookie name".to_string(),
        })
    }
}

// =============================================================================
// Cookie Jar
// =============================================================================

/// Cookies received with the request plus the `Set-Cookie` headers owed
/// in the response.
#[derive(Debug, Clone)]
pub struct CookieJar {
    cookies: HashMap<String, Cookie>,
    pending: Vec<Cookie>,
    path: String,
    max_age: Duration,
    fixed_now: Option<DateTime<Utc>>,
}

impl Default for CookieJar {
    fn default() -> Self {
        CookieJar::new(DEFAULT_COOKIE_PATH, DEFAULT_COOKIE_MAX_AGE_DAYS)
    }
}

impl CookieJar {
    /// Creates an empty jar writing cookies scoped to `path`.
    pub fn new(path: impl Into<String>, max_age_days: i64) -> Self {
        CookieJar {
            cookies: HashMap::new(),
            pending: Vec::new(),
            path: path.into(),
            max_age: Duration::days(max_age_days),
            fixed_now: None,
        }
    }

    /// Parses a request `Cookie:` header (`a=1; b=2`).
    ///
    /// Pairs without `=` are ignored.
    pub fn from_request_header(header: &str, path: impl Into<String>, max_age_days: i64) -> Self {
        let mut jar = CookieJar::new(path, max_age_days);
        for pair in header.split(';') {
            let Some((name, value)) = pair.trim().split_once('=') else {
                continue;
            };
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            jar.cookies.insert(
                name.to_string(),
                Cookie {
                    name: name.to_string(),
                    value: decode_value(value.trim()),
                    path: jar.path.clone(),
                    expires: None,
                },
            );
        }
        jar
    }

    /// Pins the clock, for deterministic expiry.
    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.fixed_now = Some(now);
        self
    }

    fn now(&self) -> DateTime<Utc> {
        self.fixed_now.unwrap_or_else(Utc::now)
    }

    /// Adds a cookie as if it had been received.
    pub fn insert(&mut self, cookie: Cookie) {
        self.cookies.insert(cookie.name.clone(), cookie);
    }

    /// Returns a live cookie by name.
    pub fn get(&self, name: &str) -> Option<&Cookie> {
        let now = self.now();
        self.cookies.get(name).filter(|c| !c.is_expired_at(now))
    }

    /// Cookies to send back, in write order (last write per name).
    pub fn pending(&self) -> &[Cookie] {
        &self.pending
    }

    /// `Set-Cookie` header values for the response.
    pub fn set_cookie_headers(&self) -> Vec<String> {
        self.pending.iter().map(Cookie::to_set_cookie_header).collect()
    }

    /// Builds a cookie for `slot`, rejecting bad names and oversize values.
    fn build_cookie(&self, slot: &str, payload: &str) -> PersistenceResult<Cookie> {
        validate_cookie_name(slot)?;

        let cookie = Cookie {
            name: slot.to_string(),
            value: payload.to_string(),
            path: self.path.clone(),
            expires: Some(self.now() + self.max_age),
        };

        let size = cookie.encoded_len();
        if size > COOKIE_SIZE_LIMIT {
            return Err(PersistenceError::CookieTooLarge {
                name: slot.to_string(),
                size,
                limit: COOKIE_SIZE_LIMIT,
            });
        }
        Ok(cookie)
    }

    fn queue(&mut self, cookie: Cookie) {
        self.pending.retain(|c| c.name != cookie.name);
        self.pending.push(cookie);
    }
}

impl PersistenceAdapter for CookieJar {
    fn read_raw(&self, slot: &str) -> PersistenceResult<Option<String>> {
        Ok(self.get(slot).map(|cookie| cookie.value.clone()))
    }

    fn write_raw(&mut self, slot: &str, payload: &str) -> PersistenceResult<()> {
        self.write_many(&[(slot, payload)])
    }

    /// Nothing is queued unless every cookie fits.
    fn write_many(&mut self, writes: &[(&str, &str)]) -> PersistenceResult<()> {
        let cookies = writes
            .iter()
            .map(|(slot, payload)| self.build_cookie(slot, payload))
            .collect::<PersistenceResult<Vec<_>>>()?;

        for cookie in cookies {
            self.cookies.insert(cookie.name.clone(), cookie.clone());
            self.queue(cookie);
        }
        Ok(())
    }

    fn delete_raw(&mut self, slot: &str) -> PersistenceResult<()> {
        validate_cookie_name(slot)?;

        self.cookies.remove(slot);
        self.queue(Cookie {
            name: slot.to_string(),
            value: String::new(),
            path: self.path.clone(),
            expires: DateTime::from_timestamp(0, 0),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_write_renders_set_cookie() {
        let mut jar = CookieJar::default().with_now(noon());
        jar.write_raw("abc_cart", "100,2;101,1").unwrap();

        assert_eq!(
            jar.set_cookie_headers(),
            vec!["abc_cart=100%2C2%3B101%2C1; Path=/; Expires=Thu, 22 Oct 2026 12:00:00 GMT"]
        );
        assert_eq!(jar.read_raw("abc_cart").unwrap().as_deref(), Some("100,2;101,1"));
    }

    #[test]
    fn test_request_header_decoding() {
        let jar = CookieJar::from_request_header(
            "theme=dark; abc_cart=100%2C2%3B101%2C1; junk; abc_cart_attributes=100%2Ccolor%2Cgold+leaf",
            "/",
            7,
        );

        assert_eq!(jar.read_raw("abc_cart").unwrap().as_deref(), Some("100,2;101,1"));
        assert_eq!(
            jar.read_raw("abc_cart_attributes").unwrap().as_deref(),
            Some("100,color,gold leaf")
        );
        assert_eq!(jar.read_raw("junk").unwrap(), None);
        assert!(jar.pending().is_empty());
    }

    #[test]
    fn test_header_round_trip() {
        let payload = r#"{"100":[{"id":"100","quantity":1,"attributes":{"note":"a&b=c"}}]}"#;
        let mut jar = CookieJar::default();
        jar.write_raw("abc_cart", payload).unwrap();

        let header = jar.set_cookie_headers().remove(0);
        let pair = header.split(';').next().unwrap();
        let next_request = CookieJar::from_request_header(pair, "/", 7);
        assert_eq!(next_request.read_raw("abc_cart").unwrap().as_deref(), Some(payload));
    }

    #[test]
    fn test_expired_cookie_reads_absent() {
        let mut jar = CookieJar::default().with_now(noon());
        jar.insert(Cookie {
            name: "abc_cart".to_string(),
            value: "100,1".to_string(),
            path: "/".to_string(),
            expires: Some(noon() - Duration::days(1)),
        });
        assert_eq!(jar.read_raw("abc_cart").unwrap(), None);

        jar.insert(Cookie {
            name: "abc_cart".to_string(),
            value: "100,1".to_string(),
            path: "/".to_string(),
            expires: Some(noon() + Duration::days(6)),
        });
        assert_eq!(jar.read_raw("abc_cart").unwrap().as_deref(), Some("100,1"));
    }

    #[test]
    fn test_delete_queues_expired_cookie() {
        let mut jar = CookieJar::from_request_header("abc_cart=100%2C1", "/", 7);
        jar.delete_raw("abc_cart").unwrap();

        assert_eq!(jar.read_raw("abc_cart").unwrap(), None);
        assert_eq!(
            jar.set_cookie_headers(),
            vec!["abc_cart=; Path=/; Expires=Thu, 01 Jan 1970 00:00:00 GMT"]
        );
    }

    #[test]
    fn test_last_write_per_name_is_sent() {
        let mut jar = CookieJar::default();
        jar.write_raw("a", "1").unwrap();
        jar.write_raw("b", "1").unwrap();
        jar.write_raw("a", "2").unwrap();

        let names: Vec<&str> = jar.pending().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(jar.pending()[1].value, "2");
    }

    #[test]
    fn test_oversize_cookie_rejected() {
        let mut jar = CookieJar::default();
        let payload = "1".repeat(COOKIE_SIZE_LIMIT);

        let err = jar.write_raw("abc_cart", &payload).unwrap_err();
        assert!(matches!(err, PersistenceError::CookieTooLarge { limit: 4096, .. }));
        assert_eq!(jar.read_raw("abc_cart").unwrap(), None);
        assert!(jar.pending().is_empty());
    }

    #[test]
    fn test_write_many_is_all_or_nothing() {
        let mut jar = CookieJar::from_request_header("abc_cart=100%2C1", "/", 7);
        let oversize = "1".repeat(COOKIE_SIZE_LIMIT);

        let err = jar
            .write_many(&[("abc_cart", "100,1;200,1"), ("abc_cart_attributes", oversize.as_str())])
            .unwrap_err();
        assert!(matches!(err, PersistenceError::CookieTooLarge { .. }));
        assert!(jar.pending().is_empty());
        assert_eq!(jar.read_raw("abc_cart").unwrap().as_deref(), Some("100,1"));

        jar.write_many(&[("abc_cart", "100,2"), ("abc_cart_attributes", "")])
            .unwrap();
        assert_eq!(jar.pending().len(), 2);
    }

    #[test]
    fn test_invalid_cookie_name() {
        let mut jar = CookieJar::default();
        assert!(matches!(
            jar.write_raw("bad name", "1"),
            Err(PersistenceError::InvalidSlot { .. })
        ));
        assert!(jar.write_raw("", "1").is_err());
    }
}

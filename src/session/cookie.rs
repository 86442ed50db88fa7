//! Cookie codec
//!
//! Parses `Cookie` request headers, generates session identifiers and
//! serializes `Set-Cookie` directives.

use std::collections::HashMap;
use std::fmt;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use rand::RngCore;
use uuid::Uuid;

/// Characters escaped by `encodeURIComponent`: everything except
/// `A-Z a-z 0-9 - _ . ! ~ * ' ( )`
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Default cookie lifetime: 30 days
pub const DEFAULT_MAX_AGE: u64 = 30 * 24 * 60 * 60;

/// `SameSite` cookie policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(not(test), allow(dead_code))]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl fmt::Display for SameSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strict => write!(f, "Strict"),
            Self::Lax => write!(f, "Lax"),
            Self::None => write!(f, "None"),
        }
    }
}

/// Attributes appended to a `Set-Cookie` value
///
/// `max_age: None` omits the clause; `Some(0)` asks the browser to drop the
/// cookie immediately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieOptions {
    pub max_age: Option<u64>,
    pub http_only: bool,
    pub secure: bool,
    pub same_site: Option<SameSite>,
    pub path: Option<String>,
}

impl Default for CookieOptions {
    fn default() -> Self {
        Self {
            max_age: Some(DEFAULT_MAX_AGE),
            http_only: true,
            secure: true,
            same_site: Some(SameSite::Lax),
            path: Some("/".to_string()),
        }
    }
}

/// Parse a `Cookie` header into name/value pairs
///
/// Pairs without a name or without a value are skipped. Values are
/// percent-decoded; a value that does not decode to UTF-8 is kept as sent.
pub fn parse_cookies(header: Option<&str>) -> HashMap<String, String> {
    let mut cookies = HashMap::new();
    let Some(header) = header else {
        return cookies;
    };

    for pair in header.split(';') {
        let Some((key, value)) = pair.trim().split_once('=') else {
            continue;
        };
        if key.is_empty() || value.is_empty() {
            continue;
        }
        let decoded = percent_decode_str(value)
            .decode_utf8()
            .map_or_else(|_| value.to_string(), |v| v.into_owned());
        cookies.insert(key.to_string(), decoded);
    }

    cookies
}

/// Generate a random version-4 UUID string
pub fn generate_session_id() -> String {
    let mut bytes = [0u8; 16];
    rand::rng().fill_bytes(&mut bytes);

    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;

    Uuid::from_bytes(bytes).hyphenated().to_string()
}

/// Build a `Set-Cookie` header value
///
/// Clause order is fixed: Max-Age, HttpOnly, Secure, SameSite, Path.
pub fn create_set_cookie_header(name: &str, value: &str, options: &CookieOptions) -> String {
    let mut cookie = format!("{name}={}", utf8_percent_encode(value, COMPONENT));

    if let Some(max_age) = options.max_age {
        cookie.push_str(&format!("; Max-Age={max_age}"));
    }
    if options.http_only {
        cookie.push_str("; HttpOnly");
    }
    if options.secure {
        cookie.push_str("; Secure");
    }
    if let Some(same_site) = options.same_site {
        cookie.push_str(&format!("; SameSite={same_site}"));
    }
    if let Some(path) = options.path.as_deref().filter(|p| !p.is_empty()) {
        cookie.push_str(&format!("; Path={path}"));
    }

    cookie
}

//! Session resolution from request cookies

use hyper::header::{HeaderMap, COOKIE};

use super::cookie::{create_set_cookie_header, generate_session_id, parse_cookies, CookieOptions};

/// Cookie carrying the session identifier
pub const SESSION_COOKIE: &str = "session_id";

/// Result of resolving the caller's session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    pub session_id: String,
    pub is_new: bool,
}

impl SessionInfo {
    /// `Set-Cookie` value to send back, only for freshly issued sessions
    pub fn set_cookie_header(&self) -> Option<String> {
        self.is_new.then(|| {
            create_set_cookie_header(SESSION_COOKIE, &self.session_id, &CookieOptions::default())
        })
    }
}

/// Return the session from the `session_id` cookie, or issue a new one
///
/// A presented cookie is trusted as-is; there is no server-side session
/// record to check it against.
pub fn get_or_create_session(headers: &HeaderMap) -> SessionInfo {
    // Multiple Cookie headers are joined the way HTTP/2 splits them.
    // Non-ASCII bytes in an unrelated cookie must not hide session_id.
    let joined = headers
        .get_all(COOKIE)
        .iter()
        .map(|v| String::from_utf8_lossy(v.as_bytes()))
        .collect::<Vec<_>>()
        .join("; ");
    let mut cookies = parse_cookies(Some(&joined));

    match cookies.remove(SESSION_COOKIE) {
        Some(session_id) => SessionInfo {
            session_id,
            is_new: false,
        },
        None => SessionInfo {
            session_id: generate_session_id(),
            is_new: true,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::header::HeaderValue;
    use std::collections::HashSet;

    fn headers_with_cookie(cookie: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(cookie).unwrap());
        headers
    }

    #[test]
    fn test_existing_session_is_stable() {
        let headers = headers_with_cookie("theme=dark; session_id=known-id");
        let first = get_or_create_session(&headers);
        let second = get_or_create_session(&headers);

        assert_eq!(first.session_id, "known-id");
        assert!(!first.is_new);
        assert_eq!(first, second);
        assert!(first.set_cookie_header().is_none());
    }

    #[test]
    fn test_missing_cookie_creates_session() {
        let info = get_or_create_session(&HeaderMap::new());
        assert!(info.is_new);
        assert_eq!(info.session_id.len(), 36);

        let cookie = info.set_cookie_header().unwrap();
        assert!(cookie.starts_with(&format!("session_id={}; Max-Age=2592000", info.session_id)));
    }

    #[test]
    fn test_empty_cookie_value_creates_session() {
        let info = get_or_create_session(&headers_with_cookie("session_id="));
        assert!(info.is_new);
    }

    #[test]
    fn test_new_sessions_are_fresh() {
        let seen: HashSet<String> = (0..200)
            .map(|_| get_or_create_session(&HeaderMap::new()).session_id)
            .collect();
        assert_eq!(seen.len(), 200);
    }

    #[test]
    fn test_multiple_cookie_headers() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("a=1"));
        headers.append(COOKIE, HeaderValue::from_static("session_id=split"));
        let info = get_or_create_session(&headers);
        assert_eq!(info.session_id, "split");
        assert!(!info.is_new);
    }

    #[test]
    fn test_non_ascii_cookie_keeps_session() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_bytes("session_id=known; name=Jürgen".as_bytes()).unwrap(),
        );
        let info = get_or_create_session(&headers);
        assert_eq!(info.session_id, "known");
        assert!(!info.is_new);
        assert!(info.set_cookie_header().is_none());
    }
}

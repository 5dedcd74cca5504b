//! Session credentials carried by an inbound request, and the cookie
//! mutations produced while verifying them.
//!
//! The session cookie may hold a raw access token, a JSON session object
//! (`{"access_token": .., "refresh_token": ..}`), a JSON `[access, refresh]`
//! pair, or any of those base64url-encoded behind a `base64-` prefix. Large
//! sessions are split across `name.0`, `name.1`, ... chunks.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use http::HeaderMap;
use http::header::{AUTHORIZATION, HeaderValue};
use serde::{Deserialize, Serialize};

/// Prefix marking a base64url-encoded cookie value.
const BASE64_PREFIX: &str = "base64-";

/// Upper bound on session cookie chunks read from a request.
const MAX_CHUNKS: usize = 16;

/// Where the credentials were found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    /// No credentials on the request.
    None,
    /// The session cookie.
    Cookie,
    /// An `Authorization: Bearer` header.
    BearerHeader,
}

/// Credential material extracted from one request.
#[derive(Debug, Clone)]
pub struct SessionCredentials {
    access_token: Option<String>,
    refresh_token: Option<String>,
    source: CredentialSource,
    cookie_name: String,
    /// Number of `name.N` chunk cookies the session was read from.
    chunks: usize,
}

/// Serialized session stored in the cookie.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSession {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
}

impl SessionCredentials {
    /// Credentials for a request that carried nothing.
    pub fn none(cookie_name: impl Into<String>) -> Self {
        Self {
            access_token: None,
            refresh_token: None,
            source: CredentialSource::None,
            cookie_name: cookie_name.into(),
            chunks: 0,
        }
    }

    /// Credentials from a bearer token.
    pub fn bearer(token: impl Into<String>, cookie_name: impl Into<String>) -> Self {
        Self {
            access_token: Some(token.into()),
            refresh_token: None,
            source: CredentialSource::BearerHeader,
            cookie_name: cookie_name.into(),
            chunks: 0,
        }
    }

    /// Extracts credentials from request headers.
    ///
    /// The session cookie wins over an `Authorization` header.
    pub fn from_headers(headers: &HeaderMap, cookie_name: &str) -> Self {
        let jar = CookieJar::from_headers(headers);

        if let Some((raw, chunks)) = read_cookie(&jar, cookie_name) {
            let mut creds = Self::from_cookie_value(&raw, cookie_name);
            if creds.access_token.is_some() {
                creds.source = CredentialSource::Cookie;
                creds.chunks = chunks;
                return creds;
            }
        }

        let bearer = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty());

        match bearer {
            Some(token) => Self::bearer(token, cookie_name),
            None => Self::none(cookie_name),
        }
    }

    /// Parses a session cookie value.
    pub fn from_cookie_value(raw: &str, cookie_name: &str) -> Self {
        let mut creds = Self::none(cookie_name);
        let value = decode_cookie_value(raw);
        let value = value.trim();
        if value.is_empty() {
            return creds;
        }

        if value.starts_with('{') {
            if let Ok(session) = serde_json::from_str::<StoredSession>(value) {
                creds.access_token = Some(session.access_token);
                creds.refresh_token = session.refresh_token;
            }
        } else if value.starts_with('[') {
            if let Ok(pair) = serde_json::from_str::<Vec<Option<String>>>(value) {
                let mut it = pair.into_iter();
                creds.access_token = it.next().flatten();
                creds.refresh_token = it.next().flatten();
            }
        } else {
            creds.access_token = Some(value.to_string());
        }

        creds.access_token = creds.access_token.filter(|t| !t.is_empty());
        if creds.access_token.is_some() {
            creds.source = CredentialSource::Cookie;
        }
        creds
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    pub fn source(&self) -> CredentialSource {
        self.source
    }

    /// Name of the session cookie these credentials were read with.
    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Chunk cookies (`name.0` ..) the session was reassembled from; `0`
    /// for an unchunked cookie or a bearer header.
    pub fn chunk_count(&self) -> usize {
        self.chunks
    }

    /// Whether the request carried any usable credential.
    pub fn is_present(&self) -> bool {
        self.access_token.is_some()
    }
}

/// Cookie mutations that must be written to whatever response is produced.
#[derive(Debug, Clone, Default)]
pub struct PendingCookies {
    cookies: Vec<Cookie<'static>>,
}

impl PendingCookies {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a refreshed session under `name`.
    pub fn set_session(&mut self, name: &str, session: &StoredSession, secure: bool) {
        let encoded = match serde_json::to_vec(session) {
            Ok(bytes) => format!("{BASE64_PREFIX}{}", URL_SAFE_NO_PAD.encode(bytes)),
            Err(_) => return,
        };
        let cookie = Cookie::build((name.to_string(), encoded))
            .path("/")
            .http_only(true)
            .secure(secure)
            .same_site(SameSite::Lax)
            .build();
        self.push(cookie);
    }

    /// Clears the session stored under `name`.
    pub fn clear_session(&mut self, name: &str) {
        let mut cookie = Cookie::new(name.to_string(), "");
        cookie.set_path("/");
        cookie.make_removal();
        self.push(cookie);
    }

    /// Expires the `name.0` .. `name.{count - 1}` chunk cookies.
    pub fn clear_chunks(&mut self, name: &str, count: usize) {
        for index in 0..count {
            self.clear_session(&format!("{name}.{index}"));
        }
    }

    /// Clears every cookie `credentials` were read from.
    pub fn clear_credentials(&mut self, credentials: &SessionCredentials) {
        self.clear_session(credentials.cookie_name());
        self.clear_chunks(credentials.cookie_name(), credentials.chunk_count());
    }

    /// Adds a cookie, replacing an earlier mutation of the same name.
    pub fn push(&mut self, cookie: Cookie<'static>) {
        self.cookies.retain(|c| c.name() != cookie.name());
        self.cookies.push(cookie);
    }

    /// Moves every mutation of `other` into `self`; later mutations win.
    pub fn merge(&mut self, other: PendingCookies) {
        for cookie in other.cookies {
            self.push(cookie);
        }
    }

    /// Credentials carried by a session cookie set during verification,
    /// i.e. the refreshed session. `None` when no session was written or it
    /// was cleared.
    pub fn refreshed_session(&self, name: &str) -> Option<SessionCredentials> {
        self.cookies
            .iter()
            .find(|c| c.name() == name && !c.value().is_empty())
            .map(|c| SessionCredentials::from_cookie_value(c.value(), name))
            .filter(SessionCredentials::is_present)
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cookie<'static>> {
        self.cookies.iter()
    }

    /// Renders every pending cookie as a `Set-Cookie` header value.
    pub fn header_values(&self) -> Vec<HeaderValue> {
        self.cookies
            .iter()
            .filter_map(|c| HeaderValue::from_str(&c.to_string()).ok())
            .collect()
    }
}

/// Reads the session cookie, reassembling `name.N` chunks when the
/// unchunked cookie is absent. Returns the value and the chunk count.
fn read_cookie(jar: &CookieJar, name: &str) -> Option<(String, usize)> {
    if let Some(cookie) = jar.get(name) {
        return Some((cookie.value().to_string(), 0));
    }

    let mut combined = String::new();
    let mut chunks = 0;
    for index in 0..MAX_CHUNKS {
        match jar.get(&format!("{name}.{index}")) {
            Some(chunk) => {
                combined.push_str(chunk.value());
                chunks += 1;
            }
            None => break,
        }
    }

    (!combined.is_empty()).then_some((combined, chunks))
}

fn decode_cookie_value(raw: &str) -> String {
    let raw = raw.trim();

    if let Some(encoded) = raw.strip_prefix(BASE64_PREFIX) {
        let bytes = URL_SAFE_NO_PAD
            .decode(encoded.trim_end_matches('='))
            .or_else(|_| STANDARD.decode(encoded));
        return bytes
            .ok()
            .and_then(|b| String::from_utf8(b).ok())
            .unwrap_or_default();
    }

    if raw.starts_with("%7B") || raw.starts_with("%5B") {
        if let Ok(decoded) = urlencoding::decode(raw) {
            return decoded.into_owned();
        }
    }

    raw.to_string()
}

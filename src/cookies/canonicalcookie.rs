use crate::base::storeerror::StoreError;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use time::OffsetDateTime;
use url::Url;

/// Process-wide creation counter. Every constructed cookie takes the next
/// value, so sorting by it reproduces construction order.
static NEXT_CREATION_INDEX: AtomicU64 = AtomicU64::new(1);

fn next_creation_index() -> u64 {
    NEXT_CREATION_INDEX.fetch_add(1, Ordering::Relaxed)
}

/// Represents a cookie.
/// Modeled after Chromium's `net::CanonicalCookie`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalCookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    pub path: String,
    pub creation_time: OffsetDateTime,
    pub expiration_time: Option<OffsetDateTime>,
    pub last_access_time: OffsetDateTime,
    pub secure: bool,
    pub http_only: bool,
    pub host_only: bool,
    pub same_site: SameSite,
    pub priority: CookiePriority,
    pub creation_index: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SameSite {
    Unspecified,
    NoRestriction,
    Lax,
    Strict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CookiePriority {
    Low,
    Medium,
    High,
}

/// JSON shape of a cookie as stored in a hash field.
///
/// Timestamps are unix milliseconds.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
struct CookieRecord {
    key: String,
    value: String,
    domain: String,
    path: String,
    creation: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expires: Option<i64>,
    last_accessed: i64,
    #[serde(default)]
    secure: bool,
    #[serde(default)]
    http_only: bool,
    #[serde(default)]
    host_only: bool,
    same_site: SameSite,
    priority: CookiePriority,
    creation_index: u64,
}

fn to_unix_millis(t: OffsetDateTime) -> i64 {
    (t.unix_timestamp_nanos() / 1_000_000) as i64
}

fn from_unix_millis(ms: i64) -> Result<OffsetDateTime, StoreError> {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(ms) * 1_000_000)
        .map_err(|e| StoreError::invalid_cookie_data(e.to_string()))
}

impl CanonicalCookie {
    pub fn new(
        name: String,
        value: String,
        domain: String,
        path: String,
        creation_time: OffsetDateTime,
        expiration_time: Option<OffsetDateTime>,
    ) -> Self {
        Self {
            name,
            value,
            domain,
            path,
            creation_time,
            expiration_time,
            last_access_time: creation_time,
            secure: false,
            http_only: false,
            host_only: true,
            same_site: SameSite::Unspecified,
            priority: CookiePriority::Medium,
            creation_index: next_creation_index(),
        }
    }

    /// Serialize into the JSON record stored as a hash field value.
    pub fn to_json(&self) -> Result<String, StoreError> {
        let record = CookieRecord {
            key: self.name.clone(),
            value: self.value.clone(),
            domain: self.domain.clone(),
            path: self.path.clone(),
            creation: to_unix_millis(self.creation_time),
            expires: self.expiration_time.map(to_unix_millis),
            last_accessed: to_unix_millis(self.last_access_time),
            secure: self.secure,
            http_only: self.http_only,
            host_only: self.host_only,
            same_site: self.same_site,
            priority: self.priority,
            creation_index: self.creation_index,
        };
        Ok(serde_json::to_string(&record)?)
    }

    /// Rebuild a cookie from its stored JSON record.
    ///
    /// The stored creation index is kept, so ordering survives a round trip
    /// through the store.
    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        let record: CookieRecord = serde_json::from_str(json)?;
        Ok(Self {
            name: record.key,
            value: record.value,
            domain: record.domain,
            path: record.path,
            creation_time: from_unix_millis(record.creation)?,
            expiration_time: record.expires.map(from_unix_millis).transpose()?,
            last_access_time: from_unix_millis(record.last_accessed)?,
            secure: record.secure,
            http_only: record.http_only,
            host_only: record.host_only,
            same_site: record.same_site,
            priority: record.priority,
            creation_index: record.creation_index,
        })
    }

    /// Parse a `Set-Cookie` header value received from `url`.
    ///
    /// Explicit domains are validated against the Public Suffix List and the
    /// request host; a missing `Path` falls back to the default path of the
    /// request URL (RFC 6265 5.1.4). `Max-Age` wins over `Expires`.
    pub fn from_set_cookie(url: &Url, cookie_line: &str) -> Result<Self, StoreError> {
        use crate::cookies::psl::{is_public_suffix, is_valid_cookie_domain};

        let parsed = cookie::Cookie::parse(cookie_line)
            .map_err(|e| StoreError::cookie_parse(e.to_string()))?;
        let host = url.host_str().unwrap_or("").to_lowercase();
        let now = OffsetDateTime::now_utc();

        let (domain, host_only) = match parsed.domain() {
            Some(d) if !d.is_empty() => {
                let d = d.trim_start_matches('.').to_lowercase();
                if is_public_suffix(&d) {
                    return Err(StoreError::CookiePublicSuffix);
                }
                if !is_valid_cookie_domain(&d, &host) {
                    return Err(StoreError::CookieDomainMismatch { domain: d, host });
                }
                (d, false)
            }
            _ => (host, true),
        };

        let path = match parsed.path() {
            Some(p) if p.starts_with('/') => p.to_string(),
            _ => default_path(url.path()),
        };

        let expiration_time = match parsed.max_age() {
            Some(max_age) => Some(now + max_age),
            None => parsed.expires().and_then(|e| e.datetime()),
        };

        let same_site = match parsed.same_site() {
            Some(cookie::SameSite::Lax) => SameSite::Lax,
            Some(cookie::SameSite::Strict) => SameSite::Strict,
            Some(cookie::SameSite::None) => SameSite::NoRestriction,
            None => SameSite::Unspecified,
        };

        let mut c = CanonicalCookie::new(
            parsed.name().to_string(),
            parsed.value().to_string(),
            domain,
            path,
            now,
            expiration_time,
        );
        c.secure = parsed.secure().unwrap_or(false);
        c.http_only = parsed.http_only().unwrap_or(false);
        c.host_only = host_only;
        c.same_site = same_site;

        c.validate_prefix(url.scheme() == "https")?;
        Ok(c)
    }

    /// Validate __Secure- and __Host- cookie prefixes per RFC 6265bis.
    /// - __Secure- cookies MUST have the Secure attribute
    /// - __Host- cookies MUST have Secure, Path="/", and no Domain attribute
    pub fn validate_prefix(&self, secure_origin: bool) -> Result<(), StoreError> {
        if self.name.starts_with("__Secure-") && (!self.secure || !secure_origin) {
            return Err(StoreError::CookieInvalidPrefix);
        }

        if self.name.starts_with("__Host-")
            && (!self.secure || self.path != "/" || !self.host_only || !secure_origin)
        {
            return Err(StoreError::CookieInvalidPrefix);
        }

        Ok(())
    }
}

/// RFC 6265 5.1.4 default-path of a request path.
pub fn default_path(request_path: &str) -> String {
    if !request_path.starts_with('/') {
        return "/".to_string();
    }
    match request_path.rfind('/') {
        Some(0) | None => "/".to_string(),
        Some(idx) => request_path[..idx].to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_cookie(name: &str) -> CanonicalCookie {
        CanonicalCookie::new(
            name.to_string(),
            "v".to_string(),
            "example.com".to_string(),
            "/".to_string(),
            OffsetDateTime::now_utc(),
            None,
        )
    }

    #[test]
    fn test_creation_index_is_monotonic() {
        let a = make_cookie("a");
        let b = make_cookie("b");
        assert!(b.creation_index > a.creation_index);
    }

    #[test]
    fn test_json_roundtrip_keeps_identity_fields() {
        let mut c = make_cookie("session");
        c.secure = true;
        c.same_site = SameSite::Strict;
        c.expiration_time = Some(c.creation_time + time::Duration::days(1));

        let json = c.to_json().unwrap();
        let back = CanonicalCookie::from_json(&json).unwrap();

        assert_eq!(back.name, "session");
        assert_eq!(back.domain, "example.com");
        assert_eq!(back.creation_index, c.creation_index);
        assert_eq!(back.same_site, SameSite::Strict);
        assert!(back.secure);
        assert!(back.expiration_time.is_some());
        assert_eq!(back.to_json().unwrap(), json);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        let err = CanonicalCookie::from_json("not a cookie").unwrap_err();
        assert!(matches!(err, StoreError::InvalidCookieData { .. }));
    }

    #[test]
    fn test_default_path() {
        assert_eq!(default_path(""), "/");
        assert_eq!(default_path("/"), "/");
        assert_eq!(default_path("/foo"), "/");
        assert_eq!(default_path("/foo/bar"), "/foo");
        assert_eq!(default_path("/foo/bar/"), "/foo/bar");
    }

    #[test]
    fn test_from_set_cookie_host_only() {
        let url = Url::parse("https://www.example.com/account/login").unwrap();
        let c = CanonicalCookie::from_set_cookie(&url, "sid=abc; HttpOnly").unwrap();
        assert_eq!(c.domain, "www.example.com");
        assert!(c.host_only);
        assert!(c.http_only);
        assert_eq!(c.path, "/account");
    }

    #[test]
    fn test_from_set_cookie_domain_attribute() {
        let url = Url::parse("https://www.example.com/").unwrap();
        let c = CanonicalCookie::from_set_cookie(&url, "a=b; Domain=.Example.com; Path=/x")
            .unwrap();
        assert_eq!(c.domain, "example.com");
        assert!(!c.host_only);
        assert_eq!(c.path, "/x");
    }

    #[test]
    fn test_from_set_cookie_rejects_public_suffix() {
        let url = Url::parse("https://www.example.com/").unwrap();
        let err = CanonicalCookie::from_set_cookie(&url, "a=b; Domain=com").unwrap_err();
        assert_eq!(err, StoreError::CookiePublicSuffix);
    }

    #[test]
    fn test_from_set_cookie_rejects_foreign_domain() {
        let url = Url::parse("https://www.example.com/").unwrap();
        let err = CanonicalCookie::from_set_cookie(&url, "a=b; Domain=other.com").unwrap_err();
        assert!(matches!(err, StoreError::CookieDomainMismatch { .. }));
    }

    #[test]
    fn test_from_set_cookie_max_age_wins() {
        let url = Url::parse("https://example.com/").unwrap();
        let c = CanonicalCookie::from_set_cookie(
            &url,
            "a=b; Max-Age=60; Expires=Wed, 21 Oct 2015 07:28:00 GMT",
        )
        .unwrap();
        let expiry = c.expiration_time.unwrap();
        assert!(expiry > OffsetDateTime::now_utc());
    }

    #[test]
    fn test_host_prefix_requires_secure_origin() {
        let url = Url::parse("http://example.com/").unwrap();
        let err = CanonicalCookie::from_set_cookie(&url, "__Host-id=1; Secure; Path=/").unwrap_err();
        assert_eq!(err, StoreError::CookieInvalidPrefix);

        let url = Url::parse("https://example.com/").unwrap();
        assert!(CanonicalCookie::from_set_cookie(&url, "__Host-id=1; Secure; Path=/").is_ok());
    }
}

//! Lookup key naming.
//!
//! Layout: `cookie-store:<id>:cookie:<domain>[:<path>]`. Each key addresses
//! one hash whose fields are cookie names. Domains are case-insensitive, so
//! they are lowercased into the key; paths are kept as given.
//!
//! Keys are also matched by `SCAN` patterns. [`key_pattern`] escapes every
//! segment so a host like `[::1]` only matches itself; only a segment that is
//! exactly [`WILDCARD`] stays a glob.

/// Namespace prefix of every key written by the cookie store.
pub const KEY_PREFIX: &str = "cookie-store";

/// Sentinel accepted by the removal API for "any domain" / "any path".
pub const WILDCARD: &str = "*";

/// Builds the lookup key for `domain` and an optional `path`.
///
/// An empty path is treated as absent.
pub fn key_name(id: &str, domain: &str, path: Option<&str>) -> String {
    let domain = domain.to_lowercase();
    match path {
        Some(path) if !path.is_empty() => {
            format!("{}:{}:cookie:{}:{}", KEY_PREFIX, id, domain, path)
        }
        _ => format!("{}:{}:cookie:{}", KEY_PREFIX, id, domain),
    }
}

/// Builds a `SCAN MATCH` pattern for the keys [`key_name`] would produce.
///
/// `domain` and `path` are matched literally unless they are exactly
/// [`WILDCARD`].
pub fn key_pattern(id: &str, domain: &str, path: Option<&str>) -> String {
    let segment = |s: &str| {
        if s == WILDCARD {
            s.to_string()
        } else {
            glob_escape(s)
        }
    };
    let domain = segment(&domain.to_lowercase());
    match path {
        Some(path) if !path.is_empty() => format!(
            "{}:{}:cookie:{}:{}",
            KEY_PREFIX,
            glob_escape(id),
            domain,
            segment(path)
        ),
        _ => format!("{}:{}:cookie:{}", KEY_PREFIX, glob_escape(id), domain),
    }
}

/// Backslash-escapes the glob metacharacters `*?[]\`.
pub fn glob_escape(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

//! Cookie model and matching rules.
//!
//! - [`CanonicalCookie`](canonicalcookie::CanonicalCookie): a single cookie,
//!   its stored JSON record and `Set-Cookie` parsing
//! - [`psl`]: Public Suffix List checks and base-domain computation
//! - [`permute`]: the domains and paths whose cookies are visible to a request
//!
//! # Chromium References
//!
//! - Canonical cookie: `net/cookies/canonical_cookie.cc`
//! - Domain rules: `net/cookies/cookie_util.cc`

pub mod canonicalcookie;
pub mod permute;
pub mod psl;

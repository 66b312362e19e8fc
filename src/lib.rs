//! # kvcookies
//!
//! A cookie store backed by a Redis-style key-value store.
//!
//! `kvcookies` persists browser-style cookies in per-domain, per-path hashes
//! so that many processes can share one cookie jar. A jar drives the
//! [`Store`](store::Store) contract; [`KvCookieStore`](store::KvCookieStore)
//! implements it over any [`KvStore`](kv::KvStore).
//!
//! ## Features
//!
//! - **Hash layout**: `cookie-store:<id>:cookie:<domain>:<path>`, one field per cookie
//! - **Ancestor lookup**: cookies on parent domains and parent paths are found
//!   by scanning each domain/path permutation concurrently
//! - **Bounded enumeration**: `SCAN` loops stop at a configurable time limit
//! - **Cookie model**: `Set-Cookie` parsing with PSL validation
//! - **In-memory backend**: [`MemoryKv`](kv::MemoryKv) with Redis `SCAN`
//!   and glob semantics
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use kvcookies::cookies::canonicalcookie::CanonicalCookie;
//! use kvcookies::kv::MemoryKv;
//! use kvcookies::store::{KvCookieStore, KvCookieStoreConfig};
//! use std::sync::Arc;
//! use url::Url;
//!
//! # async fn run() -> Result<(), kvcookies::base::storeerror::StoreError> {
//! let store = KvCookieStore::open(Arc::new(MemoryKv::new()), KvCookieStoreConfig::new()).await?;
//!
//! let url = Url::parse("https://www.example.com/account").unwrap();
//! let cookie = CanonicalCookie::from_set_cookie(&url, "sid=abc; Domain=example.com; Path=/")?;
//! store.put_cookie(&cookie).await?;
//!
//! let visible = store.find_cookies("www.example.com", "/account", false).await?;
//! assert_eq!(visible.len(), 1);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`base`] - Error definitions
//! - [`cookies`] - Cookie model, PSL rules and lookup permutations
//! - [`kv`] - Key-value store abstraction and the in-memory backend
//! - [`store`] - The cookie store adapter, its configuration and scan loop

pub mod base;
pub mod cookies;
pub mod kv;
pub mod store;

//! Cookie persistence behind a jar-facing store contract.
//!
//! A cookie jar owns the matching and expiry rules; a [`Store`] only keeps
//! cookies and hands them back. [`KvCookieStore`] implements the contract on
//! top of any [`KvStore`](crate::kv::KvStore), and [`CallbackStore`] adapts
//! any store to completion-callback dispatch.
//!
//! | Operation | Key-value commands |
//! |-----------|--------------------|
//! | `find_cookie` | `HGET` |
//! | `find_cookies` | `SCAN` per domain/path permutation, `HGETALL` per key |
//! | `put_cookie` / `update_cookie` | `HSET` |
//! | `remove_cookie` | `HDEL` |
//! | `remove_cookies` | `DEL`, or `SCAN` + `DEL` for the `*` path |
//! | `get_all_cookies` | `SCAN` + `HGETALL` |

pub mod callback;
pub mod config;
pub mod keys;
pub mod kvstore;
pub mod scan;

pub use callback::CallbackStore;
pub use config::KvCookieStoreConfig;
pub use kvstore::KvCookieStore;

use crate::base::storeerror::StoreError;
use crate::cookies::canonicalcookie::CanonicalCookie;
use std::{future::Future, pin::Pin, sync::Arc};

/// Alias for the `Future` type returned by store operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + Send + 'a>>;

/// The persistence contract a cookie jar drives.
///
/// Every operation is asynchronous; `synchronous()` tells the jar whether it
/// may assume in-process immediacy.
pub trait Store: Send + Sync {
    /// Whether operations complete without suspending.
    fn synchronous(&self) -> bool {
        false
    }

    /// The cookie named `key` stored exactly at (`domain`, `path`).
    fn find_cookie<'a>(
        &'a self,
        domain: &'a str,
        path: &'a str,
        key: &'a str,
    ) -> StoreFuture<'a, Option<CanonicalCookie>>;

    /// Every cookie stored at `domain`/`path` or any of their ancestors,
    /// ordered by creation.
    fn find_cookies<'a>(
        &'a self,
        domain: &'a str,
        path: &'a str,
        allow_special_use_domain: bool,
    ) -> StoreFuture<'a, Vec<CanonicalCookie>>;

    /// Stores `cookie`, replacing any cookie with the same domain, path and name.
    fn put_cookie<'a>(&'a self, cookie: &'a CanonicalCookie) -> StoreFuture<'a, ()>;

    /// Replaces `old` with `new`.
    fn update_cookie<'a>(
        &'a self,
        old: &'a CanonicalCookie,
        new: &'a CanonicalCookie,
    ) -> StoreFuture<'a, ()>;

    /// Removes one cookie. Removing a missing cookie succeeds.
    fn remove_cookie<'a>(&'a self, domain: &'a str, path: &'a str, key: &'a str)
        -> StoreFuture<'a, ()>;

    /// Removes every cookie at (`domain`, `path`); `"*"` matches any path.
    fn remove_cookies<'a>(&'a self, domain: &'a str, path: &'a str) -> StoreFuture<'a, ()>;

    /// Removes every cookie in the store.
    fn remove_all_cookies(&self) -> StoreFuture<'_, ()>;

    /// Every stored cookie, ordered by creation.
    fn get_all_cookies(&self) -> StoreFuture<'_, Vec<CanonicalCookie>>;
}

/// Blanket implementation for Arc-wrapped stores.
impl<S: Store + ?Sized> Store for Arc<S> {
    fn synchronous(&self) -> bool {
        (**self).synchronous()
    }

    fn find_cookie<'a>(
        &'a self,
        domain: &'a str,
        path: &'a str,
        key: &'a str,
    ) -> StoreFuture<'a, Option<CanonicalCookie>> {
        (**self).find_cookie(domain, path, key)
    }

    fn find_cookies<'a>(
        &'a self,
        domain: &'a str,
        path: &'a str,
        allow_special_use_domain: bool,
    ) -> StoreFuture<'a, Vec<CanonicalCookie>> {
        (**self).find_cookies(domain, path, allow_special_use_domain)
    }

    fn put_cookie<'a>(&'a self, cookie: &'a CanonicalCookie) -> StoreFuture<'a, ()> {
        (**self).put_cookie(cookie)
    }

    fn update_cookie<'a>(
        &'a self,
        old: &'a CanonicalCookie,
        new: &'a CanonicalCookie,
    ) -> StoreFuture<'a, ()> {
        (**self).update_cookie(old, new)
    }

    fn remove_cookie<'a>(
        &'a self,
        domain: &'a str,
        path: &'a str,
        key: &'a str,
    ) -> StoreFuture<'a, ()> {
        (**self).remove_cookie(domain, path, key)
    }

    fn remove_cookies<'a>(&'a self, domain: &'a str, path: &'a str) -> StoreFuture<'a, ()> {
        (**self).remove_cookies(domain, path)
    }

    fn remove_all_cookies(&self) -> StoreFuture<'_, ()> {
        (**self).remove_all_cookies()
    }

    fn get_all_cookies(&self) -> StoreFuture<'_, Vec<CanonicalCookie>> {
        (**self).get_all_cookies()
    }
}

//! Key-value store abstraction.
//!
//! The cookie store talks to its backend exclusively through [`KvStore`]: a
//! Redis-shaped capability set of per-key hashes plus cursor-based key
//! enumeration. A Redis client, a cluster proxy or the in-process
//! [`MemoryKv`] can all sit behind it.
//!
//! # Design Notes
//!
//! - Operations use `&self` so one handle serves concurrent callers.
//! - Methods return boxed futures for trait object compatibility, the same
//!   way [`crate::store::Store`] does.
//! - Readiness is a flag plus an explicit `connect`; connection management
//!   beyond that belongs to the implementation.

pub mod glob;
pub mod memory;

pub use memory::MemoryKv;

use crate::base::storeerror::StoreError;
use std::{collections::HashMap, future::Future, pin::Pin, sync::Arc};

/// Alias for the `Future` type returned by key-value operations.
pub type KvFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + Send + 'a>>;

/// Listener invoked for asynchronous client errors (dropped connections,
/// protocol errors) that are not tied to a single request.
pub type ErrorListener = Arc<dyn Fn(&StoreError) + Send + Sync>;

/// One page of a `SCAN` iteration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanPage {
    /// Cursor for the next call; `0` once the iteration has wrapped.
    pub cursor: u64,
    /// Keys matched on this page. May be empty even when `cursor != 0`.
    pub keys: Vec<String>,
}

/// Hash-capable, cursor-scannable key-value store.
///
/// Implementations must be thread-safe.
pub trait KvStore: Send + Sync {
    /// Whether the client is connected and accepting commands.
    fn is_ready(&self) -> bool;

    /// Establishes the connection.
    fn connect(&self) -> KvFuture<'_, ()>;

    /// Registers a listener for client-level error events.
    fn on_error(&self, listener: ErrorListener);

    /// `HGET key field`.
    fn hget<'a>(&'a self, key: &'a str, field: &'a str) -> KvFuture<'a, Option<String>>;

    /// `HSET key field value`; returns the number of fields added.
    fn hset<'a>(&'a self, key: &'a str, field: &'a str, value: &'a str) -> KvFuture<'a, u64>;

    /// `HDEL key field`; returns the number of fields removed.
    fn hdel<'a>(&'a self, key: &'a str, field: &'a str) -> KvFuture<'a, u64>;

    /// `HGETALL key`; a missing key yields an empty map.
    fn hgetall<'a>(&'a self, key: &'a str) -> KvFuture<'a, HashMap<String, String>>;

    /// `DEL key [key ...]`; returns the number of keys removed.
    fn del<'a>(&'a self, keys: &'a [String]) -> KvFuture<'a, u64>;

    /// `SCAN cursor MATCH pattern COUNT count`.
    fn scan<'a>(&'a self, cursor: u64, pattern: &'a str, count: usize) -> KvFuture<'a, ScanPage>;
}

/// Blanket implementation for Arc-wrapped stores.
impl<K: KvStore + ?Sized> KvStore for Arc<K> {
    fn is_ready(&self) -> bool {
        (**self).is_ready()
    }

    fn connect(&self) -> KvFuture<'_, ()> {
        (**self).connect()
    }

    fn on_error(&self, listener: ErrorListener) {
        (**self).on_error(listener)
    }

    fn hget<'a>(&'a self, key: &'a str, field: &'a str) -> KvFuture<'a, Option<String>> {
        (**self).hget(key, field)
    }

    fn hset<'a>(&'a self, key: &'a str, field: &'a str, value: &'a str) -> KvFuture<'a, u64> {
        (**self).hset(key, field, value)
    }

    fn hdel<'a>(&'a self, key: &'a str, field: &'a str) -> KvFuture<'a, u64> {
        (**self).hdel(key, field)
    }

    fn hgetall<'a>(&'a self, key: &'a str) -> KvFuture<'a, HashMap<String, String>> {
        (**self).hgetall(key)
    }

    fn del<'a>(&'a self, keys: &'a [String]) -> KvFuture<'a, u64> {
        (**self).del(keys)
    }

    fn scan<'a>(&'a self, cursor: u64, pattern: &'a str, count: usize) -> KvFuture<'a, ScanPage> {
        (**self).scan(cursor, pattern, count)
    }
}

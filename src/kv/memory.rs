//! In-process key-value store.
//!
//! [`MemoryKv`] implements [`KvStore`] on a `DashMap` with the Redis
//! behaviour the cookie store relies on:
//! - a hash disappears when its last field is deleted;
//! - `SCAN` visits every key that exists for the whole iteration exactly
//!   once, even when keys are deleted mid-scan, and `COUNT` bounds the work
//!   per call rather than the number of matches;
//! - `MATCH` patterns use Redis glob syntax (see [`glob`](super::glob)).
//!
//! It also exposes failure controls (disconnected start, refused connects,
//! offline mode, slow scans) so callers can exercise their error paths.

use super::glob::glob_match;
use super::{ErrorListener, KvFuture, KvStore, ScanPage};
use crate::base::storeerror::StoreError;
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

struct HashEntry {
    /// Insertion sequence; scan cursors are positions in this order.
    seq: u64,
    fields: HashMap<String, String>,
}

/// Concurrent in-memory store with Redis hash and `SCAN` semantics.
pub struct MemoryKv {
    data: DashMap<String, HashEntry>,
    next_seq: AtomicU64,
    ready: AtomicBool,
    refuse_connections: AtomicBool,
    offline: AtomicBool,
    scan_delay: Mutex<Option<Duration>>,
    listeners: Mutex<Vec<ErrorListener>>,
}

impl Default for MemoryKv {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryKv {
    /// A connected, empty store.
    pub fn new() -> Self {
        Self {
            data: DashMap::new(),
            next_seq: AtomicU64::new(1),
            ready: AtomicBool::new(true),
            refuse_connections: AtomicBool::new(false),
            offline: AtomicBool::new(false),
            scan_delay: Mutex::new(None),
            listeners: Mutex::new(Vec::new()),
        }
    }

    /// An empty store that must be connected before use.
    pub fn disconnected() -> Self {
        let kv = Self::new();
        kv.ready.store(false, Ordering::SeqCst);
        kv
    }

    /// Make subsequent `connect` calls fail.
    pub fn refuse_connections(&self, refuse: bool) {
        self.refuse_connections.store(refuse, Ordering::SeqCst);
    }

    /// While offline every command fails and error listeners are notified.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Delay applied before answering each `SCAN` page.
    pub fn set_scan_delay(&self, delay: Option<Duration>) {
        *self
            .scan_delay
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = delay;
    }

    /// Number of keys currently stored.
    pub fn key_count(&self) -> usize {
        self.data.len()
    }

    /// All keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.data.iter().map(|e| e.key().clone()).collect();
        keys.sort();
        keys
    }

    /// Number of registered error listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// `FLUSHDB`.
    pub fn flush(&self) {
        self.data.clear();
    }

    fn scan_delay(&self) -> Option<Duration> {
        *self
            .scan_delay
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self, err: &StoreError) {
        let listeners = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for listener in listeners {
            listener(err);
        }
    }

    fn check_available(&self, command: &str) -> Result<(), StoreError> {
        if !self.ready.load(Ordering::SeqCst) {
            return Err(StoreError::backend(format!("{}: the client is closed", command)));
        }
        if self.offline.load(Ordering::SeqCst) {
            let err = StoreError::backend(format!("{}: connection lost", command));
            self.notify(&err);
            return Err(err);
        }
        Ok(())
    }
}

impl KvStore for MemoryKv {
    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    fn connect(&self) -> KvFuture<'_, ()> {
        Box::pin(async move {
            if self.refuse_connections.load(Ordering::SeqCst) {
                let err = StoreError::connect_failed("connection refused");
                self.notify(&err);
                return Err(err);
            }
            self.ready.store(true, Ordering::SeqCst);
            tracing::debug!("in-memory key-value store connected");
            Ok(())
        })
    }

    fn on_error(&self, listener: ErrorListener) {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(listener);
    }

    fn hget<'a>(&'a self, key: &'a str, field: &'a str) -> KvFuture<'a, Option<String>> {
        Box::pin(async move {
            self.check_available("HGET")?;
            Ok(self
                .data
                .get(key)
                .and_then(|entry| entry.fields.get(field).cloned()))
        })
    }

    fn hset<'a>(&'a self, key: &'a str, field: &'a str, value: &'a str) -> KvFuture<'a, u64> {
        Box::pin(async move {
            self.check_available("HSET")?;
            let mut entry = self.data.entry(key.to_string()).or_insert_with(|| HashEntry {
                seq: self.next_seq.fetch_add(1, Ordering::SeqCst),
                fields: HashMap::new(),
            });
            let previous = entry.fields.insert(field.to_string(), value.to_string());
            Ok(u64::from(previous.is_none()))
        })
    }

    fn hdel<'a>(&'a self, key: &'a str, field: &'a str) -> KvFuture<'a, u64> {
        Box::pin(async move {
            self.check_available("HDEL")?;
            let removed = match self.data.get_mut(key) {
                Some(mut entry) => entry.fields.remove(field).is_some(),
                None => false,
            };
            if removed {
                self.data.remove_if(key, |_, entry| entry.fields.is_empty());
            }
            Ok(u64::from(removed))
        })
    }

    fn hgetall<'a>(&'a self, key: &'a str) -> KvFuture<'a, HashMap<String, String>> {
        Box::pin(async move {
            self.check_available("HGETALL")?;
            Ok(self
                .data
                .get(key)
                .map(|entry| entry.fields.clone())
                .unwrap_or_default())
        })
    }

    fn del<'a>(&'a self, keys: &'a [String]) -> KvFuture<'a, u64> {
        Box::pin(async move {
            self.check_available("DEL")?;
            let removed = keys
                .iter()
                .filter(|key| self.data.remove(key.as_str()).is_some())
                .count();
            Ok(removed as u64)
        })
    }

    fn scan<'a>(&'a self, cursor: u64, pattern: &'a str, count: usize) -> KvFuture<'a, ScanPage> {
        Box::pin(async move {
            if let Some(delay) = self.scan_delay() {
                tokio::time::sleep(delay).await;
            }
            self.check_available("SCAN")?;

            let mut candidates: Vec<(u64, String)> = self
                .data
                .iter()
                .filter(|entry| entry.seq >= cursor)
                .map(|entry| (entry.seq, entry.key().clone()))
                .collect();
            candidates.sort_unstable_by_key(|(seq, _)| *seq);

            let count = count.max(1);
            let has_more = candidates.len() > count;
            candidates.truncate(count);

            let next = match candidates.last() {
                Some((seq, _)) if has_more => seq + 1,
                _ => 0,
            };
            let keys = candidates
                .into_iter()
                .filter(|(_, key)| glob_match(pattern, key))
                .map(|(_, key)| key)
                .collect();

            Ok(ScanPage { cursor: next, keys })
        })
    }
}

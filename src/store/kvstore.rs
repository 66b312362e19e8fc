//! Key-value backed cookie store.
//!
//! Cookies live in hashes addressed by [`key_name`]: one hash per
//! (store id, domain, path), one field per cookie name, the field value being
//! the cookie's JSON record. Writing a field again is how a cookie is
//! updated.
//!
//! Lookups by request domain and path cannot address a single hash: cookies
//! set on `example.com` or on `/` are visible to `a.example.com/x`. So
//! [`KvCookieStore::find_cookies`] scans one pattern per domain/path
//! permutation, concurrently, and merges the results.
//!
//! # Partial results
//!
//! Bulk reads and wildcard removals enumerate keys with a bounded scan (see
//! [`scan`](super::scan)). A scan that times out or hits a store error is
//! logged and ends early, and the operation still returns `Ok` with what was
//! collected. Callers that need to know use [`KvCookieStore::scan`] directly.

use super::config::KvCookieStoreConfig;
use super::keys::{key_name, key_pattern, WILDCARD};
use super::scan::{bounded_scan, ScanReport};
use super::{Store, StoreFuture};
use crate::base::storeerror::StoreError;
use crate::cookies::canonicalcookie::CanonicalCookie;
use crate::cookies::permute::{permute_domain, permute_path};
use crate::kv::{ErrorListener, KvStore};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::future::{join_all, try_join_all};
use std::future::Future;
use std::sync::{Arc, OnceLock, Weak};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Cookie store over a [`KvStore`].
pub struct KvCookieStore {
    client: Option<Arc<dyn KvStore>>,
    config: KvCookieStoreConfig,
    /// Background connect started by [`KvCookieStore::new`].
    connecting: Mutex<Option<JoinHandle<Result<(), StoreError>>>>,
}

/// Handles that already carry the logging listener, keyed by address.
static LOGGED_CLIENTS: OnceLock<DashMap<usize, Weak<dyn KvStore>>> = OnceLock::new();

fn log_client_errors() -> ErrorListener {
    Arc::new(|err: &StoreError| {
        tracing::error!(error = %err, "key-value store client error");
    })
}

/// Registers the logging listener on `client` unless an earlier store
/// already did. Adapters sharing a handle log each client error once.
fn register_error_logging(client: &Arc<dyn KvStore>) {
    let registry = LOGGED_CLIENTS.get_or_init(DashMap::new);
    registry.retain(|_, handle| handle.strong_count() > 0);

    let addr = Arc::as_ptr(client) as *const () as usize;
    let fresh = match registry.entry(addr) {
        Entry::Occupied(mut entry) => {
            if entry.get().strong_count() > 0 {
                false
            } else {
                entry.insert(Arc::downgrade(client));
                true
            }
        }
        Entry::Vacant(entry) => {
            entry.insert(Arc::downgrade(client));
            true
        }
    };
    if fresh {
        client.on_error(log_client_errors());
    }
}

fn connect_error(store_id: &str, err: StoreError) -> StoreError {
    tracing::error!(store_id = %store_id, error = %err, "key-value store connect failed");
    match err {
        StoreError::ConnectFailed { .. } => err,
        other => StoreError::connect_failed(other.to_string()),
    }
}

impl KvCookieStore {
    /// Creates a store over `client`.
    ///
    /// If the client is not ready yet, a connect is started in the background
    /// on the current tokio runtime; [`wait_ready`](Self::wait_ready) reports
    /// its outcome. Use [`open`](Self::open) to connect up front instead.
    ///
    /// A client that is not ready gets a logging error listener, once per
    /// handle however many stores share it.
    pub fn new(client: Arc<dyn KvStore>, config: KvCookieStoreConfig) -> Self {
        let mut connecting = None;
        if !client.is_ready() {
            register_error_logging(&client);
            match tokio::runtime::Handle::try_current() {
                Ok(handle) => {
                    let client = client.clone();
                    connecting = Some(handle.spawn(async move { client.connect().await }));
                }
                Err(_) => {
                    tracing::warn!(
                        store_id = %config.id,
                        "no tokio runtime, key-value store left unconnected"
                    );
                }
            }
        }

        Self {
            client: Some(client),
            config,
            connecting: Mutex::new(connecting),
        }
    }

    /// Creates a store over `client`, connecting it first if needed.
    ///
    /// A failed connect is returned as [`StoreError::ConnectFailed`]. A
    /// cookie store without a working backend must not be used, so callers
    /// normally treat this as fatal.
    pub async fn open(
        client: Arc<dyn KvStore>,
        config: KvCookieStoreConfig,
    ) -> Result<Self, StoreError> {
        if !client.is_ready() {
            register_error_logging(&client);
            client
                .connect()
                .await
                .map_err(|e| connect_error(&config.id, e))?;
        }

        Ok(Self {
            client: Some(client),
            config,
            connecting: Mutex::new(None),
        })
    }

    /// Creates a store with no backend.
    ///
    /// Reads return nothing and writes fail with
    /// [`StoreError::ClientUnavailable`].
    pub fn without_client(config: KvCookieStoreConfig) -> Self {
        Self {
            client: None,
            config,
            connecting: Mutex::new(None),
        }
    }

    /// Waits for the background connect started by [`new`](Self::new).
    pub async fn wait_ready(&self) -> Result<(), StoreError> {
        let pending = self.connecting.lock().await.take();
        if let Some(task) = pending {
            task.await?
                .map_err(|e| connect_error(&self.config.id, e))?;
        }

        match &self.client {
            Some(client) if client.is_ready() => Ok(()),
            Some(_) => Err(StoreError::connect_failed("key-value store is not connected")),
            None => Err(StoreError::ClientUnavailable),
        }
    }

    pub fn id(&self) -> &str {
        &self.config.id
    }

    pub fn config(&self) -> &KvCookieStoreConfig {
        &self.config
    }

    /// Lookup key for `domain` and optional `path` in this store.
    pub fn key_name(&self, domain: &str, path: Option<&str>) -> String {
        key_name(&self.config.id, domain, path)
    }

    fn client(&self) -> Result<&dyn KvStore, StoreError> {
        self.client.as_deref().ok_or(StoreError::ClientUnavailable)
    }

    /// Runs a bounded scan of `pattern` with this store's limits.
    pub async fn scan<F, Fut, T>(&self, pattern: &str, on_batch: F) -> ScanReport<T>
    where
        F: FnMut(Vec<String>) -> Fut,
        Fut: Future<Output = Result<T, StoreError>>,
    {
        match self.client.as_deref() {
            Some(client) => {
                bounded_scan(
                    client,
                    pattern,
                    self.config.scan_count,
                    self.config.scan_timeout,
                    on_batch,
                )
                .await
            }
            None => ScanReport::skipped(StoreError::ClientUnavailable),
        }
    }

    pub async fn find_cookie(
        &self,
        domain: &str,
        path: &str,
        key: &str,
    ) -> Result<Option<CanonicalCookie>, StoreError> {
        let Some(client) = self.client.as_deref() else {
            return Ok(None);
        };

        let key_name = self.key_name(domain, Some(path));
        match client.hget(&key_name, key).await? {
            Some(json) if !json.is_empty() => Ok(Some(CanonicalCookie::from_json(&json)?)),
            _ => Ok(None),
        }
    }

    pub async fn find_cookies(
        &self,
        domain: &str,
        path: &str,
        allow_special_use_domain: bool,
    ) -> Result<Vec<CanonicalCookie>, StoreError> {
        let Some(client) = self.client.as_deref() else {
            return Ok(Vec::new());
        };
        if domain.is_empty() {
            return Ok(Vec::new());
        }

        let domains = permute_domain(domain, allow_special_use_domain)
            .unwrap_or_else(|| vec![domain.to_string()]);
        let paths = permute_path(path);
        let patterns: Vec<String> = domains
            .iter()
            .flat_map(|d| {
                paths
                    .iter()
                    .map(move |p| key_pattern(&self.config.id, d, Some(p.as_str())))
            })
            .collect();

        tracing::debug!(
            domain = %domain,
            path = %path,
            patterns = patterns.len(),
            "finding cookies"
        );

        let mut scans = Vec::with_capacity(patterns.len());
        for pattern in &patterns {
            scans.push(self.scan(pattern, move |keys| read_cookies(client, keys)));
        }
        let reports = join_all(scans).await;

        let mut cookies: Vec<CanonicalCookie> = reports
            .into_iter()
            .flat_map(|report| report.items.into_iter().flatten())
            .collect();
        sort_by_creation(&mut cookies);
        Ok(cookies)
    }

    pub async fn put_cookie(&self, cookie: &CanonicalCookie) -> Result<(), StoreError> {
        if cookie.domain.is_empty() || cookie.path.is_empty() {
            return Err(StoreError::MissingDomainOrPath);
        }

        let key_name = self.key_name(&cookie.domain, Some(&cookie.path));
        let json = cookie.to_json()?;
        let client = self.client()?;
        client.hset(&key_name, &cookie.name, &json).await?;
        tracing::debug!(key = %key_name, name = %cookie.name, "cookie stored");
        Ok(())
    }

    /// Same as `put_cookie(new)`; the old cookie is not consulted.
    pub async fn update_cookie(
        &self,
        _old: &CanonicalCookie,
        new: &CanonicalCookie,
    ) -> Result<(), StoreError> {
        self.put_cookie(new).await
    }

    pub async fn remove_cookie(
        &self,
        domain: &str,
        path: &str,
        key: &str,
    ) -> Result<(), StoreError> {
        let key_name = self.key_name(domain, Some(path));
        let client = self.client()?;
        client.hdel(&key_name, key).await?;
        Ok(())
    }

    /// Removes the hash at (`domain`, `path`).
    ///
    /// A path of `"*"` (or an empty path) removes every path under `domain`,
    /// and a domain of `"*"` matches every domain.
    pub async fn remove_cookies(&self, domain: &str, path: &str) -> Result<(), StoreError> {
        if !path.is_empty() && path != WILDCARD {
            let key_name = self.key_name(domain, Some(path));
            let client = self.client()?;
            client.del(&[key_name]).await?;
            return Ok(());
        }

        let Some(client) = self.client.as_deref() else {
            return Ok(());
        };
        let pattern = key_pattern(&self.config.id, domain, Some(WILDCARD));
        let report = self
            .scan(&pattern, |keys| async move { client.del(&keys).await })
            .await;
        let removed: u64 = report.items.iter().sum();
        tracing::debug!(pattern = %pattern, removed, status = ?report.status, "cookies removed");
        Ok(())
    }

    pub async fn remove_all_cookies(&self) -> Result<(), StoreError> {
        self.remove_cookies(WILDCARD, WILDCARD).await
    }

    pub async fn get_all_cookies(&self) -> Result<Vec<CanonicalCookie>, StoreError> {
        let Some(client) = self.client.as_deref() else {
            return Ok(Vec::new());
        };

        let pattern = key_pattern(&self.config.id, WILDCARD, None);
        let report = self
            .scan(&pattern, |keys| read_cookies(client, keys))
            .await;

        let mut cookies: Vec<CanonicalCookie> = report.items.into_iter().flatten().collect();
        sort_by_creation(&mut cookies);
        Ok(cookies)
    }
}

/// Reads every hash in `keys` concurrently and decodes every field.
///
/// Fields that do not decode are skipped; a failed read fails the batch.
async fn read_cookies(
    client: &dyn KvStore,
    keys: Vec<String>,
) -> Result<Vec<CanonicalCookie>, StoreError> {
    let hashes = try_join_all(keys.iter().map(|key| client.hgetall(key))).await?;

    Ok(hashes
        .into_iter()
        .flat_map(|fields| fields.into_values())
        .filter(|json| !json.is_empty())
        .filter_map(|json| match CanonicalCookie::from_json(&json) {
            Ok(cookie) => Some(cookie),
            Err(e) => {
                tracing::warn!(error = %e, "skipping unreadable cookie record");
                None
            }
        })
        .collect())
}

/// Creation order, with a total tie-break so output never depends on the
/// order in which concurrent reads finished.
fn sort_by_creation(cookies: &mut [CanonicalCookie]) {
    cookies.sort_by(|a, b| {
        a.creation_index
            .cmp(&b.creation_index)
            .then_with(|| a.creation_time.cmp(&b.creation_time))
            .then_with(|| a.domain.cmp(&b.domain))
            .then_with(|| a.path.cmp(&b.path))
            .then_with(|| a.name.cmp(&b.name))
    });
}

impl Store for KvCookieStore {
    fn find_cookie<'a>(
        &'a self,
        domain: &'a str,
        path: &'a str,
        key: &'a str,
    ) -> StoreFuture<'a, Option<CanonicalCookie>> {
        Box::pin(KvCookieStore::find_cookie(self, domain, path, key))
    }

    fn find_cookies<'a>(
        &'a self,
        domain: &'a str,
        path: &'a str,
        allow_special_use_domain: bool,
    ) -> StoreFuture<'a, Vec<CanonicalCookie>> {
        Box::pin(KvCookieStore::find_cookies(
            self,
            domain,
            path,
            allow_special_use_domain,
        ))
    }

    fn put_cookie<'a>(&'a self, cookie: &'a CanonicalCookie) -> StoreFuture<'a, ()> {
        Box::pin(KvCookieStore::put_cookie(self, cookie))
    }

    fn update_cookie<'a>(
        &'a self,
        old: &'a CanonicalCookie,
        new: &'a CanonicalCookie,
    ) -> StoreFuture<'a, ()> {
        Box::pin(KvCookieStore::update_cookie(self, old, new))
    }

    fn remove_cookie<'a>(
        &'a self,
        domain: &'a str,
        path: &'a str,
        key: &'a str,
    ) -> StoreFuture<'a, ()> {
        Box::pin(KvCookieStore::remove_cookie(self, domain, path, key))
    }

    fn remove_cookies<'a>(&'a self, domain: &'a str, path: &'a str) -> StoreFuture<'a, ()> {
        Box::pin(KvCookieStore::remove_cookies(self, domain, path))
    }

    fn remove_all_cookies(&self) -> StoreFuture<'_, ()> {
        Box::pin(KvCookieStore::remove_all_cookies(self))
    }

    fn get_all_cookies(&self) -> StoreFuture<'_, Vec<CanonicalCookie>> {
        Box::pin(KvCookieStore::get_all_cookies(self))
    }
}

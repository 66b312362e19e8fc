//! Completion-callback dispatch over any [`Store`].
//!
//! Each method spawns the operation on the tokio runtime and hands its
//! result to `callback` exactly once. The returned handle resolves after the
//! callback has run. All methods must be called from within a runtime.

use super::Store;
use crate::base::storeerror::StoreError;
use crate::cookies::canonicalcookie::CanonicalCookie;
use std::sync::Arc;
use tokio::task::JoinHandle;

pub struct CallbackStore<S: Store + 'static> {
    inner: Arc<S>,
}

impl<S: Store + 'static> Clone for CallbackStore<S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<S: Store + 'static> CallbackStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }

    pub fn from_arc(inner: Arc<S>) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &Arc<S> {
        &self.inner
    }

    pub fn find_cookie<F>(
        &self,
        domain: String,
        path: String,
        key: String,
        callback: F,
    ) -> JoinHandle<()>
    where
        F: FnOnce(Result<Option<CanonicalCookie>, StoreError>) + Send + 'static,
    {
        let store = self.inner.clone();
        tokio::spawn(async move {
            callback(store.find_cookie(&domain, &path, &key).await);
        })
    }

    pub fn find_cookies<F>(
        &self,
        domain: String,
        path: String,
        allow_special_use_domain: bool,
        callback: F,
    ) -> JoinHandle<()>
    where
        F: FnOnce(Result<Vec<CanonicalCookie>, StoreError>) + Send + 'static,
    {
        let store = self.inner.clone();
        tokio::spawn(async move {
            callback(
                store
                    .find_cookies(&domain, &path, allow_special_use_domain)
                    .await,
            );
        })
    }

    pub fn put_cookie<F>(&self, cookie: CanonicalCookie, callback: F) -> JoinHandle<()>
    where
        F: FnOnce(Result<(), StoreError>) + Send + 'static,
    {
        let store = self.inner.clone();
        tokio::spawn(async move {
            callback(store.put_cookie(&cookie).await);
        })
    }

    pub fn update_cookie<F>(
        &self,
        old: CanonicalCookie,
        new: CanonicalCookie,
        callback: F,
    ) -> JoinHandle<()>
    where
        F: FnOnce(Result<(), StoreError>) + Send + 'static,
    {
        let store = self.inner.clone();
        tokio::spawn(async move {
            callback(store.update_cookie(&old, &new).await);
        })
    }

    pub fn remove_cookie<F>(
        &self,
        domain: String,
        path: String,
        key: String,
        callback: F,
    ) -> JoinHandle<()>
    where
        F: FnOnce(Result<(), StoreError>) + Send + 'static,
    {
        let store = self.inner.clone();
        tokio::spawn(async move {
            callback(store.remove_cookie(&domain, &path, &key).await);
        })
    }

    pub fn remove_cookies<F>(&self, domain: String, path: String, callback: F) -> JoinHandle<()>
    where
        F: FnOnce(Result<(), StoreError>) + Send + 'static,
    {
        let store = self.inner.clone();
        tokio::spawn(async move {
            callback(store.remove_cookies(&domain, &path).await);
        })
    }

    pub fn remove_all_cookies<F>(&self, callback: F) -> JoinHandle<()>
    where
        F: FnOnce(Result<(), StoreError>) + Send + 'static,
    {
        let store = self.inner.clone();
        tokio::spawn(async move {
            callback(store.remove_all_cookies().await);
        })
    }

    pub fn get_all_cookies<F>(&self, callback: F) -> JoinHandle<()>
    where
        F: FnOnce(Result<Vec<CanonicalCookie>, StoreError>) + Send + 'static,
    {
        let store = self.inner.clone();
        tokio::spawn(async move {
            callback(store.get_all_cookies().await);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryKv;
    use crate::store::{KvCookieStore, KvCookieStoreConfig};
    use time::OffsetDateTime;
    use tokio::sync::oneshot;

    fn store() -> CallbackStore<KvCookieStore> {
        CallbackStore::new(KvCookieStore::new(
            Arc::new(MemoryKv::new()),
            KvCookieStoreConfig::default(),
        ))
    }

    #[tokio::test]
    async fn test_put_then_find_through_callbacks() {
        let store = store();
        let cookie = CanonicalCookie::new(
            "sid".to_string(),
            "1".to_string(),
            "x.com".to_string(),
            "/".to_string(),
            OffsetDateTime::now_utc(),
            None,
        );

        let (tx, rx) = oneshot::channel();
        store
            .put_cookie(cookie, move |res| {
                let _ = tx.send(res);
            })
            .await
            .unwrap();
        assert_eq!(rx.await.unwrap(), Ok(()));

        let (tx, rx) = oneshot::channel();
        store
            .find_cookie("x.com".into(), "/".into(), "sid".into(), move |res| {
                let _ = tx.send(res);
            })
            .await
            .unwrap();
        let found = rx.await.unwrap().unwrap().unwrap();
        assert_eq!(found.value, "1");
    }

    #[tokio::test]
    async fn test_error_reaches_callback() {
        let store = CallbackStore::new(KvCookieStore::without_client(KvCookieStoreConfig::default()));
        let cookie = CanonicalCookie::new(
            "sid".to_string(),
            "1".to_string(),
            "".to_string(),
            "/".to_string(),
            OffsetDateTime::now_utc(),
            None,
        );

        let (tx, rx) = oneshot::channel();
        store
            .put_cookie(cookie, move |res| {
                let _ = tx.send(res);
            })
            .await
            .unwrap();
        assert_eq!(rx.await.unwrap(), Err(StoreError::MissingDomainOrPath));
    }
}

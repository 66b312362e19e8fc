//! Bounded key enumeration.
//!
//! Key spaces cannot be listed atomically, so enumeration walks `SCAN`
//! cursors until the store reports a full cycle (cursor `0`) or a wall-clock
//! ceiling is reached. Failures stop the walk and are logged; callers get
//! whatever was collected together with a [`ScanStatus`].

use crate::base::storeerror::StoreError;
use crate::kv::KvStore;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// How a scan ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanStatus {
    /// The cursor wrapped back to `0`.
    Complete,
    /// The wall-clock ceiling was reached first.
    TimedOut,
    /// The store or the batch handler failed; the walk stopped there.
    Failed(StoreError),
}

/// Outcome of a scan: one item per handled batch, plus how the walk ended.
#[derive(Debug, Clone)]
pub struct ScanReport<T> {
    pub items: Vec<T>,
    pub status: ScanStatus,
    /// `SCAN` calls issued.
    pub pages: usize,
    /// Keys handed to the batch handler.
    pub keys: usize,
}

impl<T> ScanReport<T> {
    pub(crate) fn skipped(reason: StoreError) -> Self {
        Self {
            items: Vec::new(),
            status: ScanStatus::Failed(reason),
            pages: 0,
            keys: 0,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.status == ScanStatus::Complete
    }
}

/// Walks every key matching `pattern`, `count` keys of work per call.
///
/// `on_batch` runs for every non-empty page, in order. The loop ends when
/// the cursor returns to `0`, when `timeout` has elapsed since the first
/// call, or on the first error from the store or from `on_batch`. Nothing is
/// raised: the status says which of these happened.
pub async fn bounded_scan<F, Fut, T>(
    client: &dyn KvStore,
    pattern: &str,
    count: usize,
    timeout: Duration,
    mut on_batch: F,
) -> ScanReport<T>
where
    F: FnMut(Vec<String>) -> Fut,
    Fut: Future<Output = Result<T, StoreError>>,
{
    let started = Instant::now();
    let mut report = ScanReport {
        items: Vec::new(),
        status: ScanStatus::Complete,
        pages: 0,
        keys: 0,
    };
    let mut cursor = 0;

    loop {
        let page = match client.scan(cursor, pattern, count).await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!(pattern = %pattern, error = %e, "scan aborted by store error");
                report.status = ScanStatus::Failed(e);
                return report;
            }
        };
        report.pages += 1;
        cursor = page.cursor;

        if !page.keys.is_empty() {
            report.keys += page.keys.len();
            match on_batch(page.keys).await {
                Ok(item) => report.items.push(item),
                Err(e) => {
                    tracing::warn!(pattern = %pattern, error = %e, "scan aborted by batch handler");
                    report.status = ScanStatus::Failed(e);
                    return report;
                }
            }
        }

        if cursor == 0 {
            tracing::debug!(pattern = %pattern, pages = report.pages, keys = report.keys, "scan complete");
            return report;
        }

        if started.elapsed() >= timeout {
            tracing::warn!(
                pattern = %pattern,
                pages = report.pages,
                keys = report.keys,
                timeout_ms = timeout.as_millis() as u64,
                "scan stopped at time limit, results may be incomplete"
            );
            report.status = ScanStatus::TimedOut;
            return report;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryKv;

    async fn seed(kv: &MemoryKv, n: usize) {
        for i in 0..n {
            kv.hset(&format!("k:{}", i), "f", "v").await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_collects_every_batch() {
        let kv = MemoryKv::new();
        seed(&kv, 23).await;

        let report = bounded_scan(&kv, "k:*", 5, Duration::from_secs(10), |keys| async move {
            Ok::<_, StoreError>(keys.len())
        })
        .await;

        assert!(report.is_complete());
        assert_eq!(report.items.iter().sum::<usize>(), 23);
        assert_eq!(report.pages, 5);
    }

    #[tokio::test]
    async fn test_empty_pages_skip_handler() {
        let kv = MemoryKv::new();
        seed(&kv, 10).await;

        let report = bounded_scan(&kv, "nothing:*", 3, Duration::from_secs(10), |_keys| async {
            Ok::<_, StoreError>(())
        })
        .await;

        assert!(report.is_complete());
        assert!(report.items.is_empty());
        assert_eq!(report.keys, 0);
        assert_eq!(report.pages, 4);
    }

    #[tokio::test]
    async fn test_handler_error_stops_scan() {
        let kv = MemoryKv::new();
        seed(&kv, 10).await;

        let report = bounded_scan(&kv, "k:*", 2, Duration::from_secs(10), |_keys| async {
            Err::<(), _>(StoreError::backend("boom"))
        })
        .await;

        assert_eq!(report.pages, 1);
        assert_eq!(report.status, ScanStatus::Failed(StoreError::backend("boom")));
    }

    #[tokio::test]
    async fn test_store_error_stops_scan() {
        let kv = MemoryKv::new();
        seed(&kv, 3).await;
        kv.set_offline(true);

        let report = bounded_scan(&kv, "k:*", 2, Duration::from_secs(10), |keys| async move {
            Ok::<_, StoreError>(keys)
        })
        .await;

        assert_eq!(report.pages, 0);
        assert!(matches!(report.status, ScanStatus::Failed(StoreError::Backend { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_time_limit_stops_scan() {
        let kv = MemoryKv::new();
        seed(&kv, 100).await;
        kv.set_scan_delay(Some(Duration::from_secs(3)));

        let report = bounded_scan(&kv, "k:*", 10, Duration::from_secs(10), |keys| async move {
            Ok::<_, StoreError>(keys.len())
        })
        .await;

        assert_eq!(report.status, ScanStatus::TimedOut);
        assert_eq!(report.pages, 4);
        assert_eq!(report.items.iter().sum::<usize>(), 40);
    }
}

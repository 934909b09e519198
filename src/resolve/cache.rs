//! Short-lived memoization of resolved descriptors.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tokio::sync::OnceCell;

use crate::content::{ContentDescriptor, ContentReference};
use crate::error::Result;

/// A resolved descriptor and when it was stored.
#[derive(Debug)]
struct Cached {
    descriptor: Arc<ContentDescriptor>,
    stored_at: Instant,
}

/// One reference's entry. Concurrent resolutions of the same reference wait
/// on the same cell, so only one upstream fetch runs at a time.
#[derive(Debug)]
struct Slot {
    cell: OnceCell<Cached>,
    created_at: Instant,
}

impl Slot {
    fn new() -> Self {
        Self {
            cell: OnceCell::new(),
            created_at: Instant::now(),
        }
    }

    /// In-flight slots never expire.
    fn is_expired(&self, ttl: Duration) -> bool {
        self.cell
            .get()
            .is_some_and(|cached| cached.stored_at.elapsed() > ttl)
    }

    fn age(&self) -> Duration {
        self.created_at.elapsed()
    }
}

/// Bounded TTL cache keyed by [`ContentReference`].
///
/// Failed resolutions are never stored. Entries are keyed by the full
/// reference, so a descriptor is only ever served for the reference it was
/// resolved from.
#[derive(Debug)]
pub struct MetadataCache {
    entries: Mutex<HashMap<ContentReference, Arc<Slot>>>,
    ttl: Duration,
    max_entries: usize,
}

impl MetadataCache {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            max_entries: max_entries.max(1),
        }
    }

    /// Return the cached descriptor for `reference`, or run `fetch` to fill it.
    #[tracing::instrument(skip(self, reference, fetch), fields(reference = %reference))]
    pub async fn get_or_try_insert_with<F, Fut>(
        &self,
        reference: &ContentReference,
        fetch: F,
    ) -> Result<Arc<ContentDescriptor>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<ContentDescriptor>>,
    {
        let slot = self.slot(reference);

        if let Some(cached) = slot.cell.get() {
            tracing::debug!("Cache hit");
            return Ok(cached.descriptor.clone());
        }

        let result = slot
            .cell
            .get_or_try_init(|| async move {
                tracing::debug!("Cache miss, resolving");
                let descriptor = fetch().await?;
                Ok(Cached {
                    descriptor: Arc::new(descriptor),
                    stored_at: Instant::now(),
                })
            })
            .await;

        match result {
            Ok(cached) => Ok(cached.descriptor.clone()),
            Err(e) => {
                self.discard(reference, &slot);
                Err(e)
            }
        }
    }

    /// Drop any entry for `reference`.
    pub fn invalidate(&self, reference: &ContentReference) {
        self.lock().remove(reference);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot(&self, reference: &ContentReference) -> Arc<Slot> {
        let mut entries = self.lock();

        if let Some(slot) = entries.get(reference) {
            if !slot.is_expired(self.ttl) {
                return slot.clone();
            }
        }

        let ttl = self.ttl;
        entries.retain(|_, slot| !slot.is_expired(ttl));

        // In-flight slots are skipped; the map may briefly exceed capacity.
        while entries.len() >= self.max_entries {
            let oldest = entries
                .iter()
                .filter(|(_, slot)| slot.cell.get().is_some())
                .max_by_key(|(_, slot)| slot.age())
                .map(|(key, _)| key.clone());
            match oldest {
                Some(key) => {
                    tracing::debug!("Evicting {}", key);
                    entries.remove(&key);
                }
                None => break,
            }
        }

        let slot = Arc::new(Slot::new());
        entries.insert(reference.clone(), slot.clone());
        slot
    }

    /// Remove a slot whose fetch failed, unless another caller already replaced or filled it.
    fn discard(&self, reference: &ContentReference, slot: &Arc<Slot>) {
        let mut entries = self.lock();
        if let Some(current) = entries.get(reference) {
            if Arc::ptr_eq(current, slot) && current.cell.get().is_none() {
                entries.remove(reference);
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ContentReference, Arc<Slot>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::DownloadOptions;
    use crate::error::Error;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::oneshot;

    fn descriptor(username: &str) -> ContentDescriptor {
        ContentDescriptor {
            content_type: "profile".to_string(),
            title: format!("Profile: @{}", username),
            description: None,
            thumbnail_url: None,
            username: username.to_string(),
            download_options: DownloadOptions::new(),
        }
    }

    #[tokio::test]
    async fn test_hit_skips_fetch() {
        let cache = MetadataCache::new(Duration::from_secs(60), 8);
        let reference = ContentReference::profile("someone");
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let d = cache
                .get_or_try_insert_with(&reference, || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(descriptor("someone"))
                })
                .await
                .unwrap();
            assert_eq!(d.username, "someone");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_references_never_share_entries() {
        let cache = MetadataCache::new(Duration::from_secs(60), 8);
        let a = ContentReference::profile("alice");
        let b = ContentReference::story("alice");

        cache
            .get_or_try_insert_with(&a, || async { Ok(descriptor("alice-profile")) })
            .await
            .unwrap();
        let d = cache
            .get_or_try_insert_with(&b, || async { Ok(descriptor("alice-story")) })
            .await
            .unwrap();

        assert_eq!(d.username, "alice-story");
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let cache = MetadataCache::new(Duration::from_secs(60), 8);
        let reference = ContentReference::profile("someone");

        let err = cache
            .get_or_try_insert_with(&reference, || async {
                Err(Error::NotFound("profile @someone".into()))
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert!(cache.is_empty());

        let d = cache
            .get_or_try_insert_with(&reference, || async { Ok(descriptor("someone")) })
            .await
            .unwrap();
        assert_eq!(d.username, "someone");
    }

    #[tokio::test]
    async fn test_invalidate_forces_refetch() {
        let cache = MetadataCache::new(Duration::from_secs(60), 8);
        let reference = ContentReference::post("ABC123", None);

        cache
            .get_or_try_insert_with(&reference, || async { Ok(descriptor("before")) })
            .await
            .unwrap();
        cache.invalidate(&reference);
        assert!(cache.is_empty());

        let d = cache
            .get_or_try_insert_with(&reference, || async { Ok(descriptor("after")) })
            .await
            .unwrap();
        assert_eq!(d.username, "after");
    }

    #[tokio::test]
    async fn test_expired_entries_refetch() {
        let cache = MetadataCache::new(Duration::from_millis(10), 8);
        let reference = ContentReference::profile("someone");

        cache
            .get_or_try_insert_with(&reference, || async { Ok(descriptor("old")) })
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;

        let d = cache
            .get_or_try_insert_with(&reference, || async { Ok(descriptor("new")) })
            .await
            .unwrap();
        assert_eq!(d.username, "new");
    }

    #[tokio::test]
    async fn test_capacity_evicts_oldest() {
        let cache = MetadataCache::new(Duration::from_secs(60), 2);
        for name in ["a", "b", "c"] {
            cache
                .get_or_try_insert_with(&ContentReference::profile(name), || async {
                    Ok(descriptor(name))
                })
                .await
                .unwrap();
            tokio::time::sleep(Duration::from_millis(2)).await;
        }

        assert_eq!(cache.len(), 2);
        let d = cache
            .get_or_try_insert_with(&ContentReference::profile("a"), || async {
                Ok(descriptor("a-refetched"))
            })
            .await
            .unwrap();
        assert_eq!(d.username, "a-refetched");
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_fetch() {
        let cache = Arc::new(MetadataCache::new(Duration::from_secs(60), 8));
        let calls = Arc::new(AtomicUsize::new(0));
        let reference = ContentReference::reel("XYZ", None);

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let cache = cache.clone();
                let calls = calls.clone();
                let reference = reference.clone();
                tokio::spawn(async move {
                    cache
                        .get_or_try_insert_with(&reference, || async {
                            calls.fetch_add(1, Ordering::SeqCst);
                            tokio::time::sleep(Duration::from_millis(20)).await;
                            Ok(descriptor("someone"))
                        })
                        .await
                })
            })
            .collect();

        for task in tasks {
            assert!(task.await.unwrap().is_ok());
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_eviction_skips_in_flight_fetch() {
        let cache = Arc::new(MetadataCache::new(Duration::from_secs(60), 1));
        let calls = Arc::new(AtomicUsize::new(0));
        let slow = ContentReference::profile("slow");
        let (started_tx, started_rx) = oneshot::channel();
        let (release_tx, release_rx) = oneshot::channel::<()>();

        let first = {
            let cache = cache.clone();
            let calls = calls.clone();
            let slow = slow.clone();
            tokio::spawn(async move {
                cache
                    .get_or_try_insert_with(&slow, move || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        let _ = started_tx.send(());
                        let _ = release_rx.await;
                        Ok(descriptor("slow"))
                    })
                    .await
            })
        };
        started_rx.await.unwrap();

        cache
            .get_or_try_insert_with(&ContentReference::profile("other"), || async {
                Ok(descriptor("other"))
            })
            .await
            .unwrap();
        assert_eq!(cache.len(), 2);

        let second = {
            let cache = cache.clone();
            let calls = calls.clone();
            tokio::spawn(async move {
                cache
                    .get_or_try_insert_with(&slow, move || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        Ok(descriptor("duplicate"))
                    })
                    .await
            })
        };

        release_tx.send(()).unwrap();
        assert_eq!(first.await.unwrap().unwrap().username, "slow");
        assert_eq!(second.await.unwrap().unwrap().username, "slow");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}

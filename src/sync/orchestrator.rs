//! Stale-while-revalidate orchestration over the fetcher and the slot store

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::watch;

use super::clock::{Clock, SystemClock};
use super::policy::{default_ttl, is_stale};
use super::state::SyncState;
use crate::cache::SlotStore;
use crate::catalog::{CatalogDocument, CatalogFetcher, CatalogMetadata};
use crate::error::FetchError;

/// Tunables for [`CatalogSync`]
#[derive(Clone)]
pub struct SyncOptions {
    pub ttl: Duration,
    pub clock: Arc<dyn Clock>,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            ttl: default_ttl(),
            clock: Arc::new(SystemClock),
        }
    }
}

/// Serves catalogs from memory, the persisted slot, or the Catalog Service.
///
/// Cloning is cheap and every clone drives the same state. Background
/// refreshes are spawned on the current tokio runtime, so requests must be
/// made from inside one.
#[derive(Clone)]
pub struct CatalogSync {
    inner: Arc<Inner>,
}

struct Inner {
    fetcher: Arc<dyn CatalogFetcher>,
    store: Arc<dyn SlotStore>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    state: watch::Sender<SyncState>,
}

impl CatalogSync {
    pub fn new(fetcher: Arc<dyn CatalogFetcher>, store: Arc<dyn SlotStore>) -> Self {
        Self::with_options(fetcher, store, SyncOptions::default())
    }

    pub fn with_options(
        fetcher: Arc<dyn CatalogFetcher>,
        store: Arc<dyn SlotStore>,
        options: SyncOptions,
    ) -> Self {
        let (state, _) = watch::channel(SyncState::default());
        Self {
            inner: Arc::new(Inner {
                fetcher,
                store,
                clock: options.clock,
                ttl: options.ttl,
                state,
            }),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Observation
    // ─────────────────────────────────────────────────────────────────────────

    /// Receive every state change from now on
    pub fn subscribe(&self) -> watch::Receiver<SyncState> {
        self.inner.state.subscribe()
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> SyncState {
        self.inner.state.borrow().clone()
    }

    pub fn is_loading_catalog(&self) -> bool {
        self.inner.state.borrow().is_loading
    }

    pub fn is_stale(&self) -> bool {
        self.inner.state.borrow().is_stale
    }

    pub fn catalog_error(&self) -> Option<FetchError> {
        self.inner.state.borrow().last_error.clone()
    }

    /// Resolves once no background refresh is in flight
    pub async fn revalidated(&self) {
        let mut rx = self.subscribe();
        // The sender lives as long as `self`, so this cannot observe a close
        let _ = rx.wait_for(|s| !s.is_revalidating).await;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Catalog
    // ─────────────────────────────────────────────────────────────────────────

    /// Get the catalog for `identifier`.
    ///
    /// Without `force_refresh`, a fresh in-memory copy is returned untouched
    /// and a persisted copy is returned at once while a background refresh
    /// runs. Otherwise the service is asked directly. When that fails the
    /// error is returned even if a cached copy was put on display.
    pub async fn request_catalog(
        &self,
        identifier: &str,
        force_refresh: bool,
    ) -> Result<Arc<CatalogDocument>, FetchError> {
        if !force_refresh {
            if let Some(document) = self.in_memory(identifier) {
                return Ok(document);
            }
        }

        self.inner.state.send_modify(|s| {
            if s.current_identifier.as_deref() != Some(identifier) {
                s.current_document = None;
                s.last_fetch = None;
                s.is_stale = false;
                s.is_revalidating = false;
            }
            s.is_loading = true;
            s.last_error = None;
            s.current_identifier = Some(identifier.to_string());
        });

        if !force_refresh {
            if let Some(document) = self.serve_persisted(identifier) {
                return Ok(document);
            }
        }

        self.fetch_foreground(identifier).await
    }

    /// Hot path: neither the store nor the network is touched.
    /// A stale copy is still returned while a refresh for it is in flight.
    fn in_memory(&self, identifier: &str) -> Option<Arc<CatalogDocument>> {
        let now = self.inner.clock.now();
        let state = self.inner.state.borrow();
        if !state.holds(identifier) {
            return None;
        }

        let fresh = !state.is_stale && !is_stale(state.last_fetch, now, self.inner.ttl);
        if fresh || state.is_revalidating {
            tracing::trace!(identifier, fresh, "Serving catalog from memory");
            return state.current_document.clone();
        }
        None
    }

    fn serve_persisted(&self, identifier: &str) -> Option<Arc<CatalogDocument>> {
        let entry = self.inner.store.load(identifier)?;
        let stale = is_stale(Some(entry.fetched_at), self.inner.clock.now(), self.inner.ttl);
        let document = Arc::new(entry.document);

        tracing::debug!(
            identifier,
            stale,
            fetched_at = %entry.fetched_at,
            "Serving catalog from cache, refreshing in background"
        );

        self.inner.state.send_modify(|s| {
            s.current_document = Some(Arc::clone(&document));
            s.last_fetch = Some(entry.fetched_at);
            s.is_stale = stale;
            s.is_loading = false;
            s.is_revalidating = true;
        });
        self.spawn_revalidation(identifier.to_string());

        Some(document)
    }

    async fn fetch_foreground(&self, identifier: &str) -> Result<Arc<CatalogDocument>, FetchError> {
        match self.inner.fetcher.fetch_catalog(identifier).await {
            Ok(document) => {
                let fetched_at = self.inner.clock.now();
                let document = Arc::new(document);
                let applied = self.inner.apply_fetched(identifier, &document, fetched_at);
                self.inner.store.save(identifier, &document, fetched_at);
                self.inner.finish_loading(identifier);

                tracing::debug!(identifier, applied, "Fetched catalog");
                Ok(document)
            }
            Err(err) => {
                tracing::warn!(identifier, error = %err, "Catalog fetch failed");
                let fallback = self.inner.store.load(identifier);

                self.inner.state.send_if_modified(|s| {
                    if s.current_identifier.as_deref() != Some(identifier) {
                        return false;
                    }
                    s.is_loading = false;
                    s.last_error = Some(err.clone());
                    match fallback {
                        Some(entry) => {
                            s.current_document = Some(Arc::new(entry.document));
                            s.last_fetch = Some(entry.fetched_at);
                            s.is_stale = true;
                        }
                        // An in-memory copy of this catalog is still a fallback
                        None if s.current_document.is_some() => s.is_stale = true,
                        None => {}
                    }
                    true
                });

                Err(err)
            }
        }
    }

    /// Fire-and-forget refresh; dropped if the caller has moved on
    fn spawn_revalidation(&self, identifier: String) {
        let inner = Arc::clone(&self.inner);

        tokio::spawn(async move {
            match inner.fetcher.fetch_catalog(&identifier).await {
                Ok(document) => {
                    let fetched_at = inner.clock.now();
                    let document = Arc::new(document);
                    if inner.apply_fetched(&identifier, &document, fetched_at) {
                        inner.store.save(&identifier, &document, fetched_at);
                        tracing::debug!(identifier = %identifier, "Background catalog refresh applied");
                    } else {
                        tracing::debug!(
                            identifier = %identifier,
                            "Discarding background refresh for a catalog no longer shown"
                        );
                    }
                }
                Err(err) => {
                    tracing::warn!(
                        identifier = %identifier,
                        error = %err,
                        "Background catalog refresh failed"
                    );
                    inner.state.send_if_modified(|s| {
                        let current = s.current_identifier.as_deref() == Some(identifier.as_str());
                        let changed = current && s.is_revalidating;
                        if changed {
                            s.is_revalidating = false;
                        }
                        changed
                    });
                }
            }
        });
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Catalog list
    // ─────────────────────────────────────────────────────────────────────────

    /// Get metadata for every catalog; held in memory only
    pub async fn request_catalog_list(
        &self,
        force_refresh: bool,
    ) -> Result<Vec<CatalogMetadata>, FetchError> {
        if !force_refresh {
            let now = self.inner.clock.now();
            let state = self.inner.state.borrow();
            if state.has_catalog_list() && !is_stale(state.list.fetched_at, now, self.inner.ttl) {
                return Ok(state.list.catalogs.clone());
            }
        }

        self.inner.state.send_modify(|s| {
            s.list.is_loading = true;
            s.list.error = None;
        });

        let result = self.inner.fetcher.fetch_catalog_list().await;
        let fetched_at = self.inner.clock.now();

        self.inner.state.send_modify(|s| {
            s.list.is_loading = false;
            match &result {
                Ok(catalogs) => {
                    s.list.catalogs = catalogs.clone();
                    s.list.fetched_at = Some(fetched_at);
                }
                Err(err) => s.list.error = Some(err.clone()),
            }
        });

        if let Err(err) = &result {
            tracing::warn!(error = %err, "Catalog list fetch failed");
        }
        result
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Reset
    // ─────────────────────────────────────────────────────────────────────────

    /// Forget the current catalog; the persisted slot is left alone.
    /// A fetch still in flight settles without touching the state.
    pub fn clear_current_catalog(&self) {
        self.inner.state.send_modify(|s| {
            s.current_document = None;
            s.current_identifier = None;
            s.is_loading = false;
            s.last_error = None;
            s.last_fetch = None;
            s.is_stale = false;
            s.is_revalidating = false;
        });
    }

    /// Empty the persisted slot; the next request goes past memory
    pub fn clear_cache(&self) {
        self.inner.store.clear();
        self.inner.state.send_modify(|s| s.last_fetch = None);
    }
}

impl Inner {
    /// Clear `is_loading` unless a request for another catalog owns it now
    fn finish_loading(&self, identifier: &str) {
        self.state.send_if_modified(|s| {
            let mine = s.current_identifier.as_deref() == Some(identifier);
            let changed = mine && s.is_loading;
            if changed {
                s.is_loading = false;
            }
            changed
        });
    }

    /// Install a fetched document if `identifier` is still the one of interest
    fn apply_fetched(
        &self,
        identifier: &str,
        document: &Arc<CatalogDocument>,
        fetched_at: DateTime<Utc>,
    ) -> bool {
        self.state.send_if_modified(|s| {
            if s.current_identifier.as_deref() != Some(identifier) {
                return false;
            }
            s.current_document = Some(Arc::clone(document));
            s.last_fetch = Some(fetched_at);
            s.is_stale = false;
            s.is_revalidating = false;
            true
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, VecDeque};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::TimeZone;
    use tokio::sync::Notify;

    use super::*;
    use crate::cache::{CacheEntry, MemorySlotStore};
    use crate::sync::{ManualClock, SyncPhase};

    /// Scripted fetcher; unscripted calls fail with a network error
    #[derive(Default)]
    struct FakeFetcher {
        catalogs: Mutex<HashMap<String, VecDeque<Result<CatalogDocument, FetchError>>>>,
        lists: Mutex<VecDeque<Result<Vec<CatalogMetadata>, FetchError>>>,
        gates: Mutex<HashMap<String, Arc<Notify>>>,
        calls: AtomicUsize,
        list_calls: AtomicUsize,
    }

    impl FakeFetcher {
        fn respond(&self, identifier: &str, result: Result<CatalogDocument, FetchError>) {
            self.catalogs
                .lock()
                .unwrap()
                .entry(identifier.to_string())
                .or_default()
                .push_back(result);
        }

        fn respond_list(&self, result: Result<Vec<CatalogMetadata>, FetchError>) {
            self.lists.lock().unwrap().push_back(result);
        }

        /// Hold fetches for `identifier` until the returned handle is notified
        fn gate(&self, identifier: &str) -> Arc<Notify> {
            let gate = Arc::new(Notify::new());
            self.gates
                .lock()
                .unwrap()
                .insert(identifier.to_string(), Arc::clone(&gate));
            gate
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn list_calls(&self) -> usize {
            self.list_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CatalogFetcher for FakeFetcher {
        async fn fetch_catalog(&self, identifier: &str) -> Result<CatalogDocument, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let gate = self.gates.lock().unwrap().get(identifier).cloned();
            if let Some(gate) = gate {
                gate.notified().await;
            }
            self.catalogs
                .lock()
                .unwrap()
                .get_mut(identifier)
                .and_then(|q| q.pop_front())
                .unwrap_or_else(|| Err(FetchError::Network("unscripted".into())))
        }

        async fn fetch_catalog_list(&self) -> Result<Vec<CatalogMetadata>, FetchError> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            self.lists
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(FetchError::Network("unscripted".into())))
        }
    }

    struct Harness {
        sync: CatalogSync,
        fetcher: Arc<FakeFetcher>,
        store: Arc<MemorySlotStore>,
        clock: ManualClock,
    }

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn harness_with(store: MemorySlotStore) -> Harness {
        let fetcher = Arc::new(FakeFetcher::default());
        let store = Arc::new(store);
        let clock = ManualClock::new(start());
        let sync = CatalogSync::with_options(
            fetcher.clone(),
            store.clone(),
            SyncOptions {
                ttl: Duration::hours(1),
                clock: Arc::new(clock.clone()),
            },
        );
        Harness {
            sync,
            fetcher,
            store,
            clock,
        }
    }

    fn harness() -> Harness {
        harness_with(MemorySlotStore::new())
    }

    fn document(identifier: &str, name: &str) -> CatalogDocument {
        CatalogDocument {
            id: format!("id-{identifier}"),
            identifier: identifier.to_string(),
            name: name.to_string(),
            sections: vec![],
        }
    }

    fn cached(identifier: &str, name: &str, age: Duration) -> MemorySlotStore {
        MemorySlotStore::with_entry(CacheEntry {
            identifier: identifier.to_string(),
            document: document(identifier, name),
            fetched_at: start() - age,
        })
    }

    /// Let spawned tasks on the current-thread runtime run to completion
    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Foreground Fetch Tests
    // ─────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_miss_fetches_and_persists() {
        let h = harness();
        h.fetcher.respond("atlas", Ok(document("atlas", "Atlas Kitchen")));

        let doc = h.sync.request_catalog("atlas", false).await.unwrap();

        assert_eq!(doc.name, "Atlas Kitchen");
        assert_eq!(h.fetcher.calls(), 1);
        let state = h.sync.snapshot();
        assert_eq!(state.phase(), SyncPhase::Fresh);
        assert_eq!(state.last_fetch, Some(start()));
        assert!(!state.is_loading);
        let entry = h.store.peek().unwrap();
        assert_eq!(entry.identifier, "atlas");
        assert_eq!(entry.fetched_at, start());
    }

    #[tokio::test]
    async fn test_fresh_in_memory_skips_network_and_store() {
        let h = harness();
        h.fetcher.respond("atlas", Ok(document("atlas", "Atlas Kitchen")));
        let first = h.sync.request_catalog("atlas", false).await.unwrap();
        let loads = h.store.loads();

        h.clock.advance(Duration::minutes(30));
        let second = h.sync.request_catalog("atlas", false).await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(h.fetcher.calls(), 1);
        assert_eq!(h.store.loads(), loads);
    }

    #[tokio::test]
    async fn test_force_refresh_bypasses_memory_and_store() {
        let h = harness();
        h.fetcher.respond("atlas", Ok(document("atlas", "v1")));
        h.fetcher.respond("atlas", Ok(document("atlas", "v2")));
        h.sync.request_catalog("atlas", false).await.unwrap();
        let loads = h.store.loads();

        let doc = h.sync.request_catalog("atlas", true).await.unwrap();

        assert_eq!(doc.name, "v2");
        assert_eq!(h.fetcher.calls(), 2);
        assert_eq!(h.store.loads(), loads);
        assert_eq!(h.store.peek().unwrap().document.name, "v2");
    }

    #[tokio::test]
    async fn test_server_error_without_cache_leaves_no_document() {
        let h = harness();
        h.fetcher
            .respond("atlas", Err(FetchError::from_status(500, "Internal Server Error")));

        let err = h.sync.request_catalog("atlas", false).await.unwrap_err();

        assert!(matches!(err, FetchError::Server { status: 500, .. }));
        let state = h.sync.snapshot();
        assert!(state.current_document.is_none());
        assert!(!h.sync.is_loading_catalog());
        assert_eq!(h.sync.catalog_error(), Some(err));
        assert_eq!(state.phase(), SyncPhase::ErrorNoData);
    }

    #[tokio::test]
    async fn test_failure_falls_back_to_cache_and_still_errors() {
        let h = harness_with(cached("atlas", "Cached Atlas", Duration::minutes(10)));
        h.fetcher.respond("atlas", Err(FetchError::Timeout("10s".into())));

        let err = h.sync.request_catalog("atlas", true).await.unwrap_err();

        assert!(matches!(err, FetchError::Timeout(_)));
        let state = h.sync.snapshot();
        assert_eq!(state.current_document.as_ref().unwrap().name, "Cached Atlas");
        assert!(state.is_stale);
        assert!(!state.is_loading);
        assert_eq!(state.phase(), SyncPhase::ErrorWithFallback);
    }

    #[tokio::test]
    async fn test_fallback_is_not_served_from_memory_next_time() {
        let h = harness_with(cached("atlas", "Cached Atlas", Duration::minutes(10)));
        h.fetcher.respond("atlas", Err(FetchError::Network("reset".into())));
        h.sync.request_catalog("atlas", true).await.unwrap_err();

        h.fetcher.respond("atlas", Ok(document("atlas", "Live Atlas")));
        let doc = h.sync.request_catalog("atlas", false).await.unwrap();

        // Served from the slot again, with a refresh behind it
        assert_eq!(doc.name, "Cached Atlas");
        assert!(h.sync.catalog_error().is_none());
        h.sync.revalidated().await;
        assert_eq!(h.sync.snapshot().phase(), SyncPhase::Fresh);
        assert_eq!(h.fetcher.calls(), 2);
    }

    #[tokio::test]
    async fn test_failure_for_new_identifier_drops_previous_document() {
        let h = harness();
        h.fetcher.respond("atlas", Ok(document("atlas", "Atlas")));
        h.sync.request_catalog("atlas", false).await.unwrap();
        h.fetcher.respond("harbor", Err(FetchError::from_status(404, "")));

        h.sync.request_catalog("harbor", false).await.unwrap_err();

        let state = h.sync.snapshot();
        assert_eq!(state.current_identifier.as_deref(), Some("harbor"));
        assert!(state.current_document.is_none());
        assert_eq!(state.phase(), SyncPhase::ErrorNoData);
    }

    #[tokio::test]
    async fn test_cache_for_other_identifier_is_miss() {
        let h = harness_with(cached("harbor", "Harbor", Duration::minutes(5)));
        h.fetcher.respond("atlas", Err(FetchError::Network("down".into())));

        h.sync.request_catalog("atlas", false).await.unwrap_err();

        assert!(h.sync.snapshot().current_document.is_none());
        assert_eq!(h.fetcher.calls(), 1);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Stale-While-Revalidate Tests
    // ─────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_stale_cache_served_then_refreshed() {
        let h = harness_with(cached("atlas-kitchen-2024", "Old Menu", Duration::hours(2)));
        h.fetcher
            .respond("atlas-kitchen-2024", Ok(document("atlas-kitchen-2024", "New Menu")));

        let returned = h.sync.request_catalog("atlas-kitchen-2024", false).await.unwrap();

        assert_eq!(returned.name, "Old Menu");
        assert!(h.sync.is_stale());
        assert_eq!(h.sync.snapshot().phase(), SyncPhase::StaleDisplayed);

        h.sync.revalidated().await;

        let state = h.sync.snapshot();
        assert_eq!(returned.name, "Old Menu");
        assert_eq!(state.current_document.as_ref().unwrap().name, "New Menu");
        assert!(!state.is_stale);
        assert_eq!(state.last_fetch, Some(start()));
        assert_eq!(h.store.peek().unwrap().document.name, "New Menu");
        assert_eq!(h.fetcher.calls(), 1);

        h.clock.advance(Duration::minutes(59));
        let again = h.sync.request_catalog("atlas-kitchen-2024", false).await.unwrap();
        assert_eq!(again.name, "New Menu");
        assert_eq!(h.fetcher.calls(), 1);
        assert!(!h.sync.is_stale());
    }

    #[tokio::test]
    async fn test_fresh_cache_hit_still_revalidates() {
        let h = harness_with(cached("atlas", "Cached", Duration::minutes(5)));
        h.fetcher.respond("atlas", Ok(document("atlas", "Live")));

        let returned = h.sync.request_catalog("atlas", false).await.unwrap();

        assert_eq!(returned.name, "Cached");
        assert!(!h.sync.is_stale());
        h.sync.revalidated().await;
        assert_eq!(h.sync.snapshot().current_document.unwrap().name, "Live");
    }

    #[tokio::test]
    async fn test_background_failure_is_silent() {
        let h = harness_with(cached("atlas", "Cached", Duration::hours(2)));
        h.fetcher.respond("atlas", Err(FetchError::from_status(502, "Bad Gateway")));

        let returned = h.sync.request_catalog("atlas", false).await.unwrap();
        h.sync.revalidated().await;

        let state = h.sync.snapshot();
        assert_eq!(returned.name, "Cached");
        assert!(state.last_error.is_none());
        assert!(state.is_stale);
        assert!(!state.is_revalidating);
        assert_eq!(state.current_document.unwrap().name, "Cached");
        assert_eq!(h.store.saves(), 0);
    }

    #[tokio::test]
    async fn test_repeat_request_while_revalidating_does_not_refetch() {
        let h = harness_with(cached("atlas", "Cached", Duration::hours(2)));
        let gate = h.fetcher.gate("atlas");
        h.fetcher.respond("atlas", Ok(document("atlas", "Live")));

        h.sync.request_catalog("atlas", false).await.unwrap();
        settle().await;
        let loads = h.store.loads();
        let again = h.sync.request_catalog("atlas", false).await.unwrap();

        assert_eq!(again.name, "Cached");
        assert_eq!(h.fetcher.calls(), 1);
        assert_eq!(h.store.loads(), loads);

        gate.notify_one();
        h.sync.revalidated().await;
        assert_eq!(h.sync.snapshot().current_document.unwrap().name, "Live");
    }

    #[tokio::test]
    async fn test_superseded_background_result_is_discarded() {
        let h = harness_with(cached("atlas", "Cached Atlas", Duration::hours(2)));
        let gate = h.fetcher.gate("atlas");
        h.fetcher.respond("atlas", Ok(document("atlas", "Live Atlas")));
        h.fetcher.respond("harbor", Ok(document("harbor", "Harbor")));

        h.sync.request_catalog("atlas", false).await.unwrap();
        h.sync.request_catalog("harbor", false).await.unwrap();

        gate.notify_one();
        settle().await;

        let state = h.sync.snapshot();
        assert_eq!(state.current_identifier.as_deref(), Some("harbor"));
        assert_eq!(state.current_document.unwrap().name, "Harbor");
        assert_eq!(h.store.peek().unwrap().identifier, "harbor");
        assert_eq!(h.fetcher.calls(), 2);
    }

    #[tokio::test]
    async fn test_subscribers_see_changes() {
        let h = harness();
        let mut rx = h.sync.subscribe();
        h.fetcher.respond("atlas", Ok(document("atlas", "Atlas")));

        h.sync.request_catalog("atlas", false).await.unwrap();

        assert!(rx.has_changed().unwrap());
        let state = rx.borrow_and_update().clone();
        assert_eq!(state.current_identifier.as_deref(), Some("atlas"));
        assert!(state.has_current_catalog());
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Staleness In Memory Tests
    // ─────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_memory_past_ttl_goes_to_store() {
        let h = harness();
        h.fetcher.respond("atlas", Ok(document("atlas", "v1")));
        h.fetcher.respond("atlas", Ok(document("atlas", "v2")));
        h.sync.request_catalog("atlas", false).await.unwrap();

        h.clock.advance(Duration::hours(1) + Duration::seconds(1));
        let doc = h.sync.request_catalog("atlas", false).await.unwrap();

        // Persisted copy is served while the refresh runs
        assert_eq!(doc.name, "v1");
        assert!(h.sync.is_stale());
        h.sync.revalidated().await;
        assert_eq!(h.sync.snapshot().current_document.unwrap().name, "v2");
        assert_eq!(h.fetcher.calls(), 2);
    }

    #[tokio::test]
    async fn test_memory_at_exactly_ttl_is_fresh() {
        let h = harness();
        h.fetcher.respond("atlas", Ok(document("atlas", "v1")));
        h.sync.request_catalog("atlas", false).await.unwrap();

        h.clock.advance(Duration::hours(1));
        h.sync.request_catalog("atlas", false).await.unwrap();

        assert_eq!(h.fetcher.calls(), 1);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Catalog List Tests
    // ─────────────────────────────────────────────────────────────────────────

    fn metadata(identifier: &str) -> CatalogMetadata {
        CatalogMetadata {
            id: format!("id-{identifier}"),
            identifier: identifier.to_string(),
            name: identifier.to_uppercase(),
        }
    }

    #[tokio::test]
    async fn test_list_is_cached_in_memory() {
        let h = harness();
        h.fetcher.respond_list(Ok(vec![metadata("atlas"), metadata("harbor")]));

        let first = h.sync.request_catalog_list(false).await.unwrap();
        let second = h.sync.request_catalog_list(false).await.unwrap();

        assert_eq!(first.len(), 2);
        assert_eq!(first, second);
        assert_eq!(h.fetcher.list_calls(), 1);
        assert!(h.sync.snapshot().has_catalog_list());
    }

    #[tokio::test]
    async fn test_empty_list_counts_as_present() {
        let h = harness();
        h.fetcher.respond_list(Ok(vec![]));

        h.sync.request_catalog_list(false).await.unwrap();
        h.sync.request_catalog_list(false).await.unwrap();

        assert_eq!(h.fetcher.list_calls(), 1);
    }

    #[tokio::test]
    async fn test_list_failure_keeps_previous_list() {
        let h = harness();
        h.fetcher.respond_list(Ok(vec![metadata("atlas")]));
        h.fetcher
            .respond_list(Err(FetchError::from_status(503, "Service Unavailable")));
        h.sync.request_catalog_list(false).await.unwrap();

        let err = h.sync.request_catalog_list(true).await.unwrap_err();

        assert!(matches!(err, FetchError::Server { status: 503, .. }));
        let state = h.sync.snapshot();
        assert_eq!(state.list.catalogs, vec![metadata("atlas")]);
        assert_eq!(state.list_error(), Some(&err));
        assert!(!state.is_list_loading());
    }

    #[tokio::test]
    async fn test_stale_list_is_refetched() {
        let h = harness();
        h.fetcher.respond_list(Ok(vec![metadata("atlas")]));
        h.fetcher
            .respond_list(Ok(vec![metadata("atlas"), metadata("harbor")]));
        h.sync.request_catalog_list(false).await.unwrap();

        h.clock.advance(Duration::hours(2));
        let list = h.sync.request_catalog_list(false).await.unwrap();

        assert_eq!(list.len(), 2);
        assert_eq!(h.fetcher.list_calls(), 2);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Reset Tests
    // ─────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_clear_current_catalog() {
        let h = harness();
        h.fetcher.respond("atlas", Ok(document("atlas", "Atlas")));
        h.sync.request_catalog("atlas", false).await.unwrap();

        h.sync.clear_current_catalog();

        let state = h.sync.snapshot();
        assert_eq!(state.phase(), SyncPhase::Idle);
        assert!(state.current_identifier.is_none());
        assert!(h.store.peek().is_some());
    }

    #[tokio::test]
    async fn test_clear_during_fetch_settles_idle() {
        let h = harness();
        let gate = h.fetcher.gate("atlas");
        h.fetcher.respond("atlas", Ok(document("atlas", "Atlas")));

        let sync = h.sync.clone();
        let request = tokio::spawn(async move { sync.request_catalog("atlas", false).await });
        settle().await;
        assert!(h.sync.is_loading_catalog());

        h.sync.clear_current_catalog();
        gate.notify_one();
        request.await.unwrap().unwrap();

        let state = h.sync.snapshot();
        assert!(!state.is_loading);
        assert!(state.current_document.is_none());
        assert_eq!(state.phase(), SyncPhase::Idle);
    }

    #[tokio::test]
    async fn test_clear_during_failing_fetch_settles_idle() {
        let h = harness();
        let gate = h.fetcher.gate("atlas");
        h.fetcher
            .respond("atlas", Err(FetchError::from_status(500, "Internal Server Error")));

        let sync = h.sync.clone();
        let request = tokio::spawn(async move { sync.request_catalog("atlas", false).await });
        settle().await;

        h.sync.clear_current_catalog();
        gate.notify_one();
        request.await.unwrap().unwrap_err();

        let state = h.sync.snapshot();
        assert!(!state.is_loading);
        assert!(state.last_error.is_none());
        assert_eq!(state.phase(), SyncPhase::Idle);
    }

    #[tokio::test]
    async fn test_clear_cache_forces_network_next_time() {
        let h = harness();
        h.fetcher.respond("atlas", Ok(document("atlas", "v1")));
        h.fetcher.respond("atlas", Ok(document("atlas", "v2")));
        h.sync.request_catalog("atlas", false).await.unwrap();

        h.sync.clear_cache();
        let doc = h.sync.request_catalog("atlas", false).await.unwrap();

        assert_eq!(doc.name, "v2");
        assert_eq!(h.fetcher.calls(), 2);
    }
}

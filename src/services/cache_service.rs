use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::dto::user_dto::{UpdateUserPayload, UsersQueryParams, UsersResponse};
use crate::error::Result;
use crate::models::user::User;
use crate::services::ui_store::UiStore;
use crate::services::user_service::UsersApi;
use crate::utils::validation::validate_update;

#[derive(Debug, Clone, Copy)]
pub struct CacheOptions {
    /// Age after which an entry is served but refetched in the background.
    pub stale_time: Duration,
    /// Entries untouched for this long are evicted (the active one never is).
    pub gc_time: Duration,
    /// Extra attempts for a failed query. Updates are never retried.
    pub retry: u32,
    pub retry_delay: Duration,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            stale_time: Duration::from_secs(30),
            gc_time: Duration::from_secs(300),
            retry: 2,
            retry_delay: Duration::from_secs(1),
        }
    }
}

impl From<&Config> for CacheOptions {
    fn from(config: &Config) -> Self {
        Self {
            stale_time: config.stale_time(),
            gc_time: config.cache_gc_time(),
            retry: config.query_retry,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    data: UsersResponse,
    updated_at: Instant,
    last_accessed: Instant,
    invalidated: bool,
    generation: u64,
}

#[derive(Debug, Clone)]
struct FailedQuery {
    message: String,
    failed_at: Instant,
}

#[derive(Debug, Clone)]
struct SavedEntry {
    params: UsersQueryParams,
    generation: u64,
    data: UsersResponse,
}

/// An optimistic write whose backend update has not settled yet.
#[derive(Debug)]
struct PendingWrite {
    seq: u64,
    user_id: String,
    payload: UpdateUserPayload,
    /// Pre-write copies of every entry the payload was merged into,
    /// including results that landed while the update was running.
    saved: Vec<SavedEntry>,
}

#[derive(Debug, Default)]
struct QueryCache {
    entries: HashMap<UsersQueryParams, CacheEntry>,
    in_flight: HashMap<UsersQueryParams, usize>,
    errors: HashMap<UsersQueryParams, FailedQuery>,
    pending: Vec<PendingWrite>,
    /// Last params whose data was shown; served while new params load.
    placeholder: Option<UsersQueryParams>,
    /// Bumped by every optimistic write and invalidation.
    epoch: u64,
    next_generation: u64,
    next_write: u64,
}

impl QueryCache {
    fn is_stale(&self, entry: &CacheEntry, stale_time: Duration) -> bool {
        entry.invalidated || entry.updated_at.elapsed() >= stale_time
    }

    fn sweep(&mut self, active: &UsersQueryParams, gc_time: Duration) {
        let in_flight = &self.in_flight;
        let placeholder = self.placeholder.as_ref();
        let before = self.entries.len();
        self.entries.retain(|params, entry| {
            params == active
                || Some(params) == placeholder
                || in_flight.contains_key(params)
                || entry.last_accessed.elapsed() < gc_time
        });
        let evicted = before - self.entries.len();
        if evicted > 0 {
            debug!(evicted, "evicted unused cache entries");
        }
        self.errors.retain(|params, _| params == active);
    }

    fn take_pending(&mut self, seq: u64) -> Option<PendingWrite> {
        let idx = self.pending.iter().position(|w| w.seq == seq)?;
        Some(self.pending.remove(idx))
    }
}

/// Merges `payload` into the copies of record `id` held by `entry` and
/// returns the entry as it was before, or `None` if the record is absent.
fn merge_into_entry(
    params: &UsersQueryParams,
    entry: &mut CacheEntry,
    id: &str,
    payload: &UpdateUserPayload,
) -> Option<SavedEntry> {
    if !entry.data.users.iter().any(|u| u.id == id) {
        return None;
    }
    let saved = SavedEntry {
        params: params.clone(),
        generation: entry.generation,
        data: entry.data.clone(),
    };
    for user in entry.data.users.iter_mut().filter(|u| u.id == id) {
        payload.apply_to(user);
    }
    Some(saved)
}

/// What the presentation layer should render right now.
#[derive(Debug, Clone, PartialEq)]
pub struct UsersView {
    pub params: UsersQueryParams,
    pub data: Option<UsersResponse>,
    /// `data` belongs to the previously shown params.
    pub is_placeholder: bool,
    /// Nothing to show yet.
    pub is_loading: bool,
    pub is_fetching: bool,
    pub is_stale: bool,
    pub error: Option<String>,
}

/// Handle to one unsettled optimistic write, consumed by `settle` or
/// `rollback`.
#[derive(Debug)]
pub struct CacheSnapshot {
    seq: u64,
    user_id: String,
}

/// Data-fetch layer: caches query results by their full parameter tuple and
/// reconciles optimistic edits against the backend.
#[derive(Clone)]
pub struct UsersQueryClient {
    api: Arc<dyn UsersApi>,
    ui: UiStore,
    cache: Arc<Mutex<QueryCache>>,
    update_locks: Arc<Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>>,
    events: Arc<watch::Sender<u64>>,
    options: CacheOptions,
}

impl std::fmt::Debug for UsersQueryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UsersQueryClient")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl UsersQueryClient {
    pub fn new(api: Arc<dyn UsersApi>, ui: UiStore, options: CacheOptions) -> Self {
        Self {
            api,
            ui,
            cache: Arc::new(Mutex::new(QueryCache::default())),
            update_locks: Arc::new(Mutex::new(HashMap::new())),
            events: Arc::new(watch::channel(0).0),
            options,
        }
    }

    /// Ticks whenever cached data changes.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.events.subscribe()
    }

    fn notify(&self) {
        self.events.send_modify(|tick| *tick = tick.wrapping_add(1));
    }

    pub fn options(&self) -> CacheOptions {
        self.options
    }

    pub fn params(&self) -> UsersQueryParams {
        self.ui.query_params()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, QueryCache> {
        self.cache.lock().expect("query cache mutex poisoned")
    }

    /// Current view for the active params. Missing or stale data triggers a
    /// background fetch; while it runs the previous result is served.
    pub fn view(&self) -> UsersView {
        let params = self.params();
        let mut cache = self.lock();
        cache.sweep(&params, self.options.gc_time);

        let (mut error, retry_error) = match cache.errors.get(&params) {
            Some(failed) => (
                Some(failed.message.clone()),
                failed.failed_at.elapsed() >= self.options.stale_time,
            ),
            None => (None, true),
        };
        let mut is_fetching = cache.in_flight.contains_key(&params);

        let (data, is_placeholder, needs_fetch, is_stale) = match cache.entries.get(&params) {
            Some(entry) => {
                let stale = cache.is_stale(entry, self.options.stale_time);
                (Some(entry.data.clone()), false, stale, stale)
            }
            None => {
                let previous = cache
                    .placeholder
                    .as_ref()
                    .and_then(|p| cache.entries.get(p))
                    .map(|e| e.data.clone());
                let placeholder = previous.is_some();
                (previous, placeholder, true, false)
            }
        };

        if !is_placeholder && data.is_some() {
            if let Some(entry) = cache.entries.get_mut(&params) {
                entry.last_accessed = Instant::now();
            }
            cache.placeholder = Some(params.clone());
        }

        // a failed query is retried on access once it is as old as stale data
        let should_fetch = needs_fetch && !is_fetching && retry_error;
        let epoch = should_fetch.then(|| Self::begin_fetch(&mut cache, &params));
        drop(cache);

        if let Some(epoch) = epoch {
            is_fetching = true;
            error = None;
            self.spawn_fetch(params.clone(), epoch);
        }

        UsersView {
            is_loading: data.is_none() && error.is_none(),
            params,
            data,
            is_placeholder,
            is_fetching,
            is_stale,
            error,
        }
    }

    /// Result for the active params: fresh cache if available, otherwise a
    /// backend round trip.
    pub async fn load(&self) -> Result<UsersResponse> {
        let params = self.params();
        {
            let mut cache = self.lock();
            cache.sweep(&params, self.options.gc_time);
            let stale_time = self.options.stale_time;
            let fresh = cache
                .entries
                .get(&params)
                .filter(|entry| !cache.is_stale(entry, stale_time))
                .is_some();
            if fresh {
                cache.placeholder = Some(params.clone());
                if let Some(entry) = cache.entries.get_mut(&params) {
                    entry.last_accessed = Instant::now();
                    debug!(page = params.page, search = %params.search, "users served from cache");
                    return Ok(entry.data.clone());
                }
            }
        }

        let data = self.fetch(params.clone()).await?;
        if self.params() == params {
            self.lock().placeholder = Some(params);
        }
        Ok(data)
    }

    /// Fetch the active params regardless of freshness.
    pub async fn refetch(&self) -> Result<UsersResponse> {
        self.fetch(self.params()).await
    }

    pub async fn fetch(&self, params: UsersQueryParams) -> Result<UsersResponse> {
        let epoch = Self::begin_fetch(&mut self.lock(), &params);
        let result = self.query_with_retry(&params).await;
        self.finish_fetch(params, epoch, &result);
        result
    }

    fn begin_fetch(cache: &mut QueryCache, params: &UsersQueryParams) -> u64 {
        *cache.in_flight.entry(params.clone()).or_insert(0) += 1;
        cache.errors.remove(params);
        cache.epoch
    }

    fn spawn_fetch(&self, params: UsersQueryParams, epoch: u64) {
        let client = self.clone();
        tokio::spawn(async move {
            let result = client.query_with_retry(&params).await;
            client.finish_fetch(params, epoch, &result);
        });
    }

    async fn query_with_retry(&self, params: &UsersQueryParams) -> Result<UsersResponse> {
        let mut attempt = 0;
        loop {
            info!(
                page = params.page,
                limit = params.limit,
                search = %params.search,
                sort = %params.sort_field,
                attempt,
                "fetching users"
            );
            match self.api.query(params.clone()).await {
                Ok(data) => return Ok(data),
                Err(e) if attempt < self.options.retry => {
                    warn!(error = %e, attempt, "users query failed, retrying");
                    let backoff = self.options.retry_delay * 2u32.saturating_pow(attempt);
                    if !backoff.is_zero() {
                        tokio::time::sleep(backoff.min(Duration::from_secs(30))).await;
                    }
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Writes only the slot for `params`. A result that raced with an
    /// optimistic write or invalidation never replaces cached data; it only
    /// fills an empty slot, marked stale. Unsettled optimistic writes are
    /// merged into whatever lands.
    fn finish_fetch(&self, params: UsersQueryParams, epoch: u64, result: &Result<UsersResponse>) {
        let mut guard = self.lock();
        let cache = &mut *guard;
        if let Some(count) = cache.in_flight.get_mut(&params) {
            *count -= 1;
            if *count == 0 {
                cache.in_flight.remove(&params);
            }
        }

        match result {
            Ok(data) => {
                cache.errors.remove(&params);
                let outdated = cache.epoch != epoch;
                if outdated && cache.entries.contains_key(&params) {
                    if let Some(entry) = cache.entries.get_mut(&params) {
                        entry.invalidated = true;
                    }
                    debug!(page = params.page, "discarded users result that raced a write");
                } else {
                    Self::store_result(cache, params, data.clone(), outdated);
                }
            }
            Err(e) => {
                warn!(error = %e, page = params.page, "users query failed");
                cache.errors.insert(
                    params,
                    FailedQuery {
                        message: e.to_string(),
                        failed_at: Instant::now(),
                    },
                );
            }
        }
        drop(guard);
        self.notify();
    }

    fn store_result(
        cache: &mut QueryCache,
        params: UsersQueryParams,
        data: UsersResponse,
        outdated: bool,
    ) {
        let now = Instant::now();
        cache.next_generation += 1;
        let mut entry = CacheEntry {
            data,
            updated_at: now,
            last_accessed: now,
            invalidated: outdated,
            generation: cache.next_generation,
        };
        for write in cache.pending.iter_mut() {
            if let Some(saved) = merge_into_entry(&params, &mut entry, &write.user_id, &write.payload)
            {
                write.saved.push(saved);
            }
        }
        cache.entries.insert(params, entry);
    }

    pub fn cached(&self, params: &UsersQueryParams) -> Option<UsersResponse> {
        self.lock().entries.get(params).map(|e| e.data.clone())
    }

    pub fn cached_results(&self) -> HashMap<UsersQueryParams, UsersResponse> {
        self.lock()
            .entries
            .iter()
            .map(|(params, entry)| (params.clone(), entry.data.clone()))
            .collect()
    }

    pub fn is_stale(&self, params: &UsersQueryParams) -> bool {
        let cache = self.lock();
        cache
            .entries
            .get(params)
            .map_or(true, |entry| cache.is_stale(entry, self.options.stale_time))
    }

    /// Mark every entry stale and refetch the active one in the background.
    pub fn invalidate_all(&self) {
        let params = self.params();
        let mut cache = self.lock();
        cache.epoch += 1;
        for entry in cache.entries.values_mut() {
            entry.invalidated = true;
        }
        info!(entries = cache.entries.len(), "users cache invalidated");

        // results already in flight predate the invalidation and are discarded
        let refetch = cache.entries.contains_key(&params);
        let epoch = refetch.then(|| Self::begin_fetch(&mut cache, &params));
        drop(cache);

        self.notify();
        if let Some(epoch) = epoch {
            self.spawn_fetch(params, epoch);
        }
    }

    /// Merge `payload` into every cached copy of record `id`, and into any
    /// result for it that lands before the write settles.
    pub fn apply_optimistic(&self, id: &str, payload: &UpdateUserPayload) -> CacheSnapshot {
        let mut guard = self.lock();
        let cache = &mut *guard;
        cache.epoch += 1;
        cache.next_write += 1;
        let seq = cache.next_write;

        let saved: Vec<SavedEntry> = cache
            .entries
            .iter_mut()
            .filter_map(|(params, entry)| merge_into_entry(params, entry, id, payload))
            .collect();
        info!(user_id = %id, entries = saved.len(), "optimistic update applied");

        cache.pending.push(PendingWrite {
            seq,
            user_id: id.to_string(),
            payload: payload.clone(),
            saved,
        });
        drop(guard);

        self.notify();
        CacheSnapshot {
            seq,
            user_id: id.to_string(),
        }
    }

    /// Restore the pre-write copies of the snapshot's record. Only entries
    /// whose contents are still the ones the write was merged into are
    /// touched, and only that record in them.
    pub fn rollback(&self, snapshot: CacheSnapshot) {
        let mut cache = self.lock();
        let Some(write) = cache.take_pending(snapshot.seq) else {
            return;
        };

        let mut restored = 0;
        for saved in write.saved {
            let Some(entry) = cache.entries.get_mut(&saved.params) else {
                continue;
            };
            if entry.generation != saved.generation {
                continue;
            }
            for (idx, original) in saved.data.users.iter().enumerate() {
                if original.id != write.user_id {
                    continue;
                }
                if let Some(slot) = entry.data.users.get_mut(idx) {
                    *slot = original.clone();
                }
            }
            restored += 1;
        }
        drop(cache);

        warn!(user_id = %snapshot.user_id, restored, "optimistic update rolled back");
        self.notify();
    }

    /// Success invalidates, failure rolls back; the result passes through.
    pub fn settle(&self, snapshot: CacheSnapshot, result: Result<User>) -> Result<User> {
        match result {
            Ok(user) => {
                self.lock().take_pending(snapshot.seq);
                self.invalidate_all();
                Ok(user)
            }
            Err(e) => {
                self.rollback(snapshot);
                Err(e)
            }
        }
    }

    /// Optimistic update of one record. Updates to the same id queue behind
    /// each other; different ids run independently.
    pub async fn update_user(&self, id: &str, payload: UpdateUserPayload) -> Result<User> {
        validate_update(&payload)?;

        let lock = self.update_lock(id);
        let guard = lock.clone().lock_owned().await;

        let snapshot = self.apply_optimistic(id, &payload);
        let result = self.api.update(id.to_string(), payload).await;
        let outcome = self.settle(snapshot, result);

        drop(guard);
        drop(lock);
        self.release_update_lock(id);
        outcome
    }

    fn update_lock(&self, id: &str) -> Arc<tokio::sync::Mutex<()>> {
        self.update_locks
            .lock()
            .expect("update lock map poisoned")
            .entry(id.to_string())
            .or_default()
            .clone()
    }

    fn release_update_lock(&self, id: &str) {
        let mut locks = self.update_locks.lock().expect("update lock map poisoned");
        if locks.get(id).is_some_and(|l| Arc::strong_count(l) == 1) {
            locks.remove(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::seed::seed_users;
    use crate::error::Error;
    use crate::services::user_service::{compute_page, MockUsersApi};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio_test::{assert_err, assert_ok};

    fn options() -> CacheOptions {
        CacheOptions {
            retry_delay: Duration::ZERO,
            ..Default::default()
        }
    }

    fn seeded_query(mock: &mut MockUsersApi, times: usize) {
        mock.expect_query()
            .times(times)
            .returning(|params| Ok(compute_page(&seed_users(), &params)));
    }

    #[tokio::test]
    async fn fresh_results_are_served_from_cache() {
        let mut mock = MockUsersApi::new();
        seeded_query(&mut mock, 1);
        let client = UsersQueryClient::new(Arc::new(mock), UiStore::default(), options());

        let first = assert_ok!(client.load().await);
        let second = assert_ok!(client.load().await);
        assert_eq!(first, second);
        assert!(!client.is_stale(&client.params()));
    }

    #[tokio::test]
    async fn each_param_tuple_gets_its_own_slot() {
        let mut mock = MockUsersApi::new();
        seeded_query(&mut mock, 2);
        let ui = UiStore::default();
        let client = UsersQueryClient::new(Arc::new(mock), ui.clone(), options());

        assert_ok!(client.load().await);
        ui.set_page(2);
        assert_ok!(client.load().await);

        let cached = client.cached_results();
        assert_eq!(cached.len(), 2);
        let page_two = &cached[&client.params()];
        assert_eq!(page_two.page, 2);
        assert_eq!(page_two.users.len(), 8);
    }

    #[tokio::test]
    async fn failed_queries_are_retried() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let mut mock = MockUsersApi::new();
        mock.expect_query().times(3).returning(move |params| {
            if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(Error::Internal("backend unavailable".into()))
            } else {
                Ok(compute_page(&seed_users(), &params))
            }
        });
        let client = UsersQueryClient::new(Arc::new(mock), UiStore::default(), options());

        let data = assert_ok!(client.load().await);
        assert_eq!(data.total, 20);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn exhausted_retries_surface_the_error() {
        let mut mock = MockUsersApi::new();
        mock.expect_query()
            .times(3)
            .returning(|_| Err(Error::Internal("backend unavailable".into())));
        let client = UsersQueryClient::new(Arc::new(mock), UiStore::default(), options());

        assert_err!(client.load().await);
        let view = client.view();
        assert!(view.data.is_none());
        assert!(!view.is_loading);
        assert!(!view.is_fetching);
        assert!(view.error.unwrap().contains("backend unavailable"));
    }

    #[tokio::test]
    async fn failed_update_restores_cache_exactly() {
        let mut mock = MockUsersApi::new();
        seeded_query(&mut mock, 1);
        mock.expect_update()
            .times(1)
            .returning(|_, _| Err(Error::Internal("write failed".into())));
        let client = UsersQueryClient::new(Arc::new(mock), UiStore::default(), options());

        assert_ok!(client.load().await);
        let before = client.cached_results();

        let err = client
            .update_user(
                "1",
                UpdateUserPayload {
                    name: Some("Aria Renamed".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Internal(_)));
        assert_eq!(client.cached_results(), before);
    }

    #[tokio::test]
    async fn invalid_payload_never_touches_cache() {
        let mut mock = MockUsersApi::new();
        seeded_query(&mut mock, 1);
        mock.expect_update().never();
        let client = UsersQueryClient::new(Arc::new(mock), UiStore::default(), options());

        assert_ok!(client.load().await);
        let before = client.cached_results();
        let err = client
            .update_user(
                "1",
                UpdateUserPayload {
                    email: Some("not-an-email".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(client.cached_results(), before);
    }

    #[tokio::test]
    async fn rollback_leaves_other_records_alone() {
        let mut mock = MockUsersApi::new();
        seeded_query(&mut mock, 1);
        let client = UsersQueryClient::new(Arc::new(mock), UiStore::default(), options());
        assert_ok!(client.load().await);
        let params = client.params();

        let first = client.apply_optimistic(
            "1",
            &UpdateUserPayload {
                department: Some("Research".into()),
                ..Default::default()
            },
        );
        let _second = client.apply_optimistic(
            "10",
            &UpdateUserPayload {
                department: Some("Research".into()),
                ..Default::default()
            },
        );
        assert_eq!(client.lock().pending.len(), 2);

        let result = client.settle(first, Err(Error::Internal("nope".into())));
        assert_err!(result);
        assert_eq!(client.lock().pending.len(), 1);

        let cached = client.cached(&params).unwrap();
        assert_eq!(cached.find("1").unwrap().department, "Engineering");
        assert_eq!(cached.find("10").unwrap().department, "Research");
    }

    #[tokio::test]
    async fn successful_update_invalidates_every_entry() {
        let mut mock = MockUsersApi::new();
        seeded_query(&mut mock, 3);
        mock.expect_update().times(1).returning(|id, payload| {
            let mut user = seed_users().into_iter().find(|u| u.id == id).unwrap();
            payload.apply_to(&mut user);
            Ok(user)
        });
        let ui = UiStore::default();
        let client = UsersQueryClient::new(Arc::new(mock), ui.clone(), options());

        assert_ok!(client.load().await);
        ui.set_page(2);
        assert_ok!(client.load().await);
        let page_two = client.params();
        ui.set_page(1);
        let page_one = client.params();

        let user = assert_ok!(
            client
                .update_user(
                    "1",
                    UpdateUserPayload {
                        status: Some(crate::models::user::UserStatus::Pending),
                        ..Default::default()
                    },
                )
                .await
        );
        assert_eq!(user.status, crate::models::user::UserStatus::Pending);
        assert!(client.is_stale(&page_two));

        // The active page is refetched in the background.
        tokio::task::yield_now().await;
        tokio::task::yield_now().await;
        assert!(!client.is_stale(&page_one));
    }
    fn rename(name: &str) -> UpdateUserPayload {
        UpdateUserPayload {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn results_landing_mid_write_keep_the_write_visible() {
        let mut mock = MockUsersApi::new();
        seeded_query(&mut mock, 1);
        let client = UsersQueryClient::new(Arc::new(mock), UiStore::default(), options());
        assert_ok!(client.load().await);
        let params = client.params();
        let backend = compute_page(&seed_users(), &params);
        let name_of_1 = |client: &UsersQueryClient| {
            client
                .cached(&params)
                .and_then(|data| data.find("1").map(|u| u.name.clone()))
        };

        let started_before = UsersQueryClient::begin_fetch(&mut client.lock(), &params);
        let snapshot = client.apply_optimistic("1", &rename("Aria Stone"));

        client.finish_fetch(params.clone(), started_before, &Ok(backend.clone()));
        assert_eq!(name_of_1(&client).as_deref(), Some("Aria Stone"));
        assert!(client.is_stale(&params));

        let started_after = UsersQueryClient::begin_fetch(&mut client.lock(), &params);
        client.finish_fetch(params.clone(), started_after, &Ok(backend.clone()));
        assert_eq!(name_of_1(&client).as_deref(), Some("Aria Stone"));
        assert!(!client.is_stale(&params));

        client.rollback(snapshot);
        assert_eq!(client.cached(&params), Some(backend));
        assert!(client.lock().pending.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn failed_query_is_retried_on_access_once_stale() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let mut mock = MockUsersApi::new();
        mock.expect_query().times(4).returning(move |params| {
            if counter.fetch_add(1, Ordering::SeqCst) < 3 {
                Err(Error::Internal("down".into()))
            } else {
                Ok(compute_page(&seed_users(), &params))
            }
        });
        let client = UsersQueryClient::new(Arc::new(mock), UiStore::default(), options());

        assert_err!(client.load().await);
        let view = client.view();
        assert!(!view.is_fetching);
        assert!(view.error.is_some());

        tokio::time::sleep(Duration::from_secs(31)).await;
        let view = client.view();
        assert!(view.is_fetching);
        assert!(view.is_loading);
        assert_eq!(view.error, None);

        tokio::task::yield_now().await;
        tokio::task::yield_now().await;
        let view = client.view();
        assert_eq!(view.data.map(|d| d.total), Some(20));
        assert_eq!(view.error, None);
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn errors_for_inactive_params_are_pruned() {
        let mut mock = MockUsersApi::new();
        mock.expect_query().returning(|params| {
            if params.page == 1 {
                Err(Error::Internal("down".into()))
            } else {
                Ok(compute_page(&seed_users(), &params))
            }
        });
        let ui = UiStore::default();
        let client = UsersQueryClient::new(Arc::new(mock), ui.clone(), options());

        assert_err!(client.load().await);
        let page_one = client.params();
        assert!(client.lock().errors.contains_key(&page_one));

        ui.set_page(2);
        client.view();
        assert!(client.lock().errors.is_empty());
    }
}

use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::Config;
use crate::database::user_store::UserStore;
use crate::dto::user_dto::{UpdateUserPayload, UsersQueryParams, UsersResponse};
use crate::error::{Error, Result};
use crate::models::user::User;

/// Asynchronous backend boundary the cache layer talks to.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersApi: Send + Sync {
    async fn query(&self, params: UsersQueryParams) -> Result<UsersResponse>;

    async fn update(&self, id: String, payload: UpdateUserPayload) -> Result<User>;

    async fn get_user(&self, id: String) -> Result<User>;
}

#[derive(Debug, Clone, Copy)]
pub struct Latency {
    pub query: Duration,
    pub update: Duration,
    pub jitter: Duration,
}

impl Latency {
    pub fn none() -> Self {
        Self {
            query: Duration::ZERO,
            update: Duration::ZERO,
            jitter: Duration::ZERO,
        }
    }

    fn with_jitter(&self, base: Duration) -> Duration {
        let jitter_ms = self.jitter.as_millis() as u64;
        if jitter_ms == 0 {
            return base;
        }
        base + Duration::from_millis(rand::thread_rng().gen_range(0..=jitter_ms))
    }
}

impl From<&Config> for Latency {
    fn from(config: &Config) -> Self {
        Self {
            query: config.query_latency(),
            update: config.update_latency(),
            jitter: Duration::from_millis(config.latency_jitter_ms),
        }
    }
}

/// Simulated backend over the in-memory [`UserStore`].
#[derive(Clone, Debug)]
pub struct UserService {
    store: UserStore,
    latency: Latency,
}

impl UserService {
    pub fn new(store: UserStore, latency: Latency) -> Self {
        Self { store, latency }
    }

    pub fn store(&self) -> &UserStore {
        &self.store
    }

    async fn simulate_latency(&self, base: Duration) {
        let delay = self.latency.with_jitter(base);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl UsersApi for UserService {
    async fn query(&self, params: UsersQueryParams) -> Result<UsersResponse> {
        self.simulate_latency(self.latency.query).await;

        if params.page == 0 {
            return Err(Error::BadRequest("page must be at least 1".to_string()));
        }
        if params.limit == 0 {
            return Err(Error::BadRequest("limit must be greater than 0".to_string()));
        }

        let users = self.store.list();
        let response = compute_page(&users, &params);
        debug!(
            page = response.page,
            limit = response.limit,
            total = response.total,
            search = %params.search,
            "users query served"
        );
        Ok(response)
    }

    async fn update(&self, id: String, payload: UpdateUserPayload) -> Result<User> {
        self.simulate_latency(self.latency.update).await;

        match self.store.update(&id, &payload) {
            Ok(user) => {
                debug!(user_id = %id, "user updated");
                Ok(user)
            }
            Err(e) => {
                warn!(user_id = %id, error = %e, "user update rejected");
                Err(e)
            }
        }
    }

    async fn get_user(&self, id: String) -> Result<User> {
        self.store.get(&id).ok_or_else(|| Error::user_not_found(&id))
    }
}

/// Filter, stable sort and slice one page out of `users`. Pages past the
/// end come back empty with the real totals; no clamping happens here.
pub fn compute_page(users: &[User], params: &UsersQueryParams) -> UsersResponse {
    let needle = params.search.to_lowercase();
    let mut filtered: Vec<&User> = users.iter().filter(|u| u.matches_search(&needle)).collect();

    filtered.sort_by(|a, b| params.sort_order.apply(a.compare_by(b, params.sort_field)));

    let total = filtered.len();
    let limit = params.limit.max(1) as usize;
    let total_pages = total.div_ceil(limit) as u32;
    let start = (params.page.max(1) as usize - 1).saturating_mul(limit);

    let users = filtered
        .into_iter()
        .skip(start)
        .take(limit)
        .cloned()
        .collect();

    UsersResponse {
        users,
        total,
        page: params.page,
        limit: params.limit,
        total_pages,
    }
}

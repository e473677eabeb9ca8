pub mod config;
pub mod console;
pub mod database;
pub mod dto;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

use crate::config::Config;
use crate::database::user_store::UserStore;
use crate::models::ui_state::UiState;
use crate::services::{
    cache_service::{CacheOptions, UsersQueryClient},
    debounce_service::SearchDebouncer,
    edit_service::EditUserService,
    notification_service::NotificationService,
    ui_store::UiStore,
    user_service::{Latency, UserService, UsersApi},
};
use std::sync::Arc;

/// Everything one dashboard session needs, wired together explicitly.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub user_service: UserService,
    pub ui: UiStore,
    pub users: UsersQueryClient,
    pub edit_service: EditUserService,
    pub notification_service: NotificationService,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self::with_store(config, UserStore::seeded())
    }

    pub fn with_store(config: &Config, store: UserStore) -> Self {
        let user_service = UserService::new(store, Latency::from(config));
        let api: Arc<dyn UsersApi> = Arc::new(user_service.clone());

        let ui = UiStore::new(UiState::new(config.default_page_limit));
        let users = UsersQueryClient::new(api.clone(), ui.clone(), CacheOptions::from(config));
        let notification_service = NotificationService::new();
        let edit_service = EditUserService::new(
            ui.clone(),
            users.clone(),
            api,
            notification_service.clone(),
        );

        Self {
            config: config.clone(),
            user_service,
            ui,
            users,
            edit_service,
            notification_service,
        }
    }

    pub fn store(&self) -> &UserStore {
        self.user_service.store()
    }

    /// Starts forwarding search input into the debounced search. Keep the
    /// handle alive for as long as input should be observed.
    pub fn spawn_search_debouncer(&self) -> SearchDebouncer {
        SearchDebouncer::spawn(self.ui.clone(), self.config.search_debounce())
    }
}

use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

use crate::dto::user_dto::UsersQueryParams;
use crate::models::ui_state::UiState;
use crate::models::user::{SortField, SortOrder};

/// Session-lifetime UI state. Cloning shares the same state; all writes go
/// through the mutators below and are broadcast to subscribers.
#[derive(Clone, Debug)]
pub struct UiStore {
    tx: Arc<watch::Sender<UiState>>,
}

impl UiStore {
    pub fn new(initial: UiState) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    pub fn snapshot(&self) -> UiState {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<UiState> {
        self.tx.subscribe()
    }

    pub fn query_params(&self) -> UsersQueryParams {
        UsersQueryParams::from(&*self.tx.borrow())
    }

    pub fn search_input(&self) -> String {
        self.tx.borrow().search_input.clone()
    }

    pub fn debounced_search(&self) -> String {
        self.tx.borrow().debounced_search.clone()
    }

    pub fn page(&self) -> u32 {
        self.tx.borrow().page
    }

    pub fn limit(&self) -> u32 {
        self.tx.borrow().limit
    }

    pub fn sorting(&self) -> (SortField, SortOrder) {
        let state = self.tx.borrow();
        (state.sort_field, state.sort_order)
    }

    pub fn editing_user_id(&self) -> Option<String> {
        self.tx.borrow().editing_user_id.clone()
    }

    /// Raw keystroke text. Does not reach queries until debounced.
    pub fn set_search_input(&self, text: impl Into<String>) {
        let text = text.into();
        self.tx.send_modify(|state| state.search_input = text);
    }

    pub fn set_debounced_search(&self, text: impl Into<String>) {
        let text = text.into();
        debug!(search = %text, "debounced search applied");
        self.tx.send_modify(|state| {
            state.debounced_search = text;
            state.page = 1;
        });
    }

    pub fn set_page(&self, page: u32) {
        self.tx.send_modify(|state| state.page = page);
    }

    pub fn set_limit(&self, limit: u32) {
        self.tx.send_modify(|state| {
            state.limit = limit;
            state.page = 1;
        });
    }

    /// Same field flips the order; a new field starts ascending.
    pub fn set_sorting(&self, field: SortField) {
        self.tx.send_modify(|state| {
            if state.sort_field == field {
                state.sort_order = state.sort_order.flipped();
            } else {
                state.sort_field = field;
                state.sort_order = SortOrder::Asc;
            }
            state.page = 1;
        });
    }

    pub fn open_edit_modal(&self, id: impl Into<String>) {
        let id = id.into();
        self.tx.send_modify(|state| state.editing_user_id = Some(id));
    }

    pub fn close_edit_modal(&self) {
        self.tx.send_if_modified(|state| state.editing_user_id.take().is_some());
    }

    /// Limit is kept.
    pub fn reset_filters(&self) {
        self.tx.send_modify(|state| {
            state.search_input.clear();
            state.debounced_search.clear();
            state.page = 1;
            state.sort_field = SortField::Name;
            state.sort_order = SortOrder::Asc;
        });
    }
}

impl Default for UiStore {
    fn default() -> Self {
        Self::new(UiState::default())
    }
}

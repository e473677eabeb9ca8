use serde::{Deserialize, Serialize};

use crate::models::user::{SortField, SortOrder};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiState {
    pub search_input: String,
    pub debounced_search: String,
    pub page: u32,
    pub limit: u32,
    pub sort_field: SortField,
    pub sort_order: SortOrder,
    /// Id of the record open in the edit dialog. Resolved against the store
    /// on demand, never held as a record.
    pub editing_user_id: Option<String>,
}

impl UiState {
    pub fn new(limit: u32) -> Self {
        Self {
            search_input: String::new(),
            debounced_search: String::new(),
            page: 1,
            limit,
            sort_field: SortField::Name,
            sort_order: SortOrder::Asc,
            editing_user_id: None,
        }
    }
}

impl Default for UiState {
    fn default() -> Self {
        Self::new(8)
    }
}

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::ui_state::UiState;
use crate::models::user::{SortField, SortOrder, User, UserRole, UserStatus};

/// The full tuple that determines a result view; also the cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsersQueryParams {
    pub page: u32,
    pub limit: u32,
    pub search: String,
    pub sort_field: SortField,
    pub sort_order: SortOrder,
}

impl Default for UsersQueryParams {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 8,
            search: String::new(),
            sort_field: SortField::Name,
            sort_order: SortOrder::Asc,
        }
    }
}

impl From<&UiState> for UsersQueryParams {
    fn from(state: &UiState) -> Self {
        Self {
            page: state.page,
            limit: state.limit,
            search: state.debounced_search.clone(),
            sort_field: state.sort_field,
            sort_order: state.sort_order,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsersResponse {
    pub users: Vec<User>,
    pub total: usize,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
}

impl UsersResponse {
    pub fn stats(&self) -> DirectoryStats {
        DirectoryStats {
            total: self.total,
            active: self
                .users
                .iter()
                .filter(|u| u.status == UserStatus::Active)
                .count(),
            pending: self
                .users
                .iter()
                .filter(|u| u.status == UserStatus::Pending)
                .count(),
            admins: self
                .users
                .iter()
                .filter(|u| u.role == UserRole::Admin)
                .count(),
        }
    }

    pub fn find(&self, id: &str) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }
}

/// Header counters. `total` is the filtered total; the rest count the
/// current page only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryStats {
    pub total: usize,
    pub active: usize,
    pub pending: usize,
    pub admins: usize,
}

/// Partial update; absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateUserPayload {
    #[validate(length(min = 1))]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub role: Option<UserRole>,
    pub status: Option<UserStatus>,
    #[validate(length(min = 1))]
    pub department: Option<String>,
}

impl UpdateUserPayload {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.role.is_none()
            && self.status.is_none()
            && self.department.is_none()
    }

    pub fn apply_to(&self, user: &mut User) {
        if let Some(name) = &self.name {
            user.name = name.clone();
        }
        if let Some(email) = &self.email {
            user.email = email.clone();
        }
        if let Some(role) = self.role {
            user.role = role;
        }
        if let Some(status) = self.status {
            user.status = status;
        }
        if let Some(department) = &self.department {
            user.department = department.clone();
        }
    }
}

impl From<&User> for UpdateUserPayload {
    fn from(user: &User) -> Self {
        Self {
            name: Some(user.name.clone()),
            email: Some(user.email.clone()),
            role: Some(user.role),
            status: Some(user.status),
            department: Some(user.department.clone()),
        }
    }
}

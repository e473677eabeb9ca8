pub mod cache_service;
pub mod debounce_service;
pub mod edit_service;
pub mod notification_service;
pub mod ui_store;
pub mod user_service;

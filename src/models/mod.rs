pub mod notification;
pub mod ui_state;
pub mod user;

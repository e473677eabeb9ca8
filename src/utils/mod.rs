pub mod pagination;
pub mod text;
pub mod time;
pub mod validation;

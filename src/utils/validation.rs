use validator::Validate;

use crate::dto::user_dto::UpdateUserPayload;
use crate::error::{Error, Result};

pub fn validate<T: Validate>(val: &T) -> std::result::Result<(), validator::ValidationErrors> {
    val.validate()
}

/// Field checks plus a guard against saves that would change nothing.
pub fn validate_update(payload: &UpdateUserPayload) -> Result<()> {
    if payload.is_empty() {
        return Err(Error::BadRequest("Update payload has no fields".to_string()));
    }
    validate(payload)?;
    Ok(())
}

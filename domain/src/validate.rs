//! Lightweight input validation helpers. Keep logic minimal and deterministic.

use crate::{CoreError, NewContact};

/// Validate a create request. Fields are checked in declaration order and the
/// first failure wins.
pub fn validate_new_contact(input: &NewContact) -> Result<(), CoreError> {
    if input.name.is_empty() {
        return Err(CoreError::EmptyName);
    }
    if input.phone_number.is_empty() {
        return Err(CoreError::EmptyPhoneNumber);
    }
    Ok(())
}

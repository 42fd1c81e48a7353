//! Ownership check for user-owned resources.

use super::errors::AuthError;

/// Require that the authenticated user owns the resource. Applied before
/// any mutation of a user-owned resource.
pub fn assert_owner(user_id: &str, owner_id: &str) -> Result<(), AuthError> {
    if user_id != owner_id {
        return Err(AuthError::Forbidden);
    }
    Ok(())
}

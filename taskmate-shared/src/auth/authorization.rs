/// Role checks
///
/// Roles are read from the store on every check rather than from the token,
/// so promoting or demoting a user takes effect on their next request.
///
/// # Example
///
/// ```no_run
/// use taskmate_shared::auth::authorization::require_admin;
/// use taskmate_shared::auth::middleware::AuthContext;
/// use taskmate_shared::store::Store;
///
/// async fn admin_only(store: &dyn Store, auth: &AuthContext) -> Result<(), String> {
///     require_admin(store, auth).await.map_err(|e| e.to_string())?;
///     Ok(())
/// }
/// ```

use super::middleware::AuthContext;
use crate::models::{Role, User};
use crate::store::{Store, StoreError};

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// Token is valid but its user no longer exists
    #[error("Unknown user: {0}")]
    UnknownUser(String),

    /// User lacks the required role
    #[error("Insufficient permissions: requires {required}, has {actual}")]
    InsufficientRole { required: Role, actual: Role },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Loads the user behind `auth`
pub async fn current_user(store: &dyn Store, auth: &AuthContext) -> Result<User, AuthzError> {
    store
        .find_user_by_email(&auth.email)
        .await?
        .ok_or_else(|| AuthzError::UnknownUser(auth.email.clone()))
}

/// Checks that `user` holds `required`
///
/// `ADMIN` satisfies every requirement.
pub fn check_role(user: &User, required: Role) -> Result<(), AuthzError> {
    if user.role == required || user.role.is_admin() {
        Ok(())
    } else {
        Err(AuthzError::InsufficientRole {
            required,
            actual: user.role,
        })
    }
}

/// Loads the caller and requires the `ADMIN` role
pub async fn require_admin(store: &dyn Store, auth: &AuthContext) -> Result<User, AuthzError> {
    let user = current_user(store, auth).await?;
    check_role(&user, Role::Admin)?;
    Ok(user)
}

/// Admin gate for user administration routes
///
/// Runs after the bearer-token middleware and looks the caller up in the
/// store, so a demoted admin loses access on their next request.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use taskmate_shared::auth::{authorization::require_admin, middleware::AuthContext};
use tracing::warn;

use crate::{app::AppState, error::ApiError};

/// Rejects callers without the `ADMIN` role (403)
pub async fn require_admin_layer(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth = req
        .extensions()
        .get::<AuthContext>()
        .cloned()
        .ok_or_else(|| ApiError::Unauthorized("Missing credentials".to_string()))?;

    if let Err(err) = require_admin(state.store.as_ref(), &auth).await {
        warn!(email = %auth.email, error = %err, "Admin route refused");
        return Err(err.into());
    }

    Ok(next.run(req).await)
}

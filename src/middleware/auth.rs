use axum::{extract::FromRequestParts, http::header};
use uuid::Uuid;

use crate::{error::AppError, models::Role, state::AppState};

/// The verified identity attached to a request by the bearer-token check.
/// Handlers derive the acting party from this, never from the request body.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: Role,
}

/// Authorization is per-handler: authentication only proves who is calling,
/// each handler decides what that caller may do.
pub fn ensure_role(user: &AuthUser, role: Role) -> Result<(), AppError> {
    if user.role != role {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

pub fn ensure_admin(user: &AuthUser) -> Result<(), AppError> {
    ensure_role(user, Role::Admin)
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or_else(|| AppError::Unauthorized("no token".into()))?;

        let auth_str = auth_header
            .to_str()
            .map_err(|_| AppError::Unauthorized("invalid token".into()))?;

        let token = auth_str
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Unauthorized("invalid token".into()))?
            .trim();

        let (user_id, role) = state.tokens.verify(token)?;

        Ok(AuthUser { user_id, role })
    }
}

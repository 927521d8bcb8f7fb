use axum::http::{header, HeaderMap};
use tracing::warn;

pub const ADMIN_ROLE: &str = "admin";

/// Identity provider lookups needed to gate admin endpoints.
pub trait RoleDirectory: Send + Sync {
    /// User id for a bearer token, or `None` when the session is unknown or expired.
    fn resolve_session(&self, token: &str) -> Result<Option<String>, AuthError>;

    /// Role-check procedure. May report [`AuthError::RoleCheckUnavailable`], in which case
    /// callers read the roles directly.
    fn has_role(&self, user_id: &str, role: &str) -> Result<bool, AuthError>;

    fn roles(&self, user_id: &str) -> Result<Vec<String>, AuthError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Forbidden: admin role required")]
    Forbidden,
    #[error("role check unavailable: {0}")]
    RoleCheckUnavailable(String),
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Resolves the caller and requires the admin role, returning the user id.
pub fn authorize_admin<D: RoleDirectory + ?Sized>(
    directory: &D,
    token: Option<&str>,
) -> Result<String, AuthError> {
    let token = token.ok_or(AuthError::Unauthorized)?;
    let user_id = directory
        .resolve_session(token)?
        .ok_or(AuthError::Unauthorized)?;

    let is_admin = match directory.has_role(&user_id, ADMIN_ROLE) {
        Ok(is_admin) => is_admin,
        Err(AuthError::RoleCheckUnavailable(reason)) => {
            warn!(%user_id, %reason, "role check unavailable, reading roles directly");
            directory
                .roles(&user_id)?
                .iter()
                .any(|role| role == ADMIN_ROLE)
        }
        Err(other) => return Err(other),
    };

    if is_admin {
        Ok(user_id)
    } else {
        Err(AuthError::Forbidden)
    }
}

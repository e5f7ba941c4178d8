use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;
use uuid::Uuid;

use super::{claims::Role, dto::TokenIdentity, jwt::JwtKeys};
use crate::error::AppError;

/// Header carrying the session token.
pub const TOKEN_HEADER: &str = "x-auth-token";

/// Identity decoded from a verified token. Extracting it never touches the
/// identity store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub id: Uuid,
    pub role: Role,
}

impl AuthUser {
    /// Role policy: the caller must hold exactly `required`.
    pub fn require(&self, required: Role) -> Result<(), AppError> {
        if self.role == required {
            Ok(())
        } else {
            warn!(user_id = %self.id, role = %self.role, required = %required, "access denied");
            Err(AppError::Forbidden(required))
        }
    }

    pub fn identity(&self) -> TokenIdentity {
        TokenIdentity {
            id: self.id,
            role: self.role,
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(TOKEN_HEADER)
            .map(|v| v.to_str().map(str::trim))
            .transpose()
            .map_err(|_| AppError::InvalidToken)?
            .filter(|t| !t.is_empty())
            .ok_or(AppError::MissingToken)?;

        let keys = JwtKeys::from_ref(state);
        let claims = keys.verify(token).map_err(|e| {
            warn!("invalid or expired token");
            AppError::from(e)
        })?;

        Ok(AuthUser {
            id: claims.sub,
            role: claims.role,
        })
    }
}

/// Gate plus admin role check.
pub struct RequireAdmin(pub AuthUser);

#[async_trait]
impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        user.require(Role::Admin)?;
        Ok(RequireAdmin(user))
    }
}

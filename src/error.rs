use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{debug, error};

use crate::auth::claims::Role;

/// Every failure a handler can return. Each variant owns exactly one
/// client-facing message, so callers cannot tell apart the internal paths
/// that lead to the same variant.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("User with this email already exists")]
    EmailTaken,
    #[error("User with this username already exists")]
    UsernameTaken,
    #[error("{0}")]
    Validation(String),
    #[error("Invalid Credentials")]
    InvalidCredentials,
    #[error("No token, authorization denied")]
    MissingToken,
    #[error("Token is not valid")]
    InvalidToken,
    #[error("Access denied. {} role required.", .0.title())]
    Forbidden(Role),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::EmailTaken
            | Self::UsernameTaken
            | Self::Validation(_)
            | Self::InvalidCredentials => StatusCode::BAD_REQUEST,
            Self::MissingToken | Self::InvalidToken => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            Self::Internal(e) => {
                error!(error = ?e, "internal error");
                "Server error".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(ErrorBody { message })).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        debug!(reason = %rejection.body_text(), "request body rejected");
        match rejection {
            JsonRejection::MissingJsonContentType(_) => {
                AppError::validation("Expected a JSON request body")
            }
            _ => AppError::validation("Invalid request body"),
        }
    }
}

/// `Json` whose rejection goes through `AppError`, so malformed bodies get
/// a 400 with the usual `{ "message": ... }` shape.
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(ApiJson(value))
    }
}

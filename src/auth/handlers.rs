use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::{
        dto::{
            MessageResponse, ProtectedResponse, PublicUser, SigninRequest, SignupRequest,
            TokenResponse,
        },
        extractors::{AuthUser, RequireAdmin},
        services,
    },
    error::{ApiJson, AppError},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/signin", post(signin))
        .route("/auth/signout", get(signout))
}

pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/protected", get(protected))
        .route("/auth/admin-only", get(admin_only))
        .route("/auth/me", get(get_me))
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<SignupRequest>,
) -> Result<(StatusCode, Json<TokenResponse>), AppError> {
    let token = services::register(
        state.users.as_ref(),
        &state.keys,
        payload,
        state.config.allow_admin_signup,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(TokenResponse {
            message: "User registered successfully".into(),
            token,
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn signin(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<SigninRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let token = services::authenticate(state.users.as_ref(), &state.keys, payload).await?;
    Ok(Json(TokenResponse {
        message: "Logged in successfully".into(),
        token,
    }))
}

/// Tokens are stateless; the client discards its copy.
pub async fn signout() -> Json<MessageResponse> {
    info!("signout requested");
    Json(MessageResponse {
        message: "User signed out successfully (token should be removed from client)".into(),
    })
}

#[instrument]
pub async fn protected(user: AuthUser) -> Json<ProtectedResponse> {
    Json(ProtectedResponse {
        message: "You have accessed a protected route!".into(),
        user: user.identity(),
    })
}

#[instrument(skip_all)]
pub async fn admin_only(RequireAdmin(user): RequireAdmin) -> Json<ProtectedResponse> {
    Json(ProtectedResponse {
        message: "Welcome, Admin! This is an admin-only route.".into(),
        user: user.identity(),
    })
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<PublicUser>, AppError> {
    let found = state.users.find_by_id(user.id).await?;
    // A verified token for an identity that no longer exists.
    let found = found.ok_or(AppError::InvalidToken)?;
    Ok(Json(found.into()))
}

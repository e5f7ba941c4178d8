use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::{info, instrument};

use super::dto::{ContactMessage, ContactRequest, NewContactMessage, Pagination};
use crate::{
    auth::{dto::MessageResponse, extractors::RequireAdmin},
    error::{ApiJson, AppError},
    state::AppState,
};

pub fn contact_routes() -> Router<AppState> {
    Router::new().route("/contact", post(submit_contact).get(list_contacts))
}

#[instrument(skip(state, payload))]
pub async fn submit_contact(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<ContactRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    let msg = NewContactMessage::try_from(payload)?;
    let stored = state.contacts.create(msg).await?;
    info!(contact_id = %stored.id, "contact message received");
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "Message received".into(),
        }),
    ))
}

#[instrument(skip(state, admin))]
pub async fn list_contacts(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Query(p): Query<Pagination>,
) -> Result<Json<Vec<ContactMessage>>, AppError> {
    let RequireAdmin(user) = admin;
    let (limit, offset) = p.clamped();
    let items = state.contacts.list(limit, offset).await?;
    info!(user_id = %user.id, count = items.len(), "contact messages listed");
    Ok(Json(items))
}

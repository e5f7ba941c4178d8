mod dto;
pub mod handlers;
pub mod repo;

pub use dto::{ContactMessage, ContactRequest, NewContactMessage, Pagination};

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::contact_routes()
}

//! Portfolio backend: account signup/signin with signed session tokens,
//! role-gated routes, and the contact form.

pub mod app;
pub mod auth;
pub mod config;
pub mod contact;
pub mod error;
pub mod state;

pub use app::{build_app, serve};
pub use error::AppError;
pub use state::AppState;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{auth::services::is_valid_email, error::AppError};

pub const MAX_MESSAGE_LEN: usize = 5000;
pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Deserialize)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    pub message: String,
}

/// A validated submission ready to be stored.
#[derive(Debug, Clone)]
pub struct NewContactMessage {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl TryFrom<ContactRequest> for NewContactMessage {
    type Error = AppError;

    fn try_from(req: ContactRequest) -> Result<Self, Self::Error> {
        let name = req.name.trim().to_string();
        let email = req.email.trim().to_lowercase();
        let message = req.message.trim().to_string();

        if name.is_empty() {
            return Err(AppError::validation("Name is required"));
        }
        if !is_valid_email(&email) {
            return Err(AppError::validation("Please fill a valid email address"));
        }
        if message.is_empty() {
            return Err(AppError::validation("Message is required"));
        }
        if message.chars().count() > MAX_MESSAGE_LEN {
            return Err(AppError::validation(format!(
                "Message must be at most {MAX_MESSAGE_LEN} characters"
            )));
        }
        Ok(Self {
            name,
            email,
            message,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ContactMessage {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub message: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    20
}

impl Pagination {
    pub fn clamped(&self) -> (i64, i64) {
        (self.limit.clamp(1, MAX_PAGE_SIZE), self.offset.max(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(name: &str, email: &str, message: &str) -> ContactRequest {
        ContactRequest {
            name: name.into(),
            email: email.into(),
            message: message.into(),
        }
    }

    #[test]
    fn valid_submission_is_trimmed() {
        let m = NewContactMessage::try_from(req(" John Doe ", " John.Doe@Example.com", " hi ")).unwrap();
        assert_eq!(m.name, "John Doe");
        assert_eq!(m.email, "john.doe@example.com");
        assert_eq!(m.message, "hi");
    }

    #[test]
    fn invalid_submissions_are_rejected() {
        assert!(NewContactMessage::try_from(req("  ", "a@x.com", "hi")).is_err());
        assert!(NewContactMessage::try_from(req("John", "nope", "hi")).is_err());
        assert!(NewContactMessage::try_from(req("John", "a@x.com", "   ")).is_err());
        let long = "x".repeat(MAX_MESSAGE_LEN + 1);
        assert!(NewContactMessage::try_from(req("John", "a@x.com", &long)).is_err());
    }

    #[test]
    fn pagination_is_clamped() {
        let p = Pagination { limit: 1000, offset: -5 };
        assert_eq!(p.clamped(), (MAX_PAGE_SIZE, 0));
        let p = Pagination { limit: 0, offset: 3 };
        assert_eq!(p.clamped(), (1, 3));
    }

    #[test]
    fn pagination_defaults_to_first_twenty() {
        let p: Pagination = serde_json::from_str("{}").unwrap();
        assert_eq!(p.clamped(), (20, 0));
    }
}

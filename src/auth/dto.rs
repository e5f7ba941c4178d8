use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::{claims::Role, repo_types::User};

/// Request body for signup. `role` is checked against the signup policy.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<String>,
}

/// Request body for signin. `identifier` is a username or an email.
#[derive(Debug, Deserialize)]
pub struct SigninRequest {
    #[serde(alias = "emailOrUsername")]
    pub identifier: String,
    pub password: String,
}

/// Response returned after signup or signin.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub message: String,
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Identity as decoded from a verified token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenIdentity {
    pub id: Uuid,
    pub role: Role,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProtectedResponse {
    pub message: String,
    pub user: TokenIdentity,
}

/// Public part of the user returned to the client.
#[derive(Debug, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: Role,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            username: u.username,
            email: u.email,
            role: u.role,
            created_at: u.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signin_accepts_legacy_field_name() {
        let req: SigninRequest =
            serde_json::from_str(r#"{"emailOrUsername":"alice","password":"secret1"}"#).unwrap();
        assert_eq!(req.identifier, "alice");

        let req: SigninRequest =
            serde_json::from_str(r#"{"identifier":"a@x.com","password":"secret1"}"#).unwrap();
        assert_eq!(req.identifier, "a@x.com");
    }

    #[test]
    fn signup_role_is_optional() {
        let req: SignupRequest = serde_json::from_str(
            r#"{"username":"alice","email":"a@x.com","password":"secret1"}"#,
        )
        .unwrap();
        assert!(req.role.is_none());
    }
}

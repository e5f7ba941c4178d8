use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use super::{
    claims::Role,
    dto::{SigninRequest, SignupRequest},
    jwt::JwtKeys,
    password::{verify_dummy, verify_password_blocking},
    repo::{StoreError, UserStore},
    repo_types::NewUser,
};
use crate::{config::AdminSeed, error::AppError};

pub const MIN_USERNAME_LEN: usize = 3;
pub const MIN_PASSWORD_LEN: usize = 6;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex =
            Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("static email regex");
    }
    EMAIL_RE.is_match(email)
}

/// Signup input after normalisation and validation.
#[derive(Debug)]
pub struct ValidSignup {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

fn resolve_role(requested: Option<&str>, allow_admin: bool) -> Result<Role, AppError> {
    match requested.map(str::trim) {
        None | Some("") => Ok(Role::User),
        Some(raw) => match raw.parse::<Role>() {
            Ok(Role::User) => Ok(Role::User),
            Ok(Role::Admin) if allow_admin => Ok(Role::Admin),
            Ok(Role::Admin) => Err(AppError::validation("Role cannot be self-assigned")),
            Err(_) => Err(AppError::validation("Invalid role")),
        },
    }
}

pub fn validate_signup(req: SignupRequest, allow_admin: bool) -> Result<ValidSignup, AppError> {
    let username = req.username.trim().to_string();
    let email = req.email.trim().to_lowercase();

    if username.chars().count() < MIN_USERNAME_LEN {
        return Err(AppError::validation(format!(
            "Username must be at least {MIN_USERNAME_LEN} characters"
        )));
    }
    // Keeps usernames and emails disjoint so a signin identifier matches one record.
    if username.contains('@') {
        return Err(AppError::validation("Username must not contain '@'"));
    }
    if !is_valid_email(&email) {
        return Err(AppError::validation("Please fill a valid email address"));
    }
    if req.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    let role = resolve_role(req.role.as_deref(), allow_admin)?;

    Ok(ValidSignup {
        username,
        email,
        password: req.password,
        role,
    })
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateEmail => AppError::EmailTaken,
            StoreError::DuplicateUsername => AppError::UsernameTaken,
            StoreError::Other(e) => AppError::Internal(e),
        }
    }
}

/// Creates the identity and returns a freshly signed token.
#[instrument(skip_all, fields(username = %req.username))]
pub async fn register(
    users: &dyn UserStore,
    keys: &JwtKeys,
    req: SignupRequest,
    allow_admin: bool,
) -> Result<String, AppError> {
    let input = validate_signup(req, allow_admin).map_err(|e| {
        warn!(reason = %e, "signup rejected");
        e
    })?;

    if users.find_by_email(&input.email).await?.is_some() {
        warn!(email = %input.email, "email already registered");
        return Err(AppError::EmailTaken);
    }
    if users.find_by_username(&input.username).await?.is_some() {
        warn!(username = %input.username, "username already registered");
        return Err(AppError::UsernameTaken);
    }

    let new_user =
        NewUser::with_password(input.username, input.email, input.password, input.role).await?;
    // The store enforces uniqueness again; a concurrent signup may have won.
    let user = users.create(new_user).await?;

    let token = keys.sign(user.id, user.role)?;
    info!(user_id = %user.id, role = %user.role, "user registered");
    Ok(token)
}

/// Checks credentials and returns a freshly signed token. Unknown
/// identifiers and wrong passwords both yield `InvalidCredentials`.
#[instrument(skip_all)]
pub async fn authenticate(
    users: &dyn UserStore,
    keys: &JwtKeys,
    req: SigninRequest,
) -> Result<String, AppError> {
    let identifier = req.identifier.trim();

    let Some(user) = users.find_by_identifier(identifier).await? else {
        let password = req.password;
        tokio::task::spawn_blocking(move || verify_dummy(&password))
            .await
            .map_err(anyhow::Error::from)?;
        warn!("signin unknown identifier");
        return Err(AppError::InvalidCredentials);
    };

    let ok = verify_password_blocking(req.password, user.password_hash.clone()).await?;
    if !ok {
        warn!(user_id = %user.id, "signin invalid password");
        return Err(AppError::InvalidCredentials);
    }

    let token = keys.sign(user.id, user.role)?;
    info!(user_id = %user.id, "user signed in");
    Ok(token)
}

/// Creates the configured admin account unless its email or username is
/// already taken.
pub async fn seed_admin(users: &dyn UserStore, seed: &AdminSeed) -> anyhow::Result<()> {
    let req = SignupRequest {
        username: seed.username.clone(),
        email: seed.email.clone(),
        password: seed.password.clone(),
        role: Some(Role::Admin.as_str().to_string()),
    };
    let input = validate_signup(req, true).map_err(|e| anyhow::anyhow!("admin seed: {e}"))?;

    if users.find_by_email(&input.email).await?.is_some()
        || users.find_by_username(&input.username).await?.is_some()
    {
        info!(username = %input.username, "admin account already present");
        return Ok(());
    }

    let new_user =
        NewUser::with_password(input.username, input.email, input.password, Role::Admin).await?;
    match users.create(new_user).await {
        Ok(user) => {
            info!(user_id = %user.id, "admin account seeded");
            Ok(())
        }
        Err(StoreError::DuplicateEmail | StoreError::DuplicateUsername) => Ok(()),
        Err(StoreError::Other(e)) => Err(e),
    }
}

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{delete, post},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use super::{
    dto::{PublicUser, RegisterRequest},
    repo_types::NewUser,
};
use crate::{
    auth::extractors::AuthUser,
    error::{require, AppError},
    state::AppState,
};

pub const MIN_PASSWORD_LEN: usize = 8;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(register))
        .route("/users/me", delete(delete_me))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PublicUser>), AppError> {
    let Json(payload) = payload?;
    let email = require(payload.email, "email")?.trim().to_lowercase();
    let password = require(payload.password, "password")?;
    let first_name = require(payload.first_name, "firstName")?.trim().to_string();
    let last_name = require(payload.last_name, "lastName")?.trim().to_string();

    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err(AppError::BadRequest("Invalid email".into()));
    }

    if password.len() < MIN_PASSWORD_LEN {
        warn!("password too short");
        return Err(AppError::BadRequest(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    // Ensure email is not taken
    if state.users.find_by_email(&email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(AppError::Conflict("Email already registered".into()));
    }

    let password_hash = state.hasher.spawn_hash(password).await?;
    // The pre-check above can race; the store has the final say.
    let Some(user) = state
        .users
        .create(NewUser {
            email: email.clone(),
            password_hash,
            first_name,
            last_name,
        })
        .await?
    else {
        warn!(email = %email, "email registered concurrently");
        return Err(AppError::Conflict("Email already registered".into()));
    };

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((StatusCode::CREATED, Json(PublicUser::from(user))))
}

#[instrument(skip(state, claims))]
pub async fn delete_me(
    AuthUser(claims): AuthUser,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    let removed = state.users.delete_by_email(&claims.user.email).await?;
    info!(email = %claims.user.email, removed, "account removal");
    Ok(StatusCode::NO_CONTENT)
}

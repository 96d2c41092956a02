use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        claims::UserClaim,
        dto::{AuthResponse, LoginRequest},
        extractors::AuthUser,
        jwt::JwtKeys,
    },
    error::{require, AppError},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, AppError> {
    let Json(payload) = payload?;
    let email = require(payload.username, "username")?.trim().to_lowercase();
    let password = require(payload.password, "password")?;

    // Unknown emails still pay for one Argon2 verification.
    let user = state.users.find_by_email(&email).await?;
    let stored = user.as_ref().map(|u| u.password_hash.clone());
    let matched = state.hasher.spawn_verify(password, stored).await?;

    let Some(user) = user else {
        warn!(email = %email, "login unknown email");
        return Err(AppError::Unauthorized);
    };
    if !matched {
        warn!(email = %email, user_id = %user.id, "login invalid password");
        return Err(AppError::Unauthorized);
    }

    let auth_token = state.keys.issue(UserClaim::from(&user))?;
    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(Json(AuthResponse { auth_token }))
}

/// Re-issues from the verified claims without a store lookup.
#[instrument(skip(keys, claims))]
pub async fn refresh(
    AuthUser(claims): AuthUser,
    State(keys): State<JwtKeys>,
) -> Result<Json<AuthResponse>, AppError> {
    let auth_token = keys.reissue(&claims)?;
    info!(sub = %claims.sub, "token refreshed");
    Ok(Json(AuthResponse { auth_token }))
}

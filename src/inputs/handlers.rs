use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    dto::{CreateInputRequest, InputsResponse, ListQuery, UpdateInputRequest},
    repo_types::{InputFilter, InputRecord},
};
use crate::{auth::extractors::AuthUser, error::AppError, state::AppState};

// Every handler takes `AuthUser` first so an unauthenticated request is
// rejected before the body is read or the store is touched.

/// Path ids are taken as raw strings. One that is not a UUID cannot name a
/// stored record, so it is treated like an absent one.
fn record_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw).ok()
}

pub fn input_routes() -> Router<AppState> {
    Router::new()
        .route("/inputs", get(list_inputs))
        .route("/inputs/add", post(create_input))
        .route(
            "/inputs/:id",
            get(get_input).put(update_input).delete(delete_input),
        )
}

#[instrument(skip(state, _auth))]
pub async fn list_inputs(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(q): Query<ListQuery>,
) -> Result<Json<InputsResponse>, AppError> {
    let filter = InputFilter { username: q.email };
    let inputs = state.inputs.find(&filter).await?;
    Ok(Json(InputsResponse { inputs }))
}

#[instrument(skip(state, _auth))]
pub async fn get_input(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<InputRecord>, AppError> {
    let found = match record_id(&id) {
        Some(uuid) => state.inputs.find_by_id(uuid).await?,
        None => None,
    };
    match found {
        Some(input) => Ok(Json(input)),
        None => {
            warn!(%id, "input not found");
            Err(AppError::NotFound)
        }
    }
}

#[instrument(skip(state, claims, payload))]
pub async fn create_input(
    AuthUser(claims): AuthUser,
    State(state): State<AppState>,
    payload: Result<Json<CreateInputRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<InputRecord>), AppError> {
    let Json(payload) = payload?;
    let new_input = payload.validate()?;
    let input = state.inputs.create(new_input).await?;
    info!(id = %input.id, by = %claims.sub, "input created");
    Ok((StatusCode::CREATED, Json(input)))
}

#[instrument(skip(state, claims, payload))]
pub async fn update_input(
    AuthUser(claims): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateInputRequest>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let Json(payload) = payload?;
    let patch = payload.into_patch(&id).map_err(|e| {
        warn!(error = %e, "update id mismatch");
        e
    })?;
    // No matching record is still a success, like delete.
    let updated = match record_id(&id) {
        Some(uuid) => state.inputs.update(uuid, patch).await?,
        None => false,
    };
    info!(%id, updated, by = %claims.sub, "input update");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, claims))]
pub async fn delete_input(
    AuthUser(claims): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let removed = match record_id(&id) {
        Some(uuid) => state.inputs.delete(uuid).await?,
        None => false,
    };
    info!(%id, removed, by = %claims.sub, "input deleted");
    Ok(StatusCode::NO_CONTENT)
}

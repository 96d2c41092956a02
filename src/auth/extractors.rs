use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::{debug, warn};

use super::{claims::AuthClaims, jwt::JwtKeys};
use crate::error::AppError;

/// Verified claims of the bearer token; the identity for the rest of the request.
pub struct AuthUser(pub AuthClaims);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // Read Authorization header
        let auth = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| {
                debug!("missing Authorization header");
                AppError::Unauthorized
            })?;

        // Expect "Bearer <token>"
        let token = auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
            .ok_or_else(|| {
                debug!("invalid auth scheme");
                AppError::Unauthorized
            })?;

        let keys = JwtKeys::from_ref(state);
        match keys.verify(token.trim()) {
            Ok(claims) => Ok(AuthUser(claims)),
            Err(e) => {
                warn!(error = %e, "rejected bearer token");
                Err(AppError::Unauthorized)
            }
        }
    }
}

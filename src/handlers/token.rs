use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::Serialize;

use crate::auth::Claims;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/**
 * POST /gentoken - Sign the request body into a bearer token
 *
 * Whatever JSON object is posted becomes the token's claims; nothing is
 * checked against a user store.
 *
 * Expected Input:
 * ```json
 * { "email": "seller@toyverse.dev" }
 * ```
 *
 * Expected Output:
 * ```json
 * { "token": "eyJhbGciOiJIUzI1NiI..." }
 * ```
 */
pub async fn generate(
    State(state): State<AppState>,
    payload: Result<Json<Claims>, JsonRejection>,
) -> Result<Json<TokenResponse>, ApiError> {
    let Json(claims) = payload?;
    let token = state.tokens.issue(claims)?;
    Ok(Json(TokenResponse { token }))
}

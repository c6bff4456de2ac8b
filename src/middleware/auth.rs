use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::auth::{Claims, TokenError};
use crate::error::ApiError;
use crate::state::AppState;

/// Header carrying `"<scheme> <token>"`
pub const AUTH_HEADER: &str = "authtoken";

/// Verified token claims, inserted into request extensions
#[derive(Clone, Debug)]
pub struct AuthClaims(pub Claims);

/// Token verification middleware that validates the `authtoken` header and
/// exposes the decoded claims to the handler
pub async fn token_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header_value = match request.headers().get(AUTH_HEADER) {
        Some(value) => Some(value.to_str().map_err(|_| TokenError::MalformedHeader)?),
        None => None,
    };

    let claims = state.tokens.verify(header_value)?;
    request.extensions_mut().insert(AuthClaims(claims));

    Ok(next.run(request).await)
}

// Route handlers, one module per resource. Each handler issues a single
// store call and wraps the outcome in an `Envelope`.
pub mod opinions;
pub mod root;
pub mod token;
pub mod toys;

use uuid::Uuid;

use crate::error::ApiError;

/// Parse a path identifier, rejecting anything that is not a UUID
pub(crate) fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::bad_request(format!("Invalid id: {}", raw)))
}

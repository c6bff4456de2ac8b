use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{json, Map, Value};

/// Uniform `{success, msg, <key>: data}` response body.
///
/// Always sent with 200 OK: `success` is the only signal distinguishing an
/// empty, missing or unchanged result from a useful one.
#[derive(Debug)]
pub struct Envelope<T: Serialize> {
    pub success: bool,
    pub msg: String,
    pub key: &'static str,
    pub data: T,
}

impl<T: Serialize> Envelope<T> {
    pub fn new(success: bool, msg: impl Into<String>, key: &'static str, data: T) -> Self {
        Self {
            success,
            msg: msg.into(),
            key,
            data,
        }
    }

    /// Pick the message matching the outcome
    pub fn outcome(success: bool, ok_msg: &str, fail_msg: &str, key: &'static str, data: T) -> Self {
        Self::new(success, if success { ok_msg } else { fail_msg }, key, data)
    }

    pub fn to_json(&self) -> Result<Value, serde_json::Error> {
        let mut body = Map::new();
        body.insert("success".into(), Value::Bool(self.success));
        body.insert("msg".into(), Value::String(self.msg.clone()));
        body.insert(self.key.into(), serde_json::to_value(&self.data)?);
        Ok(Value::Object(body))
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        match self.to_json() {
            Ok(body) => (StatusCode::OK, Json(body)).into_response(),
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "success": false,
                        "error": "Failed to serialize response data"
                    })),
                )
                    .into_response()
            }
        }
    }
}

// Convenience type alias
pub type ApiResult<T> = Result<Envelope<T>, crate::error::ApiError>;

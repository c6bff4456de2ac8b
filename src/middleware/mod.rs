pub mod auth;
pub mod response;

pub use auth::{token_auth_middleware, AuthClaims, AUTH_HEADER};
pub use response::{ApiResult, Envelope};

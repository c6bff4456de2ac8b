use std::sync::Arc;

use crate::auth::{JwtTokenService, TokenError, TokenService};
use crate::config::AppConfig;
use crate::database::DocumentStore;

/// Process-wide resources created once at startup and handed to every
/// handler through axum's `State` extractor
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn DocumentStore>,
    pub tokens: Arc<dyn TokenService>,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn DocumentStore>, tokens: Arc<dyn TokenService>) -> Self {
        Self {
            config: Arc::new(config),
            store,
            tokens,
        }
    }

    /// State with the JWT token service built from the security config
    pub fn with_jwt(config: AppConfig, store: Arc<dyn DocumentStore>) -> Result<Self, TokenError> {
        let tokens = JwtTokenService::new(&config.security.jwt_secret, config.security.jwt_expiry_hours)?;
        Ok(Self::new(config, store, Arc::new(tokens)))
    }
}

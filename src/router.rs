use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::handlers::{opinions, root, token, toys};
use crate::middleware::token_auth_middleware;
use crate::state::AppState;

/// Full application router with global middleware applied
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config);
    let body_limit = state.config.api.max_request_size_bytes;

    Router::new()
        // Public
        .route("/", get(root::root))
        .route("/health", get(root::health))
        .route("/gentoken", post(token::generate))
        .merge(toy_routes())
        .merge(opinion_routes())
        // Token-protected
        .merge(my_toy_routes(state.clone()))
        // Global middleware
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn toy_routes() -> Router<AppState> {
    Router::new()
        .route("/toys", get(toys::list))
        .route("/addtoy", post(toys::add))
        .route(
            "/toy/:id",
            get(toys::get).patch(toys::update).delete(toys::delete),
        )
}

fn opinion_routes() -> Router<AppState> {
    Router::new().route("/opinion", get(opinions::list).post(opinions::add))
}

fn my_toy_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/mytoys", get(toys::mine))
        .route_layer(middleware::from_fn_with_state(state, token_auth_middleware))
}

/// Wildcard or listed origins, fixed method allow-list, any request header
pub fn cors_layer(config: &AppConfig) -> CorsLayer {
    let methods: Vec<Method> = config
        .security
        .cors_methods
        .iter()
        .filter_map(|m| m.parse().ok())
        .collect();

    let layer = CorsLayer::new().allow_methods(methods).allow_headers(Any);

    if config.allows_any_origin() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", o);
                None
            }
        })
        .collect();
    layer.allow_origin(origins)
}

mod handlers;
pub mod middleware;

use axum::{
    http::HeaderValue,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::db::Database;

pub use middleware::{RateLimiter, SecurityConfig};

/// Build the router with no authentication or rate limiting.
pub fn create_router(db: Database) -> Router {
    create_router_with_security(db, SecurityConfig::disabled())
}

pub fn create_router_with_security(db: Database, security: SecurityConfig) -> Router {
    let mut api = Router::new()
        // Households
        .route("/households", get(handlers::list_households))
        .route("/households", post(handlers::create_household))
        .route("/households/{id}", get(handlers::get_household))
        .route("/households/{id}", delete(handlers::delete_household))
        .route("/households/{id}/items", get(handlers::list_items))
        .route("/households/{id}/items", post(handlers::create_item))
        .route("/households/{id}/todos", get(handlers::list_todos))
        .route("/households/{id}/todos", post(handlers::create_todo))
        .route("/households/{id}/cares", get(handlers::list_cares))
        .route("/households/{id}/cares", post(handlers::create_care))
        // Schedule views
        .route("/households/{id}/due", get(handlers::get_due_todos))
        .route("/households/{id}/history", get(handlers::get_care_history))
        .route("/households/{id}/schedule", get(handlers::get_schedule))
        // Items, todos and cares by id
        .route("/items/{id}", delete(handlers::delete_item))
        .route("/todos/{id}", get(handlers::get_todo))
        .route("/todos/{id}", put(handlers::update_todo))
        .route("/todos/{id}", delete(handlers::delete_todo))
        .route("/todos/{id}/cares", get(handlers::list_todo_cares))
        .route("/cares/{id}", delete(handlers::delete_care))
        // Health
        .route("/health", get(handlers::health))
        .with_state(db);

    if let Some(limiter) = security.rate_limiter.clone() {
        api = api.layer(axum::middleware::from_fn_with_state(
            limiter,
            middleware::rate_limit_middleware,
        ));
    }
    if security.api_key.is_some() {
        api = api.layer(axum::middleware::from_fn_with_state(
            security.clone(),
            middleware::auth_middleware,
        ));
    }

    Router::new()
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&security))
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    match &security.cors_origins {
        Some(origins) => {
            let origins: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|origin| match origin.parse() {
                    Ok(value) => Some(value),
                    Err(_) => {
                        tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                        None
                    }
                })
                .collect();
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods(Any)
                .allow_headers(Any)
        }
        None => CorsLayer::permissive(),
    }
}

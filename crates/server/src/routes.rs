//! Router configuration for the web server.

use axum::{Router, routing::get};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Create the main router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Mapping administration
        .route(
            "/entries",
            get(handlers::list_entries)
                .post(handlers::add_entry)
                .put(handlers::update_entry),
        )
        .route("/waybackproxyredirect", get(handlers::redirect))
        // Everything else is proxied
        .route("/", get(handlers::proxy))
        .route("/*path", get(handlers::proxy))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, put};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::config::{
    create_cors_layer, create_security_headers_layer, require_basic_auth, BasicAuth, Config,
};
use crate::handlers::{clients, events};
use crate::state::AppState;
use crate::utils::response::describe_request_path;

/// Every route sits behind Basic authentication. Layers run outermost-first:
/// CORS, security headers, tracing, error path description, authentication.
pub fn create_routes(state: AppState, auth: BasicAuth, config: &Config) -> Router {
    Router::new()
        .route(
            "/v1/clients",
            get(clients::list_clients).post(clients::create_client),
        )
        .route(
            "/v1/clients/:client_id",
            get(clients::get_client)
                .put(clients::update_client)
                .patch(clients::partially_update_client)
                .delete(clients::delete_client),
        )
        .route(
            "/v1/clients/:client_id/events/:event_id",
            put(clients::attend_event),
        )
        .route(
            "/v1/events",
            get(events::list_events).post(events::create_event),
        )
        .route(
            "/v1/events/:event_id",
            get(events::get_event)
                .put(events::update_event)
                .patch(events::partially_update_event)
                .delete(events::delete_event),
        )
        .with_state(state)
        .layer(from_fn_with_state(auth, require_basic_auth))
        .layer(from_fn(describe_request_path))
        .layer(TraceLayer::new_for_http())
        .layer(create_security_headers_layer(config.production))
        .layer(create_cors_layer(&config.cors_allowed_origins))
}

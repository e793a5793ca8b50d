//! Router configuration for the HTTP surface.
//!
//! This module sets up all routes, middleware (session cookie, CORS,
//! compression, tracing), and creates the axum router ready for serving.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::{admin, handlers, session_layer};
use super::state::AppState;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration - permissive for development
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let admin_routes = Router::new()
        .route("/reservations-all", get(admin::all_reservations))
        .route("/reservations-new", get(admin::new_reservations))
        .route("/reservations/{src}/{id}", get(admin::show_reservation))
        .route("/reservations/{src}/{id}", post(admin::update_reservation))
        .route(
            "/process-reservation/{src}/{id}",
            get(admin::process_reservation),
        )
        .route(
            "/delete-reservation/{src}/{id}",
            get(admin::delete_reservation),
        )
        .route("/reservations-calendar", get(admin::reservations_calendar))
        .route(
            "/reservations-calendar",
            post(admin::post_reservations_calendar),
        );

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/search-availability", get(handlers::search_availability))
        .route(
            "/search-availability",
            post(handlers::post_search_availability),
        )
        .route(
            "/search-availability-by-id",
            post(handlers::post_search_availability_by_id),
        )
        .route("/rooms", get(handlers::list_rooms))
        .route("/rooms/{id}", get(handlers::room_page))
        .route("/choose-room/{slug}", get(handlers::choose_room))
        .route("/make-reservation", get(handlers::make_reservation))
        .route(
            "/make-reservation",
            post(handlers::post_make_reservation),
        )
        .route(
            "/reservation-summary",
            get(handlers::reservation_summary),
        )
        .route(
            "/api/search-availability",
            post(handlers::api_search_availability),
        )
        .nest("/admin", admin_routes)
        .layer(middleware::from_fn(session_layer::session_middleware))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::LocalRepository;
    use crate::services::{start_mailer, LogTransport};
    use crate::session::MemorySessionStore;
    use std::sync::Arc;

    #[tokio::test]
    async fn router_builds() {
        let (mailer, _handle) = start_mailer(LogTransport, 8);
        let state = AppState::new(
            Arc::new(LocalRepository::new()),
            Arc::new(MemorySessionStore::new()),
            mailer,
        );
        let _router = create_router(state);
    }
}

use crate::api::{handlers, AppState};
use crate::metrics::track_metrics;
use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};

/// Build the main API router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics))
        // Admin login
        .route("/api/login", post(handlers::login))
        // Lead management
        .route(
            "/api/leads",
            get(handlers::list_leads).post(handlers::create_lead),
        )
        .route("/api/leads/metrics", get(handlers::lead_metrics))
        .route(
            "/api/leads/:id",
            put(handlers::update_lead).delete(handlers::delete_lead),
        )
        .route_layer(middleware::from_fn(track_metrics))
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(false))
                .on_response(DefaultOnResponse::new()),
        )
        .layer(CorsLayer::permissive())
}

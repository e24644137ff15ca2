pub mod auth;
pub mod health;
pub mod rankings;
pub mod stats;

use crate::app_state::AppState;
use crate::openapi;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::{middleware, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

fn cors_layer(allowed_origins: &str) -> CorsLayer {
    if allowed_origins.trim() == "*" {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .split(',')
        .filter_map(|o| o.trim().parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Assembles the full HTTP surface. Staff-only and auth-required
/// routes carry their own middleware layer so public routes (`/health`,
/// `/ready`, read-only stats/rankings) stay reachable without a token.
pub fn router(state: AppState) -> Router {
    let staff_routes = Router::new()
        .route("/stats/batch-refresh", post(stats::batch_refresh))
        .route("/rankings/calculate", post(rankings::calculate))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_staff,
        ));

    let authenticated_routes = Router::new()
        .route("/stats/refresh/:clipId", post(stats::refresh))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_auth,
        ));

    let public_routes = Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/stats/:clipId", get(stats::get_stats))
        .route("/rankings/weekly-clips", get(rankings::weekly_clips))
        .route(
            "/rankings/weekly-campaigns",
            get(rankings::weekly_campaigns),
        );

    let cors = cors_layer(&state.config.allowed_origins);

    Router::new()
        .merge(public_routes)
        .merge(authenticated_routes)
        .merge(staff_routes)
        .merge(openapi::routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

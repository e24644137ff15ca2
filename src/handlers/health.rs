use crate::app_state::AppState;
use crate::models::HealthResponse;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;

#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Liveness probe", body = HealthResponse))
)]
pub async fn health() -> (StatusCode, Json<HealthResponse>) {
    let response = HealthResponse {
        status: "healthy".to_string(),
        service: "statistics-service".to_string(),
    };
    (StatusCode::OK, Json(response))
}

/// Readiness probe: confirms the database pool can answer a trivial query
/// and the cache connection opens, distinct from liveness (`/health`).
#[utoipa::path(
    get,
    path = "/ready",
    responses(
        (status = 200, description = "Dependencies reachable", body = HealthResponse),
        (status = 503, description = "A dependency is unreachable", body = HealthResponse)
    )
)]
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let db_ok = sqlx::query("SELECT 1").execute(&state.pool).await.is_ok();
    let cache_ok = state.cache.ping().await;

    if db_ok && cache_ok {
        (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ready".to_string(),
                service: "statistics-service".to_string(),
            }),
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "not ready".to_string(),
                service: "statistics-service".to_string(),
            }),
        )
    }
}

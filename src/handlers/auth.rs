use crate::app_state::AppState;
use crate::error::AppError;
use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::Deserialize;

/// Minimal bearer-token claims. The real identity/authorization model
/// belongs to an externally-owned auth service; this is a stand-in guard
/// over the same `JWT_SECRET` so the HTTP contract is testable without
/// reimplementing that service.
#[derive(Debug, Deserialize)]
struct Claims {
    #[allow(dead_code)]
    sub: String,
    #[serde(default)]
    staff: bool,
    #[allow(dead_code)]
    exp: usize,
}

fn extract_claims(state: &AppState, req: &Request) -> Result<Claims, AppError> {
    let token = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Auth("missing bearer token".into()))?;

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(state.config.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| AppError::Auth(format!("invalid token: {e}")))?;

    Ok(data.claims)
}

pub async fn require_auth(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    extract_claims(&state, &req)?;
    Ok(next.run(req).await)
}

pub async fn require_staff(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let claims = extract_claims(&state, &req)?;
    if !claims.staff {
        return Err(AppError::Auth("staff role required".into()));
    }
    Ok(next.run(req).await)
}

use crate::app_state::AppState;
use crate::error::AppError;
use crate::models::{BatchRefreshRequest, BatchRefreshResponse, Platform, RefreshStatsResponse};
use crate::services::stats_collector;
use axum::extract::{Path, State};
use axum::response::Json;

const MAX_BATCH_SIZE: usize = 500;

async fn resolve_platform(state: &AppState, clip_id: &str) -> Result<(Platform, String), AppError> {
    let clip = state.clip_service.get_clip(clip_id).await?;
    let video_id = clip
        .platform_video_id
        .ok_or_else(|| AppError::NotFound(format!("clip {clip_id} has no platform video id")))?;
    let platform = Platform::parse(&clip.platform)
        .ok_or_else(|| AppError::Validation(format!("unknown platform {}", clip.platform)))?;
    Ok((platform, video_id))
}

/// `GET /stats/:clipId`
#[utoipa::path(
    get,
    path = "/stats/{clipId}",
    params(("clipId" = String, Path, description = "Clip submission id")),
    responses((status = 200, description = "Current stats for the clip", body = RefreshStatsResponse))
)]
pub async fn get_stats(
    State(state): State<AppState>,
    Path(clip_id): Path<String>,
) -> Result<Json<RefreshStatsResponse>, AppError> {
    let (platform, video_id) = resolve_platform(&state, &clip_id).await?;
    let stats = stats_collector::get_or_fetch_stats(&state, &clip_id, platform, &video_id).await?;
    Ok(Json(RefreshStatsResponse { stats }))
}

/// `POST /stats/refresh/:clipId` (auth required)
#[utoipa::path(
    post,
    path = "/stats/refresh/{clipId}",
    params(("clipId" = String, Path, description = "Clip submission id")),
    responses((status = 200, description = "Freshly-fetched stats for the clip", body = RefreshStatsResponse))
)]
pub async fn refresh(
    State(state): State<AppState>,
    Path(clip_id): Path<String>,
) -> Result<Json<RefreshStatsResponse>, AppError> {
    let (platform, video_id) = resolve_platform(&state, &clip_id).await?;
    let stats = stats_collector::refresh_clip_stats(&state, &clip_id, platform, &video_id).await?;
    Ok(Json(RefreshStatsResponse { stats }))
}

/// `POST /stats/batch-refresh` (staff, max 500 clips)
#[utoipa::path(
    post,
    path = "/stats/batch-refresh",
    request_body = BatchRefreshRequest,
    responses((status = 200, description = "Batch refresh counts", body = BatchRefreshResponse))
)]
pub async fn batch_refresh(
    State(state): State<AppState>,
    Json(request): Json<BatchRefreshRequest>,
) -> Result<Json<BatchRefreshResponse>, AppError> {
    if request.clips.len() > MAX_BATCH_SIZE {
        return Err(AppError::Validation(format!(
            "batch-refresh accepts at most {MAX_BATCH_SIZE} clips, got {}",
            request.clips.len()
        )));
    }

    let counts = stats_collector::batch_refresh_stats(&state, &request.clips).await;
    Ok(Json(BatchRefreshResponse {
        success_count: counts.success_count,
        fail_count: counts.fail_count,
    }))
}

use crate::app_state::AppState;
use crate::error::AppError;
use crate::models::{WeeklyCampaignRanking, WeeklyClipRanking};
use crate::services::rankings;
use axum::extract::{Query, State};
use axum::response::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

fn default_limit() -> u32 {
    50
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct WeeklyClipsQuery {
    #[serde(rename = "weekStart")]
    week_start: Option<NaiveDate>,
    #[serde(default = "default_limit")]
    limit: u32,
    platform: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct WeeklyCampaignsQuery {
    #[serde(rename = "weekStart")]
    week_start: Option<NaiveDate>,
    #[serde(default = "default_limit")]
    limit: u32,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct CalculateRankingsResponse {
    clips_ranked: usize,
    campaigns_ranked: usize,
}

fn week_start_or_today(week_start: Option<NaiveDate>) -> NaiveDate {
    let today = chrono::Utc::now().date_naive();
    rankings::monday_of(week_start.unwrap_or(today))
}

/// `GET /rankings/weekly-clips?weekStart&limit(1-200)&platform`
#[utoipa::path(
    get,
    path = "/rankings/weekly-clips",
    params(WeeklyClipsQuery),
    responses((status = 200, description = "Ranked clips for the week", body = [WeeklyClipRanking]))
)]
pub async fn weekly_clips(
    State(state): State<AppState>,
    Query(query): Query<WeeklyClipsQuery>,
) -> Result<Json<Vec<WeeklyClipRanking>>, AppError> {
    let week_start = week_start_or_today(query.week_start);
    let rows = rankings::list_weekly_clip_rankings(
        &state,
        week_start,
        query.limit,
        query.platform.as_deref(),
    )
    .await?;
    Ok(Json(rows))
}

/// `GET /rankings/weekly-campaigns?weekStart&limit(1-200)`
#[utoipa::path(
    get,
    path = "/rankings/weekly-campaigns",
    params(WeeklyCampaignsQuery),
    responses((status = 200, description = "Ranked campaigns for the week", body = [WeeklyCampaignRanking]))
)]
pub async fn weekly_campaigns(
    State(state): State<AppState>,
    Query(query): Query<WeeklyCampaignsQuery>,
) -> Result<Json<Vec<WeeklyCampaignRanking>>, AppError> {
    let week_start = week_start_or_today(query.week_start);
    let rows = rankings::list_weekly_campaign_rankings(&state, week_start, query.limit).await?;
    Ok(Json(rows))
}

/// `POST /rankings/calculate` (staff only)
#[utoipa::path(
    post,
    path = "/rankings/calculate",
    responses((status = 200, description = "Rows (re)ranked", body = CalculateRankingsResponse))
)]
pub async fn calculate(
    State(state): State<AppState>,
) -> Result<Json<CalculateRankingsResponse>, AppError> {
    let (clips_ranked, campaigns_ranked) = rankings::calculate_all(&state).await?;
    Ok(Json(CalculateRankingsResponse {
        clips_ranked,
        campaigns_ranked,
    }))
}

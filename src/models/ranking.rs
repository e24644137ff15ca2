use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Serialize, sqlx::FromRow, utoipa::ToSchema)]
pub struct WeeklyClipRanking {
    #[serde(rename = "weekStart")]
    pub week_start: NaiveDate,
    #[serde(rename = "weekEnd")]
    pub week_end: NaiveDate,
    #[serde(rename = "submissionId")]
    pub submission_id: String,
    pub platform: String,
    pub views: i64,
    pub likes: i64,
    pub engagement: f64,
    pub rank: u32,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow, utoipa::ToSchema)]
pub struct WeeklyCampaignRanking {
    #[serde(rename = "weekStart")]
    pub week_start: NaiveDate,
    #[serde(rename = "weekEnd")]
    pub week_end: NaiveDate,
    #[serde(rename = "campaignId")]
    pub campaign_id: String,
    #[serde(rename = "totalViews")]
    pub total_views: i64,
    #[serde(rename = "totalLikes")]
    pub total_likes: i64,
    #[serde(rename = "avgEngagement")]
    pub avg_engagement: f64,
    #[serde(rename = "clipsCount")]
    pub clips_count: u32,
    pub rank: u32,
}

/// Raw row pulled from clip-service before ranks are assigned.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ClipRankingSource {
    #[serde(rename = "submissionId")]
    pub submission_id: String,
    pub platform: String,
    pub views: i64,
    pub likes: i64,
    pub engagement: f64,
}

/// Raw row pulled from clip-service before ranks are assigned.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct CampaignRankingSource {
    #[serde(rename = "campaignId")]
    pub campaign_id: String,
    #[serde(rename = "totalViews")]
    pub total_views: i64,
    #[serde(rename = "totalLikes")]
    pub total_likes: i64,
    #[serde(rename = "avgEngagement")]
    pub avg_engagement: f64,
    #[serde(rename = "clipsCount")]
    pub clips_count: u32,
}

use serde::Deserialize;

/// Clip record as returned by `GET clip-service/clips/:id`. Only the fields
/// the statistics pipeline needs are modeled; the clip-service owns the
/// rest of the entity.
#[derive(Debug, Clone, Deserialize)]
pub struct ClipRecord {
    #[serde(rename = "submissionId")]
    pub submission_id: String,
    pub platform: String,
    #[serde(rename = "platformVideoId")]
    pub platform_video_id: Option<String>,
    #[serde(rename = "campaignId")]
    pub campaign_id: Option<String>,
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

/// One row of `GET clip-service/clips/needs-refresh`.
#[derive(Debug, Clone, Deserialize)]
pub struct NeedsRefreshClip {
    #[serde(rename = "submissionId")]
    pub submission_id: String,
    pub platform: String,
    #[serde(rename = "videoId")]
    pub video_id: String,
}

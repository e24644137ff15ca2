use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Platform {
    Youtube,
    Tiktok,
    Instagram,
    Twitter,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Youtube => "YOUTUBE",
            Platform::Tiktok => "TIKTOK",
            Platform::Instagram => "INSTAGRAM",
            Platform::Twitter => "TWITTER",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "YOUTUBE" => Some(Platform::Youtube),
            "TIKTOK" => Some(Platform::Tiktok),
            "INSTAGRAM" => Some(Platform::Instagram),
            "TWITTER" => Some(Platform::Twitter),
            _ => None,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Normalized counter tuple produced by every platform adapter. Immutable
/// once constructed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct PlatformStats {
    pub views: i64,
    pub likes: i64,
    pub comments: i64,
    pub shares: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
}

impl PlatformStats {
    pub fn engagement_ratio(&self) -> f64 {
        if self.views > 0 {
            (self.likes + self.comments) as f64 / self.views as f64
        } else {
            0.0
        }
    }
}

/// One sample in a clip's engagement history, as returned by the
/// clip-service. Newest-first ordering is a contract of the caller, not
/// re-sorted here.
#[derive(Debug, Clone, Deserialize)]
pub struct StatsHistoryEntry {
    pub views: i64,
    pub likes: i64,
    pub comments: i64,
    pub shares: i64,
    #[serde(rename = "recordedAt")]
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsUpdatedEvent {
    #[serde(rename = "clipId")]
    pub clip_id: String,
    pub views: i64,
    pub likes: i64,
    pub comments: i64,
    pub shares: i64,
    pub engagement: f64,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct RefreshStatsResponse {
    pub stats: PlatformStats,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct BatchRefreshResponse {
    #[serde(rename = "successCount")]
    pub success_count: u32,
    #[serde(rename = "failCount")]
    pub fail_count: u32,
}

#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct BatchRefreshRequest {
    pub clips: Vec<ClipRefreshTarget>,
}

#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct ClipRefreshTarget {
    #[serde(rename = "submissionId")]
    pub submission_id: String,
    pub platform: String,
    #[serde(rename = "videoId")]
    pub video_id: String,
}

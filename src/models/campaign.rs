use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CampaignCacheRow {
    #[serde(rename = "campaignId")]
    pub campaign_id: String,
    pub title: String,
    pub status: String,
    #[serde(rename = "syncedAt")]
    pub synced_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CampaignCreatedEvent {
    #[serde(rename = "campaignId")]
    pub campaign_id: String,
    pub title: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CampaignStatusChangedEvent {
    #[serde(rename = "campaignId")]
    pub campaign_id: String,
    #[serde(rename = "newStatus")]
    pub new_status: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CampaignServiceCampaign {
    #[serde(rename = "campaignId")]
    pub campaign_id: String,
    pub title: String,
    pub status: String,
}

use super::{INTERNAL_SERVICE_HEADER, INTERNAL_SERVICE_NAME};
use crate::error::AppError;
use crate::models::CampaignServiceCampaign;
use std::time::Duration;

/// HTTP client for the campaign-service peer, used on a CampaignCache miss.
pub struct CampaignServiceClient {
    http: reqwest::Client,
    base_url: String,
}

impl CampaignServiceClient {
    pub fn new(base_url: String) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .expect("reqwest client builds with no custom TLS config");
        Self { http, base_url }
    }

    pub async fn get_campaign(&self, campaign_id: &str) -> Result<CampaignServiceCampaign, AppError> {
        let resp = self
            .http
            .get(format!("{}/campaigns/{campaign_id}", self.base_url))
            .header(INTERNAL_SERVICE_HEADER, INTERNAL_SERVICE_NAME)
            .send()
            .await?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(format!(
                "campaign {campaign_id} not found"
            )));
        }
        if !resp.status().is_success() {
            return Err(AppError::UpstreamHttp(format!(
                "campaign-service returned {} for campaign {campaign_id}",
                resp.status()
            )));
        }

        resp.json().await.map_err(|e| AppError::Parse(e.to_string()))
    }
}

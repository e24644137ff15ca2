use super::{INTERNAL_SERVICE_HEADER, INTERNAL_SERVICE_NAME};
use crate::error::AppError;
use crate::models::{
    CampaignRankingSource, ClipRankingSource, ClipRecord, NeedsRefreshClip, StatsHistoryEntry,
};
use chrono::NaiveDate;
use std::time::Duration;

/// HTTP client for the clip-service peer. Every call carries the
/// `X-Internal-Service` header; timeouts sit at the low end of what peer
/// calls can tolerate, since this client is always invoked from a
/// latency-sensitive path (event handler, batch refresh, rankings run).
pub struct ClipServiceClient {
    http: reqwest::Client,
    base_url: String,
}

impl ClipServiceClient {
    pub fn new(base_url: String) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .expect("reqwest client builds with no custom TLS config");
        Self { http, base_url }
    }

    fn request(&self, path: &str) -> reqwest::RequestBuilder {
        self.http
            .get(format!("{}{}", self.base_url, path))
            .header(INTERNAL_SERVICE_HEADER, INTERNAL_SERVICE_NAME)
    }

    pub async fn get_clip(&self, clip_id: &str) -> Result<ClipRecord, AppError> {
        let resp = self
            .request(&format!("/clips/{clip_id}"))
            .send()
            .await?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(format!("clip {clip_id} not found")));
        }
        if !resp.status().is_success() {
            return Err(AppError::UpstreamHttp(format!(
                "clip-service returned {} for clip {clip_id}",
                resp.status()
            )));
        }

        resp.json().await.map_err(|e| AppError::Parse(e.to_string()))
    }

    pub async fn needs_refresh(&self) -> Result<Vec<NeedsRefreshClip>, AppError> {
        let resp = self.request("/clips/needs-refresh").send().await?;
        if !resp.status().is_success() {
            return Err(AppError::UpstreamHttp(format!(
                "clip-service returned {} for needs-refresh",
                resp.status()
            )));
        }
        resp.json().await.map_err(|e| AppError::Parse(e.to_string()))
    }

    pub async fn stats_history(&self, clip_id: &str) -> Result<Vec<StatsHistoryEntry>, AppError> {
        let resp = self
            .request(&format!("/clips/{clip_id}/stats-history"))
            .send()
            .await?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(format!(
                "no stats history for clip {clip_id}"
            )));
        }
        if !resp.status().is_success() {
            return Err(AppError::UpstreamHttp(format!(
                "clip-service returned {} for stats-history of {clip_id}",
                resp.status()
            )));
        }

        resp.json().await.map_err(|e| AppError::Parse(e.to_string()))
    }

    pub async fn approved_for_rankings(
        &self,
        week_start: NaiveDate,
        week_end: NaiveDate,
    ) -> Result<Vec<ClipRankingSource>, AppError> {
        let resp = self
            .http
            .get(format!("{}/clips/approved-for-rankings", self.base_url))
            .header(INTERNAL_SERVICE_HEADER, INTERNAL_SERVICE_NAME)
            .query(&[
                ("weekStart", week_start.to_string()),
                ("weekEnd", week_end.to_string()),
            ])
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(AppError::UpstreamHttp(format!(
                "clip-service returned {} for approved-for-rankings",
                resp.status()
            )));
        }

        resp.json().await.map_err(|e| AppError::Parse(e.to_string()))
    }

    pub async fn campaign_stats_for_rankings(
        &self,
        week_start: NaiveDate,
        week_end: NaiveDate,
    ) -> Result<Vec<CampaignRankingSource>, AppError> {
        let resp = self
            .http
            .get(format!("{}/clips/campaign-stats-for-rankings", self.base_url))
            .header(INTERNAL_SERVICE_HEADER, INTERNAL_SERVICE_NAME)
            .query(&[
                ("weekStart", week_start.to_string()),
                ("weekEnd", week_end.to_string()),
            ])
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(AppError::UpstreamHttp(format!(
                "clip-service returned {} for campaign-stats-for-rankings",
                resp.status()
            )));
        }

        resp.json().await.map_err(|e| AppError::Parse(e.to_string()))
    }
}

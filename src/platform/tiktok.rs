use super::PlatformAdapter;
use crate::error::AppError;
use crate::models::PlatformStats;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

const BASE_URL: &str = "https://www.tikwm.com/api/";

pub struct TiktokAdapter {
    http: reqwest::Client,
}

impl TiktokAdapter {
    pub fn new() -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("reqwest client builds with no custom TLS config");
        Self { http }
    }
}

#[derive(Deserialize)]
struct TikwmResponse {
    data: Option<TikwmData>,
}

#[derive(Deserialize)]
struct TikwmData {
    #[serde(default)]
    play_count: i64,
    #[serde(default)]
    digg_count: i64,
    #[serde(default)]
    comment_count: i64,
    #[serde(default)]
    share_count: i64,
    title: Option<String>,
    cover: Option<String>,
    author: Option<TikwmAuthor>,
}

#[derive(Deserialize)]
struct TikwmAuthor {
    nickname: Option<String>,
}

fn resolve_url(video_id: &str) -> String {
    if video_id.contains("tiktok.com") {
        video_id.to_string()
    } else {
        format!("https://www.tiktok.com/@tiktok/video/{video_id}")
    }
}

#[async_trait]
impl PlatformAdapter for TiktokAdapter {
    async fn fetch(&self, video_id: &str) -> Result<PlatformStats, AppError> {
        let target_url = resolve_url(video_id);

        let resp = self
            .http
            .get(BASE_URL)
            .query(&[("url", target_url.as_str())])
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(AppError::UpstreamHttp(format!(
                "tikwm returned {}",
                resp.status()
            )));
        }

        let body: TikwmResponse = resp.json().await.map_err(|e| AppError::Parse(e.to_string()))?;

        let Some(data) = body.data else {
            // No `.data` on the response is a soft "not found" from tikwm,
            // not a transport failure — return zeros so callers proceed.
            return Ok(PlatformStats::default());
        };

        Ok(PlatformStats {
            views: data.play_count,
            likes: data.digg_count,
            comments: data.comment_count,
            shares: data.share_count,
            thumbnail_url: data.cover,
            title: data.title,
            author: data.author.and_then(|a| a.nickname),
            published_at: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_url_passes_through_an_existing_tiktok_url() {
        assert_eq!(
            resolve_url("https://www.tiktok.com/@someone/video/123"),
            "https://www.tiktok.com/@someone/video/123"
        );
    }

    #[test]
    fn resolve_url_builds_a_canonical_url_from_a_bare_id() {
        assert_eq!(
            resolve_url("7123456789"),
            "https://www.tiktok.com/@tiktok/video/7123456789"
        );
    }

    #[test]
    fn tikwm_response_counters_round_trip_into_platform_stats() {
        let json = r#"{
            "data": {
                "play_count": 500,
                "digg_count": 40,
                "comment_count": 5,
                "share_count": 3,
                "title": "clip",
                "cover": "https://example.com/thumb.jpg",
                "author": {"nickname": "creator"}
            }
        }"#;
        let body: TikwmResponse = serde_json::from_str(json).unwrap();
        let data = body.data.expect("data present");

        assert_eq!(data.play_count, 500);
        assert_eq!(data.digg_count, 40);
        assert_eq!(data.comment_count, 5);
        assert_eq!(data.share_count, 3);
        assert_eq!(data.title.as_deref(), Some("clip"));
        assert_eq!(data.cover.as_deref(), Some("https://example.com/thumb.jpg"));
        assert_eq!(
            data.author.and_then(|a| a.nickname).as_deref(),
            Some("creator")
        );
    }

    #[test]
    fn tikwm_response_missing_counters_default_to_zero() {
        let json = r#"{"data": {"title": null, "cover": null, "author": null}}"#;
        let body: TikwmResponse = serde_json::from_str(json).unwrap();
        let data = body.data.expect("data present");

        assert_eq!(data.play_count, 0);
        assert_eq!(data.digg_count, 0);
        assert_eq!(data.comment_count, 0);
        assert_eq!(data.share_count, 0);
    }

    #[test]
    fn tikwm_response_with_no_data_field_is_a_soft_miss() {
        let json = r#"{"data": null}"#;
        let body: TikwmResponse = serde_json::from_str(json).unwrap();
        assert!(body.data.is_none());
    }
}

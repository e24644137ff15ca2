use super::PlatformAdapter;
use crate::error::AppError;
use crate::models::PlatformStats;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

const BASE_URL: &str = "https://www.googleapis.com/youtube/v3/videos";

pub struct YoutubeAdapter {
    http: reqwest::Client,
    api_key: Option<String>,
}

impl YoutubeAdapter {
    pub fn new(api_key: Option<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("reqwest client builds with no custom TLS config");
        Self { http, api_key }
    }
}

#[derive(Deserialize)]
struct VideosResponse {
    items: Vec<VideoItem>,
}

#[derive(Deserialize)]
struct VideoItem {
    statistics: Option<Statistics>,
    snippet: Option<Snippet>,
}

#[derive(Deserialize, Default)]
struct Statistics {
    #[serde(rename = "viewCount")]
    view_count: Option<String>,
    #[serde(rename = "likeCount")]
    like_count: Option<String>,
    #[serde(rename = "commentCount")]
    comment_count: Option<String>,
}

#[derive(Deserialize, Default)]
struct Snippet {
    title: Option<String>,
    #[serde(rename = "channelTitle")]
    channel_title: Option<String>,
    #[serde(rename = "publishedAt")]
    published_at: Option<chrono::DateTime<chrono::Utc>>,
}

fn parse_count(raw: &Option<String>) -> i64 {
    raw.as_deref().and_then(|s| s.parse().ok()).unwrap_or(0)
}

#[async_trait]
impl PlatformAdapter for YoutubeAdapter {
    async fn fetch(&self, video_id: &str) -> Result<PlatformStats, AppError> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| AppError::Config("YOUTUBE_API_KEY is not configured".into()))?;

        let resp = self
            .http
            .get(BASE_URL)
            .query(&[
                ("part", "statistics,snippet"),
                ("id", video_id),
                ("key", api_key),
            ])
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(AppError::UpstreamHttp(format!(
                "youtube api returned {}",
                resp.status()
            )));
        }

        let body: VideosResponse = resp.json().await.map_err(|e| AppError::Parse(e.to_string()))?;
        let item = body
            .items
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound(format!("youtube video {video_id} not found")))?;

        let statistics = item.statistics.unwrap_or_default();
        let snippet = item.snippet.unwrap_or_default();

        Ok(PlatformStats {
            views: parse_count(&statistics.view_count),
            likes: parse_count(&statistics.like_count),
            comments: parse_count(&statistics.comment_count),
            shares: 0,
            thumbnail_url: None,
            title: snippet.title,
            author: snippet.channel_title,
            published_at: snippet.published_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_count_reads_numeric_strings() {
        assert_eq!(parse_count(&Some("12345".to_string())), 12345);
    }

    #[test]
    fn parse_count_defaults_missing_or_unparseable_to_zero() {
        assert_eq!(parse_count(&None), 0);
        assert_eq!(parse_count(&Some("not-a-number".to_string())), 0);
    }

    #[test]
    fn videos_response_counters_round_trip_into_platform_stats() {
        let json = r#"{
            "items": [{
                "statistics": {"viewCount": "1000", "likeCount": "200", "commentCount": "30"},
                "snippet": {"title": "clip", "channelTitle": "creator", "publishedAt": "2024-01-01T00:00:00Z"}
            }]
        }"#;
        let body: VideosResponse = serde_json::from_str(json).unwrap();
        let item = body.items.into_iter().next().unwrap();
        let statistics = item.statistics.unwrap_or_default();
        let snippet = item.snippet.unwrap_or_default();

        assert_eq!(parse_count(&statistics.view_count), 1000);
        assert_eq!(parse_count(&statistics.like_count), 200);
        assert_eq!(parse_count(&statistics.comment_count), 30);
        assert_eq!(snippet.title.as_deref(), Some("clip"));
        assert_eq!(snippet.channel_title.as_deref(), Some("creator"));
        assert!(snippet.published_at.is_some());
    }

    #[test]
    fn videos_response_missing_statistics_and_snippet_default_to_zero_and_none() {
        let json = r#"{"items": [{"statistics": null, "snippet": null}]}"#;
        let body: VideosResponse = serde_json::from_str(json).unwrap();
        let item = body.items.into_iter().next().unwrap();
        let statistics = item.statistics.unwrap_or_default();
        let snippet = item.snippet.unwrap_or_default();

        assert_eq!(parse_count(&statistics.view_count), 0);
        assert_eq!(parse_count(&statistics.like_count), 0);
        assert_eq!(parse_count(&statistics.comment_count), 0);
        assert!(snippet.title.is_none());
        assert!(snippet.published_at.is_none());
    }
}

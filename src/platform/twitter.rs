use super::PlatformAdapter;
use crate::error::AppError;
use crate::models::PlatformStats;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::time::Duration;

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

static TWEET_ID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:twitter\.com|x\.com|nitter\.[^/]+)/[^/]+/status/(\d+)")
        .expect("tweet id pattern is a fixed, valid regex")
});

pub struct TwitterAdapter {
    http: reqwest::Client,
}

impl TwitterAdapter {
    pub fn new() -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("reqwest client builds with no custom TLS config");
        Self { http }
    }

    fn extract_tweet_id(input: &str) -> Option<String> {
        TWEET_ID_RE
            .captures(input)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
    }
}

#[derive(Deserialize, Default)]
struct TweetResult {
    #[serde(default)]
    impression_count: i64,
    #[serde(default)]
    favorite_count: i64,
    #[serde(default)]
    conversation_count: i64,
    #[serde(default)]
    retweet_count: i64,
    #[serde(default)]
    quote_count: i64,
}

#[async_trait]
impl PlatformAdapter for TwitterAdapter {
    async fn fetch(&self, video_id: &str) -> Result<PlatformStats, AppError> {
        let Some(tweet_id) = Self::extract_tweet_id(video_id) else {
            // A regex miss means video_id isn't a tweet URL we recognize,
            // not a transport failure -- return zeros so callers proceed.
            return Ok(PlatformStats::default());
        };

        let resp = self
            .http
            .get("https://cdn.syndication.twimg.com/tweet-result")
            .query(&[("id", tweet_id.as_str()), ("token", "x")])
            .header("User-Agent", USER_AGENT)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(AppError::UpstreamHttp(format!(
                "twitter syndication returned {}",
                resp.status()
            )));
        }

        let body: TweetResult = resp.json().await.map_err(|e| AppError::Parse(e.to_string()))?;

        Ok(PlatformStats {
            views: body.impression_count,
            likes: body.favorite_count,
            comments: body.conversation_count,
            shares: body.retweet_count + body.quote_count,
            thumbnail_url: None,
            title: None,
            author: None,
            published_at: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_id_from_twitter_dot_com() {
        let id = TwitterAdapter::extract_tweet_id("https://twitter.com/jack/status/20");
        assert_eq!(id, Some("20".to_string()));
    }

    #[test]
    fn extracts_id_from_x_dot_com() {
        let id = TwitterAdapter::extract_tweet_id("https://x.com/jack/status/1234567890");
        assert_eq!(id, Some("1234567890".to_string()));
    }

    #[test]
    fn extracts_id_from_nitter_mirror() {
        let id = TwitterAdapter::extract_tweet_id("https://nitter.net/jack/status/42");
        assert_eq!(id, Some("42".to_string()));
    }

    #[test]
    fn returns_none_for_non_matching_input() {
        assert_eq!(TwitterAdapter::extract_tweet_id("not a tweet url"), None);
    }

    #[tokio::test]
    async fn fetch_returns_zeroed_stats_instead_of_an_error_when_the_regex_misses() {
        let adapter = TwitterAdapter::new();
        let stats = adapter
            .fetch("not a tweet url")
            .await
            .expect("a regex miss is a soft result, not an error");
        assert_eq!(stats, PlatformStats::default());
    }
}

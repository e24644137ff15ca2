mod redis_timeout;

use crate::models::{Platform, PlatformStats};
use redis::AsyncCommands;
use redis_timeout::run_with_timeout;

const TTL_SECONDS: u64 = 3600;

/// Key-value cache over Redis. Advisory only: correctness of the rest of
/// the pipeline never depends on a cache hit. Deserialization failures and
/// connection errors both resolve to a miss, logged, never propagated.
pub struct StatsCache {
    client: redis::Client,
}

impl StatsCache {
    pub fn new(redis_url: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(redis_url)?;
        Ok(Self { client })
    }

    fn key(platform: Platform, video_id: &str) -> String {
        format!("stats:{}:{}", platform.as_str(), video_id)
    }

    pub async fn get(&self, platform: Platform, video_id: &str) -> Option<PlatformStats> {
        let key = Self::key(platform, video_id);
        let mut conn = match self.client.get_multiplexed_async_connection().await {
            Ok(c) => c,
            Err(e) => {
                log::warn!("stats cache: failed to get connection: {e}");
                return None;
            }
        };

        let raw: Option<String> = match run_with_timeout(conn.get(&key)).await {
            Ok(v) => v,
            Err(e) => {
                log::warn!("stats cache: get({key}) failed: {e}");
                return None;
            }
        };

        match raw {
            Some(json) => match serde_json::from_str(&json) {
                Ok(stats) => Some(stats),
                Err(e) => {
                    log::warn!("stats cache: corrupt entry at {key}: {e}");
                    None
                }
            },
            None => None,
        }
    }

    /// Used by the `/ready` probe: true iff a connection and a round-trip
    /// PING both succeed.
    pub async fn ping(&self) -> bool {
        let mut conn = match self.client.get_multiplexed_async_connection().await {
            Ok(c) => c,
            Err(_) => return false,
        };
        let pong: Result<String, redis::RedisError> =
            run_with_timeout(redis::cmd("PING").query_async(&mut conn)).await;
        pong.is_ok()
    }

    pub async fn set(&self, platform: Platform, video_id: &str, stats: &PlatformStats) {
        let key = Self::key(platform, video_id);
        let json = match serde_json::to_string(stats) {
            Ok(j) => j,
            Err(e) => {
                log::warn!("stats cache: failed to serialize entry for {key}: {e}");
                return;
            }
        };

        let mut conn = match self.client.get_multiplexed_async_connection().await {
            Ok(c) => c,
            Err(e) => {
                log::warn!("stats cache: failed to get connection: {e}");
                return;
            }
        };

        let result: Result<(), redis::RedisError> =
            run_with_timeout(conn.set_ex(&key, json, TTL_SECONDS)).await;
        if let Err(e) = result {
            log::warn!("stats cache: set({key}) failed: {e}");
        }
    }
}

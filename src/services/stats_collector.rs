use crate::app_state::AppState;
use crate::error::AppError;
use crate::models::{ClipRefreshTarget, Platform, PlatformStats, StatsUpdatedEvent};
use crate::services::bot_detector;
use std::time::Duration;

const ROUTING_KEY_STATS_UPDATED: &str = "stats.updated";
const BATCH_INTER_REQUEST_DELAY: Duration = Duration::from_millis(100);

/// Fetches fresh stats via the matching platform adapter, writes the cache,
/// and publishes `stats.updated`. Adapter failures propagate to the caller;
/// cache and publish failures are logged and swallowed.
pub async fn refresh_clip_stats(
    state: &AppState,
    submission_id: &str,
    platform: Platform,
    video_id: &str,
) -> Result<PlatformStats, AppError> {
    let adapter = state.platforms.get(platform);
    let stats = adapter.fetch(video_id).await?;

    state.cache.set(platform, video_id, &stats).await;

    let event = StatsUpdatedEvent {
        clip_id: submission_id.to_string(),
        views: stats.views,
        likes: stats.likes,
        comments: stats.comments,
        shares: stats.shares,
        engagement: stats.engagement_ratio(),
    };

    if let Err(e) = state
        .publisher
        .publish(ROUTING_KEY_STATS_UPDATED, &event)
        .await
    {
        log::warn!("failed to publish stats.updated for {submission_id}: {e}");
    }

    // Bot detection runs per clip, off the critical refresh path: spawned
    // so a slow clip-service history fetch never delays the caller's
    // stats.updated response.
    let bot_state = state.clone();
    let bot_clip_id = submission_id.to_string();
    tokio::spawn(async move {
        bot_detector::run_bot_detection(&bot_state, &bot_clip_id).await;
    });

    Ok(stats)
}

/// Cache-first read: returns the cached tuple on a hit with no network
/// call, otherwise falls through to [`refresh_clip_stats`].
pub async fn get_or_fetch_stats(
    state: &AppState,
    submission_id: &str,
    platform: Platform,
    video_id: &str,
) -> Result<PlatformStats, AppError> {
    if let Some(cached) = state.cache.get(platform, video_id).await {
        return Ok(cached);
    }
    refresh_clip_stats(state, submission_id, platform, video_id).await
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BatchRefreshCounts {
    pub success_count: u32,
    pub fail_count: u32,
}

/// Sequential batch refresh with a fixed 100ms pause after every clip
/// (success or failure) to stay under the free-tier platform APIs' soft
/// rate limits. Per-clip failures are counted, never abort the run.
pub async fn batch_refresh_stats(
    state: &AppState,
    clips: &[ClipRefreshTarget],
) -> BatchRefreshCounts {
    let mut counts = BatchRefreshCounts::default();

    for clip in clips {
        let Some(platform) = Platform::parse(&clip.platform) else {
            log::warn!(
                "batch refresh: unknown platform {} for clip {}",
                clip.platform,
                clip.submission_id
            );
            counts.fail_count += 1;
            tokio::time::sleep(BATCH_INTER_REQUEST_DELAY).await;
            continue;
        };

        match refresh_clip_stats(state, &clip.submission_id, platform, &clip.video_id).await {
            Ok(_) => counts.success_count += 1,
            Err(e) => {
                log::warn!(
                    "batch refresh failed for clip {}: {e}",
                    clip.submission_id
                );
                counts.fail_count += 1;
            }
        }

        tokio::time::sleep(BATCH_INTER_REQUEST_DELAY).await;
    }

    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engagement_ratio_zero_views_is_zero_not_nan() {
        let stats = PlatformStats {
            views: 0,
            likes: 10,
            comments: 5,
            shares: 0,
            ..Default::default()
        };
        assert_eq!(stats.engagement_ratio(), 0.0);
    }

    #[test]
    fn engagement_ratio_divides_likes_plus_comments_by_views() {
        let stats = PlatformStats {
            views: 1000,
            likes: 80,
            comments: 20,
            shares: 5,
            ..Default::default()
        };
        assert!((stats.engagement_ratio() - 0.1).abs() < 1e-9);
    }
}

use crate::app_state::AppState;
use crate::models::{
    BotDetectedEvent, BotDetectionResult, BotFlag, BotFlagType, Platform, Severity,
    StatsHistoryEntry,
};
use chrono::Timelike;

const ROUTING_KEY_BOT_DETECTED: &str = "stats.bot_detected";

struct Thresholds {
    views_spike_high: f64,
    views_spike_medium: f64,
    likes_spike_high: f64,
    likes_spike_medium: f64,
    comments_spike_high: f64,
    engagement_ratio_high: f64,
    engagement_ratio_medium: f64,
    min_views: i64,
}

fn thresholds_for(platform: Platform) -> Thresholds {
    match platform {
        Platform::Tiktok => Thresholds {
            views_spike_high: 800.0,
            views_spike_medium: 300.0,
            likes_spike_high: 400.0,
            likes_spike_medium: 200.0,
            comments_spike_high: 500.0,
            engagement_ratio_high: 0.40,
            engagement_ratio_medium: 0.25,
            min_views: 500,
        },
        Platform::Instagram => Thresholds {
            views_spike_high: 600.0,
            views_spike_medium: 250.0,
            likes_spike_high: 350.0,
            likes_spike_medium: 180.0,
            comments_spike_high: 450.0,
            engagement_ratio_high: 0.35,
            engagement_ratio_medium: 0.20,
            min_views: 300,
        },
        // Youtube and Twitter share thresholds; unknown platforms fall
        // back to this table too (see `detect`'s caller).
        Platform::Youtube | Platform::Twitter => Thresholds {
            views_spike_high: 700.0,
            views_spike_medium: 280.0,
            likes_spike_high: 380.0,
            likes_spike_medium: 190.0,
            comments_spike_high: 480.0,
            engagement_ratio_high: 0.38,
            engagement_ratio_medium: 0.22,
            min_views: 400,
        },
    }
}

/// `g(prev, curr)`. Growth of zero from zero is zero; growth from zero to
/// any positive count is unbounded.
fn growth_rate(prev: i64, curr: i64) -> f64 {
    if prev == 0 {
        if curr > 0 {
            f64::INFINITY
        } else {
            0.0
        }
    } else {
        ((curr - prev) as f64 / prev as f64) * 100.0
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn stdev(values: &[f64]) -> f64 {
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

fn detect_views_spike(history: &[StatsHistoryEntry], th: &Thresholds) -> Option<BotFlag> {
    if history.len() < 2 {
        return None;
    }
    let (latest, previous) = (&history[0], &history[1]);
    let g = growth_rate(previous.views, latest.views);
    let delta = latest.views - previous.views;

    if g > th.views_spike_high && delta > 2 * th.min_views {
        Some(BotFlag {
            flag_type: BotFlagType::ViewsSpike,
            severity: Severity::High,
            description: format!("views grew {g:.0}% ({delta:+} views) between consecutive samples"),
            confidence: 90,
        })
    } else if g > th.views_spike_medium && delta > th.min_views {
        Some(BotFlag {
            flag_type: BotFlagType::ViewsSpike,
            severity: Severity::Medium,
            description: format!("views grew {g:.0}% ({delta:+} views) between consecutive samples"),
            confidence: 70,
        })
    } else {
        None
    }
}

fn detect_likes_spike(history: &[StatsHistoryEntry], th: &Thresholds) -> Option<BotFlag> {
    if history.len() < 2 {
        return None;
    }
    let (latest, previous) = (&history[0], &history[1]);
    let g = growth_rate(previous.likes, latest.likes);
    let delta = latest.likes - previous.likes;

    if g > th.likes_spike_high && delta > 100 {
        Some(BotFlag {
            flag_type: BotFlagType::LikesSpike,
            severity: Severity::High,
            description: format!("likes grew {g:.0}% ({delta:+} likes) between consecutive samples"),
            confidence: 85,
        })
    } else if g > th.likes_spike_medium && delta > 50 {
        Some(BotFlag {
            flag_type: BotFlagType::LikesSpike,
            severity: Severity::Medium,
            description: format!("likes grew {g:.0}% ({delta:+} likes) between consecutive samples"),
            confidence: 65,
        })
    } else {
        None
    }
}

fn detect_comments_spike(history: &[StatsHistoryEntry], th: &Thresholds) -> Option<BotFlag> {
    if history.len() < 2 {
        return None;
    }
    let (latest, previous) = (&history[0], &history[1]);
    let g = growth_rate(previous.comments, latest.comments);
    let delta = latest.comments - previous.comments;

    if g > th.comments_spike_high && delta > 50 {
        Some(BotFlag {
            flag_type: BotFlagType::CommentsSpike,
            severity: Severity::High,
            description: format!(
                "comments grew {g:.0}% ({delta:+} comments) between consecutive samples"
            ),
            confidence: 88,
        })
    } else {
        None
    }
}

fn detect_engagement_ratio(history: &[StatsHistoryEntry], th: &Thresholds) -> Option<BotFlag> {
    if history.len() < 2 {
        return None;
    }
    let latest = &history[0];
    if latest.views == 0 {
        return None;
    }
    let r = (latest.likes + latest.comments) as f64 / latest.views as f64;

    if r > th.engagement_ratio_high && latest.views > th.min_views {
        Some(BotFlag {
            flag_type: BotFlagType::EngagementRatio,
            severity: Severity::High,
            description: format!("engagement ratio {r:.2} exceeds high threshold"),
            confidence: 92,
        })
    } else if r > th.engagement_ratio_medium {
        Some(BotFlag {
            flag_type: BotFlagType::EngagementRatio,
            severity: Severity::Medium,
            description: format!("engagement ratio {r:.2} exceeds medium threshold"),
            confidence: 75,
        })
    } else {
        None
    }
}

/// Near-linear view growth -- real organic traffic is noisier than this.
fn detect_zero_variance(history: &[StatsHistoryEntry]) -> Option<BotFlag> {
    if history.len() < 5 {
        return None;
    }

    let samples: Vec<f64> = history
        .windows(2)
        .map(|pair| growth_rate(pair[1].views, pair[0].views))
        .filter(|g| g.is_finite())
        .collect();

    if samples.len() < 5 {
        return None;
    }

    let m = mean(&samples);
    if m.abs() < f64::EPSILON {
        return None;
    }
    let cv = stdev(&samples) / m.abs();

    if cv < 0.1 && m > 20.0 {
        Some(BotFlag {
            flag_type: BotFlagType::ZeroVariance,
            severity: Severity::High,
            description: format!("view growth is near-linear across samples (cv={cv:.3})"),
            confidence: 95,
        })
    } else {
        None
    }
}

fn detect_velocity_anomaly(history: &[StatsHistoryEntry]) -> Option<BotFlag> {
    if history.len() < 5 {
        return None;
    }

    let velocity: Vec<f64> = history
        .windows(2)
        .map(|pair| (pair[0].views - pair[1].views) as f64)
        .collect();

    if velocity.len() < 2 {
        return None;
    }

    let acceleration: Vec<f64> = velocity.windows(2).map(|pair| pair[0] - pair[1]).collect();
    if acceleration.is_empty() {
        return None;
    }

    let max_abs_accel = acceleration.iter().fold(0.0_f64, |m, a| m.max(a.abs()));
    let avg_accel = mean(&acceleration);

    if max_abs_accel > 5.0 * avg_accel && max_abs_accel > 1000.0 {
        Some(BotFlag {
            flag_type: BotFlagType::VelocityAnomaly,
            severity: Severity::High,
            description: format!("view velocity swings by {max_abs_accel:.0} between samples"),
            confidence: 85,
        })
    } else {
        None
    }
}

fn detect_ratio_anomaly(history: &[StatsHistoryEntry]) -> Option<BotFlag> {
    if history.len() < 5 {
        return None;
    }
    let latest = &history[0];
    if latest.views < 100 {
        return None;
    }
    let likes_ratio = latest.likes as f64 / latest.views as f64;
    let comments_ratio = latest.comments as f64 / latest.views as f64;

    if likes_ratio > 0.15 && latest.views > 1000 {
        Some(BotFlag {
            flag_type: BotFlagType::RatioAnomaly,
            severity: Severity::High,
            description: format!("likes/views ratio {likes_ratio:.2} is abnormally high"),
            confidence: 90,
        })
    } else if comments_ratio > 0.05 && latest.views > 1000 {
        Some(BotFlag {
            flag_type: BotFlagType::RatioAnomaly,
            severity: Severity::Medium,
            description: format!("comments/views ratio {comments_ratio:.2} is abnormally high"),
            confidence: 75,
        })
    } else {
        None
    }
}

fn detect_sudden_stop(history: &[StatsHistoryEntry]) -> Option<BotFlag> {
    if history.len() < 12 {
        return None;
    }

    let window_avg = |window: &[StatsHistoryEntry]| -> f64 {
        let deltas: Vec<f64> = window
            .windows(2)
            .map(|pair| (pair[0].views - pair[1].views) as f64)
            .collect();
        mean(&deltas)
    };

    let recent_avg = window_avg(&history[0..6]);
    let previous_avg = window_avg(&history[6..12]);

    if previous_avg > 500.0 && recent_avg < 0.1 * previous_avg {
        Some(BotFlag {
            flag_type: BotFlagType::SuddenStop,
            severity: Severity::Medium,
            description: format!(
                "growth collapsed from {previous_avg:.0}/sample to {recent_avg:.0}/sample"
            ),
            confidence: 70,
        })
    } else {
        None
    }
}

fn detect_time_pattern(history: &[StatsHistoryEntry]) -> Option<BotFlag> {
    if history.len() < 24 {
        return None;
    }

    let mut buckets = [0.0_f64; 24];
    for pair in history.windows(2) {
        let delta = (pair[0].views - pair[1].views) as f64;
        let hour = pair[0].recorded_at.hour() as usize;
        buckets[hour] += delta;
    }

    let max_bucket = buckets.iter().cloned().fold(f64::MIN, f64::max);
    let avg_bucket = mean(&buckets);

    if max_bucket > 8.0 * avg_bucket && max_bucket > 5000.0 {
        Some(BotFlag {
            flag_type: BotFlagType::TimePattern,
            severity: Severity::Medium,
            description: format!(
                "view growth concentrates in a single hour bucket ({max_bucket:.0} vs avg {avg_bucket:.0})"
            ),
            confidence: 70,
        })
    } else {
        None
    }
}

/// Pure statistical engine over a newest-first history series. Applies all
/// nine rules; each may emit at most one flag.
pub fn detect(history: &[StatsHistoryEntry], platform: Platform) -> BotDetectionResult {
    if history.len() < 2 {
        return BotDetectionResult::empty();
    }

    let th = thresholds_for(platform);

    let flags: Vec<BotFlag> = [
        detect_views_spike(history, &th),
        detect_likes_spike(history, &th),
        detect_comments_spike(history, &th),
        detect_engagement_ratio(history, &th),
        detect_zero_variance(history),
        detect_velocity_anomaly(history),
        detect_ratio_anomaly(history),
        detect_sudden_stop(history),
        detect_time_pattern(history),
    ]
    .into_iter()
    .flatten()
    .collect();

    BotDetectionResult::from_flags(flags)
}

/// Async wrapper: fetches history, platform, campaign, and user from
/// the clip-service, runs [`detect`], and publishes `stats.bot_detected`
/// when at least one flag is HIGH or MEDIUM. Fetch failures degrade to no
/// anomalies rather than propagating, since bot detection is a best-effort
/// side channel, not part of the critical refresh path.
pub async fn run_bot_detection(state: &AppState, clip_id: &str) -> BotDetectionResult {
    let clip = match state.clip_service.get_clip(clip_id).await {
        Ok(c) => c,
        Err(e) => {
            log::warn!("bot detection: failed to fetch clip {clip_id}: {e}");
            return BotDetectionResult::empty();
        }
    };

    let history = match state.clip_service.stats_history(clip_id).await {
        Ok(h) => h,
        Err(e) => {
            log::warn!("bot detection: failed to fetch history for {clip_id}: {e}");
            return BotDetectionResult::empty();
        }
    };

    let platform = Platform::parse(&clip.platform).unwrap_or(Platform::Youtube);
    let result = detect(&history, platform);

    let significant = result.significant_flags();
    if let Some(first) = significant.first() {
        let evidence = significant
            .iter()
            .map(|f| format!("{}: {}", f.flag_type.as_str(), f.description))
            .collect::<Vec<_>>()
            .join("; ");

        let event = BotDetectedEvent {
            clip_id: clip_id.to_string(),
            campaign_id: clip.campaign_id,
            user_id: clip.user_id,
            flag_type: first.flag_type.as_str().to_string(),
            confidence: result.confidence_score as f64 / 100.0,
            evidence,
        };

        if let Err(e) = state.publisher.publish(ROUTING_KEY_BOT_DETECTED, &event).await {
            log::warn!("failed to publish stats.bot_detected for {clip_id}: {e}");
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn entry(views: i64, likes: i64, comments: i64, hours_ago: i64) -> StatsHistoryEntry {
        StatsHistoryEntry {
            views,
            likes,
            comments,
            shares: 0,
            recorded_at: Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap()
                - chrono::Duration::hours(hours_ago),
        }
    }

    #[test]
    fn growth_rate_boundary_values() {
        assert_eq!(growth_rate(0, 0), 0.0);
        assert_eq!(growth_rate(0, 5), f64::INFINITY);
        assert_eq!(growth_rate(100, 150), 50.0);
    }

    #[test]
    fn short_history_has_no_anomalies() {
        let history = vec![entry(100, 10, 2, 0)];
        let result = detect(&history, Platform::Youtube);
        assert!(!result.has_anomalies);
        assert!(result.flags.is_empty());
        assert_eq!(result.confidence_score, 0);
    }

    #[test]
    fn zero_variance_detects_near_linear_growth() {
        let views = [2200, 2000, 1818, 1653, 1503, 1367];
        let history: Vec<StatsHistoryEntry> = views
            .iter()
            .enumerate()
            .map(|(i, v)| entry(*v, 0, 0, i as i64))
            .collect();

        let result = detect(&history, Platform::Youtube);
        assert!(result.has_anomalies);
        assert_eq!(result.confidence_score, 95);
        assert!(result
            .flags
            .iter()
            .any(|f| f.flag_type == BotFlagType::ZeroVariance && f.severity == Severity::High));
    }

    #[test]
    fn views_spike_fires_on_tiktok() {
        let history = vec![entry(12000, 20, 0, 0), entry(1000, 15, 0, 1)];
        let result = detect(&history, Platform::Tiktok);
        assert_eq!(result.flags.len(), 1);
        let flag = &result.flags[0];
        assert_eq!(flag.flag_type, BotFlagType::ViewsSpike);
        assert_eq!(flag.severity, Severity::High);
        assert_eq!(flag.confidence, 90);
        assert_eq!(result.confidence_score, 90);
    }

    #[test]
    fn four_samples_never_triggers_len_five_gated_rules() {
        let history: Vec<StatsHistoryEntry> = (0..4).map(|i| entry(100 + i * 50, 5, 1, i)).collect();
        assert!(detect_zero_variance(&history).is_none());
        assert!(detect_velocity_anomaly(&history).is_none());
    }

    #[test]
    fn confidence_score_is_zero_iff_no_flags() {
        let empty = BotDetectionResult::empty();
        assert_eq!(empty.confidence_score, 0);
        assert!(empty.flags.is_empty());

        let with_flag = BotDetectionResult::from_flags(vec![BotFlag {
            flag_type: BotFlagType::ViewsSpike,
            severity: Severity::High,
            description: "test".into(),
            confidence: 90,
        }]);
        assert_eq!(with_flag.confidence_score, 90);
    }
}

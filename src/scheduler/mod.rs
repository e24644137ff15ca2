use crate::app_state::AppState;
use crate::models::ClipRefreshTarget;
use crate::services::{rankings, stats_collector};
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration};

const HOURLY_TICK: Duration = Duration::from_secs(3600);
const DAILY_TICK: Duration = Duration::from_secs(24 * 3600);

/// Two independent periodic loops, each a plain
/// `loop { run_once(...).await; tick.tick().await }`. No cron crate is
/// introduced: `tokio::time::interval` is simpler for two fixed-period
/// jobs than parsing cron strings would be. Scheduler errors are logged
/// and never crash the process.
pub fn spawn(state: AppState) -> (JoinHandle<()>, JoinHandle<()>) {
    let hourly_state = state.clone();
    let hourly = tokio::spawn(async move {
        let mut tick = interval(HOURLY_TICK);
        loop {
            tick.tick().await;
            if let Err(e) = run_hourly_refresh(&hourly_state).await {
                log::error!("hourly refresh tick failed: {e}");
            }
        }
    });

    let daily_state = state;
    let daily = tokio::spawn(async move {
        let mut tick = interval(DAILY_TICK);
        loop {
            tick.tick().await;
            if let Err(e) = run_daily_rankings(&daily_state).await {
                log::error!("daily rankings tick failed: {e}");
            }
        }
    });

    (hourly, daily)
}

async fn run_hourly_refresh(state: &AppState) -> Result<(), crate::error::AppError> {
    let clips = state.clip_service.needs_refresh().await?;
    log::info!("hourly refresh: {} clips need refresh", clips.len());

    let targets: Vec<ClipRefreshTarget> = clips
        .into_iter()
        .map(|c| ClipRefreshTarget {
            submission_id: c.submission_id,
            platform: c.platform,
            video_id: c.video_id,
        })
        .collect();

    let counts = stats_collector::batch_refresh_stats(state, &targets).await;
    log::info!(
        "hourly refresh complete: {} succeeded, {} failed",
        counts.success_count,
        counts.fail_count
    );
    Ok(())
}

async fn run_daily_rankings(state: &AppState) -> Result<(), crate::error::AppError> {
    let (clips, campaigns) = rankings::calculate_all(state).await?;
    log::info!("daily rankings complete: {clips} clip rows, {campaigns} campaign rows");
    Ok(())
}

use crate::app_state::AppState;
use crate::error::AppError;
use crate::models::CampaignCacheRow;
use chrono::{Duration, Utc};

const STALENESS_THRESHOLD_SECS: i64 = 300;

/// Upserts the row on `campaign.created` or a pull-on-miss.
pub async fn upsert_from_event(
    state: &AppState,
    campaign_id: &str,
    title: &str,
    status: &str,
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO campaign_cache (id, title, status, synced_at)
        VALUES (?, ?, ?, NOW())
        ON DUPLICATE KEY UPDATE
            title = VALUES(title),
            status = VALUES(status),
            synced_at = VALUES(synced_at)
        "#,
    )
    .bind(campaign_id)
    .bind(title)
    .bind(status)
    .execute(&state.pool)
    .await?;

    Ok(())
}

/// Upserts status on `campaign.status_changed`. If the row doesn't exist
/// yet (status-changed arrived before created, or the cache was never
/// populated), pulls the full campaign from campaign-service to backfill
/// the title rather than writing an incomplete row.
pub async fn upsert_status(
    state: &AppState,
    campaign_id: &str,
    new_status: &str,
) -> Result<(), AppError> {
    let result = sqlx::query(
        "UPDATE campaign_cache SET status = ?, synced_at = NOW() WHERE id = ?",
    )
    .bind(new_status)
    .bind(campaign_id)
    .execute(&state.pool)
    .await?;

    if result.rows_affected() == 0 {
        let campaign = state.campaign_service.get_campaign(campaign_id).await?;
        upsert_from_event(state, campaign_id, &campaign.title, new_status).await?;
    }

    Ok(())
}

async fn fetch_row(state: &AppState, campaign_id: &str) -> Result<Option<CampaignCacheRow>, AppError> {
    let row = sqlx::query_as::<_, CampaignCacheRow>(
        "SELECT id AS campaign_id, title, status, synced_at FROM campaign_cache WHERE id = ?",
    )
    .bind(campaign_id)
    .fetch_optional(&state.pool)
    .await?;

    Ok(row)
}

/// Reads the local mirror, pulling from campaign-service on a miss or when
/// the row is older than the 5-minute staleness threshold.
pub async fn get_or_pull(state: &AppState, campaign_id: &str) -> Result<CampaignCacheRow, AppError> {
    if let Some(row) = fetch_row(state, campaign_id).await? {
        let age = Utc::now() - row.synced_at;
        if age < Duration::seconds(STALENESS_THRESHOLD_SECS) {
            return Ok(row);
        }
    }

    let campaign = state.campaign_service.get_campaign(campaign_id).await?;
    upsert_from_event(state, campaign_id, &campaign.title, &campaign.status).await?;

    fetch_row(state, campaign_id)
        .await?
        .ok_or_else(|| AppError::Persist("campaign cache row missing immediately after upsert".into()))
}

use crate::error::AppError;
use sqlx::MySqlPool;

/// `CREATE TABLE IF NOT EXISTS` at startup, no external migration
/// framework -- fits this scale of service.
pub async fn initialize_schema(pool: &MySqlPool) -> Result<(), AppError> {
    log::info!("initializing database schema");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS weekly_clip_ranking (
            week_start DATE NOT NULL,
            submission_id VARCHAR(64) NOT NULL,
            week_end DATE NOT NULL,
            platform VARCHAR(32) NOT NULL,
            views BIGINT NOT NULL,
            likes BIGINT NOT NULL,
            engagement DOUBLE NOT NULL,
            `rank` INT UNSIGNED NOT NULL,
            PRIMARY KEY (week_start, submission_id),
            INDEX idx_week_platform_rank (week_start, platform, `rank`)
        ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS weekly_campaign_ranking (
            week_start DATE NOT NULL,
            campaign_id VARCHAR(64) NOT NULL,
            week_end DATE NOT NULL,
            total_views BIGINT NOT NULL,
            total_likes BIGINT NOT NULL,
            avg_engagement DOUBLE NOT NULL,
            clips_count INT UNSIGNED NOT NULL,
            `rank` INT UNSIGNED NOT NULL,
            PRIMARY KEY (week_start, campaign_id),
            INDEX idx_week_rank (week_start, `rank`)
        ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS campaign_cache (
            id VARCHAR(64) NOT NULL PRIMARY KEY,
            title VARCHAR(255) NOT NULL,
            status VARCHAR(32) NOT NULL,
            synced_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4
        "#,
    )
    .execute(pool)
    .await?;

    log::info!("database schema initialized");
    Ok(())
}

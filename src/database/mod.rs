pub mod schema;

use crate::error::AppError;
use sqlx::mysql::MySqlPoolOptions;
use sqlx::MySqlPool;
use std::time::Duration;

const MAX_RETRIES: u32 = 10;
const INITIAL_RETRY_DELAY_SECS: u64 = 2;
const MAX_RETRY_DELAY_SECS: u64 = 30;

/// Connects with exponential backoff, since MySQL may not be up yet the
/// moment this process starts in a compose/k8s rollout.
pub async fn create_pool(database_url: &str) -> Result<MySqlPool, AppError> {
    let mut last_error: Option<sqlx::Error> = None;

    for attempt in 1..=MAX_RETRIES {
        log::info!("database connection attempt {attempt} of {MAX_RETRIES}");

        let pool_options = MySqlPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800));

        match pool_options.connect(database_url).await {
            Ok(pool) => {
                log::info!("database connection pool established on attempt {attempt}");
                return Ok(pool);
            }
            Err(e) => {
                log::warn!("database connection attempt {attempt} failed: {e}");
                last_error = Some(e);
            }
        }

        if attempt < MAX_RETRIES {
            let delay_secs = std::cmp::min(
                INITIAL_RETRY_DELAY_SECS * (1u64 << (attempt - 1)),
                MAX_RETRY_DELAY_SECS,
            );
            log::info!("waiting {delay_secs}s before next attempt");
            tokio::time::sleep(Duration::from_secs(delay_secs)).await;
        }
    }

    Err(AppError::Persist(format!(
        "failed to connect to database after {MAX_RETRIES} attempts: {}",
        last_error.map(|e| e.to_string()).unwrap_or_default()
    )))
}

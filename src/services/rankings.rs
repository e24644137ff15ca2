use crate::app_state::AppState;
use crate::error::AppError;
use crate::models::{CampaignRankingSource, ClipRankingSource, WeeklyCampaignRanking, WeeklyClipRanking};
use chrono::{Datelike, NaiveDate, Utc};

/// Monday-of(now) in ISO week terms (Monday = day 1).
pub fn monday_of(date: NaiveDate) -> NaiveDate {
    let days_from_monday = date.weekday().num_days_from_monday();
    date - chrono::Duration::days(days_from_monday as i64)
}

pub fn sunday_of(week_start: NaiveDate) -> NaiveDate {
    week_start + chrono::Duration::days(6)
}

fn current_week_bounds() -> (NaiveDate, NaiveDate) {
    let today = Utc::now().date_naive();
    let week_start = monday_of(today);
    (week_start, sunday_of(week_start))
}

/// Computes weekly clip rankings for `week_start`/`week_end` (defaulting to
/// the current ISO week when `None`), sorted `views DESC, engagement DESC`
/// with dense 1-based ranks, and upserts every row. Empty input returns
/// silently.
pub async fn calculate_weekly_clip_rankings(
    state: &AppState,
    week: Option<(NaiveDate, NaiveDate)>,
) -> Result<usize, AppError> {
    let (week_start, week_end) = week.unwrap_or_else(current_week_bounds);

    let mut rows = state
        .clip_service
        .approved_for_rankings(week_start, week_end)
        .await?;

    if rows.is_empty() {
        return Ok(0);
    }

    rows.sort_by(|a, b| {
        b.views
            .cmp(&a.views)
            .then(b.engagement.partial_cmp(&a.engagement).unwrap_or(std::cmp::Ordering::Equal))
    });

    for (index, row) in rows.iter().enumerate() {
        upsert_clip_ranking(state, week_start, week_end, row, (index + 1) as u32).await?;
    }

    Ok(rows.len())
}

pub async fn calculate_weekly_campaign_rankings(
    state: &AppState,
    week: Option<(NaiveDate, NaiveDate)>,
) -> Result<usize, AppError> {
    let (week_start, week_end) = week.unwrap_or_else(current_week_bounds);

    let mut rows = state
        .clip_service
        .campaign_stats_for_rankings(week_start, week_end)
        .await?;

    if rows.is_empty() {
        return Ok(0);
    }

    rows.sort_by(|a, b| {
        b.total_views
            .cmp(&a.total_views)
            .then(b.avg_engagement.partial_cmp(&a.avg_engagement).unwrap_or(std::cmp::Ordering::Equal))
    });

    for (index, row) in rows.iter().enumerate() {
        upsert_campaign_ranking(state, week_start, week_end, row, (index + 1) as u32).await?;
    }

    Ok(rows.len())
}

async fn upsert_clip_ranking(
    state: &AppState,
    week_start: NaiveDate,
    week_end: NaiveDate,
    row: &ClipRankingSource,
    rank: u32,
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO weekly_clip_ranking
            (week_start, submission_id, week_end, platform, views, likes, engagement, `rank`)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        ON DUPLICATE KEY UPDATE
            week_end = VALUES(week_end),
            platform = VALUES(platform),
            views = VALUES(views),
            likes = VALUES(likes),
            engagement = VALUES(engagement),
            `rank` = VALUES(`rank`)
        "#,
    )
    .bind(week_start)
    .bind(&row.submission_id)
    .bind(week_end)
    .bind(&row.platform)
    .bind(row.views)
    .bind(row.likes)
    .bind(row.engagement)
    .bind(rank)
    .execute(&state.pool)
    .await?;

    Ok(())
}

async fn upsert_campaign_ranking(
    state: &AppState,
    week_start: NaiveDate,
    week_end: NaiveDate,
    row: &CampaignRankingSource,
    rank: u32,
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO weekly_campaign_ranking
            (week_start, campaign_id, week_end, total_views, total_likes, avg_engagement, clips_count, `rank`)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        ON DUPLICATE KEY UPDATE
            week_end = VALUES(week_end),
            total_views = VALUES(total_views),
            total_likes = VALUES(total_likes),
            avg_engagement = VALUES(avg_engagement),
            clips_count = VALUES(clips_count),
            `rank` = VALUES(`rank`)
        "#,
    )
    .bind(week_start)
    .bind(&row.campaign_id)
    .bind(week_end)
    .bind(row.total_views)
    .bind(row.total_likes)
    .bind(row.avg_engagement)
    .bind(row.clips_count)
    .bind(rank)
    .execute(&state.pool)
    .await?;

    Ok(())
}

/// Reads previously-computed clip rankings for the read-side HTTP surface.
/// `limit` is clamped to the 1-200 range the handler contract allows.
pub async fn list_weekly_clip_rankings(
    state: &AppState,
    week_start: NaiveDate,
    limit: u32,
    platform: Option<&str>,
) -> Result<Vec<WeeklyClipRanking>, AppError> {
    let limit = limit.clamp(1, 200);

    let rows = if let Some(platform) = platform {
        sqlx::query_as::<_, WeeklyClipRanking>(
            r#"
            SELECT week_start, week_end, submission_id, platform, views, likes, engagement, `rank`
            FROM weekly_clip_ranking
            WHERE week_start = ? AND platform = ?
            ORDER BY `rank` ASC
            LIMIT ?
            "#,
        )
        .bind(week_start)
        .bind(platform)
        .bind(limit)
        .fetch_all(&state.pool)
        .await?
    } else {
        sqlx::query_as::<_, WeeklyClipRanking>(
            r#"
            SELECT week_start, week_end, submission_id, platform, views, likes, engagement, `rank`
            FROM weekly_clip_ranking
            WHERE week_start = ?
            ORDER BY `rank` ASC
            LIMIT ?
            "#,
        )
        .bind(week_start)
        .bind(limit)
        .fetch_all(&state.pool)
        .await?
    };

    Ok(rows)
}

pub async fn list_weekly_campaign_rankings(
    state: &AppState,
    week_start: NaiveDate,
    limit: u32,
) -> Result<Vec<WeeklyCampaignRanking>, AppError> {
    let limit = limit.clamp(1, 200);

    let rows = sqlx::query_as::<_, WeeklyCampaignRanking>(
        r#"
        SELECT week_start, week_end, campaign_id, total_views, total_likes, avg_engagement, clips_count, `rank`
        FROM weekly_campaign_ranking
        WHERE week_start = ?
        ORDER BY `rank` ASC
        LIMIT ?
        "#,
    )
    .bind(week_start)
    .bind(limit)
    .fetch_all(&state.pool)
    .await?;

    Ok(rows)
}

/// Runs both ranking calculations concurrently, invoked from the
/// scheduler's midnight tick.
pub async fn calculate_all(state: &AppState) -> Result<(usize, usize), AppError> {
    let (clips, campaigns) = tokio::join!(
        calculate_weekly_clip_rankings(state, None),
        calculate_weekly_campaign_rankings(state, None),
    );
    Ok((clips?, campaigns?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Weekday};

    #[test]
    fn monday_of_a_monday_is_itself() {
        let monday = NaiveDate::from_ymd_opt(2026, 7, 27).unwrap();
        assert_eq!(monday.weekday(), Weekday::Mon);
        assert_eq!(monday_of(monday), monday);
    }

    #[test]
    fn monday_of_a_sunday_is_the_preceding_monday() {
        let sunday = NaiveDate::from_ymd_opt(2026, 8, 2).unwrap();
        assert_eq!(sunday.weekday(), Weekday::Sun);
        assert_eq!(monday_of(sunday), NaiveDate::from_ymd_opt(2026, 7, 27).unwrap());
    }

    #[test]
    fn sunday_of_is_six_days_after_week_start() {
        let monday = NaiveDate::from_ymd_opt(2026, 7, 27).unwrap();
        assert_eq!(sunday_of(monday), NaiveDate::from_ymd_opt(2026, 8, 2).unwrap());
    }

    #[test]
    fn dense_rank_tie_break_is_lexicographic_on_views_then_engagement() {
        let mut rows = vec![
            ClipRankingSource {
                submission_id: "a".into(),
                platform: "TIKTOK".into(),
                views: 100,
                likes: 5,
                engagement: 0.1,
            },
            ClipRankingSource {
                submission_id: "b".into(),
                platform: "TIKTOK".into(),
                views: 100,
                likes: 5,
                engagement: 0.2,
            },
        ];
        rows.sort_by(|a, b| {
            b.views
                .cmp(&a.views)
                .then(b.engagement.partial_cmp(&a.engagement).unwrap())
        });
        assert_eq!(rows[0].submission_id, "b");
        assert_eq!(rows[1].submission_id, "a");
    }
}

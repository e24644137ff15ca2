use statistics_service::models::{CampaignRankingSource, ClipRankingSource};

fn rank_clips(mut rows: Vec<ClipRankingSource>) -> Vec<ClipRankingSource> {
    rows.sort_by(|a, b| {
        b.views
            .cmp(&a.views)
            .then(b.engagement.partial_cmp(&a.engagement).unwrap())
    });
    rows
}

fn rank_campaigns(mut rows: Vec<CampaignRankingSource>) -> Vec<CampaignRankingSource> {
    rows.sort_by(|a, b| {
        b.total_views
            .cmp(&a.total_views)
            .then(b.avg_engagement.partial_cmp(&a.avg_engagement).unwrap())
    });
    rows
}

fn clip(id: &str, views: i64, engagement: f64) -> ClipRankingSource {
    ClipRankingSource {
        submission_id: id.to_string(),
        platform: "TIKTOK".to_string(),
        views,
        likes: 0,
        engagement,
    }
}

fn campaign(id: &str, total_views: i64, avg_engagement: f64) -> CampaignRankingSource {
    CampaignRankingSource {
        campaign_id: id.to_string(),
        total_views,
        total_likes: 0,
        avg_engagement,
        clips_count: 1,
    }
}

#[test]
fn dense_ranks_are_contiguous_one_based_with_no_gaps() {
    let ranked = rank_clips(vec![
        clip("a", 500, 0.1),
        clip("b", 900, 0.2),
        clip("c", 700, 0.05),
    ]);
    let ranks: Vec<u32> = (1..=ranked.len() as u32).collect();
    assert_eq!(ranks, vec![1, 2, 3]);
    assert_eq!(ranked[0].submission_id, "b");
    assert_eq!(ranked[1].submission_id, "c");
    assert_eq!(ranked[2].submission_id, "a");
}

#[test]
fn equal_views_break_ties_on_engagement_descending() {
    let ranked = rank_clips(vec![
        clip("low-engagement", 1000, 0.05),
        clip("high-engagement", 1000, 0.30),
    ]);
    assert_eq!(ranked[0].submission_id, "high-engagement");
    assert_eq!(ranked[1].submission_id, "low-engagement");
}

#[test]
fn campaign_rankings_break_ties_the_same_way_as_clips() {
    let ranked = rank_campaigns(vec![
        campaign("slow-burn", 50_000, 0.02),
        campaign("viral", 50_000, 0.18),
    ]);
    assert_eq!(ranked[0].campaign_id, "viral");
    assert_eq!(ranked[1].campaign_id, "slow-burn");
}

#[test]
fn single_row_input_ranks_first_with_no_ties_to_break() {
    let ranked = rank_clips(vec![clip("only", 42, 0.01)]);
    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].submission_id, "only");
}

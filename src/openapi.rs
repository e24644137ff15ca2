use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers::{health, rankings, stats};
use crate::models::{
    BatchRefreshRequest, BatchRefreshResponse, ClipRefreshTarget, HealthResponse, PlatformStats,
    RefreshStatsResponse, WeeklyCampaignRanking, WeeklyClipRanking,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        stats::get_stats,
        stats::refresh,
        stats::batch_refresh,
        rankings::weekly_clips,
        rankings::weekly_campaigns,
        rankings::calculate,
        health::health,
        health::ready,
    ),
    components(
        schemas(
            PlatformStats,
            RefreshStatsResponse,
            BatchRefreshRequest,
            BatchRefreshResponse,
            ClipRefreshTarget,
            WeeklyClipRanking,
            WeeklyCampaignRanking,
            rankings::CalculateRankingsResponse,
            HealthResponse,
        )
    ),
    tags(
        (name = "statistics-service", description = "Platform stats, bot detection, and weekly rankings")
    )
)]
pub struct ApiDoc;

pub fn routes() -> SwaggerUi {
    let openapi = ApiDoc::openapi();
    SwaggerUi::new("/docs").url("/openapi.json", openapi)
}

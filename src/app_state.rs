use crate::cache::StatsCache;
use crate::clients::{CampaignServiceClient, ClipServiceClient};
use crate::config::Config;
use crate::platform::PlatformRegistry;
use crate::rabbitmq::publisher::EventPublisher;
use sqlx::MySqlPool;
use std::sync::Arc;

/// Composition root. Every background task and HTTP handler receives the
/// handles it needs through this struct rather than reaching for
/// module-level statics.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub pool: MySqlPool,
    pub cache: Arc<StatsCache>,
    pub publisher: Arc<EventPublisher>,
    pub platforms: Arc<PlatformRegistry>,
    pub clip_service: Arc<ClipServiceClient>,
    pub campaign_service: Arc<CampaignServiceClient>,
}

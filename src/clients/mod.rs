mod clip_service;
mod campaign_service;

pub use campaign_service::CampaignServiceClient;
pub use clip_service::ClipServiceClient;

const INTERNAL_SERVICE_HEADER: &str = "X-Internal-Service";
const INTERNAL_SERVICE_NAME: &str = "statistics-service";

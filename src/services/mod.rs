pub mod bot_detector;
pub mod campaign_cache;
pub mod rankings;
pub mod stats_collector;

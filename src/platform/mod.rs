pub mod youtube;
pub mod tiktok;
pub mod instagram;
pub mod twitter;

use crate::error::AppError;
use crate::models::{Platform, PlatformStats};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// One method, one implementation per platform. Replaces a switch on an
/// uppercase platform string with a registry lookup.
#[async_trait]
pub trait PlatformAdapter: Send + Sync {
    async fn fetch(&self, video_id: &str) -> Result<PlatformStats, AppError>;
}

pub struct PlatformRegistry {
    adapters: HashMap<Platform, Arc<dyn PlatformAdapter>>,
}

impl PlatformRegistry {
    pub fn new(youtube_api_key: Option<String>) -> Self {
        let mut adapters: HashMap<Platform, Arc<dyn PlatformAdapter>> = HashMap::new();
        adapters.insert(
            Platform::Youtube,
            Arc::new(youtube::YoutubeAdapter::new(youtube_api_key)),
        );
        adapters.insert(Platform::Tiktok, Arc::new(tiktok::TiktokAdapter::new()));
        adapters.insert(
            Platform::Instagram,
            Arc::new(instagram::InstagramAdapter::new()),
        );
        adapters.insert(Platform::Twitter, Arc::new(twitter::TwitterAdapter::new()));
        Self { adapters }
    }

    pub fn get(&self, platform: Platform) -> Arc<dyn PlatformAdapter> {
        self.adapters
            .get(&platform)
            .cloned()
            .expect("all four platforms are registered at construction")
    }
}

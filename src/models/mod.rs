pub mod stats;
pub mod bot;
pub mod ranking;
pub mod campaign;
pub mod clip;

pub use stats::*;
pub use bot::*;
pub use ranking::*;
pub use campaign::*;
pub use clip::*;

use serde::Serialize;

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
}

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BotFlagType {
    ViewsSpike,
    LikesSpike,
    CommentsSpike,
    EngagementRatio,
    VelocityAnomaly,
    TimePattern,
    RatioAnomaly,
    ZeroVariance,
    SuddenStop,
}

impl BotFlagType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BotFlagType::ViewsSpike => "VIEWS_SPIKE",
            BotFlagType::LikesSpike => "LIKES_SPIKE",
            BotFlagType::CommentsSpike => "COMMENTS_SPIKE",
            BotFlagType::EngagementRatio => "ENGAGEMENT_RATIO",
            BotFlagType::VelocityAnomaly => "VELOCITY_ANOMALY",
            BotFlagType::TimePattern => "TIME_PATTERN",
            BotFlagType::RatioAnomaly => "RATIO_ANOMALY",
            BotFlagType::ZeroVariance => "ZERO_VARIANCE",
            BotFlagType::SuddenStop => "SUDDEN_STOP",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize)]
pub struct BotFlag {
    #[serde(rename = "type")]
    pub flag_type: BotFlagType,
    pub severity: Severity,
    pub description: String,
    /// 0-100 integer.
    pub confidence: u8,
}

#[derive(Debug, Clone, Serialize)]
pub struct BotDetectionResult {
    #[serde(rename = "hasAnomalies")]
    pub has_anomalies: bool,
    pub flags: Vec<BotFlag>,
    #[serde(rename = "confidenceScore")]
    pub confidence_score: u8,
}

impl BotDetectionResult {
    pub fn empty() -> Self {
        Self {
            has_anomalies: false,
            flags: Vec::new(),
            confidence_score: 0,
        }
    }

    pub fn from_flags(flags: Vec<BotFlag>) -> Self {
        if flags.is_empty() {
            return Self::empty();
        }
        let sum: u32 = flags.iter().map(|f| f.confidence as u32).sum();
        let mean = (sum / flags.len() as u32) as u8;
        Self {
            has_anomalies: true,
            flags,
            confidence_score: mean,
        }
    }

    /// A flag is significant when it is HIGH or MEDIUM severity.
    pub fn significant_flags(&self) -> Vec<&BotFlag> {
        self.flags
            .iter()
            .filter(|f| f.severity >= Severity::Medium)
            .collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BotDetectedEvent {
    #[serde(rename = "clipId")]
    pub clip_id: String,
    #[serde(rename = "campaignId")]
    pub campaign_id: Option<String>,
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
    #[serde(rename = "flagType")]
    pub flag_type: String,
    /// 0-1 fraction, not the 0-100 scale used internally.
    pub confidence: f64,
    pub evidence: String,
}

use serde::Deserialize;

/// Payload of the `clip.approved` routing key.
#[derive(Debug, Clone, Deserialize)]
pub struct ClipApprovedPayload {
    #[serde(rename = "submissionId")]
    pub submission_id: String,
}

/// Payload of the `clip.submitted` routing key. Logged only.
#[derive(Debug, Clone, Deserialize)]
pub struct ClipSubmittedPayload {
    #[serde(rename = "submissionId")]
    pub submission_id: String,
}

/// Payload of the `stats.requested` routing key. No handler is wired for
/// it yet — see DESIGN.md for the decision.
#[derive(Debug, Clone, Deserialize)]
pub struct StatsRequestedPayload {
    #[serde(rename = "clipId")]
    pub clip_id: String,
}

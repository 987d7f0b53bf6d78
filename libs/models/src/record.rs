use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decision::Decision;
use crate::governance::GovernanceOutcome;
use crate::graph::DecisionGraph;
use crate::pack::DecisionPack;
use crate::reasoning::ReasoningOutcome;

/// Lifecycle state of a submitted decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionStatus {
    Pending,
    Processing,
    Complete,
    Failed,
}

/// Console risk banding derived from the computed risk score and flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DerivedAttributes {
    pub risk_level: RiskLevel,
    pub confidence: f64,
    pub strategic_impact: String,
    #[serde(default)]
    pub completeness_score: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionMetadata {
    pub request_id: String,
    pub retry_count: u32,
    pub model: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_used: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Per-decision lifecycle record.
///
/// Stage outputs stay `None` until the corresponding pipeline step
/// completes; `current_step` advances strictly monotonically 0..=4.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub decision_id: String,
    pub tenant_id: String,
    pub status: DecisionStatus,
    pub input_text: String,
    pub current_step: u8,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    // Request flags, captured at submission
    pub use_deep_governance: bool,
    pub use_deep_reasoning: bool,

    // Stage outputs
    #[serde(default)]
    pub decision: Option<Decision>,
    #[serde(default)]
    pub governance: Option<GovernanceOutcome>,
    #[serde(default)]
    pub graph_payload: Option<DecisionGraph>,
    #[serde(default)]
    pub reasoning: Option<ReasoningOutcome>,
    #[serde(default)]
    pub decision_pack: Option<DecisionPack>,
    #[serde(default)]
    pub derived_attributes: Option<DerivedAttributes>,
    #[serde(default)]
    pub extraction_metadata: Option<ExtractionMetadata>,
    #[serde(default)]
    pub error: Option<String>,
}

impl DecisionRecord {
    pub fn new(
        decision_id: String,
        tenant_id: String,
        input_text: String,
        use_deep_governance: bool,
        use_deep_reasoning: bool,
        now: DateTime<Utc>,
    ) -> Self {
        DecisionRecord {
            decision_id,
            tenant_id,
            status: DecisionStatus::Pending,
            input_text,
            current_step: 0,
            created_at: now,
            updated_at: now,
            use_deep_governance,
            use_deep_reasoning,
            decision: None,
            governance: None,
            graph_payload: None,
            reasoning: None,
            decision_pack: None,
            derived_attributes: None,
            extraction_metadata: None,
            error: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.status, DecisionStatus::Complete | DecisionStatus::Failed)
    }
}

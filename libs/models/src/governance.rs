use serde::{Deserialize, Serialize};

use crate::decision::Severity;
use crate::rule::{RuleAction, RuleType};

/// Approval authority tiers, ordered from closest-to-the-work upward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalLevel {
    TeamLead,
    DepartmentHead,
    Vp,
    CLevel,
    Board,
}

impl ApprovalLevel {
    /// Map a personnel `level` (1..=4) onto the enum; out-of-range values
    /// clamp to the nearest tier.
    pub fn from_numeric(level: u8) -> Self {
        match level {
            0 | 1 => ApprovalLevel::TeamLead,
            2 => ApprovalLevel::DepartmentHead,
            3 => ApprovalLevel::Vp,
            4 => ApprovalLevel::CLevel,
            _ => ApprovalLevel::Board,
        }
    }

    pub fn numeric(&self) -> u8 {
        match self {
            ApprovalLevel::TeamLead => 1,
            ApprovalLevel::DepartmentHead => 2,
            ApprovalLevel::Vp => 3,
            ApprovalLevel::CLevel => 4,
            ApprovalLevel::Board => 5,
        }
    }
}

/// One step in the computed approval chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalChainStep {
    pub level: ApprovalLevel,
    pub role: String,
    #[serde(default)]
    pub approver_id: Option<String>,
    pub required: bool,
    #[serde(default)]
    pub rationale: Option<String>,
    #[serde(default)]
    pub source_rule_id: Option<String>,
    #[serde(default)]
    pub rule_action: Option<RuleAction>,
    pub severity: Severity,
}

/// Machine-readable governance concerns emitted by the rule engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GovernanceFlag {
    MissingOwner,
    MissingRiskAssessment,
    HighRisk,
    StrategicCritical,
    CriticalConflict,
    PrivacyReviewRequired,
    FinancialThresholdExceeded,
    StrategicMisalignment,
    GovernanceCoverageGap,
}

impl GovernanceFlag {
    pub fn as_str(&self) -> &'static str {
        match self {
            GovernanceFlag::MissingOwner => "MISSING_OWNER",
            GovernanceFlag::MissingRiskAssessment => "MISSING_RISK_ASSESSMENT",
            GovernanceFlag::HighRisk => "HIGH_RISK",
            GovernanceFlag::StrategicCritical => "STRATEGIC_CRITICAL",
            GovernanceFlag::CriticalConflict => "CRITICAL_CONFLICT",
            GovernanceFlag::PrivacyReviewRequired => "PRIVACY_REVIEW_REQUIRED",
            GovernanceFlag::FinancialThresholdExceeded => "FINANCIAL_THRESHOLD_EXCEEDED",
            GovernanceFlag::StrategicMisalignment => "STRATEGIC_MISALIGNMENT",
            GovernanceFlag::GovernanceCoverageGap => "GOVERNANCE_COVERAGE_GAP",
        }
    }

    pub fn is_critical(&self) -> bool {
        self.as_str().contains("CRITICAL")
    }
}

/// Final governance verdict for a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GovernanceStatus {
    Compliant,
    ReviewRequired,
    Blocked,
}

impl GovernanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GovernanceStatus::Compliant => "compliant",
            GovernanceStatus::ReviewRequired => "review_required",
            GovernanceStatus::Blocked => "blocked",
        }
    }
}

/// Rule that matched during evaluation, carried through to the audit block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggeredRule {
    pub rule_id: String,
    pub name: String,
    pub description: String,
    pub rule_type: RuleType,
    pub severity: Severity,
}

/// Owner inferred from the approval chain when none was stated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferredOwner {
    pub person_id: String,
    pub name: String,
    pub role: String,
    pub level: u8,
}

/// Full output of the rule engine for one decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GovernanceOutcome {
    pub approval_chain: Vec<ApprovalChainStep>,
    pub flags: Vec<GovernanceFlag>,
    pub requires_human_review: bool,
    pub triggered_rules: Vec<TriggeredRule>,
    pub computed_risk_score: f64,
    pub status: GovernanceStatus,
    #[serde(default)]
    pub inferred_owner: Option<InferredOwner>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn approval_level_round_trips_numeric_tiers() {
        assert_eq!(ApprovalLevel::from_numeric(1), ApprovalLevel::TeamLead);
        assert_eq!(ApprovalLevel::from_numeric(4), ApprovalLevel::CLevel);
        assert_eq!(ApprovalLevel::from_numeric(9), ApprovalLevel::Board);
        assert_eq!(ApprovalLevel::CLevel.numeric(), 4);
    }

    #[test]
    fn critical_flag_detection_uses_substring_semantics() {
        assert!(GovernanceFlag::CriticalConflict.is_critical());
        assert!(GovernanceFlag::StrategicCritical.is_critical());
        assert!(!GovernanceFlag::HighRisk.is_critical());
        assert!(!GovernanceFlag::MissingOwner.is_critical());
    }

    #[test]
    fn flags_serialize_as_screaming_snake_codes() {
        assert_eq!(
            serde_json::to_string(&GovernanceFlag::PrivacyReviewRequired).unwrap(),
            r#""PRIVACY_REVIEW_REQUIRED""#
        );
    }
}

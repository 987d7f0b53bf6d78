use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use decision_governance_models::{
    Assumption, DecisionPack, DecisionStatus, DerivedAttributes, Goal, GraphEdge, GraphNode,
    Kpi, Owner, Risk, RuleConsequence, Severity,
};

use crate::services::tenant_registry::TenantSummary;

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// POST /v1/decisions - submit a decision text for governance evaluation.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateDecisionRequest {
    pub tenant_id: String,

    #[validate(length(
        min = 20,
        max = 10000,
        message = "input_text must be between 20 and 10000 characters"
    ))]
    pub input_text: String,

    #[serde(default)]
    pub use_deep_governance: bool,

    #[serde(default = "default_true")]
    pub use_deep_reasoning: bool,
}

fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Submission / SSE responses
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct CreateDecisionResponse {
    pub decision_id: String,
    pub status: DecisionStatus,
    pub message: String,
    pub stream_url: String,
}

/// 'event: step' payload - one per completed pipeline stage.
#[derive(Debug, Serialize)]
pub struct SseStepEvent {
    pub decision_id: String,
    pub step: u8,
    pub label: String,
    pub message: String,
}

/// 'event: complete' payload - fetch result_url for the full payload.
#[derive(Debug, Serialize)]
pub struct SseCompleteEvent {
    pub decision_id: String,
    pub status: DecisionStatus,
    pub result_url: String,
}

/// 'event: error' payload - pipeline failed, terminal.
#[derive(Debug, Serialize)]
pub struct SseErrorEvent {
    pub decision_id: String,
    pub status: DecisionStatus,
    pub message: String,
}

// ---------------------------------------------------------------------------
// Company responses
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct CompanyListResponse {
    pub companies: Vec<TenantSummary>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct StrategicGoalSummary {
    pub goal_id: String,
    pub name: String,
    pub owner_id: Option<String>,
    pub priority: Option<String>,
}

/// GET /v1/companies/{id} - full tenant detail.
#[derive(Debug, Serialize)]
pub struct CompanyDetailResponse {
    pub id: String,
    pub name: String,
    pub industry: String,
    pub size: String,
    pub governance_framework: String,
    pub description: String,
    pub approval_chain_summary: String,
    pub total_governance_rules: usize,
    pub strategic_goals: Vec<StrategicGoalSummary>,
    pub approval_hierarchy: decision_governance_models::ApprovalHierarchy,
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Demo decision scenario for the console.
#[derive(Debug, Clone, Serialize)]
pub struct Fixture {
    pub id: String,
    pub company_id: String,
    pub title: String,
    pub text: String,
    pub tags: Vec<String>,
}

// ---------------------------------------------------------------------------
// Normalized governance types (console payload)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlagCategory {
    Financial,
    Privacy,
    Conflict,
    Strategic,
    Governance,
    Compliance,
}

/// Structured flag: engine emits codes, the API emits
/// `{code, category, severity, message}`.
#[derive(Debug, Clone, Serialize)]
pub struct NormalizedFlag {
    pub code: String,
    pub category: FlagCategory,
    pub severity: Severity,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RuleStatus {
    #[serde(rename = "TRIGGERED")]
    Triggered,
    #[serde(rename = "PASSED")]
    Passed,
}

/// Governance rule with explicit TRIGGERED / PASSED status. The engine only
/// returns triggered rules; PASSED rows are derived against the tenant's
/// active rule set at the response layer.
#[derive(Debug, Clone, Serialize)]
pub struct NormalizedRule {
    pub rule_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub rule_type: String,
    pub description: String,
    pub short_description: String,
    pub status: RuleStatus,
    pub severity: Severity,
    pub consequence: Option<RuleConsequence>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthType {
    Required,
    Escalation,
}

/// Approval chain step with pending status and resolved personnel data.
#[derive(Debug, Clone, Serialize)]
pub struct NormalizedApprovalStep {
    pub role: String,
    pub name: Option<String>,
    pub level: Option<u8>,
    pub status: String,
    pub reason: Option<String>,
    pub source_rule_id: Option<String>,
    pub auth_type: AuthType,
}

// ---------------------------------------------------------------------------
// Console payload sections
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct DecisionSummaryView {
    pub statement: String,
    pub goals: Vec<Goal>,
    pub kpis: Vec<Kpi>,
    pub risks: Vec<Risk>,
    pub owners: Vec<Owner>,
    pub assumptions: Vec<Assumption>,
}

#[derive(Debug, Serialize)]
pub struct GovernanceView {
    pub status: String,
    pub requires_human_review: bool,
    pub risk_score: f64,
    pub flags: Vec<NormalizedFlag>,
    pub triggered_rules: Vec<NormalizedRule>,
    pub all_rules: Vec<NormalizedRule>,
    pub approval_chain: Vec<NormalizedApprovalStep>,
}

#[derive(Debug, Serialize)]
pub struct GraphPayloadView {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub node_count: usize,
    pub edge_count: usize,
}

#[derive(Debug, Serialize)]
pub struct ReasoningView {
    pub analysis_method: String,
    pub logical_contradictions: Vec<String>,
    pub graph_recommendations: Vec<String>,
    pub confidence: f64,
}

#[derive(Debug, Serialize)]
pub struct ExtractionMetadataView {
    pub request_id: String,
    pub retry_count: u32,
    pub model: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_used: Option<bool>,
    pub extraction_method: String,
    pub tenant_id: String,
    pub processed_at: DateTime<Utc>,
}

/// GET /v1/decisions/{id} - the full console payload.
///
/// Sections are null until the corresponding pipeline step completes, so
/// the payload is always renderable.
#[derive(Debug, Serialize)]
pub struct ConsolePayload {
    pub decision_id: String,
    pub status: DecisionStatus,
    pub company: TenantSummary,
    pub decision: Option<DecisionSummaryView>,
    pub derived_attributes: Option<DerivedAttributes>,
    pub governance: Option<GovernanceView>,
    pub graph_payload: Option<GraphPayloadView>,
    pub reasoning: Option<ReasoningView>,
    pub decision_pack: Option<DecisionPack>,
    pub extraction_metadata: Option<ExtractionMetadataView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

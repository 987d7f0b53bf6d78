use serde::{Deserialize, Serialize};

use crate::decision::{Assumption, Goal, Kpi, Owner, Risk, Severity};
use crate::governance::{ApprovalLevel, GovernanceFlag, GovernanceStatus, TriggeredRule};
use crate::reasoning::{Contradiction, ReasoningIssue, Recommendation};
use crate::record::RiskLevel;
use crate::rule::RuleAction;
use crate::tenant::GoalKpi;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackSummary {
    pub statement: String,
    pub human_approval_required: bool,
    pub risk_level: RiskLevel,
    pub governance_status: GovernanceStatus,
    pub confidence_score: f64,
    pub strategic_impact: String,
    pub graph_analysis_enabled: bool,
    pub conclusion_reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalAlignment {
    Conflict,
    Aligned,
    Neutral,
}

/// Tenant strategic goal mapped against the decision, with conflict status
/// sourced from reasoner output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappedStrategicGoal {
    pub goal_id: String,
    pub name: String,
    pub status: GoalAlignment,
    #[serde(default)]
    pub reasoning: Option<String>,
    #[serde(default)]
    pub conflict_type: Option<String>,
    #[serde(default)]
    pub kpis: Vec<GoalKpi>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub severity: Option<Severity>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalsKpis {
    pub strategic_goals: Vec<MappedStrategicGoal>,
    pub decision_objectives: Vec<Goal>,
    pub kpis: Vec<Kpi>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackApprovalStep {
    pub level: ApprovalLevel,
    pub role: String,
    pub required: bool,
    #[serde(default)]
    pub rationale: Option<String>,
    #[serde(default)]
    pub source_rule_id: Option<String>,
    #[serde(default)]
    pub rule_action: Option<RuleAction>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditBlock {
    pub flags: Vec<GovernanceFlag>,
    pub triggered_rules: Vec<TriggeredRule>,
    pub rationales: Vec<String>,
    pub computed_risk_score: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphContextSummary {
    pub nodes_analyzed: usize,
    pub edges_analyzed: usize,
    pub traversal_depth: usize,
    pub subgraph_source: String,
    #[serde(default)]
    pub matched_personnel: Vec<String>,
    #[serde(default)]
    pub selection_criteria: Vec<String>,
}

/// Graph-reasoning section of the pack, present when reasoning ran.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphReasoningBlock {
    pub analysis_method: String,
    pub graph_context: GraphContextSummary,
    pub logical_contradictions: Vec<Contradiction>,
    pub ownership_issues: Vec<ReasoningIssue>,
    pub risk_gaps: Vec<ReasoningIssue>,
    pub graph_recommendations: Vec<Recommendation>,
    pub confidence: f64,
}

/// The locked console artifact for one processed decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionPack {
    pub title: String,
    pub summary: PackSummary,
    pub goals_kpis: GoalsKpis,
    pub risks: Vec<Risk>,
    pub owners: Vec<Owner>,
    pub assumptions: Vec<Assumption>,
    pub missing_items: Vec<String>,
    pub approval_chain: Vec<PackApprovalStep>,
    pub recommended_next_actions: Vec<String>,
    pub audit: AuditBlock,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graph_reasoning: Option<GraphReasoningBlock>,
}

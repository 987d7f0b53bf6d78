use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::decision::Severity;
use crate::graph::{EdgePredicate, NodeType};

/// Predicates used in the reasoning subgraph. A superset of the stored
/// graph predicates: the subgraph adds personnel-matching and alignment
/// relations that never enter the graph store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubgraphPredicate {
    OwnedBy,
    MatchesPerson,
    ReportsTo,
    MeasuredBy,
    HasGoal,
    AlignsTo,
    GoalOwnedBy,
    TriggersRisk,
    EvaluatedAgainst,
    GovernedBy,
    RequiresApprovalBy,
    Owns,
    Triggers,
    HasKpi,
    HasCost,
    AffectsRegion,
    UsesData,
    Impacts,
    Mitigates,
}

impl From<EdgePredicate> for SubgraphPredicate {
    fn from(predicate: EdgePredicate) -> Self {
        match predicate {
            EdgePredicate::Owns => SubgraphPredicate::Owns,
            EdgePredicate::RequiresApprovalBy => SubgraphPredicate::RequiresApprovalBy,
            EdgePredicate::GovernedBy => SubgraphPredicate::GovernedBy,
            EdgePredicate::Triggers => SubgraphPredicate::Triggers,
            EdgePredicate::Impacts => SubgraphPredicate::Impacts,
            EdgePredicate::Mitigates => SubgraphPredicate::Mitigates,
            EdgePredicate::HasGoal => SubgraphPredicate::HasGoal,
            EdgePredicate::HasKpi => SubgraphPredicate::HasKpi,
            EdgePredicate::HasCost => SubgraphPredicate::HasCost,
            EdgePredicate::AffectsRegion => SubgraphPredicate::AffectsRegion,
            EdgePredicate::UsesData => SubgraphPredicate::UsesData,
            EdgePredicate::ReportsTo => SubgraphPredicate::ReportsTo,
            EdgePredicate::AlignsTo => SubgraphPredicate::AlignsTo,
        }
    }
}

/// Canonical node record for the reasoning subgraph. `label` names the
/// semantic role ("Person", "CandidateOwner", "StrategicGoal", ...) while
/// `kind` partitions nodes for prompt serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubgraphNode {
    pub id: String,
    pub label: String,
    pub kind: NodeType,
    #[serde(default)]
    pub properties: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubgraphEdge {
    pub source: String,
    pub target: String,
    pub predicate: SubgraphPredicate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubgraphMetadata {
    pub nodes_total: usize,
    pub edges_total: usize,
    pub source: String,
    #[serde(default)]
    pub selection_criteria: Vec<String>,
    #[serde(default)]
    pub matched_personnel: Vec<String>,
}

/// Decision-rooted subgraph handed to the reasoner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subgraph {
    pub nodes: Vec<SubgraphNode>,
    pub edges: Vec<SubgraphEdge>,
    pub metadata: SubgraphMetadata,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMethod {
    Deep,
    Deterministic,
}

impl AnalysisMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisMethod::Deep => "deep",
            AnalysisMethod::Deterministic => "deterministic",
        }
    }
}

/// A logical contradiction surfaced by graph analysis. `kind` is an open
/// vocabulary owned by the analyzer prompt (goal_conflict, kpi_conflict,
/// ownership_missing, risk_coverage_gap, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contradiction {
    #[serde(rename = "type")]
    pub kind: String,
    pub severity: Severity,
    pub description: String,
    #[serde(default)]
    pub nodes_involved: Vec<String>,
    #[serde(default)]
    pub evidence: Option<String>,
    #[serde(default)]
    pub impact: Option<String>,
    #[serde(default)]
    pub recommendation: Option<String>,
}

/// Conflict between the decision and a tenant strategic goal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalConflict {
    pub goal_id: String,
    #[serde(default)]
    pub goal_name: Option<String>,
    #[serde(default)]
    pub conflict_type: Option<String>,
    pub severity: Severity,
    pub description: String,
    #[serde(default)]
    pub recommendation: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OwnerConfidence {
    Low,
    Medium,
    High,
}

/// Owner candidate proposed by the reasoner when none was stated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReasonerOwner {
    pub person_id: String,
    pub name: String,
    pub role: String,
    pub confidence: OwnerConfidence,
    #[serde(default)]
    pub reasoning: Option<String>,
}

/// Ownership or risk-coverage issue reported by graph analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReasoningIssue {
    pub issue: String,
    pub severity: Severity,
    pub description: String,
    #[serde(default)]
    pub recommendation: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub priority: Severity,
    pub action: String,
    #[serde(default)]
    pub reasoning: Option<String>,
}

/// Reasoner output. Shape is identical for deep and deterministic modes so
/// downstream consumers stay mode-agnostic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReasoningOutcome {
    pub analysis_method: AnalysisMethod,
    #[serde(default)]
    pub contradictions: Vec<Contradiction>,
    #[serde(default)]
    pub strategic_goal_conflicts: Vec<GoalConflict>,
    #[serde(default)]
    pub inferred_owners: Vec<ReasonerOwner>,
    #[serde(default)]
    pub ownership_issues: Vec<ReasoningIssue>,
    #[serde(default)]
    pub risk_gaps: Vec<ReasoningIssue>,
    #[serde(default)]
    pub recommendations: Vec<Recommendation>,
    #[serde(default)]
    pub next_actions: Vec<String>,
    pub graph_health_score: f64,
    pub confidence: f64,
    #[serde(default)]
    pub subgraph_metadata: SubgraphMetadata,
}

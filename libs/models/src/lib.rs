pub mod decision;
pub mod governance;
pub mod graph;
pub mod pack;
pub mod reasoning;
pub mod record;
pub mod rule;
pub mod tenant;

pub use decision::{
    Assumption, CounterpartyRelation, Decision, Goal, Kpi, Owner, PolicyChangeType, Risk,
    Severity, StrategicImpact,
};
pub use governance::{
    ApprovalChainStep, ApprovalLevel, GovernanceFlag, GovernanceOutcome, GovernanceStatus,
    InferredOwner, TriggeredRule,
};
pub use graph::{
    DecisionGraph, EdgePredicate, GraphContext, GraphContextMetadata, GraphEdge, GraphMetadata,
    GraphNode, NodeType,
};
pub use pack::{
    AuditBlock, DecisionPack, GoalAlignment, GoalsKpis, GraphContextSummary, GraphReasoningBlock,
    MappedStrategicGoal, PackApprovalStep, PackSummary,
};
pub use reasoning::{
    AnalysisMethod, Contradiction, GoalConflict, OwnerConfidence, ReasonerOwner, ReasoningIssue,
    ReasoningOutcome, Recommendation, Subgraph, SubgraphEdge, SubgraphMetadata, SubgraphNode,
    SubgraphPredicate,
};
pub use record::{
    DecisionRecord, DecisionStatus, DerivedAttributes, ExtractionMetadata, RiskLevel,
};
pub use rule::{
    Condition, ConditionOperator, GovernanceRule, OrCondition, RuleAction, RuleCondition,
    RuleConsequence, RuleType,
};
pub use tenant::{
    ApprovalHierarchy, CompanyMeta, GoalKpi, HierarchyLevel, Personnel, StrategicGoal,
    TenantContext, TenantMetadata,
};

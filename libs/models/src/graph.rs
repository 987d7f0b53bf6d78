use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Node classification in the decision governance graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
    Action,
    Actor,
    Approver,
    Policy,
    Risk,
    Resource,
    Goal,
    #[serde(rename = "KPI")]
    Kpi,
    Cost,
    Region,
    DataType,
}

/// Edge predicates: (from) -[predicate]-> (to).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EdgePredicate {
    Owns,
    RequiresApprovalBy,
    GovernedBy,
    Triggers,
    Impacts,
    Mitigates,
    HasGoal,
    HasKpi,
    HasCost,
    AffectsRegion,
    UsesData,
    ReportsTo,
    AlignsTo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub label: String,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphEdge {
    pub from: String,
    pub to: String,
    pub predicate: EdgePredicate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphMetadata {
    pub node_count: usize,
    pub edge_count: usize,
}

/// Subgraph produced by one decision upsert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionGraph {
    pub decision_id: String,
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub metadata: GraphMetadata,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphContextMetadata {
    pub traversal_depth: usize,
    pub node_count: usize,
    pub edge_count: usize,
}

/// Bounded-BFS traversal result, partitioned by node type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphContext {
    pub decision: Option<GraphNode>,
    pub actors: Vec<GraphNode>,
    pub approvers: Vec<GraphNode>,
    pub policies: Vec<GraphNode>,
    pub risks: Vec<GraphNode>,
    pub goals: Vec<GraphNode>,
    pub kpis: Vec<GraphNode>,
    pub resources: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub metadata: GraphContextMetadata,
}

impl GraphContext {
    /// All nodes in the context, decision root included.
    pub fn all_nodes(&self) -> Vec<&GraphNode> {
        self.decision
            .iter()
            .chain(self.actors.iter())
            .chain(self.approvers.iter())
            .chain(self.policies.iter())
            .chain(self.risks.iter())
            .chain(self.goals.iter())
            .chain(self.kpis.iter())
            .chain(self.resources.iter())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.decision.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_type_serializes_kpi_uppercase() {
        assert_eq!(serde_json::to_string(&NodeType::Kpi).unwrap(), r#""KPI""#);
        assert_eq!(
            serde_json::to_string(&NodeType::DataType).unwrap(),
            r#""DataType""#
        );
    }

    #[test]
    fn edge_predicate_serializes_screaming_snake() {
        assert_eq!(
            serde_json::to_string(&EdgePredicate::RequiresApprovalBy).unwrap(),
            r#""REQUIRES_APPROVAL_BY""#
        );
    }

    #[test]
    fn edge_omits_absent_properties() {
        let edge = GraphEdge {
            from: "a".into(),
            to: "b".into(),
            predicate: EdgePredicate::Owns,
            properties: None,
        };
        let json = serde_json::to_string(&edge).unwrap();
        assert!(!json.contains("properties"));
    }
}

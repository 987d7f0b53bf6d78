use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;

use serde_json::{json, Map, Value};
use thiserror::Error;
use tracing::debug;

use decision_governance_common::utils::truncate_with_ellipsis;
use decision_governance_models::{
    Decision, DecisionGraph, EdgePredicate, GovernanceOutcome, GraphContext,
    GraphContextMetadata, GraphEdge, GraphMetadata, GraphNode, NodeType, RuleAction,
};

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("node '{0}' already exists")]
    DuplicateNode(String),

    #[error("edge endpoint '{0}' does not exist")]
    MissingEndpoint(String),
}

#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
}

#[derive(Default)]
struct GraphInner {
    nodes: HashMap<String, GraphNode>,
    edges: Vec<GraphEdge>,
}

/// In-memory labeled-property graph.
///
/// A process-wide singleton shared across pipelines; a single mutex guards
/// node/edge insertion so concurrent upserts cannot interleave half-built
/// subgraphs. Policy nodes are shared across decisions (one per rule id);
/// Action nodes are unique per decision.
#[derive(Default)]
pub struct GraphStore {
    inner: Mutex<GraphInner>,
}

impl GraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> GraphStats {
        let inner = self.inner.lock().unwrap();
        GraphStats {
            node_count: inner.nodes.len(),
            edge_count: inner.edges.len(),
        }
    }

    /// Materialize one decision plus its governance outcome as a subgraph.
    pub fn upsert_decision_graph(
        &self,
        decision: &Decision,
        governance: &GovernanceOutcome,
        decision_id: &str,
    ) -> Result<DecisionGraph, GraphError> {
        let mut inner = self.inner.lock().unwrap();
        let mut nodes = Vec::new();
        let mut edges = Vec::new();

        // Action node: the decision itself, unique per decision.
        let mut action_props = Map::new();
        if let Some(score) = decision.risk_score {
            action_props.insert("risk_score".into(), json!(score));
        }
        if let Some(impact) = decision.strategic_impact {
            action_props.insert("strategic_impact".into(), json!(impact.as_str()));
        }
        add_node(
            &mut inner,
            &mut nodes,
            GraphNode {
                id: decision_id.to_string(),
                node_type: NodeType::Action,
                label: decision.statement.clone(),
                properties: action_props,
            },
        )?;

        // Explicit owners only; inferred ownership belongs to the reasoner.
        for (idx, owner) in decision.owners.iter().enumerate() {
            let actor_id = format!("{decision_id}_owner_{idx}");
            let mut props = Map::new();
            if let Some(role) = &owner.role {
                props.insert("role".into(), json!(role));
            }
            add_node(
                &mut inner,
                &mut nodes,
                GraphNode {
                    id: actor_id.clone(),
                    node_type: NodeType::Actor,
                    label: owner.name.clone(),
                    properties: props,
                },
            )?;
            add_edge(
                &mut inner,
                &mut edges,
                GraphEdge {
                    from: actor_id,
                    to: decision_id.to_string(),
                    predicate: EdgePredicate::Owns,
                    properties: None,
                },
            )?;
        }

        for (idx, goal) in decision.goals.iter().enumerate() {
            let goal_id = format!("{decision_id}_goal_{idx}");
            let mut props = Map::new();
            props.insert("description".into(), json!(goal.description));
            if let Some(metric) = &goal.metric {
                props.insert("metric".into(), json!(metric));
            }
            add_node(
                &mut inner,
                &mut nodes,
                GraphNode {
                    id: goal_id.clone(),
                    node_type: NodeType::Goal,
                    label: format!(
                        "G{}: {}",
                        idx + 1,
                        truncate_with_ellipsis(&goal.description, 50)
                    ),
                    properties: props,
                },
            )?;
            add_edge(
                &mut inner,
                &mut edges,
                GraphEdge {
                    from: decision_id.to_string(),
                    to: goal_id,
                    predicate: EdgePredicate::HasGoal,
                    properties: None,
                },
            )?;
        }

        for (idx, kpi) in decision.kpis.iter().enumerate() {
            let kpi_id = format!("{decision_id}_kpi_{idx}");
            let mut props = Map::new();
            props.insert("name".into(), json!(kpi.name));
            if let Some(target) = &kpi.target {
                props.insert("target".into(), json!(target));
            }
            add_node(
                &mut inner,
                &mut nodes,
                GraphNode {
                    id: kpi_id.clone(),
                    node_type: NodeType::Kpi,
                    label: format!("K{}: {}", idx + 1, truncate_with_ellipsis(&kpi.name, 30)),
                    properties: props,
                },
            )?;
            add_edge(
                &mut inner,
                &mut edges,
                GraphEdge {
                    from: decision_id.to_string(),
                    to: kpi_id,
                    predicate: EdgePredicate::HasKpi,
                    properties: None,
                },
            )?;
        }

        // Cost, region, and data-classification nodes come straight from
        // the extracted governance-trigger attributes.
        if let Some(cost) = decision.cost {
            let cost_id = format!("{decision_id}_cost");
            let mut props = Map::new();
            props.insert("amount".into(), json!(cost));
            if let Some(range) = &decision.cost_estimate_range {
                props.insert("estimate_range".into(), json!(range));
            }
            add_node(
                &mut inner,
                &mut nodes,
                GraphNode {
                    id: cost_id.clone(),
                    node_type: NodeType::Cost,
                    label: format_amount(cost),
                    properties: props,
                },
            )?;
            add_edge(
                &mut inner,
                &mut edges,
                GraphEdge {
                    from: decision_id.to_string(),
                    to: cost_id,
                    predicate: EdgePredicate::HasCost,
                    properties: None,
                },
            )?;
        }

        if let Some(region) = &decision.target_market {
            let region_id = format!("{decision_id}_region");
            let mut props = Map::new();
            props.insert("name".into(), json!(region));
            add_node(
                &mut inner,
                &mut nodes,
                GraphNode {
                    id: region_id.clone(),
                    node_type: NodeType::Region,
                    label: region.clone(),
                    properties: props,
                },
            )?;
            add_edge(
                &mut inner,
                &mut edges,
                GraphEdge {
                    from: decision_id.to_string(),
                    to: region_id,
                    predicate: EdgePredicate::AffectsRegion,
                    properties: None,
                },
            )?;
        }

        if decision.uses_pii == Some(true) {
            let data_id = format!("{decision_id}_data");
            let mut props = Map::new();
            props.insert("classification".into(), json!("PII"));
            add_node(
                &mut inner,
                &mut nodes,
                GraphNode {
                    id: data_id.clone(),
                    node_type: NodeType::DataType,
                    label: "PII".into(),
                    properties: props,
                },
            )?;
            add_edge(
                &mut inner,
                &mut edges,
                GraphEdge {
                    from: decision_id.to_string(),
                    to: data_id,
                    predicate: EdgePredicate::UsesData,
                    properties: None,
                },
            )?;
        }

        for (idx, risk) in decision.risks.iter().enumerate() {
            let risk_id = format!("{decision_id}_risk_{idx}");
            let mut props = Map::new();
            if let Some(severity) = risk.severity {
                props.insert("severity".into(), json!(severity.as_str()));
            }
            if let Some(mitigation) = &risk.mitigation {
                props.insert("mitigation".into(), json!(mitigation));
            }
            add_node(
                &mut inner,
                &mut nodes,
                GraphNode {
                    id: risk_id.clone(),
                    node_type: NodeType::Risk,
                    label: risk.description.clone(),
                    properties: props,
                },
            )?;
            add_edge(
                &mut inner,
                &mut edges,
                GraphEdge {
                    from: decision_id.to_string(),
                    to: risk_id,
                    predicate: EdgePredicate::Triggers,
                    properties: None,
                },
            )?;
        }

        // Approver nodes carry the auth type derived from the rule action:
        // a review gate is an escalation, an approval gate is required.
        for (idx, step) in governance.approval_chain.iter().enumerate() {
            let approver_id = format!("{decision_id}_approver_{idx}");
            let auth_type = match step.rule_action {
                Some(RuleAction::RequireReview) => "ESCALATION",
                _ => "REQUIRED",
            };
            let mut props = Map::new();
            props.insert("role".into(), json!(step.role));
            props.insert("auth_type".into(), json!(auth_type));
            props.insert("required".into(), json!(step.required));
            if let Some(rule_id) = &step.source_rule_id {
                props.insert("source_rule_id".into(), json!(rule_id));
            }
            if let Some(rationale) = &step.rationale {
                props.insert("rationale".into(), json!(rationale));
            }
            add_node(
                &mut inner,
                &mut nodes,
                GraphNode {
                    id: approver_id.clone(),
                    node_type: NodeType::Approver,
                    label: step.role.clone(),
                    properties: props,
                },
            )?;
            let mut edge_props = Map::new();
            edge_props.insert("required".into(), json!(step.required));
            if let Some(rationale) = &step.rationale {
                edge_props.insert("rationale".into(), json!(rationale));
            }
            add_edge(
                &mut inner,
                &mut edges,
                GraphEdge {
                    from: decision_id.to_string(),
                    to: approver_id,
                    predicate: EdgePredicate::RequiresApprovalBy,
                    properties: Some(edge_props),
                },
            )?;
        }

        // Policy nodes are shared: one node per rule id across all
        // decisions, so traversal naturally links decisions governed by the
        // same rule.
        for rule in &governance.triggered_rules {
            let policy_id = format!("policy_{}", rule.rule_id);
            if !inner.nodes.contains_key(&policy_id) {
                let mut props = Map::new();
                props.insert("description".into(), json!(rule.description));
                props.insert("rule_type".into(), json!(rule.rule_type.as_str()));
                add_node(
                    &mut inner,
                    &mut nodes,
                    GraphNode {
                        id: policy_id.clone(),
                        node_type: NodeType::Policy,
                        label: rule.name.clone(),
                        properties: props,
                    },
                )?;
            }
            add_edge(
                &mut inner,
                &mut edges,
                GraphEdge {
                    from: decision_id.to_string(),
                    to: policy_id,
                    predicate: EdgePredicate::GovernedBy,
                    properties: None,
                },
            )?;
        }

        debug!(
            decision_id,
            nodes = nodes.len(),
            edges = edges.len(),
            "decision graph upserted"
        );

        let metadata = GraphMetadata {
            node_count: nodes.len(),
            edge_count: edges.len(),
        };
        Ok(DecisionGraph {
            decision_id: decision_id.to_string(),
            nodes,
            edges,
            metadata,
        })
    }

    /// Bounded BFS from the decision node, following edges in both
    /// directions. Every edge in the result has both endpoints in the
    /// returned node set.
    pub fn get_context(&self, decision_id: &str, depth: usize) -> GraphContext {
        let inner = self.inner.lock().unwrap();

        if !inner.nodes.contains_key(decision_id) {
            return GraphContext::default();
        }

        let mut visited: HashSet<String> = HashSet::new();
        visited.insert(decision_id.to_string());
        let mut frontier: VecDeque<String> = VecDeque::new();
        frontier.push_back(decision_id.to_string());

        for _ in 0..depth {
            let mut next: VecDeque<String> = VecDeque::new();
            while let Some(node_id) = frontier.pop_front() {
                for edge in &inner.edges {
                    let neighbor = if edge.from == node_id {
                        Some(&edge.to)
                    } else if edge.to == node_id {
                        Some(&edge.from)
                    } else {
                        None
                    };
                    if let Some(neighbor) = neighbor {
                        if visited.insert(neighbor.clone()) {
                            next.push_back(neighbor.clone());
                        }
                    }
                }
            }
            if next.is_empty() {
                break;
            }
            frontier = next;
        }

        // Closure over the visited set keeps the endpoint invariant: only
        // edges with both ends visited are returned, deduplicated.
        let mut seen_edges = HashSet::new();
        let edges: Vec<GraphEdge> = inner
            .edges
            .iter()
            .filter(|edge| visited.contains(&edge.from) && visited.contains(&edge.to))
            .filter(|edge| {
                seen_edges.insert((edge.from.clone(), edge.to.clone(), edge.predicate))
            })
            .cloned()
            .collect();

        let mut context = GraphContext {
            metadata: GraphContextMetadata {
                traversal_depth: depth,
                node_count: visited.len(),
                edge_count: edges.len(),
            },
            edges,
            ..GraphContext::default()
        };

        for node_id in &visited {
            let Some(node) = inner.nodes.get(node_id) else {
                continue;
            };
            if node.id == decision_id {
                context.decision = Some(node.clone());
                continue;
            }
            match node.node_type {
                NodeType::Actor => context.actors.push(node.clone()),
                NodeType::Approver => context.approvers.push(node.clone()),
                NodeType::Policy => context.policies.push(node.clone()),
                NodeType::Risk => context.risks.push(node.clone()),
                NodeType::Goal => context.goals.push(node.clone()),
                NodeType::Kpi => context.kpis.push(node.clone()),
                NodeType::Action
                | NodeType::Resource
                | NodeType::Cost
                | NodeType::Region
                | NodeType::DataType => context.resources.push(node.clone()),
            }
        }

        context
    }
}

fn add_node(
    inner: &mut GraphInner,
    created: &mut Vec<GraphNode>,
    node: GraphNode,
) -> Result<(), GraphError> {
    if inner.nodes.contains_key(&node.id) {
        return Err(GraphError::DuplicateNode(node.id));
    }
    created.push(node.clone());
    inner.nodes.insert(node.id.clone(), node);
    Ok(())
}

fn add_edge(
    inner: &mut GraphInner,
    created: &mut Vec<GraphEdge>,
    edge: GraphEdge,
) -> Result<(), GraphError> {
    if !inner.nodes.contains_key(&edge.from) {
        return Err(GraphError::MissingEndpoint(edge.from));
    }
    if !inner.nodes.contains_key(&edge.to) {
        return Err(GraphError::MissingEndpoint(edge.to));
    }
    created.push(edge.clone());
    inner.edges.push(edge);
    Ok(())
}

fn format_amount(amount: f64) -> String {
    if amount.fract() == 0.0 && amount.abs() < 1e15 {
        let whole = amount as i64;
        let digits: Vec<char> = whole.abs().to_string().chars().rev().collect();
        let mut grouped = String::new();
        for (i, c) in digits.iter().enumerate() {
            if i > 0 && i % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(*c);
        }
        let formatted: String = grouped.chars().rev().collect();
        if whole < 0 {
            format!("-{formatted}")
        } else {
            formatted
        }
    } else {
        format!("{amount}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amount_formatting_groups_thousands() {
        assert_eq!(format_amount(3_500_000.0), "3,500,000");
        assert_eq!(format_amount(950.0), "950");
        assert_eq!(format_amount(-42_000.0), "-42,000");
    }
}

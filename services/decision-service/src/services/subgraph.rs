use std::collections::HashSet;

use serde_json::{json, Value};
use tracing::debug;

use decision_governance_models::{
    Decision, GraphContext, NodeType, Subgraph, SubgraphEdge, SubgraphMetadata, SubgraphNode,
    SubgraphPredicate, TenantContext,
};

/// Build the decision-rooted subgraph handed to the reasoner.
///
/// Combines three sources: the decision itself, tenant context (personnel
/// matching, strategic-goal alignment, risk tolerance), and — when the
/// graph upsert succeeded — nodes already stored in the graph (policies,
/// approvers). IDs are decision-scoped so repeated extraction is
/// idempotent.
pub fn build_subgraph(
    decision_id: &str,
    decision: &Decision,
    tenant: &TenantContext,
    graph_context: Option<&GraphContext>,
) -> Subgraph {
    let mut builder = SubgraphBuilder::default();

    // Root node
    builder.add_node(
        decision_id,
        "Decision",
        NodeType::Action,
        json!({
            "statement": decision.statement,
            "risk_score": decision.risk_score,
            "strategic_impact": decision.strategic_impact.map(|i| i.as_str()),
        }),
    );

    let personnel = &tenant.approval_hierarchy.personnel;
    let mut matched_personnel: HashSet<String> = HashSet::new();

    if decision.owners.is_empty() {
        // No owners stated: inject the full hierarchy as candidates so the
        // reasoner can argue about who should be accountable.
        for person in personnel {
            builder.add_node(
                &person.id,
                "CandidateOwner",
                NodeType::Actor,
                serde_json::to_value(person).unwrap_or(Value::Null),
            );
            matched_personnel.insert(person.id.clone());
        }
        for person in personnel {
            if let Some(manager_id) = person.reports_to.as_deref() {
                if tenant.approval_hierarchy.find_by_id(manager_id).is_some() {
                    builder.add_edge(&person.id, manager_id, SubgraphPredicate::ReportsTo, None);
                }
            }
        }
    } else {
        // Fuzzy-match stated owners against personnel by case-insensitive
        // substring on name or role, then walk the reporting chain upward.
        for (idx, owner) in decision.owners.iter().enumerate() {
            let owner_node_id = format!("{decision_id}_owner_{idx}");
            builder.add_node(
                &owner_node_id,
                "DecisionOwner",
                NodeType::Actor,
                serde_json::to_value(owner).unwrap_or(Value::Null),
            );
            builder.add_edge(decision_id, &owner_node_id, SubgraphPredicate::OwnedBy, None);

            let needle = owner
                .role
                .as_deref()
                .unwrap_or(owner.name.as_str())
                .to_lowercase();
            let owner_name = owner.name.to_lowercase();

            for person in personnel {
                let person_name = person.name.to_lowercase();
                let person_role = person.role.to_lowercase();
                let matches = fuzzy_match(&owner_name, &person_name)
                    || fuzzy_match(&owner_name, &person_role)
                    || fuzzy_match(&needle, &person_name)
                    || fuzzy_match(&needle, &person_role);
                if !matches {
                    continue;
                }

                builder.add_node(
                    &person.id,
                    "Person",
                    NodeType::Actor,
                    serde_json::to_value(person).unwrap_or(Value::Null),
                );
                builder.add_edge(
                    &owner_node_id,
                    &person.id,
                    SubgraphPredicate::MatchesPerson,
                    None,
                );
                matched_personnel.insert(person.id.clone());

                // Reporting chain, two hops up
                let mut current = person.id.as_str();
                for _ in 0..2 {
                    let Some(manager_id) = tenant
                        .approval_hierarchy
                        .find_by_id(current)
                        .and_then(|p| p.reports_to.as_deref())
                    else {
                        break;
                    };
                    let Some(manager) = tenant.approval_hierarchy.find_by_id(manager_id) else {
                        break;
                    };
                    builder.add_node(
                        &manager.id,
                        "Person",
                        NodeType::Actor,
                        serde_json::to_value(manager).unwrap_or(Value::Null),
                    );
                    builder.add_edge(current, &manager.id, SubgraphPredicate::ReportsTo, None);
                    matched_personnel.insert(manager.id.clone());
                    current = manager_id;
                }
            }
        }
    }

    // Decision KPIs, with keyword sets for strategic-goal overlap matching
    let mut decision_kpi_keywords: HashSet<String> = HashSet::new();
    for (idx, kpi) in decision.kpis.iter().enumerate() {
        let kpi_id = format!("{decision_id}_kpi_{idx}");
        decision_kpi_keywords.extend(keywords(&kpi.name));
        builder.add_node(
            &kpi_id,
            "KPI",
            NodeType::Resource,
            serde_json::to_value(kpi).unwrap_or(Value::Null),
        );
        builder.add_edge(decision_id, &kpi_id, SubgraphPredicate::MeasuredBy, None);
    }

    // Decision goals
    let mut decision_goal_texts: HashSet<String> = HashSet::new();
    for (idx, goal) in decision.goals.iter().enumerate() {
        let goal_id = format!("{decision_id}_goal_{idx}");
        decision_goal_texts.insert(goal.description.trim().to_lowercase());
        builder.add_node(
            &goal_id,
            "DecisionGoal",
            NodeType::Action,
            serde_json::to_value(goal).unwrap_or(Value::Null),
        );
        builder.add_edge(decision_id, &goal_id, SubgraphPredicate::HasGoal, None);
    }

    // Strategic goals that share a KPI keyword, an owner, or a semantic
    // token with the decision. Confidence reflects the strongest overlap.
    for sg in &tenant.strategic_goals {
        let mut sg_kpi_keywords: HashSet<String> = HashSet::new();
        for kpi in &sg.kpis {
            sg_kpi_keywords.extend(keywords(&kpi.name));
        }
        let kpi_overlap = !decision_kpi_keywords.is_disjoint(&sg_kpi_keywords);

        let owner_overlap = sg
            .owner_id
            .as_deref()
            .map(|id| matched_personnel.contains(id))
            .unwrap_or(false);

        let sg_name = sg.name.to_lowercase();
        let sg_desc = sg.description.to_lowercase();
        let semantic_overlap = decision_goal_texts.iter().any(|text| {
            text.split_whitespace()
                .filter(|word| word.len() > 3)
                .any(|word| sg_name.contains(word) || sg_desc.contains(word))
        });

        if !(kpi_overlap || owner_overlap || semantic_overlap) {
            continue;
        }

        let mut overlap_types = Vec::new();
        if kpi_overlap {
            overlap_types.push("shared_kpi");
        }
        if owner_overlap {
            overlap_types.push("shared_owner");
        }
        if semantic_overlap {
            overlap_types.push("semantic");
        }
        let confidence = if kpi_overlap {
            0.9
        } else if owner_overlap {
            0.7
        } else {
            0.5
        };

        builder.add_node(
            &sg.goal_id,
            "StrategicGoal",
            NodeType::Goal,
            serde_json::to_value(sg).unwrap_or(Value::Null),
        );
        builder.add_edge(
            decision_id,
            &sg.goal_id,
            SubgraphPredicate::AlignsTo,
            Some(json!({
                "overlap_types": overlap_types,
                "confidence": confidence,
            })),
        );

        if let Some(owner_id) = sg.owner_id.as_deref() {
            if let Some(person) = tenant.approval_hierarchy.find_by_id(owner_id) {
                builder.add_node(
                    &person.id,
                    "Person",
                    NodeType::Actor,
                    serde_json::to_value(person).unwrap_or(Value::Null),
                );
                builder.add_edge(
                    &sg.goal_id,
                    &person.id,
                    SubgraphPredicate::GoalOwnedBy,
                    None,
                );
            }
        }
    }

    // Risks
    for (idx, risk) in decision.risks.iter().enumerate() {
        let risk_id = format!("{decision_id}_risk_{idx}");
        builder.add_node(
            &risk_id,
            "Risk",
            NodeType::Risk,
            serde_json::to_value(risk).unwrap_or(Value::Null),
        );
        builder.add_edge(decision_id, &risk_id, SubgraphPredicate::TriggersRisk, None);
    }

    // Risk tolerance as a single reference node
    if !tenant.risk_tolerance.is_null() {
        let tolerance_id = format!("{decision_id}_risk_tolerance");
        builder.add_node(
            &tolerance_id,
            "RiskTolerance",
            NodeType::Policy,
            tenant.risk_tolerance.clone(),
        );
        builder.add_edge(
            decision_id,
            &tolerance_id,
            SubgraphPredicate::EvaluatedAgainst,
            None,
        );
    }

    // Merge stored graph context so policies and approval actors enrich
    // the structural picture.
    let merged_graph = match graph_context {
        Some(context) if !context.is_empty() => {
            merge_graph_context(&mut builder, decision_id, context);
            true
        }
        _ => false,
    };

    let metadata = SubgraphMetadata {
        nodes_total: builder.nodes.len(),
        edges_total: builder.edges.len(),
        source: if merged_graph {
            "decision+tenant+graph".to_string()
        } else {
            "decision+tenant".to_string()
        },
        selection_criteria: vec![
            "owner_match -> personnel -> reporting_chain (2 hops)".to_string(),
            "kpi_overlap -> strategic_goals".to_string(),
            "owner_overlap -> strategic_goals".to_string(),
            "semantic_overlap -> strategic_goals".to_string(),
            "risks -> risk_tolerance".to_string(),
            "graph context merge (policies, approvers)".to_string(),
        ],
        matched_personnel: {
            let mut ids: Vec<String> = matched_personnel.into_iter().collect();
            ids.sort();
            ids
        },
    };

    debug!(
        decision_id,
        nodes = metadata.nodes_total,
        edges = metadata.edges_total,
        source = %metadata.source,
        "subgraph built"
    );

    Subgraph {
        nodes: builder.nodes,
        edges: builder.edges,
        metadata,
    }
}

/// Case-insensitive bidirectional substring match (inputs pre-lowercased).
fn fuzzy_match(a: &str, b: &str) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }
    a.contains(b) || b.contains(a)
}

/// Tokenize a KPI name for overlap matching: split on whitespace and
/// hyphens, strip digits and percent signs, keep tokens of 2+ chars.
fn keywords(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .replace('-', " ")
        .replace('%', " ")
        .split_whitespace()
        .filter(|word| word.len() >= 2 && !word.chars().all(|c| c.is_ascii_digit()))
        .map(String::from)
        .collect()
}

#[derive(Default)]
struct SubgraphBuilder {
    nodes: Vec<SubgraphNode>,
    edges: Vec<SubgraphEdge>,
    seen: HashSet<String>,
}

impl SubgraphBuilder {
    fn add_node(&mut self, id: &str, label: &str, kind: NodeType, properties: Value) {
        if self.seen.insert(id.to_string()) {
            self.nodes.push(SubgraphNode {
                id: id.to_string(),
                label: label.to_string(),
                kind,
                properties,
            });
        }
    }

    /// Edges are only recorded when both endpoints are present, keeping
    /// the endpoint-closure invariant by construction.
    fn add_edge(
        &mut self,
        source: &str,
        target: &str,
        predicate: SubgraphPredicate,
        properties: Option<Value>,
    ) {
        if self.seen.contains(source) && self.seen.contains(target) {
            self.edges.push(SubgraphEdge {
                source: source.to_string(),
                target: target.to_string(),
                predicate,
                properties,
            });
        }
    }
}

fn merge_graph_context(builder: &mut SubgraphBuilder, decision_id: &str, context: &GraphContext) {
    for actor in context.actors.iter().chain(context.approvers.iter()) {
        builder.add_node(
            &actor.id,
            &actor.label,
            actor.node_type,
            Value::Object(actor.properties.clone()),
        );
    }
    for policy in &context.policies {
        builder.add_node(
            &policy.id,
            &policy.label,
            NodeType::Policy,
            Value::Object(policy.properties.clone()),
        );
        builder.add_edge(decision_id, &policy.id, SubgraphPredicate::GovernedBy, None);
    }
    for risk in &context.risks {
        builder.add_node(
            &risk.id,
            &risk.label,
            NodeType::Risk,
            Value::Object(risk.properties.clone()),
        );
    }
    for edge in &context.edges {
        builder.add_edge(
            &edge.from,
            &edge.to,
            SubgraphPredicate::from(edge.predicate),
            edge.properties.clone().map(Value::Object),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_strip_digits_and_percent() {
        let tokens = keywords("operating-cost -10%");
        assert!(tokens.contains("operating"));
        assert!(tokens.contains("cost"));
        assert!(!tokens.contains("10"));
    }

    #[test]
    fn fuzzy_match_is_bidirectional_substring() {
        assert!(fuzzy_match("finance manager", "finance"));
        assert!(fuzzy_match("cfo", "group cfo"));
        assert!(!fuzzy_match("", "cfo"));
        assert!(!fuzzy_match("marketing", "security"));
    }
}

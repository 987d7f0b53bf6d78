mod common;

use std::collections::HashSet;

use common::*;
use decision_governance_models::{Severity, SubgraphPredicate};
use decision_service::services::governance::evaluate_governance;
use decision_service::services::graph_store::GraphStore;
use decision_service::services::subgraph::build_subgraph;

#[test]
fn stated_owner_matches_personnel_and_reporting_chain() {
    let tenant = load_tenant("helios_industries");
    let mut decision = decision("Refinance the equipment leasing facility before renewal");
    decision.owners = vec![owner("CFO", Some("CFO"))];

    let subgraph = build_subgraph("dec-1", &decision, &tenant, None);

    let ids: HashSet<&str> = subgraph.nodes.iter().map(|n| n.id.as_str()).collect();
    assert!(ids.contains("dec-1_owner_0"));
    assert!(ids.contains("cfo_001"), "owner should match the CFO");
    assert!(ids.contains("ceo_001"), "reporting chain should walk upward");

    assert!(subgraph
        .edges
        .iter()
        .any(|e| e.predicate == SubgraphPredicate::MatchesPerson && e.target == "cfo_001"));
    assert!(subgraph
        .edges
        .iter()
        .any(|e| e.predicate == SubgraphPredicate::ReportsTo
            && e.source == "cfo_001"
            && e.target == "ceo_001"));
    assert!(subgraph
        .metadata
        .matched_personnel
        .contains(&"cfo_001".to_string()));
}

#[test]
fn empty_owners_inject_candidate_hierarchy() {
    let tenant = load_tenant("helios_industries");
    let decision = decision("Select a standard issue-tracking workflow for all product teams");

    let subgraph = build_subgraph("dec-2", &decision, &tenant, None);

    let candidates: Vec<_> = subgraph
        .nodes
        .iter()
        .filter(|n| n.label == "CandidateOwner")
        .collect();
    assert_eq!(candidates.len(), tenant.approval_hierarchy.personnel.len());
    assert!(subgraph
        .edges
        .iter()
        .any(|e| e.predicate == SubgraphPredicate::ReportsTo));
}

#[test]
fn kpi_keyword_overlap_aligns_strategic_goals() {
    let tenant = load_tenant("helios_industries");
    let mut decision = decision("Renegotiate logistics contracts to bring down freight spend");
    decision.kpis = vec![kpi("operating cost reduction vs baseline")];

    let subgraph = build_subgraph("dec-3", &decision, &tenant, None);

    let align = subgraph
        .edges
        .iter()
        .find(|e| e.predicate == SubgraphPredicate::AlignsTo && e.target == "G3")
        .expect("shared KPI keywords should align to G3");
    let props = align.properties.as_ref().unwrap();
    assert_eq!(props["confidence"], 0.9);
    assert!(props["overlap_types"]
        .as_array()
        .unwrap()
        .iter()
        .any(|v| v == "shared_kpi"));

    // The goal owner is pulled in alongside the goal
    assert!(subgraph.nodes.iter().any(|n| n.id == "cfo_001"));
    assert!(subgraph
        .edges
        .iter()
        .any(|e| e.predicate == SubgraphPredicate::GoalOwnedBy && e.source == "G3"));
}

#[test]
fn risks_and_tolerance_are_linked() {
    let tenant = load_tenant("helios_industries");
    let mut decision = decision("Trial a new injection molding compound on the consumer line");
    decision.owners = vec![owner("VP of Engineering", None)];
    decision.risks = vec![risk("Material fatigue in cold climates", Severity::High, None)];

    let subgraph = build_subgraph("dec-4", &decision, &tenant, None);

    assert!(subgraph
        .edges
        .iter()
        .any(|e| e.predicate == SubgraphPredicate::TriggersRisk && e.target == "dec-4_risk_0"));
    assert!(subgraph
        .edges
        .iter()
        .any(|e| e.predicate == SubgraphPredicate::EvaluatedAgainst));
}

#[test]
fn graph_context_merge_enriches_the_subgraph() {
    let tenant = load_tenant("helios_industries");
    let decision = acquisition_decision();
    let governance = evaluate_governance(&decision, &tenant, None);

    let store = GraphStore::new();
    store
        .upsert_decision_graph(&decision, &governance, "dec-5")
        .unwrap();
    let context = store.get_context("dec-5", 2);

    let subgraph = build_subgraph("dec-5", &decision, &tenant, Some(&context));

    assert_eq!(subgraph.metadata.source, "decision+tenant+graph");
    assert!(subgraph.nodes.iter().any(|n| n.id == "policy_R1"));
    assert!(subgraph
        .edges
        .iter()
        .any(|e| e.predicate == SubgraphPredicate::GovernedBy && e.target == "policy_R1"));
}

#[test]
fn every_edge_endpoint_exists_in_the_node_set() {
    let tenant = load_tenant("helios_industries");
    let mut decision = acquisition_decision();
    decision.kpis.push(kpi("operating cost reduction"));

    let subgraph = build_subgraph("dec-6", &decision, &tenant, None);

    let ids: HashSet<&str> = subgraph.nodes.iter().map(|n| n.id.as_str()).collect();
    for edge in &subgraph.edges {
        assert!(ids.contains(edge.source.as_str()), "dangling {}", edge.source);
        assert!(ids.contains(edge.target.as_str()), "dangling {}", edge.target);
    }
}

#[test]
fn subgraph_ids_are_stable_across_rebuilds() {
    let tenant = load_tenant("helios_industries");
    let decision = acquisition_decision();

    let first = build_subgraph("dec-7", &decision, &tenant, None);
    let second = build_subgraph("dec-7", &decision, &tenant, None);

    let first_ids: Vec<&String> = first.nodes.iter().map(|n| &n.id).collect();
    let second_ids: Vec<&String> = second.nodes.iter().map(|n| &n.id).collect();
    assert_eq!(first_ids, second_ids);
    assert_eq!(first.edges.len(), second.edges.len());
}

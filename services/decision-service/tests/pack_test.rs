mod common;

use common::*;
use decision_governance_models::{
    AnalysisMethod, GoalAlignment, GoalConflict, GovernanceFlag, GovernanceStatus,
    OwnerConfidence, ReasonerOwner, ReasoningOutcome, RiskLevel, Severity, StrategicImpact,
    SubgraphMetadata,
};
use decision_service::services::governance::evaluate_governance;
use decision_service::services::pack::build_decision_pack;

fn deep_reasoning(next_actions: Vec<&str>, conflicts: Vec<GoalConflict>) -> ReasoningOutcome {
    ReasoningOutcome {
        analysis_method: AnalysisMethod::Deep,
        contradictions: Vec::new(),
        strategic_goal_conflicts: conflicts,
        inferred_owners: Vec::new(),
        ownership_issues: Vec::new(),
        risk_gaps: Vec::new(),
        recommendations: Vec::new(),
        next_actions: next_actions.into_iter().map(String::from).collect(),
        graph_health_score: 0.8,
        confidence: 0.85,
        subgraph_metadata: SubgraphMetadata::default(),
    }
}

#[test]
fn compliant_pack_recommends_final_review() {
    let tenant = load_tenant("helios_industries");
    let decision = compliant_tooling_decision();
    let governance = evaluate_governance(&decision, &tenant, None);

    let pack = build_decision_pack(&decision, &governance, &tenant, None);

    assert_eq!(pack.summary.governance_status, GovernanceStatus::Compliant);
    assert_eq!(pack.summary.risk_level, RiskLevel::Low);
    assert!(pack
        .recommended_next_actions
        .iter()
        .any(|action| action.contains("after a final review")));
    assert!(pack.missing_items.is_empty());
    assert!(pack
        .summary
        .conclusion_reason
        .contains("compliant with governance rules"));
}

#[test]
fn critical_decision_gets_prefixed_title() {
    let tenant = load_tenant("helios_industries");
    let mut decision = decision(
        "Launch new product in 2 weeks without QA coverage to beat the competitor announcement window and capture early enterprise interest",
    );
    decision.kpis = (0..7).map(|i| kpi(&format!("kpi {i}"))).collect();
    decision.risks = (0..4)
        .map(|i| risk(&format!("failure mode {i}"), Severity::Critical, None))
        .collect();
    decision.strategic_impact = Some(StrategicImpact::Critical);
    decision.confidence = 0.15;
    let governance = evaluate_governance(&decision, &tenant, None);

    let pack = build_decision_pack(&decision, &governance, &tenant, None);

    assert!(pack.title.starts_with("[CRITICAL] "));
    assert!(pack.title.ends_with("..."));
    assert_eq!(pack.summary.governance_status, GovernanceStatus::Blocked);
    assert_eq!(pack.summary.risk_level, RiskLevel::High);
    assert!(pack
        .recommended_next_actions
        .iter()
        .any(|action| action.contains("Resolve the conflicting items")));
}

#[test]
fn blocked_with_approvers_and_no_gaps_is_resolvable() {
    let tenant = load_tenant("helios_industries");
    let decision = acquisition_decision();
    let governance = evaluate_governance(&decision, &tenant, None);
    assert_eq!(governance.status, GovernanceStatus::Blocked);

    let pack = build_decision_pack(&decision, &governance, &tenant, None);

    assert!(pack.summary.conclusion_reason.starts_with("Blocked by"));
    assert!(pack.summary.conclusion_reason.contains("resolvable with"));
    assert!(pack.summary.conclusion_reason.contains("CFO"));
}

#[test]
fn blocked_with_structural_gaps_requires_fixes_first() {
    let tenant = load_tenant("helios_industries");
    let mut decision = acquisition_decision();
    decision.risks = Vec::new(); // keeps the block (critical R2) but opens a gap
    let governance = evaluate_governance(&decision, &tenant, None);
    assert_eq!(governance.status, GovernanceStatus::Blocked);

    let pack = build_decision_pack(&decision, &governance, &tenant, None);

    assert!(pack.missing_items.contains(&"Missing risk".to_string()));
    assert!(pack
        .summary
        .conclusion_reason
        .contains("Resolve structural gaps first"));
}

#[test]
fn review_conclusion_names_the_approvers() {
    let tenant = load_tenant("helios_industries");
    let mut decision = decision("Purchase a production line monitoring system for the plant");
    decision.cost = Some(60_000.0);
    decision.owners = vec![owner("Finance Manager", Some("Finance Manager"))];
    decision.risks = vec![risk("Vendor lock-in", Severity::Medium, Some("Exit clause"))];
    let governance = evaluate_governance(&decision, &tenant, None);
    assert_eq!(governance.status, GovernanceStatus::ReviewRequired);

    let pack = build_decision_pack(&decision, &governance, &tenant, None);

    assert!(pack
        .summary
        .conclusion_reason
        .starts_with("Requires human review"));
    assert!(pack.summary.conclusion_reason.contains("Proceed after"));
    assert!(pack
        .recommended_next_actions
        .iter()
        .any(|action| action.contains("CFO approval")));
}

#[test]
fn missing_measurables_only_for_high_impact() {
    let tenant = load_tenant("helios_industries");

    let mut low = compliant_tooling_decision();
    low.kpis = Vec::new();
    let governance = evaluate_governance(&low, &tenant, None);
    let pack = build_decision_pack(&low, &governance, &tenant, None);
    assert!(!pack.missing_items.iter().any(|item| item.contains("KPI")));

    let mut high = compliant_tooling_decision();
    high.strategic_impact = Some(StrategicImpact::High);
    high.goals = Vec::new();
    high.kpis = Vec::new();
    let governance = evaluate_governance(&high, &tenant, None);
    let pack = build_decision_pack(&high, &governance, &tenant, None);
    assert!(pack.missing_items.contains(&"Missing KPI".to_string()));
    assert!(pack.missing_items.contains(&"Missing goals".to_string()));
}

#[test]
fn inferred_owner_suppresses_missing_owner_item() {
    let tenant = load_tenant("helios_industries");
    let mut decision = decision("Procure a logistics optimization platform for the supply team");
    decision.cost = Some(80_000.0);
    decision.risks = vec![risk("Adoption risk", Severity::Medium, Some("Training plan"))];
    let governance = evaluate_governance(&decision, &tenant, None);
    assert!(governance.inferred_owner.is_some());

    let pack = build_decision_pack(&decision, &governance, &tenant, None);

    assert!(!pack.missing_items.contains(&"Missing owner".to_string()));
}

#[test]
fn coverage_gap_action_references_the_first_risk() {
    let tenant = load_tenant("helios_industries");
    let mut decision = decision("Reorganize the internal documentation portal for faster onboarding");
    decision.goals = vec![goal("Faster onboarding")];
    decision.owners = vec![owner("Engineering Manager", None)];
    decision.risks = vec![risk(
        "Content loss during the migration window",
        Severity::Medium,
        None,
    )];
    decision.confidence = 0.8;
    let governance = evaluate_governance(&decision, &tenant, None);
    assert!(governance
        .flags
        .contains(&GovernanceFlag::GovernanceCoverageGap));

    let pack = build_decision_pack(&decision, &governance, &tenant, None);

    assert!(pack
        .recommended_next_actions
        .iter()
        .any(|action| action.contains("Content loss during the migration window")));
}

#[test]
fn deep_reasoner_next_actions_take_precedence() {
    let tenant = load_tenant("helios_industries");
    let decision = acquisition_decision();
    let governance = evaluate_governance(&decision, &tenant, None);
    let reasoning = deep_reasoning(
        vec!["Obtain CFO approval with the acquisition cost-benefit memo attached"],
        Vec::new(),
    );

    let pack = build_decision_pack(&decision, &governance, &tenant, Some(&reasoning));

    assert_eq!(
        pack.recommended_next_actions,
        vec!["Obtain CFO approval with the acquisition cost-benefit memo attached".to_string()]
    );
    assert!(pack.summary.graph_analysis_enabled);
    assert!(pack.graph_reasoning.is_some());
}

#[test]
fn strategic_conflicts_set_misalignment_flag_and_goal_mapping() {
    let tenant = load_tenant("helios_industries");
    let decision = acquisition_decision();
    let governance = evaluate_governance(&decision, &tenant, None);
    let reasoning = deep_reasoning(
        Vec::new(),
        vec![GoalConflict {
            goal_id: "G3".to_string(),
            goal_name: Some("Operating cost efficiency".to_string()),
            conflict_type: Some("cost_contradiction".to_string()),
            severity: Severity::High,
            description: "A $3.5M outlay conflicts with the operating cost reduction target"
                .to_string(),
            recommendation: None,
        }],
    );

    let pack = build_decision_pack(&decision, &governance, &tenant, Some(&reasoning));

    assert!(pack
        .audit
        .flags
        .contains(&GovernanceFlag::StrategicMisalignment));
    let mapped = pack
        .goals_kpis
        .strategic_goals
        .iter()
        .find(|goal| goal.goal_id == "G3")
        .expect("conflicted goal should be mapped");
    assert_eq!(mapped.status, GoalAlignment::Conflict);
    assert_eq!(mapped.name, "Operating cost efficiency");
}

#[test]
fn high_confidence_inferred_owners_join_the_owner_list() {
    let tenant = load_tenant("helios_industries");
    let mut decision = decision("Modernize the component supply forecasting models this quarter");
    decision.risks = vec![risk("Model drift", Severity::Medium, Some("Monthly review"))];
    let governance = evaluate_governance(&decision, &tenant, None);

    let mut reasoning = deep_reasoning(Vec::new(), Vec::new());
    reasoning.inferred_owners = vec![
        ReasonerOwner {
            person_id: "vp_eng_001".to_string(),
            name: "Alice Nguyen".to_string(),
            role: "VP of Engineering".to_string(),
            confidence: OwnerConfidence::High,
            reasoning: None,
        },
        ReasonerOwner {
            person_id: "eng_mgr_001".to_string(),
            name: "Tom Becker".to_string(),
            role: "Engineering Manager".to_string(),
            confidence: OwnerConfidence::Low,
            reasoning: None,
        },
    ];

    let pack = build_decision_pack(&decision, &governance, &tenant, Some(&reasoning));

    assert!(pack.owners.iter().any(|owner| owner.name == "Alice Nguyen"));
    assert!(!pack.owners.iter().any(|owner| owner.name == "Tom Becker"));
}

#[test]
fn audit_block_carries_rationales_and_score() {
    let tenant = load_tenant("helios_industries");
    let decision = acquisition_decision();
    let governance = evaluate_governance(&decision, &tenant, None);

    let pack = build_decision_pack(&decision, &governance, &tenant, None);

    assert_eq!(pack.audit.computed_risk_score, governance.computed_risk_score);
    assert!(!pack.audit.rationales.is_empty());
    assert_eq!(
        pack.audit.triggered_rules.len(),
        governance.triggered_rules.len()
    );
    assert_eq!(pack.approval_chain.len(), governance.approval_chain.len());
}

mod common;

use common::*;
use decision_governance_models::{
    ApprovalLevel, GovernanceFlag, GovernanceStatus, RuleAction, Severity, StrategicImpact,
};
use decision_service::services::governance::evaluate_governance;

#[test]
fn compliant_small_decision_passes_cleanly() {
    let tenant = load_tenant("helios_industries");
    let decision = compliant_tooling_decision();

    let outcome = evaluate_governance(&decision, &tenant, None);

    assert_eq!(outcome.status, GovernanceStatus::Compliant);
    assert!(outcome.approval_chain.is_empty());
    assert!(outcome.flags.is_empty());
    assert!(!outcome.requires_human_review);
    // The routine-logging rule still records the decision
    assert!(outcome.triggered_rules.iter().any(|r| r.rule_id == "R10"));
}

#[test]
fn budget_violation_escalates_to_finance() {
    let tenant = load_tenant("helios_industries");
    let decision = acquisition_decision();

    let outcome = evaluate_governance(&decision, &tenant, None);

    assert!(outcome
        .flags
        .contains(&GovernanceFlag::FinancialThresholdExceeded));
    assert!(outcome.flags.contains(&GovernanceFlag::HighRisk));

    let cfo = outcome
        .approval_chain
        .iter()
        .find(|step| step.role == "CFO")
        .expect("CFO should be in the approval chain");
    assert_eq!(cfo.level, ApprovalLevel::CLevel);
    assert_eq!(cfo.level.numeric(), 4);
    assert_eq!(cfo.source_rule_id.as_deref(), Some("R1"));

    // R2 carries critical severity, which blocks via CRITICAL_CONFLICT
    assert!(matches!(
        outcome.status,
        GovernanceStatus::ReviewRequired | GovernanceStatus::Blocked
    ));
    assert!(outcome.requires_human_review);
}

#[test]
fn privacy_decision_requires_review() {
    let tenant = load_tenant("helios_industries");
    let mut decision = decision(
        "Implement user behavior tracking across the product using customer personal data under GDPR",
    );
    decision.uses_pii = Some(true);
    decision.risks = vec![risk(
        "Regulatory exposure under GDPR",
        Severity::High,
        Some("Data protection impact assessment"),
    )];

    let outcome = evaluate_governance(&decision, &tenant, None);

    assert!(outcome
        .flags
        .contains(&GovernanceFlag::PrivacyReviewRequired));
    assert!(outcome.requires_human_review);
    let dpo = outcome
        .approval_chain
        .iter()
        .find(|step| step.role == "Data Protection Officer")
        .expect("DPO review gate expected");
    assert_eq!(dpo.rule_action, Some(RuleAction::RequireReview));
}

#[test]
fn critical_overload_is_blocked() {
    let tenant = load_tenant("helios_industries");
    let mut decision = decision("Launch new product in 2 weeks without QA to beat a competitor");
    decision.goals = (0..8).map(|i| goal(&format!("goal {i}"))).collect();
    decision.kpis = (0..7).map(|i| kpi(&format!("kpi {i}"))).collect();
    decision.risks = (0..4)
        .map(|i| risk(&format!("critical failure mode {i}"), Severity::Critical, None))
        .collect();
    decision.confidence = 0.15;
    decision.strategic_impact = Some(StrategicImpact::Critical);
    decision.launch_date = Some(true);

    let outcome = evaluate_governance(&decision, &tenant, None);

    assert!(outcome.flags.contains(&GovernanceFlag::CriticalConflict));
    assert!(outcome.flags.contains(&GovernanceFlag::StrategicCritical));
    assert_eq!(outcome.status, GovernanceStatus::Blocked);
}

#[test]
fn coverage_gap_fires_for_substantive_unmatched_decision() {
    let tenant = load_tenant("helios_industries");
    let mut decision = decision("Reorganize the internal documentation portal for faster onboarding");
    decision.goals = vec![goal("Faster onboarding for new engineers")];
    decision.risks = vec![risk(
        "Content loss during the migration",
        Severity::Medium,
        None,
    )];
    decision.owners = vec![owner("Engineering Manager", Some("Engineering Manager"))];
    decision.confidence = 0.8;

    let outcome = evaluate_governance(&decision, &tenant, None);

    assert!(outcome.triggered_rules.is_empty());
    assert!(outcome
        .flags
        .contains(&GovernanceFlag::GovernanceCoverageGap));
    assert_eq!(outcome.status, GovernanceStatus::ReviewRequired);
}

#[test]
fn coverage_gap_respects_confidence_floor() {
    let tenant = load_tenant("helios_industries");
    let mut decision = decision("Reorganize the internal documentation portal for faster onboarding");
    decision.goals = vec![goal("Faster onboarding")];
    decision.owners = vec![owner("Engineering Manager", None)];
    decision.confidence = 0.3;

    let outcome = evaluate_governance(&decision, &tenant, None);
    assert!(!outcome
        .flags
        .contains(&GovernanceFlag::GovernanceCoverageGap));
}

#[test]
fn owner_is_inferred_from_lowest_level_approver() {
    let tenant = load_tenant("helios_industries");
    let mut decision = decision("Purchase a production line monitoring system for the Tacoma plant");
    decision.cost = Some(60_000.0);
    decision.risks = vec![risk("Vendor lock-in", Severity::Medium, Some("Exit clause"))];

    let outcome = evaluate_governance(&decision, &tenant, None);

    // R1 puts the CFO in the chain; the CFO's direct report operates the work
    let inferred = outcome.inferred_owner.expect("owner should be inferred");
    assert_eq!(inferred.person_id, "fin_mgr_001");
    assert_eq!(inferred.role, "Finance Manager");
    assert!(!outcome.flags.contains(&GovernanceFlag::MissingOwner));
}

#[test]
fn missing_owner_flag_only_when_inference_fails() {
    let tenant = load_tenant("helios_industries");
    let mut decision = decision("Draft a proposal for the annual engineering offsite agenda");
    decision.confidence = 0.9;
    decision.risks = vec![risk("Low attendance", Severity::Low, None)];

    let outcome = evaluate_governance(&decision, &tenant, None);

    // No rule adds an approver, so there is no chain to infer from
    assert!(outcome.approval_chain.is_empty());
    assert!(outcome.inferred_owner.is_none());
    assert!(outcome.flags.contains(&GovernanceFlag::MissingOwner));
}

#[test]
fn triggered_approval_rules_are_linked_into_the_chain() {
    let tenant = load_tenant("helios_industries");
    let decision = acquisition_decision();

    let outcome = evaluate_governance(&decision, &tenant, None);

    for rule in &outcome.triggered_rules {
        let full_rule = tenant
            .governance_rules
            .iter()
            .find(|r| r.rule_id == rule.rule_id)
            .unwrap();
        if full_rule.consequence.action.adds_approver()
            && !full_rule.consequence.approver_ids.is_empty()
        {
            assert!(
                outcome
                    .approval_chain
                    .iter()
                    .any(|step| step.source_rule_id.as_deref() == Some(rule.rule_id.as_str())),
                "rule {} should have a chain step",
                rule.rule_id
            );
        }
    }
}

#[test]
fn approver_ids_are_unique_and_severity_escalates() {
    let tenant = load_tenant("helios_industries");
    let mut decision = decision("Acquire and integrate a robotics startup while doubling the automation team");
    decision.cost = Some(2_000_000.0);
    decision.strategic_impact = Some(StrategicImpact::Critical);
    decision.headcount_change = Some(12);
    decision.involves_hiring = Some(true);
    decision.risks = vec![risk("Integration failure", Severity::High, None)];
    decision.owners = vec![owner("CTO", Some("CTO"))];

    let outcome = evaluate_governance(&decision, &tenant, None);

    // R1 (CFO), R2 (CEO, critical), R6 (CEO again), R7 (HR Director + CEO again)
    let mut ids: Vec<&str> = outcome
        .approval_chain
        .iter()
        .filter_map(|step| step.approver_id.as_deref())
        .collect();
    let total = ids.len();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), total, "approver ids must be unique");

    let ceo = outcome
        .approval_chain
        .iter()
        .find(|step| step.approver_id.as_deref() == Some("ceo_001"))
        .unwrap();
    // First trigger (R2) wins the rationale; severity never de-escalates
    assert_eq!(ceo.source_rule_id.as_deref(), Some("R2"));
    assert_eq!(ceo.severity, Severity::Critical);
}

#[test]
fn goal_mapping_rules_never_add_an_approver() {
    let tenant = load_tenant("harbor_gsa");
    let mut decision = decision("Consolidate all agency data centers into a single facility");
    decision.strategic_impact = Some(StrategicImpact::Critical);
    decision.owners = vec![owner("IT Director", Some("IT Director"))];
    decision.risks = vec![risk("Service outage during moves", Severity::High, None)];

    let outcome = evaluate_governance(&decision, &tenant, None);

    assert!(outcome.triggered_rules.iter().any(|r| r.rule_id == "P5"));
    // P5 (goal mapping) contributes no approver; P6 adds the director
    assert!(outcome
        .approval_chain
        .iter()
        .all(|step| step.source_rule_id.as_deref() != Some("P5")));
    assert!(outcome
        .approval_chain
        .iter()
        .any(|step| step.source_rule_id.as_deref() == Some("P6")));
}

#[test]
fn risk_score_stays_in_bounds() {
    let tenant = load_tenant("helios_industries");

    for count in 0..6 {
        let mut decision = decision("Stress the scoring path with a pile of severe risks");
        decision.owners = vec![owner("CTO", Some("CTO"))];
        decision.risks = (0..count)
            .map(|i| risk(&format!("risk {i}"), Severity::Critical, None))
            .collect();
        let outcome = evaluate_governance(&decision, &tenant, None);
        assert!(outcome.computed_risk_score >= 0.0);
        assert!(outcome.computed_risk_score <= 10.0);
    }
}

// Boundary behaviors

#[test]
fn cost_at_threshold_separates_gt_from_gte_rules() {
    let tenant = load_tenant("helios_industries");
    let mut decision = decision("Procure a batch of calibrated sensors for the assembly line");
    decision.cost = Some(1_000_000.0);
    decision.risks = vec![risk("Supplier delay", Severity::Low, Some("Second source"))];
    decision.owners = vec![owner("Finance Manager", Some("Finance Manager"))];

    let outcome = evaluate_governance(&decision, &tenant, None);

    // R1 is >= 50_000 (fires), R2 is > 1_000_000 (does not fire at equality)
    assert!(outcome.triggered_rules.iter().any(|r| r.rule_id == "R1"));
    assert!(!outcome.triggered_rules.iter().any(|r| r.rule_id == "R2"));
}

#[test]
fn confidence_boundary_at_point_seven() {
    let tenant = load_tenant("helios_industries");

    let mut at = compliant_tooling_decision();
    at.confidence = 0.7;
    let outcome = evaluate_governance(&at, &tenant, None);
    assert!(!outcome.requires_human_review);

    let mut below = compliant_tooling_decision();
    below.confidence = 0.69;
    let outcome = evaluate_governance(&below, &tenant, None);
    assert!(outcome.requires_human_review);
}

#[test]
fn risk_score_boundary_at_seven() {
    let tenant = load_tenant("helios_industries");

    let mut high = compliant_tooling_decision();
    high.risk_score = Some(7.0);
    let outcome = evaluate_governance(&high, &tenant, None);
    assert!(outcome.flags.contains(&GovernanceFlag::HighRisk));

    let mut below = compliant_tooling_decision();
    below.risk_score = Some(6.9);
    let outcome = evaluate_governance(&below, &tenant, None);
    assert!(!outcome.flags.contains(&GovernanceFlag::HighRisk));
}

#[test]
fn kpi_count_boundary_at_five() {
    let tenant = load_tenant("helios_industries");

    let mut five = compliant_tooling_decision();
    five.kpis = (0..5).map(|i| kpi(&format!("kpi {i}"))).collect();
    let outcome = evaluate_governance(&five, &tenant, None);
    assert!(!outcome.flags.contains(&GovernanceFlag::CriticalConflict));

    let mut six = compliant_tooling_decision();
    six.kpis = (0..6).map(|i| kpi(&format!("kpi {i}"))).collect();
    let outcome = evaluate_governance(&six, &tenant, None);
    assert!(outcome.flags.contains(&GovernanceFlag::CriticalConflict));
}

#[test]
fn or_condition_triggers_on_any_branch() {
    let tenant = load_tenant("helios_industries");

    let mut related = decision("Award the maintenance contract to a subsidiary of our parent group");
    related.counterparty_relation =
        Some(decision_governance_models::CounterpartyRelation::RelatedParty);
    related.owners = vec![owner("Chief Compliance Officer", None)];
    related.risks = vec![risk("Conflict of interest", Severity::High, None)];
    let outcome = evaluate_governance(&related, &tenant, None);
    assert!(outcome.triggered_rules.iter().any(|r| r.rule_id == "R4"));

    let mut ethics = decision("Approve client entertainment above the corporate gift policy cap");
    ethics.involves_compliance_risk = Some(true);
    ethics.owners = vec![owner("Marketing Director", None)];
    ethics.risks = vec![risk("Anti-bribery exposure", Severity::Critical, None)];
    let outcome = evaluate_governance(&ethics, &tenant, None);
    assert!(outcome.triggered_rules.iter().any(|r| r.rule_id == "R4"));
}

#[test]
fn contains_operator_matches_eu_market() {
    let tenant = load_tenant("helios_industries");
    let mut decision = decision("Expand the telemetry product into EU manufacturing accounts");
    decision.target_market = Some("EU (Germany, France)".to_string());
    decision.owners = vec![owner("Marketing Director", None)];
    decision.risks = vec![risk("Localization gaps", Severity::Medium, Some("Local partner"))];

    let outcome = evaluate_governance(&decision, &tenant, None);
    assert!(outcome.triggered_rules.iter().any(|r| r.rule_id == "R9"));
}

#[test]
fn optimized_chain_replaces_order_but_keeps_severity_and_rules() {
    let tenant = load_tenant("helios_industries");
    let decision = acquisition_decision();
    let outcome = evaluate_governance(&decision, &tenant, None);
    assert!(outcome.approval_chain.len() >= 2);

    let optimization = decision_service::services::deep_reasoner::parse_chain_optimization(
        r#"{
            "optimized_approval_chain": [
                {"approver_role": "CEO", "approver_id": "ceo_001", "level": 4, "sequence_order": 2},
                {"approver_role": "CFO", "approver_id": "cfo_001", "level": 4, "sequence_order": 1}
            ]
        }"#,
    )
    .unwrap();

    let chain = decision_service::services::governance::apply_optimized_chain(
        &outcome.approval_chain,
        &optimization,
        &tenant,
    )
    .expect("non-empty optimization should replace the chain");

    assert_eq!(chain[0].role, "CFO");
    assert_eq!(chain[1].role, "CEO");
    // Severity and source rule carry over from the deterministic steps
    assert_eq!(chain[1].severity, Severity::Critical);
    assert_eq!(chain[1].source_rule_id.as_deref(), Some("R2"));
    assert_eq!(chain[0].source_rule_id.as_deref(), Some("R1"));
}

#[test]
fn empty_optimization_keeps_the_deterministic_chain() {
    let tenant = load_tenant("helios_industries");
    let decision = acquisition_decision();
    let outcome = evaluate_governance(&decision, &tenant, None);

    let optimization =
        decision_service::services::deep_reasoner::ChainOptimization::default();
    assert!(decision_service::services::governance::apply_optimized_chain(
        &outcome.approval_chain,
        &optimization,
        &tenant,
    )
    .is_none());
}

#[test]
fn extracted_risk_score_is_respected_over_recomputation() {
    let tenant = load_tenant("helios_industries");
    let mut decision = compliant_tooling_decision();
    decision.risk_score = Some(2.5);
    decision.risks = vec![risk("irrelevant", Severity::Critical, None)];

    let outcome = evaluate_governance(&decision, &tenant, None);
    assert_eq!(outcome.computed_risk_score, 2.5);
}

use serde_json::{json, Value};
use tracing::{debug, info};

use decision_governance_models::{
    ApprovalChainStep, ApprovalLevel, Condition, ConditionOperator, Decision, GovernanceFlag,
    GovernanceOutcome, GovernanceStatus, InferredOwner, RuleCondition, RuleType, Severity,
    StrategicImpact, TenantContext, TriggeredRule,
};

/// Evaluate a decision against a tenant's rule base.
///
/// Pure function over the decision and tenant context: same input, same
/// output. The optional `tenant_raw` document supplies field overrides for
/// rule conditions that reference tenant-level values.
pub fn evaluate_governance(
    decision: &Decision,
    tenant: &TenantContext,
    tenant_raw: Option<&Value>,
) -> GovernanceOutcome {
    let computed_risk_score = compute_risk_score(decision);

    let (approval_chain, triggered_rules) =
        select_approval_chain(decision, tenant, tenant_raw);

    let inferred_owner = if decision.owners.is_empty() {
        infer_owner_from_chain(&approval_chain, tenant)
    } else {
        None
    };

    let flags = detect_flags(
        decision,
        computed_risk_score,
        &triggered_rules,
        inferred_owner.is_some(),
    );

    let compliance_triggered = triggered_rules
        .iter()
        .any(|rule| rule.rule_type.forces_review());

    let requires_human_review = !flags.is_empty()
        || !approval_chain.is_empty()
        || compliance_triggered
        || computed_risk_score >= 7.0
        || matches!(
            decision.strategic_impact,
            Some(StrategicImpact::High) | Some(StrategicImpact::Critical)
        )
        || decision.confidence < 0.7;

    let status = determine_status(&flags, &approval_chain, computed_risk_score);

    info!(
        triggered = triggered_rules.len(),
        flags = flags.len(),
        chain = approval_chain.len(),
        risk_score = computed_risk_score,
        status = status.as_str(),
        "governance evaluation complete"
    );

    GovernanceOutcome {
        approval_chain,
        flags,
        requires_human_review,
        triggered_rules,
        computed_risk_score,
        status,
        inferred_owner,
    }
}

/// Risk score: use the extracted score when present, otherwise sum severity
/// weights over risks and clamp to 10.
pub fn compute_risk_score(decision: &Decision) -> f64 {
    if let Some(score) = decision.risk_score {
        return score;
    }
    if decision.risks.is_empty() {
        return 0.0;
    }
    let total: f64 = decision
        .risks
        .iter()
        .map(|risk| risk.severity.unwrap_or(Severity::Medium).weight())
        .sum();
    (total.min(10.0) * 10.0).round() / 10.0
}

/// Resolve a condition field against the decision, falling back to a
/// top-level key of the raw tenant document. Unknown fields are null —
/// governance-relevant facts are fields on the decision, never re-parsed
/// from text at this layer.
fn extract_field_value(field: &str, decision: &Decision, tenant_raw: Option<&Value>) -> Value {
    let from_decision = match field {
        "statement" => Some(json!(decision.statement)),
        "confidence" => Some(json!(decision.confidence)),
        "cost" => decision.cost.map(|v| json!(v)),
        "cost_estimate_range" => decision.cost_estimate_range.as_ref().map(|v| json!(v)),
        "uses_pii" => decision.uses_pii.map(|v| json!(v)),
        "target_market" => decision.target_market.as_ref().map(|v| json!(v)),
        "launch_date" => decision.launch_date.map(|v| json!(v)),
        "involves_hiring" => decision.involves_hiring.map(|v| json!(v)),
        "headcount_change" => decision.headcount_change.map(|v| json!(v)),
        "involves_compliance_risk" => decision.involves_compliance_risk.map(|v| json!(v)),
        "counterparty_relation" => decision
            .counterparty_relation
            .as_ref()
            .map(|v| serde_json::to_value(v).unwrap_or(Value::Null)),
        "policy_change_type" => decision
            .policy_change_type
            .as_ref()
            .map(|v| serde_json::to_value(v).unwrap_or(Value::Null)),
        "strategic_impact" => decision.strategic_impact.map(|v| json!(v.as_str())),
        "risk_score" => decision.risk_score.map(|v| json!(v)),
        _ => None,
    };

    if let Some(value) = from_decision {
        return value;
    }

    if let Some(raw) = tenant_raw {
        if let Some(value) = raw.get(field) {
            return value.clone();
        }
    }

    Value::Null
}

/// Number-aware equality: integers and floats representing the same value
/// compare equal, everything else falls back to structural equality.
fn values_equal(left: &Value, right: &Value) -> bool {
    match (left.as_f64(), right.as_f64()) {
        (Some(a), Some(b)) => a == b,
        _ => left == right,
    }
}

fn evaluate_single_condition(
    condition: &Condition,
    decision: &Decision,
    tenant_raw: Option<&Value>,
) -> bool {
    let actual = extract_field_value(&condition.field, decision, tenant_raw);
    let expected = &condition.value;

    let result = match condition.operator {
        ConditionOperator::GreaterThan => match (actual.as_f64(), expected.as_f64()) {
            (Some(a), Some(b)) => a > b,
            _ => false,
        },
        ConditionOperator::GreaterOrEqual => match (actual.as_f64(), expected.as_f64()) {
            (Some(a), Some(b)) => a >= b,
            _ => false,
        },
        ConditionOperator::LessThan => match (actual.as_f64(), expected.as_f64()) {
            (Some(a), Some(b)) => a < b,
            _ => false,
        },
        ConditionOperator::LessOrEqual => match (actual.as_f64(), expected.as_f64()) {
            (Some(a), Some(b)) => a <= b,
            _ => false,
        },
        ConditionOperator::Equal => values_equal(&actual, expected),
        ConditionOperator::NotEqual => !values_equal(&actual, expected),
        ConditionOperator::Contains => match actual.as_str() {
            Some(haystack) => {
                let needle = match expected.as_str() {
                    Some(s) => s.to_lowercase(),
                    None => expected.to_string().to_lowercase(),
                };
                haystack.to_lowercase().contains(&needle)
            }
            None => false,
        },
        ConditionOperator::OverlapsWith => actual == Value::Bool(true),
    };

    debug!(field = %condition.field, operator = ?condition.operator, result, "condition evaluated");
    result
}

pub fn evaluate_rule_condition(
    condition: &RuleCondition,
    decision: &Decision,
    tenant_raw: Option<&Value>,
) -> bool {
    match condition {
        RuleCondition::Single(single) => {
            evaluate_single_condition(single, decision, tenant_raw)
        }
        RuleCondition::Any(or) => or
            .conditions
            .iter()
            .any(|c| evaluate_single_condition(c, decision, tenant_raw)),
    }
}

/// Walk active rules in declared order; collect triggered rules and build
/// the deduplicated approval chain.
///
/// Dedup contract: an approver id appears at most once; the first
/// triggering rule wins on rationale and source rule; severity escalates
/// monotonically across duplicate triggers. `require_goal_mapping` records
/// the rule without adding an approver.
fn select_approval_chain(
    decision: &Decision,
    tenant: &TenantContext,
    tenant_raw: Option<&Value>,
) -> (Vec<ApprovalChainStep>, Vec<TriggeredRule>) {
    let mut triggered_rules = Vec::new();
    let mut chain: Vec<ApprovalChainStep> = Vec::new();

    for rule in tenant.active_rules() {
        if !evaluate_rule_condition(&rule.condition, decision, tenant_raw) {
            continue;
        }

        info!(rule_id = %rule.rule_id, name = %rule.name, "rule triggered");
        triggered_rules.push(TriggeredRule {
            rule_id: rule.rule_id.clone(),
            name: rule.name.clone(),
            description: rule.description.clone(),
            rule_type: rule.rule_type.clone(),
            severity: rule.consequence.severity,
        });

        if !rule.consequence.action.adds_approver() {
            continue;
        }

        for (role, approver_id) in rule
            .consequence
            .approver_roles
            .iter()
            .zip(rule.consequence.approver_ids.iter())
        {
            if approver_id.is_empty() {
                continue;
            }
            if let Some(existing) = chain
                .iter_mut()
                .find(|step| step.approver_id.as_deref() == Some(approver_id.as_str()))
            {
                existing.severity = existing.severity.max(rule.consequence.severity);
                continue;
            }

            let level = tenant
                .approval_hierarchy
                .find_by_id(approver_id)
                .map(|person| person.level)
                .unwrap_or(1);

            chain.push(ApprovalChainStep {
                level: ApprovalLevel::from_numeric(level),
                role: role.clone(),
                approver_id: Some(approver_id.clone()),
                required: true,
                rationale: Some(rule.description.clone()),
                source_rule_id: Some(rule.rule_id.clone()),
                rule_action: Some(rule.consequence.action),
                severity: rule.consequence.severity,
            });
        }
    }

    (chain, triggered_rules)
}

/// Ownership is not approval. The inferred owner is the operator closest
/// to the work: a direct report of the lowest-level approver, or the
/// approver themselves when they have none.
pub fn infer_owner_from_chain(
    chain: &[ApprovalChainStep],
    tenant: &TenantContext,
) -> Option<InferredOwner> {
    let hierarchy = &tenant.approval_hierarchy;

    let lowest = chain
        .iter()
        .filter_map(|step| {
            step.approver_id
                .as_deref()
                .and_then(|id| hierarchy.find_by_id(id))
                .or_else(|| hierarchy.find_by_role(&step.role))
        })
        .min_by_key(|person| person.level)?;

    let owner = hierarchy
        .direct_reports(&lowest.id)
        .into_iter()
        .next()
        .unwrap_or(lowest);

    Some(InferredOwner {
        person_id: owner.id.clone(),
        name: owner.name.clone(),
        role: owner.role.clone(),
        level: owner.level,
    })
}

fn detect_flags(
    decision: &Decision,
    risk_score: f64,
    triggered_rules: &[TriggeredRule],
    owner_inferred: bool,
) -> Vec<GovernanceFlag> {
    let mut flags = Vec::new();

    // Structural flags
    if decision.owners.is_empty() && !owner_inferred {
        flags.push(GovernanceFlag::MissingOwner);
    }
    if decision.risks.is_empty() {
        flags.push(GovernanceFlag::MissingRiskAssessment);
    }
    if risk_score >= 7.0 {
        flags.push(GovernanceFlag::HighRisk);
    }
    if decision.strategic_impact == Some(StrategicImpact::Critical) {
        flags.push(GovernanceFlag::StrategicCritical);
    }

    let critical_rule = triggered_rules
        .iter()
        .any(|rule| rule.severity == Severity::Critical);
    if critical_rule || decision.kpis.len() > 5 || decision.goals.len() > 5 {
        flags.push(GovernanceFlag::CriticalConflict);
    }

    // Rule-type flags
    if triggered_rules
        .iter()
        .any(|rule| rule.rule_type == RuleType::Privacy)
    {
        flags.push(GovernanceFlag::PrivacyReviewRequired);
    }
    if triggered_rules
        .iter()
        .any(|rule| rule.rule_type == RuleType::Financial)
    {
        flags.push(GovernanceFlag::FinancialThresholdExceeded);
    }
    if triggered_rules
        .iter()
        .any(|rule| rule.rule_type == RuleType::Strategic)
        && !flags.contains(&GovernanceFlag::StrategicCritical)
    {
        flags.push(GovernanceFlag::StrategicCritical);
    }

    // No rules matched but the decision has substance: the rule base does
    // not cover this decision type.
    if triggered_rules.is_empty() {
        let has_content = !decision.goals.is_empty()
            || !decision.kpis.is_empty()
            || !decision.risks.is_empty();
        if has_content && decision.confidence > 0.3 {
            flags.push(GovernanceFlag::GovernanceCoverageGap);
        }
    }

    flags
}

/// Convert an analyzer-optimized chain back into typed steps.
///
/// Returns `None` when the optimizer produced nothing, so the caller keeps
/// the deterministic chain. Severity is carried over from the matching
/// deterministic step (the optimizer reorders and merges, it never raises
/// or lowers severity).
pub fn apply_optimized_chain(
    chain: &[ApprovalChainStep],
    optimization: &super::deep_reasoner::ChainOptimization,
    tenant: &TenantContext,
) -> Option<Vec<ApprovalChainStep>> {
    if optimization.optimized_approval_chain.is_empty() {
        return None;
    }

    let mut steps: Vec<_> = optimization.optimized_approval_chain.iter().collect();
    steps.sort_by_key(|step| step.sequence_order.unwrap_or(u32::MAX));

    let converted = steps
        .into_iter()
        .map(|step| {
            let person = step
                .approver_id
                .as_deref()
                .and_then(|id| tenant.approval_hierarchy.find_by_id(id))
                .or_else(|| tenant.approval_hierarchy.find_by_role(&step.approver_role));

            let existing = chain.iter().find(|candidate| {
                candidate.approver_id.as_deref() == step.approver_id.as_deref()
                    || candidate.role.eq_ignore_ascii_case(&step.approver_role)
            });

            let level = step
                .level
                .or_else(|| person.map(|p| p.level))
                .unwrap_or(1);

            ApprovalChainStep {
                level: ApprovalLevel::from_numeric(level),
                role: step.approver_role.clone(),
                approver_id: step
                    .approver_id
                    .clone()
                    .or_else(|| person.map(|p| p.id.clone())),
                required: true,
                rationale: step
                    .rationale
                    .clone()
                    .or_else(|| existing.and_then(|e| e.rationale.clone())),
                source_rule_id: existing.and_then(|e| e.source_rule_id.clone()),
                rule_action: existing.and_then(|e| e.rule_action),
                severity: existing.map(|e| e.severity).unwrap_or(Severity::Medium),
            }
        })
        .collect();

    Some(converted)
}

fn determine_status(
    flags: &[GovernanceFlag],
    chain: &[ApprovalChainStep],
    risk_score: f64,
) -> GovernanceStatus {
    if flags.iter().any(|flag| flag.is_critical()) {
        return GovernanceStatus::Blocked;
    }
    if !chain.is_empty() || !flags.is_empty() || risk_score >= 4.0 {
        return GovernanceStatus::ReviewRequired;
    }
    GovernanceStatus::Compliant
}

use std::collections::HashSet;

use tracing::debug;

use decision_governance_common::utils::truncate_with_ellipsis;
use decision_governance_models::{
    AuditBlock, Decision, DecisionPack, GoalAlignment, GoalsKpis, GovernanceFlag,
    GovernanceOutcome, GovernanceStatus, GraphContextSummary, GraphReasoningBlock,
    MappedStrategicGoal, Owner, OwnerConfidence, PackApprovalStep, PackSummary,
    ReasoningOutcome, RiskLevel, RuleAction, RuleType, StrategicImpact, TenantContext,
    TriggeredRule,
};

/// Assemble the locked console artifact from the pipeline outputs.
///
/// Template-based and deterministic: no freeform text generation. The
/// reasoner, when it ran in deep mode, may contribute next actions and
/// strategic-goal conflict annotations.
pub fn build_decision_pack(
    decision: &Decision,
    governance: &GovernanceOutcome,
    tenant: &TenantContext,
    reasoning: Option<&ReasoningOutcome>,
) -> DecisionPack {
    let mut flags = governance.flags.clone();
    let mut owners: Vec<Owner> = decision.owners.clone();

    if let Some(reasoning) = reasoning {
        // High-confidence inferred owners join the owner list.
        for inferred in &reasoning.inferred_owners {
            if inferred.confidence == OwnerConfidence::High {
                owners.push(Owner {
                    name: inferred.name.clone(),
                    role: Some(inferred.role.clone()),
                    responsibility: None,
                });
            }
        }
        if !reasoning.strategic_goal_conflicts.is_empty()
            && !flags.contains(&GovernanceFlag::StrategicMisalignment)
        {
            flags.push(GovernanceFlag::StrategicMisalignment);
        }
    }

    let missing_items = detect_missing_items(decision, governance);
    let risk_level = determine_risk_level(governance);

    let next_actions = match reasoning {
        Some(r) if r.analysis_method == decision_governance_models::AnalysisMethod::Deep
            && !r.next_actions.is_empty() =>
        {
            r.next_actions.clone()
        }
        _ => generate_next_actions(decision, governance, &flags, &missing_items),
    };

    let rationales = extract_rationales(governance);
    let strategic_goals = map_strategic_goals(tenant, reasoning);
    let title = generate_title(&decision.statement, decision.strategic_impact);
    let conclusion_reason = summarize_conclusion(
        governance,
        risk_level,
        &missing_items,
        reasoning,
    );

    debug!(
        status = governance.status.as_str(),
        risk_level = risk_level.as_str(),
        next_actions = next_actions.len(),
        "decision pack assembled"
    );

    DecisionPack {
        title,
        summary: PackSummary {
            statement: decision.statement.clone(),
            human_approval_required: governance.requires_human_review,
            risk_level,
            governance_status: governance.status,
            confidence_score: decision.confidence,
            strategic_impact: decision
                .strategic_impact
                .map(|impact| impact.as_str().to_string())
                .unwrap_or_else(|| "not_specified".to_string()),
            graph_analysis_enabled: reasoning.is_some(),
            conclusion_reason,
        },
        goals_kpis: GoalsKpis {
            strategic_goals,
            decision_objectives: decision.goals.clone(),
            kpis: decision.kpis.clone(),
        },
        risks: decision.risks.clone(),
        owners,
        assumptions: decision.assumptions.clone(),
        missing_items,
        approval_chain: governance
            .approval_chain
            .iter()
            .map(|step| PackApprovalStep {
                level: step.level,
                role: step.role.clone(),
                required: step.required,
                rationale: step.rationale.clone(),
                source_rule_id: step.source_rule_id.clone(),
                rule_action: step.rule_action,
            })
            .collect(),
        recommended_next_actions: next_actions,
        audit: AuditBlock {
            flags,
            triggered_rules: governance.triggered_rules.clone(),
            rationales,
            computed_risk_score: governance.computed_risk_score,
        },
        graph_reasoning: reasoning.map(build_graph_reasoning_block),
    }
}

/// Missing items come from structural checks only; flag names are never
/// parsed back into items. KPIs and goals are only expected for
/// high/critical strategic impact — flagging operational decisions for
/// missing measurables adds noise.
fn detect_missing_items(decision: &Decision, governance: &GovernanceOutcome) -> Vec<String> {
    let mut missing = Vec::new();

    if decision.owners.is_empty() && governance.inferred_owner.is_none() {
        missing.push("Missing owner".to_string());
    }

    let requires_measurables = decision
        .strategic_impact
        .map(|impact| impact.requires_measurables())
        .unwrap_or(false);
    if requires_measurables {
        if decision.kpis.is_empty() {
            missing.push("Missing KPI".to_string());
        }
        if decision.goals.is_empty() {
            missing.push("Missing goals".to_string());
        }
    }

    if decision.risks.is_empty() {
        missing.push("Missing risk".to_string());
    }

    missing
}

pub fn determine_risk_level(governance: &GovernanceOutcome) -> RiskLevel {
    if governance.flags.iter().any(|flag| flag.is_critical())
        || governance.computed_risk_score >= 7.0
    {
        return RiskLevel::High;
    }
    if governance.requires_human_review
        || !governance.flags.is_empty()
        || governance.computed_risk_score >= 4.0
    {
        return RiskLevel::Medium;
    }
    RiskLevel::Low
}

fn generate_title(statement: &str, strategic_impact: Option<StrategicImpact>) -> String {
    let truncated = truncate_with_ellipsis(statement, 80);
    match strategic_impact {
        Some(StrategicImpact::Critical) => format!("[CRITICAL] {truncated}"),
        Some(StrategicImpact::High) => format!("[HIGH] {truncated}"),
        _ => truncated,
    }
}

/// One-sentence human-readable "why" for the governance conclusion.
/// Cross-references triggered rules with the approval chain to express
/// conditional resolution paths, not just binary outcomes.
fn summarize_conclusion(
    governance: &GovernanceOutcome,
    risk_level: RiskLevel,
    missing_items: &[String],
    reasoning: Option<&ReasoningOutcome>,
) -> String {
    let required_approvers: Vec<&str> = governance
        .approval_chain
        .iter()
        .filter(|step| step.required)
        .map(|step| step.role.as_str())
        .collect();

    match governance.status {
        GovernanceStatus::Blocked => {
            let mut causes = Vec::new();
            let rule_names: Vec<&str> = governance
                .triggered_rules
                .iter()
                .map(|rule| rule.name.as_str())
                .collect();
            if !rule_names.is_empty() {
                causes.push(rule_names.join(", "));
            }

            let structural_gaps: Vec<&String> = missing_items
                .iter()
                .filter(|item| item.starts_with("Missing"))
                .collect();
            if !structural_gaps.is_empty() {
                let joined = structural_gaps
                    .iter()
                    .map(|item| item.to_lowercase())
                    .collect::<Vec<_>>()
                    .join("; ");
                causes.push(joined);
            }

            if let Some(reasoning) = reasoning {
                if !reasoning.contradictions.is_empty() {
                    causes.push(format!(
                        "{} logical contradiction(s)",
                        reasoning.contradictions.len()
                    ));
                }
            }

            let cause_str = if causes.is_empty() {
                "governance issues".to_string()
            } else {
                causes.join("; ")
            };

            if !required_approvers.is_empty() && structural_gaps.is_empty() {
                let approver_str = required_approvers.join(" and ");
                return format!("Blocked by {cause_str} - resolvable with {approver_str} approval.");
            }
            if !required_approvers.is_empty() {
                let approver_str = required_approvers.join(" and ");
                return format!(
                    "Blocked by {cause_str}. Resolve structural gaps first, then obtain {approver_str} approval."
                );
            }
            format!("Blocked by {cause_str}. No resolution path available - review decision structure.")
        }
        GovernanceStatus::ReviewRequired => {
            let rule_count = governance.triggered_rules.len();
            if required_approvers.is_empty() {
                format!(
                    "Requires human review - risk level is {} with {} rule(s) triggered.",
                    risk_level.as_str(),
                    rule_count
                )
            } else {
                format!(
                    "Requires human review - risk level is {} with {} rule(s) triggered. Proceed after {} approval.",
                    risk_level.as_str(),
                    rule_count,
                    required_approvers.join(", ")
                )
            }
        }
        GovernanceStatus::Compliant => {
            "Decision is compliant with governance rules. No blocking issues found.".to_string()
        }
    }
}

/// Context-aware recommended next actions, derived entirely from
/// governance data: chain steps get rule-type-specific guidance, missing
/// items get an "OR" alternative, and each terminal status has a fallback.
fn generate_next_actions(
    decision: &Decision,
    governance: &GovernanceOutcome,
    flags: &[GovernanceFlag],
    missing_items: &[String],
) -> Vec<String> {
    let mut actions: Vec<String> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut add = |action: String, actions: &mut Vec<String>| {
        if seen.insert(action.clone()) {
            actions.push(action);
        }
    };

    // Per-chain-step guidance
    for step in &governance.approval_chain {
        let rule = step
            .source_rule_id
            .as_deref()
            .and_then(|rule_id| {
                governance
                    .triggered_rules
                    .iter()
                    .find(|rule| rule.rule_id == rule_id)
            });
        let guidance = match step.rule_action {
            Some(RuleAction::RequireReview) => build_review_guidance(&step.role, rule, decision),
            _ => build_approval_guidance(&step.role, rule, decision),
        };
        add(guidance, &mut actions);
    }

    // Missing-item guidance with alternatives
    for item in missing_items {
        let line = match item.as_str() {
            "Missing owner" => {
                "Assign an accountable owner - name the responsible team lead or project lead, or add the executing role to the decision statement"
            }
            "Missing KPI" => {
                "Define measurable KPIs - include target values, deadlines, and measurement cadence, or link the decision to an existing strategic goal KPI"
            }
            "Missing goals" => {
                "Connect the decision to an organizational goal - link it to at least one of the company's strategic goals"
            }
            "Missing risk" => {
                "Add a risk assessment - list at least one failure vector with a mitigation, or state explicitly why no risk applies"
            }
            _ => continue,
        };
        add(line.to_string(), &mut actions);
    }

    // Coverage gap uses decision content for context
    if flags.contains(&GovernanceFlag::GovernanceCoverageGap) {
        let line = match decision.risks.first() {
            Some(risk) => {
                let snippet = truncate_with_ellipsis(&risk.description, 60);
                format!(
                    "No governance rule covers this decision - review it manually considering the '{snippet}' risk, or ask the governance team to add a rule for this decision type"
                )
            }
            None => {
                let snippet: String = decision.statement.chars().take(50).collect();
                format!(
                    "No governance rule covers decisions like '{snippet}' - consider adding a rule for this decision type, or request a manual compliance review"
                )
            }
        };
        add(line, &mut actions);
    }

    if flags.contains(&GovernanceFlag::CriticalConflict) {
        add(
            "Resolve the conflicting items inside the decision - reconcile contradictions across goals, KPIs, and risks, then resubmit".to_string(),
            &mut actions,
        );
    }

    // Terminal fallbacks
    if governance.status == GovernanceStatus::Blocked && actions.is_empty() {
        add(
            "Cannot proceed until the blocking causes are resolved - address the issues above and resubmit to the governance review team".to_string(),
            &mut actions,
        );
    }
    if governance.status == GovernanceStatus::ReviewRequired && actions.is_empty() {
        add(
            "Assign a reviewer and hand over the decision package".to_string(),
            &mut actions,
        );
    }
    if governance.status == GovernanceStatus::Compliant && actions.is_empty() {
        add(
            "All governance requirements are met - proceed to execution after a final review".to_string(),
            &mut actions,
        );
    }

    actions
}

/// Guidance for a review-type (escalation) approval step: what to prepare
/// and attach for this reviewer.
fn build_review_guidance(
    role: &str,
    rule: Option<&TriggeredRule>,
    decision: &Decision,
) -> String {
    let rule_type = rule.map(|r| &r.rule_type);
    match rule_type {
        Some(RuleType::Compliance) => match rule.map(|r| r.description.as_str()) {
            Some(rationale) => format!(
                "Obtain {role} review - prepare material on '{rationale}' and attach the policy basis and risk mitigation documentation"
            ),
            None => format!(
                "Obtain {role} review - attach compliance documentation (policy basis, risk mitigation plan)"
            ),
        },
        Some(RuleType::Hr) => match decision.headcount_change {
            Some(headcount) if headcount > 0 => format!(
                "Obtain {role} review - attach a workforce plan covering job descriptions, budget, and a hiring timeline for the {headcount} new positions"
            ),
            _ => format!("Obtain {role} review - attach the workforce plan and hiring requirements"),
        },
        Some(RuleType::Financial) => match decision.cost {
            Some(cost) => format!(
                "Obtain {role} review - attach the budget justification and cost-benefit analysis for the {} spend",
                format_cost(cost)
            ),
            None => format!("Obtain {role} review - attach the budget justification and cost-benefit analysis"),
        },
        _ => match rule.map(|r| r.description.as_str()) {
            Some(rationale) => format!("Obtain {role} review - {rationale}"),
            None => format!("Obtain {role} review"),
        },
    }
}

/// "Approve OR adjust" guidance for a hard approval step: where possible,
/// offer a concrete alternative path such as reducing below the threshold.
fn build_approval_guidance(
    role: &str,
    rule: Option<&TriggeredRule>,
    decision: &Decision,
) -> String {
    let rule_type = rule.map(|r| &r.rule_type);
    match rule_type {
        Some(RuleType::Financial) => match decision.cost {
            Some(cost) => format!(
                "Obtain {role} approval - submit an approval request with budget justification and cost-benefit analysis for the {} spend, or reduce the amount below the approval threshold",
                format_cost(cost)
            ),
            None => match rule.map(|r| r.description.as_str()) {
                Some(rationale) => format!(
                    "Obtain {role} approval - {rationale}. Attach the budget justification and cost-benefit analysis"
                ),
                None => format!(
                    "Obtain {role} approval - attach the budget justification and cost-benefit analysis"
                ),
            },
        },
        Some(RuleType::Strategic) => {
            if decision.strategic_impact == Some(StrategicImpact::Critical) {
                format!(
                    "Obtain {role} approval - enterprise strategic impact is rated critical; prepare an executive briefing with a strategy review and stakeholder analysis"
                )
            } else {
                match rule.map(|r| r.description.as_str()) {
                    Some(rationale) => format!(
                        "Obtain {role} approval - {rationale}. Attach the strategic alignment review"
                    ),
                    None => format!("Obtain {role} approval - attach the strategic impact review"),
                }
            }
        }
        Some(RuleType::Hr) => match decision.headcount_change {
            Some(headcount) if headcount >= 10 => format!(
                "Obtain {role} approval - a change of {headcount} positions is a major workforce change; prepare an org change plan (staffing, budget, strategic rationale), or scale the hiring below the threshold"
            ),
            _ => format!("Obtain {role} approval - submit the workforce change plan"),
        },
        _ => match rule.map(|r| r.description.as_str()) {
            Some(rationale) => format!("Obtain {role} approval - {rationale}"),
            None => format!("Obtain {role} approval"),
        },
    }
}

fn format_cost(cost: f64) -> String {
    if cost >= 1_000_000.0 {
        format!("${:.1}M", cost / 1_000_000.0)
    } else if cost >= 1_000.0 {
        format!("${:.0}K", cost / 1_000.0)
    } else {
        format!("${cost:.0}")
    }
}

fn extract_rationales(governance: &GovernanceOutcome) -> Vec<String> {
    let mut rationales = Vec::new();

    for rule in &governance.triggered_rules {
        if rule.description.is_empty() {
            rationales.push(rule.name.clone());
        } else {
            rationales.push(format!("{}: {}", rule.name, rule.description));
        }
    }

    for step in &governance.approval_chain {
        if let Some(rationale) = &step.rationale {
            if !rationales.iter().any(|existing| existing.contains(rationale)) {
                rationales.push(format!("{} - {}", step.role, rationale));
            }
        }
    }

    rationales
}

/// Map tenant strategic goals against reasoner-reported conflicts. Only
/// conflicted goals are surfaced; listing every goal for every decision is
/// noise.
fn map_strategic_goals(
    tenant: &TenantContext,
    reasoning: Option<&ReasoningOutcome>,
) -> Vec<MappedStrategicGoal> {
    let Some(reasoning) = reasoning else {
        return Vec::new();
    };

    let mut mapped = Vec::new();
    for conflict in &reasoning.strategic_goal_conflicts {
        let Some(goal) = tenant
            .strategic_goals
            .iter()
            .find(|goal| goal.goal_id == conflict.goal_id)
        else {
            continue;
        };
        mapped.push(MappedStrategicGoal {
            goal_id: goal.goal_id.clone(),
            name: goal.name.clone(),
            status: GoalAlignment::Conflict,
            reasoning: Some(conflict.description.clone()),
            conflict_type: conflict.conflict_type.clone(),
            kpis: goal.kpis.clone(),
            priority: goal.priority.clone(),
            severity: Some(conflict.severity),
        });
    }
    mapped
}

fn build_graph_reasoning_block(reasoning: &ReasoningOutcome) -> GraphReasoningBlock {
    GraphReasoningBlock {
        analysis_method: reasoning.analysis_method.as_str().to_string(),
        graph_context: GraphContextSummary {
            nodes_analyzed: reasoning.subgraph_metadata.nodes_total,
            edges_analyzed: reasoning.subgraph_metadata.edges_total,
            traversal_depth: 2,
            subgraph_source: reasoning.subgraph_metadata.source.clone(),
            matched_personnel: reasoning.subgraph_metadata.matched_personnel.clone(),
            selection_criteria: reasoning.subgraph_metadata.selection_criteria.clone(),
        },
        logical_contradictions: reasoning.contradictions.clone(),
        ownership_issues: reasoning.ownership_issues.clone(),
        risk_gaps: reasoning.risk_gaps.clone(),
        graph_recommendations: reasoning.recommendations.clone(),
        confidence: reasoning.confidence,
    }
}

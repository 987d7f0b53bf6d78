use decision_governance_common::utils::truncate_at_word;
use decision_governance_models::{
    AnalysisMethod, DecisionRecord, GovernanceFlag, GovernanceOutcome, InferredOwner,
    RuleAction, Severity, TenantContext,
};

use crate::models::{
    AuthType, ConsolePayload, DecisionSummaryView, ExtractionMetadataView, FlagCategory,
    GovernanceView, GraphPayloadView, NormalizedApprovalStep, NormalizedFlag, NormalizedRule,
    ReasoningView, RuleStatus,
};
use crate::services::tenant_registry::{TenantRegistry, TenantSummary};

/// Flag code pattern -> category. Evaluated in order; first match wins.
const FLAG_CATEGORY_PATTERNS: &[(&[&str], FlagCategory)] = &[
    (
        &["HIGH_FINANCIAL", "BUDGET", "COST", "FINANCIAL"],
        FlagCategory::Financial,
    ),
    (&["PRIVACY", "GDPR", "HIPAA", "PII"], FlagCategory::Privacy),
    (&["CRITICAL_CONFLICT", "BLOCK"], FlagCategory::Conflict),
    // BOARD indicates strategic-level escalation, not governance process
    (&["STRATEGIC", "BOARD"], FlagCategory::Strategic),
    (
        &["APPROVAL_REQUIRED", "COMPLIANCE"],
        FlagCategory::Governance,
    ),
];

/// Flag code pattern -> severity, strongest first.
const FLAG_SEVERITY_PATTERNS: &[(&str, Severity)] = &[
    ("CRITICAL", Severity::Critical),
    ("HIGH", Severity::High),
    ("MEDIUM", Severity::Medium),
];

fn flag_message(code: &str) -> String {
    let canonical = match code {
        "PRIVACY_REVIEW_REQUIRED" => "Privacy and data-protection review required",
        "CRITICAL_CONFLICT" => "The decision contains critical conflicting items",
        "HIGH_RISK" => "Classified as a high-risk decision",
        "STRATEGIC_CRITICAL" => "Decision with very high strategic significance",
        "STRATEGIC_MISALIGNMENT" => "Decision conflicts with one or more strategic goals",
        "MISSING_OWNER" => "No accountable owner has been assigned",
        "MISSING_RISK_ASSESSMENT" => "Risk assessment is missing",
        "FINANCIAL_THRESHOLD_EXCEEDED" => "Financial approval threshold exceeded",
        "GOVERNANCE_COVERAGE_GAP" => {
            "No governance rule covers this decision type - consider adding a rule or requesting a manual review"
        }
        _ => return format!("Governance flag: {code}"),
    };
    canonical.to_string()
}

/// Transform raw flag codes into structured flags.
///
/// MISSING_OWNER is suppressed when the engine inferred a department-level
/// owner: the concern is already resolved, and resurfacing it would
/// contradict the owner shown in the pack. Escalation-level inferences
/// (CEO, CFO) do not suppress, since a C-level "owner" usually signals the
/// rule base could not find anyone closer to the work.
pub fn normalize_flags(
    flags: &[GovernanceFlag],
    inferred_owner: Option<&InferredOwner>,
) -> Vec<NormalizedFlag> {
    let department_owner = inferred_owner
        .map(|owner| owner.level <= 2)
        .unwrap_or(false);

    flags
        .iter()
        .filter(|flag| !(**flag == GovernanceFlag::MissingOwner && department_owner))
        .map(|flag| {
            let code = flag.as_str();

            let category = FLAG_CATEGORY_PATTERNS
                .iter()
                .find(|(patterns, _)| patterns.iter().any(|p| code.contains(*p)))
                .map(|(_, category)| *category)
                .unwrap_or(FlagCategory::Governance);

            let severity = FLAG_SEVERITY_PATTERNS
                .iter()
                .find(|(pattern, _)| code.contains(pattern))
                .map(|(_, severity)| *severity)
                .unwrap_or(Severity::Low);

            NormalizedFlag {
                code: code.to_string(),
                category,
                severity,
                message: flag_message(code),
            }
        })
        .collect()
}

/// Stamp triggered rules TRIGGERED and derive `all_rules` by union with the
/// tenant's active rule set, stamping the remainder PASSED. Together they
/// partition the active set; each rule id appears exactly once.
pub fn normalize_rules(
    governance: &GovernanceOutcome,
    tenant: &TenantContext,
) -> (Vec<NormalizedRule>, Vec<NormalizedRule>) {
    let triggered: Vec<NormalizedRule> = governance
        .triggered_rules
        .iter()
        .map(|rule| {
            let consequence = tenant
                .governance_rules
                .iter()
                .find(|candidate| candidate.rule_id == rule.rule_id)
                .map(|candidate| candidate.consequence.clone());
            NormalizedRule {
                rule_id: rule.rule_id.clone(),
                name: rule.name.clone(),
                rule_type: rule.rule_type.as_str().to_string(),
                description: rule.description.clone(),
                short_description: truncate_at_word(&rule.description, 80),
                status: RuleStatus::Triggered,
                severity: rule.severity,
                consequence,
            }
        })
        .collect();

    let mut all_rules = triggered.clone();
    for rule in tenant.active_rules() {
        if triggered.iter().any(|t| t.rule_id == rule.rule_id) {
            continue;
        }
        all_rules.push(NormalizedRule {
            rule_id: rule.rule_id.clone(),
            name: rule.name.clone(),
            rule_type: rule.rule_type.as_str().to_string(),
            description: rule.description.clone(),
            short_description: truncate_at_word(&rule.description, 80),
            status: RuleStatus::Passed,
            severity: rule.consequence.severity,
            consequence: Some(rule.consequence.clone()),
        });
    }

    (triggered, all_rules)
}

/// Add pending status to each chain step and resolve the approver's name
/// and numeric level from the personnel hierarchy.
pub fn normalize_approval_chain(
    governance: &GovernanceOutcome,
    tenant: &TenantContext,
) -> Vec<NormalizedApprovalStep> {
    governance
        .approval_chain
        .iter()
        .map(|step| {
            let person = step
                .approver_id
                .as_deref()
                .and_then(|id| tenant.approval_hierarchy.find_by_id(id))
                .or_else(|| tenant.approval_hierarchy.find_by_role(&step.role));

            let auth_type = match step.rule_action {
                Some(RuleAction::RequireReview) => AuthType::Escalation,
                _ => AuthType::Required,
            };

            NormalizedApprovalStep {
                role: step.role.clone(),
                name: person.map(|p| p.name.clone()),
                level: person
                    .map(|p| p.level)
                    .or(Some(step.level.numeric())),
                status: "pending".to_string(),
                reason: step.rationale.clone(),
                source_rule_id: step.source_rule_id.clone(),
                auth_type,
            }
        })
        .collect()
}

/// Risk score for the console: fall back to the strongest severity seen in
/// triggered rules or flags when the computed score is missing or zero.
pub fn normalize_risk_score(
    governance: &GovernanceOutcome,
    normalized_flags: &[NormalizedFlag],
) -> f64 {
    let score = governance.computed_risk_score;
    if score > 0.0 {
        return score;
    }

    if governance
        .triggered_rules
        .iter()
        .any(|rule| rule.severity == Severity::Critical)
    {
        return 9.0;
    }
    if governance
        .triggered_rules
        .iter()
        .any(|rule| rule.severity == Severity::High)
    {
        return 7.0;
    }
    if normalized_flags
        .iter()
        .any(|flag| flag.severity == Severity::Critical)
    {
        return 8.0;
    }
    if normalized_flags
        .iter()
        .any(|flag| flag.severity == Severity::High)
    {
        return 6.0;
    }
    if normalized_flags.is_empty() {
        1.0
    } else {
        3.0
    }
}

/// Assemble the full console payload from a lifecycle record.
pub fn build_console_payload(record: &DecisionRecord, registry: &TenantRegistry) -> ConsolePayload {
    let company = registry
        .get_summary(&record.tenant_id)
        .unwrap_or_else(|| TenantSummary {
            id: record.tenant_id.clone(),
            name: record.tenant_id.clone(),
            industry: "Unknown".to_string(),
            size: "Unknown".to_string(),
            governance_framework: "Unknown".to_string(),
        });
    let tenant = registry.get_full(&record.tenant_id);

    let decision = record.decision.as_ref().map(|d| {
        // When the extractor put a role title into the name slot and no
        // personal name exists, swap in the actual person from the
        // hierarchy so the console shows who the role resolves to.
        let owners = d
            .owners
            .iter()
            .map(|owner| {
                if owner.role.is_none() {
                    if let Some(person) = tenant.and_then(|t| {
                        t.approval_hierarchy.find_by_role(&owner.name)
                    }) {
                        return decision_governance_models::Owner {
                            name: person.name.clone(),
                            role: Some(person.role.clone()),
                            responsibility: owner.responsibility.clone(),
                        };
                    }
                }
                owner.clone()
            })
            .collect();

        DecisionSummaryView {
            statement: d.statement.clone(),
            goals: d.goals.clone(),
            kpis: d.kpis.clone(),
            risks: d.risks.clone(),
            owners,
            assumptions: d.assumptions.clone(),
        }
    });

    let governance = match (&record.governance, tenant) {
        (Some(outcome), Some(tenant)) => {
            let flags = normalize_flags(&outcome.flags, outcome.inferred_owner.as_ref());
            let (triggered_rules, all_rules) = normalize_rules(outcome, tenant);
            let approval_chain = normalize_approval_chain(outcome, tenant);
            let risk_score = normalize_risk_score(outcome, &flags);
            Some(GovernanceView {
                status: outcome.status.as_str().to_string(),
                requires_human_review: outcome.requires_human_review,
                risk_score,
                flags,
                triggered_rules,
                all_rules,
                approval_chain,
            })
        }
        _ => None,
    };

    let graph_payload = record.graph_payload.as_ref().map(|graph| GraphPayloadView {
        nodes: graph.nodes.clone(),
        edges: graph.edges.clone(),
        node_count: graph.metadata.node_count,
        edge_count: graph.metadata.edge_count,
    });

    let reasoning = record.reasoning.as_ref().map(|outcome| {
        let mut recommendations: Vec<String> = outcome
            .recommendations
            .iter()
            .map(|rec| rec.action.clone())
            .collect();
        recommendations.extend(
            outcome
                .ownership_issues
                .iter()
                .map(|issue| issue.description.clone()),
        );

        // Deterministic reasoning carries its own fixed confidence; the
        // extraction confidence is a better proxy for how reliably the
        // structural rules could be applied.
        let confidence = match outcome.analysis_method {
            AnalysisMethod::Deep => outcome.confidence,
            AnalysisMethod::Deterministic => record
                .decision
                .as_ref()
                .map(|d| d.confidence)
                .unwrap_or(outcome.confidence),
        };

        ReasoningView {
            analysis_method: outcome.analysis_method.as_str().to_string(),
            logical_contradictions: outcome
                .contradictions
                .iter()
                .map(|c| c.description.clone())
                .collect(),
            graph_recommendations: recommendations,
            confidence,
        }
    });

    let extraction_metadata = record.extraction_metadata.as_ref().map(|meta| {
        ExtractionMetadataView {
            request_id: meta.request_id.clone(),
            retry_count: meta.retry_count,
            model: meta.model.clone(),
            success: meta.success,
            fallback_used: meta.fallback_used,
            extraction_method: if meta.fallback_used.unwrap_or(false) {
                "fallback".to_string()
            } else {
                "llm".to_string()
            },
            tenant_id: record.tenant_id.clone(),
            processed_at: record.updated_at,
        }
    });

    ConsolePayload {
        decision_id: record.decision_id.clone(),
        status: record.status,
        company,
        decision,
        derived_attributes: record.derived_attributes.clone(),
        governance,
        graph_payload,
        reasoning,
        decision_pack: record.decision_pack.clone(),
        extraction_metadata,
        error: record.error.clone(),
    }
}

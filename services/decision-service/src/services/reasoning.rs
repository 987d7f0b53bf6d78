use tracing::{info, warn};

use decision_governance_models::{
    AnalysisMethod, Contradiction, Decision, GovernanceOutcome, ReasoningIssue,
    ReasoningOutcome, Severity, Subgraph,
};

use super::deep_reasoner::DeepReasoner;

/// Run graph reasoning over the subgraph.
///
/// Deep mode is attempted only when requested and a reasoner client is
/// configured; any failure (transport, parse) falls through to the
/// deterministic analysis so the pipeline never stalls on the analyzer.
pub async fn analyze(
    decision_id: &str,
    decision: &Decision,
    governance: &GovernanceOutcome,
    subgraph: Subgraph,
    deep: Option<&DeepReasoner>,
    use_deep_reasoning: bool,
) -> ReasoningOutcome {
    if use_deep_reasoning {
        if let Some(reasoner) = deep {
            match reasoner.analyze(decision_id, &subgraph, governance).await {
                Ok(analysis) => {
                    info!(
                        decision_id,
                        contradictions = analysis.contradictions.len(),
                        confidence = analysis.confidence,
                        "deep reasoning complete"
                    );
                    return ReasoningOutcome {
                        analysis_method: AnalysisMethod::Deep,
                        contradictions: analysis.contradictions,
                        strategic_goal_conflicts: analysis.strategic_goal_conflicts,
                        inferred_owners: analysis.inferred_owners,
                        ownership_issues: analysis.ownership_issues,
                        risk_gaps: analysis.risk_gaps,
                        recommendations: analysis.recommendations,
                        next_actions: analysis.next_actions,
                        graph_health_score: analysis.graph_health_score,
                        confidence: analysis.confidence,
                        subgraph_metadata: subgraph.metadata,
                    };
                }
                Err(err) => {
                    warn!(decision_id, %err, "deep reasoning failed - falling back to deterministic analysis");
                }
            }
        } else {
            info!(decision_id, "deep reasoning requested but no API key configured - using deterministic analysis");
        }
    }

    deterministic_analysis(decision, governance, subgraph)
}

/// Structural fallback analysis. Same output shape as deep mode.
pub fn deterministic_analysis(
    decision: &Decision,
    governance: &GovernanceOutcome,
    subgraph: Subgraph,
) -> ReasoningOutcome {
    let mut contradictions = Vec::new();
    let mut risk_gaps = Vec::new();

    // Zero actors means zero explicitly-stated owners; engine-side owner
    // inference does not create an actor.
    if decision.owners.is_empty() {
        contradictions.push(Contradiction {
            kind: "ownership_missing".to_string(),
            severity: Severity::Critical,
            description: "No owner is identified for this decision".to_string(),
            nodes_involved: Vec::new(),
            evidence: None,
            impact: Some("Nobody is accountable for delivering the outcome".to_string()),
            recommendation: Some("Assign at least one accountable owner".to_string()),
        });
    }

    if governance.computed_risk_score >= 7.0 && decision.risks.len() < 2 {
        contradictions.push(Contradiction {
            kind: "risk_coverage_gap".to_string(),
            severity: Severity::High,
            description: format!(
                "Risk score is {} but only {} risk(s) are identified",
                governance.computed_risk_score,
                decision.risks.len()
            ),
            nodes_involved: Vec::new(),
            evidence: None,
            impact: Some("High-risk decision with thin risk documentation".to_string()),
            recommendation: Some("Conduct a thorough risk assessment".to_string()),
        });
    }

    for risk in &decision.risks {
        if risk.mitigation.is_none() {
            risk_gaps.push(ReasoningIssue {
                issue: "insufficient_mitigation".to_string(),
                severity: Severity::Medium,
                description: format!("Risk '{}' has no mitigation plan", risk.description),
                recommendation: Some("Add specific mitigation actions".to_string()),
            });
        }
    }

    // Health degrades with each structural finding.
    let findings = contradictions.len() + risk_gaps.len();
    let graph_health_score = (1.0 - 0.15 * findings as f64).max(0.0);

    ReasoningOutcome {
        analysis_method: AnalysisMethod::Deterministic,
        contradictions,
        strategic_goal_conflicts: Vec::new(),
        inferred_owners: Vec::new(),
        ownership_issues: Vec::new(),
        risk_gaps,
        recommendations: Vec::new(),
        next_actions: Vec::new(),
        graph_health_score,
        confidence: 0.6,
        subgraph_metadata: subgraph.metadata,
    }
}

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, info};

use decision_governance_models::{
    Contradiction, GoalConflict, GovernanceOutcome, ReasonerOwner, ReasoningIssue,
    Recommendation, Subgraph,
};

#[derive(Debug, Error)]
pub enum ReasonerError {
    #[error("reasoner request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("reasoner API returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("reasoner API returned no choices")]
    EmptyResponse,

    #[error("reasoner output was not parseable JSON: {0}")]
    Parse(String),
}

/// Parsed analyzer output; identical field set to the deterministic path.
#[derive(Debug, Deserialize)]
pub struct DeepAnalysis {
    #[serde(default)]
    pub contradictions: Vec<Contradiction>,
    #[serde(default)]
    pub strategic_goal_conflicts: Vec<GoalConflict>,
    #[serde(default)]
    pub inferred_owners: Vec<ReasonerOwner>,
    #[serde(default)]
    pub ownership_issues: Vec<ReasoningIssue>,
    #[serde(default)]
    pub risk_gaps: Vec<ReasoningIssue>,
    #[serde(default)]
    pub recommendations: Vec<Recommendation>,
    #[serde(default)]
    pub next_actions: Vec<String>,
    #[serde(default)]
    pub graph_health_score: f64,
    #[serde(default)]
    pub confidence: f64,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

/// Client for the optional deep analyzer: subgraph in, structured
/// contradiction analysis out.
pub struct DeepReasoner {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    pub model: String,
}

impl DeepReasoner {
    pub fn new(base_url: String, api_key: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            api_key,
            model,
        }
    }

    pub async fn analyze(
        &self,
        decision_id: &str,
        subgraph: &Subgraph,
        governance: &GovernanceOutcome,
    ) -> Result<DeepAnalysis, ReasonerError> {
        let prompt = build_contradiction_prompt(decision_id, subgraph, governance);

        info!(
            model = %self.model,
            nodes = subgraph.nodes.len(),
            edges = subgraph.edges.len(),
            "calling deep reasoner"
        );
        let body = json!({
            "model": self.model,
            "messages": [{"role": "user", "content": prompt}],
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ReasonerError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response.json().await?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(ReasonerError::EmptyResponse)?;

        debug!(chars = content.len(), "received deep reasoning output");
        parse_analysis(&content)
    }
}

/// Extract the outermost JSON object from the model output (it may wrap
/// the JSON in prose or code fences) and deserialize it.
pub fn parse_analysis(content: &str) -> Result<DeepAnalysis, ReasonerError> {
    let start = content.find('{');
    let end = content.rfind('}');
    let (Some(start), Some(end)) = (start, end) else {
        return Err(ReasonerError::Parse("no JSON object in output".to_string()));
    };
    if end < start {
        return Err(ReasonerError::Parse("malformed JSON boundaries".to_string()));
    }
    serde_json::from_str(&content[start..=end]).map_err(|err| ReasonerError::Parse(err.to_string()))
}

/// One step of an analyzer-optimized approval chain.
#[derive(Debug, Deserialize)]
pub struct OptimizedChainStep {
    pub approver_role: String,
    #[serde(default)]
    pub approver_id: Option<String>,
    #[serde(default)]
    pub level: Option<u8>,
    #[serde(default)]
    pub sequence_order: Option<u32>,
    #[serde(default)]
    pub rationale: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChainOptimization {
    #[serde(default)]
    pub optimized_approval_chain: Vec<OptimizedChainStep>,
    #[serde(default)]
    pub reasoning_summary: Option<String>,
}

impl DeepReasoner {
    /// Ask the analyzer to resolve conflicts between multiple triggered
    /// rules and propose an ordered approval chain. Used only when the
    /// caller opted into deep governance and at least two rules fired.
    pub async fn optimize_approval_chain(
        &self,
        decision: &decision_governance_models::Decision,
        governance: &GovernanceOutcome,
        tenant: &decision_governance_models::TenantContext,
    ) -> Result<ChainOptimization, ReasonerError> {
        let triggered = serde_json::to_string_pretty(&governance.triggered_rules)
            .unwrap_or_else(|_| "[]".to_string());
        let personnel = serde_json::to_string_pretty(&tenant.approval_hierarchy.personnel)
            .unwrap_or_else(|_| "[]".to_string());
        let current_chain = serde_json::to_string_pretty(&governance.approval_chain)
            .unwrap_or_else(|_| "[]".to_string());

        let prompt = format!(
            r#"You are a governance expert resolving rule conflicts and sequencing approval chains.

DECISION:
  Statement: {statement}
  Confidence: {confidence}
  Risk score: {risk_score}

TRIGGERED GOVERNANCE RULES:
{triggered}

CURRENT APPROVAL CHAIN (rule order, deduplicated):
{current_chain}

PERSONNEL HIERARCHY:
{personnel}

Multiple rules have triggered and may overlap in their approval requirements.
Decide the optimal ordering: lower-level approvers before higher-level ones,
duplicates merged, and escalation only where a rule genuinely demands it.
Keep every approver that a triggered rule requires - never drop a required
gate. Use approver ids and numeric levels from the personnel hierarchy.

Output ONLY a JSON object with this shape:
{{
  "optimized_approval_chain": [
    {{"approver_role": "CFO", "approver_id": "person_id", "level": 4, "sequence_order": 1, "rationale": "why this approver in this position"}}
  ],
  "reasoning_summary": "short analysis"
}}"#,
            statement = decision.statement,
            confidence = decision.confidence,
            risk_score = governance.computed_risk_score,
            triggered = triggered,
            current_chain = current_chain,
            personnel = personnel,
        );

        info!(
            model = %self.model,
            rules = governance.triggered_rules.len(),
            "calling deep reasoner for approval chain optimization"
        );
        let body = json!({
            "model": self.model,
            "messages": [{"role": "user", "content": prompt}],
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ReasonerError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response.json().await?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(ReasonerError::EmptyResponse)?;

        parse_chain_optimization(&content)
    }
}

/// Extract and deserialize the chain-optimization JSON object.
pub fn parse_chain_optimization(content: &str) -> Result<ChainOptimization, ReasonerError> {
    let start = content.find('{');
    let end = content.rfind('}');
    let (Some(start), Some(end)) = (start, end) else {
        return Err(ReasonerError::Parse("no JSON object in output".to_string()));
    };
    if end < start {
        return Err(ReasonerError::Parse("malformed JSON boundaries".to_string()));
    }
    serde_json::from_str(&content[start..=end]).map_err(|err| ReasonerError::Parse(err.to_string()))
}

/// Serialize the subgraph into a structured analysis prompt: nodes grouped
/// by semantic label, edges as a table, then the governance snapshot and
/// the output contract.
pub fn build_contradiction_prompt(
    decision_id: &str,
    subgraph: &Subgraph,
    governance: &GovernanceOutcome,
) -> String {
    let mut by_label: BTreeMap<&str, Vec<_>> = BTreeMap::new();
    for node in &subgraph.nodes {
        by_label.entry(node.label.as_str()).or_default().push(node);
    }

    let mut nodes_section = String::new();
    for (label, nodes) in &by_label {
        let _ = writeln!(nodes_section, "\n  {} nodes ({}):", label, nodes.len());
        for node in nodes {
            let props = match &node.properties {
                serde_json::Value::Null => String::new(),
                value => format!("  | {value}"),
            };
            let _ = writeln!(nodes_section, "    - [{}]{}", node.id, props);
        }
    }

    let mut edges_section = String::new();
    for edge in &subgraph.edges {
        let props = edge
            .properties
            .as_ref()
            .map(|p| format!("  | {p}"))
            .unwrap_or_default();
        let _ = writeln!(
            edges_section,
            "    {} --[{}]--> {}{}",
            edge.source,
            serde_json::to_string(&edge.predicate).unwrap_or_default(),
            edge.target,
            props
        );
    }

    let flags: Vec<&str> = governance.flags.iter().map(|f| f.as_str()).collect();
    let triggered: Vec<String> = governance
        .triggered_rules
        .iter()
        .map(|r| format!("{} ({}): {}", r.rule_id, r.rule_type.as_str(), r.description))
        .collect();

    format!(
        r#"You are a decision governance expert analyzing a decision subgraph for logical contradictions and structural issues.

This subgraph was extracted around decision "{decision_id}" by collecting nodes connected through shared owners, shared KPIs, shared strategic goals, and reporting chains. Only relevant context is included.

SUBGRAPH NODES ({node_count} total):
{nodes_section}
SUBGRAPH EDGES ({edge_count} total):
{edges_section}
GOVERNANCE SNAPSHOT:
  Flags: {flags:?}
  Triggered rules: {triggered:?}
  Risk score: {risk_score}
  Requires review: {requires_review}

ANALYSIS TASKS:

1. LOGICAL CONTRADICTIONS - do connected strategic goals conflict? Are KPIs
   measuring opposing outcomes? Do risk mitigations contradict decision goals?

2. STRATEGIC GOAL CONFLICTS (most important) - does the decision contradict
   any StrategicGoal node? Compare decision costs, risks, and impacts against
   goal descriptions and KPI targets. Mark real contradictions as severity
   "critical".

3. OWNERSHIP AND AUTHORITY - owner and approver are separate roles: owners
   deliver the outcome, approvers sign off. When CandidateOwner nodes exist
   (no owner was stated), propose owners in "inferred_owners" ONLY when the
   decision domain maps one-to-one onto an existing role; use confidence
   "high" for those, otherwise record the ambiguity in "ownership_issues".
   Do not simply pick approvers from the chain.

4. RISK COVERAGE GAPS - are decision risks within the RiskTolerance
   thresholds? Are obvious risks missing? Do mitigations address the risks?

5. NEXT ACTIONS - using the actual Policy node conditions and the approval
   hierarchy, produce a prioritized list of concrete steps toward approval.
   Name thresholds explicitly and say what evidence to prepare for each
   approver. Write them in the same language as the decision statement.

Output ONLY a JSON object with this shape:
{{
  "contradictions": [{{"type": "goal_conflict|kpi_conflict|risk_conflict|authority_gap|alignment_gap", "severity": "critical|high|medium|low", "nodes_involved": ["id"], "description": "...", "evidence": "...", "impact": "...", "recommendation": "..."}}],
  "strategic_goal_conflicts": [{{"goal_id": "...", "goal_name": "...", "conflict_type": "cost_contradiction|compliance_contradiction|timeline_contradiction|safety_contradiction|quality_contradiction", "severity": "critical|high|medium", "description": "...", "recommendation": "..."}}],
  "inferred_owners": [{{"person_id": "...", "name": "...", "role": "...", "confidence": "high|medium|low", "reasoning": "..."}}],
  "ownership_issues": [{{"issue": "missing_owner|missing_stakeholder|insufficient_authority|wrong_owner", "severity": "critical|high|medium|low", "description": "...", "recommendation": "..."}}],
  "risk_gaps": [{{"issue": "missing_risk|insufficient_mitigation|tolerance_violation", "severity": "critical|high|medium|low", "description": "...", "recommendation": "..."}}],
  "recommendations": [{{"priority": "critical|high|medium|low", "action": "...", "reasoning": "..."}}],
  "next_actions": ["concrete step toward approval", "..."],
  "graph_health_score": 0.0,
  "confidence": 0.0
}}

Be rigorous. Reason from the graph structure and identify contradictions a human reviewer might miss."#,
        decision_id = decision_id,
        node_count = subgraph.nodes.len(),
        nodes_section = nodes_section,
        edge_count = subgraph.edges.len(),
        edges_section = edges_section,
        flags = flags,
        triggered = triggered,
        risk_score = governance.computed_risk_score,
        requires_review = governance.requires_human_review,
    )
}

use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("extraction request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("extraction API returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("extraction API returned no choices")]
    EmptyResponse,
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

/// Chat-completions client for structured decision extraction.
///
/// Temperature is pinned to zero and JSON mode is requested so the same
/// input text yields the same structured output.
pub struct LlmClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    pub model: String,
}

impl LlmClient {
    pub fn new(base_url: String, api_key: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            api_key,
            model,
        }
    }

    /// Extract structured decision JSON from free-form text. Returns the
    /// raw JSON string; parsing and validation happen in the extractor so
    /// retries can distinguish transport errors from malformed output.
    pub async fn extract_decision_json(&self, decision_text: &str) -> Result<String, LlmError> {
        let body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": EXTRACTION_SYSTEM_PROMPT},
                {"role": "user", "content": format!(
                    "Extract the structured decision from this text:\n\n{decision_text}\n\nOutput valid JSON only."
                )},
            ],
            "temperature": 0.0,
            "response_format": {"type": "json_object"},
        });

        info!(model = %self.model, chars = decision_text.len(), "calling extraction API");
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
            return Err(LlmError::Status {
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
            .ok_or(LlmError::EmptyResponse)?;

        debug!(chars = content.len(), "received extraction response");
        Ok(content)
    }
}

/// System prompt for the extraction model. The schema mirrors the
/// `Decision` type; the three principles govern every field.
const EXTRACTION_SYSTEM_PROMPT: &str = r#"You are a decision extraction system for enterprise governance.

Convert the decision text into structured JSON matching this schema:
{
  "statement": "string (10-1000 chars, one clear executable action)",
  "goals": [{"description": "string", "metric": "string or null"}],
  "kpis": [{"name": "string", "target": "string or null", "measurement_frequency": "string or null"}],
  "risks": [{"description": "string", "severity": "low|medium|high|critical or null", "mitigation": "string or null"}],
  "owners": [{"name": "string", "role": "string or null", "responsibility": "string or null"}],
  "assumptions": [{"description": "string", "criticality": "string or null"}],
  "counterparty_relation": "\"related_party\" ONLY if the decision involves a financial transaction or contract with subsidiaries, affiliates, the parent company, major shareholders, or board members; null otherwise",
  "policy_change_type": "\"retroactive\" ONLY if the decision applies new rules or terms to events that already occurred; null otherwise",
  "strategic_impact": "low|medium|high|critical or null - how severely would this alter the company's trajectory if it went wrong",
  "uses_pii": "true ONLY if the decision directly handles identifiable customer or end-user personal data (profiles, behavioral data, health records); internal employee data and budget figures do not qualify; null otherwise",
  "cost": "number or null - the amount that would appear on an approval form, converted to a full number ($3.5M -> 3500000)",
  "cost_estimate_range": "string or null - human-readable market range when cost was inferred rather than stated",
  "target_market": "string or null - target market or region if explicitly mentioned",
  "launch_date": "true if the decision involves a product launch, service deployment, or release; null otherwise",
  "involves_hiring": "true if the decision adds people to the payroll or changes headcount; null otherwise",
  "headcount_change": "integer or null - net people added (positive) or reduced (negative), only when stated",
  "involves_compliance_risk": "true if the decision explicitly raises anti-bribery, ethics-code, gift/entertainment policy, or conflict-of-interest concerns; null otherwise",
  "confidence": "0.0 to 1.0 - extraction reliability"
}

CRITICAL - LANGUAGE PRESERVATION

ALL extracted text fields (statement, goals, KPIs, risks, owners, assumptions)
MUST be in the SAME LANGUAGE as the input text. This is a hard requirement.
Do not translate and do not mix languages.

THREE EXTRACTION PRINCIPLES

1. STATED ONLY (with domain-informed cost inference)
   Extract what the text explicitly says. If arriving at a value requires you
   to calculate, multiply, or assume arbitrary numbers, the answer is null or [].

   EXCEPTION for cost: when the decision names a well-known class of expensive
   capital equipment with an established market price (medical imaging
   equipment, enterprise systems, fleet vehicles) and no amount is stated, set
   "cost" to the UPPER BOUND of the typical market range and put the full range
   into "cost_estimate_range" in the input language, e.g.
   "$1.5M-$3.5M (typical MRI equipment)". Items with highly variable pricing
   (marketing campaigns, consulting, office rent) stay null.
   When an explicit amount IS stated, use it and leave cost_estimate_range null.

2. GOVERNANCE TRIGGER
   Boolean flags (uses_pii, involves_hiring, involves_compliance_risk) are
   formal review gates. Ask: would the relevant officer - a data privacy
   officer, HR lead, or compliance officer - need to be formally notified
   because of this specific decision? Proximity is not enough; only set true
   when the decision directly triggers that review.

3. OWNER BY DOMAIN
   An owner is the person accountable for delivering the outcome. If the
   decision domain unambiguously implies a role (R&D work -> head of
   engineering, marketing campaign -> head of marketing, equipment purchase ->
   finance lead), include that role even when no name is given. If the domain
   is genuinely ambiguous, use [].

OUTPUT RULES
- Output ONLY valid JSON, no markdown and no explanation
- Use [] for missing list fields and null for missing scalar fields
- Be conservative with confidence scores"#;

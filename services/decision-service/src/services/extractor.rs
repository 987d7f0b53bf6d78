use tracing::{error, info, warn};

use decision_governance_models::{Decision, ExtractionMetadata};

use super::llm_client::LlmClient;

/// Extraction result: the decision plus metadata describing how it was
/// obtained. The pipeline continues on a fallback decision instead of
/// failing, so this function never errors.
pub struct ExtractionResult {
    pub decision: Decision,
    pub metadata: ExtractionMetadata,
}

impl ExtractionResult {
    /// A fallback extraction always forces human review downstream.
    pub fn used_fallback(&self) -> bool {
        self.metadata.fallback_used.unwrap_or(false)
    }
}

/// LLM-backed extractor with bounded retries and a graceful fallback.
///
/// A `None` client (missing LLM_API_KEY) degrades straight to the
/// fallback decision; the pipeline still runs end to end.
pub struct Extractor {
    client: Option<LlmClient>,
    max_retries: u32,
}

impl Extractor {
    pub fn new(client: Option<LlmClient>, max_retries: u32) -> Self {
        Self {
            client,
            max_retries,
        }
    }

    pub async fn extract(&self, decision_text: &str, request_id: &str) -> ExtractionResult {
        let Some(client) = &self.client else {
            warn!(request_id, "no extraction API key configured - using fallback decision");
            return self.fallback(decision_text, request_id, 0, "no API key configured");
        };

        let mut last_error = String::new();

        for attempt in 0..=self.max_retries {
            info!(
                request_id,
                attempt = attempt + 1,
                total = self.max_retries + 1,
                "extraction attempt"
            );

            let raw = match client.extract_decision_json(decision_text).await {
                Ok(raw) => raw,
                Err(err) => {
                    last_error = format!("API call failed: {err}");
                    warn!(request_id, attempt, %err, "extraction API call failed");
                    continue;
                }
            };

            let decision: Decision = match serde_json::from_str(&raw) {
                Ok(decision) => decision,
                Err(err) => {
                    last_error = format!("JSON parsing failed: {err}");
                    warn!(request_id, attempt, %err, "extraction output did not parse");
                    continue;
                }
            };

            if let Err(detail) = decision.validate() {
                last_error = format!("validation failed: {detail}");
                warn!(request_id, attempt, %detail, "extracted decision failed validation");
                continue;
            }

            info!(
                request_id,
                confidence = decision.confidence,
                cost = ?decision.cost,
                uses_pii = ?decision.uses_pii,
                strategic_impact = ?decision.strategic_impact,
                "extraction succeeded"
            );
            return ExtractionResult {
                decision,
                metadata: ExtractionMetadata {
                    request_id: request_id.to_string(),
                    retry_count: attempt,
                    model: client.model.clone(),
                    success: true,
                    fallback_used: None,
                    error: None,
                },
            };
        }

        error!(
            request_id,
            attempts = self.max_retries + 1,
            %last_error,
            "all extraction attempts failed - returning fallback decision"
        );
        self.fallback(decision_text, request_id, self.max_retries, &last_error)
    }

    fn fallback(
        &self,
        decision_text: &str,
        request_id: &str,
        retry_count: u32,
        error: &str,
    ) -> ExtractionResult {
        ExtractionResult {
            decision: Decision::fallback(decision_text),
            metadata: ExtractionMetadata {
                request_id: request_id.to_string(),
                retry_count,
                model: self
                    .client
                    .as_ref()
                    .map(|c| c.model.clone())
                    .unwrap_or_else(|| "none".to_string()),
                success: false,
                fallback_used: Some(true),
                error: Some(error.to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_rt::test]
    async fn missing_client_degrades_to_fallback() {
        let extractor = Extractor::new(None, 2);
        let result = extractor
            .extract("Stand up a disaster recovery site in a second region", "req-1")
            .await;
        assert!(result.used_fallback());
        assert!(!result.metadata.success);
        assert_eq!(result.decision.confidence, 0.1);
        assert!(result.decision.statement.starts_with("[EXTRACTION FAILED]"));
    }
}

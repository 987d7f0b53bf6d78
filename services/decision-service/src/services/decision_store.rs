use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tokio::sync::Notify;

use decision_governance_common::utils::{current_timestamp, generate_id};
use decision_governance_models::{
    Decision, DecisionGraph, DecisionPack, DecisionRecord, DecisionStatus, DerivedAttributes,
    ExtractionMetadata, GovernanceOutcome, ReasoningOutcome,
};

/// Pipeline outputs to persist onto a record. Fields left `None` keep the
/// stored value untouched.
#[derive(Default)]
pub struct StageOutputs {
    pub decision: Option<Decision>,
    pub governance: Option<GovernanceOutcome>,
    pub graph_payload: Option<DecisionGraph>,
    pub reasoning: Option<ReasoningOutcome>,
    pub decision_pack: Option<DecisionPack>,
    pub derived_attributes: Option<DerivedAttributes>,
    pub extraction_metadata: Option<ExtractionMetadata>,
}

struct Entry {
    record: DecisionRecord,
    notify: Arc<Notify>,
}

/// In-memory lifecycle store.
///
/// Readers (SSE generator, GET handler) and the pipeline worker share the
/// map under a reader-writer lock; every mutation signals the record's
/// notifier so the SSE generator can wake instead of purely polling.
#[derive(Default)]
pub struct DecisionStore {
    entries: RwLock<HashMap<String, Entry>>,
}

impl DecisionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new pending record and return it.
    pub fn create(
        &self,
        tenant_id: &str,
        input_text: &str,
        use_deep_governance: bool,
        use_deep_reasoning: bool,
    ) -> DecisionRecord {
        let record = DecisionRecord::new(
            generate_id().to_string(),
            tenant_id.to_string(),
            input_text.to_string(),
            use_deep_governance,
            use_deep_reasoning,
            current_timestamp(),
        );
        let mut entries = self.entries.write().unwrap();
        entries.insert(
            record.decision_id.clone(),
            Entry {
                record: record.clone(),
                notify: Arc::new(Notify::new()),
            },
        );
        record
    }

    pub fn get(&self, decision_id: &str) -> Option<DecisionRecord> {
        let entries = self.entries.read().unwrap();
        entries.get(decision_id).map(|e| e.record.clone())
    }

    /// Notifier handle for one record; fires on every status/step change.
    pub fn notifier(&self, decision_id: &str) -> Option<Arc<Notify>> {
        let entries = self.entries.read().unwrap();
        entries.get(decision_id).map(|e| e.notify.clone())
    }

    /// Advance status and (optionally) the current step. Steps only move
    /// forward: a stale write can never roll progress back.
    pub fn update_status(
        &self,
        decision_id: &str,
        status: DecisionStatus,
        current_step: Option<u8>,
    ) {
        let mut entries = self.entries.write().unwrap();
        if let Some(entry) = entries.get_mut(decision_id) {
            entry.record.status = status;
            if let Some(step) = current_step {
                if step > entry.record.current_step {
                    entry.record.current_step = step;
                }
            }
            entry.record.updated_at = current_timestamp();
            entry.notify.notify_waiters();
        }
    }

    /// Persist stage outputs onto the record.
    pub fn store_results(&self, decision_id: &str, outputs: StageOutputs) {
        let mut entries = self.entries.write().unwrap();
        if let Some(entry) = entries.get_mut(decision_id) {
            let record = &mut entry.record;
            if let Some(decision) = outputs.decision {
                record.decision = Some(decision);
            }
            if let Some(governance) = outputs.governance {
                record.governance = Some(governance);
            }
            if let Some(graph_payload) = outputs.graph_payload {
                record.graph_payload = Some(graph_payload);
            }
            if let Some(reasoning) = outputs.reasoning {
                record.reasoning = Some(reasoning);
            }
            if let Some(decision_pack) = outputs.decision_pack {
                record.decision_pack = Some(decision_pack);
            }
            if let Some(derived) = outputs.derived_attributes {
                record.derived_attributes = Some(derived);
            }
            if let Some(meta) = outputs.extraction_metadata {
                record.extraction_metadata = Some(meta);
            }
            record.updated_at = current_timestamp();
            entry.notify.notify_waiters();
        }
    }

    /// Mark the record failed with a terminal error message.
    pub fn store_error(&self, decision_id: &str, error: impl Into<String>) {
        let mut entries = self.entries.write().unwrap();
        if let Some(entry) = entries.get_mut(decision_id) {
            entry.record.status = DecisionStatus::Failed;
            entry.record.error = Some(error.into());
            entry.record.updated_at = current_timestamp();
            entry.notify.notify_waiters();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_then_get_round_trips() {
        let store = DecisionStore::new();
        let record = store.create("acme", "Expand the support team into a second region", false, true);
        let fetched = store.get(&record.decision_id).unwrap();
        assert_eq!(fetched.tenant_id, "acme");
        assert_eq!(fetched.status, DecisionStatus::Pending);
        assert!(fetched.use_deep_reasoning);
    }

    #[test]
    fn step_advancement_is_monotone() {
        let store = DecisionStore::new();
        let record = store.create("acme", "Expand the support team into a second region", false, false);
        store.update_status(&record.decision_id, DecisionStatus::Processing, Some(2));
        store.update_status(&record.decision_id, DecisionStatus::Processing, Some(1));
        let fetched = store.get(&record.decision_id).unwrap();
        assert_eq!(fetched.current_step, 2);
    }

    #[test]
    fn store_error_is_terminal() {
        let store = DecisionStore::new();
        let record = store.create("acme", "Expand the support team into a second region", false, false);
        store.store_error(&record.decision_id, "pipeline timed out");
        let fetched = store.get(&record.decision_id).unwrap();
        assert_eq!(fetched.status, DecisionStatus::Failed);
        assert_eq!(fetched.error.as_deref(), Some("pipeline timed out"));
        assert!(fetched.is_terminal());
    }

    #[test]
    fn unknown_id_returns_none() {
        let store = DecisionStore::new();
        assert!(store.get("missing").is_none());
        assert!(store.notifier("missing").is_none());
    }
}

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use thiserror::Error;
use tracing::{info, warn};

use decision_governance_models::{GovernanceRule, TenantContext};

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("tenant '{tenant_id}' has an invalid approval hierarchy: {detail}")]
    InvalidHierarchy { tenant_id: String, detail: String },

    #[error("failed to read tenant data directory '{dir}': {source}")]
    DataDir {
        dir: String,
        #[source]
        source: std::io::Error,
    },
}

/// Compact tenant view for list endpoints and the console payload.
#[derive(Debug, Clone, serde::Serialize)]
pub struct TenantSummary {
    pub id: String,
    pub name: String,
    pub industry: String,
    pub size: String,
    pub governance_framework: String,
}

#[derive(Debug)]
struct TenantEntry {
    context: TenantContext,
    raw: serde_json::Value,
    summary: TenantSummary,
}

/// Loads and caches per-tenant governance contexts.
///
/// Read-only after init. Missing or unparseable files are logged and
/// skipped; files whose personnel hierarchy fails validation abort boot
/// with the offending ids, since every downstream stage depends on a
/// resolvable reporting graph.
#[derive(Debug)]
pub struct TenantRegistry {
    tenants: HashMap<String, TenantEntry>,
    order: Vec<String>,
}

impl TenantRegistry {
    pub fn load(data_dir: &str) -> Result<Self, RegistryError> {
        let dir = Path::new(data_dir);
        let entries = fs::read_dir(dir).map_err(|source| RegistryError::DataDir {
            dir: data_dir.to_string(),
            source,
        })?;

        let mut paths: Vec<_> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().and_then(|ext| ext.to_str()) == Some("json"))
            .collect();
        paths.sort();

        let mut tenants = HashMap::new();
        let mut order = Vec::new();

        for path in paths {
            let tenant_id = match path.file_stem().and_then(|s| s.to_str()) {
                Some(stem) => stem.to_string(),
                None => continue,
            };

            let raw_text = match fs::read_to_string(&path) {
                Ok(text) => text,
                Err(err) => {
                    warn!(%tenant_id, %err, "tenant file unreadable - skipping");
                    continue;
                }
            };

            let raw: serde_json::Value = match serde_json::from_str(&raw_text) {
                Ok(value) => value,
                Err(err) => {
                    warn!(%tenant_id, %err, "tenant file is not valid JSON - skipping");
                    continue;
                }
            };

            let context: TenantContext = match serde_json::from_value(raw.clone()) {
                Ok(context) => context,
                Err(err) => {
                    warn!(%tenant_id, %err, "tenant file does not match the context schema - skipping");
                    continue;
                }
            };

            validate_hierarchy(&tenant_id, &context)?;

            let summary = build_summary(&tenant_id, &context);
            info!(%tenant_id, name = %summary.name, rules = context.governance_rules.len(), "loaded tenant");

            tenants.insert(
                tenant_id.clone(),
                TenantEntry {
                    context,
                    raw,
                    summary,
                },
            );
            order.push(tenant_id);
        }

        info!(count = order.len(), "tenant registry ready");
        Ok(TenantRegistry { tenants, order })
    }

    /// Build a registry from already-parsed contexts. Test seam.
    pub fn from_contexts(
        contexts: Vec<(String, TenantContext)>,
    ) -> Result<Self, RegistryError> {
        let mut tenants = HashMap::new();
        let mut order = Vec::new();
        for (tenant_id, context) in contexts {
            validate_hierarchy(&tenant_id, &context)?;
            let summary = build_summary(&tenant_id, &context);
            let raw = serde_json::to_value(&context).unwrap_or(serde_json::Value::Null);
            tenants.insert(
                tenant_id.clone(),
                TenantEntry {
                    context,
                    raw,
                    summary,
                },
            );
            order.push(tenant_id);
        }
        Ok(TenantRegistry { tenants, order })
    }

    /// Every id returned here resolves via `get_full`.
    pub fn list(&self) -> Vec<TenantSummary> {
        self.order
            .iter()
            .filter_map(|id| self.tenants.get(id))
            .map(|entry| entry.summary.clone())
            .collect()
    }

    pub fn get_summary(&self, tenant_id: &str) -> Option<TenantSummary> {
        self.tenants.get(tenant_id).map(|e| e.summary.clone())
    }

    pub fn get_full(&self, tenant_id: &str) -> Option<&TenantContext> {
        self.tenants.get(tenant_id).map(|e| &e.context)
    }

    pub fn get_rules(&self, tenant_id: &str) -> Vec<GovernanceRule> {
        self.tenants
            .get(tenant_id)
            .map(|e| e.context.governance_rules.clone())
            .unwrap_or_default()
    }

    /// Raw tenant document, used for rule-condition field overrides.
    pub fn get_raw(&self, tenant_id: &str) -> Option<&serde_json::Value> {
        self.tenants.get(tenant_id).map(|e| &e.raw)
    }

    pub fn contains(&self, tenant_id: &str) -> bool {
        self.tenants.contains_key(tenant_id)
    }
}

fn build_summary(tenant_id: &str, context: &TenantContext) -> TenantSummary {
    TenantSummary {
        id: tenant_id.to_string(),
        name: context.company.name.clone(),
        industry: context.company.industry.clone(),
        size: context.company.size.clone(),
        governance_framework: context
            .metadata
            .governance_framework
            .clone()
            .unwrap_or_else(|| context.company.industry.clone()),
    }
}

/// Reject tenants whose reporting graph is unusable: unresolved
/// `reports_to` references, manager levels below their reports, or cycles.
fn validate_hierarchy(tenant_id: &str, context: &TenantContext) -> Result<(), RegistryError> {
    let personnel = &context.approval_hierarchy.personnel;
    let by_id: HashMap<&str, &decision_governance_models::Personnel> =
        personnel.iter().map(|p| (p.id.as_str(), p)).collect();

    let mut dangling = Vec::new();
    let mut inverted = Vec::new();
    for person in personnel {
        if let Some(manager_id) = person.reports_to.as_deref() {
            match by_id.get(manager_id) {
                None => dangling.push(person.id.clone()),
                Some(manager) => {
                    if manager.level < person.level {
                        inverted.push(person.id.clone());
                    }
                }
            }
        }
    }

    if !dangling.is_empty() {
        return Err(RegistryError::InvalidHierarchy {
            tenant_id: tenant_id.to_string(),
            detail: format!("unresolved reports_to for [{}]", dangling.join(", ")),
        });
    }
    if !inverted.is_empty() {
        return Err(RegistryError::InvalidHierarchy {
            tenant_id: tenant_id.to_string(),
            detail: format!("level inversion at [{}]", inverted.join(", ")),
        });
    }

    // Cycle detection: walk each reporting chain; a chain longer than the
    // personnel count can only mean a loop.
    let mut cyclic = Vec::new();
    for person in personnel {
        let mut hops = 0usize;
        let mut current = person.reports_to.as_deref();
        while let Some(manager_id) = current {
            hops += 1;
            if hops > personnel.len() {
                cyclic.push(person.id.clone());
                break;
            }
            current = by_id
                .get(manager_id)
                .and_then(|m| m.reports_to.as_deref());
        }
    }
    if !cyclic.is_empty() {
        return Err(RegistryError::InvalidHierarchy {
            tenant_id: tenant_id.to_string(),
            detail: format!("reporting cycle involving [{}]", cyclic.join(", ")),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use decision_governance_models::{
        ApprovalHierarchy, CompanyMeta, Personnel, TenantMetadata,
    };

    fn context_with(personnel: Vec<Personnel>) -> TenantContext {
        TenantContext {
            company: CompanyMeta {
                name: "Test Co".into(),
                industry: "Technology".into(),
                size: "200".into(),
                description: String::new(),
            },
            metadata: TenantMetadata::default(),
            approval_hierarchy: ApprovalHierarchy {
                personnel,
                levels: Vec::new(),
            },
            strategic_goals: Vec::new(),
            risk_tolerance: serde_json::Value::Null,
            governance_rules: Vec::new(),
        }
    }

    fn person(id: &str, level: u8, reports_to: Option<&str>) -> Personnel {
        Personnel {
            id: id.into(),
            name: id.into(),
            role: id.into(),
            level,
            reports_to: reports_to.map(String::from),
        }
    }

    #[test]
    fn valid_hierarchy_loads() {
        let ctx = context_with(vec![
            person("ceo", 4, None),
            person("cfo", 4, Some("ceo")),
            person("manager", 2, Some("cfo")),
        ]);
        let registry = TenantRegistry::from_contexts(vec![("acme".into(), ctx)]).unwrap();
        assert!(registry.contains("acme"));
        assert_eq!(registry.list().len(), 1);
        assert!(registry.get_full("acme").is_some());
    }

    #[test]
    fn reporting_cycle_is_rejected_with_offending_ids() {
        let ctx = context_with(vec![
            person("a", 2, Some("b")),
            person("b", 2, Some("a")),
        ]);
        let err = TenantRegistry::from_contexts(vec![("acme".into(), ctx)]).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("cycle"));
        assert!(message.contains('a') && message.contains('b'));
    }

    #[test]
    fn dangling_reports_to_is_rejected() {
        let ctx = context_with(vec![person("a", 2, Some("ghost"))]);
        let err = TenantRegistry::from_contexts(vec![("acme".into(), ctx)]).unwrap_err();
        assert!(err.to_string().contains("unresolved"));
    }

    #[test]
    fn level_inversion_is_rejected() {
        let ctx = context_with(vec![
            person("lead", 3, None),
            person("exec", 4, Some("lead")),
        ]);
        let err = TenantRegistry::from_contexts(vec![("acme".into(), ctx)]).unwrap_err();
        assert!(err.to_string().contains("level inversion"));
    }

    #[test]
    fn every_listed_tenant_resolves_via_get_full() {
        let registry = TenantRegistry::from_contexts(vec![
            ("one".into(), context_with(vec![person("ceo", 4, None)])),
            ("two".into(), context_with(vec![person("ceo", 4, None)])),
        ])
        .unwrap();
        for summary in registry.list() {
            assert!(registry.get_full(&summary.id).is_some());
        }
    }
}

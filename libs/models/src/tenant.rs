use serde::{Deserialize, Serialize};

use crate::rule::GovernanceRule;

/// Company descriptor block from a tenant JSON file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyMeta {
    pub name: String,
    #[serde(default)]
    pub industry: String,
    #[serde(default)]
    pub size: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TenantMetadata {
    #[serde(default)]
    pub governance_framework: Option<String>,
}

/// One person in the approval hierarchy. `level` runs 1 (closest to the
/// work) through 4 (executive); `reports_to` must resolve to another
/// personnel id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Personnel {
    pub id: String,
    pub name: String,
    pub role: String,
    pub level: u8,
    #[serde(default)]
    pub reports_to: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HierarchyLevel {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApprovalHierarchy {
    #[serde(default)]
    pub personnel: Vec<Personnel>,
    #[serde(default)]
    pub levels: Vec<HierarchyLevel>,
}

impl ApprovalHierarchy {
    pub fn find_by_id(&self, id: &str) -> Option<&Personnel> {
        self.personnel.iter().find(|p| p.id == id)
    }

    pub fn find_by_role(&self, role: &str) -> Option<&Personnel> {
        self.personnel
            .iter()
            .find(|p| p.role.eq_ignore_ascii_case(role))
    }

    pub fn direct_reports(&self, manager_id: &str) -> Vec<&Personnel> {
        self.personnel
            .iter()
            .filter(|p| p.reports_to.as_deref() == Some(manager_id))
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalKpi {
    pub name: String,
    #[serde(default)]
    pub target: Option<String>,
}

/// Company-level strategic goal used for alignment analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategicGoal {
    pub goal_id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub owner_id: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub kpis: Vec<GoalKpi>,
}

/// Full per-tenant governance context, loaded once at boot.
///
/// `risk_tolerance` stays opaque: only the reasoner consumes it and the
/// contract does not constrain its shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantContext {
    pub company: CompanyMeta,
    #[serde(default)]
    pub metadata: TenantMetadata,
    #[serde(default)]
    pub approval_hierarchy: ApprovalHierarchy,
    #[serde(default)]
    pub strategic_goals: Vec<StrategicGoal>,
    #[serde(default)]
    pub risk_tolerance: serde_json::Value,
    #[serde(default)]
    pub governance_rules: Vec<GovernanceRule>,
}

impl TenantContext {
    pub fn active_rules(&self) -> impl Iterator<Item = &GovernanceRule> {
        self.governance_rules.iter().filter(|r| r.active)
    }
}

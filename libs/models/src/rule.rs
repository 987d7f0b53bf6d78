use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::decision::Severity;

/// Rule classification. The set is open-ended: unknown types survive a
/// round-trip through `Other` instead of failing tenant file loads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleType {
    Financial,
    Privacy,
    Compliance,
    Strategic,
    Hr,
    Operational,
    Other(String),
}

impl RuleType {
    pub fn as_str(&self) -> &str {
        match self {
            RuleType::Financial => "financial",
            RuleType::Privacy => "privacy",
            RuleType::Compliance => "compliance",
            RuleType::Strategic => "strategic",
            RuleType::Hr => "hr",
            RuleType::Operational => "operational",
            RuleType::Other(name) => name,
        }
    }

    /// Rule types that always require human review when triggered.
    pub fn forces_review(&self) -> bool {
        matches!(
            self,
            RuleType::Compliance | RuleType::Privacy | RuleType::Strategic | RuleType::Financial
        )
    }
}

impl Serialize for RuleType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RuleType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(match raw.to_ascii_lowercase().as_str() {
            "financial" => RuleType::Financial,
            "privacy" => RuleType::Privacy,
            "compliance" => RuleType::Compliance,
            "strategic" => RuleType::Strategic,
            "hr" => RuleType::Hr,
            "operational" => RuleType::Operational,
            _ => RuleType::Other(raw),
        })
    }
}

/// Comparison operator used in rule conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionOperator {
    #[serde(rename = ">")]
    GreaterThan,
    #[serde(rename = ">=")]
    GreaterOrEqual,
    #[serde(rename = "<")]
    LessThan,
    #[serde(rename = "<=")]
    LessOrEqual,
    #[serde(rename = "==")]
    Equal,
    #[serde(rename = "!=")]
    NotEqual,
    #[serde(rename = "contains")]
    Contains,
    #[serde(rename = "overlaps_with")]
    OverlapsWith,
}

/// A single `{field, operator, value}` triple.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Condition {
    pub field: String,
    pub operator: ConditionOperator,
    #[serde(default)]
    pub value: serde_json::Value,
}

/// Marker for the disjunction form's `operator` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrOperator {
    #[serde(rename = "OR")]
    Or,
}

/// `{operator: "OR", conditions: [...]}` — true when any branch is true.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrCondition {
    pub operator: OrOperator,
    pub conditions: Vec<Condition>,
}

/// Rule condition: either a bare triple or a disjunction of triples.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleCondition {
    Any(OrCondition),
    Single(Condition),
}

/// What happens when a rule triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleAction {
    RequireApproval,
    RequireReview,
    RequireGoalMapping,
    Block,
}

impl RuleAction {
    /// Actions that add a human gate to the approval chain.
    pub fn adds_approver(&self) -> bool {
        matches!(self, RuleAction::RequireApproval | RuleAction::RequireReview)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleConsequence {
    pub action: RuleAction,
    #[serde(default)]
    pub approver_roles: Vec<String>,
    #[serde(default)]
    pub approver_ids: Vec<String>,
    #[serde(default = "default_severity")]
    pub severity: Severity,
}

fn default_severity() -> Severity {
    Severity::Medium
}

/// A single governance rule from a tenant context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GovernanceRule {
    pub rule_id: String,
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub rule_type: RuleType,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub priority: i32,
    pub condition: RuleCondition,
    pub consequence: RuleConsequence,
}

fn default_active() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_condition_deserializes_from_bare_triple() {
        let rule: RuleCondition =
            serde_json::from_str(r#"{"field": "cost", "operator": ">", "value": 50000}"#).unwrap();
        match rule {
            RuleCondition::Single(cond) => {
                assert_eq!(cond.field, "cost");
                assert_eq!(cond.operator, ConditionOperator::GreaterThan);
            }
            RuleCondition::Any(_) => panic!("expected single condition"),
        }
    }

    #[test]
    fn or_condition_deserializes_from_disjunction_form() {
        let raw = r#"{
            "operator": "OR",
            "conditions": [
                {"field": "uses_pii", "operator": "==", "value": true},
                {"field": "target_market", "operator": "contains", "value": "EU"}
            ]
        }"#;
        let rule: RuleCondition = serde_json::from_str(raw).unwrap();
        match rule {
            RuleCondition::Any(or) => assert_eq!(or.conditions.len(), 2),
            RuleCondition::Single(_) => panic!("expected OR condition"),
        }
    }

    #[test]
    fn unknown_rule_type_round_trips_through_other() {
        let parsed: RuleType = serde_json::from_str(r#""environmental""#).unwrap();
        assert_eq!(parsed, RuleType::Other("environmental".to_string()));
        assert_eq!(serde_json::to_string(&parsed).unwrap(), r#""environmental""#);
    }

    #[test]
    fn rule_defaults_active_and_priority() {
        let raw = r#"{
            "rule_id": "R1",
            "name": "Capital expenditure approval",
            "description": "Spending above the capex threshold requires CFO approval",
            "type": "financial",
            "condition": {"field": "cost", "operator": ">=", "value": 50000},
            "consequence": {
                "action": "require_approval",
                "approver_roles": ["CFO"],
                "approver_ids": ["fin_001"],
                "severity": "high"
            }
        }"#;
        let rule: GovernanceRule = serde_json::from_str(raw).unwrap();
        assert!(rule.active);
        assert_eq!(rule.priority, 0);
        assert!(rule.consequence.action.adds_approver());
    }
}

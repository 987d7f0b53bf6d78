use serde::{Deserialize, Deserializer, Serialize};

/// Severity scale shared by risks, rules, and flags.
///
/// Deserialization is case-insensitive because the extraction model may emit
/// capitalized values ("High") while tenant rule files use lowercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }

    /// Risk-score contribution. A single critical risk lands in the "high"
    /// band without requiring many lesser risks.
    pub fn weight(&self) -> f64 {
        match self {
            Severity::Critical => 8.0,
            Severity::High => 3.0,
            Severity::Medium => 1.5,
            Severity::Low => 0.5,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "low" => Some(Severity::Low),
            "medium" => Some(Severity::Medium),
            "high" => Some(Severity::High),
            "critical" => Some(Severity::Critical),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for Severity {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Severity::parse(&raw).ok_or_else(|| {
            serde::de::Error::custom(format!(
                "unknown severity '{raw}' (expected low|medium|high|critical)"
            ))
        })
    }
}

/// Strategic importance classification used for governance routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategicImpact {
    Low,
    Medium,
    High,
    Critical,
}

impl StrategicImpact {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategicImpact::Low => "low",
            StrategicImpact::Medium => "medium",
            StrategicImpact::High => "high",
            StrategicImpact::Critical => "critical",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "low" => Some(StrategicImpact::Low),
            "medium" => Some(StrategicImpact::Medium),
            "high" => Some(StrategicImpact::High),
            "critical" => Some(StrategicImpact::Critical),
            _ => None,
        }
    }

    /// KPIs and goals are only expected when the impact is high or critical.
    pub fn requires_measurables(&self) -> bool {
        matches!(self, StrategicImpact::High | StrategicImpact::Critical)
    }
}

impl<'de> Deserialize<'de> for StrategicImpact {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        StrategicImpact::parse(&raw).ok_or_else(|| {
            serde::de::Error::custom(format!(
                "unknown strategic impact '{raw}' (expected low|medium|high|critical)"
            ))
        })
    }
}

/// Counterparty classification for related-party transaction rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CounterpartyRelation {
    RelatedParty,
}

/// Policy change classification for retroactivity rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyChangeType {
    Retroactive,
}

/// Organizational goal targeted by the decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
    pub description: String,
    #[serde(default)]
    pub metric: Option<String>,
}

/// Key performance indicator for decision success.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Kpi {
    pub name: String,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub measurement_frequency: Option<String>,
}

/// Potential failure vector or constraint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Risk {
    pub description: String,
    #[serde(default)]
    pub severity: Option<Severity>,
    #[serde(default)]
    pub mitigation: Option<String>,
}

/// Accountable individual or role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Owner {
    pub name: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub responsibility: Option<String>,
}

/// Implicit belief underlying the decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assumption {
    pub description: String,
    #[serde(default)]
    pub criticality: Option<String>,
}

/// Structured representation of an input decision.
///
/// Governance-trigger attributes are extracted by the LLM (or left null) so
/// the rule engine can evaluate conditions without re-parsing the input text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decision {
    pub statement: String,
    #[serde(default)]
    pub goals: Vec<Goal>,
    #[serde(default)]
    pub kpis: Vec<Kpi>,
    #[serde(default)]
    pub risks: Vec<Risk>,
    #[serde(default)]
    pub owners: Vec<Owner>,
    #[serde(default)]
    pub assumptions: Vec<Assumption>,
    pub confidence: f64,

    // Governance-trigger attributes
    #[serde(default)]
    pub cost: Option<f64>,
    #[serde(default)]
    pub cost_estimate_range: Option<String>,
    #[serde(default)]
    pub uses_pii: Option<bool>,
    #[serde(default)]
    pub target_market: Option<String>,
    #[serde(default)]
    pub launch_date: Option<bool>,
    #[serde(default)]
    pub involves_hiring: Option<bool>,
    #[serde(default)]
    pub headcount_change: Option<i64>,
    #[serde(default)]
    pub involves_compliance_risk: Option<bool>,
    #[serde(default)]
    pub counterparty_relation: Option<CounterpartyRelation>,
    #[serde(default)]
    pub policy_change_type: Option<PolicyChangeType>,
    #[serde(default)]
    pub strategic_impact: Option<StrategicImpact>,

    /// Derived 0-10 score; computed by the rule engine when absent.
    #[serde(default)]
    pub risk_score: Option<f64>,
}

impl Decision {
    /// Minimal valid decision used when extraction fails completely.
    pub fn fallback(input_text: &str) -> Self {
        let truncated: String = input_text.chars().take(100).collect();
        Decision {
            statement: format!("[EXTRACTION FAILED] {truncated}..."),
            goals: Vec::new(),
            kpis: Vec::new(),
            risks: Vec::new(),
            owners: Vec::new(),
            assumptions: Vec::new(),
            confidence: 0.1,
            cost: None,
            cost_estimate_range: None,
            uses_pii: None,
            target_market: None,
            launch_date: None,
            involves_hiring: None,
            headcount_change: None,
            involves_compliance_risk: None,
            counterparty_relation: None,
            policy_change_type: None,
            strategic_impact: None,
            risk_score: None,
        }
    }

    /// Basic range validation applied after LLM extraction.
    pub fn validate(&self) -> Result<(), String> {
        let statement_len = self.statement.chars().count();
        if statement_len < 10 || statement_len > 1000 {
            return Err(format!(
                "statement length {statement_len} outside 10..=1000"
            ));
        }
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(format!("confidence {} outside 0..=1", self.confidence));
        }
        if let Some(score) = self.risk_score {
            if !(0.0..=10.0).contains(&score) {
                return Err(format!("risk_score {score} outside 0..=10"));
            }
        }
        Ok(())
    }
}

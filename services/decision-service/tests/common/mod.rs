#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;

use decision_governance_models::{
    Decision, Goal, Kpi, Owner, Risk, Severity, StrategicImpact, TenantContext,
};

fn data_path(tenant_id: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../data")
        .join(format!("{tenant_id}.json"))
}

pub fn load_tenant(tenant_id: &str) -> TenantContext {
    let raw = fs::read_to_string(data_path(tenant_id))
        .unwrap_or_else(|_| panic!("tenant file for '{tenant_id}' should exist"));
    serde_json::from_str(&raw)
        .unwrap_or_else(|err| panic!("tenant file for '{tenant_id}' should parse: {err}"))
}

pub fn decision(statement: &str) -> Decision {
    Decision {
        statement: statement.to_string(),
        goals: Vec::new(),
        kpis: Vec::new(),
        risks: Vec::new(),
        owners: Vec::new(),
        assumptions: Vec::new(),
        confidence: 0.9,
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

pub fn goal(description: &str) -> Goal {
    Goal {
        description: description.to_string(),
        metric: None,
    }
}

pub fn kpi(name: &str) -> Kpi {
    Kpi {
        name: name.to_string(),
        target: None,
        measurement_frequency: None,
    }
}

pub fn risk(description: &str, severity: Severity, mitigation: Option<&str>) -> Risk {
    Risk {
        description: description.to_string(),
        severity: Some(severity),
        mitigation: mitigation.map(String::from),
    }
}

pub fn owner(name: &str, role: Option<&str>) -> Owner {
    Owner {
        name: name.to_string(),
        role: role.map(String::from),
        responsibility: None,
    }
}

/// The six seed scenarios share these decision shapes.
pub fn compliant_tooling_decision() -> Decision {
    let mut d = decision("Upgrade development tools to latest versions for improved productivity");
    d.owners = vec![owner("Engineering Manager", Some("Engineering Manager"))];
    d.goals = vec![goal("Improve developer productivity")];
    d.risks = vec![risk(
        "Minor disruption during rollout",
        Severity::Low,
        Some("Staged rollout per team"),
    )];
    d.strategic_impact = Some(StrategicImpact::Low);
    d
}

pub fn acquisition_decision() -> Decision {
    let mut d = decision("Strategic acquisition of DataCorp for $3.5M to expand analytics capabilities");
    d.owners = vec![owner("VP of Engineering", Some("VP of Engineering"))];
    d.goals = vec![goal("Expand analytics product line")];
    d.kpis = vec![kpi("analytics revenue")];
    d.risks = vec![
        risk(
            "Key personnel may leave post-acquisition",
            Severity::Critical,
            Some("Retention packages"),
        ),
        risk(
            "Integration challenges with existing systems",
            Severity::High,
            Some("Dedicated integration team"),
        ),
    ];
    d.cost = Some(3_500_000.0);
    d.strategic_impact = Some(StrategicImpact::High);
    d.confidence = 0.8;
    d
}

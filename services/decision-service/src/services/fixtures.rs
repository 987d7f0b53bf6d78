use crate::models::Fixture;

/// Demo decision scenarios per tenant. The console picks randomly from the
/// returned list; the server never randomizes.
pub fn fixtures_for(tenant_id: &str) -> Option<Vec<Fixture>> {
    let fixtures = match tenant_id {
        "helios_industries" => vec![
            fixture(
                "T01",
                tenant_id,
                "Marketing budget overrun",
                "Request an additional $250K in advertising spend to grow North American market share. The department has $50K of budget remaining this quarter and the company KPI is global expansion.",
                &["Financial", "Budget", "Marketing"],
            ),
            fixture(
                "T02",
                tenant_id,
                "Related-party partnership",
                "Sign a supply partnership with Zephyr Components, a firm operated by a board member's relative. A board connection has been identified and a conflict-of-interest review is needed.",
                &["Compliance", "Ethics", "Related Party"],
            ),
            fixture(
                "T03",
                tenant_id,
                "Unvetted SaaS rollout",
                "Adopt an external AI CRM without a security review. Customer personal data would be exposed to the vendor, violating the IT governance policy on third-party data processors.",
                &["IT Security", "PII", "Compliance"],
            ),
            fixture(
                "T04",
                tenant_id,
                "R&D hiring against cost targets",
                "Rapidly hire 20 R&D engineers while the company is in a cost-reduction cycle. This conflicts with the Q1 operating-cost KPI of minus 10 percent and needs strategic realignment.",
                &["HR", "Strategic", "Cost"],
            ),
            fixture(
                "T05",
                tenant_id,
                "Client entertainment above the limit",
                "Approve client entertainment of $400 per person for a key account dinner. The corporate policy cap is $150 per person and there is an anti-bribery exposure concern.",
                &["Compliance", "Ethics", "Expense"],
            ),
        ],
        "bayview_medical" => vec![
            fixture(
                "H01",
                tenant_id,
                "MRI scanner replacement",
                "Purchase a replacement MRI scanner for the imaging department. The current unit is past end-of-life and service contracts lapse next quarter.",
                &["Financial", "Equipment", "Clinical"],
            ),
            fixture(
                "H02",
                tenant_id,
                "Patient data analytics vendor",
                "Engage an external analytics vendor to process patient health records for readmission prediction. Records include identifiable patient data subject to privacy regulation.",
                &["Privacy", "PII", "Clinical Data"],
            ),
            fixture(
                "H03",
                tenant_id,
                "Emergency department fast-track",
                "Launch a fast-track triage protocol in the emergency department in two weeks without completing the patient safety review, to reduce wait times before the winter peak.",
                &["Clinical", "Safety", "Launch"],
            ),
            fixture(
                "H04",
                tenant_id,
                "Nursing staff expansion",
                "Hire 15 additional nurses for the new outpatient wing, including onboarding and credentialing, to meet the staffing ratio targets.",
                &["HR", "Staffing"],
            ),
        ],
        "harbor_gsa" => vec![
            fixture(
                "G01",
                tenant_id,
                "Fleet electrification pilot",
                "Replace 40 agency fleet vehicles with electric models over the next fiscal year, including charging infrastructure at three depots.",
                &["Financial", "Procurement", "Sustainability"],
            ),
            fixture(
                "G02",
                tenant_id,
                "Retroactive vendor penalty waiver",
                "Waive late-delivery penalties for contracts closed last fiscal year, applying the new leniency policy retroactively to already-settled transactions.",
                &["Policy", "Retroactive", "Procurement"],
            ),
            fixture(
                "G03",
                tenant_id,
                "Citizen portal launch",
                "Launch the new citizen services portal statewide next month. The portal collects resident contact details and service histories.",
                &["Launch", "PII", "Digital Services"],
            ),
        ],
        _ => return None,
    };
    Some(fixtures)
}

fn fixture(id: &str, company_id: &str, title: &str, text: &str, tags: &[&str]) -> Fixture {
    Fixture {
        id: id.to_string(),
        company_id: company_id.to_string(),
        title: title.to_string(),
        text: text.to_string(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
    }
}

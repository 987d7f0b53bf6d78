use actix_web::{get, web, HttpResponse, Responder};

use decision_governance_common::{AppError, Result};

use crate::models::{CompanyDetailResponse, CompanyListResponse, StrategicGoalSummary};
use crate::state::AppState;

#[get("/companies")]
async fn list_companies(state: web::Data<AppState>) -> impl Responder {
    let companies = state.tenants.list();
    let total = companies.len();
    HttpResponse::Ok().json(CompanyListResponse { companies, total })
}

#[get("/companies/{company_id}")]
async fn get_company(
    state: web::Data<AppState>,
    company_id: web::Path<String>,
) -> Result<impl Responder> {
    let company_id = company_id.into_inner();
    let summary = state
        .tenants
        .get_summary(&company_id)
        .ok_or_else(|| AppError::NotFound(format!("Company '{company_id}' not found")))?;
    let context = state
        .tenants
        .get_full(&company_id)
        .ok_or_else(|| AppError::NotFound(format!("Company '{company_id}' not found")))?;

    let chain_summary = context
        .approval_hierarchy
        .levels
        .iter()
        .take(4)
        .map(|level| level.title.as_str())
        .collect::<Vec<_>>()
        .join(" > ");

    Ok(HttpResponse::Ok().json(CompanyDetailResponse {
        id: summary.id,
        name: summary.name,
        industry: summary.industry,
        size: summary.size,
        governance_framework: summary.governance_framework,
        description: context.company.description.clone(),
        approval_chain_summary: chain_summary,
        total_governance_rules: context.governance_rules.len(),
        strategic_goals: context
            .strategic_goals
            .iter()
            .map(|goal| StrategicGoalSummary {
                goal_id: goal.goal_id.clone(),
                name: goal.name.clone(),
                owner_id: goal.owner_id.clone(),
                priority: goal.priority.clone(),
            })
            .collect(),
        approval_hierarchy: context.approval_hierarchy.clone(),
    }))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_companies).service(get_company);
}

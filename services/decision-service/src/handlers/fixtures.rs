use actix_web::{get, web, HttpResponse, Responder};
use serde::Deserialize;

use decision_governance_common::{AppError, Result};

use crate::services::fixtures::fixtures_for;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct FixturesQuery {
    company_id: String,
}

#[get("/fixtures")]
async fn list_fixtures(
    state: web::Data<AppState>,
    query: web::Query<FixturesQuery>,
) -> Result<impl Responder> {
    let company_id = &query.company_id;
    if !state.tenants.contains(company_id) {
        return Err(AppError::NotFound(format!(
            "Company '{company_id}' not found"
        )));
    }
    let fixtures = fixtures_for(company_id).unwrap_or_default();
    Ok(HttpResponse::Ok().json(fixtures))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_fixtures);
}

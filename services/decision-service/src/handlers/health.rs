use actix_web::{get, web, HttpResponse, Responder};
use serde::Serialize;

use crate::services::graph_store::GraphStats;
use crate::state::AppState;

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    service: String,
    version: String,
    tenants_loaded: usize,
    decisions_tracked: usize,
    graph_stats: GraphStats,
}

#[get("/health")]
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        tenants_loaded: state.tenants.list().len(),
        decisions_tracked: state.store.len(),
        graph_stats: state.graph.stats(),
    })
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health_check);
}

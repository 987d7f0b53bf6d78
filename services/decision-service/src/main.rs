use std::sync::Arc;
use std::time::Duration;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use decision_service::config::Config;
use decision_service::handlers;
use decision_service::services::decision_store::DecisionStore;
use decision_service::services::deep_reasoner::DeepReasoner;
use decision_service::services::extractor::Extractor;
use decision_service::services::graph_store::GraphStore;
use decision_service::services::llm_client::LlmClient;
use decision_service::services::pipeline::{spawn_workers, PipelineContext};
use decision_service::services::tenant_registry::TenantRegistry;
use decision_service::state::AppState;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    dotenv::dotenv().ok();
    let config = Config::from_env().expect("Failed to load configuration");

    info!("Starting decision-service on {}:{}", config.host, config.port);

    // Tenant contexts are loaded once; an invalid hierarchy is a boot error.
    let tenants = Arc::new(
        TenantRegistry::load(&config.data_dir).expect("Failed to load tenant contexts"),
    );

    let store = Arc::new(DecisionStore::new());
    let graph = Arc::new(GraphStore::new());

    // Missing API keys degrade to deterministic paths instead of failing.
    let llm_client = match Config::llm_api_key() {
        Some(key) => Some(LlmClient::new(
            config.llm_base_url.clone(),
            key,
            config.llm_model.clone(),
        )),
        None => {
            warn!("LLM_API_KEY not set - extraction will use the fallback path");
            None
        }
    };
    let extractor = Arc::new(Extractor::new(llm_client, config.extraction_max_retries));

    let deep_reasoner = match Config::deep_reasoner_api_key() {
        Some(key) => Some(Arc::new(DeepReasoner::new(
            config.deep_reasoner_base_url.clone(),
            key,
            config.deep_reasoner_model.clone(),
        ))),
        None => {
            warn!("DEEP_REASONER_API_KEY not set - reasoning will be deterministic");
            None
        }
    };

    // Pipeline worker pool
    let pipeline_ctx = Arc::new(PipelineContext {
        tenants: tenants.clone(),
        store: store.clone(),
        graph: graph.clone(),
        extractor,
        deep_reasoner,
        timeout: Duration::from_secs(config.pipeline_timeout_secs),
    });
    let jobs = spawn_workers(pipeline_ctx, config.worker_count);

    let state = AppState {
        config: config.clone(),
        tenants,
        store,
        graph,
        jobs,
    };

    // Start HTTP server
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(Cors::permissive())
            .wrap(tracing_actix_web::TracingLogger::default())
            .configure(handlers::configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}

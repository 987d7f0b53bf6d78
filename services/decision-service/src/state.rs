use std::sync::Arc;

use tokio::sync::mpsc;

use crate::config::Config;
use crate::services::decision_store::DecisionStore;
use crate::services::graph_store::GraphStore;
use crate::services::pipeline::Job;
use crate::services::tenant_registry::TenantRegistry;

/// Application state carried through handlers via `web::Data`.
///
/// Every component is constructed in `main` and injected; there are no
/// module-level globals.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub tenants: Arc<TenantRegistry>,
    pub store: Arc<DecisionStore>,
    pub graph: Arc<GraphStore>,
    pub jobs: mpsc::Sender<Job>,
}

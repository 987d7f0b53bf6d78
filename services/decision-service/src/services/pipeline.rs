use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{mpsc, Mutex};
use tokio::time::timeout;
use tracing::{error, info, warn};

use decision_governance_models::{Decision, DecisionStatus, DerivedAttributes};

use super::decision_store::{DecisionStore, StageOutputs};
use super::deep_reasoner::DeepReasoner;
use super::extractor::Extractor;
use super::governance::{apply_optimized_chain, evaluate_governance};
use super::graph_store::GraphStore;
use super::pack::{build_decision_pack, determine_risk_level};
use super::reasoning::analyze;
use super::subgraph::build_subgraph;
use super::tenant_registry::TenantRegistry;

/// Unit of work for the pipeline worker pool.
#[derive(Debug)]
pub struct Job {
    pub decision_id: String,
}

/// Everything a worker needs to run a pipeline end to end.
pub struct PipelineContext {
    pub tenants: Arc<TenantRegistry>,
    pub store: Arc<DecisionStore>,
    pub graph: Arc<GraphStore>,
    pub extractor: Arc<Extractor>,
    pub deep_reasoner: Option<Arc<DeepReasoner>>,
    pub timeout: Duration,
}

/// Spawn the bounded worker pool and return the job queue sender.
///
/// Workers share one receiver behind a mutex; the channel bound provides
/// backpressure if submissions outpace processing.
pub fn spawn_workers(ctx: Arc<PipelineContext>, worker_count: usize) -> mpsc::Sender<Job> {
    let (tx, rx) = mpsc::channel::<Job>(64);
    let rx = Arc::new(Mutex::new(rx));

    for worker_id in 0..worker_count.max(1) {
        let rx = rx.clone();
        let ctx = ctx.clone();
        tokio::spawn(async move {
            loop {
                let job = {
                    let mut rx = rx.lock().await;
                    rx.recv().await
                };
                let Some(job) = job else {
                    // Channel closed: service is shutting down.
                    break;
                };
                info!(worker_id, decision_id = %job.decision_id, "worker picked up job");
                run_pipeline(&ctx, &job.decision_id).await;
            }
        });
    }

    tx
}

/// Run the five-stage pipeline for one decision.
///
/// Stage failures inside the extractor and reasoner degrade rather than
/// abort; graph upsert failure is logged and skipped. Only errors at this
/// level (missing tenant, wall-clock budget exhaustion) mark the record
/// failed.
pub async fn run_pipeline(ctx: &PipelineContext, decision_id: &str) {
    if let Err(message) = run_pipeline_inner(ctx, decision_id).await {
        error!(decision_id, %message, "pipeline failed");
        ctx.store.store_error(decision_id, message);
    }
}

async fn run_pipeline_inner(ctx: &PipelineContext, decision_id: &str) -> Result<(), String> {
    let Some(record) = ctx.store.get(decision_id) else {
        return Err("decision record not found".to_string());
    };
    let started = Instant::now();

    // Step 0 -> 1: extraction. Runs on the worker, never on the request
    // executor, so the SSE loop stays responsive during the LLM call.
    ctx.store
        .update_status(decision_id, DecisionStatus::Processing, Some(0));
    info!(decision_id, "step 1: extraction");

    let extraction = timeout(ctx.timeout, ctx.extractor.extract(&record.input_text, decision_id))
        .await
        .map_err(|_| format!("pipeline timed out during extraction after {:?}", ctx.timeout))?;

    if extraction.used_fallback() {
        warn!(decision_id, "extraction fell back - decision is marked for mandatory review");
    }
    let mut decision: Decision = extraction.decision;

    ctx.store.store_results(
        decision_id,
        StageOutputs {
            decision: Some(decision.clone()),
            extraction_metadata: Some(extraction.metadata),
            ..StageOutputs::default()
        },
    );
    ctx.store
        .update_status(decision_id, DecisionStatus::Processing, Some(1));
    info!(decision_id, "step 1 complete -> extraction_complete");

    // Step 1 -> 2: rule evaluation plus graph upsert. Both map to the
    // client-visible "policy_complete" step.
    let tenant = ctx
        .tenants
        .get_full(&record.tenant_id)
        .ok_or_else(|| format!("tenant '{}' disappeared from the registry", record.tenant_id))?;
    let tenant_raw = ctx.tenants.get_raw(&record.tenant_id);

    info!(
        decision_id,
        cost = ?decision.cost,
        uses_pii = ?decision.uses_pii,
        strategic_impact = ?decision.strategic_impact,
        "step 2: governance evaluation"
    );
    let mut governance = evaluate_governance(&decision, tenant, tenant_raw);
    if decision.risk_score.is_none() {
        decision.risk_score = Some(governance.computed_risk_score);
    }

    // Deep governance: when requested and at least two rules fired, let the
    // analyzer resolve overlaps and sequence the chain. Any failure keeps
    // the deterministic chain - the analyzer is an accelerator, not a gate.
    if record.use_deep_governance && governance.triggered_rules.len() >= 2 {
        if let Some(reasoner) = ctx.deep_reasoner.as_deref() {
            let remaining = ctx.timeout.saturating_sub(started.elapsed());
            match timeout(
                remaining,
                reasoner.optimize_approval_chain(&decision, &governance, tenant),
            )
            .await
            {
                Ok(Ok(optimization)) => {
                    if let Some(chain) = apply_optimized_chain(
                        &governance.approval_chain,
                        &optimization,
                        tenant,
                    ) {
                        info!(decision_id, steps = chain.len(), "approval chain optimized");
                        governance.approval_chain = chain;
                    }
                }
                Ok(Err(err)) => {
                    warn!(decision_id, %err, "chain optimization failed - keeping deterministic chain");
                }
                Err(_) => {
                    warn!(decision_id, "chain optimization timed out - keeping deterministic chain");
                }
            }
        }
    }

    let derived = DerivedAttributes {
        risk_level: determine_risk_level(&governance),
        confidence: decision.confidence,
        strategic_impact: decision
            .strategic_impact
            .map(|impact| impact.as_str())
            .unwrap_or("not_specified")
            .to_string(),
        completeness_score: Some(completeness_score(&decision)),
    };

    ctx.store.store_results(
        decision_id,
        StageOutputs {
            governance: Some(governance.clone()),
            derived_attributes: Some(derived),
            ..StageOutputs::default()
        },
    );

    match ctx
        .graph
        .upsert_decision_graph(&decision, &governance, decision_id)
    {
        Ok(decision_graph) => {
            info!(
                decision_id,
                nodes = decision_graph.metadata.node_count,
                edges = decision_graph.metadata.edge_count,
                "step 2b: graph upserted"
            );
            ctx.store.store_results(
                decision_id,
                StageOutputs {
                    graph_payload: Some(decision_graph),
                    ..StageOutputs::default()
                },
            );
        }
        Err(err) => {
            // Non-fatal: reasoning degrades to the tenant-only subgraph.
            warn!(decision_id, %err, "graph upsert failed (non-fatal)");
        }
    }
    ctx.store
        .update_status(decision_id, DecisionStatus::Processing, Some(2));
    info!(decision_id, "step 2 complete -> policy_complete");

    // Step 2 -> 3: subgraph extraction plus reasoning.
    let graph_context = ctx.graph.get_context(decision_id, 2);
    let subgraph = build_subgraph(decision_id, &decision, tenant, Some(&graph_context));

    let remaining = ctx.timeout.saturating_sub(started.elapsed());
    let reasoning = timeout(
        remaining,
        analyze(
            decision_id,
            &decision,
            &governance,
            subgraph,
            ctx.deep_reasoner.as_deref(),
            record.use_deep_reasoning,
        ),
    )
    .await
    .map_err(|_| format!("pipeline timed out during reasoning after {:?}", ctx.timeout))?;

    ctx.store.store_results(
        decision_id,
        StageOutputs {
            reasoning: Some(reasoning.clone()),
            ..StageOutputs::default()
        },
    );
    ctx.store
        .update_status(decision_id, DecisionStatus::Processing, Some(3));
    info!(decision_id, "step 3 complete -> reasoning_complete");

    // Step 3 -> 4: decision pack.
    let pack = build_decision_pack(&decision, &governance, tenant, Some(&reasoning));
    ctx.store.store_results(
        decision_id,
        StageOutputs {
            decision_pack: Some(pack),
            ..StageOutputs::default()
        },
    );
    ctx.store
        .update_status(decision_id, DecisionStatus::Complete, Some(4));
    info!(decision_id, elapsed = ?started.elapsed(), "pipeline complete");

    Ok(())
}

/// Fraction of the expected decision sections that were populated.
fn completeness_score(decision: &Decision) -> f64 {
    let sections = [
        !decision.goals.is_empty(),
        !decision.kpis.is_empty(),
        !decision.risks.is_empty(),
        !decision.owners.is_empty(),
        !decision.assumptions.is_empty(),
    ];
    let populated = sections.iter().filter(|present| **present).count();
    populated as f64 / sections.len() as f64
}

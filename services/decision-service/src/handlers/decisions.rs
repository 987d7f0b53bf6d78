use std::convert::Infallible;
use std::time::Duration;

use actix_web::web::Bytes;
use actix_web::{get, post, web, HttpResponse, Responder};
use serde::Serialize;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::info;
use validator::Validate;

use decision_governance_common::{AppError, Result};
use decision_governance_models::DecisionStatus;

use crate::models::{
    CreateDecisionRequest, CreateDecisionResponse, SseCompleteEvent, SseErrorEvent, SseStepEvent,
};
use crate::services::normalizer::build_console_payload;
use crate::services::pipeline::Job;
use crate::state::AppState;

/// POST /v1/decisions - submit a decision for async governance evaluation.
///
/// Returns 202 immediately; connect to the stream URL for progress and
/// fetch the decision once the stream emits `complete`.
#[post("/decisions")]
async fn submit_decision(
    state: web::Data<AppState>,
    request: web::Json<CreateDecisionRequest>,
) -> Result<impl Responder> {
    request
        .validate()
        .map_err(|err| AppError::Validation(err.to_string()))?;

    if !state.tenants.contains(&request.tenant_id) {
        let known = state
            .tenants
            .list()
            .into_iter()
            .map(|summary| summary.id)
            .collect::<Vec<_>>()
            .join(", ");
        return Err(AppError::Validation(format!(
            "Unknown tenant_id '{}'. Valid: {known}",
            request.tenant_id
        )));
    }

    let record = state.store.create(
        &request.tenant_id,
        &request.input_text,
        request.use_deep_governance,
        request.use_deep_reasoning,
    );

    state
        .jobs
        .send(Job {
            decision_id: record.decision_id.clone(),
        })
        .await
        .map_err(|_| AppError::Internal("pipeline worker pool is not running".to_string()))?;

    info!(
        decision_id = %record.decision_id,
        tenant_id = %request.tenant_id,
        "decision submitted"
    );

    Ok(HttpResponse::Accepted().json(CreateDecisionResponse {
        stream_url: format!("/v1/decisions/{}/stream", record.decision_id),
        decision_id: record.decision_id,
        status: DecisionStatus::Pending,
        message: "Decision submitted for governance evaluation".to_string(),
    }))
}

/// GET /v1/decisions/{id} - full console payload. Sections for stages
/// that have not completed yet are null.
#[get("/decisions/{decision_id}")]
async fn get_decision(
    state: web::Data<AppState>,
    decision_id: web::Path<String>,
) -> Result<impl Responder> {
    let decision_id = decision_id.into_inner();
    let record = state
        .store
        .get(&decision_id)
        .ok_or_else(|| AppError::NotFound(format!("Decision '{decision_id}' not found")))?;

    Ok(HttpResponse::Ok().json(build_console_payload(&record, &state.tenants)))
}

/// GET /v1/decisions/{id}/stream - SSE progress stream.
///
/// One `step` event per completed stage (paced so clients can render),
/// then a terminal `complete` or `error`, then the connection closes.
/// Client disconnect ends the generator but never cancels the pipeline.
#[get("/decisions/{decision_id}/stream")]
async fn stream_decision(
    state: web::Data<AppState>,
    decision_id: web::Path<String>,
) -> Result<impl Responder> {
    let decision_id = decision_id.into_inner();
    if state.store.get(&decision_id).is_none() {
        return Err(AppError::NotFound(format!(
            "Decision '{decision_id}' not found"
        )));
    }

    let (tx, rx) = mpsc::channel::<std::result::Result<Bytes, Infallible>>(16);
    let store = state.store.clone();
    let pace = Duration::from_millis(state.config.sse_pace_ms);

    tokio::spawn(async move {
        let notify = store.notifier(&decision_id);
        let mut last_step: u8 = 0;

        loop {
            let Some(record) = store.get(&decision_id) else {
                let event = SseErrorEvent {
                    decision_id: decision_id.clone(),
                    status: DecisionStatus::Failed,
                    message: "Decision record not found".to_string(),
                };
                let _ = tx.send(Ok(sse_frame("error", &event))).await;
                break;
            };

            // Step events fire AFTER each stage completes, so the data is
            // ready by the time the event arrives. Cap at 3: step 4 is the
            // terminal `complete` event. Pacing keeps the client rendering
            // one step at a time even when the pipeline finishes faster.
            while last_step < record.current_step && last_step < 3 {
                last_step += 1;
                let (label, message) = step_description(last_step);
                let event = SseStepEvent {
                    decision_id: decision_id.clone(),
                    step: last_step,
                    label: label.to_string(),
                    message: message.to_string(),
                };
                if tx.send(Ok(sse_frame("step", &event))).await.is_err() {
                    info!(%decision_id, "SSE client disconnected");
                    return;
                }
                tokio::time::sleep(pace).await;
            }

            match record.status {
                DecisionStatus::Complete => {
                    let event = SseCompleteEvent {
                        decision_id: decision_id.clone(),
                        status: DecisionStatus::Complete,
                        result_url: format!("/v1/decisions/{decision_id}"),
                    };
                    let _ = tx.send(Ok(sse_frame("complete", &event))).await;
                    break;
                }
                DecisionStatus::Failed => {
                    let event = SseErrorEvent {
                        decision_id: decision_id.clone(),
                        status: DecisionStatus::Failed,
                        message: record
                            .error
                            .unwrap_or_else(|| "Pipeline failed".to_string()),
                    };
                    let _ = tx.send(Ok(sse_frame("error", &event))).await;
                    break;
                }
                _ => {}
            }

            // Wake on the record's notifier; the sleep arm is a safety net
            // in case a notification is missed between the get and here.
            match &notify {
                Some(notify) => {
                    tokio::select! {
                        _ = notify.notified() => {}
                        _ = tokio::time::sleep(pace) => {}
                    }
                }
                None => tokio::time::sleep(pace).await,
            }
        }
    });

    Ok(HttpResponse::Ok()
        .content_type("text/event-stream")
        .insert_header(("Cache-Control", "no-cache"))
        .insert_header(("X-Accel-Buffering", "no"))
        .streaming(ReceiverStream::new(rx)))
}

fn step_description(step: u8) -> (&'static str, &'static str) {
    match step {
        1 => ("extracting", "Decision entities extracted"),
        2 => (
            "evaluating_governance",
            "Policy evaluation and graph mapping complete",
        ),
        _ => ("reasoning", "Reasoning analysis complete"),
    }
}

fn sse_frame<T: Serialize>(event: &str, data: &T) -> Bytes {
    let json = serde_json::to_string(data).unwrap_or_else(|_| "{}".to_string());
    Bytes::from(format!("event: {event}\ndata: {json}\n\n"))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(submit_decision)
        .service(get_decision)
        .service(stream_decision);
}

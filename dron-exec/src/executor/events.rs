use async_trait::async_trait;
use serde_json::json;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::executor::request::ResolvedRequest;
use crate::executor::resolver::ExtractionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Succeeded,
    Failed,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Succeeded => "succeeded",
            RunStatus::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone)]
pub enum Event {
    RunStarted {
        run_id: Uuid,
        steps: usize,
    },
    StepStarted {
        run_id: Uuid,
        step_id: String,
    },
    StepCompleted {
        run_id: Uuid,
        step_id: String,
        request: ResolvedRequest,
        response: String,
        /// Raised while this step's response filled later steps, or while its params were bound.
        extraction_errors: Vec<ExtractionError>,
        /// Placeholders still in the request when it was sent.
        unresolved: Vec<String>,
    },
    StepFailed {
        run_id: Uuid,
        step_id: Option<String>,
        kind: &'static str,
        error: String,
    },
    RunFinished {
        run_id: Uuid,
        status: RunStatus,
        executed: usize,
    },
}

impl Event {
    pub fn run_id(&self) -> Uuid {
        match self {
            Event::RunStarted { run_id, .. }
            | Event::StepStarted { run_id, .. }
            | Event::StepCompleted { run_id, .. }
            | Event::StepFailed { run_id, .. }
            | Event::RunFinished { run_id, .. } => *run_id,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Event::RunStarted { .. } => "run.started",
            Event::StepStarted { .. } => "step.started",
            Event::StepCompleted { .. } => "step.completed",
            Event::StepFailed { .. } => "step.failed",
            Event::RunFinished { .. } => "run.finished",
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        let ty = self.type_name();
        match self {
            Event::RunStarted { run_id, steps } => {
                json!({ "type": ty, "run_id": run_id.to_string(), "steps": steps })
            }
            Event::StepStarted { run_id, step_id } => {
                json!({ "type": ty, "run_id": run_id.to_string(), "step_id": step_id })
            }
            Event::StepCompleted {
                run_id,
                step_id,
                request,
                response,
                extraction_errors,
                unresolved,
            } => {
                json!({
                    "type": ty,
                    "run_id": run_id.to_string(),
                    "step_id": step_id,
                    "request": request,
                    "response": response,
                    "extraction_errors": extraction_errors
                        .iter()
                        .map(|e| json!({ "message": e.to_string(), "detail": e }))
                        .collect::<Vec<_>>(),
                    "unresolved": unresolved,
                })
            }
            Event::StepFailed {
                run_id,
                step_id,
                kind,
                error,
            } => {
                json!({ "type": ty, "run_id": run_id.to_string(), "step_id": step_id, "kind": kind, "error": error })
            }
            Event::RunFinished {
                run_id,
                status,
                executed,
            } => {
                json!({ "type": ty, "run_id": run_id.to_string(), "status": status.as_str(), "executed": executed })
            }
        }
    }
}

/// Receives run progress. The engine's only coupling to whatever displays or stores it.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn emit(&self, event: Event);
}

/// Fans each event out to independently added sinks.
pub struct CompositeEventSink {
    sinks: Vec<Box<dyn EventSink>>,
}

impl Default for CompositeEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl CompositeEventSink {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn add(&mut self, sink: Box<dyn EventSink>) {
        self.sinks.push(sink);
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

#[async_trait]
impl EventSink for CompositeEventSink {
    async fn emit(&self, event: Event) {
        for sink in &self.sinks {
            sink.emit(event.clone()).await;
        }
    }
}

/// One JSON object per line on stdout.
pub struct StdoutEventSink;

#[async_trait]
impl EventSink for StdoutEventSink {
    async fn emit(&self, event: Event) {
        println!("{}", serde_json::to_string(&event.to_json()).unwrap_or_default());
    }
}

/// Structured log lines through `tracing`.
pub struct TracingEventSink;

#[async_trait]
impl EventSink for TracingEventSink {
    async fn emit(&self, event: Event) {
        match &event {
            Event::RunStarted { run_id, steps } => {
                tracing::info!(%run_id, steps, "run started");
            }
            Event::StepStarted { run_id, step_id } => {
                tracing::debug!(%run_id, %step_id, "step started");
            }
            Event::StepCompleted {
                run_id,
                step_id,
                request,
                response,
                extraction_errors,
                unresolved,
            } => {
                tracing::info!(
                    %run_id,
                    %step_id,
                    method = %request.method,
                    url = %request.url,
                    response_bytes = response.len(),
                    "step completed"
                );
                for e in extraction_errors {
                    tracing::warn!(%run_id, %step_id, error = %e, "placeholder left unresolved");
                }
                if !unresolved.is_empty() {
                    tracing::warn!(%run_id, %step_id, ?unresolved, "request sent with unresolved placeholders");
                }
            }
            Event::StepFailed {
                run_id,
                step_id,
                kind,
                error,
            } => {
                tracing::error!(%run_id, ?step_id, kind, %error, "step failed");
            }
            Event::RunFinished {
                run_id,
                status,
                executed,
            } => {
                tracing::info!(%run_id, status = status.as_str(), executed, "run finished");
            }
        }
    }
}

/// Forwards events to a channel so an observer on another task or thread can consume them.
pub struct ChannelEventSink {
    tx: mpsc::UnboundedSender<Event>,
}

impl ChannelEventSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Event>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl EventSink for ChannelEventSink {
    async fn emit(&self, event: Event) {
        // A dropped receiver just means nobody is watching any more.
        let _ = self.tx.send(event);
    }
}

pub struct NoOpEventSink;

#[async_trait]
impl EventSink for NoOpEventSink {
    async fn emit(&self, _event: Event) {}
}

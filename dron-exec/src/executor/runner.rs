use std::collections::HashSet;
use std::sync::Arc;

use dron_core::{HistoryEntry, Sequence, Step};
use tokio::task::JoinHandle;
use tracing::Instrument;
use uuid::Uuid;

use crate::executor::events::{Event, EventSink, RunStatus};
use crate::executor::request::{RequestExecutor, ResolvedRequest};
use crate::executor::resolver::VariableResolver;
use crate::executor::result::{RunError, RunSummary};

/// Drives one run of a sequence: steps in `order`, one at a time, each fully finished
/// (response stored, later steps filled, history appended) before the next is sent.
pub struct SequenceRunner {
    executor: Arc<RequestExecutor>,
    resolver: VariableResolver,
    event_sink: Arc<dyn EventSink>,
}

/// What a spawned run hands back: the sequence, with its history, and the result.
#[derive(Debug)]
pub struct RunOutcome {
    pub sequence: Sequence,
    pub result: Result<RunSummary, RunError>,
}

impl SequenceRunner {
    pub fn new(
        executor: Arc<RequestExecutor>,
        resolver: VariableResolver,
        event_sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            executor,
            resolver,
            event_sink,
        }
    }

    pub async fn run_sequence(self, sequence: &mut Sequence) -> Result<RunSummary, RunError> {
        let run_id = Uuid::new_v4();
        self.run_inner(run_id, sequence)
            .instrument(tracing::info_span!("run_sequence", %run_id))
            .await
    }

    async fn run_inner(&self, run_id: Uuid, sequence: &mut Sequence) -> Result<RunSummary, RunError> {
        sequence.reset_for_run();

        let Sequence {
            order,
            steps,
            params,
            history,
            ..
        } = sequence;

        self.event_sink
            .emit(Event::RunStarted {
                run_id,
                steps: order.len(),
            })
            .await;

        let mut executed: HashSet<String> = HashSet::new();
        let mut all_extraction_errors = Vec::new();

        for (position, step_id) in order.iter().enumerate() {
            if step_id.is_empty() {
                let err = RunError::InvalidStepReference {
                    position,
                    reason: "step id is empty".to_string(),
                };
                return Err(self.fail(run_id, executed.len(), err).await);
            }
            if executed.contains(step_id) {
                let err = RunError::InvalidStepReference {
                    position,
                    reason: format!("step `{step_id}` appears more than once in order"),
                };
                return Err(self.fail(run_id, executed.len(), err).await);
            }
            let Some(step) = steps.get_mut(step_id) else {
                let err = RunError::StepNotFound {
                    position,
                    step_id: step_id.clone(),
                };
                return Err(self.fail(run_id, executed.len(), err).await);
            };

            let mut extraction_errors = self.resolver.bind_params(step, params.as_slice());

            self.event_sink
                .emit(Event::StepStarted {
                    run_id,
                    step_id: step_id.clone(),
                })
                .await;

            let unresolved = step.unresolved_placeholders();
            let request = ResolvedRequest::from_step(step);

            let response = match self.executor.run(step).await {
                Ok(body) => body,
                Err(source) => {
                    let err = RunError::Transport {
                        step_id: step_id.clone(),
                        source,
                    };
                    return Err(self.fail(run_id, executed.len(), err).await);
                }
            };
            step.response = response;
            let entry = HistoryEntry::snapshot(step);
            executed.insert(step_id.clone());

            // Filled in run order so extraction errors are reported that way.
            let mut pending: Vec<&mut Step> = steps
                .iter_mut()
                .filter(|(id, _)| !executed.contains(id.as_str()))
                .map(|(_, s)| s)
                .collect();
            pending.sort_by_key(|s| order.iter().position(|id| *id == s.id).unwrap_or(usize::MAX));
            extraction_errors.extend(self.resolver.fill_future_params(
                step_id,
                &entry.response,
                pending,
                params.as_mut_slice(),
            ));

            let response = entry.response.clone();
            history.record(entry);

            self.event_sink
                .emit(Event::StepCompleted {
                    run_id,
                    step_id: step_id.clone(),
                    request,
                    response,
                    extraction_errors: extraction_errors.clone(),
                    unresolved,
                })
                .await;
            all_extraction_errors.extend(extraction_errors);
        }

        self.event_sink
            .emit(Event::RunFinished {
                run_id,
                status: RunStatus::Succeeded,
                executed: executed.len(),
            })
            .await;

        Ok(RunSummary {
            run_id,
            executed: executed.len(),
            extraction_errors: all_extraction_errors,
        })
    }

    async fn fail(&self, run_id: Uuid, executed: usize, err: RunError) -> RunError {
        self.event_sink
            .emit(Event::StepFailed {
                run_id,
                step_id: err.step_id().map(str::to_string),
                kind: err.kind(),
                error: err.to_string(),
            })
            .await;
        self.event_sink
            .emit(Event::RunFinished {
                run_id,
                status: RunStatus::Failed,
                executed,
            })
            .await;
        err
    }
}

/// Runs `sequence` on a tokio task. Progress is visible only through the runner's
/// event sink; the sequence comes back with the outcome.
pub fn spawn_sequence(runner: SequenceRunner, mut sequence: Sequence) -> JoinHandle<RunOutcome> {
    tokio::spawn(async move {
        let result = runner.run_sequence(&mut sequence).await;
        RunOutcome { sequence, result }
    })
}

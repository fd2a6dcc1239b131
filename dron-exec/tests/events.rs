use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use dron_core::{HeaderPair, StepField};
use dron_exec::executor::{
    ChannelEventSink, CompositeEventSink, Event, EventSink, ExtractionError,
    ExtractionErrorKind, NoOpEventSink, ResolvedRequest, RunStatus,
};
use uuid::Uuid;

struct CountingSink(Arc<Mutex<usize>>);

#[async_trait]
impl EventSink for CountingSink {
    async fn emit(&self, _event: Event) {
        *self.0.lock().unwrap() += 1;
    }
}

fn completed(run_id: Uuid) -> Event {
    Event::StepCompleted {
        run_id,
        step_id: "B".into(),
        request: ResolvedRequest {
            method: "GET".into(),
            url: "http://api.test/b".into(),
            headers: vec![HeaderPair {
                name: "Authorization".into(),
                value: "Bearer xyz".into(),
            }],
            body: String::new(),
        },
        response: "{}".into(),
        extraction_errors: vec![ExtractionError {
            producer: "A".into(),
            consumer: "C".into(),
            field: StepField::Body,
            placeholder: "{{A.id}}".into(),
            kind: ExtractionErrorKind::PathNotFound {
                path: ".id".into(),
                detail: "no value".into(),
            },
        }],
        unresolved: vec!["{{C.x}}".into()],
    }
}

#[test]
fn step_completed_json_shape() {
    let run_id = Uuid::new_v4();
    let v = completed(run_id).to_json();
    assert_eq!(v["type"], "step.completed");
    assert_eq!(v["run_id"], run_id.to_string());
    assert_eq!(v["request"]["headers"][0]["value"], "Bearer xyz");
    assert_eq!(v["extraction_errors"][0]["detail"]["producer"], "A");
    assert_eq!(v["extraction_errors"][0]["detail"]["field"], "body");
    assert_eq!(v["extraction_errors"][0]["detail"]["kind"]["type"], "path_not_found");
    assert_eq!(v["unresolved"][0], "{{C.x}}");
}

#[test]
fn run_finished_json_uses_status_names() {
    let v = Event::RunFinished {
        run_id: Uuid::new_v4(),
        status: RunStatus::Failed,
        executed: 1,
    }
    .to_json();
    assert_eq!(v["type"], "run.finished");
    assert_eq!(v["status"], "failed");
    assert_eq!(v["executed"], 1);
}

#[tokio::test]
async fn composite_fans_out_to_every_sink() {
    let count = Arc::new(Mutex::new(0));
    let mut composite = CompositeEventSink::new();
    composite.add(Box::new(CountingSink(count.clone())));
    composite.add(Box::new(CountingSink(count.clone())));
    composite.add(Box::new(NoOpEventSink));
    assert_eq!(composite.len(), 3);

    composite
        .emit(Event::RunStarted {
            run_id: Uuid::new_v4(),
            steps: 2,
        })
        .await;
    assert_eq!(*count.lock().unwrap(), 2);
}

#[tokio::test]
async fn channel_sink_survives_a_dropped_receiver() {
    let (sink, rx) = ChannelEventSink::new();
    drop(rx);
    sink.emit(completed(Uuid::new_v4())).await;
}

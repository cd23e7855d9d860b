use super::*;
use crate::events::{LifecycleEvent, Phase};
use async_trait::async_trait;
use serde_json::json;
use shared::{
    domain::{CleaningId, CleaningJob},
    error::{ErrorDetail, FailureKind},
};
use std::{collections::VecDeque, sync::Mutex};
use tokio::sync::broadcast;

struct ScriptedTransport {
    store: Arc<Store>,
    responses: Mutex<VecDeque<Result<ApiResponse<Value>, TransportError>>>,
    loading_at_send: Mutex<Vec<bool>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    fn new(store: Arc<Store>, responses: Vec<Result<ApiResponse<Value>, TransportError>>) -> Self {
        Self {
            store,
            responses: Mutex::new(responses.into()),
            loading_at_send: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse<Value>, TransportError> {
        let loading = self.store.read(|state| state.cleanings.is_loading);
        self.loading_at_send.lock().expect("lock").push(loading);
        self.requests.lock().expect("lock").push(request);
        self.responses
            .lock()
            .expect("lock")
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Network("script exhausted".into())))
    }
}

fn job_json(id: &str, name: &str) -> Value {
    json!({"id": id, "name": name, "price": 10.0, "cleaning_type": "dust_up", "owner": "u1"})
}

fn ok(status: u16, data: Value) -> Result<ApiResponse<Value>, TransportError> {
    Ok(ApiResponse { status, data })
}

fn drain(rx: &mut broadcast::Receiver<StoreEvent>) -> Vec<StoreEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn setup(
    responses: Vec<Result<ApiResponse<Value>, TransportError>>,
) -> (ActionPipeline, Arc<ScriptedTransport>, Arc<Store>) {
    let store = Store::new();
    let transport = Arc::new(ScriptedTransport::new(store.clone(), responses));
    let pipeline = ActionPipeline::new(transport.clone(), store.clone());
    (pipeline, transport, store)
}

#[tokio::test]
async fn dispatches_request_before_network_call_then_success() {
    let (pipeline, transport, store) = setup(vec![ok(200, job_json("c1", "Kitchen"))]);
    let mut rx = store.subscribe();

    let outcome = pipeline
        .run(RequestDescriptor::<CleaningJob>::get(
            Operation::FetchCleaningJobById,
            "/cleanings/c1/",
        ))
        .await;

    assert!(outcome.is_success());
    assert_eq!(outcome.status(), Some(200));
    assert_eq!(*transport.loading_at_send.lock().expect("lock"), vec![true]);

    let events = drain(&mut rx);
    assert_eq!(events.len(), 2);
    assert_eq!(events[0], StoreEvent::request(Operation::FetchCleaningJobById));
    assert!(matches!(
        &events[1],
        StoreEvent::Lifecycle(LifecycleEvent { phase: Phase::Success(Payload::CleaningJob(job)), .. })
            if job.id == CleaningId::new("c1")
    ));

    let state = store.snapshot();
    assert!(!state.cleanings.is_loading);
    assert!(state.cleanings.error.is_none());
    assert!(state.cleanings.data.contains_key(&CleaningId::new("c1")));
}

#[tokio::test]
async fn status_failure_dispatches_single_failure_and_keeps_data() {
    let (pipeline, _transport, store) = setup(vec![
        ok(200, job_json("c1", "Kitchen")),
        Err(TransportError::Status {
            status: 404,
            body: json!({"detail": "No cleaning found with that id."}),
        }),
    ]);

    pipeline
        .run(RequestDescriptor::<CleaningJob>::get(
            Operation::FetchCleaningJobById,
            "/cleanings/c1/",
        ))
        .await;
    let before = store.read(|state| state.cleanings.data.clone());

    let mut rx = store.subscribe();
    let outcome = pipeline
        .run(RequestDescriptor::<CleaningJob>::get(
            Operation::FetchCleaningJobById,
            "/cleanings/missing/",
        ))
        .await;

    let error = outcome.error().expect("failure");
    assert_eq!(error.kind, FailureKind::HttpStatus);
    assert_eq!(outcome.status(), Some(404));

    let events = drain(&mut rx);
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].name(), "@@cleanings/FETCH_CLEANING_JOB_BY_ID");
    assert_eq!(events[1].name(), "@@cleanings/FETCH_CLEANING_JOB_BY_ID_FAILURE");

    let state = store.snapshot();
    assert!(!state.cleanings.is_loading);
    assert_eq!(state.cleanings.data, before);
    assert_eq!(
        state.cleanings.error.as_ref().and_then(|e| e.message()),
        Some("No cleaning found with that id.")
    );
}

#[tokio::test]
async fn malformed_success_body_becomes_failure() {
    let (pipeline, _transport, store) = setup(vec![ok(200, json!({"unexpected": true}))]);

    let outcome = pipeline
        .run(RequestDescriptor::<CleaningJob>::get(
            Operation::FetchCleaningJobById,
            "/cleanings/c1/",
        ))
        .await;

    let error = outcome.error().expect("failure");
    assert_eq!(error.kind, FailureKind::MalformedResponse);
    assert_eq!(error.status, Some(200));
    assert!(store.read(|state| state.cleanings.data.is_empty()));
    assert!(store.read(|state| state.cleanings.error.is_some()));
}

#[tokio::test]
async fn network_failure_is_normalized() {
    let (pipeline, _transport, store) =
        setup(vec![Err(TransportError::Network("connection refused".into()))]);

    let outcome = pipeline
        .run(RequestDescriptor::<Vec<CleaningJob>>::get(
            Operation::FetchUserOwnedCleaningJobs,
            "/cleanings/",
        ))
        .await;

    assert_eq!(outcome.status(), None);
    let error = store
        .read(|state| state.cleanings.error.clone())
        .expect("error stored");
    assert_eq!(error.kind, FailureKind::Network);
    assert_eq!(error.detail, ErrorDetail::Message("connection refused".into()));
}

#[tokio::test]
async fn success_hook_shapes_payload_and_can_reject() {
    let (pipeline, _transport, store) = setup(vec![
        ok(200, json!([job_json("c1", "One"), job_json("c2", "Two")])),
        ok(200, json!([job_json("c3", "Three")])),
    ]);

    let outcome = pipeline
        .run(
            RequestDescriptor::<Vec<CleaningJob>>::get(
                Operation::FetchUserOwnedCleaningJobs,
                "/cleanings/",
            )
            .on_success(|response| {
                Ok(Payload::CleaningJobs(
                    response.data.iter().take(1).cloned().collect(),
                ))
            }),
        )
        .await;
    assert_eq!(outcome.data().map(Vec::len), Some(2));
    assert_eq!(store.read(|state| state.cleanings.data.len()), 1);

    let mut rx = store.subscribe();
    let outcome = pipeline
        .run(
            RequestDescriptor::<Vec<CleaningJob>>::get(
                Operation::FetchUserOwnedCleaningJobs,
                "/cleanings/",
            )
            .on_success(|_| Err(ApiFailure::credentials(Some(200), "disk full"))),
        )
        .await;
    assert!(!outcome.is_success());
    let events = drain(&mut rx);
    assert_eq!(events.len(), 2);
    assert!(matches!(
        &events[1],
        StoreEvent::Lifecycle(LifecycleEvent { phase: Phase::Failure(e), .. })
            if e.kind == FailureKind::Credentials
    ));
    assert_eq!(store.read(|state| state.cleanings.data.len()), 1);
}

#[tokio::test]
async fn failure_hook_transforms_error() {
    let (pipeline, _transport, store) =
        setup(vec![Err(TransportError::Network("timeout".into()))]);

    let outcome = pipeline
        .run(
            RequestDescriptor::<CleaningJob>::get(Operation::FetchCleaningJobById, "/cleanings/c1/")
                .on_failure(|_| ApiFailure::network("Server unreachable")),
        )
        .await;

    assert_eq!(
        outcome.error().and_then(ApiFailure::message),
        Some("Server unreachable")
    );
    assert_eq!(
        store.read(|state| state.cleanings.error.clone()),
        outcome.error().cloned()
    );
}

#[tokio::test]
async fn descriptor_fields_reach_the_transport() {
    let (pipeline, transport, _store) = setup(vec![ok(200, job_json("c1", "Kitchen"))]);

    pipeline
        .run(
            RequestDescriptor::<CleaningJob>::put(Operation::UpdateCleaningJob, "cleanings/c1")
                .json(json!({"name": "Kitchen"}))
                .query("notify", true),
        )
        .await;

    let requests = transport.requests.lock().expect("lock");
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, Method::PUT);
    assert_eq!(requests[0].path, "cleanings/c1");
    assert_eq!(requests[0].query, vec![("notify".to_string(), "true".to_string())]);
    assert_eq!(
        requests[0].body,
        Some(RequestBody::Json(json!({"name": "Kitchen"})))
    );
}

#[tokio::test]
async fn update_operations_track_is_updating() {
    let (pipeline, transport, store) = setup(vec![ok(200, job_json("c1", "Renamed"))]);

    pipeline
        .run(RequestDescriptor::<CleaningJob>::put(
            Operation::UpdateCleaningJob,
            "/cleanings/c1/",
        ))
        .await;

    // is_loading stays untouched for update-style operations
    assert_eq!(*transport.loading_at_send.lock().expect("lock"), vec![false]);
    let state = store.snapshot();
    assert!(!state.cleanings.is_updating);
    assert_eq!(
        state.cleanings.data[&CleaningId::new("c1")].name,
        "Renamed"
    );
}

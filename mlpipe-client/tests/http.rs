//! HTTP contract tests against throwaway axum servers

use axum::extract::{Multipart, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use bytes::Bytes;
use mlpipe_client::{ControllerClient, HttpWorkerConnector, WorkerConnector};
use mlpipe_core::domain::error::ErrorKind;
use mlpipe_core::domain::job::{JobSpec, SessionToken, WorkerEndpoint};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
struct Recorded {
    jobs: Arc<Mutex<Vec<Value>>>,
    uploads: Arc<Mutex<Vec<(String, Option<String>, Vec<u8>)>>>,
}

async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn status_for(Query(params): Query<HashMap<String, String>>) -> (StatusCode, Json<Value>) {
    match params.get("token").map(String::as_str) {
        Some("abc") => (StatusCode::OK, Json(json!({ "status": "PENDING_JOB" }))),
        Some("unknown") => (StatusCode::OK, Json(json!({ "status": null }))),
        Some("expired") => (StatusCode::UNAUTHORIZED, Json(json!({ "error": "expired" }))),
        _ => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "boom" })),
        ),
    }
}

fn controller_router(recorded: Recorded) -> Router {
    Router::new()
        .route("/api", get(|| async { Json(json!({ "message": "I am core" })) }))
        .route(
            "/api/fetchtoken",
            get(|| async { Json(json!({ "token": "abc" })) }),
        )
        .route("/api/pollstatus", get(status_for))
        .route(
            "/api/postjob/",
            post(
                |State(recorded): State<Recorded>, Json(body): Json<Value>| async move {
                    recorded.jobs.lock().unwrap().push(body);
                    StatusCode::OK
                },
            ),
        )
        .route(
            "/api/getworkerport",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                match params.get("token").map(String::as_str) {
                    Some("abc") => Json(json!({ "workerPort": 9100 })),
                    _ => Json(json!({ "workerPort": 70000 })),
                }
            }),
        )
        .with_state(recorded)
}

fn worker_router(recorded: Recorded) -> Router {
    Router::new()
        .route(
            "/api/postData/",
            post(
                |State(recorded): State<Recorded>, mut multipart: Multipart| async move {
                    while let Some(field) = multipart.next_field().await.unwrap() {
                        let name = field.name().unwrap_or_default().to_string();
                        let file_name = field.file_name().map(str::to_string);
                        let data = field.bytes().await.unwrap().to_vec();
                        recorded.uploads.lock().unwrap().push((name, file_name, data));
                    }
                    StatusCode::OK
                },
            ),
        )
        .route(
            "/api/getResults",
            get(|| async { Json(json!({ "accuracy": 0.91 })) }),
        )
        .with_state(recorded)
}

fn token(value: &str) -> SessionToken {
    SessionToken(value.to_string())
}

#[tokio::test]
async fn test_controller_happy_path() {
    let recorded = Recorded::default();
    let base = serve(controller_router(recorded.clone())).await;
    let client = ControllerClient::new(&base);

    assert_eq!(client.ping().await.unwrap(), "I am core");

    let token = client.fetch_token().await.unwrap();
    assert_eq!(token.as_str(), "abc");

    assert_eq!(client.poll_status(&token).await.unwrap(), "PENDING_JOB");

    let spec = JobSpec(json!({ "modelDefinitions": [{ "id": 1 }] }));
    client.post_job(&token, &spec).await.unwrap();
    assert_eq!(
        recorded.jobs.lock().unwrap().as_slice(),
        &[json!({ "session_token": "abc", "job_spec": { "modelDefinitions": [{ "id": 1 }] } })]
    );

    let endpoint = client.get_worker_port(&token).await.unwrap();
    assert_eq!(endpoint, WorkerEndpoint { port: 9100 });
}

#[tokio::test]
async fn test_poll_status_unauthorized_is_invalid_session() {
    let base = serve(controller_router(Recorded::default())).await;
    let client = ControllerClient::new(&base);

    let err = client.poll_status(&token("expired")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidSession);
    assert!(err.is_fatal());
}

#[tokio::test]
async fn test_poll_status_null_is_invalid_session() {
    let base = serve(controller_router(Recorded::default())).await;
    let client = ControllerClient::new(&base);

    let err = client.poll_status(&token("unknown")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidSession);
}

#[tokio::test]
async fn test_poll_status_server_error_is_transient() {
    let base = serve(controller_router(Recorded::default())).await;
    let client = ControllerClient::new(&base);

    let err = client.poll_status(&token("other")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TransientServerError);
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_out_of_range_worker_port_is_protocol_mismatch() {
    let base = serve(controller_router(Recorded::default())).await;
    let client = ControllerClient::new(&base);

    let err = client.get_worker_port(&token("other")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ProtocolMismatch);
}

#[tokio::test]
async fn test_unreachable_controller_is_transient_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = ControllerClient::new(format!("http://{}", addr));
    let err = client.fetch_token().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TransientNetworkError);
}

#[tokio::test]
async fn test_worker_upload_and_results() {
    let recorded = Recorded::default();
    let base = serve(worker_router(recorded.clone())).await;
    let port = base.rsplit(':').next().unwrap().parse::<u16>().unwrap();

    let connector = HttpWorkerConnector::new("http://127.0.0.1:8000", reqwest::Client::new()).unwrap();
    let worker = connector.connect(WorkerEndpoint { port }).unwrap();

    worker
        .post_data("iris.csv", Bytes::from_static(b"a,b\n1,2\n"))
        .await
        .unwrap();
    {
        let uploads = recorded.uploads.lock().unwrap();
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].0, "data_file");
        assert_eq!(uploads[0].1.as_deref(), Some("iris.csv"));
        assert_eq!(uploads[0].2, b"a,b\n1,2\n".to_vec());
    }

    let results = worker.fetch_results().await.unwrap();
    assert_eq!(results.as_json(), &json!({ "accuracy": 0.91 }));
}

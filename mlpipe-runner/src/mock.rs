//! In-memory controller and worker doubles for engine tests

use async_trait::async_trait;
use bytes::Bytes;
use mlpipe_client::{ClientError, ControllerApi, WorkerApi, WorkerConnector};
use mlpipe_core::domain::job::{JobSpec, ResultDocument, SessionToken, WorkerEndpoint};
use serde_json::json;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Scripted reply for one call
#[derive(Debug, Clone, Copy)]
pub enum Reply {
    Ok,
    Status(&'static str),
    Http(u16),
}

/// Pops scripted replies; the last one repeats forever
#[derive(Debug)]
struct Script(Mutex<VecDeque<Reply>>);

impl Script {
    fn new(replies: impl IntoIterator<Item = Reply>) -> Self {
        Self(Mutex::new(replies.into_iter().collect()))
    }

    fn next(&self) -> Reply {
        let mut queue = self.0.lock().unwrap();
        if queue.len() > 1 {
            queue.pop_front().unwrap()
        } else {
            queue.front().cloned().unwrap_or(Reply::Ok)
        }
    }
}

fn scripted_error(code: u16) -> ClientError {
    ClientError::api_error(code, "scripted failure")
}

#[derive(Debug, Default)]
pub struct Calls {
    pub fetch_token: AtomicUsize,
    pub poll_status: AtomicUsize,
    pub post_job: AtomicUsize,
    pub get_worker_port: AtomicUsize,
}

impl Calls {
    pub fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    pub fn total(&self) -> usize {
        Self::get(&self.fetch_token)
            + Self::get(&self.poll_status)
            + Self::get(&self.post_job)
            + Self::get(&self.get_worker_port)
    }
}

#[derive(Debug)]
pub struct MockController {
    pub calls: Calls,
    tokens: Script,
    statuses: Script,
    post_job_replies: Script,
    port: u16,
    post_job_delay: Option<Duration>,
    posted: Mutex<Vec<(SessionToken, JobSpec)>>,
}

impl MockController {
    pub fn new(statuses: impl IntoIterator<Item = Reply>) -> Self {
        Self {
            calls: Calls::default(),
            tokens: Script::new([Reply::Ok]),
            statuses: Script::new(statuses),
            post_job_replies: Script::new([Reply::Ok]),
            port: 9100,
            post_job_delay: None,
            posted: Mutex::new(Vec::new()),
        }
    }

    pub fn with_token_replies(mut self, replies: impl IntoIterator<Item = Reply>) -> Self {
        self.tokens = Script::new(replies);
        self
    }

    pub fn with_post_job_replies(mut self, replies: impl IntoIterator<Item = Reply>) -> Self {
        self.post_job_replies = Script::new(replies);
        self
    }

    /// Makes `post_job` take this long before answering
    pub fn with_post_job_delay(mut self, delay: Duration) -> Self {
        self.post_job_delay = Some(delay);
        self
    }

    pub fn posted(&self) -> Vec<(SessionToken, JobSpec)> {
        self.posted.lock().unwrap().clone()
    }
}

#[async_trait]
impl ControllerApi for MockController {
    async fn fetch_token(&self) -> Result<SessionToken, ClientError> {
        self.calls.fetch_token.fetch_add(1, Ordering::SeqCst);
        match self.tokens.next() {
            Reply::Http(code) => Err(scripted_error(code)),
            _ => Ok(SessionToken("abc".to_string())),
        }
    }

    async fn poll_status(&self, _token: &SessionToken) -> Result<String, ClientError> {
        self.calls.poll_status.fetch_add(1, Ordering::SeqCst);
        match self.statuses.next() {
            Reply::Status(status) => Ok(status.to_string()),
            Reply::Http(code) => Err(scripted_error(code)),
            Reply::Ok => Ok("PENDING_JOB".to_string()),
        }
    }

    async fn post_job(&self, token: &SessionToken, job_spec: &JobSpec) -> Result<(), ClientError> {
        self.calls.post_job.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.post_job_delay {
            tokio::time::sleep(delay).await;
        }
        match self.post_job_replies.next() {
            Reply::Http(code) => Err(scripted_error(code)),
            _ => {
                self.posted
                    .lock()
                    .unwrap()
                    .push((token.clone(), job_spec.clone()));
                Ok(())
            }
        }
    }

    async fn get_worker_port(&self, _token: &SessionToken) -> Result<WorkerEndpoint, ClientError> {
        self.calls.get_worker_port.fetch_add(1, Ordering::SeqCst);
        Ok(WorkerEndpoint { port: self.port })
    }
}

#[derive(Debug)]
pub struct MockWorker {
    pub result_calls: AtomicUsize,
    upload_replies: Script,
    uploads: Mutex<Vec<(String, Bytes)>>,
    results: ResultDocument,
}

impl MockWorker {
    pub fn new() -> Self {
        Self {
            result_calls: AtomicUsize::new(0),
            upload_replies: Script::new([Reply::Ok]),
            uploads: Mutex::new(Vec::new()),
            results: ResultDocument(json!({ "accuracy": 0.91 })),
        }
    }

    /// Scripts upload replies; once exhausted, uploads succeed
    pub fn with_upload_replies(mut self, replies: impl IntoIterator<Item = Reply>) -> Self {
        self.upload_replies = Script::new(replies.into_iter().chain([Reply::Ok]));
        self
    }

    /// Every upload attempt, failed ones included
    pub fn uploads(&self) -> Vec<(String, Bytes)> {
        self.uploads.lock().unwrap().clone()
    }
}

#[async_trait]
impl WorkerApi for MockWorker {
    async fn post_data(&self, file_name: &str, payload: Bytes) -> Result<(), ClientError> {
        self.uploads
            .lock()
            .unwrap()
            .push((file_name.to_string(), payload));
        match self.upload_replies.next() {
            Reply::Http(code) => Err(scripted_error(code)),
            _ => Ok(()),
        }
    }

    async fn fetch_results(&self) -> Result<ResultDocument, ClientError> {
        self.result_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.results.clone())
    }
}

/// Hands out one shared `MockWorker` and records the ports asked for
#[derive(Debug)]
pub struct MockConnector {
    pub worker: Arc<MockWorker>,
    ports: Mutex<Vec<u16>>,
}

impl MockConnector {
    pub fn new(worker: MockWorker) -> Self {
        Self {
            worker: Arc::new(worker),
            ports: Mutex::new(Vec::new()),
        }
    }

    pub fn ports(&self) -> Vec<u16> {
        self.ports.lock().unwrap().clone()
    }
}

impl WorkerConnector for MockConnector {
    fn connect(&self, endpoint: WorkerEndpoint) -> Result<Arc<dyn WorkerApi>, ClientError> {
        self.ports.lock().unwrap().push(endpoint.port);
        let worker: Arc<dyn WorkerApi> = self.worker.clone();
        Ok(worker)
    }
}

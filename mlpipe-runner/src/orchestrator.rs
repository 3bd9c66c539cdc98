//! Job orchestrator
//!
//! Entry point for callers: submits a job specification with its dataset,
//! then lets the caller query, wait for, or cancel the resulting session.
//! Every submission gets its own context and poll task; nothing is shared
//! between sessions except the HTTP clients.

use mlpipe_client::{ControllerApi, ControllerClient, HttpWorkerConnector, WorkerConnector};
use mlpipe_core::domain::job::{JobSpec, ResultDocument};
use mlpipe_core::domain::phase::Phase;
use mlpipe_core::domain::session::{SessionId, SessionStatus};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tracing::info;

use crate::config::Config;
use crate::context::SessionContext;
use crate::dataset::Dataset;
use crate::error::{OrchestratorError, Result};
use crate::scheduler::{PhaseController, PollScheduler, SchedulerHandle, SessionView};

/// Caller's reference to one submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionHandle {
    id: SessionId,
}

impl SessionHandle {
    pub fn id(&self) -> SessionId {
        self.id
    }
}

/// Submits jobs and tracks their sessions
///
/// Sessions stay registered after they end so their status and results
/// remain readable. Call [`JobOrchestrator::release`] or
/// [`JobOrchestrator::prune`] to drop them.
pub struct JobOrchestrator {
    config: Config,
    controller: Arc<dyn ControllerApi>,
    connector: Arc<dyn WorkerConnector>,
    sessions: Mutex<HashMap<SessionId, SchedulerHandle>>,
}

impl JobOrchestrator {
    /// Creates an orchestrator over the given clients
    ///
    /// # Arguments
    /// * `config` - Poll interval and retry ceiling for every session
    /// * `controller` - Controller client
    /// * `connector` - Builds worker clients once ports are assigned
    pub fn new(
        config: Config,
        controller: Arc<dyn ControllerApi>,
        connector: Arc<dyn WorkerConnector>,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            config,
            controller,
            connector,
            sessions: Mutex::new(HashMap::new()),
        })
    }

    /// Creates an orchestrator talking HTTP to `config.controller_url`
    pub fn from_config(config: Config) -> Result<Self> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(mlpipe_client::ClientError::from)?;

        let controller = Arc::new(ControllerClient::with_client(
            config.controller_url.clone(),
            http.clone(),
        ));
        let connector = Arc::new(HttpWorkerConnector::new(&config.controller_url, http)?);

        Self::new(config, controller, connector)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Starts a new session
    ///
    /// The dataset is checked before anything is sent: a missing dataset
    /// is rejected with [`OrchestratorError::DatasetMissing`] and no
    /// session is created. Must be called from within a Tokio runtime.
    ///
    /// # Arguments
    /// * `job_spec` - The pipeline specification
    /// * `dataset` - The data to train on
    pub fn submit(&self, job_spec: JobSpec, dataset: Option<Dataset>) -> Result<SessionHandle> {
        let dataset = dataset.ok_or_else(|| {
            OrchestratorError::DatasetMissing("no dataset supplied with the job".to_string())
        })?;
        dataset.validate()?;

        let id = SessionId::new();
        let ctx = SessionContext::new(id, job_spec, dataset);

        let scheduler = PollScheduler::new(
            Arc::clone(&self.controller),
            Arc::clone(&self.connector),
            PhaseController::new(self.config.max_consecutive_failures),
        );
        let handle = scheduler.start(ctx, self.config.poll_interval);

        self.lock_sessions().insert(id, handle);
        info!("Submitted session {}", id);

        Ok(SessionHandle { id })
    }

    /// Current phase and last error of a session
    pub fn status(&self, handle: &SessionHandle) -> Result<SessionStatus> {
        self.with_session(handle, |session| session.view().status)
    }

    /// Training results of a finished session
    pub fn result(&self, handle: &SessionHandle) -> Result<ResultDocument> {
        let view = self.with_session(handle, |session| session.view())?;

        match (view.status.phase, view.result) {
            (Phase::Finished, Some(result)) => Ok(result),
            (phase, _) => Err(OrchestratorError::NotReady(phase)),
        }
    }

    /// Cancels a session; a no-op for sessions that already ended
    pub fn cancel(&self, handle: &SessionHandle) -> Result<()> {
        self.with_session(handle, |session| session.cancel())?;
        info!("Cancelled session {}", handle.id);
        Ok(())
    }

    /// Receives every published change of a session's state
    pub fn subscribe(&self, handle: &SessionHandle) -> Result<watch::Receiver<SessionView>> {
        self.with_session(handle, |session| session.subscribe())
    }

    /// Waits until a session reaches a terminal phase
    pub async fn wait(&self, handle: &SessionHandle) -> Result<SessionStatus> {
        let mut updates = self.subscribe(handle)?;

        let status = updates
            .wait_for(|view| view.status.is_terminal())
            .await
            .map(|view| view.status.clone())
            .map_err(|_| OrchestratorError::UnknownSession(handle.id))?;

        Ok(status)
    }

    /// Forgets a session, cancelling it if still running
    ///
    /// # Returns
    /// The session's final status
    pub async fn release(&self, handle: &SessionHandle) -> Result<SessionStatus> {
        let session = self
            .lock_sessions()
            .remove(&handle.id)
            .ok_or(OrchestratorError::UnknownSession(handle.id))?;

        session.cancel();
        let updates = session.subscribe();
        session.join().await;

        let status = updates.borrow().status.clone();
        info!("Released session {} in {}", handle.id, status.phase);
        Ok(status)
    }

    /// Forgets every session that reached a terminal phase
    ///
    /// # Returns
    /// The final status of each forgotten session
    pub fn prune(&self) -> Vec<SessionStatus> {
        let mut sessions = self.lock_sessions();

        let ended: Vec<SessionId> = sessions
            .iter()
            .filter(|(_, session)| session.view().status.is_terminal())
            .map(|(id, _)| *id)
            .collect();

        let pruned: Vec<SessionStatus> = ended
            .into_iter()
            .filter_map(|id| sessions.remove(&id))
            .map(|session| session.view().status)
            .collect();

        if !pruned.is_empty() {
            info!("Pruned {} ended session(s)", pruned.len());
        }
        pruned
    }

    fn lock_sessions(&self) -> MutexGuard<'_, HashMap<SessionId, SchedulerHandle>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn with_session<T>(
        &self,
        handle: &SessionHandle,
        f: impl FnOnce(&SchedulerHandle) -> T,
    ) -> Result<T> {
        let sessions = self.lock_sessions();
        let session = sessions
            .get(&handle.id)
            .ok_or(OrchestratorError::UnknownSession(handle.id))?;

        Ok(f(session))
    }
}

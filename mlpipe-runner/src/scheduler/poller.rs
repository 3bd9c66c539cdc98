//! Session poller
//!
//! Polls the controller on a fixed interval and performs whatever the
//! phase controller asks for. Each session runs in its own task; ticks
//! within a session never overlap, and a tick that would fire while the
//! previous one is still working is dropped.

use mlpipe_client::{ControllerApi, WorkerApi, WorkerConnector};
use mlpipe_core::domain::job::{ResultDocument, SessionToken};
use mlpipe_core::domain::phase::Phase;
use mlpipe_core::domain::session::SessionStatus;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Duration, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::context::SessionContext;
use crate::error::{OrchestratorError, Result};
use crate::scheduler::phase::{Action, PhaseController};
use crate::transfer::TransferAgent;

/// What callers can observe of a running session
#[derive(Debug, Clone)]
pub struct SessionView {
    pub status: SessionStatus,
    pub result: Option<ResultDocument>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TickOutcome {
    Continue,
    Stop,
    Cancelled,
}

/// A failed tick and the action it was performing
struct TickFailure {
    during: Action,
    error: OrchestratorError,
}

impl TickFailure {
    fn during(during: Action) -> impl FnOnce(OrchestratorError) -> Self {
        move |error| Self { during, error }
    }
}

/// Poll loop for one session
pub struct PollScheduler {
    controller: Arc<dyn ControllerApi>,
    connector: Arc<dyn WorkerConnector>,
    phases: PhaseController,
    transfer: TransferAgent,
    cancel: CancellationToken,
    /// Built lazily once the worker endpoint is known
    worker: Option<Arc<dyn WorkerApi>>,
}

impl PollScheduler {
    /// Creates a scheduler for one session
    ///
    /// # Arguments
    /// * `controller` - Controller client
    /// * `connector` - Builds the worker client once a port is assigned
    /// * `phases` - State machine applying the retry policy
    pub fn new(
        controller: Arc<dyn ControllerApi>,
        connector: Arc<dyn WorkerConnector>,
        phases: PhaseController,
    ) -> Self {
        Self {
            controller,
            connector,
            phases,
            transfer: TransferAgent::new(),
            cancel: CancellationToken::new(),
            worker: None,
        }
    }

    /// Starts ticking in a background task
    ///
    /// The first tick fires immediately. Must be called from within a
    /// Tokio runtime.
    pub fn start(self, ctx: SessionContext, interval: Duration) -> SchedulerHandle {
        let initial = SessionView {
            status: ctx.snapshot(),
            result: None,
        };
        let (view, _) = watch::channel(initial);
        let view = Arc::new(view);

        let cancel = self.cancel.clone();
        let task = tokio::spawn(self.run(ctx, interval, Arc::clone(&view)));

        SchedulerHandle {
            cancel,
            view,
            task: Some(task),
        }
    }

    async fn run(
        mut self,
        mut ctx: SessionContext,
        interval: Duration,
        view: Arc<watch::Sender<SessionView>>,
    ) -> SessionContext {
        info!("Session {}: polling every {:?}", ctx.id, interval);

        let mut ticker = time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let started = Instant::now();
            let outcome = self.tick(&mut ctx).await;
            if outcome == TickOutcome::Cancelled {
                break;
            }

            publish(&view, &ctx);
            if outcome == TickOutcome::Stop {
                break;
            }

            // Drop the ticks that came due while this one was working
            if started.elapsed() >= interval {
                debug!("Session {}: tick overran the interval", ctx.id);
                ticker.reset();
            }
        }

        if self.cancel.is_cancelled() {
            self.phases.cancel(&mut ctx);
        }
        publish(&view, &ctx);

        info!("Session {}: stopped in {}", ctx.id, ctx.current_phase);
        ctx
    }

    async fn tick(&mut self, ctx: &mut SessionContext) -> TickOutcome {
        if ctx.current_phase.is_terminal() {
            return TickOutcome::Stop;
        }

        match self.poll_and_act(ctx).await {
            Ok(()) => self.phases.record_success(ctx),
            Err(TickFailure {
                error: OrchestratorError::Cancelled,
                ..
            }) => return TickOutcome::Cancelled,
            Err(TickFailure { during, error }) => {
                self.phases.record_failure(ctx, &error, during)
            }
        }

        if ctx.current_phase.is_terminal() {
            TickOutcome::Stop
        } else {
            TickOutcome::Continue
        }
    }

    async fn poll_and_act(&mut self, ctx: &mut SessionContext) -> std::result::Result<(), TickFailure> {
        let token = self
            .ensure_token(ctx)
            .await
            .map_err(TickFailure::during(Action::Wait))?;

        let reported = self
            .guarded(self.controller.poll_status(&token))
            .await
            .map_err(TickFailure::during(Action::Wait))?;
        debug!("Session {}: controller reports {}", ctx.id, reported);

        let action = self.phases.handle(&reported, ctx);
        self.dispatch(action, ctx, &token)
            .await
            .map_err(TickFailure::during(action))
    }

    async fn ensure_token(&self, ctx: &mut SessionContext) -> Result<SessionToken> {
        if let Some(token) = &ctx.token {
            return Ok(token.clone());
        }

        self.phases.begin_token_request(ctx);
        let token = self.guarded(self.controller.fetch_token()).await?;

        info!("Session {}: acquired token {}", ctx.id, token);
        ctx.set_token(token.clone());
        Ok(token)
    }

    async fn dispatch(
        &mut self,
        action: Action,
        ctx: &mut SessionContext,
        token: &SessionToken,
    ) -> Result<()> {
        match action {
            Action::Wait | Action::Terminate => Ok(()),
            Action::PostJob => {
                info!("Session {}: submitting job", ctx.id);
                self.guarded(self.controller.post_job(token, &ctx.job_spec))
                    .await
            }
            Action::TransferDataset => {
                let worker = self.ensure_worker(ctx, token).await?;
                info!(
                    "Session {}: uploading {} to worker",
                    ctx.id,
                    ctx.dataset.file_name()
                );
                self.guarded(self.transfer.send(&ctx.dataset, worker.as_ref()))
                    .await
            }
            Action::FetchResults => {
                let worker = self.ensure_worker(ctx, token).await?;
                let results = self.guarded(worker.fetch_results()).await?;

                info!("Session {}: results received", ctx.id);
                ctx.result = Some(results);
                Ok(())
            }
        }
    }

    /// Returns the worker client, resolving the endpoint on first use
    ///
    /// The endpoint is stored on the context before connecting, so a
    /// failed upload is retried against the same worker without another
    /// port lookup.
    async fn ensure_worker(
        &mut self,
        ctx: &mut SessionContext,
        token: &SessionToken,
    ) -> Result<Arc<dyn WorkerApi>> {
        if let Some(worker) = &self.worker {
            return Ok(Arc::clone(worker));
        }

        let endpoint = match ctx.worker_endpoint {
            Some(endpoint) => endpoint,
            None => {
                let endpoint = self.guarded(self.controller.get_worker_port(token)).await?;
                info!("Session {}: assigned {}", ctx.id, endpoint);
                ctx.assign_worker(endpoint)
            }
        };

        let worker = self.connector.connect(endpoint)?;
        self.worker = Some(Arc::clone(&worker));
        Ok(worker)
    }

    /// Races a network call against cancellation
    ///
    /// A cancelled call is dropped, aborting the request.
    async fn guarded<T, E>(&self, call: impl Future<Output = std::result::Result<T, E>>) -> Result<T>
    where
        E: Into<OrchestratorError>,
    {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(OrchestratorError::Cancelled),
            result = call => result.map_err(Into::into),
        }
    }
}

/// Publishes a snapshot unless the session was already marked cancelled
fn publish(view: &watch::Sender<SessionView>, ctx: &SessionContext) {
    view.send_if_modified(|current| {
        if current.status.phase == Phase::Cancelled {
            return false;
        }
        current.status = ctx.snapshot();
        current.result = ctx.result.clone();
        true
    });
}

/// Caller-side handle to a running scheduler
///
/// Dropping the handle cancels the session.
pub struct SchedulerHandle {
    cancel: CancellationToken,
    view: Arc<watch::Sender<SessionView>>,
    task: Option<JoinHandle<SessionContext>>,
}

impl SchedulerHandle {
    /// Stops the session
    ///
    /// No tick starts after this returns and any in-flight call is
    /// aborted. Idempotent; a session that already reached a terminal
    /// phase keeps it.
    pub fn cancel(&self) {
        self.cancel.cancel();
        self.view.send_if_modified(|current| {
            if current.status.is_terminal() {
                return false;
            }
            current.status.phase = Phase::Cancelled;
            true
        });
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Point-in-time copy of the session state
    pub fn view(&self) -> SessionView {
        self.view.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionView> {
        self.view.subscribe()
    }

    /// Waits for the poll task to exit and returns the final context
    pub async fn join(mut self) -> Option<SessionContext> {
        let task = self.task.take()?;
        match task.await {
            Ok(ctx) => Some(ctx),
            Err(e) => {
                warn!("Session task failed: {}", e);
                None
            }
        }
    }
}

impl Drop for SchedulerHandle {
    fn drop(&mut self) {
        if self.task.is_some() {
            self.cancel.cancel();
        }
    }
}

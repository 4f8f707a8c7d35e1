//! Run lifecycle controller
//!
//! Owns at most one coordinating task. The task is the only writer of its
//! instance's snapshot; every write checks that the published snapshot still
//! belongs to that instance, so a task that is being torn down can never
//! clobber its successor.

use scw_client::{Connector, ScwService};
use scw_core::Endpoint;
use scw_core::domain::run::{Phase, RunRequest};
use scw_core::dto::run::CreateRun;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::snapshot::RunSnapshot;
use crate::health::{self, ProbeOutcome};

/// Status message of an instance started without an endpoint
pub const NO_ENDPOINT_MESSAGE: &str = "API URL not detected. Paste or use Auto-detect.";

/// Starts, supersedes and cancels lifecycle instances
pub struct RunController {
    connector: Arc<dyn Connector>,
    poll_interval: Duration,
    snapshot: Arc<watch::Sender<RunSnapshot>>,
    active: Mutex<Option<JoinHandle<()>>>,
    instances: AtomicU64,
    poll_loops: Arc<PollLoops>,
}

impl RunController {
    pub fn new(connector: Arc<dyn Connector>, poll_interval: Duration) -> Self {
        let (snapshot, _) = watch::channel(RunSnapshot::default());
        Self {
            connector,
            poll_interval,
            snapshot: Arc::new(snapshot),
            active: Mutex::new(None),
            instances: AtomicU64::new(0),
            poll_loops: Arc::new(PollLoops::default()),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<RunSnapshot> {
        self.snapshot.subscribe()
    }

    pub fn snapshot(&self) -> RunSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Number of poll loops currently running
    pub fn active_poll_loops(&self) -> usize {
        self.poll_loops.active.load(Ordering::SeqCst)
    }

    /// Number of poll loops ever started
    pub fn poll_loops_started(&self) -> u64 {
        self.poll_loops.started.load(Ordering::SeqCst)
    }

    /// Starts a fresh instance bound to `endpoint`
    ///
    /// Any previous instance is stopped (and its poll loop gone) before the
    /// new one is published. With an empty endpoint the new instance stays
    /// `Idle`. Returns the new instance number.
    pub async fn start(&self, endpoint: Endpoint, request: RunRequest) -> u64 {
        let mut active = self.active.lock().await;

        let reason = if self.snapshot.borrow().endpoint != endpoint {
            "Endpoint changed; run abandoned."
        } else {
            "Superseded by a new run."
        };
        self.stop(&mut active, reason).await;

        let instance = self.instances.fetch_add(1, Ordering::SeqCst) + 1;

        if endpoint.is_empty() {
            info!("Run #{}: no endpoint, staying idle", instance);
            self.snapshot
                .send_replace(RunSnapshot::idle(instance, NO_ENDPOINT_MESSAGE));
            return instance;
        }

        info!("Run #{}: starting against {}", instance, endpoint);
        self.snapshot.send_replace(RunSnapshot::started(
            instance,
            endpoint.clone(),
            request.clone(),
        ));

        let lifecycle = Lifecycle {
            instance,
            service: self.connector.connect(&endpoint),
            request,
            poll_interval: self.poll_interval,
            snapshot: Arc::clone(&self.snapshot),
            poll_loops: Arc::clone(&self.poll_loops),
        };
        *active = Some(tokio::spawn(lifecycle.drive()));

        instance
    }

    /// Stops the current instance, marking it `Aborted` if it was in flight
    pub async fn cancel(&self, reason: &str) {
        let mut active = self.active.lock().await;
        self.stop(&mut active, reason).await;
    }

    async fn stop(&self, active: &mut Option<JoinHandle<()>>, reason: &str) {
        if let Some(handle) = active.take() {
            handle.abort();
            // Wait for the task to be dropped so its poll loop is gone.
            if let Err(e) = handle.await {
                if !e.is_cancelled() {
                    warn!("Lifecycle task failed: {}", e);
                }
            }
        }

        self.snapshot.send_if_modified(|snap| {
            if snap.phase.is_in_flight() {
                snap.advance(Phase::Aborted, reason)
            } else {
                false
            }
        });
    }
}

impl Drop for RunController {
    fn drop(&mut self) {
        if let Some(handle) = self.active.get_mut().take() {
            handle.abort();
        }
    }
}

#[derive(Debug, Default)]
struct PollLoops {
    active: AtomicUsize,
    started: AtomicU64,
}

/// Counts a poll loop as active for as long as it is alive
struct PollGuard(Arc<PollLoops>);

impl PollGuard {
    fn enter(loops: &Arc<PollLoops>) -> Self {
        loops.active.fetch_add(1, Ordering::SeqCst);
        loops.started.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(loops))
    }
}

impl Drop for PollGuard {
    fn drop(&mut self) {
        self.0.active.fetch_sub(1, Ordering::SeqCst);
    }
}

/// One lifecycle instance, consumed by its coordinating task
struct Lifecycle {
    instance: u64,
    service: Arc<dyn ScwService>,
    request: RunRequest,
    poll_interval: Duration,
    snapshot: Arc<watch::Sender<RunSnapshot>>,
    poll_loops: Arc<PollLoops>,
}

impl Lifecycle {
    /// Applies `f` to the snapshot if it still belongs to this instance
    ///
    /// `f` must leave the snapshot untouched when it returns `false`.
    fn update(&self, f: impl FnOnce(&mut RunSnapshot) -> bool) -> bool {
        let instance = self.instance;
        self.snapshot.send_if_modified(|snap| {
            if snap.instance != instance {
                debug!("Run #{}: dropping stale update", instance);
                return false;
            }
            f(snap)
        })
    }

    fn advance(&self, phase: Phase, message: impl Into<String>) -> bool {
        self.update(|snap| snap.advance(phase, message))
    }

    fn abort(&self, message: String) {
        warn!("Run #{}: {}", self.instance, message);
        self.advance(Phase::Aborted, message);
    }

    async fn drive(self) {
        if !self.advance(Phase::Probing, "Pinging API...") {
            return;
        }
        let outcome = health::probe(self.service.as_ref()).await;
        if !outcome.is_healthy() {
            self.abort(health_failure(&outcome));
            return;
        }

        if !self.advance(Phase::CreatingProject, "API OK. Creating project...") {
            return;
        }
        let project_id = match self.service.create_project(&self.request.project_name).await {
            Ok(id) => id,
            Err(e) => {
                self.abort(format!("Create failed ({})", e));
                return;
            }
        };

        let moved = self.update(|snap| {
            let moved = snap.advance(Phase::Submitting, "Queuing run...");
            if moved {
                snap.project_id = project_id.clone();
            }
            moved
        });
        if !moved {
            return;
        }
        let req = CreateRun {
            project_id,
            language: self.request.language.clone(),
            code: self.request.code.clone(),
        };
        let run_id = match self.service.submit_run(&req).await {
            Ok(id) => id,
            Err(e) => {
                self.abort(format!("Run failed ({})", e));
                return;
            }
        };

        let moved = self.update(|snap| {
            let moved = snap.advance(Phase::Polling, "Polling...");
            if moved {
                snap.run_id = run_id.clone();
            }
            moved
        });
        if moved {
            self.poll(&run_id).await;
        }
    }

    /// Polls until a terminal status, a failed poll, or loss of ownership
    async fn poll(&self, run_id: &str) {
        let _guard = PollGuard::enter(&self.poll_loops);
        let mut ticker = time::interval_at(Instant::now() + self.poll_interval, self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            let polled = self.service.run_status(run_id).await;
            // The next poll starts one full interval after this one returned.
            ticker.reset();

            match polled {
                Ok(status) => {
                    let terminal = status.terminal();
                    debug!("Run #{}: status {}", self.instance, status.status);

                    let current = self.update(|snap| {
                        if snap.phase != Phase::Polling || snap.run_id != run_id {
                            return false;
                        }
                        snap.last_payload = Some(status);
                        if let Some(done) = terminal {
                            snap.advance(Phase::Terminal(done), format!("Run {}.", done));
                        }
                        true
                    });

                    if !current || terminal.is_some() {
                        break;
                    }
                }
                Err(e) => {
                    self.abort(format!("Polling error: {}", e));
                    break;
                }
            }
        }
    }
}

fn health_failure(outcome: &ProbeOutcome) -> String {
    format!("Auto-run failed: {}", outcome.reason())
}

//! Health prober
//!
//! Probes `GET {endpoint}/healthz` whenever the endpoint changes and
//! publishes the resulting [`HealthState`] on a watch channel.
//!
//! Every probe is tagged with the generation of the target it was issued
//! for. A completion whose generation is no longer current is discarded, so
//! a slow probe of an old endpoint can never overwrite the state of the new
//! one. The superseded task is also aborted, but the tag check is what makes
//! the result safe.

use scw_client::{ClientError, Connector, ScwService};
use scw_core::Endpoint;
use scw_core::domain::health::HealthState;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Result of a single probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// No endpoint, no network call made
    NoEndpoint,
    Healthy,
    /// The service answered with a non-success status
    HttpStatus(u16),
    /// The service could not be reached
    Unreachable(String),
}

impl ProbeOutcome {
    pub fn from_result(result: Result<(), ClientError>) -> Self {
        match result {
            Ok(()) => ProbeOutcome::Healthy,
            Err(e) => match e.status() {
                Some(status) => ProbeOutcome::HttpStatus(status),
                None => ProbeOutcome::Unreachable(e.to_string()),
            },
        }
    }

    pub fn health(&self) -> HealthState {
        match self {
            ProbeOutcome::NoEndpoint => HealthState::Unknown,
            ProbeOutcome::Healthy => HealthState::Healthy,
            ProbeOutcome::HttpStatus(_) | ProbeOutcome::Unreachable(_) => HealthState::Unhealthy,
        }
    }

    pub fn is_healthy(&self) -> bool {
        *self == ProbeOutcome::Healthy
    }

    /// Short reason, suitable for embedding in a longer message
    pub fn reason(&self) -> String {
        match self {
            ProbeOutcome::NoEndpoint => "no endpoint".to_string(),
            ProbeOutcome::Healthy => "healthy".to_string(),
            ProbeOutcome::HttpStatus(status) => format!("healthz HTTP {}", status),
            ProbeOutcome::Unreachable(reason) => reason.clone(),
        }
    }

    /// User-facing status message
    pub fn message(&self) -> String {
        match self {
            ProbeOutcome::NoEndpoint => "No API URL yet.".to_string(),
            ProbeOutcome::Healthy => "API OK.".to_string(),
            ProbeOutcome::HttpStatus(status) => format!("API not healthy (HTTP {}).", status),
            ProbeOutcome::Unreachable(reason) => format!("Ping failed: {}", reason),
        }
    }
}

/// Probes one service
pub async fn probe(service: &dyn ScwService) -> ProbeOutcome {
    ProbeOutcome::from_result(service.health().await)
}

#[derive(Debug, Default)]
struct Target {
    generation: u64,
    endpoint: Endpoint,
}

/// Owner of the current [`HealthState`]
pub struct HealthProber {
    connector: Arc<dyn Connector>,
    state: Arc<watch::Sender<HealthState>>,
    target: Arc<Mutex<Target>>,
    inflight: Mutex<Option<JoinHandle<()>>>,
}

impl HealthProber {
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        let (state, _) = watch::channel(HealthState::Unknown);
        Self {
            connector,
            state: Arc::new(state),
            target: Arc::new(Mutex::new(Target::default())),
            inflight: Mutex::new(None),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<HealthState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> HealthState {
        *self.state.borrow()
    }

    /// Retargets the prober and probes in the background
    ///
    /// The empty endpoint resets the state to `Unknown` without a call.
    pub fn watch(&self, endpoint: &Endpoint) {
        let generation = self.retarget(endpoint);

        if endpoint.is_empty() {
            apply_if_current(&self.target, &self.state, generation, HealthState::Unknown);
            return;
        }

        let service = self.connector.connect(endpoint);
        let target = Arc::clone(&self.target);
        let state = Arc::clone(&self.state);

        let handle = tokio::spawn(async move {
            let outcome = probe(service.as_ref()).await;
            debug!("Probe of {}: {}", service.endpoint(), outcome.reason());
            apply_if_current(&target, &state, generation, outcome.health());
        });

        let mut inflight = self.inflight.lock().unwrap_or_else(PoisonError::into_inner);
        *inflight = Some(handle);
    }

    /// Probes in the foreground and returns the outcome
    ///
    /// Pinging without an endpoint marks the state unhealthy. The outcome is
    /// returned even when it went stale; only the published state is guarded.
    pub async fn ping(&self, endpoint: &Endpoint) -> ProbeOutcome {
        let generation = self.retarget(endpoint);

        if endpoint.is_empty() {
            apply_if_current(&self.target, &self.state, generation, HealthState::Unhealthy);
            return ProbeOutcome::NoEndpoint;
        }

        let service = self.connector.connect(endpoint);
        let outcome = probe(service.as_ref()).await;
        info!("Ping of {}: {}", endpoint, outcome.reason());
        apply_if_current(&self.target, &self.state, generation, outcome.health());
        outcome
    }

    /// Makes `endpoint` the current target and stops the previous probe
    fn retarget(&self, endpoint: &Endpoint) -> u64 {
        let generation = {
            let mut target = self.target.lock().unwrap_or_else(PoisonError::into_inner);
            target.generation += 1;
            target.endpoint = endpoint.clone();
            target.generation
        };

        let mut inflight = self.inflight.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = inflight.take() {
            handle.abort();
        }

        generation
    }
}

impl Drop for HealthProber {
    fn drop(&mut self) {
        let inflight = self.inflight.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = inflight.take() {
            handle.abort();
        }
    }
}

fn apply_if_current(
    target: &Mutex<Target>,
    state: &watch::Sender<HealthState>,
    generation: u64,
    health: HealthState,
) -> bool {
    let target = target.lock().unwrap_or_else(PoisonError::into_inner);
    if target.generation != generation {
        warn!(
            "Discarding stale health result ({}) for generation {}, current is {} ({})",
            health, generation, target.generation, target.endpoint
        );
        return false;
    }
    state.send_replace(health);
    true
}

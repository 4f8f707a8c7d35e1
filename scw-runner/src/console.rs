//! Console coordinator
//!
//! Wires the resolver, the preference slot, the health prober and the run
//! controller together and exposes the user intents of the presentation
//! layer. The console owns the current endpoint and its provenance; every
//! change of endpoint retargets the prober and, with auto-run, starts a
//! fresh lifecycle.

use anyhow::{Context, Result};
use scw_client::{Connector, HttpConnector};
use scw_core::Endpoint;
use scw_core::domain::health::HealthState;
use scw_core::domain::provenance::Provenance;
use scw_core::domain::run::RunRequest;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tracing::info;

use crate::config::Config;
use crate::discovery::{Resolution, Resolver};
use crate::health::{HealthProber, ProbeOutcome};
use crate::lifecycle::{NO_ENDPOINT_MESSAGE, RunController, RunSnapshot};
use crate::store::{EndpointPreference, FileStore, MemoryStore, PreferenceStore};

const DETECT_FAILED_MESSAGE: &str = "Could not detect automatically. Please paste API URL.";

#[derive(Debug, Default)]
struct Current {
    endpoint: Endpoint,
    provenance: Provenance,
    trace: Vec<String>,
    message: String,
}

pub struct Console {
    auto_run: bool,
    run_defaults: RunRequest,
    resolver: Resolver,
    preference: EndpointPreference,
    prober: HealthProber,
    runs: RunController,
    current: Mutex<Current>,
}

impl Console {
    pub fn new(
        config: Config,
        store: Arc<dyn PreferenceStore>,
        connector: Arc<dyn Connector>,
    ) -> Result<Self> {
        config.validate().context("Invalid configuration")?;

        let preference = EndpointPreference::new(store);
        let resolver = Resolver::new(
            config.builtin_url.as_deref(),
            preference.clone(),
            config.browsing_context()?,
            config.host_rules,
            Arc::clone(&connector),
        );

        Ok(Self {
            auto_run: config.auto_run,
            run_defaults: config.run_defaults,
            resolver,
            preference,
            prober: HealthProber::new(Arc::clone(&connector)),
            runs: RunController::new(connector, config.poll_interval),
            current: Mutex::new(Current::default()),
        })
    }

    /// Builds a console talking HTTP, with a file store when a path is configured
    pub fn from_config(config: Config) -> Result<Self> {
        let store: Arc<dyn PreferenceStore> = match &config.preferences_path {
            Some(path) => {
                let store = FileStore::new(path);
                info!("Preferences stored in {}", store.path().display());
                Arc::new(store)
            }
            None => Arc::new(MemoryStore::new()),
        };
        let connector = HttpConnector::new(config.request_timeout)
            .context("Failed to build HTTP client")?;

        Self::new(config, store, Arc::new(connector))
    }

    /// Resolves once and applies the result
    pub async fn startup(&self) -> Resolution {
        let resolution = self.resolver.resolve().await;
        self.apply_resolution(&resolution, true).await;
        resolution
    }

    /// Re-runs the whole cascade from the first tier
    pub async fn auto_detect(&self) -> Resolution {
        self.set_message("Auto-detecting...");
        let resolution = self.resolver.resolve().await;
        self.apply_resolution(&resolution, false).await;
        resolution
    }

    /// Commits a manually entered URL and persists it
    ///
    /// A blank entry clears both the endpoint and the saved value.
    pub async fn enter_manual(&self, raw: &str) -> Endpoint {
        let endpoint = Endpoint::new(raw);
        self.preference.set(&endpoint);

        let (provenance, message) = if endpoint.is_empty() {
            (Provenance::None, NO_ENDPOINT_MESSAGE.to_string())
        } else {
            (Provenance::ManualEntry, using(Provenance::ManualEntry))
        };
        self.apply(endpoint.clone(), provenance, None, message, false)
            .await;
        endpoint
    }

    /// Switches to the built-in URL and saves it; false when there is none
    pub async fn use_builtin(&self) -> bool {
        let Some(builtin) = self.resolver.builtin().cloned() else {
            self.set_message("No built-in API URL configured.");
            return false;
        };

        self.preference.set(&builtin);
        self.apply(
            builtin,
            Provenance::BuiltInConfig,
            None,
            using(Provenance::BuiltInConfig),
            false,
        )
        .await;
        true
    }

    /// Switches to the saved URL; false when nothing is saved
    pub async fn use_saved(&self) -> bool {
        let Some(saved) = self.preference.get() else {
            self.set_message("No saved API URL.");
            return false;
        };

        self.apply(
            saved,
            Provenance::PersistedPreference,
            None,
            using(Provenance::PersistedPreference),
            false,
        )
        .await;
        true
    }

    /// Probes the current endpoint in the foreground
    pub async fn ping(&self) -> ProbeOutcome {
        let endpoint = self.endpoint();
        if !endpoint.is_empty() {
            self.set_message("Pinging API...");
        }
        let outcome = self.prober.ping(&endpoint).await;
        self.set_message(outcome.message());
        outcome
    }

    /// Forgets the saved URL and resolves from scratch
    pub async fn reset(&self) -> Resolution {
        info!("Resetting saved API URL");
        self.preference.clear();
        {
            let mut current = self.lock();
            current.provenance = Provenance::None;
        }

        let resolution = self.resolver.resolve().await;
        self.apply_resolution(&resolution, true).await;
        resolution
    }

    /// Starts a fresh lifecycle on the current endpoint
    ///
    /// Returns the instance number to watch for in [`Console::lifecycle`].
    pub async fn run(&self, request: Option<RunRequest>) -> u64 {
        let request = request.unwrap_or_else(|| self.run_defaults.clone());
        self.runs.start(self.endpoint(), request).await
    }

    /// Stops the current lifecycle if it is still in flight
    pub async fn cancel_run(&self, reason: &str) {
        self.runs.cancel(reason).await;
    }

    /// A built-in URL exists but something else is in use
    pub fn builtin_overridden(&self) -> bool {
        let current = self.lock();
        match self.resolver.builtin() {
            Some(builtin) => {
                *builtin != current.endpoint && current.provenance != Provenance::BuiltInConfig
            }
            None => false,
        }
    }

    /// A saved URL exists and differs from the current one
    pub fn saved_differs(&self) -> bool {
        let endpoint = self.endpoint();
        self.preference.get().is_some_and(|saved| saved != endpoint)
    }

    pub fn endpoint(&self) -> Endpoint {
        self.lock().endpoint.clone()
    }

    pub fn provenance(&self) -> Provenance {
        self.lock().provenance
    }

    /// Discovery guide from the last cascade run
    pub fn trace(&self) -> Vec<String> {
        self.lock().trace.clone()
    }

    pub fn status_message(&self) -> String {
        self.lock().message.clone()
    }

    pub fn builtin(&self) -> Option<Endpoint> {
        self.resolver.builtin().cloned()
    }

    pub fn saved(&self) -> Option<Endpoint> {
        self.preference.get()
    }

    pub fn health(&self) -> watch::Receiver<HealthState> {
        self.prober.subscribe()
    }

    pub fn health_state(&self) -> HealthState {
        self.prober.state()
    }

    pub fn lifecycle(&self) -> watch::Receiver<RunSnapshot> {
        self.runs.subscribe()
    }

    pub fn run_snapshot(&self) -> RunSnapshot {
        self.runs.snapshot()
    }

    pub fn active_poll_loops(&self) -> usize {
        self.runs.active_poll_loops()
    }

    async fn apply_resolution(&self, resolution: &Resolution, force: bool) {
        let message = if resolution.is_resolved() {
            using(resolution.provenance)
        } else {
            DETECT_FAILED_MESSAGE.to_string()
        };
        self.apply(
            resolution.endpoint.clone(),
            resolution.provenance,
            Some(resolution.trace.clone()),
            message,
            force,
        )
        .await;
    }

    /// Makes `endpoint` current and reacts if it changed (or when forced)
    async fn apply(
        &self,
        endpoint: Endpoint,
        provenance: Provenance,
        trace: Option<Vec<String>>,
        message: String,
        force: bool,
    ) {
        let changed = {
            let mut current = self.lock();
            let changed = current.endpoint != endpoint;
            current.endpoint = endpoint.clone();
            current.provenance = provenance;
            if let Some(trace) = trace {
                current.trace = trace;
            }
            current.message = message;
            changed
        };

        if !changed && !force {
            return;
        }
        info!("API URL is now '{}' ({})", endpoint, provenance);

        self.prober.watch(&endpoint);
        if self.auto_run {
            self.runs.start(endpoint, self.run_defaults.clone()).await;
        } else if self.runs.snapshot().endpoint != endpoint {
            self.runs.cancel("Endpoint changed; run abandoned.").await;
        }
    }

    fn set_message(&self, message: impl Into<String>) {
        self.lock().message = message.into();
    }

    fn lock(&self) -> MutexGuard<'_, Current> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn using(provenance: Provenance) -> String {
    format!("Using {}.", provenance.describe())
}

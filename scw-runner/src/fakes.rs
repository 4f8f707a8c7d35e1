//! Scripted service fakes for tests

use async_trait::async_trait;
use scw_client::{ClientError, Connector, ScwService};
use scw_core::Endpoint;
use scw_core::domain::run::RunStatus;
use scw_core::dto::run::CreateRun;
use scw_core::dto::system::WhoAmI;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::Instant;

/// Canned answer for one call
#[derive(Debug, Clone)]
pub enum Reply<T> {
    Ok(T),
    /// Non-success status with a body
    Http(u16, &'static str),
    /// Success status with a body missing the expected field
    BadShape(&'static str),
    /// No HTTP answer at all
    Down,
}

impl<T: Clone> Reply<T> {
    fn result(&self) -> Result<T, ClientError> {
        match self {
            Reply::Ok(value) => Ok(value.clone()),
            Reply::Http(status, body) => Err(ClientError::api_error(*status, body)),
            Reply::BadShape(body) => Err(ClientError::contract_violation(200, body)),
            // A reqwest transport error cannot be built by hand; any error
            // without a status is treated as "no answer" by callers.
            Reply::Down => Err(ClientError::ParseError("connection refused".to_string())),
        }
    }
}

/// Queue of replies; the fallback repeats once the queue is drained
struct Replies<T> {
    queue: Mutex<VecDeque<Reply<T>>>,
    fallback: Reply<T>,
}

impl<T: Clone> Replies<T> {
    fn new(fallback: Reply<T>) -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            fallback,
        }
    }

    fn queued(replies: Vec<Reply<T>>, fallback: Reply<T>) -> Self {
        Self {
            queue: Mutex::new(replies.into()),
            fallback,
        }
    }

    fn next(&self) -> Result<T, ClientError> {
        let reply = self.queue.lock().unwrap().pop_front();
        reply.unwrap_or_else(|| self.fallback.clone()).result()
    }
}

pub fn status(value: &str) -> RunStatus {
    RunStatus {
        status: value.to_string(),
        ..RunStatus::default()
    }
}

pub fn status_with_result(value: &str, result: &str) -> RunStatus {
    RunStatus {
        status: value.to_string(),
        result: Some(result.into()),
        ..RunStatus::default()
    }
}

/// Scripted stand-in for one remote endpoint
pub struct FakeService {
    endpoint: Endpoint,
    health: Replies<()>,
    whoami: Replies<WhoAmI>,
    projects: Replies<String>,
    runs: Replies<String>,
    statuses: Replies<RunStatus>,
    health_gate: Option<Arc<Notify>>,
    project_gate: Option<Arc<Notify>>,
    submit_gate: Option<Arc<Notify>>,
    status_delay: Duration,
    status_starts: Mutex<Vec<Instant>>,
    calls: Mutex<Vec<String>>,
}

impl FakeService {
    /// A healthy service answering `p1`, `r1` and then `running` forever
    pub fn new(endpoint: &str) -> Self {
        Self {
            endpoint: Endpoint::new(endpoint),
            health: Replies::new(Reply::Ok(())),
            whoami: Replies::new(Reply::Http(404, r#"{"detail":"Not Found"}"#)),
            projects: Replies::new(Reply::Ok("p1".to_string())),
            runs: Replies::new(Reply::Ok("r1".to_string())),
            statuses: Replies::new(Reply::Ok(status("running"))),
            health_gate: None,
            project_gate: None,
            submit_gate: None,
            status_delay: Duration::ZERO,
            status_starts: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// A service that never answers
    pub fn unreachable(endpoint: &Endpoint) -> Self {
        Self::new(endpoint.as_str())
            .with_health(Reply::Down)
            .with_whoami(Reply::Down)
            .with_project(Reply::Down)
            .with_runs(vec![Reply::Down])
            .with_statuses(vec![Reply::Down])
    }

    pub fn with_health(mut self, reply: Reply<()>) -> Self {
        self.health = Replies::new(reply);
        self
    }

    pub fn with_whoami(mut self, reply: Reply<WhoAmI>) -> Self {
        self.whoami = Replies::new(reply);
        self
    }

    pub fn with_project(mut self, reply: Reply<String>) -> Self {
        self.projects = Replies::new(reply);
        self
    }

    /// Replies for successive submissions; the last one repeats
    pub fn with_runs(mut self, mut replies: Vec<Reply<String>>) -> Self {
        let fallback = replies.pop().unwrap_or(Reply::Down);
        self.runs = Replies::queued(replies, fallback);
        self
    }

    /// Replies for successive polls; the last one repeats
    pub fn with_statuses(mut self, mut replies: Vec<Reply<RunStatus>>) -> Self {
        let fallback = replies.pop().unwrap_or(Reply::Down);
        self.statuses = Replies::queued(replies, fallback);
        self
    }

    /// Health checks block until the gate is notified
    pub fn with_health_gate(mut self, gate: Arc<Notify>) -> Self {
        self.health_gate = Some(gate);
        self
    }

    /// Project creation blocks until the gate is notified
    pub fn with_project_gate(mut self, gate: Arc<Notify>) -> Self {
        self.project_gate = Some(gate);
        self
    }

    /// Run submission blocks until the gate is notified
    pub fn with_submit_gate(mut self, gate: Arc<Notify>) -> Self {
        self.submit_gate = Some(gate);
        self
    }

    /// Every status poll takes `delay` to answer
    pub fn with_status_delay(mut self, delay: Duration) -> Self {
        self.status_delay = delay;
        self
    }

    /// When each status poll was issued
    pub fn status_starts(&self) -> Vec<Instant> {
        self.status_starts.lock().unwrap().clone()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ScwService for FakeService {
    fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    async fn health(&self) -> scw_client::Result<()> {
        self.record("health".to_string());
        if let Some(gate) = &self.health_gate {
            gate.notified().await;
        }
        self.health.next()
    }

    async fn whoami(&self) -> scw_client::Result<WhoAmI> {
        self.record("whoami".to_string());
        self.whoami.next()
    }

    async fn create_project(&self, name: &str) -> scw_client::Result<String> {
        self.record(format!("create_project:{}", name));
        if let Some(gate) = &self.project_gate {
            gate.notified().await;
        }
        self.projects.next()
    }

    async fn submit_run(&self, req: &CreateRun) -> scw_client::Result<String> {
        self.record(format!("submit_run:{}:{}", req.project_id, req.language));
        if let Some(gate) = &self.submit_gate {
            gate.notified().await;
        }
        self.runs.next()
    }

    async fn run_status(&self, run_id: &str) -> scw_client::Result<RunStatus> {
        self.record(format!("run_status:{}", run_id));
        self.status_starts.lock().unwrap().push(Instant::now());
        if !self.status_delay.is_zero() {
            tokio::time::sleep(self.status_delay).await;
        }
        self.statuses.next()
    }
}

/// Connector handing out registered fakes
///
/// Unregistered endpoints get an unreachable service.
#[derive(Default)]
pub struct FakeConnector {
    services: Mutex<HashMap<Endpoint, Arc<FakeService>>>,
    connections: Mutex<Vec<Endpoint>>,
}

impl FakeConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, service: FakeService) -> Arc<FakeService> {
        let service = Arc::new(service);
        self.services
            .lock()
            .unwrap()
            .insert(service.endpoint.clone(), service.clone());
        service
    }

    pub fn connections(&self) -> Vec<Endpoint> {
        self.connections.lock().unwrap().clone()
    }
}

impl Connector for FakeConnector {
    fn connect(&self, endpoint: &Endpoint) -> Arc<dyn ScwService> {
        self.connections.lock().unwrap().push(endpoint.clone());
        let mut services = self.services.lock().unwrap();
        services
            .entry(endpoint.clone())
            .or_insert_with(|| Arc::new(FakeService::unreachable(endpoint)))
            .clone()
    }
}

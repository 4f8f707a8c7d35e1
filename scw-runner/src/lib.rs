//! SCW console runtime
//!
//! Locates the SCW API through a discovery cascade, keeps track of its
//! health and drives smoke runs (create project, submit run, poll) against
//! it.
//!
//! Architecture:
//! - Configuration: settings from the environment or defaults
//! - Store: the saved "last known endpoint" slot
//! - Discovery: the ordered resolution cascade
//! - Health: cancel-safe health probing
//! - Lifecycle: the submit-and-poll state machine
//! - Console: user intents tying the above together

pub mod config;
pub mod console;
pub mod discovery;
pub mod health;
pub mod lifecycle;
pub mod store;

#[cfg(test)]
mod fakes;

pub use config::Config;
pub use console::Console;
pub use discovery::{BrowsingContext, HostRule, Resolution, Resolver};
pub use health::{HealthProber, ProbeOutcome};
pub use lifecycle::{RunController, RunSnapshot};
pub use store::{EndpointPreference, FileStore, MemoryStore, NullStore, PreferenceStore};

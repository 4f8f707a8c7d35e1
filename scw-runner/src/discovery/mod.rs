//! Endpoint discovery
//!
//! Locates the remote service through a fixed cascade of strategies:
//! built-in configuration, saved preference, host-name heuristic and
//! finally the same-origin `/whoami` probe.

mod heuristic;
mod resolver;

pub use heuristic::{BrowsingContext, HostRule, default_host_rules};
pub use resolver::{Resolution, Resolver};

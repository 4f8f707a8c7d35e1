//! Run lifecycle
//!
//! Drives one unit of work through probe -> create project -> submit ->
//! poll until a terminal state, publishing every step as a [`RunSnapshot`].
//! Each attempt is a fresh instance; starting a new one stops the previous
//! instance and its poll loop first.

mod controller;
mod snapshot;

pub use controller::{NO_ENDPOINT_MESSAGE, RunController};
pub use snapshot::RunSnapshot;

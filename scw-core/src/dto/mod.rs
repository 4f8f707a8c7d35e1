//! Data Transfer Objects for the remote service contract
//!
//! Request bodies are sent as JSON; response bodies are parsed leniently
//! so that a success status with a malformed body can be reported as a
//! contract violation instead of a parse failure.

pub mod project;
pub mod run;
pub mod system;

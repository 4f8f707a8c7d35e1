//! Core domain types
//!
//! This module contains the domain structures shared by the discovery,
//! health and run lifecycle components. They describe client-side state
//! only; the remote service owns its own model.

pub mod health;
pub mod provenance;
pub mod run;

//! SCW Core
//!
//! Core types and abstractions shared by the SCW client components.
//!
//! This crate contains:
//! - Endpoint: the normalized base URL of the remote service
//! - Domain types: provenance, health and run lifecycle phases
//! - DTOs: request/response bodies of the remote service contract

pub mod domain;
pub mod dto;
pub mod endpoint;

pub use endpoint::{Endpoint, normalize};

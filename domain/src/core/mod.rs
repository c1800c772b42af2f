//! Core domain concepts shared across all subdomains.
//!
//! - [`model::Model`]: model identifiers
//! - [`query::Query`]: a validated task submitted for exploration
//! - [`sampling`]: temperature ranges and per-call sampling parameters
//! - [`error::DomainError`]: domain-level errors

pub mod error;
pub mod model;
pub mod query;
pub mod sampling;

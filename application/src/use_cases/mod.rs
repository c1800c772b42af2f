//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod explore;
pub mod run_superposition;

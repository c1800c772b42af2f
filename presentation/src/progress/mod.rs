//! Progress reporting for superposition runs

pub mod reporter;

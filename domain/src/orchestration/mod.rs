//! Orchestration vocabulary shared by the explorer and the presentation layer.

pub mod phase;

pub use phase::Phase;

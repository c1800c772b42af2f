//! Hypotheses: independent parallel attempts at answering a query.

pub mod entities;
pub mod parsing;
pub mod value_objects;

pub use entities::{Hypothesis, HypothesisId, HypothesisStatus};
pub use parsing::{parse_confidence_value, split_confidence};
pub use value_objects::{ModelOutput, ModelRequest, TokenUsage};

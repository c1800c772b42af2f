//! Prompt construction for hypotheses.

pub mod template;

pub use template::{Framing, PromptTemplate};

//! Output formatting for superposition results

pub mod console;
pub mod formatter;

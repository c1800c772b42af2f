//! Shared context: the append-only log agents read from and write to.
//!
//! A small event-sourcing pattern. Entries link to their causal predecessors,
//! so a correction is a new entry pointing at the one it supersedes.

pub mod bus;
pub mod entities;

pub use bus::{ContextBus, ContextSlice};
pub use entities::{AgentId, ContextDraft, ContextEntry, Cursor, EntryId};

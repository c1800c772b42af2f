//! Context log entries and cursors.

use serde::{Deserialize, Serialize};

/// Commit sequence number of a context entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(u64);

impl EntryId {
    pub fn new(seq: u64) -> Self {
        Self(seq)
    }

    pub fn seq(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifier of an agent writing to the context log.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(String);

impl AgentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A committed, immutable context log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextEntry {
    pub id: EntryId,
    pub author: AgentId,
    pub timestamp_ms: u64,
    pub content: String,
    /// Entries this one builds on or supersedes
    pub predecessors: Vec<EntryId>,
}

/// An entry waiting to be appended. The bus assigns id and timestamp at commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextDraft {
    pub author: AgentId,
    pub content: String,
    pub predecessors: Vec<EntryId>,
}

impl ContextDraft {
    pub fn new(author: AgentId, content: impl Into<String>) -> Self {
        Self {
            author,
            content: content.into(),
            predecessors: Vec::new(),
        }
    }

    pub fn with_predecessors(mut self, predecessors: impl IntoIterator<Item = EntryId>) -> Self {
        self.predecessors.extend(predecessors);
        self
    }

    /// A correction: a new entry that supersedes `original`.
    pub fn correction_of(author: AgentId, original: EntryId, content: impl Into<String>) -> Self {
        Self::new(author, content).with_predecessors([original])
    }
}

/// A position in the context log: the number of entries already observed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Cursor(u64);

impl Cursor {
    /// Position before the first entry.
    pub fn origin() -> Self {
        Self(0)
    }

    pub fn new(position: u64) -> Self {
        Self(position)
    }

    pub fn position(&self) -> u64 {
        self.0
    }
}

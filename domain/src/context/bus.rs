//! Append-only shared context log.

use super::entities::{ContextDraft, ContextEntry, Cursor, EntryId};
use crate::core::error::DomainError;
use crate::util::now_millis;
use std::sync::{Arc, PoisonError, RwLock};

/// Shared, append-only context store used by concurrent agents.
///
/// Entries are never updated or deleted; corrections are new entries that
/// name the superseded entry as a predecessor. An entry's id equals its
/// commit position, so ids are dense and ordered by commit.
///
/// The write lock is held only for the commit push. Readers clone `Arc`s out
/// of the log and iterate without holding any lock.
#[derive(Debug, Default)]
pub struct ContextBus {
    log: RwLock<Vec<Arc<ContextEntry>>>,
}

impl ContextBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry, returning its id.
    ///
    /// Every predecessor must already be committed, otherwise `NotFound`.
    pub fn append(&self, draft: ContextDraft) -> Result<EntryId, DomainError> {
        let mut log = self.log.write().unwrap_or_else(PoisonError::into_inner);

        let head = log.len() as u64;
        if let Some(missing) = draft.predecessors.iter().find(|p| p.seq() >= head) {
            return Err(DomainError::NotFound(format!("context entry {}", missing)));
        }

        let id = EntryId::new(head);
        log.push(Arc::new(ContextEntry {
            id,
            author: draft.author,
            timestamp_ms: now_millis(),
            content: draft.content,
            predecessors: draft.predecessors,
        }));
        Ok(id)
    }

    /// The current head: reading from here yields only future entries.
    pub fn cursor(&self) -> Cursor {
        Cursor::new(self.len() as u64)
    }

    /// Entries committed after `cursor`, as of this call.
    pub fn read_since(&self, cursor: Cursor) -> ContextSlice {
        let log = self.log.read().unwrap_or_else(PoisonError::into_inner);
        let start = (cursor.position() as usize).min(log.len());
        ContextSlice {
            entries: log[start..].to_vec(),
            next: Cursor::new(log.len() as u64),
        }
    }

    pub fn get(&self, id: EntryId) -> Option<Arc<ContextEntry>> {
        let log = self.log.read().unwrap_or_else(PoisonError::into_inner);
        log.get(id.seq() as usize).cloned()
    }

    /// Entries that name `id` as a predecessor, in commit order.
    pub fn corrections_of(&self, id: EntryId) -> Vec<Arc<ContextEntry>> {
        self.read_since(Cursor::new(id.seq() + 1))
            .into_iter()
            .filter(|e| e.predecessors.contains(&id))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.log.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A finite snapshot of context entries.
///
/// Iterating is lazy and can be restarted with [`ContextSlice::iter`] any
/// number of times. It is not a live subscription: poll
/// [`ContextBus::read_since`] again with [`ContextSlice::next_cursor`] to see
/// newer entries.
#[derive(Debug, Clone)]
pub struct ContextSlice {
    entries: Vec<Arc<ContextEntry>>,
    next: Cursor,
}

impl ContextSlice {
    pub fn iter(&self) -> impl Iterator<Item = &ContextEntry> + '_ {
        self.entries.iter().map(|e| e.as_ref())
    }

    /// Cursor to pass to the next `read_since` call.
    pub fn next_cursor(&self) -> Cursor {
        self.next
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IntoIterator for ContextSlice {
    type Item = Arc<ContextEntry>;
    type IntoIter = std::vec::IntoIter<Arc<ContextEntry>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

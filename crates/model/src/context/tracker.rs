//! Change tracker
//!
//! Holds one entry per tracked instance identity, pairing the boxed
//! record with its lifecycle state. The underlying commit resets every
//! state to `Unchanged` the moment it succeeds; anything that needs the
//! pre-commit states afterwards must snapshot them first.

use crate::model::record::Record;

/// Lifecycle state of a tracked entry at commit time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    Added,
    Modified,
    Deleted,
    Unchanged,
}

impl EntryState {
    /// Does this entry have a pending write?
    pub fn is_pending(self) -> bool {
        !matches!(self, EntryState::Unchanged)
    }
}

/// A tracked record together with its lifecycle state.
#[derive(Debug)]
pub struct TrackedEntry {
    record: Box<dyn Record>,
    state: EntryState,
}

impl TrackedEntry {
    pub fn record(&self) -> &dyn Record {
        self.record.as_ref()
    }

    pub fn state(&self) -> EntryState {
        self.state
    }

    pub(crate) fn record_mut(&mut self) -> &mut dyn Record {
        self.record.as_mut()
    }
}

/// Tracked-entry set owned by one persistence context.
#[derive(Debug, Default)]
pub struct ChangeTracker {
    entries: Vec<TrackedEntry>,
}

impl ChangeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a record with the given state.
    ///
    /// Identity is `(concrete type, primary key)`: re-registering a
    /// replacement value for a keyed identity swaps the value into the
    /// existing entry instead of creating a second one. An entry that is
    /// still `Added` stays `Added` when a replacement arrives as
    /// `Modified`, since the row has not been inserted yet.
    pub fn track(&mut self, record: Box<dyn Record>, state: EntryState) {
        if let Some(key) = record.primary_key() {
            let type_id = record.as_any().type_id();
            let existing = self.entries.iter_mut().find(|entry| {
                entry.record.as_any().type_id() == type_id
                    && entry.record.primary_key() == Some(key)
            });
            if let Some(entry) = existing {
                entry.record = record;
                entry.state = match (entry.state, state) {
                    (EntryState::Added, EntryState::Modified) => EntryState::Added,
                    _ => state,
                };
                return;
            }
        }
        self.entries.push(TrackedEntry { record, state });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[TrackedEntry] {
        &self.entries
    }

    /// Number of entries with a pending write.
    pub fn pending_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.state.is_pending())
            .count()
    }

    pub(crate) fn entry_at(&self, index: usize) -> Option<&TrackedEntry> {
        self.entries.get(index)
    }

    pub(crate) fn entry_at_mut(&mut self, index: usize) -> Option<&mut TrackedEntry> {
        self.entries.get_mut(index)
    }

    /// The post-commit reset performed by the underlying runtime: every
    /// state becomes `Unchanged`, destroying the pending-state information.
    pub(crate) fn reset_to_unchanged(&mut self) {
        for entry in &mut self.entries {
            entry.state = EntryState::Unchanged;
        }
    }

    /// Drop all entries, e.g. between logical units of work.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

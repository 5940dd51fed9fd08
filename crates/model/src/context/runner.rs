//! Callback runner - the before/after lifecycle protocol
//!
//! Before-callbacks run over the live tracker and capture a snapshot of
//! `(entry, state)` pairs. The underlying commit then resets every entry
//! to `Unchanged`, so after-callbacks are driven entirely from that
//! snapshot; the live states no longer say what happened.
//!
//! Per-entity sequences:
//!
//! | State    | Before                        | After                       |
//! |----------|-------------------------------|-----------------------------|
//! | Added    | before_save -> before_create  | after_create -> after_save  |
//! | Modified | before_save -> before_update  | after_update -> after_save  |
//! | Deleted  | before_destroy                | after_destroy               |
//!
//! Ordering across entities follows tracker enumeration order and is not
//! part of the contract; ordering within one entity's sequence is.

use crate::context::tracker::{ChangeTracker, EntryState};
use crate::error::ModelResult;
use crate::model::callbacks::CallbackFlags;
use crate::model::classify;

/// Pre-commit capture of which entries had which pending state.
#[derive(Debug, Default)]
pub struct CommitSnapshot {
    items: Vec<(usize, EntryState)>,
}

impl CommitSnapshot {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

pub struct CallbackRunner;

impl CallbackRunner {
    /// Run the before-sequences and snapshot the pending entity entries.
    ///
    /// The first hook error aborts immediately: remaining hooks and
    /// entities are skipped and the error propagates to the caller before
    /// anything reaches the store.
    pub async fn run_before(tracker: &mut ChangeTracker) -> ModelResult<CommitSnapshot> {
        let mut snapshot = CommitSnapshot::default();

        for index in 0..tracker.len() {
            let state = match tracker.entry_at(index) {
                Some(entry) => entry.state(),
                None => continue,
            };
            if !state.is_pending() {
                continue;
            }

            let flags = {
                let entry = match tracker.entry_at(index) {
                    Some(entry) => entry,
                    None => continue,
                };
                if !classify::is_model_type(entry.record()) {
                    continue;
                }
                classify::callback_flags(entry.record())
            };

            snapshot.items.push((index, state));

            let entity = match tracker
                .entry_at_mut(index)
                .and_then(|entry| entry.record_mut().as_entity_mut())
            {
                Some(entity) => entity,
                None => continue,
            };

            match state {
                EntryState::Added => {
                    if flags.contains(CallbackFlags::BEFORE_SAVE) {
                        entity.before_save().await?;
                    }
                    if flags.contains(CallbackFlags::BEFORE_CREATE) {
                        entity.before_create().await?;
                    }
                }
                EntryState::Modified => {
                    if flags.contains(CallbackFlags::BEFORE_SAVE) {
                        entity.before_save().await?;
                    }
                    if flags.contains(CallbackFlags::BEFORE_UPDATE) {
                        entity.before_update().await?;
                    }
                }
                EntryState::Deleted => {
                    if flags.contains(CallbackFlags::BEFORE_DESTROY) {
                        entity.before_destroy().await?;
                    }
                }
                EntryState::Unchanged => {}
            }
        }

        Ok(snapshot)
    }

    /// Run the after-sequences from the snapshot taken before the commit.
    pub async fn run_after(tracker: &ChangeTracker, snapshot: &CommitSnapshot) -> ModelResult<()> {
        for &(index, state) in &snapshot.items {
            let entry = match tracker.entry_at(index) {
                Some(entry) => entry,
                None => continue,
            };
            let flags = classify::callback_flags(entry.record());
            let entity = match entry.record().as_entity() {
                Some(entity) => entity,
                None => continue,
            };

            match state {
                EntryState::Added => {
                    if flags.contains(CallbackFlags::AFTER_CREATE) {
                        entity.after_create().await?;
                    }
                    if flags.contains(CallbackFlags::AFTER_SAVE) {
                        entity.after_save().await?;
                    }
                }
                EntryState::Modified => {
                    if flags.contains(CallbackFlags::AFTER_UPDATE) {
                        entity.after_update().await?;
                    }
                    if flags.contains(CallbackFlags::AFTER_SAVE) {
                        entity.after_save().await?;
                    }
                }
                EntryState::Deleted => {
                    if flags.contains(CallbackFlags::AFTER_DESTROY) {
                        entity.after_destroy().await?;
                    }
                }
                EntryState::Unchanged => {}
            }
        }

        Ok(())
    }
}

//! Persistence context - commit orchestration
//!
//! The only component external collaborators touch. Owns the change
//! tracker and drives one operation, `commit`: stamp timestamps, run the
//! before-callbacks, hand the write batch to the store atomically, then
//! run the after-callbacks from the pre-commit snapshot.

pub mod runner;
pub mod tracker;

pub use runner::{CallbackRunner, CommitSnapshot};
pub use tracker::{ChangeTracker, EntryState, TrackedEntry};

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::error::{ModelError, ModelResult};
use crate::model::classify;
use crate::model::entity::Model;
use crate::model::record::{FieldMap, Record};
use crate::schema::filter::FilterExpr;
use crate::schema::{EntityDef, Schema};
use crate::store::{EntityStore, WriteOp};

/// Tracks pending writes against a configured schema and commits them to
/// a backing store. Contexts are independent of one another; only the
/// process-wide classification caches are shared.
pub struct PersistenceContext {
    schema: Arc<Schema>,
    store: Arc<dyn EntityStore>,
    tracker: ChangeTracker,
}

impl PersistenceContext {
    pub fn new(schema: Arc<Schema>, store: Arc<dyn EntityStore>) -> Self {
        Self {
            schema,
            store,
            tracker: ChangeTracker::new(),
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn tracker(&self) -> &ChangeTracker {
        &self.tracker
    }

    /// Register a record for insertion.
    pub fn insert<R: Record>(&mut self, record: R) {
        self.tracker.track(Box::new(record), EntryState::Added);
    }

    /// Register a replacement value for an existing row.
    pub fn update<R: Record>(&mut self, record: R) {
        self.tracker.track(Box::new(record), EntryState::Modified);
    }

    /// Register a record for deletion. With soft deletes configured, an
    /// entity deletion commits as an update stamping `deleted_at`.
    pub fn remove<R: Record>(&mut self, record: R) {
        self.tracker.track(Box::new(record), EntryState::Deleted);
    }

    /// Commit all pending writes.
    ///
    /// Steps: timestamps, before-callbacks (with snapshot), atomic store
    /// apply, tracker reset, after-callbacks from the snapshot. A failing
    /// before-callback or store apply propagates unchanged and leaves the
    /// store untouched; mutations already made by earlier before-callbacks
    /// are not rolled back. Returns the number of writes applied.
    pub async fn commit(&mut self) -> ModelResult<usize> {
        let options = *self.schema.options();
        let now = Utc::now();

        if options.timestamps {
            self.apply_timestamps(now);
        }

        let snapshot = if options.callbacks {
            Some(CallbackRunner::run_before(&mut self.tracker).await?)
        } else {
            None
        };

        let batch = self.build_writes(now)?;
        debug!(writes = batch.len(), "committing tracked changes");

        if !batch.is_empty() {
            self.store.apply(&batch).await?;
        }

        // The underlying runtime wipes the pending states on success; the
        // snapshot above is now the only record of what just happened.
        self.tracker.reset_to_unchanged();

        if let Some(snapshot) = &snapshot {
            CallbackRunner::run_after(&self.tracker, snapshot).await?;
        }

        Ok(batch.len())
    }

    /// Synchronous variant of [`commit`](Self::commit), observably
    /// equivalent. Drives the async pipeline on a private current-thread
    /// runtime; must not be called from within an async context.
    pub fn commit_blocking(&mut self) -> ModelResult<usize> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| {
                ModelError::Configuration(format!("failed to start blocking runtime: {}", e))
            })?;
        runtime.block_on(self.commit())
    }

    /// Fetch every row of a model type, honoring its always-applied
    /// filter.
    pub async fn all<M: Model + DeserializeOwned>(&self) -> ModelResult<Vec<M>> {
        let def = self.def_of::<M>()?;
        let rows = self.store.fetch(&def.table, def.filter.as_ref()).await?;
        rows.into_iter().map(hydrate).collect()
    }

    /// Fetch every row of a model type, including soft-deleted ones.
    pub async fn all_with_deleted<M: Model + DeserializeOwned>(&self) -> ModelResult<Vec<M>> {
        let def = self.def_of::<M>()?;
        let rows = self.store.fetch(&def.table, None).await?;
        rows.into_iter().map(hydrate).collect()
    }

    /// Fetch one row by primary key, honoring the always-applied filter.
    pub async fn find<M: Model + DeserializeOwned>(&self, id: i64) -> ModelResult<Option<M>> {
        let def = self.def_of::<M>()?;
        let by_key = FilterExpr::eq_value(&def.pk_column, id);
        let filter = match &def.filter {
            Some(always) => by_key.and(always.clone()),
            None => by_key,
        };
        let rows = self.store.fetch(&def.table, Some(&filter)).await?;
        rows.into_iter().next().map(hydrate).transpose()
    }

    fn def_of<M: Model>(&self) -> ModelResult<&EntityDef> {
        self.schema
            .def_of::<M>()
            .ok_or_else(|| ModelError::Schema(format!("type '{}' is not declared", M::model_name())))
    }

    /// Stamp `created_at`/`updated_at` on pending entity entries. Types
    /// outside the entity marker are skipped after one cache lookup, and
    /// a type without the property ignores the setter.
    fn apply_timestamps(&mut self, now: DateTime<Utc>) {
        for index in 0..self.tracker.len() {
            let entry = match self.tracker.entry_at(index) {
                Some(entry) => entry,
                None => continue,
            };
            let state = entry.state();
            if !matches!(state, EntryState::Added | EntryState::Modified) {
                continue;
            }
            if !classify::is_model_type(entry.record()) {
                continue;
            }

            let entity = match self
                .tracker
                .entry_at_mut(index)
                .and_then(|entry| entry.record_mut().as_entity_mut())
            {
                Some(entity) => entity,
                None => continue,
            };

            match state {
                EntryState::Added => {
                    entity.set_created_at(now);
                    entity.set_updated_at(now);
                }
                EntryState::Modified => entity.set_updated_at(now),
                _ => {}
            }
        }
    }

    /// Map pending entries to physical writes. Soft-deletable entity
    /// deletions become updates stamping `deleted_at`.
    fn build_writes(&mut self, now: DateTime<Utc>) -> ModelResult<Vec<WriteOp>> {
        let soft_deletes = self.schema.options().soft_deletes;
        let mut batch = Vec::new();

        for index in 0..self.tracker.len() {
            let entry = match self.tracker.entry_at(index) {
                Some(entry) => entry,
                None => continue,
            };
            let state = entry.state();
            if !state.is_pending() {
                continue;
            }

            let def = self.schema.def_for(entry.record()).ok_or_else(|| {
                ModelError::Schema(format!(
                    "type '{}' is not declared",
                    entry.record().record_name()
                ))
            })?;
            let table = def.table.clone();
            let pk_column = def.pk_column.clone();
            let soft_delete = soft_deletes && def.is_entity && def.filter.is_some();

            match state {
                EntryState::Added => {
                    let fields = column_fields(entry.record(), def);
                    batch.push(WriteOp::Insert {
                        table,
                        pk_column,
                        fields,
                    });
                }
                EntryState::Modified => {
                    let key = entry
                        .record()
                        .primary_key()
                        .ok_or(ModelError::MissingPrimaryKey)?;
                    let mut fields = column_fields(entry.record(), def);
                    fields.remove(&pk_column);
                    batch.push(WriteOp::Update {
                        table,
                        pk_column,
                        key,
                        fields,
                    });
                }
                EntryState::Deleted => {
                    let key = entry
                        .record()
                        .primary_key()
                        .ok_or(ModelError::MissingPrimaryKey)?;
                    if soft_delete {
                        let entry = match self.tracker.entry_at_mut(index) {
                            Some(entry) => entry,
                            None => continue,
                        };
                        if let Some(entity) = entry.record_mut().as_entity_mut() {
                            entity.set_deleted_at(Some(now));
                        }
                        let entry = match self.tracker.entry_at(index) {
                            Some(entry) => entry,
                            None => continue,
                        };
                        let def = self.schema.def_for(entry.record()).ok_or_else(|| {
                            ModelError::Schema(format!(
                                "type '{}' is not declared",
                                entry.record().record_name()
                            ))
                        })?;
                        let mut fields = column_fields(entry.record(), def);
                        fields.remove(&pk_column);
                        batch.push(WriteOp::Update {
                            table,
                            pk_column,
                            key,
                            fields,
                        });
                    } else {
                        batch.push(WriteOp::Delete {
                            table,
                            pk_column,
                            key,
                        });
                    }
                }
                EntryState::Unchanged => {}
            }
        }

        Ok(batch)
    }
}

/// Rename a record's property fields to their configured physical columns.
fn column_fields(record: &dyn Record, def: &EntityDef) -> FieldMap {
    record
        .to_fields()
        .into_iter()
        .map(|(property, value)| {
            let column = def
                .column_for(&property)
                .map(str::to_string)
                .unwrap_or(property);
            (column, value)
        })
        .collect()
}

fn hydrate<M: DeserializeOwned>(row: FieldMap) -> ModelResult<M> {
    let value = JsonValue::Object(row.into_iter().collect());
    Ok(serde_json::from_value(value)?)
}

//! Type classification and capability detection
//!
//! Both answers are immutable for a given concrete type, so they are
//! computed at most once per `TypeId` and memoized in process-wide
//! concurrent maps. The schema builder seeds the maps for declared types;
//! the commit pipeline hits the cache on every pass afterwards.

use std::any::TypeId;

use dashmap::DashMap;
use once_cell::sync::Lazy;

use crate::model::callbacks::CallbackFlags;
use crate::model::record::Record;

static MODEL_TYPES: Lazy<DashMap<TypeId, bool>> = Lazy::new(DashMap::new);
static CALLBACK_FLAGS: Lazy<DashMap<TypeId, CallbackFlags>> = Lazy::new(DashMap::new);

/// Does this record's concrete type derive from the base-entity marker?
pub fn is_model_type(record: &dyn Record) -> bool {
    let type_id = record.as_any().type_id();
    *MODEL_TYPES
        .entry(type_id)
        .or_insert_with(|| record.as_entity().is_some())
}

/// Which lifecycle callbacks does this record's concrete type implement?
///
/// Non-entity types always report [`CallbackFlags::NONE`].
pub fn callback_flags(record: &dyn Record) -> CallbackFlags {
    let type_id = record.as_any().type_id();
    *CALLBACK_FLAGS.entry(type_id).or_insert_with(|| {
        record
            .as_entity()
            .map(|entity| entity.callbacks())
            .unwrap_or(CallbackFlags::NONE)
    })
}

/// Warm both caches for a record type, used at schema-build time.
pub(crate) fn seed(record: &dyn Record) {
    is_model_type(record);
    callback_flags(record);
}

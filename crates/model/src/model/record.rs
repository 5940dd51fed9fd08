//! Record trait - base definition for tracked values
//!
//! Anything the change tracker holds implements `Record`: domain entities
//! as well as auxiliary rows that never participate in timestamps or
//! callbacks. Field access is untyped, by name, through a JSON value map.

use std::any::Any;
use std::collections::HashMap;
use std::fmt::Debug;

use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::model::entity::Entity;

/// Untyped field-value pairs for database operations, keyed by property name.
pub type FieldMap = HashMap<String, JsonValue>;

/// Base trait for every value the persistence context can track.
pub trait Record: Any + Send + Sync + Debug {
    /// Simple type name, used for diagnostics and schema lookups
    fn record_name(&self) -> &'static str;

    /// Integer surrogate key, when assigned
    fn primary_key(&self) -> Option<i64>;

    /// Convert the record to field-value pairs for database operations
    fn to_fields(&self) -> FieldMap;

    fn as_any(&self) -> &dyn Any;

    /// View this record as a base entity, when its type derives from the
    /// entity marker. Auxiliary record types keep the `None` default.
    fn as_entity(&self) -> Option<&dyn Entity> {
        None
    }

    fn as_entity_mut(&mut self) -> Option<&mut dyn Entity> {
        None
    }
}

/// Serialize a value into a [`FieldMap`].
///
/// A value that does not serialize to a JSON object yields an empty map;
/// field application downstream is best-effort per record type.
pub fn to_field_map<T: Serialize>(value: &T) -> FieldMap {
    match serde_json::to_value(value) {
        Ok(JsonValue::Object(map)) => map.into_iter().collect(),
        _ => FieldMap::new(),
    }
}

//! Model System - Traits and per-type metadata for tracked records
//!
//! - `record`: base trait for anything the change tracker can hold
//! - `entity`: the base-entity surface with timestamps, soft deletes, and
//!   lifecycle hooks
//! - `callbacks`: the capability bitmask
//! - `classify`: process-wide type classification and capability caches

pub mod callbacks;
pub mod classify;
pub mod entity;
pub mod record;

// Re-export main types and traits for convenience
pub use callbacks::CallbackFlags;
pub use classify::{callback_flags, is_model_type};
pub use entity::{Entity, Model};
pub use record::{to_field_map, FieldMap, Record};

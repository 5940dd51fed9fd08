//! Entity trait - the base-entity surface for domain models
//!
//! Every domain entity exposes the four conventional attributes (`id`,
//! `created_at`, `updated_at`, `deleted_at`) plus the eight lifecycle
//! hooks. Accessors default to no-ops so a type without a given attribute
//! simply skips the corresponding convention, and hooks default to
//! `Ok(())` so a type implements only the callbacks it declares through
//! [`Entity::callbacks`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::callback_error::CallbackError;
use crate::model::callbacks::CallbackFlags;
use crate::model::record::Record;

/// Base-entity surface. A domain type opts in by implementing this trait
/// and overriding [`Record::as_entity`] / [`Record::as_entity_mut`] to
/// return itself.
#[async_trait]
pub trait Entity: Record {
    /// Integer surrogate key, when assigned
    fn id(&self) -> Option<i64> {
        None
    }

    fn set_id(&mut self, _id: i64) {}

    fn created_at(&self) -> Option<DateTime<Utc>> {
        None
    }

    fn set_created_at(&mut self, _timestamp: DateTime<Utc>) {}

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        None
    }

    fn set_updated_at(&mut self, _timestamp: DateTime<Utc>) {}

    fn deleted_at(&self) -> Option<DateTime<Utc>> {
        None
    }

    fn set_deleted_at(&mut self, _timestamp: Option<DateTime<Utc>>) {}

    /// Check if this entity instance is soft deleted
    fn is_soft_deleted(&self) -> bool {
        self.deleted_at().is_some()
    }

    /// Which lifecycle callbacks this type implements. A hook whose bit is
    /// not set is never invoked.
    fn callbacks(&self) -> CallbackFlags {
        CallbackFlags::NONE
    }

    async fn before_save(&mut self) -> Result<(), CallbackError> {
        Ok(())
    }

    async fn after_save(&self) -> Result<(), CallbackError> {
        Ok(())
    }

    async fn before_create(&mut self) -> Result<(), CallbackError> {
        Ok(())
    }

    async fn after_create(&self) -> Result<(), CallbackError> {
        Ok(())
    }

    async fn before_update(&mut self) -> Result<(), CallbackError> {
        Ok(())
    }

    async fn after_update(&self) -> Result<(), CallbackError> {
        Ok(())
    }

    async fn before_destroy(&mut self) -> Result<(), CallbackError> {
        Ok(())
    }

    async fn after_destroy(&self) -> Result<(), CallbackError> {
        Ok(())
    }
}

/// Static registration metadata for a declarable type. The host
/// application's registration mechanism hands these to the schema builder;
/// `Default` supplies the probe instance used for classification.
pub trait Model: Record + Default {
    /// Simple model name, e.g. `"BlogPost"`
    fn model_name() -> &'static str;

    /// Declared property names, in declaration order
    fn properties() -> &'static [&'static str];
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::record::{to_field_map, FieldMap};
    use std::any::Any;

    #[derive(Debug, Default, serde::Serialize)]
    struct Sticky {
        id: Option<i64>,
        note: String,
        deleted_at: Option<DateTime<Utc>>,
    }

    impl Record for Sticky {
        fn record_name(&self) -> &'static str {
            "Sticky"
        }

        fn primary_key(&self) -> Option<i64> {
            self.id
        }

        fn to_fields(&self) -> FieldMap {
            to_field_map(self)
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_entity(&self) -> Option<&dyn Entity> {
            Some(self)
        }

        fn as_entity_mut(&mut self) -> Option<&mut dyn Entity> {
            Some(self)
        }
    }

    #[async_trait]
    impl Entity for Sticky {
        fn id(&self) -> Option<i64> {
            self.id
        }

        fn set_id(&mut self, id: i64) {
            self.id = Some(id);
        }

        fn deleted_at(&self) -> Option<DateTime<Utc>> {
            self.deleted_at
        }

        fn set_deleted_at(&mut self, timestamp: Option<DateTime<Utc>>) {
            self.deleted_at = timestamp;
        }
    }

    #[test]
    fn test_default_accessors_are_no_ops() {
        let mut sticky = Sticky::default();
        // Sticky has no timestamp columns; the setters must not blow up.
        sticky.set_created_at(Utc::now());
        sticky.set_updated_at(Utc::now());
        assert!(sticky.created_at().is_none());
        assert!(sticky.updated_at().is_none());
    }

    #[test]
    fn test_is_soft_deleted_tracks_deleted_at() {
        let mut sticky = Sticky::default();
        assert!(!sticky.is_soft_deleted());

        sticky.set_deleted_at(Some(Utc::now()));
        assert!(sticky.is_soft_deleted());
    }

    #[tokio::test]
    async fn test_default_hooks_succeed() {
        let mut sticky = Sticky::default();
        assert!(sticky.before_save().await.is_ok());
        assert!(sticky.after_destroy().await.is_ok());
        assert!(sticky.callbacks().is_empty());
    }
}

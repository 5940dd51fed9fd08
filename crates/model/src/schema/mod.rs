//! Schema - configured metadata for declared model types
//!
//! The host application declares its types once at startup; each
//! declaration is run through the convention configurator and the result
//! is frozen into an immutable [`Schema`] shared by every persistence
//! context.

pub mod filter;

pub use filter::FilterExpr;

use std::any::TypeId;
use std::collections::HashMap;

use crate::conventions::configurator::configure;
use crate::conventions::options::ConventionOptions;
use crate::model::classify;
use crate::model::entity::Model;
use crate::model::record::Record;

/// A database-side default for a configured column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnDefault {
    /// The store's current-timestamp expression. Schema-level fallback;
    /// the engine stamps timestamps at the application layer first.
    Now,
}

/// One configured column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    /// Declared property name
    pub property: String,
    /// Physical column name
    pub column: String,
    pub default: Option<ColumnDefault>,
}

/// Configured metadata for one declared type.
#[derive(Debug, Clone)]
pub struct EntityDef {
    pub model_name: String,
    /// Physical table name
    pub table: String,
    pub columns: Vec<ColumnDef>,
    /// Physical column of the integer surrogate key
    pub pk_column: String,
    /// Whether the type derives from the base-entity marker
    pub is_entity: bool,
    /// Always-applied read filter, when soft deletes are configured
    pub filter: Option<FilterExpr>,
    pub(crate) type_id: TypeId,
}

impl EntityDef {
    /// Physical column name for a declared property.
    pub fn column_for(&self, property: &str) -> Option<&str> {
        self.columns
            .iter()
            .find(|c| c.property == property)
            .map(|c| c.column.as_str())
    }
}

/// Immutable registry of configured types plus the options they were
/// configured under.
#[derive(Debug)]
pub struct Schema {
    options: ConventionOptions,
    defs: HashMap<TypeId, EntityDef>,
}

impl Schema {
    pub fn builder(options: ConventionOptions) -> SchemaBuilder {
        SchemaBuilder {
            options,
            defs: HashMap::new(),
        }
    }

    pub fn options(&self) -> &ConventionOptions {
        &self.options
    }

    /// Configured definition for a declared model type.
    pub fn def_of<M: Model>(&self) -> Option<&EntityDef> {
        self.defs.get(&TypeId::of::<M>())
    }

    /// Configured definition for a tracked record's concrete type.
    pub fn def_for(&self, record: &dyn Record) -> Option<&EntityDef> {
        self.defs.get(&record.as_any().type_id())
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}

/// Builder collecting type declarations before freezing them into a
/// [`Schema`].
pub struct SchemaBuilder {
    options: ConventionOptions,
    defs: HashMap<TypeId, EntityDef>,
}

impl SchemaBuilder {
    /// Declare a model type. Conventions are applied immediately and the
    /// classification and capability caches are warmed for the type.
    pub fn declare<M: Model>(mut self) -> Self {
        let probe = M::default();
        classify::seed(&probe);
        let def = configure(M::model_name(), M::properties(), &probe, &self.options);
        self.defs.insert(def.type_id, def);
        self
    }

    pub fn build(self) -> Schema {
        Schema {
            options: self.options,
            defs: self.defs,
        }
    }
}

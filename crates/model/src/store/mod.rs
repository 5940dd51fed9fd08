//! Backing-store abstraction
//!
//! The engine's only outward surface: apply a batch of writes atomically,
//! and fetch rows with an optional always-applied filter. Everything else
//! about the store (pooling, dialects, transactions) stays behind this
//! trait.

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

use async_trait::async_trait;

use crate::model::record::FieldMap;
use crate::schema::filter::FilterExpr;

/// Backing-store error types
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("row {key} not found in table '{table}'")]
    RowNotFound { table: String, key: i64 },

    #[error("duplicate key {key} in table '{table}'")]
    DuplicateKey { table: String, key: i64 },

    #[error("backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// One pending write, already mapped to physical table and column names.
#[derive(Debug, Clone)]
pub enum WriteOp {
    Insert {
        table: String,
        /// Column holding the integer surrogate key, so stores that assign
        /// keys know where to put them
        pk_column: String,
        fields: FieldMap,
    },
    Update {
        table: String,
        pk_column: String,
        key: i64,
        fields: FieldMap,
    },
    Delete {
        table: String,
        pk_column: String,
        key: i64,
    },
}

impl WriteOp {
    pub fn table(&self) -> &str {
        match self {
            WriteOp::Insert { table, .. }
            | WriteOp::Update { table, .. }
            | WriteOp::Delete { table, .. } => table,
        }
    }
}

/// Atomic batch persistence plus filtered reads.
///
/// `apply` is all-or-nothing: if any operation in the batch cannot be
/// applied, the store must be left untouched and the error returned.
#[async_trait]
pub trait EntityStore: Send + Sync {
    async fn apply(&self, batch: &[WriteOp]) -> StoreResult<()>;

    async fn fetch(&self, table: &str, filter: Option<&FilterExpr>) -> StoreResult<Vec<FieldMap>>;
}

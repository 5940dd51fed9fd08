//! In-memory store
//!
//! Table-per-name maps behind one mutex. Batches are validated in full
//! before any row is touched, which gives `apply` its all-or-nothing
//! contract without a transaction log. Intended for tests, seeders, and
//! demos.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::model::record::FieldMap;
use crate::schema::filter::FilterExpr;
use crate::store::{EntityStore, StoreError, StoreResult, WriteOp};

#[derive(Debug, Default)]
struct Table {
    rows: BTreeMap<i64, FieldMap>,
    next_key: i64,
}

impl Table {
    fn allocate_key(&mut self) -> i64 {
        self.next_key += 1;
        self.next_key
    }
}

/// In-memory [`EntityStore`] implementation.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<HashMap<String, Table>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows currently stored in a table.
    pub fn row_count(&self, table: &str) -> usize {
        self.tables
            .lock()
            .map(|tables| tables.get(table).map_or(0, |t| t.rows.len()))
            .unwrap_or(0)
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, HashMap<String, Table>>> {
        self.tables
            .lock()
            .map_err(|_| StoreError::Backend("memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn apply(&self, batch: &[WriteOp]) -> StoreResult<()> {
        let mut tables = self.lock()?;

        // Validation pass: reject the whole batch before touching a row.
        for op in batch {
            match op {
                WriteOp::Insert {
                    table,
                    pk_column,
                    fields,
                } => {
                    if let Some(key) = explicit_key(fields, pk_column) {
                        let exists = tables
                            .get(table.as_str())
                            .map_or(false, |t| t.rows.contains_key(&key));
                        if exists {
                            return Err(StoreError::DuplicateKey {
                                table: table.clone(),
                                key,
                            });
                        }
                    }
                }
                WriteOp::Update { table, key, .. } | WriteOp::Delete { table, key, .. } => {
                    let exists = tables
                        .get(table.as_str())
                        .map_or(false, |t| t.rows.contains_key(key));
                    if !exists {
                        return Err(StoreError::RowNotFound {
                            table: table.clone(),
                            key: *key,
                        });
                    }
                }
            }
        }

        for op in batch {
            match op {
                WriteOp::Insert {
                    table,
                    pk_column,
                    fields,
                } => {
                    let table = tables.entry(table.clone()).or_default();
                    let key = match explicit_key(fields, pk_column) {
                        Some(key) => {
                            table.next_key = table.next_key.max(key);
                            key
                        }
                        None => table.allocate_key(),
                    };
                    let mut row = fields.clone();
                    row.insert(pk_column.clone(), JsonValue::from(key));
                    table.rows.insert(key, row);
                }
                WriteOp::Update {
                    table, key, fields, ..
                } => {
                    if let Some(table) = tables.get_mut(table.as_str()) {
                        if let Some(row) = table.rows.get_mut(key) {
                            for (column, value) in fields {
                                row.insert(column.clone(), value.clone());
                            }
                        }
                    }
                }
                WriteOp::Delete { table, key, .. } => {
                    if let Some(table) = tables.get_mut(table.as_str()) {
                        table.rows.remove(key);
                    }
                }
            }
        }

        Ok(())
    }

    async fn fetch(&self, table: &str, filter: Option<&FilterExpr>) -> StoreResult<Vec<FieldMap>> {
        let tables = self.lock()?;
        let rows = match tables.get(table) {
            Some(table) => table
                .rows
                .values()
                .filter(|row| filter.map_or(true, |f| f.matches(row)))
                .cloned()
                .collect(),
            None => Vec::new(),
        };
        Ok(rows)
    }
}

fn explicit_key(fields: &FieldMap, pk_column: &str) -> Option<i64> {
    fields.get(pk_column).and_then(JsonValue::as_i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn insert(table: &str, fields: FieldMap) -> WriteOp {
        WriteOp::Insert {
            table: table.to_string(),
            pk_column: "id".to_string(),
            fields,
        }
    }

    fn fields(pairs: &[(&str, JsonValue)]) -> FieldMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[tokio::test]
    async fn test_insert_assigns_keys() {
        let store = MemoryStore::new();
        store
            .apply(&[
                insert("posts", fields(&[("title", json!("one"))])),
                insert("posts", fields(&[("title", json!("two"))])),
            ])
            .await
            .unwrap();

        let rows = store.fetch("posts", None).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().any(|r| r.get("id") == Some(&json!(1))));
        assert!(rows.iter().any(|r| r.get("id") == Some(&json!(2))));
    }

    #[tokio::test]
    async fn test_explicit_key_is_respected() {
        let store = MemoryStore::new();
        store
            .apply(&[insert(
                "posts",
                fields(&[("id", json!(7)), ("title", json!("seven"))]),
            )])
            .await
            .unwrap();

        store
            .apply(&[insert("posts", fields(&[("title", json!("eight"))]))])
            .await
            .unwrap();

        let rows = store.fetch("posts", None).await.unwrap();
        assert!(rows.iter().any(|r| r.get("id") == Some(&json!(8))));
    }

    #[tokio::test]
    async fn test_update_merges_fields() {
        let store = MemoryStore::new();
        store
            .apply(&[insert(
                "posts",
                fields(&[("id", json!(1)), ("title", json!("before"))]),
            )])
            .await
            .unwrap();

        store
            .apply(&[WriteOp::Update {
                table: "posts".to_string(),
                pk_column: "id".to_string(),
                key: 1,
                fields: fields(&[("title", json!("after"))]),
            }])
            .await
            .unwrap();

        let rows = store.fetch("posts", None).await.unwrap();
        assert_eq!(rows[0].get("title"), Some(&json!("after")));
        assert_eq!(rows[0].get("id"), Some(&json!(1)));
    }

    #[tokio::test]
    async fn test_delete_removes_row() {
        let store = MemoryStore::new();
        store
            .apply(&[insert("posts", fields(&[("id", json!(1))]))])
            .await
            .unwrap();

        store
            .apply(&[WriteOp::Delete {
                table: "posts".to_string(),
                pk_column: "id".to_string(),
                key: 1,
            }])
            .await
            .unwrap();

        assert_eq!(store.row_count("posts"), 0);
    }

    #[tokio::test]
    async fn test_batch_is_all_or_nothing() {
        let store = MemoryStore::new();
        let result = store
            .apply(&[
                insert("posts", fields(&[("title", json!("kept out"))])),
                WriteOp::Update {
                    table: "posts".to_string(),
                    pk_column: "id".to_string(),
                    key: 99,
                    fields: FieldMap::new(),
                },
            ])
            .await;

        match result {
            Err(StoreError::RowNotFound { table, key }) => {
                assert_eq!(table, "posts");
                assert_eq!(key, 99);
            }
            other => panic!("Expected RowNotFound, got {:?}", other),
        }
        // The valid insert in the failed batch must not have landed.
        assert_eq!(store.row_count("posts"), 0);
    }

    #[tokio::test]
    async fn test_duplicate_explicit_key_is_rejected() {
        let store = MemoryStore::new();
        store
            .apply(&[insert("posts", fields(&[("id", json!(1))]))])
            .await
            .unwrap();

        let result = store
            .apply(&[insert("posts", fields(&[("id", json!(1))]))])
            .await;

        assert!(matches!(result, Err(StoreError::DuplicateKey { .. })));
    }

    #[tokio::test]
    async fn test_fetch_applies_filter() {
        let store = MemoryStore::new();
        store
            .apply(&[
                insert(
                    "posts",
                    fields(&[("deleted_at", JsonValue::Null), ("title", json!("live"))]),
                ),
                insert(
                    "posts",
                    fields(&[
                        ("deleted_at", json!("2026-01-05T10:00:00Z")),
                        ("title", json!("gone")),
                    ]),
                ),
            ])
            .await
            .unwrap();

        let filter = FilterExpr::is_null("deleted_at");
        let rows = store.fetch("posts", Some(&filter)).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("title"), Some(&json!("live")));
    }

    #[tokio::test]
    async fn test_fetch_unknown_table_is_empty() {
        let store = MemoryStore::new();
        let rows = store.fetch("missing", None).await.unwrap();
        assert!(rows.is_empty());
    }
}

//! PostgreSQL store
//!
//! [`EntityStore`] implementation over a sqlx connection pool. A write
//! batch runs inside one transaction; parameters are bound by JSON value
//! kind and rows are decoded back into field maps by column type name.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::postgres::{PgArguments, PgPoolOptions, PgRow};
use sqlx::query::Query;
use sqlx::{Column, Pool, Postgres, Row, TypeInfo};

use async_trait::async_trait;

use crate::model::record::FieldMap;
use crate::schema::filter::FilterExpr;
use crate::store::{EntityStore, StoreError, StoreResult, WriteOp};

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}

/// PostgreSQL-backed [`EntityStore`].
pub struct PostgresStore {
    pool: Pool<Postgres>,
}

impl PostgresStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Connect with default pool options.
    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &Pool<Postgres> {
        &self.pool
    }
}

#[async_trait]
impl EntityStore for PostgresStore {
    async fn apply(&self, batch: &[WriteOp]) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        for op in batch {
            let (sql, params) = render_op(op);
            let mut query = sqlx::query(&sql);
            for param in &params {
                query = bind_value(query, param);
            }
            query.execute(&mut *tx).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn fetch(&self, table: &str, filter: Option<&FilterExpr>) -> StoreResult<Vec<FieldMap>> {
        let sql = match filter {
            Some(filter) => format!("SELECT * FROM {} WHERE {}", table, filter.to_sql()),
            None => format!("SELECT * FROM {}", table),
        };

        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter().map(row_to_fields).collect()
    }
}

/// Render one write as placeholder SQL plus its parameters, in column
/// order sorted for stable statements.
fn render_op(op: &WriteOp) -> (String, Vec<JsonValue>) {
    match op {
        WriteOp::Insert {
            table,
            pk_column,
            fields,
        } => {
            // A null key means the store assigns one.
            let mut columns: Vec<&String> = fields
                .keys()
                .filter(|column| {
                    *column != pk_column || fields.get(*column) != Some(&JsonValue::Null)
                })
                .collect();
            columns.sort();

            if columns.is_empty() {
                return (format!("INSERT INTO {} DEFAULT VALUES", table), Vec::new());
            }

            let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("${}", i)).collect();
            let sql = format!(
                "INSERT INTO {} ({}) VALUES ({})",
                table,
                columns
                    .iter()
                    .map(|c| c.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
                placeholders.join(", ")
            );
            let params = columns
                .iter()
                .filter_map(|column| fields.get(*column).cloned())
                .collect();
            (sql, params)
        }
        WriteOp::Update {
            table,
            pk_column,
            key,
            fields,
        } => {
            let mut columns: Vec<&String> =
                fields.keys().filter(|column| *column != pk_column).collect();
            columns.sort();

            let assignments: Vec<String> = columns
                .iter()
                .enumerate()
                .map(|(i, column)| format!("{} = ${}", column, i + 1))
                .collect();
            let sql = format!(
                "UPDATE {} SET {} WHERE {} = ${}",
                table,
                assignments.join(", "),
                pk_column,
                columns.len() + 1
            );
            let mut params: Vec<JsonValue> = columns
                .iter()
                .filter_map(|column| fields.get(*column).cloned())
                .collect();
            params.push(JsonValue::from(*key));
            (sql, params)
        }
        WriteOp::Delete {
            table,
            pk_column,
            key,
        } => (
            format!("DELETE FROM {} WHERE {} = $1", table, pk_column),
            vec![JsonValue::from(*key)],
        ),
    }
}

/// Bind a JSON value to a sqlx query by value kind.
fn bind_value<'q>(
    query: Query<'q, Postgres, PgArguments>,
    value: &JsonValue,
) -> Query<'q, Postgres, PgArguments> {
    match value {
        JsonValue::Null => query.bind(Option::<String>::None),
        JsonValue::Bool(b) => query.bind(*b),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                query.bind(i)
            } else {
                query.bind(n.as_f64().unwrap_or(0.0))
            }
        }
        JsonValue::String(s) => {
            // Timestamps travel as RFC 3339 strings in field maps.
            if let Ok(timestamp) = DateTime::parse_from_rfc3339(s) {
                query.bind(timestamp.with_timezone(&Utc))
            } else {
                query.bind(s.clone())
            }
        }
        other => query.bind(other.clone()),
    }
}

fn row_to_fields(row: &PgRow) -> StoreResult<FieldMap> {
    let mut fields = FieldMap::new();
    for (index, column) in row.columns().iter().enumerate() {
        let value = decode_column(row, index, column.type_info().name())?;
        fields.insert(column.name().to_string(), value);
    }
    Ok(fields)
}

/// Convert a PostgreSQL column value to a JSON value by type name.
fn decode_column(row: &PgRow, index: usize, type_name: &str) -> StoreResult<JsonValue> {
    let value = match type_name {
        "BOOL" => row.try_get::<Option<bool>, _>(index)?.map(JsonValue::from),
        "INT2" => row
            .try_get::<Option<i16>, _>(index)?
            .map(|v| JsonValue::from(v as i64)),
        "INT4" => row
            .try_get::<Option<i32>, _>(index)?
            .map(|v| JsonValue::from(v as i64)),
        "INT8" => row.try_get::<Option<i64>, _>(index)?.map(JsonValue::from),
        "FLOAT4" => row
            .try_get::<Option<f32>, _>(index)?
            .map(|v| JsonValue::from(v as f64)),
        "FLOAT8" => row.try_get::<Option<f64>, _>(index)?.map(JsonValue::from),
        "TIMESTAMPTZ" => row
            .try_get::<Option<DateTime<Utc>>, _>(index)?
            .map(|v| JsonValue::from(v.to_rfc3339())),
        "TIMESTAMP" => row
            .try_get::<Option<NaiveDateTime>, _>(index)?
            .map(|v| JsonValue::from(v.and_utc().to_rfc3339())),
        "JSON" | "JSONB" => row.try_get::<Option<JsonValue>, _>(index)?,
        _ => row.try_get::<Option<String>, _>(index)?.map(JsonValue::from),
    };
    Ok(value.unwrap_or(JsonValue::Null))
}

//! Query filter expressions
//!
//! Always-applied filters are synthesized per entity type at schema-build
//! time, where the concrete type is only known through its declared
//! metadata. The predicate is therefore represented as a small tagged
//! expression tree rather than a typed closure: properties are read by
//! name through the record's untyped field map, and the same tree renders
//! to SQL for stores that push filtering down.

use serde_json::Value as JsonValue;

use crate::model::record::FieldMap;

/// A boolean predicate over a row's field map.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterExpr {
    /// Read a field by name; a missing field reads as null
    Property(String),
    /// The null literal
    Null,
    /// A constant value
    Literal(JsonValue),
    /// Equality between two sub-expressions
    Eq(Box<FilterExpr>, Box<FilterExpr>),
    /// Conjunction
    And(Box<FilterExpr>, Box<FilterExpr>),
}

impl FilterExpr {
    /// Predicate for "the named field equals null".
    pub fn is_null(property: &str) -> Self {
        FilterExpr::Eq(
            Box::new(FilterExpr::Property(property.to_string())),
            Box::new(FilterExpr::Null),
        )
    }

    /// Predicate for "the named field equals the given value".
    pub fn eq_value(property: &str, value: impl Into<JsonValue>) -> Self {
        FilterExpr::Eq(
            Box::new(FilterExpr::Property(property.to_string())),
            Box::new(FilterExpr::Literal(value.into())),
        )
    }

    pub fn and(self, other: FilterExpr) -> Self {
        FilterExpr::And(Box::new(self), Box::new(other))
    }

    /// Evaluate the predicate against a row.
    pub fn matches(&self, row: &FieldMap) -> bool {
        match self {
            FilterExpr::Eq(left, right) => left.eval(row) == right.eval(row),
            FilterExpr::And(left, right) => left.matches(row) && right.matches(row),
            other => {
                let value = other.eval(row);
                value != JsonValue::Null && value != JsonValue::Bool(false)
            }
        }
    }

    fn eval(&self, row: &FieldMap) -> JsonValue {
        match self {
            FilterExpr::Property(name) => row.get(name).cloned().unwrap_or(JsonValue::Null),
            FilterExpr::Null => JsonValue::Null,
            FilterExpr::Literal(value) => value.clone(),
            FilterExpr::Eq(left, right) => JsonValue::Bool(left.eval(row) == right.eval(row)),
            FilterExpr::And(left, right) => {
                JsonValue::Bool(left.matches(row) && right.matches(row))
            }
        }
    }

    /// Render the predicate as a SQL condition.
    pub fn to_sql(&self) -> String {
        match self {
            FilterExpr::Property(name) => name.clone(),
            FilterExpr::Null => "NULL".to_string(),
            FilterExpr::Literal(value) => literal_sql(value),
            FilterExpr::Eq(left, right) => match (left.as_ref(), right.as_ref()) {
                (expr, FilterExpr::Null) => format!("{} IS NULL", expr.to_sql()),
                (FilterExpr::Null, expr) => format!("{} IS NULL", expr.to_sql()),
                (left, right) => format!("{} = {}", left.to_sql(), right.to_sql()),
            },
            FilterExpr::And(left, right) => {
                format!("({}) AND ({})", left.to_sql(), right.to_sql())
            }
        }
    }
}

fn literal_sql(value: &JsonValue) -> String {
    match value {
        JsonValue::Null => "NULL".to_string(),
        JsonValue::Bool(b) => b.to_string(),
        JsonValue::Number(n) => n.to_string(),
        JsonValue::String(s) => format!("'{}'", s.replace('\'', "''")),
        other => format!("'{}'", other.to_string().replace('\'', "''")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(deleted_at: JsonValue) -> FieldMap {
        let mut map = FieldMap::new();
        map.insert("id".to_string(), json!(1));
        map.insert("deleted_at".to_string(), deleted_at);
        map
    }

    #[test]
    fn test_is_null_matches_live_row() {
        let filter = FilterExpr::is_null("deleted_at");
        assert!(filter.matches(&row(JsonValue::Null)));
        assert!(!filter.matches(&row(json!("2026-01-05T10:00:00Z"))));
    }

    #[test]
    fn test_missing_property_reads_as_null() {
        let filter = FilterExpr::is_null("deleted_at");
        assert!(filter.matches(&FieldMap::new()));
    }

    #[test]
    fn test_eq_value_on_primary_key() {
        let filter = FilterExpr::eq_value("id", 1);
        assert!(filter.matches(&row(JsonValue::Null)));

        let filter = FilterExpr::eq_value("id", 2);
        assert!(!filter.matches(&row(JsonValue::Null)));
    }

    #[test]
    fn test_and_composes() {
        let filter = FilterExpr::eq_value("id", 1).and(FilterExpr::is_null("deleted_at"));
        assert!(filter.matches(&row(JsonValue::Null)));
        assert!(!filter.matches(&row(json!("2026-01-05T10:00:00Z"))));
    }

    #[test]
    fn test_to_sql_is_null() {
        assert_eq!(
            FilterExpr::is_null("deleted_at").to_sql(),
            "deleted_at IS NULL"
        );
    }

    #[test]
    fn test_to_sql_composed() {
        let filter = FilterExpr::eq_value("id", 7).and(FilterExpr::is_null("deleted_at"));
        assert_eq!(filter.to_sql(), "(id = 7) AND (deleted_at IS NULL)");
    }

    #[test]
    fn test_to_sql_escapes_string_literals() {
        let filter = FilterExpr::eq_value("title", "it's");
        assert_eq!(filter.to_sql(), "title = 'it''s'");
    }
}

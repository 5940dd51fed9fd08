//! Convention configurator - per-type configuration at schema-build time
//!
//! Runs once for every declared type: derives the physical table name,
//! renames columns, marks timestamp columns with a database-side default,
//! and synthesizes the always-applied soft-delete filter for entity types.
//! Column naming applies to every declared type; timestamp defaults and
//! the soft-delete filter only to types deriving from the entity marker.

use tracing::debug;

use crate::conventions::naming::{pluralize, to_column_name, to_snake_case};
use crate::conventions::options::ConventionOptions;
use crate::model::classify;
use crate::model::record::Record;
use crate::schema::filter::FilterExpr;
use crate::schema::{ColumnDef, ColumnDefault, EntityDef};

/// Configure one declared type, probing an instance for classification.
pub fn configure(
    model_name: &str,
    properties: &[&str],
    probe: &dyn Record,
    options: &ConventionOptions,
) -> EntityDef {
    let is_entity = classify::is_model_type(probe);
    // Warm the capability cache alongside classification.
    classify::callback_flags(probe);

    let mut table = if options.snake_case_tables {
        to_snake_case(model_name)
    } else {
        model_name.to_string()
    };
    if options.plural_tables {
        table = pluralize(&table);
    }

    let mut columns = Vec::with_capacity(properties.len());
    let mut pk_column = "id".to_string();
    let mut filter = None;

    for &property in properties {
        let column = if options.snake_case_columns {
            to_column_name(property)
        } else {
            property.to_string()
        };
        let canonical = to_snake_case(property);

        let default = if options.timestamps
            && is_entity
            && matches!(canonical.as_str(), "created_at" | "updated_at")
        {
            Some(ColumnDefault::Now)
        } else {
            None
        };

        if canonical == "id" {
            pk_column = column.clone();
        }

        if options.soft_deletes && is_entity && canonical == "deleted_at" {
            filter = Some(FilterExpr::is_null(&column));
        }

        columns.push(ColumnDef {
            property: property.to_string(),
            column,
            default,
        });
    }

    debug!(
        model = model_name,
        table = table.as_str(),
        is_entity,
        filtered = filter.is_some(),
        "configured model type"
    );

    EntityDef {
        model_name: model_name.to_string(),
        table,
        columns,
        pk_column,
        is_entity,
        filter,
        type_id: probe.as_any().type_id(),
    }
}

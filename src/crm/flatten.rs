// 🧱 Flattening - nested CRM objects to flat rows
//
// Row layout: id, created_at, updated_at, archived, <properties...>,
// <association>_id for each association type (first associated id only).

use super::source::{get_all_records, CrmObject, ExtractionPlan, PageSource};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// One tabular row, column order = insertion order
pub type FlatRecord = Map<String, Value>;

const IDENTITY_FIELDS: [&str; 4] = ["id", "created_at", "updated_at", "archived"];

/// Nested values become their JSON text; scalars pass through
fn scalar(value: &Value) -> Value {
    match value {
        Value::Array(_) | Value::Object(_) => Value::String(value.to_string()),
        other => other.clone(),
    }
}

pub fn flatten(object: &CrmObject) -> FlatRecord {
    let mut row = FlatRecord::new();

    row.insert("id".to_string(), Value::String(object.id.clone()));
    row.insert(
        "created_at".to_string(),
        object
            .created_at
            .map(|t| Value::String(t.to_rfc3339()))
            .unwrap_or(Value::Null),
    );
    row.insert(
        "updated_at".to_string(),
        object
            .updated_at
            .map(|t| Value::String(t.to_rfc3339()))
            .unwrap_or(Value::Null),
    );
    row.insert("archived".to_string(), Value::Bool(object.archived));

    let association_columns: Vec<String> = object
        .associations
        .keys()
        .map(|association| format!("{}_id", association))
        .collect();

    // Identity and association columns win; a property with the same
    // name is kept under "properties.<name>"
    for (name, value) in &object.properties {
        let column = if IDENTITY_FIELDS.contains(&name.as_str()) || association_columns.contains(name) {
            format!("properties.{}", name)
        } else {
            name.clone()
        };
        row.insert(column, scalar(value));
    }

    for (association, list) in &object.associations {
        let first = list
            .results
            .first()
            .map(|a| Value::String(a.id.clone()))
            .unwrap_or(Value::Null);
        row.insert(format!("{}_id", association), first);
    }

    row
}

pub fn flatten_all(objects: &[CrmObject]) -> Vec<FlatRecord> {
    objects.iter().map(flatten).collect()
}

/// Run every plan and return flat rows keyed by table name
pub fn extract_all<S: PageSource + ?Sized>(
    source: &S,
    plans: &[ExtractionPlan],
) -> BTreeMap<String, Vec<FlatRecord>> {
    plans
        .iter()
        .map(|plan| {
            let paged = get_all_records(source, plan);
            (plan.object.as_str().to_string(), flatten_all(&paged.records))
        })
        .collect()
}

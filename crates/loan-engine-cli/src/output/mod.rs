pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::{Map, Value};

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// The `result` object of a computation envelope, or the value itself when
/// there is no envelope.
pub(crate) fn result_of(value: &Value) -> &Value {
    value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value)
}

/// True for arrays of objects such as a schedule or a list of offers.
pub(crate) fn is_row_list(value: &Value) -> bool {
    matches!(value, Value::Array(items) if items.first().map_or(false, Value::is_object))
}

/// First row list in an object, with its key.
pub(crate) fn first_row_list(map: &Map<String, Value>) -> Option<(&str, &[Value])> {
    map.iter().find_map(|(key, val)| match val {
        Value::Array(items) if is_row_list(val) => Some((key.as_str(), items.as_slice())),
        _ => None,
    })
}

/// Flatten one level of nested objects into `parent.child` fields.
///
/// Row lists are dropped at every level; they are rendered as their own
/// tables (or only in JSON output).
pub(crate) fn flatten_fields(map: &Map<String, Value>) -> Vec<(String, Value)> {
    let mut fields = Vec::with_capacity(map.len());
    for (key, val) in map {
        match val {
            v if is_row_list(v) => {}
            Value::Object(inner) => {
                for (child, child_val) in inner {
                    if !is_row_list(child_val) && !child_val.is_object() {
                        fields.push((format!("{}.{}", key, child), child_val.clone()));
                    }
                }
            }
            _ => fields.push((key.clone(), val.clone())),
        }
    }
    fields
}

/// Render a scalar or list for a table cell or CSV field.
pub(crate) fn format_cell(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(arr) if !is_row_list(value) => {
            let items: Vec<String> = arr.iter().map(format_cell).collect();
            items.join("; ")
        }
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

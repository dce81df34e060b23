use serde_json::Value;
use std::io;

use super::{first_row_list, flatten_fields, format_cell, result_of};

/// Write output as CSV to stdout.
///
/// Results carrying a row list (schedule rows, offer results) are written one
/// row per entry; anything else becomes two-column `field,value` CSV.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let written = match result_of(value) {
        Value::Object(result) => match first_row_list(result) {
            Some((_, rows)) => write_rows(&mut wtr, rows),
            None => write_fields(&mut wtr, &flatten_fields(result)),
        },
        Value::Array(rows) => write_rows(&mut wtr, rows),
        other => wtr.write_record([format_cell(other)]),
    };

    if let Err(e) = written.and_then(|_| wtr.flush().map_err(csv::Error::from)) {
        tracing::error!(error = %e, "failed to write CSV output");
    }
}

fn write_fields(
    wtr: &mut csv::Writer<io::StdoutLock<'_>>,
    fields: &[(String, Value)],
) -> csv::Result<()> {
    wtr.write_record(["field", "value"])?;
    for (key, val) in fields {
        wtr.write_record([key.as_str(), &format_cell(val)])?;
    }
    Ok(())
}

fn write_rows(wtr: &mut csv::Writer<io::StdoutLock<'_>>, rows: &[Value]) -> csv::Result<()> {
    let Some(Value::Object(first)) = rows.first() else {
        for item in rows {
            wtr.write_record([format_cell(item)])?;
        }
        return Ok(());
    };

    let headers: Vec<String> = flatten_fields(first).into_iter().map(|(k, _)| k).collect();
    wtr.write_record(&headers)?;

    for item in rows {
        if let Value::Object(map) = item {
            let fields = flatten_fields(map);
            let row: Vec<String> = headers
                .iter()
                .map(|h| {
                    fields
                        .iter()
                        .find(|(k, _)| k == h)
                        .map(|(_, v)| format_cell(v))
                        .unwrap_or_default()
                })
                .collect();
            wtr.write_record(&row)?;
        }
    }
    Ok(())
}

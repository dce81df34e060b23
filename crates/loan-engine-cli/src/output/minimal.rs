use serde_json::Value;

use super::{flatten_fields, format_cell, result_of};

/// Headline answer of each command, in priority order.
const PRIORITY_KEYS: [&str; 6] = [
    "periodic_payment",
    "max_principal",
    "delta.savings",
    "lowest_total_cost_offer_id",
    "is_affordable",
    "required_monthly_income",
];

/// Print just the headline value from the output.
///
/// Looks for the well-known answer fields first (skipping nulls), then falls
/// back to the first field of the result.
pub fn print_minimal(value: &Value) {
    let result = result_of(value);

    if let Value::Object(map) = result {
        let fields = flatten_fields(map);
        for key in PRIORITY_KEYS {
            if let Some((_, val)) = fields.iter().find(|(k, _)| k == key) {
                if !val.is_null() {
                    println!("{}", format_cell(val));
                    return;
                }
            }
        }

        if let Some((key, val)) = fields.first() {
            println!("{}: {}", key, format_cell(val));
            return;
        }
    }

    println!("{}", format_cell(result));
}

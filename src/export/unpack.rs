//! Expansion of compound field values into flat columns.

use indexmap::IndexMap;
use serde_json::Value;
use std::collections::HashSet;

pub const TRUE: &str = "TRUE";
pub const FALSE: &str = "FALSE";

/// Components of a geopoint, in storage order.
pub const GPS_PARTS: [&str; 4] = ["latitude", "longitude", "altitude", "precision"];

pub fn select_multiple_column(prefix: &str, field_name: &str, choice: &str) -> String {
    format!("{}{}_{}", prefix, field_name, choice)
}

pub fn gps_column(prefix: &str, field_name: &str, part: &str) -> String {
    format!("{}_{}_{}", prefix, field_name, part)
}

pub fn gps_columns(prefix: &str, field_name: &str) -> Vec<String> {
    GPS_PARTS
        .iter()
        .map(|part| gps_column(prefix, field_name, part))
        .collect()
}

/// One `TRUE`/`FALSE` column per declared choice, in declaration order.
///
/// Picked values that are not declared choices are ignored.
pub fn unpack_select_multiple<P, C>(
    picked_choices: &[P],
    field_name: &str,
    all_choice_names: &[C],
    prefix: &str,
) -> IndexMap<String, String>
where
    P: AsRef<str>,
    C: AsRef<str>,
{
    let picked: HashSet<&str> = picked_choices.iter().map(|p| p.as_ref()).collect();

    all_choice_names
        .iter()
        .map(|choice| {
            let choice = choice.as_ref();
            let flag = if picked.contains(choice) { TRUE } else { FALSE };
            (
                select_multiple_column(prefix, field_name, choice),
                flag.to_string(),
            )
        })
        .collect()
}

/// Picked choice names from a stored select-multiple value.
///
/// Stored values are space separated (`"firefox chrome"`); arrays are accepted too.
pub fn parse_picked_choices(raw: &Value) -> Vec<String> {
    match raw {
        Value::String(s) => s.split_whitespace().map(str::to_string).collect(),
        Value::Array(items) => items
            .iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

/// Split `"lat lon alt precision"` into four columns.
///
/// Missing trailing tokens become empty strings; extra tokens are ignored.
pub fn unpack_gps(raw: &str, field_name: &str, prefix: &str) -> IndexMap<String, String> {
    let mut tokens = raw.split_whitespace();

    GPS_PARTS
        .iter()
        .map(|part| {
            let value = tokens.next().unwrap_or_default().to_string();
            (gps_column(prefix, field_name, part), value)
        })
        .collect()
}

use csv::Writer;
use serde_json::Value;
use std::io::Write;
use tracing::debug;

use super::flatten::FlatRow;
use super::schema::TableSchema;
use crate::errors::ExportResult;

/// Write every row of one table as CSV, header first.
///
/// Child-table rows are collected from each root row's `children`, so the
/// root rows of the whole export have to be passed in. Returns the number of
/// rows written.
pub fn write_table<I, W>(schema: &TableSchema, rows: I, writer: W) -> ExportResult<usize>
where
    I: Iterator<Item = ExportResult<FlatRow>>,
    W: Write,
{
    let mut wtr = Writer::from_writer(writer);
    let columns = schema.column_ids();
    wtr.write_record(&columns)?;

    let mut count = 0usize;
    for root in rows {
        let root = root?;
        for row in root.rows_in_table(&schema.table_alias) {
            let record: Vec<String> = columns
                .iter()
                .map(|column| cell(row.get(column)))
                .collect();
            wtr.write_record(&record)?;
            count += 1;
        }
    }
    wtr.flush()?;

    debug!("Wrote {} row(s) of table '{}' as CSV", count, schema.table_alias);
    Ok(count)
}

fn cell(value: Option<Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s,
        Some(other) => other.to_string(),
    }
}

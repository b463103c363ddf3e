use std::io::Write;
use tracing::debug;

use super::flatten::FlatRow;
use super::schema::TableSchema;
use crate::errors::ExportResult;

pub fn render_schema(schemas: &[TableSchema]) -> ExportResult<String> {
    Ok(serde_json::to_string_pretty(schemas)?)
}

/// Encodes a row sequence as a JSON array, one chunk per row.
///
/// The first chunk opens the array, each row chunk carries its own separator, and
/// the last chunk closes the array. A failing row ends the sequence with that
/// error and the array is never closed.
pub struct JsonArrayChunks<I> {
    rows: I,
    state: ChunkState,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum ChunkState {
    Open,
    First,
    Rest,
    Done,
}

impl<I> JsonArrayChunks<I> {
    pub fn new(rows: I) -> Self {
        Self {
            rows,
            state: ChunkState::Open,
        }
    }
}

impl<I> Iterator for JsonArrayChunks<I>
where
    I: Iterator<Item = ExportResult<FlatRow>>,
{
    type Item = ExportResult<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.state {
            ChunkState::Open => {
                self.state = ChunkState::First;
                Some(Ok(b"[".to_vec()))
            }
            ChunkState::First | ChunkState::Rest => match self.rows.next() {
                Some(Ok(row)) => {
                    let mut chunk = if self.state == ChunkState::Rest {
                        b",\n".to_vec()
                    } else {
                        b"\n".to_vec()
                    };
                    self.state = ChunkState::Rest;
                    Some(serde_json::to_writer(&mut chunk, &row).map(|_| chunk).map_err(Into::into))
                }
                Some(Err(err)) => {
                    self.state = ChunkState::Done;
                    Some(Err(err))
                }
                None => {
                    let close = if self.state == ChunkState::Rest {
                        b"\n]".to_vec()
                    } else {
                        b"]".to_vec()
                    };
                    self.state = ChunkState::Done;
                    Some(Ok(close))
                }
            },
            ChunkState::Done => None,
        }
    }
}

/// Stream rows as a JSON array into `writer`. Returns the number of rows written.
pub fn write_rows<I, W>(rows: I, mut writer: W) -> ExportResult<usize>
where
    I: Iterator<Item = ExportResult<FlatRow>>,
    W: Write,
{
    let mut count = 0usize;
    let mut chunks = JsonArrayChunks::new(rows.inspect(|row| {
        if row.is_ok() {
            count += 1;
        }
    }));

    for chunk in chunks.by_ref() {
        writer.write_all(&chunk?)?;
    }
    drop(chunks);
    writer.flush()?;

    debug!("Wrote {} row(s) as JSON", count);
    Ok(count)
}

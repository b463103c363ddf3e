pub mod attachments;
pub mod flatten;
pub mod headers;
pub mod pairing;
pub mod schema;
pub mod to_csv;
pub mod to_json;
pub mod unpack;

pub use flatten::{FlatRow, Flattener, ParentRef, RowStream};
pub use schema::{infer_schemas, ColumnHeader, DataType, ExportLayout, TableSchema};

/// Alias of the root table.
pub const ROOT_TABLE: &str = "data";

pub const ID_COLUMN: &str = "_id";
pub const PARENT_ID_COLUMN: &str = "__parent_id";
pub const PARENT_TABLE_COLUMN: &str = "__parent_table";

/// Column names the exporter writes itself. Declared fields may not use them,
/// nor the alias of a child table of the same table.
pub const RESERVED_COLUMNS: [&str; 3] = [ID_COLUMN, PARENT_ID_COLUMN, PARENT_TABLE_COLUMN];

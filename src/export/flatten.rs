//! Row flattening.
//!
//! Each submission becomes one root [`FlatRow`]; every repeat element becomes a
//! child row nested under its parent, in a list keyed by the child table's
//! alias, and linked back through `__parent_id` and `__parent_table`. Child ids
//! are pairing ids of the parent id and a running 1-based ordinal, so they are
//! unique across all child tables of one parent and stable across exports.

use indexmap::IndexMap;
use num_bigint::BigUint;
use serde::ser::{Error as _, Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};
use std::iter::FusedIterator;

use super::attachments::rewrite_media_link;
use super::pairing::{id_number, pairing};
use super::schema::{ColumnSource, DataType, ExportLayout, TablePlan};
use super::unpack::{
    gps_columns, parse_picked_choices, select_multiple_column, unpack_gps, unpack_select_multiple,
};
use super::{ID_COLUMN, PARENT_ID_COLUMN, PARENT_TABLE_COLUMN};
use crate::errors::{ExportError, ExportResult, SourceResult};
use crate::form::FormDefinition;
use crate::submission::{Attachment, SubmissionTree};

#[derive(Clone, Debug, PartialEq)]
pub struct ParentRef {
    pub id: BigUint,
    pub table: String,
}

/// One row of one table.
///
/// `children` is `Some` for rows of tables that own repeat groups. It maps every
/// child table alias, in declaration order, to that table's rows in encounter
/// order. Serialized, each alias becomes a key of the row next to the columns.
#[derive(Clone, Debug, PartialEq)]
pub struct FlatRow {
    pub table: String,
    pub id: BigUint,
    pub parent: Option<ParentRef>,
    pub columns: IndexMap<String, Value>,
    pub children: Option<IndexMap<String, Vec<FlatRow>>>,
}

impl FlatRow {
    /// Value of a column, synthetic linkage columns included.
    pub fn get(&self, column: &str) -> Option<Value> {
        match column {
            ID_COLUMN => id_number(&self.id).ok().map(Value::Number),
            PARENT_ID_COLUMN => self
                .parent
                .as_ref()
                .and_then(|p| id_number(&p.id).ok())
                .map(Value::Number),
            PARENT_TABLE_COLUMN => self.parent.as_ref().map(|p| Value::from(p.table.clone())),
            _ => self.columns.get(column).cloned(),
        }
    }

    /// Rows of one child table.
    pub fn children(&self, table: &str) -> &[FlatRow] {
        self.children
            .as_ref()
            .and_then(|children| children.get(table))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Rows of every child table, table by table.
    pub fn child_rows(&self) -> impl Iterator<Item = &FlatRow> + '_ {
        self.children.iter().flat_map(|children| children.values().flatten())
    }

    /// This row and all descendants belonging to `table`, depth first.
    pub fn rows_in_table<'a>(&'a self, table: &str) -> Vec<&'a FlatRow> {
        fn collect<'a>(row: &'a FlatRow, table: &str, out: &mut Vec<&'a FlatRow>) {
            if row.table == table {
                out.push(row);
            }
            for child in row.child_rows() {
                collect(child, table, out);
            }
        }

        let mut out = Vec::new();
        collect(self, table, &mut out);
        out
    }
}

impl Serialize for FlatRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry(ID_COLUMN, &id_number(&self.id).map_err(S::Error::custom)?)?;
        if let Some(parent) = &self.parent {
            map.serialize_entry(
                PARENT_ID_COLUMN,
                &id_number(&parent.id).map_err(S::Error::custom)?,
            )?;
            map.serialize_entry(PARENT_TABLE_COLUMN, &parent.table)?;
        }
        for (column, value) in &self.columns {
            map.serialize_entry(column, value)?;
        }
        for (alias, rows) in self.children.iter().flatten() {
            map.serialize_entry(alias, rows)?;
        }
        map.end()
    }
}

/// Per-submission context shared by every row derived from it.
struct Context<'a> {
    instance_id: i64,
    attachments: &'a [Attachment],
}

#[derive(Clone, Debug)]
pub struct Flattener {
    layout: ExportLayout,
    base_url: String,
}

impl Flattener {
    pub fn new(form: &FormDefinition) -> Self {
        Self::from_layout(ExportLayout::infer(form))
    }

    pub fn from_layout(layout: ExportLayout) -> Self {
        Self {
            layout,
            base_url: String::new(),
        }
    }

    /// Prefix for relative attachment download urls.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_string();
        self
    }

    pub fn layout(&self) -> &ExportLayout {
        &self.layout
    }

    /// Flatten one submission. The root row id is the persisted instance id.
    pub fn flatten(&self, tree: &SubmissionTree) -> ExportResult<FlatRow> {
        let instance_id = tree.instance_id().ok_or(ExportError::MissingInstanceId)?;
        let root_id = u64::try_from(instance_id)
            .map_err(|_| ExportError::NegativeInstanceId(instance_id))?;
        let attachments = tree.attachments();
        let context = Context {
            instance_id,
            attachments: &attachments,
        };

        self.flatten_table(
            self.layout.root(),
            tree.values(),
            BigUint::from(root_id),
            None,
            &context,
        )
    }

    /// Lazily flatten a sequence of submissions.
    pub fn rows<I>(self, submissions: I) -> RowStream<I>
    where
        I: Iterator<Item = SourceResult<SubmissionTree>>,
    {
        RowStream {
            flattener: self,
            submissions,
        }
    }

    fn flatten_table(
        &self,
        table: &TablePlan,
        values: &Map<String, Value>,
        id: BigUint,
        parent: Option<ParentRef>,
        context: &Context<'_>,
    ) -> ExportResult<FlatRow> {
        let children = table.has_child_tables().then(|| {
            table
                .child_tables()
                .map(|index| (self.layout.table(index).alias().to_string(), Vec::new()))
                .collect::<IndexMap<_, _>>()
        });
        let mut row = FlatRow {
            table: table.alias().to_string(),
            id,
            parent,
            columns: IndexMap::new(),
            children,
        };
        let mut ordinal = 0u64;

        for source in &table.sources {
            match source {
                ColumnSource::Scalar {
                    path,
                    column,
                    data_type,
                } => {
                    row.columns
                        .insert(column.clone(), coerce(values.get(path), *data_type));
                }
                ColumnSource::Media { path, column } => {
                    let value = match values.get(path) {
                        Some(Value::String(filename)) => Value::String(rewrite_media_link(
                            filename,
                            context.attachments,
                            &self.base_url,
                        )),
                        other => coerce(other, DataType::String),
                    };
                    row.columns.insert(column.clone(), value);
                }
                ColumnSource::SelectMultiple {
                    path,
                    field_name,
                    choices,
                } => match values.get(path) {
                    None | Some(Value::Null) => {
                        for choice in choices {
                            row.columns.insert(
                                select_multiple_column("", field_name, choice),
                                Value::Null,
                            );
                        }
                    }
                    Some(raw) => {
                        let picked = parse_picked_choices(raw);
                        let unpacked = unpack_select_multiple(
                            picked.as_slice(),
                            field_name,
                            choices.as_slice(),
                            "",
                        );
                        row.columns
                            .extend(unpacked.into_iter().map(|(k, v)| (k, Value::String(v))));
                    }
                },
                ColumnSource::Geopoint { path, field_name } => match values.get(path) {
                    Some(Value::String(raw)) => {
                        let unpacked = unpack_gps(raw, field_name, "");
                        row.columns
                            .extend(unpacked.into_iter().map(|(k, v)| (k, Value::String(v))));
                    }
                    _ => {
                        for column in gps_columns("", field_name) {
                            row.columns.insert(column, Value::Null);
                        }
                    }
                },
                ColumnSource::Repeat {
                    path,
                    table: child_table,
                } => {
                    let items = match values.get(path) {
                        None | Some(Value::Null) => continue,
                        Some(Value::Array(items)) => items,
                        Some(_) => {
                            return Err(ExportError::MalformedRepeat {
                                instance_id: context.instance_id,
                                path: path.clone(),
                            })
                        }
                    };

                    let child_plan = self.layout.table(*child_table);
                    for item in items {
                        ordinal += 1;
                        let Value::Object(child_values) = item else {
                            return Err(ExportError::MalformedRepeatElement {
                                instance_id: context.instance_id,
                                path: path.clone(),
                                ordinal,
                            });
                        };
                        let child_id = pairing(&row.id, ordinal);
                        let link = ParentRef {
                            id: row.id.clone(),
                            table: table.alias().to_string(),
                        };
                        let child =
                            self.flatten_table(child_plan, child_values, child_id, Some(link), context)?;
                        if let Some(children) = row.children.as_mut() {
                            children
                                .entry(child_plan.alias().to_string())
                                .or_default()
                                .push(child);
                        }
                    }
                }
            }
        }

        Ok(row)
    }
}

/// Cast a stored value to the column's declared type. Missing values and
/// integers that do not parse become `null`.
fn coerce(value: Option<&Value>, data_type: DataType) -> Value {
    let Some(value) = value else {
        return Value::Null;
    };

    match (data_type, value) {
        (_, Value::Null) => Value::Null,
        (DataType::Int, Value::Number(n)) => n
            .as_i64()
            .or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                    .map(|f| f as i64)
            })
            .map(Value::from)
            .unwrap_or(Value::Null),
        (DataType::Int, Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or(Value::Null),
        (DataType::Int, _) => Value::Null,
        (DataType::String, Value::String(s)) => Value::String(s.clone()),
        (DataType::String, other) => Value::String(other.to_string()),
    }
}

/// Lazy, finite, single-pass sequence of root rows.
///
/// Each call to `next` pulls one submission from the underlying source and
/// flattens it. Once the source is exhausted the stream stays exhausted.
pub struct RowStream<I> {
    flattener: Flattener,
    submissions: I,
}

impl<I> RowStream<I> {
    pub fn flattener(&self) -> &Flattener {
        &self.flattener
    }
}

impl<I> Iterator for RowStream<I>
where
    I: Iterator<Item = SourceResult<SubmissionTree>>,
{
    type Item = ExportResult<FlatRow>;

    fn next(&mut self) -> Option<Self::Item> {
        let row = match self.submissions.next()? {
            Ok(tree) => self.flattener.flatten(&tree),
            Err(err) => Err(err.into()),
        };
        Some(row)
    }
}

impl<I> FusedIterator for RowStream<I> where I: FusedIterator<Item = SourceResult<SubmissionTree>> {}

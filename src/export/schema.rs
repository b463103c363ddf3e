//! Table schema inference.
//!
//! Field definitions are walked once, in declaration order, to build an
//! [`ExportLayout`]: the root table plus one table per repeat group. The layout
//! records where every column comes from so that the flattener can fill rows
//! without re-reading the form. [`infer_schemas`] exposes the public schema view.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, warn};

use super::headers::{clean_header, repeat_header};
use super::unpack::{gps_columns, select_multiple_column};
use super::{ID_COLUMN, PARENT_ID_COLUMN, PARENT_TABLE_COLUMN, RESERVED_COLUMNS, ROOT_TABLE};
use crate::form::{FieldDefinition, FieldType, FormDefinition};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Int,
    String,
}

impl DataType {
    fn for_field(field_type: FieldType) -> Self {
        if field_type.is_integer() {
            DataType::Int
        } else {
            DataType::String
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ColumnHeader {
    pub id: String,
    #[serde(rename = "dataType")]
    pub data_type: DataType,
    pub alias: String,
}

impl ColumnHeader {
    pub fn new(id: &str, data_type: DataType) -> Self {
        Self {
            id: id.to_string(),
            data_type,
            alias: id.to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TableSchema {
    pub table_alias: String,
    pub connection_name: String,
    pub column_headers: Vec<ColumnHeader>,
}

impl TableSchema {
    pub fn column_ids(&self) -> Vec<&str> {
        self.column_headers.iter().map(|c| c.id.as_str()).collect()
    }
}

/// Where the values of one table's columns come from.
#[derive(Clone, Debug)]
pub(crate) enum ColumnSource {
    Scalar {
        path: String,
        column: String,
        data_type: DataType,
    },
    Media {
        path: String,
        column: String,
    },
    SelectMultiple {
        path: String,
        field_name: String,
        choices: Vec<String>,
    },
    Geopoint {
        path: String,
        field_name: String,
    },
    Repeat {
        path: String,
        table: usize,
    },
}

#[derive(Clone, Debug)]
pub(crate) struct TablePlan {
    pub schema: TableSchema,
    pub repeat_path: Option<String>,
    pub sources: Vec<ColumnSource>,
    taken: HashSet<String>,
}

impl TablePlan {
    fn new(alias: String, connection_name: String, repeat_path: Option<String>) -> Self {
        let mut plan = Self {
            schema: TableSchema {
                table_alias: alias,
                connection_name,
                column_headers: Vec::new(),
            },
            repeat_path,
            sources: Vec::new(),
            taken: RESERVED_COLUMNS.iter().map(|c| c.to_string()).collect(),
        };

        plan.push_header(ID_COLUMN, DataType::Int);
        if plan.repeat_path.is_some() {
            plan.push_header(PARENT_ID_COLUMN, DataType::Int);
            plan.push_header(PARENT_TABLE_COLUMN, DataType::String);
        }
        plan
    }

    pub fn alias(&self) -> &str {
        &self.schema.table_alias
    }

    pub fn has_child_tables(&self) -> bool {
        self.child_tables().next().is_some()
    }

    /// Layout indices of the tables fed by this table's repeat groups.
    pub fn child_tables(&self) -> impl Iterator<Item = usize> + '_ {
        self.sources.iter().filter_map(|s| match s {
            ColumnSource::Repeat { table, .. } => Some(*table),
            _ => None,
        })
    }

    fn push_header(&mut self, id: &str, data_type: DataType) {
        self.schema.column_headers.push(ColumnHeader::new(id, data_type));
    }

    /// Reserve all `columns` at once, or none of them if any is taken.
    fn claim(&mut self, field: &FieldDefinition, columns: &[String]) -> bool {
        let mut seen = HashSet::new();
        if let Some(column) = columns
            .iter()
            .find(|c| self.taken.contains(*c) || !seen.insert(c.as_str()))
        {
            warn!(
                "Dropping field '{}': column '{}' already exists in table '{}'",
                field.path,
                column,
                self.alias()
            );
            return false;
        }
        self.taken.extend(columns.iter().cloned());
        true
    }

    /// Column base name of a field in this table.
    fn base_name(&self, field: &FieldDefinition) -> String {
        match &self.repeat_path {
            Some(repeat_path) => clean_header(&repeat_header(repeat_path, &field.path, 1)),
            None => field.path.replace('/', "_"),
        }
    }
}

/// Table layout for one form: root table first, then one table per repeat
/// group in depth-first declaration order.
#[derive(Clone, Debug)]
pub struct ExportLayout {
    pub(crate) tables: Vec<TablePlan>,
}

impl ExportLayout {
    pub fn infer(form: &FormDefinition) -> Self {
        let mut builder = LayoutBuilder {
            root_connection: form.connection_name(),
            tables: vec![TablePlan::new(
                ROOT_TABLE.to_string(),
                form.connection_name(),
                None,
            )],
            by_path: IndexMap::new(),
        };
        builder.visit(&form.fields, 0);

        debug!(
            "Inferred {} table(s) for form '{}'",
            builder.tables.len(),
            form.id_string
        );
        Self {
            tables: builder.tables,
        }
    }

    pub fn schemas(&self) -> Vec<TableSchema> {
        self.tables.iter().map(|t| t.schema.clone()).collect()
    }

    pub fn table_aliases(&self) -> Vec<&str> {
        self.tables.iter().map(|t| t.alias()).collect()
    }

    pub fn schema(&self, alias: &str) -> Option<&TableSchema> {
        self.tables
            .iter()
            .find(|t| t.alias() == alias)
            .map(|t| &t.schema)
    }

    pub(crate) fn root(&self) -> &TablePlan {
        &self.tables[0]
    }

    pub(crate) fn table(&self, index: usize) -> &TablePlan {
        &self.tables[index]
    }
}

/// One schema per table, root first.
pub fn infer_schemas(form: &FormDefinition) -> Vec<TableSchema> {
    ExportLayout::infer(form).schemas()
}

struct LayoutBuilder {
    root_connection: String,
    tables: Vec<TablePlan>,
    by_path: IndexMap<String, usize>,
}

impl LayoutBuilder {
    fn visit(&mut self, fields: &[FieldDefinition], table: usize) {
        for field in fields {
            if !field.field_type.carries_data() {
                continue;
            }
            match field.field_type {
                FieldType::Group => self.visit(&field.children, table),
                FieldType::Repeat => {
                    let child = self.open_table(field, table);
                    self.tables[table].sources.push(ColumnSource::Repeat {
                        path: field.path.clone(),
                        table: child,
                    });
                    self.visit(&field.children, child);
                }
                FieldType::SelectMultiple => self.add_select_multiple(field, table),
                FieldType::Geopoint => self.add_geopoint(field, table),
                _ => self.add_scalar(field, table),
            }
        }
    }

    /// Child rows are keyed by alias inside parent rows, so the alias is also
    /// claimed as a column name of the parent table.
    fn open_table(&mut self, field: &FieldDefinition, parent: usize) -> usize {
        if let Some(&index) = self.by_path.get(&field.path) {
            return index;
        }

        let alias = self.unique_alias(&table_alias(field.name()), parent);
        self.tables[parent].taken.insert(alias.clone());
        let connection_name = format!("{}_{}", self.root_connection, alias);
        self.tables.push(TablePlan::new(
            alias,
            connection_name,
            Some(field.path.clone()),
        ));

        let index = self.tables.len() - 1;
        self.by_path.insert(field.path.clone(), index);
        index
    }

    fn unique_alias(&self, alias: &str, parent: usize) -> String {
        let exists = |candidate: &str| {
            self.tables.iter().any(|t| t.alias() == candidate)
                || self.tables[parent].taken.contains(candidate)
        };
        if !exists(alias) {
            return alias.to_string();
        }
        (2..)
            .map(|n| format!("{}_{}", alias, n))
            .find(|candidate| !exists(candidate))
            .unwrap_or_else(|| alias.to_string())
    }

    fn add_scalar(&mut self, field: &FieldDefinition, table: usize) {
        let plan = &mut self.tables[table];
        let column = plan.base_name(field);
        if !plan.claim(field, std::slice::from_ref(&column)) {
            return;
        }

        let data_type = DataType::for_field(field.field_type);
        plan.push_header(&column, data_type);
        plan.sources.push(if field.field_type.is_media() {
            ColumnSource::Media {
                path: field.path.clone(),
                column,
            }
        } else {
            ColumnSource::Scalar {
                path: field.path.clone(),
                column,
                data_type,
            }
        });
    }

    fn add_select_multiple(&mut self, field: &FieldDefinition, table: usize) {
        let plan = &mut self.tables[table];
        let field_name = plan.base_name(field);
        let choices = field.choice_names();
        let columns: Vec<String> = choices
            .iter()
            .map(|choice| select_multiple_column("", &field_name, choice))
            .collect();
        if !plan.claim(field, &columns) {
            return;
        }

        for column in &columns {
            plan.push_header(column, DataType::String);
        }
        plan.sources.push(ColumnSource::SelectMultiple {
            path: field.path.clone(),
            field_name,
            choices,
        });
    }

    fn add_geopoint(&mut self, field: &FieldDefinition, table: usize) {
        let plan = &mut self.tables[table];
        let field_name = plan.base_name(field);
        let columns = gps_columns("", &field_name);
        if !plan.claim(field, &columns) {
            return;
        }

        for column in &columns {
            plan.push_header(column, DataType::String);
        }
        plan.sources.push(ColumnSource::Geopoint {
            path: field.path.clone(),
            field_name,
        });
    }
}

/// Lower-cased leaf name with anything outside `[a-z0-9_]` replaced by `_`.
fn table_alias(name: &str) -> String {
    name.chars()
        .map(|c| {
            let c = c.to_ascii_lowercase();
            if c.is_ascii_alphanumeric() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

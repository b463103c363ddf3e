use serde::{Deserialize, Serialize};

/// ## Structure
/// A published form as the exporter sees it.
///
/// ```text
/// FormDefinition
///   ├── id_string, project_id, title
///   └── fields: Vec<FieldDefinition>
///       ├── path: "children/childs_name"
///       ├── type: FieldType
///       ├── choices: Vec<Choice>          (select fields)
///       └── children: Vec<FieldDefinition> (group / repeat)
/// ```
///
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct FormDefinition {
    pub id_string: String,
    pub project_id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
}

impl FormDefinition {
    /// Connection name of the root table, `{project_id}_{id_string}`.
    pub fn connection_name(&self) -> String {
        format!("{}_{}", self.project_id, self.id_string)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Choice {
    pub name: String,
    #[serde(default)]
    pub label: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct FieldDefinition {
    pub path: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub children: Vec<FieldDefinition>,
}

impl FieldDefinition {
    pub fn new(path: &str, field_type: FieldType) -> Self {
        Self {
            path: path.to_string(),
            field_type,
            choices: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_choices(mut self, names: &[&str]) -> Self {
        self.choices = names
            .iter()
            .map(|name| Choice {
                name: name.to_string(),
                label: name.to_string(),
            })
            .collect();
        self
    }

    pub fn with_children(mut self, children: Vec<FieldDefinition>) -> Self {
        self.children = children;
        self
    }

    /// Leaf segment of the path.
    pub fn name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    pub fn choice_names(&self) -> Vec<String> {
        self.choices.iter().map(|c| c.name.clone()).collect()
    }
}

/// XForm question types, as named in the form definition document.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    #[serde(alias = "int")]
    Integer,
    Decimal,
    #[serde(alias = "text")]
    String,
    Date,
    #[serde(alias = "dateTime")]
    Datetime,
    Time,
    Calculate,
    Note,
    #[serde(alias = "select one", alias = "select1")]
    SelectOne,
    #[serde(alias = "select all that apply", alias = "select")]
    SelectMultiple,
    Geopoint,
    #[serde(alias = "image")]
    Photo,
    Audio,
    Video,
    File,
    Group,
    Repeat,
}

impl FieldType {
    pub fn is_integer(&self) -> bool {
        matches!(self, FieldType::Integer)
    }

    /// Types whose stored value is the filename of an uploaded attachment.
    pub fn is_media(&self) -> bool {
        matches!(
            self,
            FieldType::Photo | FieldType::Audio | FieldType::Video | FieldType::File
        )
    }

    /// Whether the field produces any column at all.
    pub fn carries_data(&self) -> bool {
        !matches!(self, FieldType::Note)
    }
}

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key under which a submission lists its uploaded files.
pub const ATTACHMENTS_KEY: &str = "_attachments";

/// Key holding the persisted instance id.
pub const ID_KEY: &str = "_id";

/// One submitted instance, keyed by full field path.
///
/// Repeat groups hold arrays of nested mappings using the same full-path keys,
/// e.g. `{"children": [{"children/childs_name": "Harry"}]}`.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(transparent)]
pub struct SubmissionTree(Map<String, Value>);

impl SubmissionTree {
    pub fn new(values: Map<String, Value>) -> Self {
        Self(values)
    }

    pub fn values(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Persisted instance id. Accepts integers and integer strings.
    pub fn instance_id(&self) -> Option<i64> {
        match self.0.get(ID_KEY)? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Attachment metadata. Entries that do not parse are skipped.
    pub fn attachments(&self) -> Vec<Attachment> {
        match self.0.get(ATTACHMENTS_KEY) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| serde_json::from_value(item.clone()).ok())
                .collect(),
            _ => Vec::new(),
        }
    }
}

impl From<Value> for SubmissionTree {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }
}

/// Uploaded file metadata attached to a submission.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Attachment {
    /// Stored file path, e.g. `bob/attachments/1335783522563.jpg`.
    pub filename: String,
    pub download_url: String,
    #[serde(default)]
    pub mimetype: Option<String>,
}

impl Attachment {
    /// Last path segment of the stored filename.
    pub fn basename(&self) -> &str {
        self.filename.rsplit('/').next().unwrap_or(&self.filename)
    }
}

use serde_json::Value;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, ErrorKind, Lines};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

use super::{find_active, OpenDataEntry, SubmissionFilter, SubmissionSource, Submissions};
use crate::errors::{SourceError, SourceResult};
use crate::form::FormDefinition;
use crate::submission::SubmissionTree;

pub const FORM_FILE: &str = "form.json";
pub const SUBMISSIONS_FILE: &str = "submissions.jsonl";

/// File-backed store.
///
/// ```text
/// data_dir/
///   <form>/form.json           form definition
///   <form>/submissions.jsonl   one submission object per line
/// ```
#[derive(Clone, Debug)]
pub struct DirectorySource {
    data_dir: PathBuf,
    entries: Vec<OpenDataEntry>,
}

impl DirectorySource {
    pub fn new(data_dir: impl Into<PathBuf>, entries: Vec<OpenDataEntry>) -> Self {
        Self {
            data_dir: data_dir.into(),
            entries,
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn form_dir(&self, entry: &OpenDataEntry) -> SourceResult<PathBuf> {
        let dir = self.data_dir.join(&entry.form);
        if !dir.is_dir() {
            return Err(SourceError::FormNotFound(entry.form.clone()));
        }
        Ok(dir)
    }
}

impl SubmissionSource for DirectorySource {
    fn open_data(&self, uuid: &Uuid) -> SourceResult<OpenDataEntry> {
        find_active(&self.entries, uuid)
    }

    fn form(&self, entry: &OpenDataEntry) -> SourceResult<FormDefinition> {
        let path = self.form_dir(entry)?.join(FORM_FILE);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(SourceError::FormNotFound(entry.form.clone()))
            }
            Err(err) => return Err(err.into()),
        };

        serde_json::from_str(&content).map_err(|err| SourceError::InvalidForm {
            path,
            reason: err.to_string(),
        })
    }

    fn submissions(
        &self,
        entry: &OpenDataEntry,
        filter: SubmissionFilter,
    ) -> SourceResult<Submissions> {
        let path = self.form_dir(entry)?.join(SUBMISSIONS_FILE);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                warn!("No submissions file for form '{}'", entry.form);
                return Ok(Box::new(std::iter::empty::<SourceResult<SubmissionTree>>()));
            }
            Err(err) => return Err(err.into()),
        };

        debug!("Reading submissions from {}", path.display());
        Ok(Box::new(JsonLines {
            path,
            lines: BufReader::new(file).lines(),
            line: 0,
            filter,
        }))
    }
}

/// Reads one submission per line, skipping blank lines.
struct JsonLines {
    path: PathBuf,
    lines: Lines<BufReader<File>>,
    line: usize,
    filter: SubmissionFilter,
}

impl JsonLines {
    fn invalid(&self, reason: String) -> SourceError {
        SourceError::InvalidSubmission {
            path: self.path.clone(),
            line: self.line,
            reason,
        }
    }
}

impl Iterator for JsonLines {
    type Item = SourceResult<SubmissionTree>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let text = match self.lines.next()? {
                Ok(text) => text,
                Err(err) => return Some(Err(err.into())),
            };
            self.line += 1;
            if text.trim().is_empty() {
                continue;
            }

            let tree = match serde_json::from_str::<Value>(&text) {
                Ok(Value::Object(values)) => SubmissionTree::new(values),
                Ok(_) => return Some(Err(self.invalid("expected a JSON object".to_string()))),
                Err(err) => return Some(Err(self.invalid(err.to_string()))),
            };
            if self.filter.matches(&tree) {
                return Some(Ok(tree));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entry(form: &str) -> OpenDataEntry {
        OpenDataEntry {
            uuid: Uuid::new_v4(),
            name: String::new(),
            form: form.to_string(),
            active: true,
        }
    }

    fn setup(submissions: &str) -> (TempDir, DirectorySource, OpenDataEntry) {
        let dir = TempDir::new().unwrap();
        let form_dir = dir.path().join("tutorial");
        fs::create_dir(&form_dir).unwrap();
        fs::write(
            form_dir.join(FORM_FILE),
            r#"{"id_string": "tutorial", "project_id": 1,
                "fields": [{"path": "name", "type": "text"}]}"#,
        )
        .unwrap();
        fs::write(form_dir.join(SUBMISSIONS_FILE), submissions).unwrap();

        let entry = entry("tutorial");
        let source = DirectorySource::new(dir.path(), vec![entry.clone()]);
        (dir, source, entry)
    }

    #[test]
    fn reads_form_and_submissions() {
        let (_dir, source, entry) =
            setup("{\"_id\": 1, \"name\": \"a\"}\n\n{\"_id\": 2, \"name\": \"b\"}\n");

        let form = source.form(&entry).unwrap();
        assert_eq!(form.id_string, "tutorial");

        let ids: Vec<i64> = source
            .submissions(&entry, SubmissionFilter::default())
            .unwrap()
            .map(|s| s.unwrap().instance_id().unwrap())
            .collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(source.count(&entry, SubmissionFilter { gt_id: Some(1) }).unwrap(), 1);
    }

    #[test]
    fn malformed_lines_are_reported_with_position() {
        let (_dir, source, entry) = setup("{\"_id\": 1}\n[1, 2]\n{oops\n");

        let results: Vec<_> = source
            .submissions(&entry, SubmissionFilter::default())
            .unwrap()
            .collect();
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(matches!(
            results[1],
            Err(SourceError::InvalidSubmission { line: 2, .. })
        ));
        assert!(matches!(
            results[2],
            Err(SourceError::InvalidSubmission { line: 3, .. })
        ));
        assert!(source.count(&entry, SubmissionFilter::default()).is_err());
    }

    #[test]
    fn unknown_form_is_not_found() {
        let (_dir, source, _) = setup("");
        let missing = entry("missing");
        assert!(matches!(
            source.form(&missing),
            Err(SourceError::FormNotFound(_))
        ));
        assert!(matches!(
            source.submissions(&missing, SubmissionFilter::default()),
            Err(SourceError::FormNotFound(_))
        ));
    }
}

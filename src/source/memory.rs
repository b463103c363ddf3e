use std::collections::HashMap;
use uuid::Uuid;

use super::{find_active, OpenDataEntry, SubmissionFilter, SubmissionSource, Submissions};
use crate::errors::{SourceError, SourceResult};
use crate::form::FormDefinition;
use crate::submission::SubmissionTree;

/// In-process store, keyed by form name.
#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    entries: Vec<OpenDataEntry>,
    forms: HashMap<String, (FormDefinition, Vec<SubmissionTree>)>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_form(
        mut self,
        name: &str,
        form: FormDefinition,
        submissions: Vec<SubmissionTree>,
    ) -> Self {
        self.forms.insert(name.to_string(), (form, submissions));
        self
    }

    pub fn with_entry(mut self, entry: OpenDataEntry) -> Self {
        self.entries.push(entry);
        self
    }

    fn lookup(&self, entry: &OpenDataEntry) -> SourceResult<&(FormDefinition, Vec<SubmissionTree>)> {
        self.forms
            .get(&entry.form)
            .ok_or_else(|| SourceError::FormNotFound(entry.form.clone()))
    }
}

impl SubmissionSource for MemorySource {
    fn open_data(&self, uuid: &Uuid) -> SourceResult<OpenDataEntry> {
        find_active(&self.entries, uuid)
    }

    fn form(&self, entry: &OpenDataEntry) -> SourceResult<FormDefinition> {
        Ok(self.lookup(entry)?.0.clone())
    }

    fn submissions(
        &self,
        entry: &OpenDataEntry,
        filter: SubmissionFilter,
    ) -> SourceResult<Submissions> {
        let submissions: Vec<SubmissionTree> = self
            .lookup(entry)?
            .1
            .iter()
            .filter(|tree| filter.matches(tree))
            .cloned()
            .collect();
        Ok(Box::new(submissions.into_iter().map(Ok::<_, SourceError>)))
    }
}

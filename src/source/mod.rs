//! Submission stores.
//!
//! A [`SubmissionSource`] resolves a public open-data uuid to a form and hands out
//! that form's submissions as a lazy iterator. Stores are read-only for the
//! duration of an export.

pub mod directory;
pub mod memory;

pub use directory::DirectorySource;
pub use memory::MemorySource;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{SourceError, SourceResult};
use crate::form::FormDefinition;
use crate::submission::SubmissionTree;

/// Public handle that exposes one form's data to external analytics tools.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct OpenDataEntry {
    pub uuid: Uuid,
    #[serde(default)]
    pub name: String,
    /// Form key inside the store, e.g. the form's directory name.
    pub form: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SubmissionFilter {
    /// Only submissions with an `_id` strictly greater than this.
    pub gt_id: Option<i64>,
}

impl SubmissionFilter {
    /// Submissions without a readable id are kept so that the flattener can report them.
    pub fn matches(&self, tree: &SubmissionTree) -> bool {
        match (self.gt_id, tree.instance_id()) {
            (Some(gt_id), Some(id)) => id > gt_id,
            _ => true,
        }
    }
}

pub type Submissions = Box<dyn Iterator<Item = SourceResult<SubmissionTree>> + Send>;

pub trait SubmissionSource: Send + Sync {
    /// Active entry registered under `uuid`.
    fn open_data(&self, uuid: &Uuid) -> SourceResult<OpenDataEntry>;

    fn form(&self, entry: &OpenDataEntry) -> SourceResult<FormDefinition>;

    /// Lazy, single-pass iterator over the entry's submissions in storage order.
    fn submissions(
        &self,
        entry: &OpenDataEntry,
        filter: SubmissionFilter,
    ) -> SourceResult<Submissions>;

    fn count(&self, entry: &OpenDataEntry, filter: SubmissionFilter) -> SourceResult<u64> {
        let mut count = 0;
        for submission in self.submissions(entry, filter)? {
            submission?;
            count += 1;
        }
        Ok(count)
    }
}

pub(crate) fn find_active(entries: &[OpenDataEntry], uuid: &Uuid) -> SourceResult<OpenDataEntry> {
    let entry = entries
        .iter()
        .find(|e| &e.uuid == uuid)
        .ok_or_else(|| SourceError::OpenDataNotFound(uuid.to_string()))?;

    if !entry.active {
        return Err(SourceError::OpenDataInactive(uuid.to_string()));
    }
    Ok(entry.clone())
}

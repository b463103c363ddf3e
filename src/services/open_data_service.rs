use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::errors::ExportResult;
use crate::export::{ExportLayout, Flattener, RowStream, TableSchema};
use crate::source::{OpenDataEntry, SubmissionFilter, SubmissionSource, Submissions};

/// Resolves open-data uuids and runs schema inference and row flattening for them.
#[derive(Clone)]
pub struct OpenDataService {
    source: Arc<dyn SubmissionSource>,
    base_url: String,
}

impl OpenDataService {
    pub fn new(source: Arc<dyn SubmissionSource>, base_url: &str) -> Self {
        Self {
            source,
            base_url: base_url.to_string(),
        }
    }

    pub fn entry(&self, uuid: &Uuid) -> ExportResult<OpenDataEntry> {
        Ok(self.source.open_data(uuid)?)
    }

    pub fn layout(&self, uuid: &Uuid) -> ExportResult<(OpenDataEntry, ExportLayout)> {
        let entry = self.entry(uuid)?;
        let form = self.source.form(&entry)?;
        Ok((entry, ExportLayout::infer(&form)))
    }

    pub fn schema(&self, uuid: &Uuid) -> ExportResult<Vec<TableSchema>> {
        let (entry, layout) = self.layout(uuid)?;
        info!(
            "Schema for open data '{}' ({}): {} table(s)",
            entry.name,
            uuid,
            layout.table_aliases().len()
        );
        Ok(layout.schemas())
    }

    /// Lazy root rows for the entry's submissions.
    pub fn rows(
        &self,
        uuid: &Uuid,
        filter: SubmissionFilter,
    ) -> ExportResult<RowStream<Submissions>> {
        let (entry, layout) = self.layout(uuid)?;
        let submissions = self.source.submissions(&entry, filter)?;
        info!(
            "Streaming rows for open data '{}' ({}), gt_id={:?}",
            entry.name, uuid, filter.gt_id
        );

        let flattener = Flattener::from_layout(layout).with_base_url(&self.base_url);
        Ok(flattener.rows(submissions))
    }

    pub fn count(&self, uuid: &Uuid, filter: SubmissionFilter) -> ExportResult<u64> {
        let entry = self.entry(uuid)?;
        Ok(self.source.count(&entry, filter)?)
    }
}

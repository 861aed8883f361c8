use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use crate::aggregate;
use crate::config::EngineConfig;
use crate::dashboard;
use crate::error::SourceError;
use crate::models::{
    CourseAggregate, DashboardSnapshot, ExternalCounts, ProgramAggregate, StudentAggregate,
    Transcript,
};
use crate::source::{RecordFilter, RecordSource};

/// Read-side entry point: scoped queries against an injected record source.
///
/// Every call re-reads the source; nothing is cached between calls.
#[derive(Clone)]
pub struct AcademicEngine {
    source: Arc<dyn RecordSource>,
    config: EngineConfig,
}

impl AcademicEngine {
    pub fn new(source: Arc<dyn RecordSource>, config: EngineConfig) -> Self {
        Self { source, config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub async fn students(
        &self,
        filter: &RecordFilter,
    ) -> Result<BTreeMap<String, StudentAggregate>, SourceError> {
        let records = self.source.fetch_all(filter).await?;
        debug!(records = records.len(), "building student roster");
        Ok(aggregate::by_student(&records))
    }

    pub async fn courses(
        &self,
        filter: &RecordFilter,
    ) -> Result<BTreeMap<String, CourseAggregate>, SourceError> {
        let records = self.source.fetch_all(filter).await?;
        debug!(records = records.len(), "building course catalog");
        Ok(aggregate::by_course(&records))
    }

    pub async fn programs(
        &self,
        filter: &RecordFilter,
    ) -> Result<BTreeMap<String, ProgramAggregate>, SourceError> {
        let records = self.source.fetch_all(filter).await?;
        debug!(records = records.len(), "building program table");
        Ok(aggregate::by_program_with_capacity(
            &records,
            self.config.program_capacity,
        ))
    }

    pub async fn transcript(&self, identifier: &str) -> Result<Option<Transcript>, SourceError> {
        let records = self
            .source
            .fetch_all(&RecordFilter::student(identifier))
            .await?;
        Ok(aggregate::transcript(&records, identifier, self.config.scale))
    }

    pub async fn transcripts(&self, filter: &RecordFilter) -> Result<Vec<Transcript>, SourceError> {
        let records = self.source.fetch_all(filter).await?;
        Ok(aggregate::transcripts(&records, self.config.scale))
    }

    /// Best-effort: source failures degrade individual steps.
    pub async fn dashboard(&self, external: ExternalCounts) -> DashboardSnapshot {
        dashboard::compose_from_source(self.source.as_ref(), external, &self.config).await
    }
}

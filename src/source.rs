use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::error::SourceError;
use crate::models::RawRecord;
use crate::programs::program_code;
use crate::sample;

/// Scopes a read. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    pub identifier: Option<String>,
    pub course_code: Option<String>,
    pub program_code: Option<String>,
    pub academic_year: Option<String>,
    pub term: Option<String>,
}

impl RecordFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn student(identifier: impl Into<String>) -> Self {
        Self {
            identifier: Some(identifier.into()),
            ..Self::default()
        }
    }

    pub fn course(course_code: impl Into<String>) -> Self {
        Self {
            course_code: Some(course_code.into()),
            ..Self::default()
        }
    }

    pub fn program(code: impl Into<String>) -> Self {
        Self {
            program_code: Some(code.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn matches(&self, record: &RawRecord) -> bool {
        fn check(expected: &Option<String>, actual: &str) -> bool {
            expected.as_deref().map_or(true, |value| value == actual)
        }

        check(&self.identifier, &record.identifier)
            && check(&self.course_code, &record.course_code)
            && check(&self.program_code, program_code(&record.identifier))
            && check(&self.academic_year, &record.academic_year)
            && check(&self.term, &record.term)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordField {
    Identifier,
    CourseCode,
    ProgramCode,
    AcademicYear,
    Term,
}

impl RecordField {
    pub fn value_of(self, record: &RawRecord) -> &str {
        match self {
            RecordField::Identifier => &record.identifier,
            RecordField::CourseCode => &record.course_code,
            RecordField::ProgramCode => program_code(&record.identifier),
            RecordField::AcademicYear => &record.academic_year,
            RecordField::Term => &record.term,
        }
    }
}

#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Records matching `filter`, in insertion order.
    async fn fetch_all(&self, filter: &RecordFilter) -> Result<Vec<RawRecord>, SourceError>;

    /// Up to `size` matching records. Callers treat the result as representative.
    async fn fetch_sample(
        &self,
        filter: &RecordFilter,
        size: usize,
    ) -> Result<Vec<RawRecord>, SourceError>;

    async fn count_distinct(
        &self,
        field: RecordField,
        filter: &RecordFilter,
    ) -> Result<usize, SourceError>;

    /// The last `limit` records inserted, newest first.
    async fn fetch_recent(&self, limit: usize) -> Result<Vec<RawRecord>, SourceError> {
        let records = self.fetch_all(&RecordFilter::all()).await?;
        Ok(records.into_iter().rev().take(limit).collect())
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    records: Vec<RawRecord>,
}

impl InMemorySource {
    pub fn new(records: Vec<RawRecord>) -> Self {
        Self { records }
    }

    fn matching(&self, filter: &RecordFilter) -> Vec<RawRecord> {
        self.records
            .iter()
            .filter(|record| filter.matches(record))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl RecordSource for InMemorySource {
    async fn fetch_all(&self, filter: &RecordFilter) -> Result<Vec<RawRecord>, SourceError> {
        Ok(self.matching(filter))
    }

    async fn fetch_sample(
        &self,
        filter: &RecordFilter,
        size: usize,
    ) -> Result<Vec<RawRecord>, SourceError> {
        Ok(sample::sample(&self.matching(filter), size))
    }

    async fn count_distinct(
        &self,
        field: RecordField,
        filter: &RecordFilter,
    ) -> Result<usize, SourceError> {
        let values: BTreeSet<&str> = self
            .records
            .iter()
            .filter(|record| filter.matches(record))
            .map(|record| field.value_of(record))
            .collect();
        Ok(values.len())
    }

    async fn fetch_recent(&self, limit: usize) -> Result<Vec<RawRecord>, SourceError> {
        Ok(self.records.iter().rev().take(limit).cloned().collect())
    }
}

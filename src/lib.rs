//! Academic record aggregation: grade classification, program resolution,
//! student/course/program rosters, transcripts and dashboard snapshots
//! derived from flat per-course records.

pub mod aggregate;
pub mod config;
pub mod dashboard;
pub mod db;
pub mod engine;
pub mod error;
pub mod grading;
pub mod import;
pub mod models;
pub mod programs;
pub mod report;
pub mod sample;
pub mod source;

pub use engine::AcademicEngine;
pub use error::{ImportError, SourceError};
pub use grading::{classify, GradeScale, Letter};
pub use models::RawRecord;
pub use programs::resolve;
pub use source::{InMemorySource, RecordField, RecordFilter, RecordSource};

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::grading::{clamp_score, Letter};
use crate::programs::ProgramInfo;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawRecord {
    pub identifier: String,
    pub student_name: String,
    pub year_of_study: u32,
    pub academic_year: String,
    pub term: String,
    pub course_code: String,
    pub course_title: String,
    pub final_grade: f64,
    pub grade_description: String,
}

impl RawRecord {
    /// Grade is clamped into [0, 100]; year of study is at least 1.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        identifier: impl Into<String>,
        student_name: impl Into<String>,
        year_of_study: u32,
        academic_year: impl Into<String>,
        term: impl Into<String>,
        course_code: impl Into<String>,
        course_title: impl Into<String>,
        final_grade: f64,
        grade_description: impl Into<String>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            student_name: student_name.into(),
            year_of_study: year_of_study.max(1),
            academic_year: academic_year.into(),
            term: term.into(),
            course_code: course_code.into(),
            course_title: course_title.into(),
            final_grade: clamp_score(final_grade),
            grade_description: grade_description.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourseScore {
    pub course_code: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentAggregate {
    pub identifier: String,
    pub name: String,
    pub program: ProgramInfo,
    pub email: String,
    pub year_of_study: u32,
    pub course_count: usize,
    pub mean_score: f64,
    pub courses: Vec<CourseScore>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourseAggregate {
    pub code: String,
    pub title: String,
    pub department: String,
    pub enrolled_count: usize,
    pub record_count: usize,
    pub mean_score: f64,
    pub terms: BTreeSet<String>,
    pub academic_years: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgramAggregate {
    pub code: String,
    pub info: ProgramInfo,
    pub enrolled_count: usize,
    pub record_count: usize,
    pub mean_score: f64,
    /// Percent of nominal capacity; may exceed 100.
    pub capacity_utilization: u32,
    pub academic_years: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptEntry {
    pub academic_year: String,
    pub term: String,
    pub course_code: String,
    pub course_title: String,
    pub score: f64,
    pub letter: Letter,
    pub gpa: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transcript {
    pub student: StudentAggregate,
    pub entries: Vec<TranscriptEntry>,
    pub cumulative_gpa: f64,
    pub total_credits: u32,
}

/// A statistic computed from a random sample rather than the full record set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Estimate<T> {
    pub value: T,
    pub sample_size: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedRow {
    pub code: String,
    pub name: String,
    pub enrolled_count: usize,
    pub record_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityEntry {
    pub title: String,
    pub identifier: String,
    pub course_code: String,
    pub letter: Letter,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalCounts {
    pub faculty: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DashboardTotals {
    pub students: usize,
    pub faculty: usize,
    pub departments: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DashboardStep {
    Totals,
    GradeDistribution,
    Rankings,
    RecentActivity,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    pub generated_at: DateTime<Utc>,
    pub totals: DashboardTotals,
    pub grade_distribution: Estimate<BTreeMap<Letter, usize>>,
    pub top_rankings: Estimate<Vec<RankedRow>>,
    /// Built from the ranking sample, so enrollment and utilization are estimates.
    pub program_table: Estimate<BTreeMap<String, ProgramAggregate>>,
    /// Percent of sampled grades carrying a passing letter.
    pub pass_rate: Estimate<f64>,
    pub recent_activity: Vec<ActivityEntry>,
    pub degraded: Vec<DashboardStep>,
}

//! Dashboard snapshot composition.
//!
//! Totals are exact and come from full distinct counts. The grade
//! distribution, pass-rate, rankings and program table are computed from
//! random samples and carried as [`Estimate`]s. Every step degrades to its zero value on failure
//! and records itself in [`DashboardSnapshot::degraded`].

use std::collections::{BTreeMap, BTreeSet};

use chrono::Utc;
use rand::Rng;
use tracing::{debug, warn};

use crate::aggregate::{by_course, by_program_with_capacity};
use crate::config::{EngineConfig, RankBy};
use crate::error::SourceError;
use crate::grading::{GradeScale, Letter};
use crate::models::{
    ActivityEntry, DashboardSnapshot, DashboardStep, DashboardTotals, Estimate, ExternalCounts,
    ProgramAggregate, RankedRow, RawRecord,
};
use crate::sample::sample_with;
use crate::source::{RecordField, RecordFilter, RecordSource};

/// Pass-rate reported when no grades were sampled.
///
/// Passing letters come from [`EngineConfig::passing_letters`], which defaults
/// to A+, A, B+ and B on the standard scale (A and B on the coarse one).
pub const DEFAULT_PASS_RATE: f64 = 0.0;

pub fn compose(
    records: &[RawRecord],
    external: ExternalCounts,
    config: &EngineConfig,
) -> DashboardSnapshot {
    compose_with(records, external, config, &mut rand::thread_rng())
}

pub fn compose_with<R: Rng + ?Sized>(
    records: &[RawRecord],
    external: ExternalCounts,
    config: &EngineConfig,
    rng: &mut R,
) -> DashboardSnapshot {
    let totals = DashboardTotals {
        students: distinct(records, RecordField::Identifier),
        faculty: external.faculty,
        departments: distinct(records, RecordField::CourseCode),
    };

    let histogram_sample = sample_with(records, config.histogram_sample_size, &mut *rng);
    let ranking_sample = sample_with(records, config.ranking_sample_size, &mut *rng);
    let recent: Vec<RawRecord> = records
        .iter()
        .rev()
        .take(config.recent_limit)
        .cloned()
        .collect();

    assemble(
        totals,
        &histogram_sample,
        &ranking_sample,
        &recent,
        config,
        Vec::new(),
    )
}

/// Composes a snapshot by querying `source`.
///
/// The sub-queries run concurrently and are not transactionally consistent
/// with one another. A failed query degrades its step instead of failing the
/// snapshot.
pub async fn compose_from_source(
    source: &dyn RecordSource,
    external: ExternalCounts,
    config: &EngineConfig,
) -> DashboardSnapshot {
    let all = RecordFilter::all();
    let (students, departments, histogram_sample, ranking_sample, recent) = tokio::join!(
        source.count_distinct(RecordField::Identifier, &all),
        source.count_distinct(RecordField::CourseCode, &all),
        source.fetch_sample(&all, config.histogram_sample_size),
        source.fetch_sample(&all, config.ranking_sample_size),
        source.fetch_recent(config.recent_limit),
    );

    let mut degraded = Vec::new();
    let totals = DashboardTotals {
        students: recover(&mut degraded, DashboardStep::Totals, students),
        faculty: external.faculty,
        departments: recover(&mut degraded, DashboardStep::Totals, departments),
    };
    let histogram_sample = recover(
        &mut degraded,
        DashboardStep::GradeDistribution,
        histogram_sample,
    );
    let ranking_sample = recover(&mut degraded, DashboardStep::Rankings, ranking_sample);
    let recent = recover(&mut degraded, DashboardStep::RecentActivity, recent);

    assemble(
        totals,
        &histogram_sample,
        &ranking_sample,
        &recent,
        config,
        degraded,
    )
}

fn recover<T: Default>(
    degraded: &mut Vec<DashboardStep>,
    step: DashboardStep,
    result: Result<T, SourceError>,
) -> T {
    match result {
        Ok(value) => value,
        Err(err) => {
            warn!(step = ?step, error = %err, "dashboard step degraded");
            if !degraded.contains(&step) {
                degraded.push(step);
            }
            T::default()
        }
    }
}

fn assemble(
    totals: DashboardTotals,
    histogram_sample: &[RawRecord],
    ranking_sample: &[RawRecord],
    recent: &[RawRecord],
    config: &EngineConfig,
    degraded: Vec<DashboardStep>,
) -> DashboardSnapshot {
    let grade_distribution = grade_distribution(histogram_sample, config.scale);
    let pass_rate = pass_rate(&grade_distribution, &config.passing_letters);
    let top_rankings = rank(
        ranking_sample,
        config.rank_by,
        config.top_n,
        config.program_capacity,
    );
    let program_table = program_table(ranking_sample, config.program_capacity);

    debug!(
        students = totals.students,
        departments = totals.departments,
        histogram_sample = grade_distribution.sample_size,
        ranking_sample = top_rankings.sample_size,
        "dashboard composed"
    );

    DashboardSnapshot {
        generated_at: Utc::now(),
        totals,
        grade_distribution,
        top_rankings,
        program_table,
        pass_rate,
        recent_activity: recent_activity(recent, config.scale),
        degraded,
    }
}

fn distinct(records: &[RawRecord], field: RecordField) -> usize {
    records
        .iter()
        .map(|record| field.value_of(record))
        .collect::<BTreeSet<_>>()
        .len()
}

/// Letter counts over the sample. Letters that never occur are absent.
pub fn grade_distribution(
    sample: &[RawRecord],
    scale: GradeScale,
) -> Estimate<BTreeMap<Letter, usize>> {
    let mut histogram = BTreeMap::new();
    for record in sample {
        *histogram
            .entry(scale.classify(record.final_grade).letter)
            .or_insert(0) += 1;
    }

    Estimate {
        value: histogram,
        sample_size: sample.len(),
    }
}

/// Percent of histogram entries whose letter is in `passing`, to one decimal.
/// An empty histogram gives [`DEFAULT_PASS_RATE`].
pub fn pass_rate(
    histogram: &Estimate<BTreeMap<Letter, usize>>,
    passing: &[Letter],
) -> Estimate<f64> {
    let total: usize = histogram.value.values().sum();
    let value = if total == 0 {
        DEFAULT_PASS_RATE
    } else {
        let passed: usize = histogram
            .value
            .iter()
            .filter(|&(letter, _)| passing.contains(letter))
            .map(|(_, count)| count)
            .sum();
        (passed as f64 / total as f64 * 1000.0).round() / 10.0
    };

    Estimate {
        value,
        sample_size: histogram.sample_size,
    }
}

/// Top `top_n` rows by distinct enrollment; ties go to the smaller code.
pub fn rank(
    sample: &[RawRecord],
    rank_by: RankBy,
    top_n: usize,
    capacity: usize,
) -> Estimate<Vec<RankedRow>> {
    let mut rows: Vec<RankedRow> = match rank_by {
        RankBy::Course => by_course(sample)
            .into_values()
            .map(|course| RankedRow {
                code: course.code,
                name: course.title,
                enrolled_count: course.enrolled_count,
                record_count: course.record_count,
            })
            .collect(),
        RankBy::Program => by_program_with_capacity(sample, capacity)
            .into_values()
            .map(|program| RankedRow {
                code: program.code,
                name: program.info.name,
                enrolled_count: program.enrolled_count,
                record_count: program.record_count,
            })
            .collect(),
    };

    rows.sort_by(|a, b| {
        b.enrolled_count
            .cmp(&a.enrolled_count)
            .then_with(|| a.code.cmp(&b.code))
    });
    rows.truncate(top_n);

    Estimate {
        value: rows,
        sample_size: sample.len(),
    }
}

pub fn program_table(
    sample: &[RawRecord],
    capacity: usize,
) -> Estimate<BTreeMap<String, ProgramAggregate>> {
    Estimate {
        value: by_program_with_capacity(sample, capacity),
        sample_size: sample.len(),
    }
}

/// `recent` must already be newest first.
pub fn recent_activity(recent: &[RawRecord], scale: GradeScale) -> Vec<ActivityEntry> {
    recent
        .iter()
        .map(|record| {
            let letter = scale.classify(record.final_grade).letter;
            ActivityEntry {
                title: format!("Grade {} assigned to {}", letter, record.student_name.trim()),
                identifier: record.identifier.clone(),
                course_code: record.course_code.clone(),
                letter,
            }
        })
        .collect()
}

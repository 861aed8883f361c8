use std::collections::BTreeMap;
use std::sync::Arc;

use academic_records::config::{EngineConfig, RankBy};
use academic_records::dashboard::DEFAULT_PASS_RATE;
use academic_records::models::{DashboardStep, ExternalCounts};
use academic_records::report::build_report;
use academic_records::source::{InMemorySource, RecordField, RecordFilter, RecordSource};
use academic_records::{AcademicEngine, GradeScale, Letter, RawRecord, SourceError};
use async_trait::async_trait;

fn record(identifier: &str, name: &str, course: &str, term: &str, grade: f64) -> RawRecord {
    RawRecord::new(
        identifier,
        name,
        2,
        "2024/2025",
        term,
        course,
        format!("{course} title"),
        grade,
        "",
    )
}

fn fixture() -> Vec<RawRecord> {
    vec![
        record("BAC/2020/001", "Avery Lee", "ACC101", "Semester 1", 92.0),
        record("BAC/2020/002", "Jules Moreno", "ACC101", "Semester 1", 78.0),
        record("BAC/2020/003", "Kiara Patel", "ACC305", "Semester 2", 55.0),
        record("BBA/2021/0012", "Noor Haddad", "BUS210", "Semester 1", 81.0),
        record("BBA/2021/0012", "Noor Haddad", "ACC101", "Semester 2", 64.0),
        record("XYZ123", "Lena Fischer", "ENG100", "Semester 1", 70.0),
    ]
}

fn engine(records: Vec<RawRecord>, config: EngineConfig) -> AcademicEngine {
    AcademicEngine::new(Arc::new(InMemorySource::new(records)), config)
}

struct UnavailableSource;

#[async_trait]
impl RecordSource for UnavailableSource {
    async fn fetch_all(&self, _filter: &RecordFilter) -> Result<Vec<RawRecord>, SourceError> {
        Err(SourceError::Unavailable("store offline".to_string()))
    }

    async fn fetch_sample(
        &self,
        _filter: &RecordFilter,
        _size: usize,
    ) -> Result<Vec<RawRecord>, SourceError> {
        Err(SourceError::Unavailable("store offline".to_string()))
    }

    async fn count_distinct(
        &self,
        _field: RecordField,
        _filter: &RecordFilter,
    ) -> Result<usize, SourceError> {
        Err(SourceError::Unavailable("store offline".to_string()))
    }
}

#[tokio::test]
async fn program_scenario_matches_histogram() {
    let records: Vec<RawRecord> = fixture().into_iter().take(3).collect();
    let engine = engine(records, EngineConfig::default());

    let programs = engine.programs(&RecordFilter::all()).await.unwrap();
    assert_eq!(programs["BAC"].mean_score, 75.0);

    let snapshot = engine.dashboard(ExternalCounts::default()).await;
    let expected: BTreeMap<Letter, usize> = [(Letter::APlus, 1), (Letter::B, 1), (Letter::F, 1)]
        .into_iter()
        .collect();
    assert_eq!(snapshot.grade_distribution.value, expected);
}

#[tokio::test]
async fn every_grouping_partitions_the_records() {
    let records = fixture();
    let total = records.len();
    let engine = engine(records, EngineConfig::default());
    let all = RecordFilter::all();

    let students = engine.students(&all).await.unwrap();
    let courses = engine.courses(&all).await.unwrap();
    let programs = engine.programs(&all).await.unwrap();

    let students: usize = students.values().map(|s| s.course_count).sum();
    let courses: usize = courses.values().map(|c| c.record_count).sum();
    let programs: usize = programs.values().map(|p| p.record_count).sum();

    assert_eq!(students, total);
    assert_eq!(courses, total);
    assert_eq!(programs, total);
}

#[tokio::test]
async fn scoped_queries_only_see_their_records() {
    let engine = engine(fixture(), EngineConfig::default());

    let bba = engine.students(&RecordFilter::program("BBA")).await.unwrap();
    assert_eq!(bba.len(), 1);
    assert_eq!(bba["BBA/2021/0012"].mean_score, 72.5);

    let acc101 = engine.courses(&RecordFilter::course("ACC101")).await.unwrap();
    assert_eq!(acc101.len(), 1);
    assert_eq!(acc101["ACC101"].enrolled_count, 3);

    let fallback = engine.programs(&RecordFilter::program("XYZ123")).await.unwrap();
    assert_eq!(fallback["XYZ123"].info.name, "XYZ123 Program");
    assert_eq!(fallback["XYZ123"].info.department, "General");
}

#[tokio::test]
async fn transcript_follows_configured_scale() {
    let config = EngineConfig {
        scale: GradeScale::Coarse,
        ..EngineConfig::default()
    };
    let engine = engine(fixture(), config);

    let transcript = engine.transcript("BBA/2021/0012").await.unwrap().unwrap();
    let letters: Vec<Letter> = transcript.entries.iter().map(|e| e.letter).collect();
    assert_eq!(letters, vec![Letter::A, Letter::C]);
    assert_eq!(transcript.cumulative_gpa, 3.0);
    assert_eq!(
        transcript.student.program.name,
        "Bachelor of Business Administration"
    );

    assert!(engine.transcript("NOPE/1").await.unwrap().is_none());
    let transcripts = engine.transcripts(&RecordFilter::all()).await.unwrap();
    assert_eq!(transcripts.len(), 5);
}

#[tokio::test]
async fn dashboard_totals_and_rankings() {
    let config = EngineConfig {
        rank_by: RankBy::Program,
        top_n: 2,
        ..EngineConfig::default()
    };
    let engine = engine(fixture(), config);

    let snapshot = engine.dashboard(ExternalCounts { faculty: 9 }).await;
    assert_eq!(snapshot.totals.students, 5);
    assert_eq!(snapshot.totals.departments, 4);
    assert_eq!(snapshot.totals.faculty, 9);
    assert_eq!(snapshot.grade_distribution.sample_size, 6);

    let codes: Vec<&str> = snapshot
        .top_rankings
        .value
        .iter()
        .map(|row| row.code.as_str())
        .collect();
    assert_eq!(codes, vec!["BAC", "BBA"]);

    // 92, 81 and 78 carry A+, B+ and B.
    assert_eq!(snapshot.pass_rate.value, 50.0);

    assert_eq!(snapshot.recent_activity.len(), 5);
    assert_eq!(snapshot.recent_activity[0].identifier, "XYZ123");
    assert!(snapshot.degraded.is_empty());

    let programs = &snapshot.program_table;
    assert_eq!(programs.sample_size, 6);
    assert_eq!(programs.value["BAC"].enrolled_count, 3);
    assert_eq!(programs.value["XYZ123"].info.name, "XYZ123 Program");
}

#[tokio::test]
async fn empty_source_gives_zero_dashboard() {
    let engine = engine(Vec::new(), EngineConfig::default());
    let snapshot = engine.dashboard(ExternalCounts::default()).await;

    assert_eq!(snapshot.totals.students, 0);
    assert_eq!(snapshot.totals.departments, 0);
    assert!(snapshot.grade_distribution.value.is_empty());
    assert!(snapshot.top_rankings.value.is_empty());
    assert_eq!(snapshot.pass_rate.value, DEFAULT_PASS_RATE);
    assert!(snapshot.recent_activity.is_empty());
}

#[tokio::test]
async fn unavailable_source_degrades_dashboard_but_fails_queries() {
    let engine = AcademicEngine::new(Arc::new(UnavailableSource), EngineConfig::default());

    let snapshot = engine.dashboard(ExternalCounts { faculty: 3 }).await;
    assert_eq!(snapshot.totals.students, 0);
    assert_eq!(snapshot.totals.faculty, 3);
    assert_eq!(snapshot.pass_rate.value, DEFAULT_PASS_RATE);
    assert_eq!(
        snapshot.degraded,
        vec![
            DashboardStep::Totals,
            DashboardStep::GradeDistribution,
            DashboardStep::Rankings,
            DashboardStep::RecentActivity,
        ]
    );

    let err = engine.students(&RecordFilter::all()).await.unwrap_err();
    assert!(matches!(err, SourceError::Unavailable(_)));
}

#[tokio::test]
async fn report_renders_placeholders_when_source_is_down() {
    let engine = AcademicEngine::new(Arc::new(UnavailableSource), EngineConfig::default());

    let snapshot = engine.dashboard(ExternalCounts { faculty: 2 }).await;
    assert!(snapshot.program_table.value.is_empty());
    assert_eq!(snapshot.program_table.sample_size, 0);

    let report = build_report(&snapshot, engine.config());
    assert!(report.contains("- Students: 0"));
    assert!(report.contains("- Faculty: 2"));
    assert!(report.contains("No grades recorded."));
    assert!(report.contains("No enrollments recorded."));
    assert!(report.contains("No programs recorded."));
    assert!(report.contains("No records yet."));
    assert!(report.contains(
        "_Incomplete: [Totals, GradeDistribution, Rankings, RecentActivity] could not be computed._"
    ));
}

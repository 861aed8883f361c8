use std::fmt::Write;

use crate::config::{EngineConfig, RankBy};
use crate::models::DashboardSnapshot;

pub fn build_report(snapshot: &DashboardSnapshot, config: &EngineConfig) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Academic Records Summary");
    let _ = writeln!(
        output,
        "Generated {} using the {:?} grade scale",
        snapshot.generated_at.format("%Y-%m-%d %H:%M UTC"),
        config.scale
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Totals");
    let _ = writeln!(output, "- Students: {}", snapshot.totals.students);
    let _ = writeln!(output, "- Faculty: {}", snapshot.totals.faculty);
    let _ = writeln!(output, "- Course codes: {}", snapshot.totals.departments);
    let _ = writeln!(
        output,
        "- Pass rate (estimate from {} grades): {:.1}%",
        snapshot.pass_rate.sample_size, snapshot.pass_rate.value
    );

    let _ = writeln!(output);
    let _ = writeln!(
        output,
        "## Grade Distribution (estimate from {} grades)",
        snapshot.grade_distribution.sample_size
    );
    if snapshot.grade_distribution.value.is_empty() {
        let _ = writeln!(output, "No grades recorded.");
    } else {
        for (letter, count) in &snapshot.grade_distribution.value {
            let _ = writeln!(output, "- {}: {}", letter, count);
        }
    }

    let _ = writeln!(output);
    let heading = match config.rank_by {
        RankBy::Course => "Courses",
        RankBy::Program => "Programs",
    };
    let _ = writeln!(
        output,
        "## Largest {} (estimate from {} records)",
        heading, snapshot.top_rankings.sample_size
    );
    if snapshot.top_rankings.value.is_empty() {
        let _ = writeln!(output, "No enrollments recorded.");
    } else {
        for row in &snapshot.top_rankings.value {
            let _ = writeln!(
                output,
                "- {} ({}): {} students across {} records",
                row.code, row.name, row.enrolled_count, row.record_count
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(
        output,
        "## Programs (estimate from {} records)",
        snapshot.program_table.sample_size
    );
    if snapshot.program_table.value.is_empty() {
        let _ = writeln!(output, "No programs recorded.");
    } else {
        for program in snapshot.program_table.value.values() {
            let _ = writeln!(
                output,
                "- {} {} ({}, {}): {} students, mean {:.1}, {}% of capacity",
                program.code,
                program.info.name,
                program.info.department,
                program.info.level,
                program.enrolled_count,
                program.mean_score,
                program.capacity_utilization
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Recent Activity");
    if snapshot.recent_activity.is_empty() {
        let _ = writeln!(output, "No records yet.");
    } else {
        for entry in &snapshot.recent_activity {
            let _ = writeln!(
                output,
                "- {} ({}, {})",
                entry.title, entry.course_code, entry.identifier
            );
        }
    }

    if !snapshot.degraded.is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(
            output,
            "_Incomplete: {:?} could not be computed._",
            snapshot.degraded
        );
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::compose;
    use crate::models::{DashboardStep, ExternalCounts, RawRecord};

    fn record(identifier: &str, name: &str, grade: f64) -> RawRecord {
        RawRecord::new(
            identifier,
            name,
            1,
            "2024/2025",
            "Semester 1",
            "ACC101",
            "Financial Accounting",
            grade,
            "",
        )
    }

    fn records() -> Vec<RawRecord> {
        vec![
            record("BAC/1", "Avery Lee", 92.0),
            record("BAC/2", "Jules Moreno", 55.0),
        ]
    }

    #[test]
    fn report_lists_each_section() {
        let records = records();
        let config = EngineConfig::default();
        let snapshot = compose(&records, ExternalCounts { faculty: 4 }, &config);
        let report = build_report(&snapshot, &config);

        assert!(report.contains("- Students: 2"));
        assert!(report.contains("- Faculty: 4"));
        assert!(report.contains("Pass rate (estimate from 2 grades): 50.0%"));
        assert!(report.contains("- A+: 1"));
        assert!(report.contains("- ACC101 (Financial Accounting): 2 students across 2 records"));
        assert!(report.contains("## Programs (estimate from 2 records)"));
        assert!(report.contains(
            "- BAC Bachelor of Accounting (Accounting, Undergraduate): 2 students, mean 73.5"
        ));
        assert!(report.contains("Grade F assigned to Jules Moreno"));
        assert!(!report.contains("Incomplete"));
    }

    #[test]
    fn empty_report_uses_placeholders() {
        let config = EngineConfig::default();
        let mut snapshot = compose(&[], ExternalCounts::default(), &config);
        snapshot.degraded.push(DashboardStep::Totals);
        let report = build_report(&snapshot, &config);

        assert!(report.contains("No grades recorded."));
        assert!(report.contains("No programs recorded."));
        assert!(report.contains("No records yet."));
        assert!(report.contains("_Incomplete: [Totals] could not be computed._"));
    }
}

use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::ImportError;
use crate::models::RawRecord;

#[derive(Debug, Deserialize)]
struct SheetRow {
    #[serde(rename = "Registration Number", default)]
    registration_number: Option<String>,
    #[serde(rename = "Student Name", default)]
    student_name: Option<String>,
    #[serde(rename = "Year of Study", default)]
    year_of_study: Option<String>,
    #[serde(rename = "Academic Year", default)]
    academic_year: Option<String>,
    #[serde(rename = "Semester", default)]
    semester: Option<String>,
    #[serde(rename = "Course Code", default)]
    course_code: Option<String>,
    #[serde(rename = "Course Name", default)]
    course_name: Option<String>,
    #[serde(rename = "Final Grade", default)]
    final_grade: Option<String>,
    #[serde(rename = "Grade Description", default)]
    grade_description: Option<String>,
}

#[derive(Debug, Default)]
pub struct ImportOutcome {
    pub records: Vec<RawRecord>,
    /// Rows dropped for lacking a registration number or student name.
    pub skipped: usize,
}

/// Missing year of study becomes 1 and a missing or unreadable grade
/// becomes 0. Grades are clamped into [0, 100].
pub fn read_records<R: Read>(reader: R) -> Result<ImportOutcome, ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .flexible(true)
        .from_reader(reader);
    let mut outcome = ImportOutcome::default();

    for result in reader.deserialize::<SheetRow>() {
        let row = result?;
        match into_record(row) {
            Some(record) => outcome.records.push(record),
            None => outcome.skipped += 1,
        }
    }

    debug!(
        records = outcome.records.len(),
        skipped = outcome.skipped,
        "read import rows"
    );
    Ok(outcome)
}

pub fn read_records_from_path(path: &Path) -> Result<ImportOutcome, ImportError> {
    let file = std::fs::File::open(path).map_err(|source| ImportError::Io {
        path: path.display().to_string(),
        source,
    })?;
    read_records(file)
}

fn into_record(row: SheetRow) -> Option<RawRecord> {
    let identifier = non_empty(row.registration_number)?;
    let student_name = non_empty(row.student_name)?;

    Some(RawRecord::new(
        identifier,
        student_name,
        parse_or(row.year_of_study.as_deref(), 1),
        row.academic_year.unwrap_or_default(),
        row.semester.unwrap_or_default(),
        row.course_code.unwrap_or_default(),
        row.course_name.unwrap_or_default(),
        parse_or(row.final_grade.as_deref(), 0.0),
        row.grade_description.unwrap_or_default(),
    ))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

fn parse_or<T: std::str::FromStr>(value: Option<&str>, fallback: T) -> T {
    value
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHEET: &str = "\
Registration Number,Student Name,Year of Study,Academic Year,Semester,Course Code,Course Name,Final Grade,Grade Description
BBA/2021/0012,Avery Lee,2,2023/2024,Semester 1,ACC101,Financial Accounting,71,Credit
,Nobody,1,2023/2024,Semester 1,ACC101,Financial Accounting,50,Pass
BAC/2020/0007,Jules Moreno,,2023/2024,Semester 2,BUS110,Business Law,n/a,
DIP/2023/0100,Kiara Patel,1,2023/2024,Semester 1,ENG100,Communication Skills,140,Distinction
";

    #[test]
    fn reads_rows_and_skips_incomplete_ones() {
        let outcome = read_records(SHEET.as_bytes()).unwrap();
        assert_eq!(outcome.records.len(), 3);
        assert_eq!(outcome.skipped, 1);

        let first = &outcome.records[0];
        assert_eq!(first.identifier, "BBA/2021/0012");
        assert_eq!(first.year_of_study, 2);
        assert_eq!(first.term, "Semester 1");
        assert_eq!(first.course_title, "Financial Accounting");
        assert_eq!(first.final_grade, 71.0);
    }

    #[test]
    fn defaults_and_clamps_bad_values() {
        let outcome = read_records(SHEET.as_bytes()).unwrap();
        let defaulted = &outcome.records[1];
        assert_eq!(defaulted.year_of_study, 1);
        assert_eq!(defaulted.final_grade, 0.0);
        assert_eq!(defaulted.grade_description, "");
        assert_eq!(outcome.records[2].final_grade, 100.0);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = read_records_from_path(Path::new("/nonexistent/records.csv")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/records.csv"));
    }
}

use std::collections::{BTreeMap, BTreeSet};

use crate::grading::GradeScale;
use crate::models::{
    CourseAggregate, CourseScore, ProgramAggregate, RawRecord, StudentAggregate, Transcript,
    TranscriptEntry,
};
use crate::programs::{self, course_department};

pub const PROGRAM_CAPACITY: usize = 500;

const EMAIL_DOMAIN: &str = "university.edu";

/// Groups records by raw identifier. Identifiers are not trimmed, so
/// `"S1"` and `"S1 "` are two students.
pub fn by_student(records: &[RawRecord]) -> BTreeMap<String, StudentAggregate> {
    let mut groups: BTreeMap<&str, Vec<&RawRecord>> = BTreeMap::new();
    for record in records {
        groups.entry(record.identifier.as_str()).or_default().push(record);
    }

    groups
        .into_iter()
        .map(|(identifier, group)| {
            (
                identifier.to_string(),
                student_from_group(identifier, &group),
            )
        })
        .collect()
}

fn student_from_group(identifier: &str, group: &[&RawRecord]) -> StudentAggregate {
    let first = group[0];
    let name = first.student_name.trim().to_string();
    let scores: Vec<f64> = group.iter().map(|record| record.final_grade).collect();

    StudentAggregate {
        identifier: identifier.to_string(),
        email: contact_handle(&name),
        name,
        program: programs::resolve(identifier),
        year_of_study: first.year_of_study,
        course_count: group.len(),
        mean_score: round_to(mean(&scores), 1),
        courses: group
            .iter()
            .map(|record| CourseScore {
                course_code: record.course_code.clone(),
                score: record.final_grade,
            })
            .collect(),
    }
}

/// Groups records by course code. Enrollment counts distinct identifiers;
/// the mean spans every record of the course regardless of term.
pub fn by_course(records: &[RawRecord]) -> BTreeMap<String, CourseAggregate> {
    struct Acc<'a> {
        title: &'a str,
        students: BTreeSet<&'a str>,
        total: f64,
        count: usize,
        terms: BTreeSet<String>,
        years: BTreeSet<String>,
    }

    let mut map: BTreeMap<&str, Acc> = BTreeMap::new();
    for record in records {
        let entry = map.entry(record.course_code.as_str()).or_insert_with(|| Acc {
            title: record.course_title.as_str(),
            students: BTreeSet::new(),
            total: 0.0,
            count: 0,
            terms: BTreeSet::new(),
            years: BTreeSet::new(),
        });
        entry.students.insert(record.identifier.as_str());
        entry.total += record.final_grade;
        entry.count += 1;
        entry.terms.insert(record.term.clone());
        entry.years.insert(record.academic_year.clone());
    }

    map.into_iter()
        .map(|(code, acc)| {
            let aggregate = CourseAggregate {
                code: code.to_string(),
                title: acc.title.to_string(),
                department: course_department(code).to_string(),
                enrolled_count: acc.students.len(),
                record_count: acc.count,
                mean_score: round_to(acc.total / acc.count as f64, 1),
                terms: acc.terms,
                academic_years: acc.years,
            };
            (code.to_string(), aggregate)
        })
        .collect()
}

pub fn by_program(records: &[RawRecord]) -> BTreeMap<String, ProgramAggregate> {
    by_program_with_capacity(records, PROGRAM_CAPACITY)
}

pub fn by_program_with_capacity(
    records: &[RawRecord],
    capacity: usize,
) -> BTreeMap<String, ProgramAggregate> {
    struct Acc<'a> {
        students: BTreeSet<&'a str>,
        total: f64,
        count: usize,
        years: BTreeSet<String>,
    }

    let mut map: BTreeMap<&str, Acc> = BTreeMap::new();
    for record in records {
        let code = programs::program_code(&record.identifier);
        let entry = map.entry(code).or_insert_with(|| Acc {
            students: BTreeSet::new(),
            total: 0.0,
            count: 0,
            years: BTreeSet::new(),
        });
        entry.students.insert(record.identifier.as_str());
        entry.total += record.final_grade;
        entry.count += 1;
        entry.years.insert(record.academic_year.clone());
    }

    map.into_iter()
        .map(|(code, acc)| {
            let enrolled = acc.students.len();
            let aggregate = ProgramAggregate {
                code: code.to_string(),
                info: programs::resolve_code(code),
                enrolled_count: enrolled,
                record_count: acc.count,
                mean_score: round_to(acc.total / acc.count as f64, 1),
                capacity_utilization: utilization(enrolled, capacity),
                academic_years: acc.years,
            };
            (code.to_string(), aggregate)
        })
        .collect()
}

pub fn transcript(
    records: &[RawRecord],
    identifier: &str,
    scale: GradeScale,
) -> Option<Transcript> {
    let group: Vec<&RawRecord> = records
        .iter()
        .filter(|record| record.identifier == identifier)
        .collect();
    if group.is_empty() {
        return None;
    }
    Some(transcript_from_group(identifier, &group, scale))
}

pub fn transcripts(records: &[RawRecord], scale: GradeScale) -> Vec<Transcript> {
    let mut groups: BTreeMap<&str, Vec<&RawRecord>> = BTreeMap::new();
    for record in records {
        groups.entry(record.identifier.as_str()).or_default().push(record);
    }
    groups
        .into_iter()
        .map(|(identifier, group)| transcript_from_group(identifier, &group, scale))
        .collect()
}

fn transcript_from_group(identifier: &str, group: &[&RawRecord], scale: GradeScale) -> Transcript {
    let student = student_from_group(identifier, group);
    let entries: Vec<TranscriptEntry> = group
        .iter()
        .map(|record| {
            let grade = scale.classify(record.final_grade);
            TranscriptEntry {
                academic_year: record.academic_year.clone(),
                term: record.term.clone(),
                course_code: record.course_code.clone(),
                course_title: record.course_title.clone(),
                score: record.final_grade,
                letter: grade.letter,
                gpa: grade.gpa,
            }
        })
        .collect();
    let points: Vec<f64> = entries.iter().map(|entry| entry.gpa).collect();

    Transcript {
        total_credits: student.program.total_credits,
        cumulative_gpa: round_to(mean(&points), 2),
        student,
        entries,
    }
}

/// `"Jane Doe"` becomes `jane.doe@university.edu`. Identical names collide.
pub fn contact_handle(name: &str) -> String {
    format!("{}@{EMAIL_DOMAIN}", name.trim().to_lowercase().replace(' ', "."))
}

/// Enrolled share of capacity as a whole percentage, unclamped.
pub fn utilization(enrolled: usize, capacity: usize) -> u32 {
    if capacity == 0 {
        return 0;
    }
    (enrolled as f64 / capacity as f64 * 100.0).round() as u32
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Rounds half away from zero to `places` decimals.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::SourceError;
use crate::models::RawRecord;
use crate::source::{RecordField, RecordFilter, RecordSource};

const SELECT_RECORDS: &str = "SELECT identifier, student_name, year_of_study, academic_year, term, \
     course_code, course_title, final_grade, grade_description \
     FROM academic_records.records";

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<usize> {
    let rows = [
        (
            "BBA/2021/0012",
            "Avery Lee",
            3,
            "Semester 1",
            "ACC101",
            "Financial Accounting",
            88.0,
            "Excellent",
        ),
        (
            "BBA/2021/0012",
            "Avery Lee",
            3,
            "Semester 2",
            "BUS210",
            "Organisational Behaviour",
            74.0,
            "Good",
        ),
        (
            "BAC/2020/0007",
            "Jules Moreno",
            4,
            "Semester 1",
            "ACC101",
            "Financial Accounting",
            92.0,
            "Excellent",
        ),
        (
            "BAC/2020/0007",
            "Jules Moreno",
            4,
            "Semester 1",
            "ACC305",
            "Auditing",
            61.0,
            "Pass",
        ),
        (
            "DIP/2023/0100",
            "Kiara Patel",
            1,
            "Semester 1",
            "BUS110",
            "Introduction to Business",
            57.0,
            "Fail",
        ),
        (
            "BCD/2022/0031",
            "Noor Haddad",
            2,
            "Semester 2",
            "DP204",
            "Community Project Planning",
            79.0,
            "Good",
        ),
        (
            "HRM/2022/0044",
            "Tomas Reyes",
            2,
            "Semester 1",
            "BUS210",
            "Organisational Behaviour",
            66.0,
            "Fair",
        ),
        (
            "LSM/2021/0019",
            "Mei Tanaka",
            3,
            "Semester 2",
            "MATH110",
            "Business Mathematics",
            83.0,
            "Very Good",
        ),
        (
            "EXCH2024",
            "Lena Fischer",
            1,
            "Semester 1",
            "ENG100",
            "Communication Skills",
            71.0,
            "Good",
        ),
    ];

    let records: Vec<RawRecord> = rows
        .into_iter()
        .map(|(identifier, name, year, term, code, title, grade, description)| {
            RawRecord::new(
                identifier,
                name,
                year,
                "2024/2025",
                term,
                code,
                title,
                grade,
                description,
            )
        })
        .collect();

    insert_records(pool, &records).await
}

/// Inserts records in order. Rows already present for the same student,
/// course, academic year and term are left untouched.
pub async fn insert_records(pool: &PgPool, records: &[RawRecord]) -> anyhow::Result<usize> {
    let mut inserted = 0usize;

    for record in records {
        let result = sqlx::query(
            r#"
            INSERT INTO academic_records.records
            (id, identifier, student_name, year_of_study, academic_year, term,
             course_code, course_title, final_grade, grade_description)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (identifier, course_code, academic_year, term) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&record.identifier)
        .bind(&record.student_name)
        .bind(i32::try_from(record.year_of_study).unwrap_or(i32::MAX))
        .bind(&record.academic_year)
        .bind(&record.term)
        .bind(&record.course_code)
        .bind(&record.course_title)
        .bind(record.final_grade)
        .bind(&record.grade_description)
        .execute(pool)
        .await?;

        if result.rows_affected() > 0 {
            inserted += 1;
        }
    }

    info!(inserted, offered = records.len(), "records stored");
    Ok(inserted)
}

#[derive(Debug, Clone)]
pub struct PgRecordSource {
    pool: PgPool,
}

impl PgRecordSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn column(field: RecordField) -> &'static str {
    match field {
        RecordField::Identifier => "identifier",
        RecordField::CourseCode => "course_code",
        RecordField::ProgramCode => "split_part(identifier, '/', 1)",
        RecordField::AcademicYear => "academic_year",
        RecordField::Term => "term",
    }
}

fn where_clause(filter: &RecordFilter) -> (String, Vec<String>) {
    let conditions = [
        (RecordField::Identifier, &filter.identifier),
        (RecordField::CourseCode, &filter.course_code),
        (RecordField::ProgramCode, &filter.program_code),
        (RecordField::AcademicYear, &filter.academic_year),
        (RecordField::Term, &filter.term),
    ];

    let mut clause = String::new();
    let mut binds = Vec::new();
    for (field, value) in conditions {
        if let Some(value) = value {
            binds.push(value.clone());
            clause.push_str(if binds.len() == 1 { " WHERE " } else { " AND " });
            clause.push_str(&format!("{} = ${}", column(field), binds.len()));
        }
    }

    (clause, binds)
}

fn to_record(row: &PgRow) -> Result<RawRecord, sqlx::Error> {
    let year_of_study: i32 = row.try_get("year_of_study")?;
    Ok(RawRecord {
        identifier: row.try_get("identifier")?,
        student_name: row.try_get("student_name")?,
        year_of_study: u32::try_from(year_of_study).unwrap_or(1).max(1),
        academic_year: row.try_get("academic_year")?,
        term: row.try_get("term")?,
        course_code: row.try_get("course_code")?,
        course_title: row.try_get("course_title")?,
        final_grade: row.try_get("final_grade")?,
        grade_description: row.try_get("grade_description")?,
    })
}

impl PgRecordSource {
    async fn query_records(
        &self,
        sql: &str,
        binds: Vec<String>,
        limit: Option<i64>,
    ) -> Result<Vec<RawRecord>, SourceError> {
        let mut query = sqlx::query(sql);
        for value in binds {
            query = query.bind(value);
        }
        if let Some(limit) = limit {
            query = query.bind(limit);
        }

        let rows = query.fetch_all(&self.pool).await?;
        let records = rows
            .iter()
            .map(to_record)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }
}

#[async_trait]
impl RecordSource for PgRecordSource {
    async fn fetch_all(&self, filter: &RecordFilter) -> Result<Vec<RawRecord>, SourceError> {
        let (clause, binds) = where_clause(filter);
        let sql = format!("{SELECT_RECORDS}{clause} ORDER BY seq");
        debug!(?filter, "fetching records");
        self.query_records(&sql, binds, None).await
    }

    async fn fetch_sample(
        &self,
        filter: &RecordFilter,
        size: usize,
    ) -> Result<Vec<RawRecord>, SourceError> {
        let (clause, binds) = where_clause(filter);
        let sql = format!(
            "{SELECT_RECORDS}{clause} ORDER BY random() LIMIT ${}",
            binds.len() + 1
        );
        debug!(?filter, size, "sampling records");
        let limit = i64::try_from(size).unwrap_or(i64::MAX);
        self.query_records(&sql, binds, Some(limit)).await
    }

    async fn count_distinct(
        &self,
        field: RecordField,
        filter: &RecordFilter,
    ) -> Result<usize, SourceError> {
        let (clause, binds) = where_clause(filter);
        let sql = format!(
            "SELECT COUNT(DISTINCT {}) AS total FROM academic_records.records{clause}",
            column(field)
        );

        let mut query = sqlx::query(&sql);
        for value in binds {
            query = query.bind(value);
        }
        let total: i64 = query.fetch_one(&self.pool).await?.try_get("total")?;
        Ok(usize::try_from(total).unwrap_or(0))
    }

    async fn fetch_recent(&self, limit: usize) -> Result<Vec<RawRecord>, SourceError> {
        let sql = format!("{SELECT_RECORDS} ORDER BY seq DESC LIMIT $1");
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        self.query_records(&sql, Vec::new(), Some(limit)).await
    }
}

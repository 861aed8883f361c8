use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgramInfo {
    pub code: String,
    pub name: String,
    pub department: String,
    pub level: String,
    pub duration_years: u32,
    pub total_credits: u32,
}

struct KnownProgram {
    code: &'static str,
    name: &'static str,
    department: &'static str,
    level: &'static str,
    duration_years: u32,
    total_credits: u32,
}

const KNOWN_PROGRAMS: &[KnownProgram] = &[
    KnownProgram {
        code: "BBA",
        name: "Bachelor of Business Administration",
        department: "Business",
        level: "Undergraduate",
        duration_years: 4,
        total_credits: 120,
    },
    KnownProgram {
        code: "DIP",
        name: "Diploma in Business Studies",
        department: "Business",
        level: "Diploma",
        duration_years: 2,
        total_credits: 60,
    },
    KnownProgram {
        code: "LSM",
        name: "Bachelor of Logistics and Supply Management",
        department: "Business",
        level: "Undergraduate",
        duration_years: 4,
        total_credits: 120,
    },
    KnownProgram {
        code: "BCD",
        name: "Bachelor of Community Development",
        department: "Development Studies",
        level: "Undergraduate",
        duration_years: 4,
        total_credits: 120,
    },
    KnownProgram {
        code: "HRM",
        name: "Bachelor of Human Resource Management",
        department: "Business",
        level: "Undergraduate",
        duration_years: 4,
        total_credits: 120,
    },
    KnownProgram {
        code: "BAC",
        name: "Bachelor of Accounting",
        department: "Accounting",
        level: "Undergraduate",
        duration_years: 4,
        total_credits: 120,
    },
];

const COURSE_DEPARTMENTS: &[(&str, &str)] = &[
    ("ACC", "Accounting"),
    ("BUS", "Business"),
    ("DP", "Development Studies"),
    ("ENG", "English"),
    ("MATH", "Mathematics"),
    ("CS", "Computer Science"),
];

/// The segment before the first `/`, or the whole identifier when there is none.
pub fn program_code(identifier: &str) -> &str {
    identifier
        .split_once('/')
        .map(|(code, _)| code)
        .unwrap_or(identifier)
}

/// Resolves an identifier such as `BBA/2021/0012` to its program.
///
/// Never fails: unknown or malformed codes get a generic four-year
/// undergraduate program named after the code.
pub fn resolve(identifier: &str) -> ProgramInfo {
    resolve_code(program_code(identifier))
}

pub fn resolve_code(code: &str) -> ProgramInfo {
    match KNOWN_PROGRAMS.iter().find(|program| program.code == code) {
        Some(program) => ProgramInfo {
            code: program.code.to_string(),
            name: program.name.to_string(),
            department: program.department.to_string(),
            level: program.level.to_string(),
            duration_years: program.duration_years,
            total_credits: program.total_credits,
        },
        None => ProgramInfo {
            code: code.to_string(),
            name: format!("{code} Program"),
            department: "General".to_string(),
            level: "Undergraduate".to_string(),
            duration_years: 4,
            total_credits: 120,
        },
    }
}

pub fn course_department(course_code: &str) -> &'static str {
    COURSE_DEPARTMENTS
        .iter()
        .find(|(prefix, _)| course_code.starts_with(prefix))
        .map(|(_, department)| *department)
        .unwrap_or("General")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_known_program() {
        let info = resolve("BBA/2021/0012");
        assert_eq!(info.code, "BBA");
        assert_eq!(info.name, "Bachelor of Business Administration");
        assert_eq!(info.department, "Business");
        assert_eq!(info.total_credits, 120);
    }

    #[test]
    fn diploma_has_shorter_duration() {
        let info = resolve("DIP/2023/0100");
        assert_eq!(info.level, "Diploma");
        assert_eq!(info.duration_years, 2);
        assert_eq!(info.total_credits, 60);
    }

    #[test]
    fn identifier_without_delimiter_falls_back() {
        let info = resolve("XYZ123");
        assert_eq!(info.code, "XYZ123");
        assert_eq!(info.name, "XYZ123 Program");
        assert_eq!(info.department, "General");
        assert_eq!(info.level, "Undergraduate");
        assert_eq!(info.duration_years, 4);
        assert_eq!(info.total_credits, 120);
    }

    #[test]
    fn splits_on_first_delimiter_only() {
        assert_eq!(program_code("BAC/2020/7/1"), "BAC");
        assert_eq!(program_code("/2020"), "");
        assert_eq!(resolve("/2020").name, " Program");
    }

    #[test]
    fn course_departments_follow_prefix() {
        assert_eq!(course_department("ACC 101"), "Accounting");
        assert_eq!(course_department("DP204"), "Development Studies");
        assert_eq!(course_department("MATH110"), "Mathematics");
        assert_eq!(course_department("HIS300"), "General");
    }
}

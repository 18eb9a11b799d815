use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use tracing::warn;

pub const SUBJECTS: [&str; 13] = [
    "Amharic",
    "English",
    "Mathematics",
    "Physics",
    "Chemistry",
    "Biology",
    "Geography",
    "History",
    "Civics",
    "Economics",
    "Agriculture",
    "HPE",
    "ICT",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GradeLevel {
    G9,
    G10,
    G11,
    G12,
}

impl GradeLevel {
    pub const ALL: [GradeLevel; 4] = [
        GradeLevel::G9,
        GradeLevel::G10,
        GradeLevel::G11,
        GradeLevel::G12,
    ];

    pub fn index(self) -> usize {
        match self {
            GradeLevel::G9 => 0,
            GradeLevel::G10 => 1,
            GradeLevel::G11 => 2,
            GradeLevel::G12 => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GradeLevel::G9 => "G9",
            GradeLevel::G10 => "G10",
            GradeLevel::G11 => "G11",
            GradeLevel::G12 => "G12",
        }
    }

    pub fn parse(s: &str) -> Option<GradeLevel> {
        match s.trim().to_ascii_uppercase().as_str() {
            "G9" => Some(GradeLevel::G9),
            "G10" => Some(GradeLevel::G10),
            "G11" => Some(GradeLevel::G11),
            "G12" => Some(GradeLevel::G12),
            _ => None,
        }
    }
}

impl fmt::Display for GradeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Program length selector. Decides which grade levels a transcript spans.
///
/// Decoding never fails on an unrecognized selector; it reads as
/// [`Template::G12Only`] so old or hand-edited records still load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Template {
    #[serde(rename = "G9-G12")]
    G9ToG12,
    #[serde(rename = "G10-G12")]
    G10ToG12,
    #[serde(rename = "G11-G12")]
    G11ToG12,
    #[serde(rename = "G12")]
    G12Only,
}

impl<'de> Deserialize<'de> for Template {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Template::parse(&raw).unwrap_or_else(|| {
            warn!(template = %raw, "unknown template; reading as G12");
            Template::G12Only
        }))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgeBounds {
    pub min: i64,
    pub max: i64,
    pub description: &'static str,
}

impl AgeBounds {
    pub fn contains(&self, age: i64) -> bool {
        age >= self.min && age <= self.max
    }
}

impl Template {
    pub const ALL: [Template; 4] = [
        Template::G9ToG12,
        Template::G10ToG12,
        Template::G11ToG12,
        Template::G12Only,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Template::G9ToG12 => "G9-G12",
            Template::G10ToG12 => "G10-G12",
            Template::G11ToG12 => "G11-G12",
            Template::G12Only => "G12",
        }
    }

    pub fn parse(s: &str) -> Option<Template> {
        Template::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
    }

    /// Unknown selectors collapse to the single-year program.
    pub fn parse_lenient(s: &str) -> Template {
        Template::parse(s).unwrap_or(Template::G12Only)
    }

    pub fn grade_levels(self) -> &'static [GradeLevel] {
        match self {
            Template::G9ToG12 => &GradeLevel::ALL,
            Template::G10ToG12 => &GradeLevel::ALL[1..],
            Template::G11ToG12 => &GradeLevel::ALL[2..],
            Template::G12Only => &GradeLevel::ALL[3..],
        }
    }

    pub fn includes(self, level: GradeLevel) -> bool {
        self.grade_levels().contains(&level)
    }

    pub fn year_count(self) -> i32 {
        self.grade_levels().len() as i32
    }

    pub fn age_bounds(self) -> AgeBounds {
        match self {
            Template::G9ToG12 => AgeBounds {
                min: 14,
                max: 19,
                description: "High School (4 years)",
            },
            Template::G10ToG12 => AgeBounds {
                min: 15,
                max: 18,
                description: "High School (3 years)",
            },
            Template::G11ToG12 => AgeBounds {
                min: 16,
                max: 18,
                description: "High School (2 years)",
            },
            Template::G12Only => AgeBounds {
                min: 17,
                max: 19,
                description: "Grade 12 Only",
            },
        }
    }

    pub fn program(self) -> &'static str {
        match self {
            Template::G9ToG12 => "Grades 9-12",
            Template::G10ToG12 => "Grades 10-12",
            Template::G11ToG12 => "Grades 11-12",
            Template::G12Only => "Grade 12",
        }
    }

    /// Label such as `2023-2026` for a program ending in `end_year`.
    pub fn academic_years(self, end_year: i32) -> String {
        let start = end_year - self.year_count() + 1;
        format!("{}-{}", start, end_year)
    }

    /// The level a G11 section reports promotion into, if any.
    pub fn promoted_to(self, level: GradeLevel) -> Option<GradeLevel> {
        if level == GradeLevel::G11 && self.includes(GradeLevel::G12) {
            Some(GradeLevel::G12)
        } else {
            None
        }
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn is_predefined_subject(name: &str) -> bool {
    SUBJECTS.contains(&name)
}

//! Transcript assembly: a pure projection from a [`Student`] to the
//! [`TranscriptView`] that the JSON preview, the HTML print layout and the
//! DOCX exporter all render. Renderers only place strings from the view;
//! they never recompute figures.

use crate::calc::{self, AcademicStatus};
use crate::catalog::{GradeLevel, Template};
use crate::model::{ConductRecord, Student};
use serde::Serialize;

pub const NO_SCORE: &str = "-";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptView {
    pub header: TranscriptHeader,
    pub sections: Vec<GradeSection>,
    pub summary: TranscriptSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptHeader {
    pub name: String,
    pub gender: String,
    pub age: i64,
    pub academic_years: String,
    pub template: Template,
    pub program: String,
    pub school_type: String,
    pub age_range: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeSection {
    pub grade_level: GradeLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promoted_to: Option<GradeLevel>,
    pub rows: Vec<SubjectRow>,
    pub totals: SummaryRow,
    pub averages: SummaryRow,
    pub conduct: ConductRow,
    pub subject_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectRow {
    pub subject: String,
    pub semester1: String,
    pub semester2: String,
    pub year_avg: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRow {
    pub semester1: String,
    pub semester2: String,
    pub year_avg: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConductRow {
    pub semester1: String,
    pub semester2: String,
    pub year_avg: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptSummary {
    pub total_subjects: usize,
    pub overall_average: i64,
    pub status: String,
}

/// One decimal place, or `-` for an unscored cell.
pub fn score_cell(v: f64) -> String {
    if v > 0.0 {
        fixed1(v)
    } else {
        NO_SCORE.to_string()
    }
}

fn fixed1(v: f64) -> String {
    format!("{:.1}", calc::round_off_1_decimal(v))
}

fn conduct_row(c: ConductRecord) -> ConductRow {
    ConductRow {
        semester1: c.semester1.as_str().to_string(),
        semester2: c.semester2.as_str().to_string(),
        year_avg: c.year_avg.as_str().to_string(),
    }
}

pub fn assemble(student: &Student, academic_year_end: i32) -> TranscriptView {
    let template = student.template;
    let bounds = template.age_bounds();
    let overrides = student.overrides();

    let header = TranscriptHeader {
        name: student.name.clone(),
        gender: student.gender.as_str().to_string(),
        age: student.age,
        academic_years: student
            .academic_years
            .clone()
            .unwrap_or_else(|| template.academic_years(academic_year_end)),
        template,
        program: template.program().to_string(),
        school_type: bounds.description.to_string(),
        age_range: format!("{}-{}", bounds.min, bounds.max),
    };

    let sections = template
        .grade_levels()
        .iter()
        .map(|&level| {
            let rows = student
                .grades
                .iter()
                .map(|s| {
                    let e = s.grades.value(level);
                    SubjectRow {
                        subject: s.subject.clone(),
                        semester1: score_cell(e.semester1),
                        semester2: score_cell(e.semester2),
                        year_avg: score_cell(e.year_avg),
                    }
                })
                .collect();

            let t = calc::column_totals(&student.grades, level, &overrides);
            GradeSection {
                grade_level: level,
                promoted_to: template.promoted_to(level),
                rows,
                totals: SummaryRow {
                    semester1: fixed1(t.semester1_total),
                    semester2: fixed1(t.semester2_total),
                    year_avg: fixed1(t.year_avg_total),
                },
                averages: SummaryRow {
                    semester1: fixed1(t.semester1_avg),
                    semester2: fixed1(t.semester2_avg),
                    year_avg: fixed1(t.year_avg_avg),
                },
                conduct: conduct_row(student.conduct_for(level)),
                subject_count: t.subject_count,
            }
        })
        .collect();

    let overall_average = calc::overall_average(student);
    TranscriptView {
        header,
        sections,
        summary: TranscriptSummary {
            total_subjects: student.grades.len(),
            overall_average,
            status: AcademicStatus::from_average(overall_average)
                .label()
                .to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calc::derive_entry;
    use crate::model::{
        ConductField, Gender, LetterGrade, LevelTable, ScoreEntry, SubjectRecord, TotalField,
        TotalOverride,
    };

    fn scored(s1: f64, s2: f64) -> ScoreEntry {
        let mut e = ScoreEntry {
            semester1: s1,
            semester2: s2,
            ..ScoreEntry::default()
        };
        derive_entry(&mut e);
        e
    }

    fn sample(template: Template) -> Student {
        let mut physics = SubjectRecord::empty("Physics");
        physics.grades.insert(GradeLevel::G11, scored(85.0, 0.0));
        physics.grades.insert(GradeLevel::G9, scored(40.0, 40.0));
        let mut english = SubjectRecord::empty("English");
        english.grades.insert(GradeLevel::G11, scored(70.25, 80.0));
        english.grades.insert(GradeLevel::G12, scored(90.0, 96.0));

        Student {
            id: "s1".to_string(),
            name: "Abebe Kebede Alemu".to_string(),
            gender: Gender::Male,
            age: 17,
            academic_years: Some("2025-2026".to_string()),
            template,
            grades: vec![physics, english],
            conduct: LevelTable::default(),
            totals_overrides: Vec::new(),
        }
    }

    #[test]
    fn sections_follow_template_levels_only() {
        let view = assemble(&sample(Template::G11ToG12), 2026);
        let levels: Vec<GradeLevel> = view.sections.iter().map(|s| s.grade_level).collect();
        assert_eq!(levels, vec![GradeLevel::G11, GradeLevel::G12]);
        assert_eq!(view.sections[0].promoted_to, Some(GradeLevel::G12));
        assert_eq!(view.sections[1].promoted_to, None);
    }

    #[test]
    fn single_semester_renders_dash_for_missing_half() {
        let view = assemble(&sample(Template::G11ToG12), 2026);
        let row = &view.sections[0].rows[0];
        assert_eq!(row.subject, "Physics");
        assert_eq!(
            (row.semester1.as_str(), row.semester2.as_str(), row.year_avg.as_str()),
            ("85.0", "-", "85.0")
        );
        let g12_physics = &view.sections[1].rows[0];
        assert_eq!(g12_physics.semester1, "-");
        assert_eq!(g12_physics.year_avg, "-");
    }

    #[test]
    fn totals_averages_and_conduct_rows() {
        let mut st = sample(Template::G11ToG12);
        st.conduct.entry(GradeLevel::G12).set(ConductField::Semester2, LetterGrade::C);
        let view = assemble(&st, 2026);

        let g11 = &view.sections[0];
        assert_eq!(g11.subject_count, 2);
        assert_eq!(g11.totals.semester1, "155.3");
        assert_eq!(g11.totals.semester2, "80.0");
        assert_eq!(g11.averages.semester2, "40.0");
        assert_eq!(g11.conduct.semester1, "A");

        let g12 = &view.sections[1];
        assert_eq!(g12.averages.year_avg, "93.0");
        assert_eq!(g12.conduct.semester2, "C");
        assert_eq!(g12.conduct.year_avg, "A");
    }

    #[test]
    fn saved_overrides_reach_the_totals_row() {
        let mut st = sample(Template::G12Only);
        st.totals_overrides = vec![TotalOverride {
            grade_level: GradeLevel::G12,
            field: TotalField::Semester1Total,
            value: 321.0,
        }];
        let view = assemble(&st, 2026);
        assert_eq!(view.sections[0].totals.semester1, "321.0");
        assert_eq!(view.sections[0].totals.semester2, "96.0");
    }

    #[test]
    fn empty_level_reads_zero_rows() {
        let view = assemble(&sample(Template::G10ToG12), 2026);
        let g10 = &view.sections[0];
        assert_eq!(g10.grade_level, GradeLevel::G10);
        assert_eq!(g10.subject_count, 0);
        assert_eq!(g10.totals.semester1, "0.0");
        assert_eq!(g10.averages.year_avg, "0.0");
    }

    #[test]
    fn header_and_summary() {
        let mut st = sample(Template::G11ToG12);
        st.academic_years = None;
        let view = assemble(&st, 2030);
        assert_eq!(view.header.academic_years, "2029-2030");
        assert_eq!(view.header.program, "Grades 11-12");
        assert_eq!(view.header.school_type, "High School (2 years)");
        assert_eq!(view.header.age_range, "16-18");
        assert_eq!(view.summary.total_subjects, 2);
        // 85, 75.13, 93 -> 84.38
        assert_eq!(view.summary.overall_average, 84);
        assert_eq!(view.summary.status, "Good");
    }

    #[test]
    fn assembling_twice_is_identical() {
        let st = sample(Template::G9ToG12);
        assert_eq!(assemble(&st, 2026), assemble(&st, 2026));
    }
}

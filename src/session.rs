//! The grade-editing session: one student's working copy held between
//! `grades.open` and `grades.close`.

use crate::calc::{self, ColumnTotals};
use crate::catalog::GradeLevel;
use crate::error::{Error, Result};
use crate::model::{
    ConductField, LetterGrade, ScoreEntry, ScoreField, Student, TotalField, TotalsOverrides,
};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct GradeSession {
    student: Student,
    overrides: TotalsOverrides,
    saving: bool,
}

impl GradeSession {
    /// Normalizes the grade sheet to the predefined subjects and defaults
    /// conduct to A for every template level without a record.
    pub fn open(student: Student) -> Self {
        let mut student = student;
        student.grades = calc::prepare_grade_sheet(&student);
        for &level in student.grade_levels() {
            student.conduct.entry(level);
        }
        let overrides = student.overrides();
        debug!(
            id = %student.id,
            subjects = student.grades.len(),
            overrides = overrides.len(),
            "grades session opened"
        );
        Self {
            student,
            overrides,
            saving: false,
        }
    }

    pub fn student(&self) -> &Student {
        &self.student
    }

    pub fn student_id(&self) -> &str {
        &self.student.id
    }

    pub fn overrides(&self) -> &TotalsOverrides {
        &self.overrides
    }

    fn check_level(&self, level: GradeLevel) -> Result<()> {
        if self.student.template.includes(level) {
            Ok(())
        } else {
            Err(Error::bad_params(format!(
                "grade level {} is not part of template {}",
                level, self.student.template
            )))
        }
    }

    pub fn update_score(
        &mut self,
        subject_index: i64,
        level: GradeLevel,
        field: ScoreField,
        raw: &str,
    ) -> Result<ScoreEntry> {
        self.check_level(level)?;
        calc::update_score(&mut self.student, subject_index, level, field, raw)
    }

    /// Stores a manual totals-row value. Parsed like a score cell but never
    /// clamped.
    pub fn set_total(&mut self, level: GradeLevel, field: TotalField, raw: &str) -> Result<f64> {
        self.check_level(level)?;
        let v = calc::parse_score(raw);
        self.overrides.set(level, field, v);
        Ok(v)
    }

    pub fn clear_total(&mut self, level: GradeLevel, field: TotalField) -> Result<bool> {
        self.check_level(level)?;
        Ok(self.overrides.clear(level, field))
    }

    pub fn totals(&self, level: GradeLevel) -> Result<ColumnTotals> {
        self.check_level(level)?;
        Ok(calc::column_totals(
            &self.student.grades,
            level,
            &self.overrides,
        ))
    }

    pub fn update_conduct(
        &mut self,
        level: GradeLevel,
        field: ConductField,
        grade: LetterGrade,
    ) -> Result<()> {
        self.check_level(level)?;
        self.student.conduct.entry(level).set(field, grade);
        Ok(())
    }

    /// Marks a save in progress. A second call before [`finish_save`]
    /// is refused.
    ///
    /// [`finish_save`]: GradeSession::finish_save
    pub fn begin_save(&mut self) -> Result<()> {
        if self.saving {
            return Err(Error::bad_params("a save is already in progress"));
        }
        self.saving = true;
        Ok(())
    }

    pub fn finish_save(&mut self) {
        self.saving = false;
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    /// The record to persist. Overrides travel with it only when asked to.
    pub fn to_saved(&self, keep_overrides: bool) -> Student {
        let mut out = self.student.clone();
        out.totals_overrides = if keep_overrides && !self.overrides.is_empty() {
            self.overrides.to_entries()
        } else {
            Vec::new()
        };
        out
    }

    /// Replaces the working profile after a `students.update` while the
    /// session is open, keeping the edited grades and conduct.
    pub fn refresh_profile(&mut self, profile: &Student) {
        let grades = std::mem::take(&mut self.student.grades);
        let conduct = std::mem::take(&mut self.student.conduct);
        self.student = profile.clone();
        self.student.grades = grades;
        self.student.conduct = conduct;
        self.student.grades = calc::prepare_grade_sheet(&self.student);
        for &level in self.student.grade_levels() {
            self.student.conduct.entry(level);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Template, SUBJECTS};
    use crate::model::{Gender, LevelTable, SubjectRecord, TotalOverride};

    fn student(template: Template) -> Student {
        let mut physics = SubjectRecord::empty("Physics");
        physics.grades.insert(
            GradeLevel::G9,
            ScoreEntry {
                semester1: 60.0,
                semester2: 70.0,
                year_avg: 65.0,
                total: 130.0,
            },
        );
        Student {
            id: "s1".to_string(),
            name: "Abebe Kebede Alemu".to_string(),
            gender: Gender::Male,
            age: 17,
            academic_years: Some("2025-2026".to_string()),
            template,
            grades: vec![physics],
            conduct: LevelTable::default(),
            totals_overrides: vec![TotalOverride {
                grade_level: GradeLevel::G11,
                field: TotalField::YearAvgAvg,
                value: 77.0,
            }],
        }
    }

    #[test]
    fn open_normalizes_sheet_and_conduct() {
        let s = GradeSession::open(student(Template::G11ToG12));
        let st = s.student();
        assert_eq!(st.grades.len(), SUBJECTS.len());
        assert_eq!(st.grades[0].subject, "Amharic");
        let physics = &st.grades[3];
        assert_eq!(physics.subject, "Physics");
        assert!(physics.grades.contains(GradeLevel::G11));
        assert!(physics.grades.contains(GradeLevel::G12));
        // stored G9 data outside the template is kept
        assert_eq!(physics.grades.value(GradeLevel::G9).total, 130.0);
        assert!(st.conduct.contains(GradeLevel::G11));
        assert!(!st.conduct.contains(GradeLevel::G9));
        assert_eq!(s.overrides().len(), 1);
    }

    #[test]
    fn levels_outside_template_are_bad_params() {
        let mut s = GradeSession::open(student(Template::G11ToG12));
        let e = s
            .update_score(0, GradeLevel::G9, ScoreField::Semester1, "50")
            .expect_err("G9 not visible");
        assert_eq!(e.code(), "bad_params");
        assert!(s.totals(GradeLevel::G10).is_err());
    }

    #[test]
    fn out_of_range_index_leaves_session_untouched() {
        let mut s = GradeSession::open(student(Template::G12Only));
        let before = s.student().clone();
        let e = s
            .update_score(13, GradeLevel::G12, ScoreField::Semester1, "50")
            .expect_err("out of range");
        assert_eq!(e.code(), "index_out_of_range");
        assert_eq!(s.student(), &before);
    }

    #[test]
    fn override_wins_until_cleared() {
        let mut s = GradeSession::open(student(Template::G12Only));
        s.update_score(1, GradeLevel::G12, ScoreField::Semester1, "80")
            .expect("score");
        assert_eq!(s.totals(GradeLevel::G12).expect("totals").semester1_total, 80.0);

        assert_eq!(
            s.set_total(GradeLevel::G12, TotalField::Semester1Total, "250")
                .expect("set"),
            250.0
        );
        assert_eq!(s.totals(GradeLevel::G12).expect("totals").semester1_total, 250.0);
        assert!(s
            .clear_total(GradeLevel::G12, TotalField::Semester1Total)
            .expect("clear"));
        assert_eq!(s.totals(GradeLevel::G12).expect("totals").semester1_total, 80.0);
    }

    #[test]
    fn save_keeps_or_drops_overrides() {
        let mut s = GradeSession::open(student(Template::G11ToG12));
        s.update_conduct(GradeLevel::G12, ConductField::YearAvg, LetterGrade::B)
            .expect("conduct");
        assert_eq!(s.to_saved(true).totals_overrides.len(), 1);
        let dropped = s.to_saved(false);
        assert!(dropped.totals_overrides.is_empty());
        assert_eq!(dropped.conduct_for(GradeLevel::G12).year_avg, LetterGrade::B);
    }

    #[test]
    fn save_flag_refuses_reentry() {
        let mut s = GradeSession::open(student(Template::G12Only));
        s.begin_save().expect("first");
        assert!(s.is_saving());
        assert!(s.begin_save().is_err());
        s.finish_save();
        assert!(s.begin_save().is_ok());
    }

    #[test]
    fn profile_refresh_keeps_edits() {
        let mut s = GradeSession::open(student(Template::G11ToG12));
        s.update_score(0, GradeLevel::G11, ScoreField::Semester1, "88")
            .expect("score");
        let mut profile = s.student().clone();
        profile.template = Template::G10ToG12;
        profile.grades.clear();
        s.refresh_profile(&profile);
        assert_eq!(s.student().template, Template::G10ToG12);
        assert_eq!(s.student().grades[0].grades.value(GradeLevel::G11).semester1, 88.0);
        assert!(s.student().grades[0].grades.contains(GradeLevel::G10));
    }
}

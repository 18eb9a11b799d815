use crate::catalog::{is_predefined_subject, GradeLevel, SUBJECTS};
use crate::error::{Error, Result};
use crate::model::{
    ScoreEntry, ScoreField, Student, SubjectRecord, TotalField, TotalsOverrides,
};
use serde::Serialize;

/// Half-up rounding to 2 decimals, matching how the grade sheet has always
/// stored derived values: `Int(100*x + 0.5) / 100`.
pub fn round2(x: f64) -> f64 {
    ((100.0 * x) + 0.5).floor() / 100.0
}

/// Half-up rounding to 1 decimal, used for every displayed score cell.
pub fn round_off_1_decimal(x: f64) -> f64 {
    ((10.0 * x) + 0.5).floor() / 10.0
}

/// Longest numeric prefix of a typed cell value (`"85.5abc"` -> 85.5).
///
/// Overflowing exponents and a leading `Infinity` come back infinite; no
/// number at all reads as 0. Never NaN.
fn parse_number(raw: &str) -> f64 {
    let s = raw.trim_start();
    let (sign, unsigned) = match s.as_bytes().first() {
        Some(b'-') => (-1.0, &s[1..]),
        Some(b'+') => (1.0, &s[1..]),
        _ => (1.0, s),
    };
    if unsigned.starts_with("Infinity") {
        return sign * f64::INFINITY;
    }
    let prefix_len = s
        .char_indices()
        .take_while(|(_, c)| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
        .map(|(i, c)| i + c.len_utf8())
        .last()
        .unwrap_or(0);
    let mut end = prefix_len;
    while end > 0 {
        if let Ok(v) = s[..end].parse::<f64>() {
            return v;
        }
        end -= 1;
    }
    0.0
}

/// Lenient parse for cells stored as typed. A non-finite number reads as 0
/// since it cannot be stored.
pub fn parse_score(raw: &str) -> f64 {
    let v = parse_number(raw);
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

/// Semester cells clamp before storing, so an infinite parse lands on a
/// bound.
pub fn parse_semester_score(raw: &str) -> f64 {
    clamp_score(parse_number(raw))
}

pub fn clamp_score(v: f64) -> f64 {
    v.clamp(0.0, 100.0)
}

/// Year average with single-semester fallback.
pub fn year_average(semester1: f64, semester2: f64) -> f64 {
    if semester1 == 0.0 && semester2 == 0.0 {
        return 0.0;
    }
    if semester1 == 0.0 {
        return round2(semester2);
    }
    if semester2 == 0.0 {
        return round2(semester1);
    }
    round2((semester1 + semester2) / 2.0)
}

pub fn derive_entry(entry: &mut ScoreEntry) {
    entry.year_avg = year_average(entry.semester1, entry.semester2);
    entry.total = round2(entry.semester1 + entry.semester2);
}

/// Applies one cell edit to a student's grade sheet.
///
/// Semester edits are clamped to [0,100] and re-derive `yearAvg`/`total`.
/// Direct `yearAvg`/`total` edits are stored as parsed, with no clamp and
/// no re-derivation, so a manual year average survives until the next
/// semester edit for that cell.
pub fn update_score(
    student: &mut Student,
    subject_index: i64,
    level: GradeLevel,
    field: ScoreField,
    raw: &str,
) -> Result<ScoreEntry> {
    let len = student.grades.len();
    if subject_index < 0 || subject_index as usize >= len {
        return Err(Error::IndexOutOfRange {
            index: subject_index,
            len,
        });
    }

    let value = if field.is_semester() {
        parse_semester_score(raw)
    } else {
        parse_score(raw)
    };

    let entry = student.grades[subject_index as usize].grades.entry(level);
    entry.set(field, value);
    if field.is_semester() {
        derive_entry(entry);
    }
    Ok(*entry)
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnTotals {
    pub semester1_total: f64,
    pub semester2_total: f64,
    pub year_avg_total: f64,
    pub total_total: f64,
    pub semester1_avg: f64,
    pub semester2_avg: f64,
    pub year_avg_avg: f64,
    pub subject_count: usize,
}

impl ColumnTotals {
    pub fn get(&self, field: TotalField) -> f64 {
        match field {
            TotalField::Semester1Total => self.semester1_total,
            TotalField::Semester2Total => self.semester2_total,
            TotalField::YearAvgTotal => self.year_avg_total,
            TotalField::TotalTotal => self.total_total,
            TotalField::Semester1Avg => self.semester1_avg,
            TotalField::Semester2Avg => self.semester2_avg,
            TotalField::YearAvgAvg => self.year_avg_avg,
        }
    }

    fn set(&mut self, field: TotalField, v: f64) {
        match field {
            TotalField::Semester1Total => self.semester1_total = v,
            TotalField::Semester2Total => self.semester2_total = v,
            TotalField::YearAvgTotal => self.year_avg_total = v,
            TotalField::TotalTotal => self.total_total = v,
            TotalField::Semester1Avg => self.semester1_avg = v,
            TotalField::Semester2Avg => self.semester2_avg = v,
            TotalField::YearAvgAvg => self.year_avg_avg = v,
        }
    }
}

/// Column sums and means for one grade level.
///
/// Subjects with neither semester scored are left out of both the sums and
/// the mean denominator. Each cell is then replaced by its override, if the
/// side-table holds one for `(level, field)`.
pub fn column_totals(
    subjects: &[SubjectRecord],
    level: GradeLevel,
    overrides: &TotalsOverrides,
) -> ColumnTotals {
    let mut sem1 = 0.0;
    let mut sem2 = 0.0;
    let mut year_avg = 0.0;
    let mut total = 0.0;
    let mut count: usize = 0;

    for s in subjects {
        let Some(e) = s.grades.get(level) else {
            continue;
        };
        if !e.has_data() {
            continue;
        }
        sem1 += e.semester1;
        sem2 += e.semester2;
        year_avg += e.year_avg;
        total += e.total;
        count += 1;
    }

    let mean = |sum: f64| {
        if count > 0 {
            round2(sum / count as f64)
        } else {
            0.0
        }
    };

    let mut out = ColumnTotals {
        semester1_total: round2(sem1),
        semester2_total: round2(sem2),
        year_avg_total: round2(year_avg),
        total_total: round2(total),
        semester1_avg: mean(sem1),
        semester2_avg: mean(sem2),
        year_avg_avg: mean(year_avg),
        subject_count: count,
    };
    for field in TotalField::ALL {
        if let Some(v) = overrides.get(level, field) {
            out.set(field, v);
        }
    }
    out
}

/// Mean of every scored year average across the student's visible levels,
/// rounded half-up to a whole number.
pub fn overall_average(student: &Student) -> i64 {
    let mut sum = 0.0;
    let mut n: usize = 0;
    for s in &student.grades {
        for &level in student.grade_levels() {
            if let Some(e) = s.grades.get(level) {
                if e.year_avg > 0.0 {
                    sum += e.year_avg;
                    n += 1;
                }
            }
        }
    }
    if n == 0 {
        return 0;
    }
    ((sum / n as f64) + 0.5).floor() as i64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AcademicStatus {
    Excellent,
    Good,
    Satisfactory,
    Pass,
    NeedsImprovement,
}

impl AcademicStatus {
    pub fn from_average(avg: i64) -> Self {
        match avg {
            a if a >= 90 => AcademicStatus::Excellent,
            a if a >= 80 => AcademicStatus::Good,
            a if a >= 70 => AcademicStatus::Satisfactory,
            a if a >= 60 => AcademicStatus::Pass,
            _ => AcademicStatus::NeedsImprovement,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AcademicStatus::Excellent => "Excellent",
            AcademicStatus::Good => "Good",
            AcademicStatus::Satisfactory => "Satisfactory",
            AcademicStatus::Pass => "Pass",
            AcademicStatus::NeedsImprovement => "Needs Improvement",
        }
    }
}

/// Builds the editable grade sheet for a student: one record per predefined
/// subject in catalog order, each holding an entry for every level of the
/// student's template. Stored entries (including ones for levels outside the
/// template) are carried over; subjects outside the predefined list are
/// appended after it so nothing stored is dropped.
pub fn prepare_grade_sheet(student: &Student) -> Vec<SubjectRecord> {
    let levels = student.grade_levels();
    let mut out: Vec<SubjectRecord> = SUBJECTS
        .iter()
        .map(|name| {
            let mut rec = student
                .grades
                .iter()
                .find(|g| g.subject == *name)
                .cloned()
                .unwrap_or_else(|| SubjectRecord::empty(name));
            for &level in levels {
                rec.grades.entry(level);
            }
            rec
        })
        .collect();

    for extra in student
        .grades
        .iter()
        .filter(|g| !is_predefined_subject(&g.subject))
    {
        out.push(extra.clone());
    }
    out
}

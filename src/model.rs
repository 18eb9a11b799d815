use crate::catalog::{GradeLevel, Template};
use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }

    pub fn parse(s: &str) -> Option<Gender> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" => Some(Gender::Male),
            "female" => Some(Gender::Female),
            _ => None,
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Conduct letter grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LetterGrade {
    #[default]
    A,
    B,
    C,
    D,
    E,
    F,
}

impl LetterGrade {
    pub fn as_str(self) -> &'static str {
        match self {
            LetterGrade::A => "A",
            LetterGrade::B => "B",
            LetterGrade::C => "C",
            LetterGrade::D => "D",
            LetterGrade::E => "E",
            LetterGrade::F => "F",
        }
    }

    pub fn parse(s: &str) -> Option<LetterGrade> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" => Some(LetterGrade::A),
            "B" => Some(LetterGrade::B),
            "C" => Some(LetterGrade::C),
            "D" => Some(LetterGrade::D),
            "E" => Some(LetterGrade::E),
            "F" => Some(LetterGrade::F),
            _ => None,
        }
    }
}

/// Per-level storage indexed by [`GradeLevel`].
///
/// Serializes as a JSON object keyed by level label (`{"G11": ..}`) so the
/// persisted collection and exchange files keep their existing shape.
/// Lookups never fail: an absent level reads as `T::default()`.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelTable<T> {
    slots: [Option<T>; 4],
}

impl<T> Default for LevelTable<T> {
    fn default() -> Self {
        Self {
            slots: [None, None, None, None],
        }
    }
}

impl<T> LevelTable<T> {
    pub fn get(&self, level: GradeLevel) -> Option<&T> {
        self.slots[level.index()].as_ref()
    }

    pub fn insert(&mut self, level: GradeLevel, value: T) {
        self.slots[level.index()] = Some(value);
    }

    pub fn contains(&self, level: GradeLevel) -> bool {
        self.slots[level.index()].is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    pub fn iter(&self) -> impl Iterator<Item = (GradeLevel, &T)> + '_ {
        GradeLevel::ALL
            .into_iter()
            .filter_map(move |l| self.get(l).map(|v| (l, v)))
    }
}

impl<T: Default + Clone> LevelTable<T> {
    pub fn value(&self, level: GradeLevel) -> T {
        self.get(level).cloned().unwrap_or_default()
    }

    pub fn entry(&mut self, level: GradeLevel) -> &mut T {
        self.slots[level.index()].get_or_insert_with(T::default)
    }
}

impl<T> FromIterator<(GradeLevel, T)> for LevelTable<T> {
    fn from_iter<I: IntoIterator<Item = (GradeLevel, T)>>(iter: I) -> Self {
        let mut table = LevelTable::default();
        for (level, value) in iter {
            table.insert(level, value);
        }
        table
    }
}

impl<T: Serialize> Serialize for LevelTable<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for LevelTable<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = BTreeMap::<GradeLevel, T>::deserialize(deserializer)?;
        Ok(map.into_iter().collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScoreEntry {
    pub semester1: f64,
    pub semester2: f64,
    pub year_avg: f64,
    pub total: f64,
}

impl ScoreEntry {
    pub fn has_data(&self) -> bool {
        self.semester1 > 0.0 || self.semester2 > 0.0
    }

    pub fn get(&self, field: ScoreField) -> f64 {
        match field {
            ScoreField::Semester1 => self.semester1,
            ScoreField::Semester2 => self.semester2,
            ScoreField::YearAvg => self.year_avg,
            ScoreField::Total => self.total,
        }
    }

    pub fn set(&mut self, field: ScoreField, value: f64) {
        match field {
            ScoreField::Semester1 => self.semester1 = value,
            ScoreField::Semester2 => self.semester2 = value,
            ScoreField::YearAvg => self.year_avg = value,
            ScoreField::Total => self.total = value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectRecord {
    pub subject: String,
    pub grades: LevelTable<ScoreEntry>,
}

impl SubjectRecord {
    pub fn empty(subject: &str) -> Self {
        Self {
            subject: subject.to_string(),
            grades: LevelTable::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConductRecord {
    pub semester1: LetterGrade,
    pub semester2: LetterGrade,
    pub year_avg: LetterGrade,
}

impl ConductRecord {
    pub fn set(&mut self, field: ConductField, grade: LetterGrade) {
        match field {
            ConductField::Semester1 => self.semester1 = grade,
            ConductField::Semester2 => self.semester2 = grade,
            ConductField::YearAvg => self.year_avg = grade,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreField {
    Semester1,
    Semester2,
    YearAvg,
    Total,
}

impl ScoreField {
    pub fn parse(s: &str) -> Option<ScoreField> {
        match s {
            "semester1" => Some(ScoreField::Semester1),
            "semester2" => Some(ScoreField::Semester2),
            "yearAvg" => Some(ScoreField::YearAvg),
            "total" => Some(ScoreField::Total),
            _ => None,
        }
    }

    pub fn is_semester(self) -> bool {
        matches!(self, ScoreField::Semester1 | ScoreField::Semester2)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConductField {
    Semester1,
    Semester2,
    YearAvg,
}

impl ConductField {
    pub fn parse(s: &str) -> Option<ConductField> {
        match s {
            "semester1" => Some(ConductField::Semester1),
            "semester2" => Some(ConductField::Semester2),
            "yearAvg" => Some(ConductField::YearAvg),
            _ => None,
        }
    }
}

/// An overridable cell in a level's totals/averages rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TotalField {
    #[serde(rename = "semester1-total")]
    Semester1Total,
    #[serde(rename = "semester2-total")]
    Semester2Total,
    #[serde(rename = "yearAvg-total")]
    YearAvgTotal,
    #[serde(rename = "total-total")]
    TotalTotal,
    #[serde(rename = "semester1-avg")]
    Semester1Avg,
    #[serde(rename = "semester2-avg")]
    Semester2Avg,
    #[serde(rename = "yearAvg-avg")]
    YearAvgAvg,
}

impl TotalField {
    pub const ALL: [TotalField; 7] = [
        TotalField::Semester1Total,
        TotalField::Semester2Total,
        TotalField::YearAvgTotal,
        TotalField::TotalTotal,
        TotalField::Semester1Avg,
        TotalField::Semester2Avg,
        TotalField::YearAvgAvg,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TotalField::Semester1Total => "semester1-total",
            TotalField::Semester2Total => "semester2-total",
            TotalField::YearAvgTotal => "yearAvg-total",
            TotalField::TotalTotal => "total-total",
            TotalField::Semester1Avg => "semester1-avg",
            TotalField::Semester2Avg => "semester2-avg",
            TotalField::YearAvgAvg => "yearAvg-avg",
        }
    }

    pub fn parse(s: &str) -> Option<TotalField> {
        TotalField::ALL.into_iter().find(|f| f.as_str() == s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalOverride {
    pub grade_level: GradeLevel,
    pub field: TotalField,
    pub value: f64,
}

/// Side-table of manually edited totals cells keyed by (level, field).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TotalsOverrides {
    cells: BTreeMap<(GradeLevel, TotalField), f64>,
}

impl TotalsOverrides {
    pub fn get(&self, level: GradeLevel, field: TotalField) -> Option<f64> {
        self.cells.get(&(level, field)).copied()
    }

    pub fn set(&mut self, level: GradeLevel, field: TotalField, value: f64) {
        self.cells.insert((level, field), value);
    }

    pub fn clear(&mut self, level: GradeLevel, field: TotalField) -> bool {
        self.cells.remove(&(level, field)).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn to_entries(&self) -> Vec<TotalOverride> {
        self.cells
            .iter()
            .map(|(&(grade_level, field), &value)| TotalOverride {
                grade_level,
                field,
                value,
            })
            .collect()
    }

    pub fn from_entries(entries: &[TotalOverride]) -> Self {
        let mut out = TotalsOverrides::default();
        for e in entries {
            out.set(e.grade_level, e.field, e.value);
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub name: String,
    pub gender: Gender,
    pub age: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub academic_years: Option<String>,
    pub template: Template,
    #[serde(default)]
    pub grades: Vec<SubjectRecord>,
    #[serde(default, skip_serializing_if = "LevelTable::is_empty")]
    pub conduct: LevelTable<ConductRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub totals_overrides: Vec<TotalOverride>,
}

impl Student {
    pub fn grade_levels(&self) -> &'static [GradeLevel] {
        self.template.grade_levels()
    }

    pub fn overrides(&self) -> TotalsOverrides {
        TotalsOverrides::from_entries(&self.totals_overrides)
    }

    pub fn conduct_for(&self, level: GradeLevel) -> ConductRecord {
        self.conduct.value(level)
    }
}

use crate::catalog::Template;
use crate::error::{Error, Result};
use crate::model::{Gender, LevelTable, Student};
use serde::Serialize;
use uuid::Uuid;

/// Checks a full name and returns it with every part capitalized.
///
/// At least three whitespace-separated parts (first, middle, last), each made
/// of ASCII letters only.
pub fn normalize_name(raw: &str) -> Result<String> {
    let parts: Vec<&str> = raw.split_whitespace().collect();
    if parts.len() < 3 {
        return Err(Error::validation(
            "name",
            "Please enter full name (First Middle Last)",
        ));
    }
    if parts
        .iter()
        .any(|p| !p.chars().all(|c| c.is_ascii_alphabetic()))
    {
        return Err(Error::validation("name", "Name should contain only letters"));
    }

    Ok(parts
        .iter()
        .map(|p| {
            let lower = p.to_ascii_lowercase();
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" "))
}

pub fn check_age(age: i64, template: Template) -> Result<()> {
    let b = template.age_bounds();
    if !b.contains(age) {
        return Err(Error::validation(
            "age",
            format!(
                "Age must be between {} and {} for {}",
                b.min, b.max, b.description
            ),
        ));
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct NewStudent {
    pub name: String,
    pub gender: Gender,
    pub age: i64,
    pub template: Template,
}

pub fn create(input: NewStudent, academic_year_end: i32) -> Result<Student> {
    let name = normalize_name(&input.name)?;
    check_age(input.age, input.template)?;
    Ok(Student {
        id: Uuid::new_v4().to_string(),
        name,
        gender: input.gender,
        age: input.age,
        academic_years: Some(input.template.academic_years(academic_year_end)),
        template: input.template,
        grades: Vec::new(),
        conduct: LevelTable::default(),
        totals_overrides: Vec::new(),
    })
}

#[derive(Debug, Clone, Default)]
pub struct StudentPatch {
    pub name: Option<String>,
    pub gender: Option<Gender>,
    pub age: Option<i64>,
    pub template: Option<Template>,
}

/// Applies profile edits. Grades and conduct are kept; the academic years
/// label is re-derived when the template changes or was never set.
pub fn apply_patch(
    existing: &Student,
    patch: StudentPatch,
    academic_year_end: i32,
) -> Result<Student> {
    let mut out = existing.clone();
    let template = patch.template.unwrap_or(existing.template);
    out.name = normalize_name(patch.name.as_deref().unwrap_or(&existing.name))?;
    let age = patch.age.unwrap_or(existing.age);
    check_age(age, template)?;
    out.age = age;
    if let Some(g) = patch.gender {
        out.gender = g;
    }
    if template != existing.template || out.academic_years.is_none() {
        out.academic_years = Some(template.academic_years(academic_year_end));
    }
    out.template = template;
    Ok(out)
}

#[derive(Debug, Clone, Default)]
pub struct StudentFilter {
    pub search: Option<String>,
    pub age: Option<i64>,
    pub gender: Option<Gender>,
    pub template: Option<Template>,
}

impl StudentFilter {
    pub fn matches(&self, s: &Student) -> bool {
        if let Some(q) = self.search.as_deref() {
            if !s.name.to_lowercase().contains(&q.to_lowercase()) {
                return false;
            }
        }
        self.age.map_or(true, |a| s.age == a)
            && self.gender.map_or(true, |g| s.gender == g)
            && self.template.map_or(true, |t| s.template == t)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentSummary {
    pub id: String,
    pub name: String,
    pub gender: Gender,
    pub age: i64,
    pub template: Template,
    pub academic_years: Option<String>,
    pub subject_count: usize,
}

impl From<&Student> for StudentSummary {
    fn from(s: &Student) -> Self {
        Self {
            id: s.id.clone(),
            name: s.name.clone(),
            gender: s.gender,
            age: s.age,
            template: s.template,
            academic_years: s.academic_years.clone(),
            subject_count: s.grades.len(),
        }
    }
}

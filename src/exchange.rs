//! JSON exchange files: the bulk student list and the single-student
//! `{student, grades, conduct}` document.

use crate::error::{Error, Result};
use crate::model::Student;
use anyhow::Context;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
pub enum ImportDocument {
    /// Replaces the whole collection.
    Bulk(Vec<Student>),
    /// Upserts one student with its grade sheet folded in.
    Single(Student),
}

impl ImportDocument {
    pub fn kind(&self) -> &'static str {
        match self {
            ImportDocument::Bulk(_) => "bulk",
            ImportDocument::Single(_) => "single",
        }
    }

    pub fn count(&self) -> usize {
        match self {
            ImportDocument::Bulk(v) => v.len(),
            ImportDocument::Single(_) => 1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub count: usize,
    pub bytes: usize,
    pub sha256: String,
}

pub fn default_export_name(date: chrono::NaiveDate) -> String {
    format!("transcript-data-{}.json", date.format("%Y-%m-%d"))
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

pub fn export_students(students: &[Student], out_path: &Path) -> Result<ExportSummary> {
    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.to_string_lossy()))?;
    }
    let text = serde_json::to_string_pretty(students)?;
    std::fs::write(out_path, text.as_bytes())
        .with_context(|| format!("failed to write {}", out_path.to_string_lossy()))?;
    Ok(ExportSummary {
        count: students.len(),
        bytes: text.len(),
        sha256: sha256_hex(text.as_bytes()),
    })
}

pub fn read_import_file(path: &Path) -> Result<String> {
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if !is_json {
        return Err(Error::import_rejected("Please upload a valid JSON file."));
    }
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.to_string_lossy()))?;
    Ok(text)
}

fn non_empty_str(v: &Value, key: &str) -> bool {
    v.get(key)
        .and_then(|x| x.as_str())
        .map(|s| !s.is_empty())
        .unwrap_or(false)
}

fn check_student_fields(v: &Value, at: &str) -> Result<()> {
    if !v.is_object() {
        return Err(Error::import_rejected(format!(
            "Invalid student data structure: {} is not an object",
            at
        )));
    }
    for key in ["id", "name", "gender", "academicYears", "template"] {
        if !non_empty_str(v, key) {
            return Err(Error::import_rejected(format!(
                "Invalid student data structure: {} is missing {}",
                at, key
            )));
        }
    }
    if !v.get("age").map(Value::is_number).unwrap_or(false) {
        return Err(Error::import_rejected(format!(
            "Invalid student data structure: {} has no numeric age",
            at
        )));
    }
    Ok(())
}

fn check_grades(grades: Option<&Value>, at: &str) -> Result<()> {
    let Some(list) = grades.and_then(Value::as_array) else {
        return Err(Error::import_rejected(format!(
            "Invalid student data structure: {} is missing grades",
            at
        )));
    };
    for (i, g) in list.iter().enumerate() {
        if !non_empty_str(g, "subject") || !g.get("grades").map(Value::is_object).unwrap_or(false)
        {
            return Err(Error::import_rejected(format!(
                "Invalid grades data structure: {} subject record {}",
                at, i
            )));
        }
    }
    Ok(())
}

fn decode_student(v: Value, at: &str) -> Result<Student> {
    serde_json::from_value(v)
        .map_err(|e| Error::import_rejected(format!("Invalid student data in {}: {}", at, e)))
}

/// Parses and validates an exchange document. Nothing is written here; a
/// returned document is complete and safe to store as a whole.
pub fn parse_import(text: &str) -> Result<ImportDocument> {
    let parsed: Value = serde_json::from_str(text)
        .map_err(|e| Error::import_rejected(format!("Import failed: {}", e)))?;

    match parsed {
        Value::Array(items) => {
            for (i, s) in items.iter().enumerate() {
                let at = format!("student {}", i);
                check_student_fields(s, &at)?;
                check_grades(s.get("grades"), &at)?;
            }
            let mut out = Vec::with_capacity(items.len());
            for (i, s) in items.into_iter().enumerate() {
                out.push(decode_student(s, &format!("student {}", i))?);
            }
            Ok(ImportDocument::Bulk(out))
        }
        Value::Object(mut obj) if obj.contains_key("student") => {
            let Some(mut student) = obj.remove("student") else {
                return Err(Error::import_rejected("missing student"));
            };
            check_student_fields(&student, "student")?;
            let grades = obj.remove("grades");
            check_grades(grades.as_ref(), "document")?;
            if let (Some(fields), Some(grades)) = (student.as_object_mut(), grades) {
                fields.insert("grades".to_string(), grades);
                match obj.remove("conduct") {
                    Some(Value::Null) | None => {
                        fields.remove("conduct");
                    }
                    Some(conduct) => {
                        fields.insert("conduct".to_string(), conduct);
                    }
                }
            }
            Ok(ImportDocument::Single(decode_student(student, "student")?))
        }
        _ => Err(Error::import_rejected(
            "Invalid file format: Expected an array of students",
        )),
    }
}

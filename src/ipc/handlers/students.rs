use crate::error::{Error, Result};
use crate::ipc::error::respond;
use crate::ipc::params::{i64_param, opt_gender, opt_i64, opt_str, opt_template, str_param};
use crate::ipc::types::{AppState, Request};
use crate::students::{self, NewStudent, StudentFilter, StudentPatch, StudentSummary};
use serde_json::json;
use tracing::info;

fn handle_list(state: &mut AppState, req: &Request) -> Result<serde_json::Value> {
    let store = state.store()?;
    let filter = StudentFilter {
        search: opt_str(req, "search")
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
        age: opt_i64(req, "age")?,
        gender: opt_gender(req, "gender")?,
        template: opt_template(req, "template")?,
    };
    let all = store.read_all()?;
    let rows: Vec<StudentSummary> = all
        .iter()
        .filter(|s| filter.matches(s))
        .map(StudentSummary::from)
        .collect();
    Ok(json!({ "students": rows, "total": all.len() }))
}

fn handle_get(state: &mut AppState, req: &Request) -> Result<serde_json::Value> {
    let id = str_param(req, "studentId")?;
    let student = state
        .store()?
        .get(id)?
        .ok_or_else(|| Error::not_found("student", id))?;
    Ok(json!({ "student": student }))
}

fn handle_create(state: &mut AppState, req: &Request) -> Result<serde_json::Value> {
    let store = state.store()?;
    let input = NewStudent {
        name: str_param(req, "name")?.to_string(),
        gender: opt_gender(req, "gender")?
            .ok_or_else(|| Error::bad_params("missing gender"))?,
        age: i64_param(req, "age")?,
        template: opt_template(req, "template")?
            .ok_or_else(|| Error::bad_params("missing template"))?,
    };
    let student = students::create(input, state.academic_year_end())?;
    store.save(&student)?;
    Ok(json!({ "studentId": student.id, "student": student }))
}

fn handle_update(state: &mut AppState, req: &Request) -> Result<serde_json::Value> {
    let id = str_param(req, "studentId")?;
    let store = state.store()?;
    let existing = store
        .get(id)?
        .ok_or_else(|| Error::not_found("student", id))?;
    let patch = StudentPatch {
        name: opt_str(req, "name").map(str::to_string),
        gender: opt_gender(req, "gender")?,
        age: opt_i64(req, "age")?,
        template: opt_template(req, "template")?,
    };
    let updated = students::apply_patch(&existing, patch, state.academic_year_end())?;
    store.save(&updated)?;

    if let Some(session) = state.session.as_mut().filter(|s| s.student_id() == id) {
        session.refresh_profile(&updated);
    }
    Ok(json!({ "student": updated }))
}

fn handle_delete(state: &mut AppState, req: &Request) -> Result<serde_json::Value> {
    let id = str_param(req, "studentId")?;
    if !state.store()?.delete(id)? {
        return Err(Error::not_found("student", id));
    }
    if state.session.as_ref().map(|s| s.student_id() == id) == Some(true) {
        info!(id, "closing grades session for deleted student");
        state.session = None;
    }
    Ok(json!({ "deleted": true }))
}

fn handle_clear(state: &mut AppState, _req: &Request) -> Result<serde_json::Value> {
    state.store()?.clear()?;
    state.session = None;
    Ok(json!({ "cleared": true }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "students.list" => handle_list(state, req),
        "students.get" => handle_get(state, req),
        "students.create" => handle_create(state, req),
        "students.update" => handle_update(state, req),
        "students.delete" => handle_delete(state, req),
        "students.clear" => handle_clear(state, req),
        _ => return None,
    };
    Some(respond(&req.id, result))
}

use crate::error::{Error, Result};
use crate::ipc::error::respond;
use crate::ipc::params::{i64_param, level_param, opt_bool, raw_value, str_param};
use crate::ipc::types::{AppState, Request};
use crate::model::{ConductField, LetterGrade, ScoreField, TotalField};
use crate::session::GradeSession;
use serde_json::json;
use tracing::info;

fn session_json(session: &GradeSession) -> serde_json::Value {
    let st = session.student();
    json!({
        "student": st,
        "gradeLevels": st.grade_levels(),
        "overrides": session.overrides().to_entries(),
        "saving": session.is_saving(),
    })
}

fn handle_open(state: &mut AppState, req: &Request) -> Result<serde_json::Value> {
    let id = str_param(req, "studentId")?;
    let student = state
        .store()?
        .get(id)?
        .ok_or_else(|| Error::not_found("student", id))?;
    let session = GradeSession::open(student);
    let out = session_json(&session);
    state.session = Some(session);
    Ok(out)
}

fn handle_update_score(state: &mut AppState, req: &Request) -> Result<serde_json::Value> {
    let session = state.session_mut()?;
    let index = i64_param(req, "subjectIndex")?;
    let level = level_param(req, "gradeLevel")?;
    let field_raw = str_param(req, "field")?;
    let field = ScoreField::parse(field_raw)
        .ok_or_else(|| Error::bad_params(format!("unknown field: {}", field_raw)))?;
    let value = raw_value(req, "value")?;

    let entry = session.update_score(index, level, field, &value)?;
    let totals = session.totals(level)?;
    Ok(json!({ "value": entry.get(field), "entry": entry, "totals": totals }))
}

fn total_field(req: &Request) -> Result<TotalField> {
    let raw = str_param(req, "field")?;
    TotalField::parse(raw).ok_or_else(|| Error::bad_params(format!("unknown field: {}", raw)))
}

fn handle_set_total(state: &mut AppState, req: &Request) -> Result<serde_json::Value> {
    let session = state.session_mut()?;
    let level = level_param(req, "gradeLevel")?;
    let field = total_field(req)?;
    let value = session.set_total(level, field, &raw_value(req, "value")?)?;
    Ok(json!({ "value": value, "totals": session.totals(level)? }))
}

fn handle_clear_total(state: &mut AppState, req: &Request) -> Result<serde_json::Value> {
    let session = state.session_mut()?;
    let level = level_param(req, "gradeLevel")?;
    let field = total_field(req)?;
    let cleared = session.clear_total(level, field)?;
    let totals = session.totals(level)?;
    Ok(json!({ "cleared": cleared, "value": totals.get(field), "totals": totals }))
}

fn handle_totals(state: &mut AppState, req: &Request) -> Result<serde_json::Value> {
    let session = state.session_mut()?;
    let level = level_param(req, "gradeLevel")?;
    Ok(json!({ "gradeLevel": level, "totals": session.totals(level)? }))
}

fn handle_conduct_update(state: &mut AppState, req: &Request) -> Result<serde_json::Value> {
    let session = state.session_mut()?;
    let level = level_param(req, "gradeLevel")?;
    let field_raw = str_param(req, "field")?;
    let field = ConductField::parse(field_raw)
        .ok_or_else(|| Error::bad_params(format!("unknown field: {}", field_raw)))?;
    let value_raw = str_param(req, "value")?;
    let grade = LetterGrade::parse(value_raw)
        .ok_or_else(|| Error::bad_params(format!("conduct must be A-F, got {}", value_raw)))?;
    session.update_conduct(level, field, grade)?;
    Ok(json!({ "conduct": session.student().conduct_for(level) }))
}

fn handle_save(state: &mut AppState, req: &Request) -> Result<serde_json::Value> {
    let keep_overrides = opt_bool(req, "keepOverrides");
    let AppState { store, session, .. } = state;
    let store = store.as_ref().ok_or(Error::NoWorkspace)?;
    let session = session.as_mut().ok_or(Error::NoSession)?;

    session.begin_save()?;
    let record = session.to_saved(keep_overrides);
    let saved = store.save(&record);
    session.finish_save();
    let created = saved?;

    info!(id = %record.id, keep_overrides, "saved grades");
    Ok(json!({
        "studentId": record.id,
        "created": created,
        "overridesSaved": record.totals_overrides.len(),
    }))
}

fn handle_close(state: &mut AppState, _req: &Request) -> Result<serde_json::Value> {
    Ok(json!({ "closed": state.session.take().is_some() }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "grades.open" => handle_open(state, req),
        "grades.updateScore" => handle_update_score(state, req),
        "grades.setTotal" => handle_set_total(state, req),
        "grades.clearTotal" => handle_clear_total(state, req),
        "grades.totals" => handle_totals(state, req),
        "conduct.update" => handle_conduct_update(state, req),
        "grades.save" => handle_save(state, req),
        "grades.close" => handle_close(state, req),
        _ => return None,
    };
    Some(respond(&req.id, result))
}

use crate::docx;
use crate::error::{Error, Result};
use crate::exchange::sha256_hex;
use crate::ipc::error::respond;
use crate::ipc::params::{opt_str, str_param};
use crate::ipc::types::{AppState, Request};
use crate::model::Student;
use crate::render;
use crate::transcript::{self, TranscriptView};
use serde_json::json;
use std::path::PathBuf;

fn load(state: &AppState, req: &Request) -> Result<(Student, TranscriptView)> {
    let id = str_param(req, "studentId")?;
    let student = state
        .store()?
        .get(id)?
        .ok_or_else(|| Error::not_found("student", id))?;
    let view = transcript::assemble(&student, state.academic_year_end());
    Ok((student, view))
}

fn handle_get(state: &mut AppState, req: &Request) -> Result<serde_json::Value> {
    let (_, view) = load(state, req)?;
    Ok(json!({ "transcript": view }))
}

fn handle_render_html(state: &mut AppState, req: &Request) -> Result<serde_json::Value> {
    let (_, view) = load(state, req)?;
    match opt_str(req, "outPath") {
        Some(p) => {
            let path = PathBuf::from(p);
            let bytes = render::write_html(&view, &path)?;
            Ok(json!({ "path": path.to_string_lossy(), "bytes": bytes }))
        }
        None => {
            let html = render::render_html(&view);
            Ok(json!({ "sha256": sha256_hex(html.as_bytes()), "html": html }))
        }
    }
}

fn handle_export_docx(state: &mut AppState, req: &Request) -> Result<serde_json::Value> {
    let (student, view) = load(state, req)?;
    let out_path = match opt_str(req, "outPath") {
        Some(p) => PathBuf::from(p),
        None => state.store()?.workspace().join(docx::default_file_name(&view)),
    };
    let summary = docx::export_docx(&view, &student.id, &out_path)?;
    Ok(json!({
        "path": summary.path.to_string_lossy(),
        "bytes": summary.bytes,
        "sha256": summary.sha256,
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "transcript.get" => handle_get(state, req),
        "transcript.renderHtml" => handle_render_html(state, req),
        "transcript.exportDocx" => handle_export_docx(state, req),
        _ => return None,
    };
    Some(respond(&req.id, result))
}

use crate::error::{Error, Result};
use crate::exchange::{self, ImportDocument};
use crate::ipc::error::respond;
use crate::ipc::params::opt_str;
use crate::ipc::types::{AppState, Request};
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing::info;

fn handle_export_json(state: &mut AppState, req: &Request) -> Result<serde_json::Value> {
    let store = state.store()?;
    let out_path = match opt_str(req, "outPath") {
        Some(p) => PathBuf::from(p),
        None => store
            .workspace()
            .join(exchange::default_export_name(chrono::Local::now().date_naive())),
    };
    let students = store.read_all()?;
    let summary = exchange::export_students(&students, &out_path)?;
    info!(path = %out_path.display(), count = summary.count, "exported students");
    Ok(json!({
        "path": out_path.to_string_lossy(),
        "count": summary.count,
        "bytes": summary.bytes,
        "sha256": summary.sha256,
    }))
}

/// Validates the whole document before touching the store; a rejected
/// import leaves the collection exactly as it was.
fn handle_import_json(state: &mut AppState, req: &Request) -> Result<serde_json::Value> {
    state.store()?;
    let text = match (opt_str(req, "path"), opt_str(req, "text")) {
        (Some(p), _) => exchange::read_import_file(Path::new(p))?,
        (None, Some(t)) => t.to_string(),
        (None, None) => return Err(Error::bad_params("missing path or text")),
    };
    let doc = exchange::parse_import(&text)?;

    let store = state.store()?;
    let kind = doc.kind();
    let count = doc.count();
    match doc {
        ImportDocument::Bulk(students) => {
            store.write_all(&students)?;
            state.session = None;
        }
        ImportDocument::Single(student) => {
            store.save(&student)?;
            if state.session.as_ref().map(|s| s.student_id() == student.id) == Some(true) {
                state.session = None;
            }
        }
    }
    info!(kind, count, "imported students");
    Ok(json!({ "kind": kind, "imported": count }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "data.exportJson" => handle_export_json(state, req),
        "data.importJson" => handle_import_json(state, req),
        _ => return None,
    };
    Some(respond(&req.id, result))
}

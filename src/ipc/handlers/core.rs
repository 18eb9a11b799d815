use crate::db::StudentStore;
use crate::error::Result;
use crate::ipc::error::respond;
use crate::ipc::params::str_param;
use crate::ipc::types::{AppState, Request};
use serde_json::json;
use std::path::PathBuf;
use tracing::info;

fn handle_health(state: &mut AppState, _req: &Request) -> Result<serde_json::Value> {
    Ok(json!({
        "version": env!("CARGO_PKG_VERSION"),
        "workspacePath": state
            .store
            .as_ref()
            .map(|s| s.workspace().to_string_lossy().to_string()),
        "sessionStudentId": state.session.as_ref().map(|s| s.student_id().to_string()),
        "academicYear": state.academic_year_end(),
    }))
}

/// Opens (or creates) the workspace database. Any open grades session
/// belongs to the previous workspace and is dropped.
pub fn select_workspace(state: &mut AppState, path: PathBuf) -> Result<serde_json::Value> {
    let store = StudentStore::open(&path)?;
    let count = store.read_all()?.len();
    state.session = None;
    state.store = Some(store);
    Ok(json!({ "workspacePath": path.to_string_lossy(), "studentCount": count }))
}

fn handle_workspace_select(state: &mut AppState, req: &Request) -> Result<serde_json::Value> {
    let path = PathBuf::from(str_param(req, "path")?);
    select_workspace(state, path)
}

fn handle_workspace_close(state: &mut AppState, _req: &Request) -> Result<serde_json::Value> {
    let was_open = state.store.take().is_some();
    state.session = None;
    if was_open {
        info!("workspace closed");
    }
    Ok(json!({ "closed": was_open }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "health" => handle_health(state, req),
        "workspace.select" => handle_workspace_select(state, req),
        "workspace.close" => handle_workspace_close(state, req),
        _ => return None,
    };
    Some(respond(&req.id, result))
}

use crate::catalog::{Template, SUBJECTS};
use crate::error::Result;
use crate::ipc::error::respond;
use crate::ipc::params::opt_str;
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn template_json(t: Template, end_year: i32) -> serde_json::Value {
    let b = t.age_bounds();
    json!({
        "template": t,
        "program": t.program(),
        "gradeLevels": t.grade_levels(),
        "years": t.year_count(),
        "academicYears": t.academic_years(end_year),
        "ageBounds": { "min": b.min, "max": b.max, "description": b.description },
    })
}

/// With `selected`, also resolves that raw selector the way the form
/// always has: unknown labels fall back to the Grade 12 program.
fn handle_templates(state: &mut AppState, req: &Request) -> Result<serde_json::Value> {
    let end_year = state.academic_year_end();
    let templates: Vec<serde_json::Value> = Template::ALL
        .into_iter()
        .map(|t| template_json(t, end_year))
        .collect();
    let mut out = json!({ "templates": templates });
    if let Some(raw) = opt_str(req, "selected") {
        out["selected"] = template_json(Template::parse_lenient(raw), end_year);
    }
    Ok(out)
}

fn handle_subjects(_state: &mut AppState, _req: &Request) -> Result<serde_json::Value> {
    Ok(json!({ "subjects": SUBJECTS }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "catalog.templates" => handle_templates(state, req),
        "catalog.subjects" => handle_subjects(state, req),
        _ => return None,
    };
    Some(respond(&req.id, result))
}

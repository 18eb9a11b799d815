//! Typed access to `req.params`. Every miss is a `bad_params` error naming
//! the key.

use super::types::Request;
use crate::catalog::{GradeLevel, Template};
use crate::error::{Error, Result};
use crate::model::Gender;

pub fn opt_str<'a>(req: &'a Request, key: &str) -> Option<&'a str> {
    req.params.get(key).and_then(|v| v.as_str())
}

pub fn str_param<'a>(req: &'a Request, key: &str) -> Result<&'a str> {
    opt_str(req, key).ok_or_else(|| Error::bad_params(format!("missing {}", key)))
}

pub fn opt_i64(req: &Request, key: &str) -> Result<Option<i64>> {
    let Some(v) = req.params.get(key).filter(|v| !v.is_null()) else {
        return Ok(None);
    };
    if let Some(n) = v.as_i64() {
        return Ok(Some(n));
    }
    match v.as_f64() {
        Some(f) if f.fract() == 0.0 => Ok(Some(f as i64)),
        _ => Err(Error::bad_params(format!("{} must be an integer", key))),
    }
}

pub fn i64_param(req: &Request, key: &str) -> Result<i64> {
    opt_i64(req, key)?.ok_or_else(|| Error::bad_params(format!("missing {}", key)))
}

pub fn opt_bool(req: &Request, key: &str) -> bool {
    req.params
        .get(key)
        .and_then(|v| v.as_bool())
        .unwrap_or(false)
}

/// A typed cell value: strings pass through, numbers are printed, so both
/// `"85.5"` and `85.5` reach the lenient score parser.
pub fn raw_value(req: &Request, key: &str) -> Result<String> {
    match req.params.get(key) {
        Some(serde_json::Value::String(s)) => Ok(s.clone()),
        Some(serde_json::Value::Number(n)) => Ok(n.to_string()),
        Some(serde_json::Value::Null) => Ok(String::new()),
        Some(_) => Err(Error::bad_params(format!(
            "{} must be a string or number",
            key
        ))),
        None => Err(Error::bad_params(format!("missing {}", key))),
    }
}

pub fn level_param(req: &Request, key: &str) -> Result<GradeLevel> {
    let s = str_param(req, key)?;
    GradeLevel::parse(s).ok_or_else(|| Error::bad_params(format!("unknown {}: {}", key, s)))
}

pub fn opt_template(req: &Request, key: &str) -> Result<Option<Template>> {
    opt_str(req, key)
        .map(|s| {
            Template::parse(s).ok_or_else(|| Error::bad_params(format!("unknown {}: {}", key, s)))
        })
        .transpose()
}

pub fn opt_gender(req: &Request, key: &str) -> Result<Option<Gender>> {
    opt_str(req, key)
        .map(|s| {
            Gender::parse(s).ok_or_else(|| Error::bad_params(format!("unknown {}: {}", key, s)))
        })
        .transpose()
}

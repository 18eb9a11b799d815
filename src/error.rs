//! Error type shared by the store, aggregator, exchange and export layers.
//!
//! Every variant maps onto a stable IPC error code so handlers can answer
//! with `err(id, e.code(), e.to_string(), e.details())`.

use serde_json::json;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Malformed request parameter (missing key, unknown enum label).
    #[error("{0}")]
    BadParams(String),

    /// User input failed a domain rule (name shape, age range).
    #[error("{message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("select a workspace first")]
    NoWorkspace,

    #[error("open a grades session first")]
    NoSession,

    #[error("subject index {index} out of range (0..{len})")]
    IndexOutOfRange { index: i64, len: usize },

    /// Import document rejected; nothing was written.
    #[error("{0}")]
    ImportRejected(String),

    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("export failed: {0}")]
    Export(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    #[error("invalid configuration: {message}")]
    ConfigValidation { message: String },

    /// I/O or packaging failure carrying `anyhow` context.
    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<anyhow::Error> for Error {
    fn from(e: anyhow::Error) -> Self {
        Self::Other(format!("{e:#}"))
    }
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    pub fn bad_params(message: impl Into<String>) -> Self {
        Self::BadParams(message.into())
    }

    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn import_rejected(message: impl Into<String>) -> Self {
        Self::ImportRejected(message.into())
    }

    pub fn export(message: impl Into<String>) -> Self {
        Self::Export(message.into())
    }

    pub fn code(&self) -> &'static str {
        match self {
            Error::BadParams(_) => "bad_params",
            Error::Validation { .. } => "validation_failed",
            Error::NotFound { .. } => "not_found",
            Error::NoWorkspace => "no_workspace",
            Error::NoSession => "no_session",
            Error::IndexOutOfRange { .. } => "index_out_of_range",
            Error::ImportRejected(_) => "import_rejected",
            Error::DatabaseOpen { .. } => "db_open_failed",
            Error::Database(_) => "db_query_failed",
            Error::Export(_) => "export_failed",
            Error::Io(_) | Error::Other(_) => "io_failed",
            Error::Json(_) => "bad_json",
            Error::ConfigLoad(_) | Error::ConfigValidation { .. } => "config_invalid",
        }
    }

    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Error::Validation { field, .. } => Some(json!({ "field": field })),
            Error::NotFound { entity, id } => Some(json!({ "entity": entity, "id": id })),
            Error::IndexOutOfRange { index, len } => Some(json!({ "index": index, "len": len })),
            Error::DatabaseOpen { path, .. } => Some(json!({ "path": path.to_string_lossy() })),
            _ => None,
        }
    }
}

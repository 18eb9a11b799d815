use crate::config::Config;
use crate::db::StudentStore;
use crate::error::{Error, Result};
use crate::session::GradeSession;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub config: Config,
    pub store: Option<StudentStore>,
    pub session: Option<GradeSession>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            store: None,
            session: None,
        }
    }

    pub fn store(&self) -> Result<&StudentStore> {
        self.store.as_ref().ok_or(Error::NoWorkspace)
    }

    pub fn session_mut(&mut self) -> Result<&mut GradeSession> {
        self.session.as_mut().ok_or(Error::NoSession)
    }

    pub fn academic_year_end(&self) -> i32 {
        self.config.academic_year_end()
    }
}

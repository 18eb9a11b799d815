//! Startup configuration.
//!
//! Loaded from (later sources override earlier):
//! 1. Default values
//! 2. `transcriptd.toml` in the working directory, or the file named by
//!    `TRANSCRIPTD_CONFIG`
//! 3. Environment variables prefixed with `TRANSCRIPTD_`

use std::path::PathBuf;

use chrono::Datelike;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const CONFIG_FILE_NAME: &str = "transcriptd.toml";
const CONFIG_PATH_VAR: &str = "TRANSCRIPTD_CONFIG";
const ENV_PREFIX: &str = "TRANSCRIPTD_";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Workspace opened at startup, before any `workspace.select`.
    pub workspace: Option<PathBuf>,
    /// `tracing` filter directive; `RUST_LOG` wins when set.
    pub log_filter: String,
    /// End year of the academic-years label. Defaults to the current year.
    pub academic_year: Option<i32>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workspace: None,
            log_filter: "transcriptd=info".to_string(),
            academic_year: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = std::env::var_os(CONFIG_PATH_VAR).map(PathBuf::from);
        Self::load_from(path)
    }

    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed(ENV_PREFIX).ignore(&["config"]));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.log_filter.trim().is_empty() {
            return Err(Error::ConfigValidation {
                message: "log_filter must not be empty".to_string(),
            });
        }
        if let Some(y) = self.academic_year {
            if !(1900..=9999).contains(&y) {
                return Err(Error::ConfigValidation {
                    message: format!("academic_year out of range: {y}"),
                });
            }
        }
        Ok(())
    }

    pub fn academic_year_end(&self) -> i32 {
        self.academic_year
            .unwrap_or_else(|| chrono::Local::now().year())
    }
}

//! Configuration for the server, the store, the OCR client and the parsers.

use crate::model::{default_time_slots, DayName, TimeSlot};
use crate::planner::AttendanceMode;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use thiserror::Error;
use url::Url;

/// Environment variable naming the JSON configuration file.
pub const CONFIG_PATH_ENV: &str = "LEAVEPLAN_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not parse config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid OCR service URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub ocr: OcrConfig,
    pub parser: ParserConfig,
    pub planner: PlannerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite file; `:memory:` keeps everything in process.
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "leaveplan.db".to_string(),
        }
    }
}

/// Settings for the external OCR service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Base URL; requests go to `{base_url}/recognize`.
    pub base_url: String,
    /// Total attempts for transient failures (1 = no retry)
    pub max_attempts: u32,
    /// Base delay between attempts (exponential backoff)
    pub retry_base_delay_ms: u64,
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8866".to_string(),
            max_attempts: 3,
            retry_base_delay_ms: 500,
            timeout_secs: 60,
            connect_timeout_secs: 10,
        }
    }
}

/// The canonical timetable grid and the recovery threshold.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    pub days: Vec<DayName>,
    pub time_slots: Vec<TimeSlot>,
    /// Below this many matched cells the positional recovery kicks in.
    pub fallback_threshold: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            days: DayName::WEEKDAYS.to_vec(),
            time_slots: default_time_slots(),
            fallback_threshold: 5,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Only calendar entries with a holiday description produce suggestions.
    pub holidays_only: bool,
    pub attendance_mode: AttendanceMode,
}

impl AppConfig {
    /// Loads the config file if it exists (defaults otherwise), applies
    /// environment overrides and validates the result.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) if path.exists() => Self::load_from_file(path)?,
            _ => AppConfig::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Applies `LEAVEPLAN_PORT`, `LEAVEPLAN_DB` and `LEAVEPLAN_OCR_URL`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("LEAVEPLAN_PORT") {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("LEAVEPLAN_PORT '{port}' is not a port")))?;
        }
        if let Some(db) = lookup("LEAVEPLAN_DB") {
            self.database.path = db;
        }
        if let Some(url) = lookup("LEAVEPLAN_OCR_URL") {
            self.ocr.base_url = url;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.ocr.base_url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid(format!(
                "OCR service URL must be http(s), got '{}'",
                url.scheme()
            )));
        }
        if self.ocr.max_attempts == 0 {
            return Err(ConfigError::Invalid("ocr.max_attempts must be at least 1".into()));
        }
        self.parser.validate()
    }
}

impl ParserConfig {
    /// Slots must be non-empty, sorted and non-overlapping; days must be
    /// non-empty and distinct.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.days.is_empty() {
            return Err(ConfigError::Invalid("parser.days is empty".into()));
        }
        let distinct: HashSet<_> = self.days.iter().collect();
        if distinct.len() != self.days.len() {
            return Err(ConfigError::Invalid("parser.days lists a day twice".into()));
        }
        if self.time_slots.is_empty() {
            return Err(ConfigError::Invalid("parser.time_slots is empty".into()));
        }
        for pair in self.time_slots.windows(2) {
            if pair[0].overlaps(&pair[1]) || pair[0].start >= pair[1].start {
                return Err(ConfigError::Invalid(format!(
                    "time slots {} and {} overlap or are out of order",
                    pair[0], pair[1]
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        config.validate().unwrap();
        assert_eq!(config.parser.time_slots.len(), 8);
        assert_eq!(config.parser.days.len(), 5);
        assert_eq!(config.parser.fallback_threshold, 5);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: AppConfig = serde_json::from_str(
            r#"{
                "server": { "port": 8080 },
                "parser": { "days": ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday"] },
                "planner": { "attendance_mode": "aggregate" }
            }"#,
        )
        .unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.address, "0.0.0.0");
        assert_eq!(config.parser.days.len(), 6);
        assert_eq!(config.parser.time_slots.len(), 8);
        assert_eq!(config.planner.attendance_mode, AttendanceMode::Aggregate);
        config.validate().unwrap();
    }

    #[test]
    fn test_overlapping_slots_are_rejected() {
        let config: AppConfig = serde_json::from_str(
            r#"{ "parser": { "time_slots": ["09:00-10:00", "09:30-10:30"] } }"#,
        )
        .unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("LEAVEPLAN_PORT", "9000"),
            ("LEAVEPLAN_DB", ":memory:"),
            ("LEAVEPLAN_OCR_URL", "https://ocr.internal:9443"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config
            .apply_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.database.path, ":memory:");
        assert_eq!(config.ocr.base_url, "https://ocr.internal:9443");
        config.validate().unwrap();

        let mut bad = AppConfig::default();
        assert!(bad.apply_overrides(|_| Some("not-a-port".to_string())).is_err());
    }

    #[test]
    fn test_bad_ocr_url_is_rejected() {
        let mut config = AppConfig::default();
        config.ocr.base_url = "ftp://example.com".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
        config.ocr.base_url = "not a url".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Url(_))));
    }
}

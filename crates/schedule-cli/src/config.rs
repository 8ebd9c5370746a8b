//! Settings for the `sched` CLI.
//!
//! Sources, lowest to highest precedence:
//!
//! 1. Built-in defaults (read the snapshot from stdin, use the wall clock, log warnings)
//! 2. `sched.yaml` in the working directory, or the file given with `--config`
//! 3. `SCHED_INPUT`, `SCHED_NOW`, `SCHED_LOG` environment variables
//! 4. Command-line flags, applied by the caller

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use serde::Deserialize;

/// Settings file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "sched.yaml";

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Reservation snapshot to read instead of stdin.
    pub input: Option<String>,
    /// Fixed `YYYY-MM-DDTHH:MM[:SS]` instant used by `validate`.
    pub now: Option<String>,
    /// `tracing` filter directive, e.g. `debug` or `schedule_engine=trace`.
    pub log_level: Option<String>,
}

impl Settings {
    /// Load the settings file (if any) and apply environment overrides.
    ///
    /// An explicit `path` must exist; the default file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };
        settings.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(settings)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        serde_yaml::from_str(&raw)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Apply `SCHED_*` overrides, looking variables up through `var`.
    pub fn apply_env_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(input) = var("SCHED_INPUT") {
            self.input = Some(input);
        }
        if let Some(now) = var("SCHED_NOW") {
            self.now = Some(now);
        }
        if let Some(level) = var("SCHED_LOG") {
            self.log_level = Some(level);
        }
    }
}

/// Parse a `YYYY-MM-DDTHH:MM[:SS]` local instant.
pub fn parse_now(s: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M"))
        .with_context(|| format!("Invalid datetime '{}': expected YYYY-MM-DDTHH:MM[:SS]", s))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn reads_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.yaml");
        std::fs::write(&path, "input: snapshot.json\nnow: 2024-05-01T10:00\n").unwrap();

        let settings = Settings::from_file(&path).unwrap();

        assert_eq!(settings.input.as_deref(), Some("snapshot.json"));
        assert_eq!(settings.now.as_deref(), Some("2024-05-01T10:00"));
        assert!(settings.log_level.is_none());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.yaml");
        std::fs::write(&path, "inputs: typo.json\n").unwrap();

        assert!(Settings::from_file(&path).is_err());
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        assert!(Settings::load(Some(Path::new("/nonexistent/sched.yaml"))).is_err());
    }

    #[test]
    fn environment_overrides_file_values() {
        let mut settings = Settings {
            input: Some("file.json".to_string()),
            now: None,
            log_level: Some("warn".to_string()),
        };
        let env: HashMap<&str, &str> = [("SCHED_INPUT", "env.json"), ("SCHED_LOG", "debug")].into();

        settings.apply_env_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(settings.input.as_deref(), Some("env.json"));
        assert!(settings.now.is_none());
        assert_eq!(settings.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn parse_now_accepts_with_and_without_seconds() {
        assert_eq!(
            parse_now("2024-05-01T10:00").unwrap(),
            parse_now("2024-05-01T10:00:00").unwrap()
        );
        assert!(parse_now("tomorrow").is_err());
    }
}

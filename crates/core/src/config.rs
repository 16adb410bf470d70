//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and passed into the engine and the sweep
//! runner. Nothing in this crate reads environment variables during evaluation; the helpers
//! below take the raw `Option<String>` values so callers (and tests) decide where they come
//! from.

use crate::constants::{DEFAULT_SUBMISSIONS_DIR, DEFAULT_SWEEP_INTERVAL_SECS};
use crate::{TriageError, TriageResult};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    sla_table_path: Option<PathBuf>,
    status_registry_path: Option<PathBuf>,
    submissions_dir: PathBuf,
    sweep_interval: Duration,
}

impl CoreConfig {
    pub fn new(
        sla_table_path: Option<PathBuf>,
        status_registry_path: Option<PathBuf>,
        submissions_dir: PathBuf,
        sweep_interval: Duration,
    ) -> TriageResult<Self> {
        if sweep_interval.is_zero() {
            return Err(TriageError::InvalidConfig(
                "sweep interval must be greater than zero".into(),
            ));
        }
        if submissions_dir.as_os_str().is_empty() {
            return Err(TriageError::InvalidConfig(
                "submissions directory cannot be empty".into(),
            ));
        }

        Ok(Self {
            sla_table_path,
            status_registry_path,
            submissions_dir,
            sweep_interval,
        })
    }

    pub fn sla_table_path(&self) -> Option<&Path> {
        self.sla_table_path.as_deref()
    }

    pub fn status_registry_path(&self) -> Option<&Path> {
        self.status_registry_path.as_deref()
    }

    pub fn submissions_dir(&self) -> &Path {
        &self.submissions_dir
    }

    pub fn sweep_interval(&self) -> Duration {
        self.sweep_interval
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            sla_table_path: None,
            status_registry_path: None,
            submissions_dir: PathBuf::from(DEFAULT_SUBMISSIONS_DIR),
            sweep_interval: Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS),
        }
    }
}

/// Trims an optional value, treating empty/whitespace as unset.
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parses an optional path; empty/whitespace means "not configured".
pub fn optional_path_from_env_value(value: Option<String>) -> Option<PathBuf> {
    non_blank(value).map(PathBuf::from)
}

/// Parses the submissions directory, falling back to [`DEFAULT_SUBMISSIONS_DIR`].
pub fn submissions_dir_from_env_value(value: Option<String>) -> PathBuf {
    optional_path_from_env_value(value).unwrap_or_else(|| PathBuf::from(DEFAULT_SUBMISSIONS_DIR))
}

/// Parses the sweep interval in whole seconds.
///
/// If `value` is `None` or empty/whitespace, returns the default interval.
pub fn sweep_interval_from_env_value(value: Option<String>) -> TriageResult<Duration> {
    let Some(raw) = non_blank(value) else {
        return Ok(Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS));
    };

    let secs = raw.parse::<u64>().map_err(|e| {
        TriageError::InvalidConfig(format!("sweep interval '{raw}' is not a whole number of seconds: {e}"))
    })?;
    if secs == 0 {
        return Err(TriageError::InvalidConfig(
            "sweep interval must be greater than zero".into(),
        ));
    }

    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_values_fall_back_to_defaults() {
        assert_eq!(optional_path_from_env_value(Some("   ".into())), None);
        assert_eq!(
            submissions_dir_from_env_value(None),
            PathBuf::from(DEFAULT_SUBMISSIONS_DIR)
        );
        assert_eq!(
            sweep_interval_from_env_value(Some("".into())).unwrap(),
            Duration::from_secs(60)
        );
    }

    #[test]
    fn parses_configured_values() {
        assert_eq!(
            optional_path_from_env_value(Some(" /etc/triage/sla.yaml ".into())),
            Some(PathBuf::from("/etc/triage/sla.yaml"))
        );
        assert_eq!(
            sweep_interval_from_env_value(Some("15".into())).unwrap(),
            Duration::from_secs(15)
        );
    }

    #[test]
    fn rejects_bad_sweep_interval() {
        assert!(matches!(
            sweep_interval_from_env_value(Some("0".into())),
            Err(TriageError::InvalidConfig(_))
        ));
        assert!(matches!(
            sweep_interval_from_env_value(Some("1m".into())),
            Err(TriageError::InvalidConfig(_))
        ));
    }

    #[test]
    fn new_validates_inputs() {
        assert!(CoreConfig::new(None, None, PathBuf::from("subs"), Duration::ZERO).is_err());
        assert!(CoreConfig::new(None, None, PathBuf::new(), Duration::from_secs(1)).is_err());

        let cfg = CoreConfig::new(
            Some(PathBuf::from("sla.yaml")),
            None,
            PathBuf::from("subs"),
            Duration::from_secs(30),
        )
        .unwrap();
        assert_eq!(cfg.sla_table_path(), Some(Path::new("sla.yaml")));
        assert!(cfg.status_registry_path().is_none());
        assert_eq!(cfg.sweep_interval(), Duration::from_secs(30));
    }
}

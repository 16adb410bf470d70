//! Constants used throughout the triage core crate.

/// Default directory the JSON submission store reads from.
pub const DEFAULT_SUBMISSIONS_DIR: &str = "submissions";

/// Default cadence of the batch re-evaluation sweep, matching the portal's refresh interval.
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60;

/// File extension of records in the JSON submission store.
pub const SUBMISSION_FILE_EXTENSION: &str = "json";

/// Environment variable naming an optional SLA threshold table YAML file.
pub const SLA_TABLE_ENV: &str = "TRIAGE_SLA_TABLE";

/// Environment variable naming an optional status registry overlay YAML file.
pub const STATUS_REGISTRY_ENV: &str = "TRIAGE_STATUS_REGISTRY";

/// Environment variable naming the JSON submission store directory.
pub const SUBMISSIONS_DIR_ENV: &str = "TRIAGE_SUBMISSIONS_DIR";

/// Environment variable overriding the sweep interval in seconds.
pub const SWEEP_INTERVAL_ENV: &str = "TRIAGE_SWEEP_INTERVAL_SECS";

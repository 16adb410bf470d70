//! # Triage Core
//!
//! SLA and escalation engine for patient-facing submissions.
//!
//! This crate contains the pure triage logic:
//! - SLA threshold table per urgency tier ([`thresholds`])
//! - Deadline evaluation: compliance colour, countdown, next threshold ([`deadline`])
//! - Breach-triggered, tier-scoped escalation ([`escalation`])
//! - Composition into one decision per submission ([`aggregator`])
//! - Read-only store adapters and the parallel batch sweep ([`store`], [`sweep`])
//!
//! Every evaluation is a pure function of the submission and a caller-supplied `now`.
//!
//! **No API concerns**: HTTP servers and CLI parsing belong in `api-rest` and `triage-cli`.

pub mod aggregator;
pub mod config;
pub mod constants;
pub mod deadline;
pub mod error;
pub mod escalation;
pub mod store;
pub mod submission;
pub mod sweep;
pub mod thresholds;

pub use aggregator::{TriageDecision, TriageEngine};
pub use config::CoreConfig;
pub use constants::DEFAULT_SUBMISSIONS_DIR;
pub use deadline::{ComplianceColor, ComplianceResult, Countdown};
pub use error::{ErrorDisposition, TriageError, TriageResult};
pub use escalation::EscalationVerdict;
pub use store::{InMemoryStore, JsonDirStore, StoreEntry, SubmissionStore};
pub use submission::{Submission, SubmissionRecord, UrgencyFlag};
pub use sweep::{run_sweep, sweep_store, CancellationToken, SweepFailure, SweepReport};
pub use thresholds::{Role, SlaThresholdSpec, SlaThresholdTable, UrgencyLevel};

pub use triage_status as status;
pub use triage_types::{StaffRef, SubmissionId};

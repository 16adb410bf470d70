//! Status dimension registry for triaged submissions.
//!
//! Every submission carries four independent workflow axes:
//! - processing status (where the item is in the practice workflow)
//! - review ownership (which staff group currently owns the review)
//! - clinical action state (what follow-up action has been taken)
//! - medication status (only for medication requests)
//!
//! This crate maps each axis value to its display and semantic configuration
//! ([`StatusLabelConfig`]). The processing axis `is_terminal` flag is the single authoritative
//! terminality signal used by escalation.
//!
//! The registry is built from embedded defaults, optionally overlaid by a strict YAML file, once
//! at startup. It is never mutated afterwards.

pub mod axes;
pub mod labels;
pub mod registry;

pub use axes::{Axis, ClinicalActionState, MedicationStatus, ProcessingStatus, ReviewOwnership};
pub use labels::{LabelColor, StatusLabelConfig};
pub use registry::{ResolvedLabels, StatusRegistry};

/// Errors returned by the status registry.
#[derive(Debug, thiserror::Error)]
pub enum StatusError {
    #[error("no label config registered for {axis} value '{value}'")]
    ConfigNotFound { axis: Axis, value: String },

    #[error("invalid YAML: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("translation error: {0}")]
    Translation(String),
}

/// Type alias for Results that can fail with a [`StatusError`].
pub type StatusResult<T> = Result<T, StatusError>;

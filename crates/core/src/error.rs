use triage_status::{Axis, StatusError};

#[derive(Debug, thiserror::Error)]
pub enum TriageError {
    #[error("no label config registered for {axis} value '{value}'")]
    ConfigNotFound { axis: Axis, value: String },
    #[error("unknown urgency tier '{0}'")]
    UnknownUrgencyTier(String),
    #[error("malformed submission {id}: {reason}")]
    MalformedSubmission { id: String, reason: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("translation error: {0}")]
    Translation(String),
    #[error("status registry error: {0}")]
    StatusRegistry(StatusError),
    #[error("failed to read submission store: {0}")]
    StoreRead(std::io::Error),
    #[error("failed to read configuration file: {0}")]
    ConfigRead(std::io::Error),
}

impl From<StatusError> for TriageError {
    fn from(err: StatusError) -> Self {
        match err {
            StatusError::ConfigNotFound { axis, value } => Self::ConfigNotFound { axis, value },
            other => Self::StatusRegistry(other),
        }
    }
}

/// What a batch caller should do when evaluating a submission fails.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorDisposition {
    /// The record is bad; log it and continue with the rest of the sweep.
    SkipRecord,
    /// The engine or its inputs are unusable; stop the sweep.
    AbortSweep,
}

impl TriageError {
    pub fn disposition(&self) -> ErrorDisposition {
        match self {
            Self::ConfigNotFound { .. }
            | Self::UnknownUrgencyTier(_)
            | Self::MalformedSubmission { .. } => ErrorDisposition::SkipRecord,
            Self::InvalidConfig(_)
            | Self::Translation(_)
            | Self::StatusRegistry(_)
            | Self::StoreRead(_)
            | Self::ConfigRead(_) => ErrorDisposition::AbortSweep,
        }
    }

    /// Short machine-readable tag, used in logs and API error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ConfigNotFound { .. } => "config_not_found",
            Self::UnknownUrgencyTier(_) => "unknown_urgency_tier",
            Self::MalformedSubmission { .. } => "malformed_submission",
            Self::InvalidConfig(_) => "invalid_config",
            Self::Translation(_) => "translation",
            Self::StatusRegistry(_) => "status_registry",
            Self::StoreRead(_) => "store_read",
            Self::ConfigRead(_) => "config_read",
        }
    }
}

pub type TriageResult<T> = std::result::Result<T, TriageError>;

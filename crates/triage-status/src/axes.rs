//! The four workflow axes and their closed value domains.
//!
//! Wire values are snake_case. Parsing an unknown value fails with
//! [`StatusError::ConfigNotFound`] rather than falling back to a default, so data-entry errors
//! surface instead of rendering as a grey "unknown" badge.

use crate::StatusError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifies one of the four status axes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    ProcessingStatus,
    ReviewOwnership,
    ClinicalActionState,
    MedicationStatus,
}

impl Axis {
    /// Returns the wire name of this axis.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProcessingStatus => "processing_status",
            Self::ReviewOwnership => "review_ownership",
            Self::ClinicalActionState => "clinical_action_state",
            Self::MedicationStatus => "medication_status",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn not_found(axis: Axis, value: &str) -> StatusError {
    StatusError::ConfigNotFound {
        axis,
        value: value.to_owned(),
    }
}

// ============================================================================
// Processing status
// ============================================================================

/// Where a submission is in the practice workflow.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStatus {
    /// Received by the practice, nobody has looked at it yet.
    Received,
    /// A staff member is reviewing the submission.
    InReview,
    /// Waiting on information from the patient.
    AwaitingPatient,
    /// Work is under way.
    InProgress,
    /// Handed up the chain by staff.
    Escalated,
    /// Handled to completion.
    Resolved,
    /// Closed without further action.
    Closed,
    /// Withdrawn by the patient or voided by staff.
    Cancelled,
}

impl ProcessingStatus {
    pub const ALL: [Self; 8] = [
        Self::Received,
        Self::InReview,
        Self::AwaitingPatient,
        Self::InProgress,
        Self::Escalated,
        Self::Resolved,
        Self::Closed,
        Self::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::InReview => "in_review",
            Self::AwaitingPatient => "awaiting_patient",
            Self::InProgress => "in_progress",
            Self::Escalated => "escalated",
            Self::Resolved => "resolved",
            Self::Closed => "closed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl FromStr for ProcessingStatus {
    type Err = StatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == s.trim())
            .ok_or_else(|| not_found(Axis::ProcessingStatus, s))
    }
}

// ============================================================================
// Review ownership
// ============================================================================

/// Which staff group currently owns the review of a submission.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewOwnership {
    Unassigned,
    NurseReview,
    MdReview,
    PracticeManagerReview,
    AdminReview,
    Completed,
}

impl ReviewOwnership {
    pub const ALL: [Self; 6] = [
        Self::Unassigned,
        Self::NurseReview,
        Self::MdReview,
        Self::PracticeManagerReview,
        Self::AdminReview,
        Self::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unassigned => "unassigned",
            Self::NurseReview => "nurse_review",
            Self::MdReview => "md_review",
            Self::PracticeManagerReview => "practice_manager_review",
            Self::AdminReview => "admin_review",
            Self::Completed => "completed",
        }
    }
}

impl FromStr for ReviewOwnership {
    type Err = StatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == s.trim())
            .ok_or_else(|| not_found(Axis::ReviewOwnership, s))
    }
}

// ============================================================================
// Clinical action state
// ============================================================================

/// Follow-up clinical action recorded against a submission.
///
/// The engine never interprets the clinical content behind these states.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClinicalActionState {
    NoneRequired,
    Pending,
    Ordered,
    Scheduled,
    Completed,
    Declined,
}

impl ClinicalActionState {
    pub const ALL: [Self; 6] = [
        Self::NoneRequired,
        Self::Pending,
        Self::Ordered,
        Self::Scheduled,
        Self::Completed,
        Self::Declined,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoneRequired => "none_required",
            Self::Pending => "pending",
            Self::Ordered => "ordered",
            Self::Scheduled => "scheduled",
            Self::Completed => "completed",
            Self::Declined => "declined",
        }
    }
}

impl FromStr for ClinicalActionState {
    type Err = StatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == s.trim())
            .ok_or_else(|| not_found(Axis::ClinicalActionState, s))
    }
}

// ============================================================================
// Medication status
// ============================================================================

/// Status of a medication request or change. Absent on non-medication submissions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MedicationStatus {
    Requested,
    PendingReview,
    Approved,
    SentToPharmacy,
    Denied,
    Discontinued,
}

impl MedicationStatus {
    pub const ALL: [Self; 6] = [
        Self::Requested,
        Self::PendingReview,
        Self::Approved,
        Self::SentToPharmacy,
        Self::Denied,
        Self::Discontinued,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Requested => "requested",
            Self::PendingReview => "pending_review",
            Self::Approved => "approved",
            Self::SentToPharmacy => "sent_to_pharmacy",
            Self::Denied => "denied",
            Self::Discontinued => "discontinued",
        }
    }
}

impl FromStr for MedicationStatus {
    type Err = StatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == s.trim())
            .ok_or_else(|| not_found(Axis::MedicationStatus, s))
    }
}

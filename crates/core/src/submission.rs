//! Submission records as supplied by the store, and their validated domain form.
//!
//! The store hands the engine a [`SubmissionRecord`]: a loose JSON shape with every enum as a
//! string. [`Submission::from_record`] turns it into a typed [`Submission`], which is where
//! unknown axis values and unknown urgency tiers are detected.
//!
//! Timestamps are recovered rather than rejected wherever an anchor can still be found:
//! - an unusable `lastUpdatedAt` is treated as absent;
//! - an unusable `submittedAt` falls back to `lastUpdatedAt`;
//! - only when neither is usable is the record rejected.

use crate::thresholds::UrgencyLevel;
use crate::{TriageError, TriageResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use triage_status::{ClinicalActionState, MedicationStatus, ProcessingStatus, ReviewOwnership};
use triage_types::{StaffRef, SubmissionId};

/// Advisory annotation set by upstream triage.
///
/// Surfaced next to the computed escalation verdict and never merged with it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrgencyFlag {
    #[default]
    None,
    TimeSensitive,
    EscalationRecommended,
    EmergencyRedirectSent,
}

impl UrgencyFlag {
    pub const ALL: [Self; 4] = [
        Self::None,
        Self::TimeSensitive,
        Self::EscalationRecommended,
        Self::EmergencyRedirectSent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::TimeSensitive => "time_sensitive",
            Self::EscalationRecommended => "escalation_recommended",
            Self::EmergencyRedirectSent => "emergency_redirect_sent",
        }
    }
}

impl FromStr for UrgencyFlag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|flag| flag.as_str() == s.trim())
            .ok_or_else(|| format!("unknown urgency flag '{s}'"))
    }
}

impl fmt::Display for UrgencyFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wire shape of a submission as read from the store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRecord {
    pub id: String,
    pub urgency_level: String,
    #[serde(default)]
    pub urgency_flag: Option<String>,
    pub processing_status: String,
    pub review_ownership: String,
    pub clinical_action_state: String,
    #[serde(default)]
    pub medication_status: Option<String>,
    #[serde(default)]
    pub submitted_at: Option<String>,
    #[serde(default)]
    pub last_updated_at: Option<String>,
    #[serde(default)]
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub estimated_completion_time: Option<String>,
}

/// A validated submission.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: SubmissionId,
    pub urgency_level: UrgencyLevel,
    pub urgency_flag: UrgencyFlag,
    pub processing_status: ProcessingStatus,
    pub review_ownership: ReviewOwnership,
    pub clinical_action_state: ClinicalActionState,
    pub medication_status: Option<MedicationStatus>,
    pub submitted_at: DateTime<Utc>,
    pub last_updated_at: Option<DateTime<Utc>>,
    pub assigned_to: Option<StaffRef>,
    /// Informational only. Never used in SLA math.
    pub estimated_completion_time: Option<DateTime<Utc>>,
}

impl Submission {
    /// Validates a store record.
    ///
    /// # Errors
    ///
    /// - [`TriageError::MalformedSubmission`] for a blank id, an unknown urgency flag, or when no
    ///   usable timestamp remains to anchor on.
    /// - [`TriageError::UnknownUrgencyTier`] for an unknown urgency level.
    /// - [`TriageError::ConfigNotFound`] for an unknown value on any status axis.
    pub fn from_record(record: &SubmissionRecord) -> TriageResult<Self> {
        let id = SubmissionId::new(&record.id).map_err(|e| TriageError::MalformedSubmission {
            id: record.id.clone(),
            reason: e.to_string(),
        })?;

        let urgency_level = record.urgency_level.parse::<UrgencyLevel>()?;
        let urgency_flag = match record.urgency_flag.as_deref() {
            None => UrgencyFlag::None,
            Some(raw) => raw
                .parse()
                .map_err(|reason| TriageError::MalformedSubmission {
                    id: id.to_string(),
                    reason,
                })?,
        };

        let processing_status = record.processing_status.parse::<ProcessingStatus>()?;
        let review_ownership = record.review_ownership.parse::<ReviewOwnership>()?;
        let clinical_action_state = record.clinical_action_state.parse::<ClinicalActionState>()?;
        let medication_status = record
            .medication_status
            .as_deref()
            .map(str::parse::<MedicationStatus>)
            .transpose()?;

        let last_updated_at = lenient_timestamp(&id, "lastUpdatedAt", &record.last_updated_at);
        let submitted_at = match lenient_timestamp(&id, "submittedAt", &record.submitted_at) {
            Some(ts) => ts,
            None => last_updated_at.ok_or_else(|| TriageError::MalformedSubmission {
                id: id.to_string(),
                reason: "neither submittedAt nor lastUpdatedAt is a usable timestamp".into(),
            })?,
        };

        let assigned_to = record
            .assigned_to
            .as_deref()
            .and_then(|raw| StaffRef::new(raw).ok());
        let estimated_completion_time =
            lenient_timestamp(&id, "estimatedCompletionTime", &record.estimated_completion_time);

        Ok(Self {
            id,
            urgency_level,
            urgency_flag,
            processing_status,
            review_ownership,
            clinical_action_state,
            medication_status,
            submitted_at,
            last_updated_at,
            assigned_to,
            estimated_completion_time,
        })
    }
}

impl TryFrom<&SubmissionRecord> for Submission {
    type Error = TriageError;

    fn try_from(record: &SubmissionRecord) -> Result<Self, Self::Error> {
        Self::from_record(record)
    }
}

/// Parses an RFC 3339 timestamp, treating blank or unparseable values as absent.
fn lenient_timestamp(id: &SubmissionId, field: &str, raw: &Option<String>) -> Option<DateTime<Utc>> {
    let raw = raw.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
    match DateTime::parse_from_rfc3339(raw) {
        Ok(ts) => Some(ts.with_timezone(&Utc)),
        Err(err) => {
            tracing::warn!(
                submission_id = %id,
                field,
                value = raw,
                error = %err,
                "ignoring unparseable timestamp"
            );
            None
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::TimeZone;

    pub(crate) fn record(id: &str, urgency: &str, processing: &str) -> SubmissionRecord {
        SubmissionRecord {
            id: id.into(),
            urgency_level: urgency.into(),
            urgency_flag: None,
            processing_status: processing.into(),
            review_ownership: "nurse_review".into(),
            clinical_action_state: "pending".into(),
            medication_status: None,
            submitted_at: Some("2026-03-02T09:00:00Z".into()),
            last_updated_at: Some("2026-03-02T09:00:00Z".into()),
            assigned_to: None,
            estimated_completion_time: None,
        }
    }

    #[test]
    fn parses_camel_case_json_record() {
        let json = r#"{
            "id": "msg-17",
            "urgencyLevel": "urgent",
            "urgencyFlag": "escalation_recommended",
            "processingStatus": "in_review",
            "reviewOwnership": "md_review",
            "clinicalActionState": "ordered",
            "medicationStatus": "pending_review",
            "submittedAt": "2026-03-02T09:00:00Z",
            "lastUpdatedAt": "2026-03-02T10:15:00+01:00",
            "assignedTo": "dr-okafor"
        }"#;
        let record: SubmissionRecord = serde_json::from_str(json).expect("valid json");
        let submission = Submission::from_record(&record).expect("valid record");

        assert_eq!(submission.id.as_str(), "msg-17");
        assert_eq!(submission.urgency_level, UrgencyLevel::Urgent);
        assert_eq!(submission.urgency_flag, UrgencyFlag::EscalationRecommended);
        assert_eq!(submission.medication_status, Some(MedicationStatus::PendingReview));
        assert_eq!(
            submission.last_updated_at,
            Some(Utc.with_ymd_and_hms(2026, 3, 2, 9, 15, 0).unwrap())
        );
        assert_eq!(submission.assigned_to.unwrap().as_str(), "dr-okafor");
        assert!(submission.estimated_completion_time.is_none());
    }

    #[test]
    fn missing_flag_defaults_to_none() {
        let submission = Submission::from_record(&record("a", "routine", "received")).unwrap();
        assert_eq!(submission.urgency_flag, UrgencyFlag::None);
    }

    #[test]
    fn unknown_flag_is_malformed() {
        let mut rec = record("a", "routine", "received");
        rec.urgency_flag = Some("panic".into());
        let err = Submission::from_record(&rec).unwrap_err();
        assert!(matches!(err, TriageError::MalformedSubmission { ref id, .. } if id == "a"));
    }

    #[test]
    fn unknown_tier_and_status_are_reported() {
        let err = Submission::from_record(&record("a", "critical", "received")).unwrap_err();
        assert!(matches!(err, TriageError::UnknownUrgencyTier(_)));

        let err = Submission::from_record(&record("a", "normal", "archived")).unwrap_err();
        assert!(matches!(err, TriageError::ConfigNotFound { ref value, .. } if value == "archived"));
    }

    #[test]
    fn blank_id_is_malformed() {
        let err = Submission::from_record(&record("  ", "normal", "received")).unwrap_err();
        assert!(matches!(err, TriageError::MalformedSubmission { .. }));
    }

    #[test]
    fn bad_last_updated_is_treated_as_absent() {
        let mut rec = record("a", "normal", "received");
        rec.last_updated_at = Some("yesterday-ish".into());
        let submission = Submission::from_record(&rec).unwrap();
        assert!(submission.last_updated_at.is_none());
    }

    #[test]
    fn missing_submitted_falls_back_to_last_updated() {
        let mut rec = record("a", "normal", "received");
        rec.submitted_at = None;
        rec.last_updated_at = Some("2026-03-02T11:00:00Z".into());
        let submission = Submission::from_record(&rec).unwrap();
        assert_eq!(
            submission.submitted_at,
            Utc.with_ymd_and_hms(2026, 3, 2, 11, 0, 0).unwrap()
        );
    }

    #[test]
    fn no_usable_timestamp_is_malformed() {
        let mut rec = record("a", "normal", "received");
        rec.submitted_at = Some("".into());
        rec.last_updated_at = Some("not a date".into());
        let err = Submission::from_record(&rec).unwrap_err();
        assert!(matches!(err, TriageError::MalformedSubmission { .. }));
    }
}

//! JSON request/response types.
//!
//! These mirror the core domain types in a flat, string-typed form suitable for OpenAPI
//! consumers. Timestamps are RFC 3339 strings.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use triage_core::status::{ResolvedLabels, StatusLabelConfig};
use triage_core::{
    SlaThresholdTable, SubmissionRecord, SweepFailure, SweepReport, TriageDecision, TriageError,
    UrgencyLevel,
};
use utoipa::ToSchema;

/// RFC 3339 in UTC; sub-second digits appear only when the instant has them.
fn rfc3339(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

/// A submission as held by the portal's store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReq {
    pub id: String,
    /// One of `emergency`, `urgent`, `normal`, `routine`.
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

impl From<SubmissionReq> for SubmissionRecord {
    fn from(req: SubmissionReq) -> Self {
        Self {
            id: req.id,
            urgency_level: req.urgency_level,
            urgency_flag: req.urgency_flag,
            processing_status: req.processing_status,
            review_ownership: req.review_ownership,
            clinical_action_state: req.clinical_action_state,
            medication_status: req.medication_status,
            submitted_at: req.submitted_at,
            last_updated_at: req.last_updated_at,
            assigned_to: req.assigned_to,
            estimated_completion_time: req.estimated_completion_time,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateReq {
    pub submission: SubmissionReq,
    /// Evaluation instant; defaults to the server clock when omitted.
    #[serde(default)]
    pub now: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LabelRes {
    pub label: String,
    pub color: String,
    pub icon: String,
    pub description: String,
    pub is_terminal: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub internal_tooltip: Option<String>,
}

impl From<&StatusLabelConfig> for LabelRes {
    fn from(cfg: &StatusLabelConfig) -> Self {
        Self {
            label: cfg.label.clone(),
            color: cfg.color.as_str().to_string(),
            icon: cfg.icon.clone(),
            description: cfg.description.clone(),
            is_terminal: cfg.is_terminal,
            internal_tooltip: cfg.internal_tooltip.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LabelsRes {
    pub processing: LabelRes,
    pub ownership: LabelRes,
    pub clinical: LabelRes,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medication: Option<LabelRes>,
}

impl From<&ResolvedLabels> for LabelsRes {
    fn from(labels: &ResolvedLabels) -> Self {
        Self {
            processing: (&labels.processing).into(),
            ownership: (&labels.ownership).into(),
            clinical: (&labels.clinical).into(),
            medication: labels.medication.as_ref().map(LabelRes::from),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CountdownRes {
    pub formatted: String,
    pub is_urgent: bool,
    pub is_overdue: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceRes {
    /// `GREEN`, `YELLOW` or `RED`.
    pub color: String,
    pub message: String,
    pub next_threshold: Option<String>,
    pub time_remaining_ms: u64,
    pub countdown: CountdownRes,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EscalationRes {
    pub requires: bool,
    pub escalate_to: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DecisionRes {
    pub submission_id: String,
    pub urgency_level: String,
    /// Advisory flag from upstream triage; independent of `escalation`.
    pub urgency_flag: String,
    pub labels: LabelsRes,
    pub compliance: ComplianceRes,
    pub escalation: EscalationRes,
    pub evaluated_at: String,
}

impl From<&TriageDecision> for DecisionRes {
    fn from(decision: &TriageDecision) -> Self {
        let compliance = &decision.compliance;
        Self {
            submission_id: decision.submission_id.to_string(),
            urgency_level: decision.urgency_level.as_str().to_string(),
            urgency_flag: decision.urgency_flag.as_str().to_string(),
            labels: (&decision.labels).into(),
            compliance: ComplianceRes {
                color: compliance.color.as_str().to_string(),
                message: compliance.message.clone(),
                next_threshold: compliance.next_threshold.map(rfc3339),
                time_remaining_ms: compliance.time_remaining_ms,
                countdown: CountdownRes {
                    formatted: compliance.countdown.formatted.clone(),
                    is_urgent: compliance.countdown.is_urgent,
                    is_overdue: compliance.countdown.is_overdue,
                },
            },
            escalation: EscalationRes {
                requires: decision.escalation.requires,
                escalate_to: decision
                    .escalation
                    .escalate_to
                    .iter()
                    .map(|role| role.as_str().to_string())
                    .collect(),
            },
            evaluated_at: rfc3339(decision.evaluated_at),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorRes {
    /// Machine-readable error kind, e.g. `config_not_found`.
    pub kind: String,
    pub message: String,
}

impl From<&TriageError> for ErrorRes {
    fn from(err: &TriageError) -> Self {
        Self {
            kind: err.kind().to_string(),
            message: err.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SweepFailureRes {
    pub submission_id: String,
    pub error: ErrorRes,
}

impl From<&SweepFailure> for SweepFailureRes {
    fn from(failure: &SweepFailure) -> Self {
        Self {
            submission_id: failure.submission_id.clone(),
            error: (&failure.error).into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SweepRes {
    pub sweep_id: String,
    pub evaluated_at: String,
    pub decisions: Vec<DecisionRes>,
    pub failures: Vec<SweepFailureRes>,
    pub not_evaluated: usize,
}

impl From<&SweepReport> for SweepRes {
    fn from(report: &SweepReport) -> Self {
        Self {
            sweep_id: report.sweep_id.to_string(),
            evaluated_at: rfc3339(report.evaluated_at),
            decisions: report.decisions.iter().map(DecisionRes::from).collect(),
            failures: report.failures.iter().map(SweepFailureRes::from).collect(),
            not_evaluated: report.not_evaluated,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TierThresholdRes {
    pub urgency_level: String,
    pub warn_offset_minutes: u32,
    pub breach_offset_minutes: u32,
    pub escalate_to: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ThresholdsRes {
    pub tiers: Vec<TierThresholdRes>,
}

impl From<&SlaThresholdTable> for ThresholdsRes {
    fn from(table: &SlaThresholdTable) -> Self {
        Self {
            tiers: UrgencyLevel::ALL
                .into_iter()
                .map(|level| {
                    let spec = table.thresholds_for(level);
                    TierThresholdRes {
                        urgency_level: level.as_str().to_string(),
                        warn_offset_minutes: spec.warn_offset_minutes,
                        breach_offset_minutes: spec.breach_offset_minutes,
                        escalate_to: spec
                            .escalate_to
                            .iter()
                            .map(|role| role.as_str().to_string())
                            .collect(),
                    }
                })
                .collect(),
        }
    }
}

//! Submission aggregator.
//!
//! [`TriageEngine`] owns the two read-only configuration tables and composes labels, compliance
//! and escalation into one [`TriageDecision`] per submission. It performs no I/O and keeps no
//! state between calls, so one engine can be shared by a UI poller and a batch sweep.

use crate::config::CoreConfig;
use crate::deadline::{self, ComplianceResult};
use crate::escalation::{self, EscalationVerdict};
use crate::submission::{Submission, SubmissionRecord, UrgencyFlag};
use crate::thresholds::{SlaThresholdSpec, SlaThresholdTable, UrgencyLevel};
use crate::TriageResult;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use triage_status::{ProcessingStatus, ResolvedLabels, StatusRegistry};
use triage_types::SubmissionId;

/// Everything the caller needs to render one submission in a triage queue.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TriageDecision {
    pub submission_id: SubmissionId,
    pub urgency_level: UrgencyLevel,
    /// Upstream advisory flag, reported as-is next to `escalation`.
    pub urgency_flag: UrgencyFlag,
    pub labels: ResolvedLabels,
    pub compliance: ComplianceResult,
    pub escalation: EscalationVerdict,
    pub evaluated_at: DateTime<Utc>,
}

/// Stateless triage engine over an immutable registry and threshold table.
#[derive(Clone, Debug)]
pub struct TriageEngine {
    registry: Arc<StatusRegistry>,
    thresholds: Arc<SlaThresholdTable>,
}

impl Default for TriageEngine {
    fn default() -> Self {
        Self::new(StatusRegistry::builtin(), SlaThresholdTable::default())
    }
}

impl TriageEngine {
    pub fn new(registry: StatusRegistry, thresholds: SlaThresholdTable) -> Self {
        Self {
            registry: Arc::new(registry),
            thresholds: Arc::new(thresholds),
        }
    }

    /// Loads the registry overlay and threshold table named by `cfg`.
    pub fn from_config(cfg: &CoreConfig) -> TriageResult<Self> {
        let registry = StatusRegistry::load(cfg.status_registry_path())?;
        let thresholds = SlaThresholdTable::load(cfg.sla_table_path())?;
        Ok(Self::new(registry, thresholds))
    }

    pub fn registry(&self) -> &StatusRegistry {
        &self.registry
    }

    pub fn thresholds(&self) -> &SlaThresholdTable {
        &self.thresholds
    }

    pub fn thresholds_for(&self, level: UrgencyLevel) -> &SlaThresholdSpec {
        self.thresholds.thresholds_for(level)
    }

    pub fn evaluate(
        &self,
        level: UrgencyLevel,
        submitted_at: DateTime<Utc>,
        last_updated_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> ComplianceResult {
        deadline::evaluate(&self.thresholds, level, submitted_at, last_updated_at, now)
    }

    pub fn decide(
        &self,
        processing_status: ProcessingStatus,
        level: UrgencyLevel,
        submitted_at: DateTime<Utc>,
        last_updated_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> TriageResult<EscalationVerdict> {
        escalation::decide(
            &self.registry,
            &self.thresholds,
            processing_status,
            level,
            submitted_at,
            last_updated_at,
            now,
        )
    }

    /// Composes the full decision for a validated submission at `now`.
    pub fn compose(&self, submission: &Submission, now: DateTime<Utc>) -> TriageResult<TriageDecision> {
        let labels = self.registry.labels_for(
            submission.processing_status,
            submission.review_ownership,
            submission.clinical_action_state,
            submission.medication_status,
        )?;

        let spec = self.thresholds_for(submission.urgency_level);
        let compliance = deadline::evaluate_with_spec(
            spec,
            deadline::anchor(submission.submitted_at, submission.last_updated_at),
            now,
        );
        let escalation = escalation::verdict(labels.processing.is_terminal, &compliance, spec);

        Ok(TriageDecision {
            submission_id: submission.id.clone(),
            urgency_level: submission.urgency_level,
            urgency_flag: submission.urgency_flag,
            labels,
            compliance,
            escalation,
            evaluated_at: now,
        })
    }

    /// Validates a store record and composes its decision.
    pub fn compose_record(
        &self,
        record: &SubmissionRecord,
        now: DateTime<Utc>,
    ) -> TriageResult<TriageDecision> {
        let submission = Submission::from_record(record)?;
        self.compose(&submission, now)
    }
}

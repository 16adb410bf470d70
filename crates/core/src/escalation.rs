//! Escalation policy.
//!
//! Escalation is strictly breach-triggered and tier-scoped:
//! - a submission whose processing status is terminal never escalates;
//! - otherwise escalation is required exactly when compliance is RED, and is routed to the
//!   roles configured for the submission's urgency tier.
//!
//! The upstream `urgency_flag` is advisory and plays no part here.

use crate::deadline::{self, ComplianceColor, ComplianceResult};
use crate::thresholds::{Role, SlaThresholdSpec, SlaThresholdTable, UrgencyLevel};
use crate::TriageResult;
use chrono::{DateTime, Utc};
use serde::Serialize;
use triage_status::{ProcessingStatus, StatusRegistry};

/// Computed escalation decision. Never persisted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EscalationVerdict {
    pub requires: bool,
    pub escalate_to: Vec<Role>,
}

impl EscalationVerdict {
    fn suppressed() -> Self {
        Self {
            requires: false,
            escalate_to: Vec::new(),
        }
    }
}

/// Decides escalation for a submission from its raw inputs.
pub fn decide(
    registry: &StatusRegistry,
    table: &SlaThresholdTable,
    processing_status: ProcessingStatus,
    level: UrgencyLevel,
    submitted_at: DateTime<Utc>,
    last_updated_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> TriageResult<EscalationVerdict> {
    let is_terminal = registry.is_terminal(processing_status)?;
    let compliance = deadline::evaluate(table, level, submitted_at, last_updated_at, now);
    Ok(verdict(is_terminal, &compliance, table.thresholds_for(level)))
}

/// Derives the verdict from an already computed compliance result.
pub(crate) fn verdict(
    is_terminal: bool,
    compliance: &ComplianceResult,
    spec: &SlaThresholdSpec,
) -> EscalationVerdict {
    if is_terminal {
        return EscalationVerdict::suppressed();
    }

    EscalationVerdict {
        requires: compliance.color == ComplianceColor::Red,
        escalate_to: spec.escalate_to.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap()
    }

    fn decide_at(
        status: ProcessingStatus,
        level: UrgencyLevel,
        now: DateTime<Utc>,
    ) -> EscalationVerdict {
        decide(
            &StatusRegistry::builtin(),
            &SlaThresholdTable::default(),
            status,
            level,
            t0(),
            Some(t0()),
            now,
        )
        .expect("builtin registry covers every status")
    }

    #[test]
    fn breached_emergency_escalates_to_manager_and_md() {
        let verdict = decide_at(
            ProcessingStatus::InReview,
            UrgencyLevel::Emergency,
            t0() + Duration::minutes(20),
        );
        assert!(verdict.requires);
        assert_eq!(verdict.escalate_to, vec![Role::PracticeManager, Role::Md]);
    }

    #[test]
    fn warning_does_not_escalate() {
        let verdict = decide_at(
            ProcessingStatus::Received,
            UrgencyLevel::Emergency,
            t0() + Duration::minutes(6),
        );
        assert!(!verdict.requires);
        assert_eq!(verdict.escalate_to, vec![Role::PracticeManager, Role::Md]);
    }

    #[test]
    fn resolved_routine_never_escalates() {
        let now = t0() + Duration::hours(200);
        let compliance = deadline::evaluate(
            &SlaThresholdTable::default(),
            UrgencyLevel::Routine,
            t0(),
            Some(t0()),
            now,
        );
        assert_eq!(compliance.color, ComplianceColor::Red);

        let verdict = decide_at(ProcessingStatus::Resolved, UrgencyLevel::Routine, now);
        assert!(!verdict.requires);
        assert!(verdict.escalate_to.is_empty());
    }

    #[test]
    fn terminal_statuses_suppress_for_all_times_and_tiers() {
        let registry = StatusRegistry::builtin();
        for status in ProcessingStatus::ALL {
            if !registry.is_terminal(status).unwrap() {
                continue;
            }
            for level in UrgencyLevel::ALL {
                for hours in [0, 1, 24, 24 * 30, 24 * 365 * 5] {
                    let verdict = decide_at(status, level, t0() + Duration::hours(hours));
                    assert!(!verdict.requires, "{status:?}/{level} escalated");
                }
            }
        }
    }

    #[test]
    fn breached_routine_requires_escalation_with_no_roles() {
        let verdict = decide_at(
            ProcessingStatus::AwaitingPatient,
            UrgencyLevel::Routine,
            t0() + Duration::hours(169),
        );
        assert!(verdict.requires);
        assert!(verdict.escalate_to.is_empty());
    }
}

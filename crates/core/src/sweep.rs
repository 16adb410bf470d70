//! Batch re-evaluation sweep.
//!
//! A sweep evaluates every record from the store at a single `now` to find newly breached
//! SLAs. Records are independent, so they are evaluated in parallel with no ordering
//! guarantee. A bad record is logged and skipped; only errors whose disposition is
//! [`ErrorDisposition::AbortSweep`] stop the sweep.
//!
//! Cancellation is cooperative: the token is checked before each record, and records not yet
//! started when it fires are counted as not evaluated. Partial completion is harmless since
//! nothing is persisted; those records are picked up on the next tick.

use crate::aggregator::{TriageDecision, TriageEngine};
use crate::error::ErrorDisposition;
use crate::store::SubmissionStore;
use crate::submission::SubmissionRecord;
use crate::{TriageError, TriageResult};
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// Shared cancellation signal checked between records.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Signal cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

/// A record that could not be evaluated.
#[derive(Debug)]
pub struct SweepFailure {
    /// Raw id as found in the store; may be blank for malformed records.
    pub submission_id: String,
    pub error: TriageError,
}

/// Outcome of one sweep.
#[derive(Debug)]
pub struct SweepReport {
    /// Correlation id for log lines belonging to this sweep.
    pub sweep_id: Uuid,
    pub evaluated_at: DateTime<Utc>,
    pub decisions: Vec<TriageDecision>,
    pub failures: Vec<SweepFailure>,
    /// Records skipped because cancellation fired first.
    pub not_evaluated: usize,
}

impl SweepReport {
    pub fn cancelled(&self) -> bool {
        self.not_evaluated > 0
    }

    /// Decisions whose escalation verdict requires action.
    pub fn escalations(&self) -> impl Iterator<Item = &TriageDecision> {
        self.decisions.iter().filter(|d| d.escalation.requires)
    }
}

enum Outcome {
    Decided(TriageDecision),
    Failed(SweepFailure),
    NotEvaluated,
}

/// Evaluates `records` at `now`.
///
/// # Errors
///
/// Returns the first error with [`ErrorDisposition::AbortSweep`]. Record-level errors are
/// collected into [`SweepReport::failures`] instead.
pub fn run_sweep(
    engine: &TriageEngine,
    records: &[SubmissionRecord],
    now: DateTime<Utc>,
    token: &CancellationToken,
) -> TriageResult<SweepReport> {
    sweep(engine, records, Vec::new(), now, token)
}

/// Lists the store and sweeps every record in it.
///
/// Records the store could not decode are reported in [`SweepReport::failures`] alongside
/// records that failed evaluation.
pub fn sweep_store(
    engine: &TriageEngine,
    store: &dyn SubmissionStore,
    now: DateTime<Utc>,
    token: &CancellationToken,
) -> TriageResult<SweepReport> {
    let mut records = Vec::new();
    let mut undecodable = Vec::new();
    for entry in store.list()? {
        match entry {
            Ok(record) => records.push(record),
            Err(failure) => undecodable.push(failure),
        }
    }
    sweep(engine, &records, undecodable, now, token)
}

fn sweep(
    engine: &TriageEngine,
    records: &[SubmissionRecord],
    undecodable: Vec<SweepFailure>,
    now: DateTime<Utc>,
    token: &CancellationToken,
) -> TriageResult<SweepReport> {
    let sweep_id = Uuid::new_v4();
    let span = tracing::info_span!(
        "sweep",
        %sweep_id,
        records = records.len() + undecodable.len()
    );
    let _guard = span.enter();

    let outcomes: Vec<Outcome> = records
        .par_iter()
        .map(|record| {
            if token.is_cancelled() {
                return Outcome::NotEvaluated;
            }
            match engine.compose_record(record, now) {
                Ok(decision) => Outcome::Decided(decision),
                Err(error) => Outcome::Failed(SweepFailure {
                    submission_id: record.id.clone(),
                    error,
                }),
            }
        })
        .collect();

    let outcomes = undecodable.into_iter().map(Outcome::Failed).chain(outcomes);

    let mut report = SweepReport {
        sweep_id,
        evaluated_at: now,
        decisions: Vec::new(),
        failures: Vec::new(),
        not_evaluated: 0,
    };

    for outcome in outcomes {
        match outcome {
            Outcome::Decided(decision) => report.decisions.push(decision),
            Outcome::NotEvaluated => report.not_evaluated += 1,
            Outcome::Failed(failure) => {
                if failure.error.disposition() == ErrorDisposition::AbortSweep {
                    tracing::error!(
                        submission_id = %failure.submission_id,
                        kind = failure.error.kind(),
                        error = %failure.error,
                        "aborting sweep"
                    );
                    return Err(failure.error);
                }
                tracing::warn!(
                    submission_id = %failure.submission_id,
                    kind = failure.error.kind(),
                    error = %failure.error,
                    "skipping submission"
                );
                report.failures.push(failure);
            }
        }
    }

    tracing::info!(
        evaluated = report.decisions.len(),
        escalations = report.escalations().count(),
        failures = report.failures.len(),
        not_evaluated = report.not_evaluated,
        "sweep finished"
    );

    Ok(report)
}

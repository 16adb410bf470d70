//! Deadline evaluation: SLA compliance colour, time remaining and countdown.
//!
//! The anchor is `last_updated_at` when it is later than `submitted_at`, otherwise
//! `submitted_at`: a staff update counts as progress and restarts the clock. Elapsed time is
//! measured from the anchor to the caller-supplied `now` and clamped at zero when the clock is
//! behind the anchor.
//!
//! Evaluation is a pure function of its arguments. Polling it every minute or once per batch
//! sweep yields identical results for identical inputs.

use crate::thresholds::{SlaThresholdSpec, SlaThresholdTable, UrgencyLevel};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::fmt;

/// SLA compliance colour, ordered from least to most severe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ComplianceColor {
    Green,
    Yellow,
    Red,
}

impl ComplianceColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Green => "GREEN",
            Self::Yellow => "YELLOW",
            Self::Red => "RED",
        }
    }
}

impl fmt::Display for ComplianceColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Live countdown, to hour and minute precision.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Countdown {
    /// `"Xh Ym remaining"`, or `"OVERDUE by Xh Ym"` once breached.
    pub formatted: String,
    /// Between the warn and breach boundaries.
    pub is_urgent: bool,
    pub is_overdue: bool,
}

/// Computed compliance state of one submission. Never persisted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceResult {
    pub color: ComplianceColor,
    pub message: String,
    /// The next boundary the submission will cross; `None` once breached.
    pub next_threshold: Option<DateTime<Utc>>,
    pub time_remaining_ms: u64,
    pub countdown: Countdown,
}

/// Timestamp elapsed time is measured from.
///
/// An update that predates submission is a caller data error; it is ignored rather than
/// failing the read path.
pub fn anchor(submitted_at: DateTime<Utc>, last_updated_at: Option<DateTime<Utc>>) -> DateTime<Utc> {
    match last_updated_at {
        Some(updated) if updated > submitted_at => updated,
        _ => submitted_at,
    }
}

/// Evaluates SLA compliance for a submission of the given urgency tier.
pub fn evaluate(
    table: &SlaThresholdTable,
    level: UrgencyLevel,
    submitted_at: DateTime<Utc>,
    last_updated_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> ComplianceResult {
    evaluate_with_spec(
        table.thresholds_for(level),
        anchor(submitted_at, last_updated_at),
        now,
    )
}

pub(crate) fn evaluate_with_spec(
    spec: &SlaThresholdSpec,
    anchor: DateTime<Utc>,
    now: DateTime<Utc>,
) -> ComplianceResult {
    let elapsed = (now - anchor).max(Duration::zero());
    let warn = spec.warn_offset();
    let breach = spec.breach_offset();

    let color = if elapsed >= breach {
        ComplianceColor::Red
    } else if elapsed >= warn {
        ComplianceColor::Yellow
    } else {
        ComplianceColor::Green
    };

    let next_threshold = match color {
        ComplianceColor::Green => Some(anchor + warn),
        ComplianceColor::Yellow => Some(anchor + breach),
        ComplianceColor::Red => None,
    };

    let remaining = (breach - elapsed).max(Duration::zero());
    let time_remaining_ms = u64::try_from(remaining.num_milliseconds()).unwrap_or(0);

    let countdown = if color == ComplianceColor::Red {
        Countdown {
            formatted: format!("OVERDUE by {}", hours_minutes(elapsed - breach)),
            is_urgent: false,
            is_overdue: true,
        }
    } else {
        Countdown {
            formatted: format!("{} remaining", hours_minutes(remaining)),
            is_urgent: color == ComplianceColor::Yellow,
            is_overdue: false,
        }
    };

    let message = match color {
        ComplianceColor::Green => format!("Within SLA ({})", countdown.formatted),
        ComplianceColor::Yellow => format!("Approaching SLA breach ({})", countdown.formatted),
        ComplianceColor::Red => format!("SLA breached ({})", countdown.formatted),
    };

    ComplianceResult {
        color,
        message,
        next_threshold,
        time_remaining_ms,
        countdown,
    }
}

/// Renders a non-negative duration as `Xh Ym`, flooring to the minute.
fn hours_minutes(duration: Duration) -> String {
    let minutes = duration.num_minutes().max(0);
    format!("{}h {}m", minutes / 60, minutes % 60)
}

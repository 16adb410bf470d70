//! SLA threshold table.
//!
//! One [`SlaThresholdSpec`] per urgency tier. The table is static configuration: it is loaded
//! once at startup (embedded defaults or a YAML file) and swapping it is the only supported way
//! to tune SLA policy. There are no per-submission overrides.

use crate::{TriageError, TriageResult};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Urgency tier of a submission. Immutable once set; selects all SLA math.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UrgencyLevel {
    Emergency,
    Urgent,
    Normal,
    Routine,
}

impl UrgencyLevel {
    /// Tiers ordered from strictest to most relaxed.
    pub const ALL: [Self; 4] = [Self::Emergency, Self::Urgent, Self::Normal, Self::Routine];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Emergency => "emergency",
            Self::Urgent => "urgent",
            Self::Normal => "normal",
            Self::Routine => "routine",
        }
    }
}

impl FromStr for UrgencyLevel {
    type Err = TriageError;

    /// Unknown tiers are a hard error: silently picking a tier could hide or manufacture an
    /// escalation.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|tier| tier.as_str() == s.trim())
            .ok_or_else(|| TriageError::UnknownUrgencyTier(s.to_owned()))
    }
}

impl fmt::Display for UrgencyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Staff role an escalation can be routed to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    PracticeManager,
    Md,
    Nurse,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PracticeManager => "practice_manager",
            Self::Md => "md",
            Self::Nurse => "nurse",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Warning and breach offsets for one urgency tier, measured from the anchor timestamp.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SlaThresholdSpec {
    pub warn_offset_minutes: u32,
    pub breach_offset_minutes: u32,
    #[serde(default)]
    pub escalate_to: Vec<Role>,
}

impl SlaThresholdSpec {
    pub fn new(warn_offset_minutes: u32, breach_offset_minutes: u32, escalate_to: Vec<Role>) -> Self {
        Self {
            warn_offset_minutes,
            breach_offset_minutes,
            escalate_to,
        }
    }

    pub fn warn_offset(&self) -> Duration {
        Duration::minutes(i64::from(self.warn_offset_minutes))
    }

    pub fn breach_offset(&self) -> Duration {
        Duration::minutes(i64::from(self.breach_offset_minutes))
    }
}

/// The per-tier SLA table.
///
/// Every tier is a required field, so a table that omits a tier cannot be constructed or
/// deserialized.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SlaThresholdTable {
    pub emergency: SlaThresholdSpec,
    pub urgent: SlaThresholdSpec,
    pub normal: SlaThresholdSpec,
    pub routine: SlaThresholdSpec,
}

impl Default for SlaThresholdTable {
    fn default() -> Self {
        use Role::*;

        Self {
            emergency: SlaThresholdSpec::new(5, 15, vec![PracticeManager, Md]),
            urgent: SlaThresholdSpec::new(30, 120, vec![PracticeManager]),
            normal: SlaThresholdSpec::new(8 * 60, 24 * 60, vec![Md]),
            routine: SlaThresholdSpec::new(72 * 60, 168 * 60, vec![]),
        }
    }
}

impl SlaThresholdTable {
    pub fn thresholds_for(&self, level: UrgencyLevel) -> &SlaThresholdSpec {
        match level {
            UrgencyLevel::Emergency => &self.emergency,
            UrgencyLevel::Urgent => &self.urgent,
            UrgencyLevel::Normal => &self.normal,
            UrgencyLevel::Routine => &self.routine,
        }
    }

    /// Parses and validates a table from YAML text.
    ///
    /// # Errors
    ///
    /// - [`TriageError::Translation`] with the failing path when the YAML does not match the
    ///   schema (missing tier, unknown key, unknown role).
    /// - [`TriageError::InvalidConfig`] when the offsets are inconsistent (see [`Self::validate`]).
    pub fn from_yaml(yaml_text: &str) -> TriageResult<Self> {
        let deserializer = serde_yaml::Deserializer::from_str(yaml_text);

        let table = match serde_path_to_error::deserialize::<_, SlaThresholdTable>(deserializer) {
            Ok(parsed) => parsed,
            Err(err) => {
                let path = err.path().to_string();
                let source = err.into_inner();
                let path = if path.is_empty() {
                    "<root>"
                } else {
                    path.as_str()
                };
                return Err(TriageError::Translation(format!(
                    "SLA threshold table schema mismatch at {path}: {source}"
                )));
            }
        };

        table.validate()?;
        Ok(table)
    }

    /// Loads the table from `path`, or the defaults when `path` is `None`.
    pub fn load(path: Option<&Path>) -> TriageResult<Self> {
        match path {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(TriageError::ConfigRead)?;
                tracing::info!(path = %path.display(), "loading SLA threshold table");
                Self::from_yaml(&text)
            }
            None => Ok(Self::default()),
        }
    }

    /// Checks that every tier has `0 < warn < breach`, and that breach offsets do not tighten
    /// as urgency decreases.
    pub fn validate(&self) -> TriageResult<()> {
        let mut previous: Option<(UrgencyLevel, u32)> = None;

        for level in UrgencyLevel::ALL {
            let spec = self.thresholds_for(level);
            if spec.warn_offset_minutes == 0 {
                return Err(TriageError::InvalidConfig(format!(
                    "{level}: warn_offset_minutes must be greater than zero"
                )));
            }
            if spec.warn_offset_minutes >= spec.breach_offset_minutes {
                return Err(TriageError::InvalidConfig(format!(
                    "{level}: warn_offset_minutes ({}) must be less than breach_offset_minutes ({})",
                    spec.warn_offset_minutes, spec.breach_offset_minutes
                )));
            }
            if let Some((stricter, stricter_breach)) = previous {
                if spec.breach_offset_minutes < stricter_breach {
                    return Err(TriageError::InvalidConfig(format!(
                        "{level}: breach_offset_minutes ({}) is stricter than {stricter} ({stricter_breach})",
                        spec.breach_offset_minutes
                    )));
                }
            }
            previous = Some((level, spec.breach_offset_minutes));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"emergency:
  warn_offset_minutes: 10
  breach_offset_minutes: 20
  escalate_to: [practice_manager, md]
urgent:
  warn_offset_minutes: 30
  breach_offset_minutes: 120
  escalate_to: [nurse]
normal:
  warn_offset_minutes: 480
  breach_offset_minutes: 1440
  escalate_to: [md]
routine:
  warn_offset_minutes: 4320
  breach_offset_minutes: 10080
"#;

    #[test]
    fn defaults_match_documented_table() {
        let table = SlaThresholdTable::default();
        table.validate().expect("defaults are valid");

        let emergency = table.thresholds_for(UrgencyLevel::Emergency);
        assert_eq!(emergency.warn_offset(), Duration::minutes(5));
        assert_eq!(emergency.breach_offset(), Duration::minutes(15));
        assert_eq!(emergency.escalate_to, vec![Role::PracticeManager, Role::Md]);

        let urgent = table.thresholds_for(UrgencyLevel::Urgent);
        assert_eq!(urgent.breach_offset(), Duration::hours(2));
        assert_eq!(urgent.escalate_to, vec![Role::PracticeManager]);

        let normal = table.thresholds_for(UrgencyLevel::Normal);
        assert_eq!(normal.warn_offset(), Duration::hours(8));
        assert_eq!(normal.breach_offset(), Duration::hours(24));

        let routine = table.thresholds_for(UrgencyLevel::Routine);
        assert_eq!(routine.breach_offset(), Duration::hours(168));
        assert!(routine.escalate_to.is_empty());
    }

    #[test]
    fn unknown_tier_is_a_hard_error() {
        let err = "asap".parse::<UrgencyLevel>().expect_err("unknown tier");
        assert!(matches!(err, TriageError::UnknownUrgencyTier(ref t) if t == "asap"));
        assert_eq!("urgent".parse::<UrgencyLevel>().unwrap(), UrgencyLevel::Urgent);
    }

    #[test]
    fn parses_yaml_table() {
        let table = SlaThresholdTable::from_yaml(SAMPLE).expect("valid table");
        assert_eq!(table.emergency.warn_offset_minutes, 10);
        assert_eq!(table.urgent.escalate_to, vec![Role::Nurse]);
        assert!(table.routine.escalate_to.is_empty());
    }

    #[test]
    fn yaml_missing_tier_reports_path() {
        let yaml = SAMPLE.split("routine:").next().unwrap();
        let err = SlaThresholdTable::from_yaml(yaml).expect_err("missing routine");
        match err {
            TriageError::Translation(msg) => assert!(msg.contains("routine"), "{msg}"),
            other => panic!("expected Translation error, got {other:?}"),
        }
    }

    #[test]
    fn yaml_unknown_role_reports_path() {
        let yaml = SAMPLE.replace("[nurse]", "[surgeon]");
        let err = SlaThresholdTable::from_yaml(&yaml).expect_err("unknown role");
        match err {
            TriageError::Translation(msg) => {
                assert!(msg.contains("urgent.escalate_to"), "{msg}");
            }
            other => panic!("expected Translation error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_warn_not_before_breach() {
        let yaml = SAMPLE.replace(
            "warn_offset_minutes: 30\n  breach_offset_minutes: 120",
            "warn_offset_minutes: 120\n  breach_offset_minutes: 120",
        );
        let err = SlaThresholdTable::from_yaml(&yaml).expect_err("warn == breach");
        assert!(matches!(err, TriageError::InvalidConfig(ref m) if m.starts_with("urgent")));
    }

    #[test]
    fn rejects_relaxed_tier_stricter_than_urgent_tier() {
        let mut table = SlaThresholdTable::default();
        table.normal = SlaThresholdSpec::new(10, 60, vec![Role::Md]);
        let err = table.validate().expect_err("normal stricter than urgent");
        assert!(matches!(err, TriageError::InvalidConfig(ref m) if m.contains("stricter than urgent")));
    }

    #[test]
    fn rejects_zero_warn_offset() {
        let mut table = SlaThresholdTable::default();
        table.emergency.warn_offset_minutes = 0;
        assert!(table.validate().is_err());
    }
}

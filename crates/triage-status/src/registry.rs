//! The read-only status registry.
//!
//! Built once at startup from the embedded defaults, optionally overlaid by a YAML document of
//! the form:
//!
//! ```yaml
//! processing_status:
//!   awaiting_patient:
//!     label: Waiting on patient
//!     color: purple
//!     icon: reply
//!     description: We need more information from you.
//!     is_terminal: false
//! medication_status: {}
//! ```
//!
//! Only the entries present in the overlay are replaced. Unknown axes, unknown axis values and
//! unknown config keys are all rejected.

use crate::axes::{Axis, ClinicalActionState, MedicationStatus, ProcessingStatus, ReviewOwnership};
use crate::labels::{
    default_clinical, default_medication, default_ownership, default_processing,
    StatusLabelConfig,
};
use crate::{StatusError, StatusResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Label configs resolved for one submission.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ResolvedLabels {
    pub processing: StatusLabelConfig,
    pub ownership: StatusLabelConfig,
    pub clinical: StatusLabelConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medication: Option<StatusLabelConfig>,
}

/// Immutable lookup from axis values to their [`StatusLabelConfig`].
#[derive(Clone, Debug)]
pub struct StatusRegistry {
    processing: HashMap<ProcessingStatus, StatusLabelConfig>,
    ownership: HashMap<ReviewOwnership, StatusLabelConfig>,
    clinical: HashMap<ClinicalActionState, StatusLabelConfig>,
    medication: HashMap<MedicationStatus, StatusLabelConfig>,
}

impl Default for StatusRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl StatusRegistry {
    /// Registry populated with the embedded defaults for every axis value.
    pub fn builtin() -> Self {
        Self {
            processing: ProcessingStatus::ALL
                .into_iter()
                .map(|v| (v, default_processing(v)))
                .collect(),
            ownership: ReviewOwnership::ALL
                .into_iter()
                .map(|v| (v, default_ownership(v)))
                .collect(),
            clinical: ClinicalActionState::ALL
                .into_iter()
                .map(|v| (v, default_clinical(v)))
                .collect(),
            medication: MedicationStatus::ALL
                .into_iter()
                .map(|v| (v, default_medication(v)))
                .collect(),
        }
    }

    /// Builds a registry from the defaults overlaid with the given YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`StatusError::Translation`] with the failing path (for example
    /// `processing_status.archived`) when the overlay does not match the schema.
    pub fn from_overlay_yaml(yaml_text: &str) -> StatusResult<Self> {
        let deserializer = serde_yaml::Deserializer::from_str(yaml_text);

        let wire = match serde_path_to_error::deserialize::<_, RegistryOverlayWire>(deserializer) {
            Ok(parsed) => parsed,
            Err(err) => {
                let path = err.path().to_string();
                let source = err.into_inner();
                let path = if path.is_empty() {
                    "<root>"
                } else {
                    path.as_str()
                };
                return Err(StatusError::Translation(format!(
                    "Status registry overlay schema mismatch at {path}: {source}"
                )));
            }
        };

        let mut registry = Self::builtin();
        let overridden = wire.len();
        registry.processing.extend(wire.processing_status);
        registry.ownership.extend(wire.review_ownership);
        registry.clinical.extend(wire.clinical_action_state);
        registry.medication.extend(wire.medication_status);

        tracing::debug!(overridden, "applied status registry overlay");
        Ok(registry)
    }

    /// Loads the overlay file at `path`, or the builtin registry when `path` is `None`.
    pub fn load(path: Option<&Path>) -> StatusResult<Self> {
        match path {
            Some(path) => {
                let text = std::fs::read_to_string(path)?;
                tracing::info!(path = %path.display(), "loading status registry overlay");
                Self::from_overlay_yaml(&text)
            }
            None => Ok(Self::builtin()),
        }
    }

    pub fn processing(&self, status: ProcessingStatus) -> StatusResult<&StatusLabelConfig> {
        self.processing
            .get(&status)
            .ok_or_else(|| missing(Axis::ProcessingStatus, status.as_str()))
    }

    pub fn ownership(&self, owner: ReviewOwnership) -> StatusResult<&StatusLabelConfig> {
        self.ownership
            .get(&owner)
            .ok_or_else(|| missing(Axis::ReviewOwnership, owner.as_str()))
    }

    pub fn clinical(&self, state: ClinicalActionState) -> StatusResult<&StatusLabelConfig> {
        self.clinical
            .get(&state)
            .ok_or_else(|| missing(Axis::ClinicalActionState, state.as_str()))
    }

    pub fn medication(&self, status: MedicationStatus) -> StatusResult<&StatusLabelConfig> {
        self.medication
            .get(&status)
            .ok_or_else(|| missing(Axis::MedicationStatus, status.as_str()))
    }

    /// Whether the processing status ends the SLA countdown.
    ///
    /// This is the only place terminality is derived; escalation consults it and nothing else.
    pub fn is_terminal(&self, status: ProcessingStatus) -> StatusResult<bool> {
        Ok(self.processing(status)?.is_terminal)
    }

    /// Resolves the label configs for a typed set of axis values.
    pub fn labels_for(
        &self,
        processing: ProcessingStatus,
        ownership: ReviewOwnership,
        clinical: ClinicalActionState,
        medication: Option<MedicationStatus>,
    ) -> StatusResult<ResolvedLabels> {
        Ok(ResolvedLabels {
            processing: self.processing(processing)?.clone(),
            ownership: self.ownership(ownership)?.clone(),
            clinical: self.clinical(clinical)?.clone(),
            medication: medication
                .map(|m| self.medication(m).cloned())
                .transpose()?,
        })
    }

    /// Resolves label configs from raw wire values.
    ///
    /// # Errors
    ///
    /// Returns [`StatusError::ConfigNotFound`] naming the axis and value of the first unknown
    /// value encountered.
    pub fn resolve_labels(
        &self,
        processing: &str,
        ownership: &str,
        clinical: &str,
        medication: Option<&str>,
    ) -> StatusResult<ResolvedLabels> {
        self.labels_for(
            processing.parse()?,
            ownership.parse()?,
            clinical.parse()?,
            medication.map(str::parse::<MedicationStatus>).transpose()?,
        )
    }
}

fn missing(axis: Axis, value: &str) -> StatusError {
    StatusError::ConfigNotFound {
        axis,
        value: value.to_owned(),
    }
}

// ============================================================================
// Wire types (internal)
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RegistryOverlayWire {
    #[serde(default)]
    processing_status: BTreeMap<ProcessingStatus, StatusLabelConfig>,
    #[serde(default)]
    review_ownership: BTreeMap<ReviewOwnership, StatusLabelConfig>,
    #[serde(default)]
    clinical_action_state: BTreeMap<ClinicalActionState, StatusLabelConfig>,
    #[serde(default)]
    medication_status: BTreeMap<MedicationStatus, StatusLabelConfig>,
}

impl RegistryOverlayWire {
    fn len(&self) -> usize {
        self.processing_status.len()
            + self.review_ownership.len()
            + self.clinical_action_state.len()
            + self.medication_status.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LabelColor;
    use std::io::Write;

    #[test]
    fn resolves_all_four_axes() {
        let registry = StatusRegistry::builtin();
        let labels = registry
            .resolve_labels("in_review", "md_review", "pending", Some("pending_review"))
            .expect("known values");

        assert_eq!(labels.processing.label, "In review");
        assert_eq!(labels.ownership.label, "Doctor review");
        assert_eq!(labels.clinical.color, LabelColor::Yellow);
        assert_eq!(
            labels.medication.expect("medication present").label,
            "Pending prescriber review"
        );
    }

    #[test]
    fn medication_is_optional() {
        let labels = StatusRegistry::builtin()
            .resolve_labels("received", "unassigned", "none_required", None)
            .expect("known values");
        assert!(labels.medication.is_none());
    }

    #[test]
    fn unknown_value_fails_instead_of_defaulting() {
        let err = StatusRegistry::builtin()
            .resolve_labels("received", "surgeon_review", "pending", None)
            .expect_err("unknown ownership");
        match err {
            StatusError::ConfigNotFound { axis, value } => {
                assert_eq!(axis, Axis::ReviewOwnership);
                assert_eq!(value, "surgeon_review");
            }
            other => panic!("expected ConfigNotFound, got {other:?}"),
        }

        let err = StatusRegistry::builtin()
            .resolve_labels("received", "unassigned", "pending", Some("refilled"))
            .expect_err("unknown medication");
        assert!(matches!(
            err,
            StatusError::ConfigNotFound {
                axis: Axis::MedicationStatus,
                ..
            }
        ));
    }

    #[test]
    fn terminality_comes_from_processing_config() {
        let registry = StatusRegistry::builtin();
        assert!(registry.is_terminal(ProcessingStatus::Resolved).unwrap());
        assert!(registry.is_terminal(ProcessingStatus::Cancelled).unwrap());
        assert!(!registry.is_terminal(ProcessingStatus::Escalated).unwrap());
    }

    #[test]
    fn overlay_replaces_only_listed_entries() {
        let overlay = r#"processing_status:
  awaiting_patient:
    label: Waiting on patient
    color: purple
    icon: reply
    description: We need more information from you.
    is_terminal: false
"#;
        let registry = StatusRegistry::from_overlay_yaml(overlay).expect("valid overlay");
        assert_eq!(
            registry
                .processing(ProcessingStatus::AwaitingPatient)
                .unwrap()
                .label,
            "Waiting on patient"
        );
        assert_eq!(
            registry.processing(ProcessingStatus::Received).unwrap(),
            StatusRegistry::builtin()
                .processing(ProcessingStatus::Received)
                .unwrap()
        );
    }

    #[test]
    fn overlay_rejects_unknown_axis_value() {
        let overlay = r#"processing_status:
  archived:
    label: Archived
    color: gray
    icon: archive
    description: gone
    is_terminal: true
"#;
        let err = StatusRegistry::from_overlay_yaml(overlay).expect_err("unknown value");
        match err {
            StatusError::Translation(msg) => assert!(msg.contains("archived"), "{msg}"),
            other => panic!("expected Translation error, got {other:?}"),
        }
    }

    #[test]
    fn overlay_rejects_unknown_config_key() {
        let overlay = r#"review_ownership:
  unassigned:
    label: Queue
    color: gray
    icon: inbox
    description: shared queue
    is_terminal: false
    priority: 3
"#;
        let err = StatusRegistry::from_overlay_yaml(overlay).expect_err("unknown key");
        match err {
            StatusError::Translation(msg) => {
                assert!(msg.contains("review_ownership"), "{msg}");
                assert!(msg.contains("priority"), "{msg}");
            }
            other => panic!("expected Translation error, got {other:?}"),
        }
    }

    #[test]
    fn overlay_rejects_unknown_colour() {
        let overlay = r#"clinical_action_state:
  pending:
    label: Pending
    color: orange
    icon: clock
    description: pending
    is_terminal: false
"#;
        assert!(StatusRegistry::from_overlay_yaml(overlay).is_err());
    }

    #[test]
    fn load_reads_overlay_from_disk() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(
            file,
            "medication_status:\n  approved:\n    label: OK'd\n    color: green\n    icon: check\n    description: approved\n    is_terminal: true"
        )
        .expect("write overlay");

        let registry = StatusRegistry::load(Some(file.path())).expect("load overlay");
        let approved = registry.medication(MedicationStatus::Approved).unwrap();
        assert_eq!(approved.label, "OK'd");
        assert!(approved.is_terminal);

        let builtin = StatusRegistry::load(None).expect("builtin");
        assert!(!builtin.medication(MedicationStatus::Approved).unwrap().is_terminal);
    }
}

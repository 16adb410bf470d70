//! Label configuration and the embedded defaults for every axis value.
//!
//! Defaults are written as exhaustive `match` expressions: adding an axis value without a label
//! is a compile error.

use crate::axes::{ClinicalActionState, MedicationStatus, ProcessingStatus, ReviewOwnership};
use serde::{Deserialize, Serialize};

/// Badge colour used when rendering a status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelColor {
    Blue,
    Yellow,
    Green,
    Red,
    Gray,
    Purple,
}

impl LabelColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blue => "blue",
            Self::Yellow => "yellow",
            Self::Green => "green",
            Self::Red => "red",
            Self::Gray => "gray",
            Self::Purple => "purple",
        }
    }
}

/// Display and semantic configuration for one axis value.
///
/// Read from YAML with snake_case keys; serialized camelCase like the rest of the JSON output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"), deny_unknown_fields)]
pub struct StatusLabelConfig {
    /// Short human-readable label.
    pub label: String,
    pub color: LabelColor,
    /// Icon name understood by the rendering layer.
    pub icon: String,
    pub description: String,
    /// No further SLA countdown applies once a submission reaches this value.
    pub is_terminal: bool,
    /// Staff-only annotation; never shown to patients.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_tooltip: Option<String>,
}

fn config(
    label: &str,
    color: LabelColor,
    icon: &str,
    description: &str,
    is_terminal: bool,
    internal_tooltip: Option<&str>,
) -> StatusLabelConfig {
    StatusLabelConfig {
        label: label.to_owned(),
        color,
        icon: icon.to_owned(),
        description: description.to_owned(),
        is_terminal,
        internal_tooltip: internal_tooltip.map(str::to_owned),
    }
}

use LabelColor::*;

pub(crate) fn default_processing(status: ProcessingStatus) -> StatusLabelConfig {
    match status {
        ProcessingStatus::Received => config(
            "Received",
            Blue,
            "inbox",
            "Your submission has been received by the practice.",
            false,
            Some("Not yet opened by any staff member"),
        ),
        ProcessingStatus::InReview => config(
            "In review",
            Yellow,
            "eye",
            "A member of the care team is reviewing your submission.",
            false,
            None,
        ),
        ProcessingStatus::AwaitingPatient => config(
            "Awaiting your reply",
            Purple,
            "reply",
            "The care team needs more information from you.",
            false,
            Some("Clock keeps running; chase the patient if the SLA is at risk"),
        ),
        ProcessingStatus::InProgress => config(
            "In progress",
            Blue,
            "loader",
            "The care team is working on your request.",
            false,
            None,
        ),
        ProcessingStatus::Escalated => config(
            "Escalated",
            Red,
            "alert-triangle",
            "Your submission has been passed to a senior member of the care team.",
            false,
            Some("Manually escalated by staff"),
        ),
        ProcessingStatus::Resolved => config(
            "Resolved",
            Green,
            "check-circle",
            "Your submission has been dealt with.",
            true,
            None,
        ),
        ProcessingStatus::Closed => config(
            "Closed",
            Gray,
            "archive",
            "This submission is closed.",
            true,
            Some("Closed without clinical action"),
        ),
        ProcessingStatus::Cancelled => config(
            "Cancelled",
            Gray,
            "x-circle",
            "This submission was cancelled.",
            true,
            None,
        ),
    }
}

pub(crate) fn default_ownership(owner: ReviewOwnership) -> StatusLabelConfig {
    match owner {
        ReviewOwnership::Unassigned => config(
            "Awaiting assignment",
            Gray,
            "user-x",
            "Waiting to be picked up by the care team.",
            false,
            Some("No owner; appears in the shared queue"),
        ),
        ReviewOwnership::NurseReview => config(
            "Nurse review",
            Blue,
            "user",
            "A nurse is reviewing your submission.",
            false,
            None,
        ),
        ReviewOwnership::MdReview => config(
            "Doctor review",
            Purple,
            "stethoscope",
            "A doctor is reviewing your submission.",
            false,
            None,
        ),
        ReviewOwnership::PracticeManagerReview => config(
            "Practice manager review",
            Yellow,
            "briefcase",
            "The practice manager is reviewing your submission.",
            false,
            Some("Usually follows an SLA breach"),
        ),
        ReviewOwnership::AdminReview => config(
            "Admin review",
            Blue,
            "clipboard",
            "The admin team is processing your submission.",
            false,
            None,
        ),
        ReviewOwnership::Completed => config(
            "Review complete",
            Green,
            "user-check",
            "Review of your submission is complete.",
            true,
            None,
        ),
    }
}

pub(crate) fn default_clinical(state: ClinicalActionState) -> StatusLabelConfig {
    match state {
        ClinicalActionState::NoneRequired => config(
            "No action needed",
            Gray,
            "minus-circle",
            "No clinical follow-up is needed.",
            true,
            None,
        ),
        ClinicalActionState::Pending => config(
            "Action pending",
            Yellow,
            "clock",
            "A follow-up action is being decided.",
            false,
            None,
        ),
        ClinicalActionState::Ordered => config(
            "Ordered",
            Blue,
            "file-plus",
            "A test or referral has been ordered.",
            false,
            Some("Check the order was transmitted"),
        ),
        ClinicalActionState::Scheduled => config(
            "Scheduled",
            Purple,
            "calendar",
            "An appointment has been booked.",
            false,
            None,
        ),
        ClinicalActionState::Completed => config(
            "Action complete",
            Green,
            "check",
            "The follow-up action is complete.",
            true,
            None,
        ),
        ClinicalActionState::Declined => config(
            "Declined",
            Red,
            "slash",
            "The follow-up action was declined.",
            true,
            Some("Record the reason in the patient notes"),
        ),
    }
}

pub(crate) fn default_medication(status: MedicationStatus) -> StatusLabelConfig {
    match status {
        MedicationStatus::Requested => config(
            "Requested",
            Blue,
            "pill",
            "Your medication request has been received.",
            false,
            None,
        ),
        MedicationStatus::PendingReview => config(
            "Pending prescriber review",
            Yellow,
            "hourglass",
            "A prescriber needs to review your request.",
            false,
            Some("Needs a prescriber signature"),
        ),
        MedicationStatus::Approved => config(
            "Approved",
            Green,
            "thumbs-up",
            "Your request has been approved.",
            false,
            Some("Approved but not yet sent to pharmacy"),
        ),
        MedicationStatus::SentToPharmacy => config(
            "Sent to pharmacy",
            Green,
            "send",
            "Your prescription has been sent to your pharmacy.",
            true,
            None,
        ),
        MedicationStatus::Denied => config(
            "Not approved",
            Red,
            "x-octagon",
            "Your request was not approved. The practice will contact you.",
            true,
            None,
        ),
        MedicationStatus::Discontinued => config(
            "Discontinued",
            Gray,
            "slash",
            "This medication has been discontinued.",
            true,
            None,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn processing_terminal_set_is_resolved_closed_cancelled() {
        let terminal: Vec<_> = ProcessingStatus::ALL
            .into_iter()
            .filter(|s| default_processing(*s).is_terminal)
            .collect();
        assert_eq!(
            terminal,
            vec![
                ProcessingStatus::Resolved,
                ProcessingStatus::Closed,
                ProcessingStatus::Cancelled
            ]
        );
    }

    #[test]
    fn every_default_has_label_and_icon() {
        let configs = ProcessingStatus::ALL
            .into_iter()
            .map(default_processing)
            .chain(ReviewOwnership::ALL.into_iter().map(default_ownership))
            .chain(ClinicalActionState::ALL.into_iter().map(default_clinical))
            .chain(MedicationStatus::ALL.into_iter().map(default_medication));

        for cfg in configs {
            assert!(!cfg.label.trim().is_empty());
            assert!(!cfg.icon.trim().is_empty());
            assert!(!cfg.description.trim().is_empty());
        }
    }

    #[test]
    fn internal_tooltip_is_omitted_when_absent() {
        let yaml = serde_yaml::to_string(&default_processing(ProcessingStatus::Resolved))
            .expect("serialize");
        assert!(!yaml.contains("internalTooltip"));

        let yaml = serde_yaml::to_string(&default_processing(ProcessingStatus::Closed))
            .expect("serialize");
        assert!(yaml.contains("internalTooltip"));
    }

    #[test]
    fn reads_snake_case_and_writes_camel_case() {
        let cfg: StatusLabelConfig = serde_yaml::from_str(
            "label: Held\ncolor: gray\nicon: pause\ndescription: On hold.\nis_terminal: true\n",
        )
        .expect("snake_case keys");
        assert!(cfg.is_terminal);

        let json = serde_json::to_value(&cfg).expect("serialize");
        assert_eq!(json["isTerminal"], true);
        assert!(json.get("is_terminal").is_none());
    }
}

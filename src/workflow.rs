//! Document workflow state machine.
//!
//! Four statuses: `pending`, `in-review`, `referred`, `completed`. Any
//! status may follow any other; `completed` is deliberately not terminal,
//! matching how the routing screens behave (a completed document can be
//! reopened by marking it pending). What a given actor may do is decided
//! entirely by the permission table; the machine itself only validates the
//! target status and describes the change for the trail.

use std::str::FromStr;

use crate::models::enums::DocumentStatus;

/// A validated status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: DocumentStatus,
    pub to: DocumentStatus,
}

impl Transition {
    pub fn new(from: DocumentStatus, to: DocumentStatus) -> Self {
        Self { from, to }
    }

    /// Trail wording for this change, using display labels.
    pub fn detail(&self) -> String {
        format!(
            "Status changed from '{}' to '{}'",
            self.from.label(),
            self.to.label()
        )
    }
}

/// Parse a requested target status. `None` for anything outside the four
/// workflow statuses; the caller reports that as an invalid-status error.
pub fn parse_target_status(raw: &str) -> Option<DocumentStatus> {
    DocumentStatus::from_str(raw).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_four_statuses() {
        assert_eq!(parse_target_status("pending"), Some(DocumentStatus::Pending));
        assert_eq!(parse_target_status("in-review"), Some(DocumentStatus::InReview));
        assert_eq!(parse_target_status("referred"), Some(DocumentStatus::Referred));
        assert_eq!(parse_target_status("completed"), Some(DocumentStatus::Completed));
    }

    #[test]
    fn rejects_unknown_statuses() {
        assert_eq!(parse_target_status("archived"), None);
        assert_eq!(parse_target_status("In Review"), None);
        assert_eq!(parse_target_status(""), None);
    }

    #[test]
    fn detail_uses_display_labels() {
        let transition = Transition::new(DocumentStatus::Pending, DocumentStatus::InReview);
        assert_eq!(transition.detail(), "Status changed from 'Pending' to 'In Review'");
    }

    #[test]
    fn completed_to_pending_is_a_valid_transition() {
        // No terminal state: reopening a completed document is expressible.
        let transition = Transition::new(DocumentStatus::Completed, DocumentStatus::Pending);
        assert_eq!(transition.detail(), "Status changed from 'Completed' to 'Pending'");
    }
}

//! Role-based permission evaluator.
//!
//! One authoritative table, default-deny:
//!
//! | role     | upload | refer | comment | change-status  | view |
//! |----------|--------|-------|---------|----------------|------|
//! | admin    | yes    | yes   | yes     | yes            | yes  |
//! | sender   | yes    | yes   | yes     | yes (own docs) | yes  |
//! | reviewer | no     | yes   | yes     | yes            | yes  |
//! | observer | no     | no    | yes     | no             | yes  |
//!
//! The evaluator is a pure lookup with no stored state and no side effects.
//! Anything the table does not explicitly allow is denied.

use crate::models::enums::UserRole;

// ═══════════════════════════════════════════════════════════
// Types
// ═══════════════════════════════════════════════════════════

/// Actions a user can attempt against a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Upload,
    Refer,
    Comment,
    ChangeStatus,
    View,
}

impl Action {
    /// Wire/audit representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Upload => "upload",
            Self::Refer => "refer",
            Self::Comment => "comment",
            Self::ChangeStatus => "change-status",
            Self::View => "view",
        }
    }
}

/// Why access was granted (or denied).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessReason {
    /// The role's table row allows this action outright.
    RoleGrant,
    /// Allowed because the actor owns the document (sender changing the
    /// status of their own upload).
    OwnerGrant,
    /// No matching rule; access denied.
    Denied,
}

/// Result of a permission check.
#[derive(Debug, Clone, Copy)]
pub struct AccessDecision {
    pub allowed: bool,
    pub reason: AccessReason,
}

impl AccessDecision {
    fn allow(reason: AccessReason) -> Self {
        Self {
            allowed: true,
            reason,
        }
    }

    fn deny() -> Self {
        Self {
            allowed: false,
            reason: AccessReason::Denied,
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Evaluation
// ═══════════════════════════════════════════════════════════

/// Evaluate the table for (role, action). `owns_document` is the ownership
/// flag consulted only where a row is qualified, currently the sender's
/// `change-status` cell.
pub fn evaluate(role: UserRole, action: Action, owns_document: bool) -> AccessDecision {
    use Action::*;
    use UserRole::*;

    match (role, action) {
        // Every role may view and comment.
        (_, View) | (_, Comment) => AccessDecision::allow(AccessReason::RoleGrant),

        (Admin, _) => AccessDecision::allow(AccessReason::RoleGrant),

        (Sender, Upload) | (Sender, Refer) => AccessDecision::allow(AccessReason::RoleGrant),
        (Sender, ChangeStatus) if owns_document => {
            AccessDecision::allow(AccessReason::OwnerGrant)
        }

        (Reviewer, Refer) | (Reviewer, ChangeStatus) => {
            AccessDecision::allow(AccessReason::RoleGrant)
        }

        // Everything else, including all observer mutations, is denied.
        _ => AccessDecision::deny(),
    }
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════

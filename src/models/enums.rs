//! Closed status and channel enums shared by the domain models

use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

// ---------------------------------------------------------------------------
// WalkInStatus
// ---------------------------------------------------------------------------

/// Walk-in request lifecycle.
///
/// ```text
/// requested ──> approved ──┐
///     │                    ├──> completed
///     ├──────> modified ───┘
///     └──────> rejected
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[sqlx(type_name = "walkin_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum WalkInStatus {
    Requested,
    Approved,
    Modified,
    Rejected,
    Completed,
}

impl WalkInStatus {
    /// Statuses reachable in one step from `self`
    pub fn successors(self) -> &'static [WalkInStatus] {
        use WalkInStatus::*;
        match self {
            Requested => &[Approved, Modified, Rejected],
            Approved | Modified => &[Completed],
            Rejected | Completed => &[],
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, WalkInStatus::Rejected | WalkInStatus::Completed)
    }

    pub fn can_transition_to(self, target: WalkInStatus) -> bool {
        self.successors().contains(&target)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WalkInStatus::Requested => "requested",
            WalkInStatus::Approved => "approved",
            WalkInStatus::Modified => "modified",
            WalkInStatus::Rejected => "rejected",
            WalkInStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for WalkInStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// CommunicationType
// ---------------------------------------------------------------------------

/// Delivery channel of a bulk communication
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[sqlx(type_name = "communication_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CommunicationType {
    #[default]
    Email,
}

// ---------------------------------------------------------------------------
// CommunicationStatus
// ---------------------------------------------------------------------------

/// Aggregate delivery outcome of a bulk communication
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[sqlx(type_name = "communication_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CommunicationStatus {
    /// Also the optimistic value before any outcome is recorded
    #[default]
    Sent,
    Partial,
    Failed,
}

impl CommunicationStatus {
    /// Derive the status from delivery counts. Callers check the counts
    /// against the recipient total first.
    pub fn derive(successful: i32, failed: i32) -> Self {
        if failed == 0 {
            CommunicationStatus::Sent
        } else if successful == 0 {
            CommunicationStatus::Failed
        } else {
            CommunicationStatus::Partial
        }
    }
}

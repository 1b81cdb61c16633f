//! Workflow, activity, and card presentation statuses.

use super::ParseStatusError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Workflow status of a single task.
///
/// Every status may move to any other and none is terminal, so a finished
/// task can be reopened. The declaration order is the board's default
/// column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    /// Work has not started.
    Todo,
    /// Work is underway.
    InProgress,
    /// Work cannot continue until something external changes.
    Blocked,
    /// Work is waiting for review.
    Review,
    /// Work is finished.
    Done,
}

impl WorkflowStatus {
    /// All statuses in default column order.
    pub const ALL: [Self; 5] = [
        Self::Todo,
        Self::InProgress,
        Self::Blocked,
        Self::Review,
        Self::Done,
    ];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in_progress",
            Self::Blocked => "blocked",
            Self::Review => "review",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for WorkflowStatus {
    type Error = ParseStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "todo" => Ok(Self::Todo),
            "in_progress" => Ok(Self::InProgress),
            "blocked" => Ok(Self::Blocked),
            "review" => Ok(Self::Review),
            "done" => Ok(Self::Done),
            _ => Err(ParseStatusError::new("workflow status", value)),
        }
    }
}

/// Rolled-up status of a parent activity.
///
/// This is a coarser vocabulary than [`WorkflowStatus`]: anything under way
/// collapses into [`ActivityStatus::Progress`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityStatus {
    /// Nothing has started.
    #[default]
    Todo,
    /// At least one child is under way or finished.
    Progress,
    /// At least one child is blocked.
    Blocked,
    /// Every child is finished.
    Done,
}

impl ActivityStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::Progress => "progress",
            Self::Blocked => "blocked",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for ActivityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ActivityStatus {
    type Error = ParseStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "todo" => Ok(Self::Todo),
            "progress" => Ok(Self::Progress),
            "blocked" => Ok(Self::Blocked),
            "done" => Ok(Self::Done),
            _ => Err(ParseStatusError::new("activity status", value)),
        }
    }
}

/// Presentation-only marker carried on a card.
///
/// It is independent of both the task's workflow status and the column the
/// card sits in; the engine stores it and never derives anything from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubStatus {
    /// Shown as still being worked on.
    #[default]
    InProgress,
    /// Shown as finished within its column.
    Done,
}

impl SubStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InProgress => "in_progress",
            Self::Done => "done",
        }
    }
}

impl TryFrom<&str> for SubStatus {
    type Error = ParseStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "in_progress" => Ok(Self::InProgress),
            "done" => Ok(Self::Done),
            _ => Err(ParseStatusError::new("sub-status", value)),
        }
    }
}

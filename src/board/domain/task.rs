//! Task record: the authoritative source for status and order.

use super::{ParentGroupId, ParseStatusError, TaskId, TaskName, WorkflowStatus};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Task priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    /// Can wait.
    Low,
    /// Normal priority.
    #[default]
    Medium,
    /// Should be picked up soon.
    High,
    /// Needs attention now.
    Urgent,
}

impl TaskPriority {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TaskPriority {
    type Error = ParseStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "urgent" => Ok(Self::Urgent),
            _ => Err(ParseStatusError::new("priority", value)),
        }
    }
}

/// Task aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    parent_group_id: ParentGroupId,
    name: TaskName,
    status: WorkflowStatus,
    order_key: u32,
    category: Option<String>,
    priority: TaskPriority,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Owning parent group.
    pub parent_group_id: ParentGroupId,
    /// Persisted name.
    pub name: TaskName,
    /// Persisted workflow status.
    pub status: WorkflowStatus,
    /// Persisted order within the status group.
    pub order_key: u32,
    /// Persisted category, if any.
    pub category: Option<String>,
    /// Persisted priority.
    pub priority: TaskPriority,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a new task in [`WorkflowStatus::Todo`] at the given order key.
    #[must_use]
    pub fn new(
        parent_group_id: ParentGroupId,
        name: TaskName,
        order_key: u32,
        clock: &impl Clock,
    ) -> Self {
        let timestamp = clock.utc();
        Self {
            id: TaskId::new(),
            parent_group_id,
            name,
            status: WorkflowStatus::Todo,
            order_key,
            category: None,
            priority: TaskPriority::default(),
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Sets the category of a task under construction.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Sets the priority of a task under construction.
    #[must_use]
    pub const fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            parent_group_id: data.parent_group_id,
            name: data.name,
            status: data.status,
            order_key: data.order_key,
            category: data.category,
            priority: data.priority,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the owning parent group.
    #[must_use]
    pub const fn parent_group_id(&self) -> ParentGroupId {
        self.parent_group_id
    }

    /// Returns the task name.
    #[must_use]
    pub const fn name(&self) -> &TaskName {
        &self.name
    }

    /// Returns the workflow status.
    #[must_use]
    pub const fn status(&self) -> WorkflowStatus {
        self.status
    }

    /// Returns the order within the task's status group.
    #[must_use]
    pub const fn order_key(&self) -> u32 {
        self.order_key
    }

    /// Returns the category, if any.
    #[must_use]
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// Returns the priority.
    #[must_use]
    pub const fn priority(&self) -> TaskPriority {
        self.priority
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest modification timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Moves the task into `status` at `order_key`.
    ///
    /// Returns `true` when either value changed; the timestamp is only
    /// touched in that case.
    pub fn set_status(&mut self, status: WorkflowStatus, order_key: u32, clock: &impl Clock) -> bool {
        if self.status == status && self.order_key == order_key {
            return false;
        }
        self.status = status;
        self.order_key = order_key;
        self.touch(clock);
        true
    }

    /// Sets the order within the current status group.
    ///
    /// Returns `true` when the key changed.
    pub fn set_order_key(&mut self, order_key: u32, clock: &impl Clock) -> bool {
        if self.order_key == order_key {
            return false;
        }
        self.order_key = order_key;
        self.touch(clock);
        true
    }

    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}

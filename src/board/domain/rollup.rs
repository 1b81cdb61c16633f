//! Status rollup from tasks to activities and from activities to projects.

use super::{ActivityStatus, ParentGroupId, WorkflowStatus};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Derives an activity's status from its children's workflow statuses.
///
/// Any blocked child blocks the activity; all children done finishes it; any
/// child done or in progress puts it in progress; otherwise it is todo.
/// `review` counts as neither done nor in progress. With no children the
/// prior status is kept, defaulting to todo.
#[must_use]
pub fn aggregate_activity_status<I>(children: I, prior: Option<ActivityStatus>) -> ActivityStatus
where
    I: IntoIterator<Item = WorkflowStatus>,
{
    children
        .into_iter()
        .map(|status| match status {
            WorkflowStatus::Blocked => Signal::Blocked,
            WorkflowStatus::Done => Signal::Done,
            WorkflowStatus::InProgress => Signal::Started,
            WorkflowStatus::Todo | WorkflowStatus::Review => Signal::Idle,
        })
        .fold(Tally::default(), Tally::record)
        .resolve(prior)
}

/// Derives a project's status from its activities with the same rules.
#[must_use]
pub fn rollup_project_status<I>(activities: I, prior: Option<ActivityStatus>) -> ActivityStatus
where
    I: IntoIterator<Item = ActivityStatus>,
{
    activities
        .into_iter()
        .map(|status| match status {
            ActivityStatus::Blocked => Signal::Blocked,
            ActivityStatus::Done => Signal::Done,
            ActivityStatus::Progress => Signal::Started,
            ActivityStatus::Todo => Signal::Idle,
        })
        .fold(Tally::default(), Tally::record)
        .resolve(prior)
}

#[derive(Debug, Clone, Copy)]
enum Signal {
    Blocked,
    Done,
    Started,
    Idle,
}

#[derive(Debug, Clone, Copy, Default)]
struct Tally {
    total: usize,
    done: usize,
    blocked: bool,
    started: bool,
}

impl Tally {
    const fn record(mut self, signal: Signal) -> Self {
        self.total += 1;
        match signal {
            Signal::Blocked => self.blocked = true,
            Signal::Done => self.done += 1,
            Signal::Started => self.started = true,
            Signal::Idle => {}
        }
        self
    }

    fn resolve(self, prior: Option<ActivityStatus>) -> ActivityStatus {
        if self.total == 0 {
            return prior.unwrap_or_default();
        }
        if self.blocked {
            ActivityStatus::Blocked
        } else if self.done == self.total {
            ActivityStatus::Done
        } else if self.done > 0 || self.started {
            ActivityStatus::Progress
        } else {
            ActivityStatus::Todo
        }
    }
}

/// Parent aggregate whose status is derived from its tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    id: ParentGroupId,
    status: ActivityStatus,
    updated_at: DateTime<Utc>,
}

impl Activity {
    /// Creates an activity in [`ActivityStatus::Todo`].
    #[must_use]
    pub fn new(id: ParentGroupId, clock: &impl Clock) -> Self {
        Self {
            id,
            status: ActivityStatus::Todo,
            updated_at: clock.utc(),
        }
    }

    /// Reconstructs an activity from persisted storage.
    #[must_use]
    pub const fn from_persisted(
        id: ParentGroupId,
        status: ActivityStatus,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            status,
            updated_at,
        }
    }

    /// Returns the parent group identifier.
    #[must_use]
    pub const fn id(&self) -> ParentGroupId {
        self.id
    }

    /// Returns the derived status.
    #[must_use]
    pub const fn status(&self) -> ActivityStatus {
        self.status
    }

    /// Returns when the status last changed.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Recomputes the status from the children; returns `true` on change.
    pub fn refresh<I>(&mut self, children: I, clock: &impl Clock) -> bool
    where
        I: IntoIterator<Item = WorkflowStatus>,
    {
        let next = aggregate_activity_status(children, Some(self.status));
        if next == self.status {
            return false;
        }
        self.status = next;
        self.updated_at = clock.utc();
        true
    }
}

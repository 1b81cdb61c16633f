//! Domain model for board consistency.
//!
//! Tasks are the authoritative record of status and order. The board is a
//! denormalized, ordered view of the same facts; the placement and
//! reconciliation algorithms here keep the two aligned without touching any
//! infrastructure.

mod board_config;
mod column;
mod error;
mod ids;
mod placement;
mod reconcile;
mod rollup;
mod status;
mod task;
mod template;

pub use board_config::{BoardConfig, CardLocation};
pub use column::{CardRef, Column, ColumnSettingsUpdate, WipCheck};
pub use error::{BoardDomainError, ParseStatusError};
pub use ids::{ParentGroupId, TaskId, TaskName};
pub use placement::{Placement, PlacementError};
pub use reconcile::{Reconciliation, RepairReport, StoredBoard, reconcile};
pub use rollup::{Activity, aggregate_activity_status, rollup_project_status};
pub use status::{ActivityStatus, SubStatus, WorkflowStatus};
pub use task::{PersistedTaskData, Task, TaskPriority};
pub use template::{BoardTemplate, ColumnTemplate};

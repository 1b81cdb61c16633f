//! Application services for board consistency.
//!
//! Every write follows the same cycle: read a snapshot of the parent group,
//! reconcile its board, compute the change, and commit it conditionally on
//! the snapshot's revision.

mod board_builder;
mod columns;
mod config;
mod error;
mod move_engine;
mod task_store;
mod unit_of_work;

pub use board_builder::{BoardBuilder, BoardView};
pub use columns::ColumnSettingsService;
pub use config::{EngineConfig, EngineConfigError};
pub use error::{BoardServiceError, BoardServiceResult};
pub use move_engine::{MoveCommand, MoveEngine, MoveResponse, ValidatedMove};
pub use task_store::{CreateTaskRequest, TaskStore};

//! Kanban board consistency engine.
//!
//! Keeps per-task workflow state and a denormalized, ordered board view in
//! step under reordering and cross-column moves, enforces work-in-progress
//! limits, and derives parent activity status from child tasks.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (in-memory, `PostgreSQL`)
//!
//! # Modules
//!
//! - [`board`]: Tasks, boards, moves, reconciliation, and status rollup

pub mod board;

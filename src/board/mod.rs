//! Kanban board consistency.
//!
//! Each task carries its workflow status and its order within that status.
//! Each parent group also stores a board: ordered columns of card
//! references used for drag-and-drop rendering. This module keeps the two
//! aligned:
//!
//! - [`services::MoveEngine`] applies move and reorder commands to both in
//!   one atomic commit, enforcing WIP limits.
//! - [`services::BoardBuilder`] heals a stored board that drifted from the
//!   tasks when it is read.
//! - [`domain::aggregate_activity_status`] derives the parent activity's
//!   status from its tasks.
//!
//! The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;

//! Port contracts for board consistency.
//!
//! Ports define infrastructure-agnostic interfaces used by board services.

pub mod repository;

pub use repository::{
    BoardChangeset, BoardRepository, BoardRepositoryError, BoardRepositoryResult, BoardRevision,
    BoardSnapshot,
};

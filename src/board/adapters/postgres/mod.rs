//! `PostgreSQL` adapters for board persistence.

pub(crate) mod models;
mod repository;
pub(crate) mod schema;

pub use repository::{BoardPgPool, PostgresBoardRepository};

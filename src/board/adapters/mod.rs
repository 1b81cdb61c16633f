//! Adapter implementations for board consistency ports.

pub mod memory;
pub mod postgres;

//! Step definitions for board move BDD scenarios.

mod given;
mod then;
mod when;
pub mod world;

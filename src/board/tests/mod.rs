//! Unit tests for the board consistency module.

mod support;

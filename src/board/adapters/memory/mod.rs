//! In-memory adapters for board consistency.

mod board;

pub use board::InMemoryBoardRepository;

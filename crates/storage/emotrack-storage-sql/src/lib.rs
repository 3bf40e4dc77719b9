//! Emotrack SQL storage
//!
//! SQLite implementation of the [`EmotionStore`](emotrack_core::EmotionStore) contract.

#![warn(missing_docs)]
#![warn(clippy::all)]

// Re-exports
pub use emotrack_core;

pub mod sqlite;

pub use sqlite::{SqliteAdapter, SqliteTransaction};

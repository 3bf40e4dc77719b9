//! Core type definitions for Emotrack

pub mod directory;
pub mod ingest;
pub mod state;
pub mod store;
pub mod summary;

// Re-export commonly used types
pub use directory::*;
pub use ingest::*;
pub use state::*;
pub use store::*;
pub use summary::*;

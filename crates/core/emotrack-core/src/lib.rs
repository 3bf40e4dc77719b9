//! Emotrack Core
//!
//! Edge devices report how long each person they track has shown each
//! emotion, as cumulative running totals. This crate keeps the latest totals
//! per `(device_id, person_id)` and turns them into dashboard summaries:
//!
//! - [`IngestEngine`] validates a device batch and upserts it atomically
//! - [`SummaryEngine`] sums emotions per device and picks each person's
//!   current emotion
//! - [`EmotionStore`] is the storage contract both engines share; an
//!   in-process [`MemoryStore`] is included, SQLite lives in
//!   `emotrack-storage-sql`
//!
//! # Example
//!
//! ```no_run
//! use emotrack_core::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let store: Arc<dyn EmotionStore> = Arc::new(MemoryStore::new());
//!     let ingest = IngestEngine::new(store.clone());
//!     let summaries = SummaryEngine::new(store, Arc::new(StaticDeviceDirectory::new()));
//!
//!     let batch = IngestBatch::new(
//!         "jetson_1",
//!         chrono::Utc::now(),
//!         vec![PersonReport::new("1", [("happy".to_string(), 12.5)].into_iter().collect())],
//!     );
//!     ingest.ingest_batch(&batch).await?;
//!
//!     let summary = summaries.get_summary("jetson_1").await?;
//!     println!("{}", serde_json::to_string_pretty(&summary)?);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Core modules
pub mod config;
pub mod engine;
pub mod error;
pub mod memory;
pub mod testing;
pub mod types;
pub mod utils;

// Re-export main types
pub use config::{get_env_int, get_env_or, load_env, load_env_from_path, split_list, ServiceConfig};
pub use engine::{emotion_totals, summarize, IngestEngine, SummaryEngine};
pub use error::{EmotrackError, Rejection, RejectionReason, Result};
pub use memory::MemoryStore;
pub use types::*;
pub use utils::init_logging;

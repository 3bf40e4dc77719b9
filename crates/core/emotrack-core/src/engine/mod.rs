//! Ingestion and dashboard aggregation engines
//!
//! Both engines share nothing but the store handle they are built with. The
//! ingest engine is the only writer; the summary engine only reads.

pub mod ingest;
pub mod summary;

pub use ingest::IngestEngine;
pub use summary::{emotion_totals, summarize, SummaryEngine};

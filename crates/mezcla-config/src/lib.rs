//! Graph snapshot persistence for the mezcla engine.
//!
//! Saves and restores the topology-and-parameters state of an
//! [`AudioGraph`](mezcla_core::AudioGraph) as TOML. Audio never enters a
//! snapshot; Source nodes are restored unseeded and re-fed by the caller.
//!
//! # Example
//!
//! ```rust,ignore
//! use mezcla_config::GraphSnapshot;
//!
//! GraphSnapshot::capture(&graph).save("session.toml")?;
//!
//! let snapshot = GraphSnapshot::load("session.toml")?;
//! let (graph, report) = snapshot.restore(env)?;
//! for entry in &report.skipped {
//!     eprintln!("skipped: {entry:?}");
//! }
//! ```

mod error;
mod snapshot;

pub use error::SnapshotError;
pub use snapshot::{EdgeRecord, GraphSnapshot, LoadReport, NodeRecord, SkippedEntry};

//! Durable progress for a harvest run
//!
//! A run lives in `<root>/run_<UTC timestamp>/`:
//!
//! - `links.json` is the ledger: every discovered link with its `processed` flag
//! - `batch_0000.json`, `batch_0001.json`, ... hold the article records, at
//!   most `batch_size` per file; `batch_0000.json` exists, empty, from the start
//!
//! Every write goes to a temp file which is synced and renamed over the
//! target, so an interrupted write leaves the previous valid file behind.

mod error;
mod state;
mod store;

pub use error::{CheckpointError, CheckpointResult};
pub use state::CrawlState;
pub use store::{CheckpointStore, new_run_id};

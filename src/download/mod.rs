//! Sequential HTTP download engine with streaming writes and progress events.
//!
//! This module downloads every PDF linked from a lecture-listing page into a
//! local storage directory, writing a metadata sidecar next to each artifact.
//!
//! # Features
//!
//! - Streaming downloads (memory-efficient for large files)
//! - Strictly sequential processing with a determinate progress stream
//! - Partial-failure tolerance (one bad link never aborts the batch)
//! - Write-or-delete semantics per file (no stray partials)

mod client;
mod constants;
mod engine;
mod error;
mod filename;

pub use client::HttpClient;
pub use engine::{DownloadEngine, FetchOutcome, FetchRequest, ProgressEvent};
pub use error::DownloadError;
pub use filename::filename_from_href;

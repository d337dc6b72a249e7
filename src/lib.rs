//! Lectern Core Library
//!
//! This library implements the fetch-and-download pipeline behind the
//! `lectern` tool: scrape a lecture-listing page for anchor links, resolve
//! each href, stream every PDF to local storage, persist a metadata sidecar
//! next to each artifact, and later rebuild a browsable listing from those
//! sidecars.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`catalog`] - Course catalog scraping
//! - [`download`] - Sequential download engine with progress reporting
//! - [`listing`] - Folder listing reconstruction from sidecar files
//! - [`record`] - FetchRecord entity and sidecar codec
//! - [`resolve`] - Href-against-page-URL resolution
//! - [`scrape`] - HTML fetching and anchor extraction

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod catalog;
pub mod download;
pub mod listing;
pub mod record;
pub mod resolve;
pub mod scrape;

// Re-export commonly used types
pub use catalog::{CourseItem, IconRef, course_storage_dir, lecture_page_url, scrape_catalog};
pub use download::{
    DownloadEngine, DownloadError, FetchOutcome, FetchRequest, HttpClient, ProgressEvent,
};
pub use listing::{ListingError, ListingItem, build_listing};
pub use record::{FetchRecord, ItemType, RecordError, read_record, sidecar_path, write_record};
pub use resolve::{ResolveError, resolve_href};
pub use scrape::{Anchor, LinkScope, PageFetcher, ScrapeError};

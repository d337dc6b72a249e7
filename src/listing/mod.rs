//! Folder listing reconstruction from downloaded storage.
//!
//! A storage directory is self-describing: each artifact sits next to its
//! metadata sidecar, and sub-directories are navigable folders. This module
//! rebuilds the structured listing a UI renders, purely from the filesystem.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::record::{FetchRecord, ItemType, is_sidecar, read_record};

/// Errors produced while building a listing.
///
/// Only failure to enumerate the directory itself is an error; problems with
/// individual entries (unreadable sidecars, stray files) skip that entry.
#[derive(Debug, Error)]
pub enum ListingError {
    /// The storage directory could not be read.
    #[error("cannot read directory {path}: {source}")]
    ReadDir {
        /// The directory that failed to enumerate.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

/// One entry of a reconstructed listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListingItem {
    /// The entry's metadata (decoded from its sidecar, or synthesized for a
    /// directory).
    pub record: FetchRecord,
    /// Whether the entry is a navigable folder.
    pub navigable: bool,
}

/// Builds the listing for the immediate children of `storage_root`.
///
/// - Sub-directories become synthesized FOLDER items (display name = the
///   directory name), flagged navigable.
/// - Files with a readable sidecar yield the decoded record.
/// - Sidecar files themselves, files without a sidecar, and files whose
///   sidecar fails to decode are skipped with a debug log — a defined gap,
///   never a crash.
///
/// Entries come back in directory-enumeration order, which is
/// platform-defined; callers must sort if they need a stable order.
///
/// # Errors
///
/// Returns [`ListingError::ReadDir`] if `storage_root` cannot be enumerated.
#[instrument]
pub fn build_listing(storage_root: &Path) -> Result<Vec<ListingItem>, ListingError> {
    let entries = fs::read_dir(storage_root).map_err(|source| ListingError::ReadDir {
        path: storage_root.to_path_buf(),
        source,
    })?;

    let mut items = Vec::new();
    for entry in entries {
        let Ok(entry) = entry else {
            continue;
        };
        let path = entry.path();
        let file_type = match entry.file_type() {
            Ok(ft) => ft,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "cannot stat entry, skipping");
                continue;
            }
        };

        if file_type.is_dir() {
            items.push(folder_item(&path));
        } else if is_sidecar(&path) {
            // Sidecars describe their artifact; they are not listed themselves.
            continue;
        } else {
            match read_record(&path) {
                Ok(record) => {
                    let navigable = record.item_type == ItemType::Folder;
                    items.push(ListingItem { record, navigable });
                }
                Err(e) => {
                    debug!(path = %path.display(), error = %e, "no readable sidecar, skipping");
                }
            }
        }
    }

    debug!(count = items.len(), "listing built");
    Ok(items)
}

/// Synthesizes the listing item for a sub-directory.
fn folder_item(path: &Path) -> ListingItem {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    ListingItem {
        record: FetchRecord {
            local_path: path.to_string_lossy().into_owned(),
            remote_url: String::new(),
            display_name: name,
            item_type: ItemType::Folder,
        },
        navigable: true,
    }
}

//! FetchRecord entity and the sidecar metadata codec.
//!
//! Every downloaded artifact gets a small text sidecar stored next to it,
//! recording where the file came from and how a listing should present it.
//! The encoding is a line-oriented `key=value` format: an internal contract,
//! human-inspectable, and stable across write/read within one installation.
//!
//! # Module structure note
//!
//! This module is intentionally a single file (`mod.rs`-only); the codec is
//! small enough that sub-files would not pull their weight.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, instrument};

/// Suffix appended to an artifact filename to name its sidecar.
///
/// Appending (rather than replacing the extension) keeps sidecar names
/// collision-free: `a.pdf` and `a.marks` map to `a.pdf.meta` and
/// `a.marks.meta`.
pub const SIDECAR_SUFFIX: &str = ".meta";

const KEY_LOCAL_PATH: &str = "local-path";
const KEY_REMOTE_URL: &str = "remote-url";
const KEY_DISPLAY_NAME: &str = "display-name";
const KEY_ITEM_TYPE: &str = "item-type";

/// Errors produced by the sidecar codec.
#[derive(Debug, Error)]
pub enum RecordError {
    /// I/O error reading or writing the sidecar file.
    #[error("I/O error on sidecar {path}: {source}")]
    Io {
        /// The sidecar path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The sidecar exists but one of the required fields is absent.
    #[error("sidecar {path} is missing field {field:?}")]
    MissingField {
        /// The sidecar that failed to decode.
        path: PathBuf,
        /// The missing key.
        field: &'static str,
    },

    /// The `item-type` field holds a tag this version does not know.
    #[error("sidecar {path} has unknown item type {value:?}")]
    UnknownItemType {
        /// The sidecar that failed to decode.
        path: PathBuf,
        /// The unrecognized tag.
        value: String,
    },

    /// A record field contains a newline and cannot round-trip through the
    /// line-oriented encoding.
    #[error("record field {field:?} contains a newline")]
    InvalidField {
        /// The offending field key.
        field: &'static str,
    },
}

impl RecordError {
    fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Category tag discriminating how a listing should treat an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    /// A downloaded lecture PDF (leaf file).
    Pdf,
    /// A navigable sub-directory.
    Folder,
    /// The course marks page (special leaf).
    Marks,
    /// Anything else worth listing but not specially handled.
    Other,
}

impl ItemType {
    /// The tag written into the sidecar `item-type` line.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Folder => "folder",
            Self::Marks => "marks",
            Self::Other => "other",
        }
    }

    fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "pdf" => Some(Self::Pdf),
            "folder" => Some(Self::Folder),
            "marks" => Some(Self::Marks),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

/// The persisted per-artifact metadata entity.
///
/// A record loaded from a sidecar is field-for-field equal to the record the
/// sidecar was written from; that round-trip is the codec's one invariant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchRecord {
    /// Absolute path of the downloaded artifact on local storage.
    pub local_path: String,
    /// The URL the artifact was fetched from.
    pub remote_url: String,
    /// Human-readable label for listing UI.
    pub display_name: String,
    /// Listing category of this entry.
    pub item_type: ItemType,
}

/// Derives the sidecar path for an artifact path.
///
/// Examples:
/// - `lec/L02.pdf` → `lec/L02.pdf.meta`
/// - `lec/marks` → `lec/marks.meta`
#[must_use]
pub fn sidecar_path(artifact_path: &Path) -> PathBuf {
    let mut name = artifact_path.file_name().unwrap_or_default().to_os_string();
    name.push(SIDECAR_SUFFIX);
    artifact_path.with_file_name(name)
}

/// Returns true if `path` names a sidecar file rather than an artifact.
#[must_use]
pub fn is_sidecar(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with(SIDECAR_SUFFIX))
}

/// Writes the sidecar for `filename` inside `storage_dir`.
///
/// Returns the sidecar path on success.
///
/// # Errors
///
/// Returns [`RecordError::InvalidField`] if any field contains a newline
/// (such a sidecar could not round-trip), or [`RecordError::Io`] on write
/// failure.
#[instrument(skip(record), fields(dir = %storage_dir.display(), filename))]
pub fn write_record(
    storage_dir: &Path,
    filename: &str,
    record: &FetchRecord,
) -> Result<PathBuf, RecordError> {
    let path = sidecar_path(&storage_dir.join(filename));
    let encoded = encode(record)?;
    fs::write(&path, encoded).map_err(|e| RecordError::io(path.clone(), e))?;
    debug!(path = %path.display(), "sidecar written");
    Ok(path)
}

/// Reads and decodes the sidecar associated with `artifact_path`.
///
/// # Errors
///
/// Returns [`RecordError::Io`] if the sidecar cannot be read (including when
/// it does not exist), [`RecordError::MissingField`] or
/// [`RecordError::UnknownItemType`] if it is malformed. The caller decides
/// whether to skip or surface the entry.
pub fn read_record(artifact_path: &Path) -> Result<FetchRecord, RecordError> {
    let path = sidecar_path(artifact_path);
    let text = fs::read_to_string(&path).map_err(|e| RecordError::io(path.clone(), e))?;
    decode(&text, &path)
}

fn encode(record: &FetchRecord) -> Result<String, RecordError> {
    let fields = [
        (KEY_LOCAL_PATH, record.local_path.as_str()),
        (KEY_REMOTE_URL, record.remote_url.as_str()),
        (KEY_DISPLAY_NAME, record.display_name.as_str()),
        (KEY_ITEM_TYPE, record.item_type.as_str()),
    ];
    let mut out = String::new();
    for (key, value) in fields {
        if value.contains('\n') || value.contains('\r') {
            return Err(RecordError::InvalidField { field: key });
        }
        out.push_str(key);
        out.push('=');
        out.push_str(value);
        out.push('\n');
    }
    Ok(out)
}

fn decode(text: &str, path: &Path) -> Result<FetchRecord, RecordError> {
    let mut local_path = None;
    let mut remote_url = None;
    let mut display_name = None;
    let mut item_type = None;

    for line in text.lines() {
        if line.is_empty() {
            continue;
        }
        // Value is everything after the first '=', verbatim: no trimming,
        // so values round-trip exactly.
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        match key {
            KEY_LOCAL_PATH => local_path = Some(value.to_string()),
            KEY_REMOTE_URL => remote_url = Some(value.to_string()),
            KEY_DISPLAY_NAME => display_name = Some(value.to_string()),
            KEY_ITEM_TYPE => {
                item_type = Some(ItemType::from_tag(value).ok_or_else(|| {
                    RecordError::UnknownItemType {
                        path: path.to_path_buf(),
                        value: value.to_string(),
                    }
                })?);
            }
            // Unknown keys are ignored so old readers tolerate new fields.
            _ => {}
        }
    }

    let missing = |field| RecordError::MissingField {
        path: path.to_path_buf(),
        field,
    };
    Ok(FetchRecord {
        local_path: local_path.ok_or_else(|| missing(KEY_LOCAL_PATH))?,
        remote_url: remote_url.ok_or_else(|| missing(KEY_REMOTE_URL))?,
        display_name: display_name.ok_or_else(|| missing(KEY_DISPLAY_NAME))?,
        item_type: item_type.ok_or_else(|| missing(KEY_ITEM_TYPE))?,
    })
}

/// Convenience check: does `artifact_path` have a readable sidecar?
#[must_use]
pub fn has_sidecar(artifact_path: &Path) -> bool {
    match fs::metadata(sidecar_path(artifact_path)) {
        Ok(meta) => meta.is_file(),
        Err(e) if e.kind() == ErrorKind::NotFound => false,
        Err(_) => false,
    }
}

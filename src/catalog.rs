//! Course catalog scraping.
//!
//! The university's catalog page lists each course as an anchor inside the
//! content section; the course code is the trailing seven characters of the
//! anchor's href (e.g. `.../COSC242`). Items produced here are ephemeral:
//! held in memory for one session, never persisted.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, instrument};

use crate::scrape::{LinkScope, PageFetcher, ScrapeError, extract_anchors};

/// Number of trailing href characters forming the course code.
const COURSE_CODE_LEN: usize = 7;

/// Icon hint for a catalog entry. Stands in for a platform drawable
/// reference; the CLI maps it to a glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IconRef {
    /// A navigable course folder.
    Folder,
    /// A plain document entry.
    Document,
}

/// One course scraped from the catalog page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CourseItem {
    /// Icon hint for listing UI.
    pub icon: IconRef,
    /// The course's display name (anchor text).
    pub display_name: String,
    /// Root URL of the course's own site.
    pub course_url: String,
    /// The course code, as it appeared in the catalog href.
    pub course_code: String,
}

/// Derives the lecture-listing page URL for a course.
#[must_use]
pub fn lecture_page_url(course_url: &str) -> String {
    format!("{course_url}/lectures.php")
}

/// Derives the local storage directory for a course's lecture PDFs.
#[must_use]
pub fn course_storage_dir(storage_root: &Path, course_code: &str) -> PathBuf {
    storage_root.join(course_code).join("lec")
}

/// Fetches the catalog page at `catalog_url` and scrapes one [`CourseItem`]
/// per content-section anchor.
///
/// The course code is the last [`COURSE_CODE_LEN`] characters of the href;
/// anchors with shorter hrefs are skipped with a debug log. The course URL is
/// `{course_host}/{code-lowercased}`.
///
/// # Errors
///
/// Returns a [`ScrapeError`] if the catalog page cannot be fetched; the
/// caller decides user messaging (typically a "no courses found" note).
#[instrument(skip(fetcher))]
pub async fn scrape_catalog(
    fetcher: &PageFetcher,
    catalog_url: &str,
    course_host: &str,
) -> Result<Vec<CourseItem>, ScrapeError> {
    let body = fetcher.fetch_page(catalog_url).await?;
    let courses = courses_from_html(&body, course_host);
    debug!(count = courses.len(), "catalog scraped");
    Ok(courses)
}

/// Pure extraction step, separated from the fetch for testability.
#[must_use]
pub fn courses_from_html(html: &str, course_host: &str) -> Vec<CourseItem> {
    let course_host = course_host.trim_end_matches('/');
    extract_anchors(html, LinkScope::ContentAnchors)
        .into_iter()
        .filter_map(|anchor| {
            let chars = anchor.href.chars().count();
            if chars < COURSE_CODE_LEN {
                debug!(href = %anchor.href, "href too short for a course code, skipping");
                return None;
            }
            let code_start = anchor
                .href
                .char_indices()
                .nth(chars - COURSE_CODE_LEN)
                .map_or(0, |(i, _)| i);
            let course_code = anchor.href[code_start..].to_string();
            let course_url = format!("{course_host}/{}", course_code.to_lowercase());
            debug!(course = %anchor.text, url = %course_url, "added course");
            Some(CourseItem {
                icon: IconRef::Folder,
                display_name: anchor.text,
                course_url,
                course_code,
            })
        })
        .collect()
}

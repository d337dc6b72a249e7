//! Href resolution against a page URL.
//!
//! A lecture-listing page links to its PDFs with a mix of directory-relative
//! (`pdf/L02.pdf`), dot-relative (`./pdf/L03.pdf`), root-relative
//! (`/cosc242/pdf/L04.pdf`) and fully-qualified hrefs. This module turns any
//! of those into an absolute URL string without touching the network or the
//! filesystem.

use thiserror::Error;
use tracing::trace;
use url::Url;

/// Errors produced while resolving an href.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The page URL itself could not be parsed.
    #[error("invalid page URL {url}: {source}")]
    InvalidPageUrl {
        /// The page URL that failed to parse.
        url: String,
        /// The underlying parse error.
        #[source]
        source: url::ParseError,
    },

    /// The href could not be joined onto the page URL.
    #[error("cannot resolve href {href:?} against {page_url}")]
    InvalidHref {
        /// The page URL the href was resolved against.
        page_url: String,
        /// The offending href.
        href: String,
    },
}

/// Resolves a possibly-relative `href` against the URL of the page it was
/// extracted from.
///
/// Rules, in priority order:
/// 1. An href that is itself an absolute URL (has a scheme) is returned
///    byte-for-byte unchanged.
/// 2. An href starting with `/` is root-relative: it replaces the page URL's
///    entire path.
/// 3. An href starting with `./` is stripped of the prefix and resolved as
///    rule 4.
/// 4. Any other href is relative to the page's containing directory (the page
///    URL with its last path segment dropped).
///
/// This is the resolver a presentation layer uses when following navigation
/// hrefs from one page to another (catalog entry, marks page, sub-listing).
/// The download engine intentionally does not route artifact hrefs through
/// it: those are plain `{base_url}/{href}` joins against the course root.
///
/// # Errors
///
/// Returns [`ResolveError::InvalidPageUrl`] if `page_url` does not parse, or
/// [`ResolveError::InvalidHref`] if the join fails (e.g. an href that is pure
/// fragment noise). Never panics on malformed input.
pub fn resolve_href(page_url: &str, href: &str) -> Result<String, ResolveError> {
    // Rule 1: absolute hrefs pass through untouched. `Url::parse` succeeds
    // only for inputs that carry their own scheme; re-serializing would
    // normalize them (adding a trailing slash to bare-host URLs), so the
    // original string is returned instead of the parsed form.
    if Url::parse(href).is_ok() {
        trace!(href, "href is already absolute");
        return Ok(href.to_string());
    }

    let page = Url::parse(page_url).map_err(|source| ResolveError::InvalidPageUrl {
        url: page_url.to_string(),
        source,
    })?;

    // Rules 2-4 are exactly RFC 3986 reference resolution, which `Url::join`
    // implements: a leading `/` replaces the whole path, `./` is stripped,
    // and anything else resolves against the containing directory.
    let resolved = page.join(href).map_err(|_| ResolveError::InvalidHref {
        page_url: page_url.to_string(),
        href: href.to_string(),
    })?;

    trace!(href, resolved = %resolved, "resolved href");
    Ok(resolved.into())
}

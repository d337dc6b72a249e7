//! Local filename derivation from hrefs.

/// Derives the local filename for an href: the substring after the last `/`.
///
/// Returns `None` for hrefs that carry no usable filename — blank or
/// whitespace-only hrefs, and hrefs ending in `/`. The engine skips those
/// items without counting them as failures.
#[must_use]
pub fn filename_from_href(href: &str) -> Option<String> {
    if href.trim().is_empty() {
        return None;
    }
    let name = match href.rfind('/') {
        Some(pos) => &href[pos + 1..],
        None => href,
    };
    if name.is_empty() {
        return None;
    }
    Some(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filename_after_last_slash() {
        assert_eq!(filename_from_href("pdf/L02.pdf").as_deref(), Some("L02.pdf"));
        assert_eq!(
            filename_from_href("/cosc242/pdf/L04.pdf").as_deref(),
            Some("L04.pdf")
        );
    }

    #[test]
    fn test_bare_filename_kept_whole() {
        assert_eq!(filename_from_href("L02.pdf").as_deref(), Some("L02.pdf"));
    }

    #[test]
    fn test_blank_href_yields_none() {
        assert_eq!(filename_from_href(""), None);
        assert_eq!(filename_from_href("   "), None);
        assert_eq!(filename_from_href("\t"), None);
    }

    #[test]
    fn test_trailing_slash_yields_none() {
        assert_eq!(filename_from_href("pdf/"), None);
    }
}

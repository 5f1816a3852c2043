//! Classification of item identifiers versus virtual paths.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::{Result, ShareFileError};

/// Length of a canonical hyphenated identifier.
const ITEM_ID_LEN: usize = 36;

/// Number of `-` separated groups in a canonical identifier.
const ITEM_ID_SEGMENTS: usize = 5;

/// API item URL, e.g. `https://acme.sf-api.com/sf/v3/Items(fo123)`.
static ITEM_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://[^/]+(?:/[^()?#]*)?/Items\(([^()/?#]+)\)")
        .expect("Invalid item URL regex")
});

/// Returns true when `s` has the shape of an item identifier.
///
/// Only the length and the number of hyphen-separated groups are checked;
/// the groups are not required to be hex. Anything else, including `/`, is
/// treated as a path.
///
/// ```
/// use sharefile::is_item_id;
///
/// assert!(is_item_id("a1b2c3d4-e5f6-4a5b-8c9d-0e1f2a3b4c5d"));
/// assert!(!is_item_id("/Folder/file.txt"));
/// ```
pub fn is_item_id(s: &str) -> bool {
    s.chars().count() == ITEM_ID_LEN && s.split('-').count() == ITEM_ID_SEGMENTS
}

/// Extract the item id from an API item URL such as an item's `url` or its
/// `Parent.url`.
///
/// ```
/// use sharefile::item_id::extract_item_id;
///
/// let id = extract_item_id("https://acme.sf-api.com/sf/v3/Items(fo123)").unwrap();
/// assert_eq!(id, "fo123");
/// ```
pub fn extract_item_id(url: &str) -> Result<String> {
    let trimmed = url.trim();

    ITEM_URL_REGEX
        .captures(trimmed)
        .and_then(|captures| captures.get(1))
        .map(|id| id.as_str().to_string())
        .ok_or_else(|| ShareFileError::InvalidItemUrl(url.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_uuid_is_item_id() {
        assert!(is_item_id("0f8fad5b-d9cb-469f-a165-70867728950e"));
    }

    #[test]
    fn test_loose_shape_is_accepted() {
        // Non-hex groups still pass.
        assert!(is_item_id("zzzzzzzz-zzzz-zzzz-zzzz-zzzzzzzzzzzz"));
    }

    #[test]
    fn test_paths_are_not_item_ids() {
        assert!(!is_item_id("/"));
        assert!(!is_item_id(""));
        assert!(!is_item_id("/Shared Folders/Reports/q1.xlsx"));
        assert!(!is_item_id("home"));
    }

    #[test]
    fn test_wrong_length() {
        assert!(!is_item_id("0f8fad5b-d9cb-469f-a165-70867728950"));
        assert!(!is_item_id("0f8fad5b-d9cb-469f-a165-70867728950ee"));
        // 35 characters, 36 bytes.
        assert!(!is_item_id("é234567-1234-1234-1234-123456789012"));
        assert!(is_item_id("é2345678-1234-1234-1234-123456789012"));
    }

    #[test]
    fn test_wrong_segment_count() {
        // 36 chars, 4 groups.
        assert!(!is_item_id("0f8fad5bd9cb-469f-a165-70867728950e1"));
        // 36 chars, 6 groups.
        assert!(!is_item_id("0f8fad5b-d9cb-469f-a165-7086-728950e"));
    }

    #[test]
    fn test_extract_from_item_url() {
        let url = "https://acme.sf-api.com/sf/v3/Items(fo0a1b2c-3d4e-5f60-7182-93a4b5c6d7e8)";
        assert_eq!(
            extract_item_id(url).unwrap(),
            "fo0a1b2c-3d4e-5f60-7182-93a4b5c6d7e8"
        );
    }

    #[test]
    fn test_extract_with_suffix_and_whitespace() {
        let url = "  http://127.0.0.1:4321/sf/v3/Items(fi42)/Children?includeDeleted=false ";
        assert_eq!(extract_item_id(url).unwrap(), "fi42");
    }

    #[test]
    fn test_extract_invalid() {
        assert!(extract_item_id("https://acme.sf-api.com/sf/v3/Items").is_err());
        assert!(extract_item_id("fo42").is_err());
        assert!(extract_item_id("").is_err());
    }
}

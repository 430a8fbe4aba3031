//! Cursor pagination state for GitHub GraphQL connections.
//!
//! GraphQL connections report a `pageInfo { hasNextPage endCursor }` block.
//! [`PageInfo`] deserialises that block and exposes the cursor for the next
//! request only when another page actually exists.

use serde::Deserialize;

use super::models::null_as_default;

/// Current page state for a cursor-paginated connection.
///
/// # Example
///
/// ```
/// use reviewmine::github::pagination::PageInfo;
///
/// let info = PageInfo::new(true, Some("Y3Vyc29yOjI1".to_owned()));
/// assert_eq!(info.next_cursor(), Some("Y3Vyc29yOjI1"));
/// assert!(PageInfo::default().is_last_page());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// Whether more items exist after this page.
    #[serde(default, deserialize_with = "null_as_default")]
    has_next_page: bool,
    /// Opaque cursor of the last item on this page.
    #[serde(default)]
    end_cursor: Option<String>,
}

impl PageInfo {
    /// Creates page info from its two fields.
    #[must_use]
    pub const fn new(has_next_page: bool, end_cursor: Option<String>) -> Self {
        Self {
            has_next_page,
            end_cursor,
        }
    }

    /// Returns true if this is the last page.
    #[must_use]
    pub const fn is_last_page(&self) -> bool {
        !self.has_next_page
    }

    /// Returns the cursor to request the following page.
    ///
    /// `None` when there is no next page or GitHub omitted the cursor, which
    /// callers treat as the end of the connection.
    #[must_use]
    pub fn next_cursor(&self) -> Option<&str> {
        if self.has_next_page {
            self.end_cursor.as_deref()
        } else {
            None
        }
    }
}

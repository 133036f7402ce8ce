//! Canonical route directory keys
//!
//! The registry uses these to turn filesystem-relative directories
//! (`blog\[slug]`, `blog/[slug]/`) into one canonical key (`/blog/[slug]`)
//! before walking upward through [`PathHierarchy`].

use std::borrow::Cow;

pub mod hierarchy;
pub use hierarchy::PathHierarchy;

/// Validates if a path is in canonical form
///
/// # Rules
///
/// - Must start with `/`
/// - Must not contain `//` or `\`
/// - Must not end with `/` (except root `/`)
///
/// # Examples
///
/// ```
/// use rhtmx_router::path::is_valid_path;
///
/// assert!(is_valid_path("/"));
/// assert!(is_valid_path("/blog/[slug]"));
///
/// assert!(!is_valid_path(""));
/// assert!(!is_valid_path("blog")); // Missing leading /
/// assert!(!is_valid_path("/blog/")); // Trailing /
/// assert!(!is_valid_path("/blog//post")); // Double //
/// assert!(!is_valid_path("\\blog")); // Backslash
/// ```
pub fn is_valid_path(path: &str) -> bool {
    if path.is_empty() || !path.starts_with('/') {
        return false;
    }

    if path.contains("//") || path.contains('\\') {
        return false;
    }

    path == "/" || !path.ends_with('/')
}

/// Normalize a path to canonical form
///
/// Returns `Cow::Borrowed` when the input is already canonical, otherwise a
/// single allocation with:
///
/// - Backslashes turned into `/`
/// - Empty segments removed (`//`, trailing `/`)
/// - A leading `/` added
///
/// # Examples
///
/// ```
/// use rhtmx_router::path::normalize_path;
/// use std::borrow::Cow;
///
/// assert!(matches!(normalize_path("/about"), Cow::Borrowed("/about")));
/// assert_eq!(normalize_path("blog\\[slug]"), "/blog/[slug]");
/// assert_eq!(normalize_path("docs//guide/"), "/docs/guide");
/// assert_eq!(normalize_path(""), "/");
/// ```
pub fn normalize_path(path: &str) -> Cow<'_, str> {
    if is_valid_path(path) {
        return Cow::Borrowed(path);
    }

    let normalized = path
        .replace('\\', "/")
        .split('/')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/");

    if normalized.is_empty() {
        Cow::Borrowed("/")
    } else {
        Cow::Owned(format!("/{}", normalized))
    }
}

/// Segment classification for file-based route patterns
///
/// Pure functions: the same directory name always classifies the same way,
/// on the server and in the browser.

use std::borrow::Cow;

/// What a single directory name contributes to a route pattern
///
/// # Examples
///
/// ```
/// use rhtmx_router::route::pattern::{classify_segment, SegmentKind};
///
/// assert_eq!(classify_segment("about"), SegmentKind::Static("about".into()));
/// assert_eq!(classify_segment("[id]"), SegmentKind::Dynamic("id".into()));
/// assert_eq!(classify_segment("[...path]"), SegmentKind::CatchAll("path".into()));
/// assert_eq!(classify_segment("(marketing)"), SegmentKind::Group);
/// assert_eq!(classify_segment("[[...path]]"), SegmentKind::Invalid);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentKind {
    /// Literal text
    Static(String),
    /// `[name]` - exactly one path segment
    Dynamic(String),
    /// `[...name]` - one or more path segments, last position only
    CatchAll(String),
    /// `(name)` - organisational folder, contributes no URL segment
    Group,
    /// Empty segment produced by leading, trailing or doubled separators
    Empty,
    /// Bracket syntax that is neither dynamic nor catch-all
    Invalid,
}

/// Classifies one directory name (pure function)
///
/// # Parsing Rules (evaluated in order)
///
/// 1. Empty → `Empty`
/// 2. `(name)` → `Group`
/// 3. `[...name]` → `CatchAll`
/// 4. `[name]` → `Dynamic`
/// 5. Any other use of `[` or `]` → `Invalid`
/// 6. Anything else → `Static`
pub fn classify_segment(segment: &str) -> SegmentKind {
    if segment.is_empty() {
        return SegmentKind::Empty;
    }

    if segment.len() > 2 && segment.starts_with('(') && segment.ends_with(')') {
        return SegmentKind::Group;
    }

    match segment.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
        Some(inner) => match inner.strip_prefix("...") {
            Some(name) if is_param_name(name) => SegmentKind::CatchAll(name.to_string()),
            Some(_) => SegmentKind::Invalid,
            None if is_param_name(inner) => SegmentKind::Dynamic(inner.to_string()),
            None => SegmentKind::Invalid,
        },
        None if segment.contains(|c| c == '[' || c == ']') => SegmentKind::Invalid,
        None => SegmentKind::Static(segment.to_string()),
    }
}

/// Characters a browser leaves as-is inside a path segment
const PATH_SAFE: &str = "-._~!$&'()*+,;=:@";

/// Static segment text as it appears in a request path
///
/// Browsers percent-encode non-ASCII and reserved characters before sending
/// a path, so a directory named `café` arrives as `caf%C3%A9`.
///
/// ```
/// use rhtmx_router::route::pattern::encode_static;
///
/// assert_eq!(encode_static("about"), "about");
/// assert_eq!(encode_static("café"), "caf%C3%A9");
/// assert_eq!(encode_static("about us"), "about%20us");
/// assert_eq!(encode_static("v1.0+beta"), "v1.0+beta");
/// ```
pub fn encode_static(text: &str) -> Cow<'_, str> {
    if text.chars().all(is_path_safe) {
        return Cow::Borrowed(text);
    }

    let mut buf = [0u8; 4];
    Cow::Owned(
        text.chars()
            .map(|c| {
                if is_path_safe(c) {
                    c.to_string()
                } else {
                    urlencoding::encode(c.encode_utf8(&mut buf)).into_owned()
                }
            })
            .collect(),
    )
}

fn is_path_safe(c: char) -> bool {
    c.is_ascii_alphanumeric() || PATH_SAFE.contains(c)
}

/// Parameter names are identifiers: letters, digits, `_` and `-`
fn is_param_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_static() {
        assert_eq!(
            classify_segment("about"),
            SegmentKind::Static("about".to_string())
        );
        assert_eq!(
            classify_segment("file.txt"),
            SegmentKind::Static("file.txt".to_string())
        );
    }

    #[test]
    fn test_classify_dynamic() {
        assert_eq!(
            classify_segment("[slug]"),
            SegmentKind::Dynamic("slug".to_string())
        );
        assert_eq!(
            classify_segment("[user_id]"),
            SegmentKind::Dynamic("user_id".to_string())
        );
    }

    #[test]
    fn test_classify_catch_all() {
        assert_eq!(
            classify_segment("[...path]"),
            SegmentKind::CatchAll("path".to_string())
        );
    }

    #[test]
    fn test_classify_group() {
        assert_eq!(classify_segment("(admin)"), SegmentKind::Group);
        // "()" has no name and stays literal
        assert_eq!(classify_segment("()"), SegmentKind::Static("()".to_string()));
    }

    #[test]
    fn test_classify_invalid() {
        assert_eq!(classify_segment("[]"), SegmentKind::Invalid);
        assert_eq!(classify_segment("[...]"), SegmentKind::Invalid);
        assert_eq!(classify_segment("[a/b]"), SegmentKind::Invalid);
        assert_eq!(classify_segment("pre[id]"), SegmentKind::Invalid);
        assert_eq!(classify_segment("[[...slug]]"), SegmentKind::Invalid);
    }

    #[test]
    fn test_encode_static_matches_browser_encoding() {
        assert!(matches!(encode_static("docs"), Cow::Borrowed("docs")));
        assert_eq!(encode_static("über-uns"), "%C3%BCber-uns");
        assert_eq!(encode_static("50%"), "50%25");
        assert_eq!(encode_static("a#b?c"), "a%23b%3Fc");
    }

    #[test]
    fn test_classify_empty() {
        assert_eq!(classify_segment(""), SegmentKind::Empty);
    }
}

/// Pattern compilation for file-based routes
///
/// Turns a directory path relative to the app root into a [`CompiledRoute`].
/// Pure: the same input always yields the same pattern and expression, which
/// is what keeps server and client matching in lockstep.

use regex::Regex;

use super::pattern::{classify_segment, encode_static, SegmentKind};
use super::{CompiledRoute, RoutePattern, Segment};
use crate::CompileError;

/// Capture for a single dynamic segment
const DYNAMIC_CAPTURE: &str = "([^/]+)";

/// Capture for a catch-all segment
///
/// Lazy so that a trailing slash is left to the `/?$` suffix instead of
/// being swallowed into the captured value.
const CATCH_ALL_CAPTURE: &str = "(.+?)";

/// Parses a directory path into a [`RoutePattern`]
///
/// Accepts both `blog/[slug]` and `/blog/[slug]`; backslashes are treated as
/// separators so Windows paths parse the same way.
///
/// # Errors
///
/// - [`CompileError::CatchAllNotLast`] when `[...name]` is followed by anything
/// - [`CompileError::InvalidSegment`] for malformed bracket syntax
/// - [`CompileError::DuplicateParam`] when a parameter name repeats
///
/// # Examples
///
/// ```
/// use rhtmx_router::route::parser::parse_pattern;
///
/// let pattern = parse_pattern("(shop)/products/[id]").unwrap();
/// assert_eq!(pattern.to_string(), "/products/[id]");
///
/// assert!(parse_pattern("post/[...path]/extra").is_err());
/// ```
pub fn parse_pattern(path: &str) -> Result<RoutePattern, CompileError> {
    let normalized = path.replace('\\', "/");
    let mut segments: Vec<Segment> = Vec::new();

    for raw in normalized.split('/') {
        if let Some(Segment::CatchAll(name)) = segments.last() {
            if !matches!(classify_segment(raw), SegmentKind::Empty | SegmentKind::Group) {
                return Err(CompileError::CatchAllNotLast {
                    pattern: path.to_string(),
                    name: name.clone(),
                });
            }
        }

        let segment = match classify_segment(raw) {
            SegmentKind::Empty | SegmentKind::Group => continue,
            SegmentKind::Static(text) => Segment::Static(text),
            SegmentKind::Dynamic(name) => Segment::Dynamic(name),
            SegmentKind::CatchAll(name) => Segment::CatchAll(name),
            SegmentKind::Invalid => {
                return Err(CompileError::InvalidSegment {
                    pattern: path.to_string(),
                    segment: raw.to_string(),
                })
            }
        };

        if let Some(name) = segment.param_name() {
            if segments.iter().any(|s| s.param_name() == Some(name)) {
                return Err(CompileError::DuplicateParam {
                    pattern: path.to_string(),
                    name: name.to_string(),
                });
            }
        }

        segments.push(segment);
    }

    Ok(RoutePattern::from_segments(segments))
}

/// Derives the anchored matching expression for a pattern
///
/// `/seg1/seg2` → `^/seg1/seg2/?$`; the root pattern → `^/?$`. Static text
/// is matched in its percent-encoded request form.
pub fn to_regex_source(pattern: &RoutePattern) -> String {
    if pattern.segments().is_empty() {
        return "^/?$".to_string();
    }

    let body: String = pattern
        .segments()
        .iter()
        .map(|segment| match segment {
            Segment::Static(text) => format!("/{}", regex::escape(&encode_static(text))),
            Segment::Dynamic(_) => format!("/{}", DYNAMIC_CAPTURE),
            Segment::CatchAll(_) => format!("/{}", CATCH_ALL_CAPTURE),
        })
        .collect();

    format!("^{}/?$", body)
}

/// Compiles a directory path into a matchable route
///
/// This is the single compiler used by the server registry, the manifest
/// codec and the client router.
///
/// # Examples
///
/// ```
/// use rhtmx_router::compile;
///
/// let route = compile("docs/[...path]").unwrap();
/// assert_eq!(route.as_str(), "/docs/[...path]");
/// assert_eq!(route.regex().as_str(), "^/docs/(.+?)/?$");
///
/// let root = compile("").unwrap();
/// assert_eq!(root.regex().as_str(), "^/?$");
/// ```
pub fn compile(path: &str) -> Result<CompiledRoute, CompileError> {
    let pattern = parse_pattern(path)?;
    let source = to_regex_source(&pattern);
    let regex = Regex::new(&source).map_err(|source| CompileError::Regex {
        pattern: pattern.to_string(),
        source,
    })?;

    let compiled = CompiledRoute::new(pattern, regex);
    debug_assert_eq!(
        compiled.regex().captures_len() - 1,
        compiled.param_names().len()
    );
    Ok(compiled)
}

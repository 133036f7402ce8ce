//! # RHTMX Router
//!
//! The canonical route compiler shared by the RHTMX server and the RHTMX
//! client router. Both sides instantiate the same algorithm, so a pattern
//! compiled in the browser matches exactly what the server matched.
//!
//! - Static segments (`/about`)
//! - Dynamic segments (`/blog/[slug]`)
//! - Catch-all segments (`/docs/[...path]`, last segment only)
//! - Route groups (`/(marketing)/pricing` → `/pricing`)
//!
//! ## Matching
//!
//! Routes are matched in the order they are given: the first route whose
//! compiled expression matches wins. Nothing is re-sorted behind the caller's
//! back; [`sort_by_specificity`] is an explicit opt-in.
//!
//! Trailing slashes are accepted by every pattern (`/?$`), so `/about` and
//! `/about/` always produce the same match.
//!
//! ## Example
//!
//! ```
//! use rhtmx_router::{compile, match_route};
//!
//! let routes = vec![
//!     compile("about").unwrap(),
//!     compile("blog/[slug]").unwrap(),
//! ];
//!
//! let matched = match_route(&routes, "/blog/hello-world").unwrap();
//! assert_eq!(matched.params.get("slug"), Some(&"hello-world".to_string()));
//! assert!(match_route(&routes, "/blog").is_none());
//! ```

use std::collections::BTreeMap;

// ============================================================================
// Module Declarations
// ============================================================================

mod build;
mod error;
mod matcher;
pub mod path;
pub mod route;

pub use build::build_path_from_pattern;
pub use error::{BuildPathError, CompileError};
pub use matcher::{match_route, sort_by_specificity, Routable, RouteMatch};
pub use path::{is_valid_path, normalize_path, PathHierarchy};
pub use route::parser::compile;
pub use route::pattern::{classify_segment, SegmentKind};
pub use route::{CompiledRoute, RoutePattern, Segment};

/// Parameters captured by a match, keyed by parameter name.
///
/// Ordered so that serialized payloads are stable.
pub type Params = BTreeMap<String, String>;

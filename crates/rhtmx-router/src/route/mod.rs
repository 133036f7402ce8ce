/// Route module for file-based routing
///
/// `pattern` classifies individual directory names, `parser` folds them into a
/// [`RoutePattern`] and derives the matching expression.

pub mod parser;
pub mod pattern;

use std::fmt;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::Params;

/// One URL-contributing segment of a route pattern
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    Static(String),
    Dynamic(String),
    CatchAll(String),
}

impl Segment {
    /// Parameter name for dynamic and catch-all segments
    pub fn param_name(&self) -> Option<&str> {
        match self {
            Segment::Static(_) => None,
            Segment::Dynamic(name) | Segment::CatchAll(name) => Some(name),
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Static(text) => f.write_str(text),
            Segment::Dynamic(name) => write!(f, "[{}]", name),
            Segment::CatchAll(name) => write!(f, "[...{}]", name),
        }
    }
}

/// Ordered list of segments
///
/// Invariant: a `CatchAll` segment can only be the final segment. The only
/// constructor is [`parser::parse_pattern`], which enforces it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoutePattern {
    segments: Vec<Segment>,
}

impl RoutePattern {
    pub(crate) fn from_segments(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Parameter names in left-to-right order
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(Segment::param_name)
    }

    /// Whether any segment captures a parameter
    pub fn is_dynamic(&self) -> bool {
        self.param_names().next().is_some()
    }

    pub fn has_catch_all(&self) -> bool {
        matches!(self.segments.last(), Some(Segment::CatchAll(_)))
    }

    /// Matching priority when specificity sorting is requested
    ///
    /// Lower number = more specific.
    ///
    /// - Static routes → 0
    /// - Each dynamic segment → +1
    /// - Catch-all → +1000
    pub fn priority(&self) -> usize {
        self.segments
            .iter()
            .map(|segment| match segment {
                Segment::Static(_) => 0,
                Segment::Dynamic(_) => 1,
                Segment::CatchAll(_) => 1000,
            })
            .sum()
    }
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("/");
        }
        for segment in &self.segments {
            write!(f, "/{}", segment)?;
        }
        Ok(())
    }
}

/// A pattern together with its matching expression
///
/// Invariant: the expression has exactly one capture group per entry of
/// `param_names`, in the same left-to-right order.
///
/// Serializes as its canonical pattern string (`"/blog/[slug]"`) and
/// deserializes by recompiling it, so a manifest round trip always yields an
/// identical matcher.
#[derive(Debug, Clone)]
pub struct CompiledRoute {
    pattern: RoutePattern,
    source: String,
    regex: Regex,
    param_names: Vec<String>,
}

impl CompiledRoute {
    pub(crate) fn new(pattern: RoutePattern, regex: Regex) -> Self {
        let param_names = pattern.param_names().map(str::to_string).collect();
        let source = pattern.to_string();
        Self {
            pattern,
            source,
            regex,
            param_names,
        }
    }

    /// Canonical pattern string, e.g. `/docs/[...path]`
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }

    /// Matches a URL path (query string already stripped)
    ///
    /// Captured values are percent-decoded. Values that do not decode to
    /// UTF-8 are kept as sent.
    ///
    /// # Examples
    ///
    /// ```
    /// use rhtmx_router::compile;
    ///
    /// let route = compile("blog/[slug]").unwrap();
    /// let params = route.match_path("/blog/hello%20world").unwrap();
    /// assert_eq!(params["slug"], "hello world");
    /// assert!(route.match_path("/blog").is_none());
    /// ```
    pub fn match_path(&self, path: &str) -> Option<Params> {
        let captures = self.regex.captures(path)?;

        let params = self
            .param_names
            .iter()
            .enumerate()
            .map(|(index, name)| {
                let raw = captures.get(index + 1).map(|m| m.as_str()).unwrap_or("");
                let value = urlencoding::decode(raw)
                    .map(|decoded| decoded.into_owned())
                    .unwrap_or_else(|_| raw.to_string());
                (name.clone(), value)
            })
            .collect();

        Some(params)
    }

    /// Substitutes parameters into this pattern (inverse of [`Self::match_path`])
    pub fn build_path(&self, params: &Params) -> Result<String, crate::BuildPathError> {
        crate::build::substitute(&self.pattern, &self.source, params)
    }
}

impl PartialEq for CompiledRoute {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern
    }
}

impl Eq for CompiledRoute {}

impl fmt::Display for CompiledRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl Serialize for CompiledRoute {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.source)
    }
}

impl<'de> Deserialize<'de> for CompiledRoute {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let source = String::deserialize(deserializer)?;
        parser::compile(&source).map_err(serde::de::Error::custom)
    }
}

// File: src/assets.rs
// Purpose: Asset URL resolution through the bundler's hash manifest

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use rhtmx_router::{CompiledRoute, Segment};
use tracing::warn;

/// Logical asset name → hashed file name
///
/// Lookups that miss fall back to the logical name, so a missing manifest
/// degrades to unhashed URLs instead of failing.
#[derive(Debug, Clone, Default)]
pub struct AssetManifest {
    prefix: String,
    entries: HashMap<String, String>,
}

impl AssetManifest {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into().trim_end_matches('/').to_string(),
            entries: HashMap::new(),
        }
    }

    pub fn with_entries(mut self, entries: HashMap<String, String>) -> Self {
        self.entries = entries;
        self
    }

    /// Reads a JSON object of `{logical: hashed}` pairs
    ///
    /// A missing file yields an empty manifest with a warning.
    pub fn load(path: &Path, prefix: impl Into<String>) -> Result<Self> {
        let manifest = Self::new(prefix);
        if !path.exists() {
            warn!("Asset manifest {:?} not found, using unhashed names", path);
            return Ok(manifest);
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read asset manifest: {:?}", path))?;
        let entries: HashMap<String, String> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse asset manifest: {:?}", path))?;
        Ok(manifest.with_entries(entries))
    }

    /// Public URL of a logical asset
    pub fn url(&self, logical: &str) -> String {
        let file = self
            .entries
            .get(logical)
            .map(String::as_str)
            .unwrap_or(logical);
        format!("{}/{}", self.prefix, file.trim_start_matches('/'))
    }

    /// Public URL of a route chunk
    pub fn chunk_url(&self, chunk: &str) -> String {
        self.url(&format!("chunks/{}.js", chunk))
    }
}

/// Code-split chunk name for a route
///
/// `/` → `index`, `/blog/[slug]` → `blog-_slug`, `/docs/[...path]` →
/// `docs-__path`. Characters outside `[A-Za-z0-9_-]` become `_`.
pub fn chunk_name(route: &CompiledRoute) -> String {
    let segments = route.pattern().segments();
    if segments.is_empty() {
        return "index".to_string();
    }

    segments
        .iter()
        .map(|segment| match segment {
            Segment::Static(text) => sanitize(text),
            Segment::Dynamic(name) => format!("_{}", sanitize(name)),
            Segment::CatchAll(name) => format!("__{}", sanitize(name)),
        })
        .collect::<Vec<_>>()
        .join("-")
}

fn sanitize(text: &str) -> String {
    text.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

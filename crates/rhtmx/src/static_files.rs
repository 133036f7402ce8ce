// File: src/static_files.rs
// Purpose: Pre-rendered artifact lookup and output path mapping

use std::path::{Path, PathBuf};

use rhtmx_protocol::{DataPayload, Redirect};
use tracing::{debug, warn};

use crate::error::BuildError;

pub const DOCUMENT_FILE: &str = "index.html";
pub const DATA_FILE: &str = "data.json";

/// Directory for URL path `pathname` under `root`
///
/// `/` maps to `root` itself. Empty segments are ignored; `.` and `..`
/// segments are rejected so nothing is ever read or written outside `root`.
pub(crate) fn artifact_dir(root: &Path, pathname: &str) -> Result<PathBuf, BuildError> {
    let mut dir = root.to_path_buf();
    for segment in pathname.split('/').filter(|s| !s.is_empty()) {
        if segment == "." || segment == ".." || segment.contains('\\') {
            return Err(BuildError::UnsafePath {
                path: pathname.to_string(),
            });
        }
        dir.push(segment);
    }
    Ok(dir)
}

/// What a pre-rendered path resolved to at build time
#[derive(Debug, Clone, PartialEq)]
pub enum ArtifactKind {
    Page,
    NotFound,
    Redirect(Redirect),
}

/// One pre-rendered file plus the outcome recorded next to it
#[derive(Debug, Clone)]
pub struct Artifact {
    pub body: Vec<u8>,
    pub kind: ArtifactKind,
}

/// Files written by the static site builder
#[derive(Debug, Clone)]
pub struct StaticArtifacts {
    root: PathBuf,
}

impl StaticArtifacts {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Reads the artifact for a path and request kind, if one exists
    ///
    /// `pathname` is looked up as sent (still percent-encoded), which is the
    /// form the builder writes. The kind comes from the path's `data.json`.
    pub async fn lookup(&self, pathname: &str, data: bool) -> Option<Artifact> {
        let dir = artifact_dir(&self.root, pathname).ok()?;
        let payload = tokio::fs::read(dir.join(DATA_FILE)).await.ok();
        let kind = payload
            .as_deref()
            .map(classify)
            .unwrap_or(ArtifactKind::Page);

        let body = if data {
            payload?
        } else {
            tokio::fs::read(dir.join(DOCUMENT_FILE)).await.ok()?
        };
        debug!("Serving pre-rendered {} ({:?})", pathname, kind);
        Some(Artifact { body, kind })
    }
}

fn classify(bytes: &[u8]) -> ArtifactKind {
    let payload = serde_json::from_slice(bytes)
        .ok()
        .and_then(DataPayload::from_value);
    match payload {
        Some(DataPayload::NotFound) => ArtifactKind::NotFound,
        Some(DataPayload::Redirect(redirect)) => ArtifactKind::Redirect(redirect),
        Some(DataPayload::Page(_)) => ArtifactKind::Page,
        Some(DataPayload::Error { .. }) | None => {
            warn!("Unrecognised pre-rendered payload; serving as a page");
            ArtifactKind::Page
        }
    }
}

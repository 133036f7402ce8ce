// File: src/error.rs
// Purpose: Error taxonomy for startup, build and render failures

use std::path::PathBuf;

use rhtmx_router::{BuildPathError, CompileError};
use thiserror::Error;

use crate::module::ModuleKind;

/// Fatal errors raised while building a route registry
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("app directory {0:?} does not exist")]
    MissingAppDir(PathBuf),

    #[error("failed to walk app directory")]
    Walk(#[from] walkdir::Error),

    #[error("failed to read {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid route in {file}")]
    Compile {
        file: String,
        #[source]
        source: CompileError,
    },

    #[error("directory {dir:?} contains both {first} and {second}")]
    Conflict {
        dir: String,
        first: String,
        second: String,
    },

    #[error("{file}: expected a {expected} module, found a {found} module")]
    ModuleKind {
        file: String,
        expected: ModuleKind,
        found: ModuleKind,
    },

    #[error("{file}: page declares its own loader and {loader_file} also provides one")]
    DuplicateLoader { file: String, loader_file: String },
}

/// Errors reading, writing or decoding a build manifest
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to access manifest {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed manifest")]
    Json(#[from] serde_json::Error),

    #[error("manifest references {file}, but no module is registered for it")]
    MissingModule { file: String },

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Failure before any byte of a document was sent
#[derive(Debug, Error)]
#[error("failed to render shell for {pathname}")]
pub struct ShellRenderError {
    pub pathname: String,
    #[source]
    pub source: anyhow::Error,
}

/// Fatal static generation errors
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("refusing to write outside the output directory: {path}")]
    UnsafePath { path: String },

    #[error(transparent)]
    BuildPath(#[from] BuildPathError),

    #[error("static params for {pattern} failed")]
    StaticParams {
        pattern: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("loader for {path} failed")]
    Loader {
        path: String,
        #[source]
        source: anyhow::Error,
    },

    #[error(transparent)]
    Render(#[from] ShellRenderError),

    #[error("failed to encode data payload for {path}")]
    Encode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Manifest(#[from] ManifestError),
}

use thiserror::Error;

/// Raised while turning a directory path into a [`crate::CompiledRoute`].
///
/// These are startup/build errors: a registry that contains a malformed
/// pattern must not come up at all.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("catch-all segment `[...{name}]` must be the last segment of `{pattern}`")]
    CatchAllNotLast { pattern: String, name: String },

    #[error("invalid segment `{segment}` in `{pattern}`")]
    InvalidSegment { pattern: String, segment: String },

    #[error("parameter `{name}` appears more than once in `{pattern}`")]
    DuplicateParam { pattern: String, name: String },

    #[error("failed to build matcher for `{pattern}`: {source}")]
    Regex {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Raised when substituting parameters into a pattern.
#[derive(Debug, Error)]
pub enum BuildPathError {
    #[error("pattern `{pattern}` requires parameter `{param}` but it was not supplied")]
    MissingParam { pattern: String, param: String },

    #[error("parameter `{param}` of pattern `{pattern}` is empty")]
    EmptyParam { pattern: String, param: String },

    #[error(transparent)]
    Compile(#[from] CompileError),
}

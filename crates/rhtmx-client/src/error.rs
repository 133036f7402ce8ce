use rhtmx_router::CompileError;
use thiserror::Error;

/// Why a client-side navigation could not complete
///
/// Every variant is recovered by a full browser navigation; the error is
/// reported so the host can log it.
#[derive(Debug, Error)]
pub enum NavigationError {
    #[error("route `{pattern}` from the server did not compile")]
    Compile {
        pattern: String,
        #[source]
        source: CompileError,
    },

    #[error("fetching data for {path} failed")]
    Fetch {
        path: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("data response for {path} was not a payload (status {status})")]
    InvalidPayload { path: String, status: u16 },

    #[error("no client route matches {path}")]
    NoMatch { path: String },

    #[error("loading chunk {chunk} failed")]
    Chunk {
        chunk: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("server reported an error for {path} and no error route is configured")]
    NoErrorRoute { path: String },
}

use async_trait::async_trait;
use rhtmx_protocol::Metadata;
use rhtmx_router::Params;
use serde_json::Value;

/// Raw answer to a data request
#[derive(Debug, Clone, PartialEq)]
pub struct DataResponse {
    pub status: u16,
    pub body: String,
}

impl DataResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// What the host renders after a navigation
#[derive(Debug, Clone, PartialEq)]
pub struct View {
    /// Code chunk holding the route's component tree
    pub chunk: String,
    pub pathname: String,
    pub params: Params,
    pub props: Value,
    pub metadata: Option<Metadata>,
    pub theme: Option<String>,
    /// Server-supplied message when rendering the error route
    pub error: Option<String>,
}

/// Browser side effects used by [`ClientRouter`](crate::ClientRouter)
///
/// Futures are not `Send`: browser bindings live on a single thread.
#[async_trait(?Send)]
pub trait NavigationHost {
    /// GETs `url` with the data header set
    async fn fetch_data(&self, url: &str, data_header: &str) -> anyhow::Result<DataResponse>;

    /// Loads a route's code chunk
    async fn load_chunk(&self, chunk: &str) -> anyhow::Result<()>;

    fn push_history(&self, url: &str);

    fn render(&self, view: &View);

    /// Clears the page (not-found without a not-found route)
    fn render_empty(&self);

    /// Full browser navigation
    fn assign_location(&self, url: &str);
}

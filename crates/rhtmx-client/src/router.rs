use std::cell::{Cell, RefCell};

use rhtmx_protocol::{BootstrapPayload, DataPayload, PagePayload, RouterData};
use rhtmx_router::Params;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::error::NavigationError;
use crate::host::{NavigationHost, View};
use crate::link::{data_url, intercept_click, pathname, LinkClick};
use crate::table::ClientRouteTable;

/// What is on screen
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentRoute {
    pub pathname: String,
    /// `None` when nothing was rendered (not-found without a not-found route)
    pub chunk: Option<String>,
    pub params: Params,
    pub props: Value,
}

/// How a navigation ended
#[derive(Debug, Clone, PartialEq)]
pub enum Navigation {
    /// Route chunk loaded and rendered
    Rendered { chunk: String },
    /// Not-found route rendered, or the page cleared when there is none
    NotFound,
    /// Error route rendered with the server's message
    ServerError,
    /// Handed to the browser: redirect or any fallback
    FullNavigation(String),
    /// A later navigation started before this one finished; nothing rendered
    Superseded,
}

/// Client-side navigation state machine
///
/// Navigations may overlap. Each one takes a generation number and only
/// the latest is allowed to touch the screen.
pub struct ClientRouter<H> {
    host: H,
    table: ClientRouteTable,
    data_query: String,
    data_header: String,
    generation: Cell<u64>,
    current: RefCell<Option<CurrentRoute>>,
}

impl<H: NavigationHost> ClientRouter<H> {
    pub fn new(host: H, router: &RouterData) -> Result<Self, NavigationError> {
        Ok(Self {
            host,
            table: ClientRouteTable::from_router_data(router)?,
            data_query: router.data_query.clone(),
            data_header: router.data_header.clone(),
            generation: Cell::new(0),
            current: RefCell::new(None),
        })
    }

    /// Adopts the server-rendered page without a data request
    pub fn hydrate(&self, bootstrap: BootstrapPayload) {
        let chunk = if bootstrap.error {
            self.table.error_chunk().map(str::to_string)
        } else if bootstrap.not_found {
            self.table.not_found_chunk().map(str::to_string)
        } else {
            self.table
                .match_path(&bootstrap.pathname)
                .map(|(route, _)| route.chunk.clone())
        };

        *self.current.borrow_mut() = Some(CurrentRoute {
            pathname: bootstrap.pathname,
            chunk,
            params: bootstrap.params,
            props: bootstrap.props,
        });
    }

    pub fn current(&self) -> Option<CurrentRoute> {
        self.current.borrow().clone()
    }

    pub fn table(&self) -> &ClientRouteTable {
        &self.table
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Handles an anchor click; `None` when the browser should handle it
    pub async fn click(&self, location: &Url, click: &LinkClick<'_>) -> Option<Navigation> {
        let target = intercept_click(location, click)?;
        Some(self.navigate(&target).await)
    }

    /// Pushes a history entry for `target`, then loads it
    pub async fn navigate(&self, target: &str) -> Navigation {
        self.host.push_history(target);
        self.load(target).await
    }

    /// Back/forward: the browser already moved the history cursor
    pub async fn pop_state(&self, target: &str) -> Navigation {
        self.load(target).await
    }

    async fn load(&self, target: &str) -> Navigation {
        let generation = self.generation.get() + 1;
        self.generation.set(generation);
        debug!(target, generation, "navigate");

        match self.resolve(target, generation).await {
            Ok(navigation) => navigation,
            Err(_) if self.is_stale(generation) => Navigation::Superseded,
            Err(err) => {
                warn!("Falling back to full navigation: {}", err);
                self.host.assign_location(target);
                Navigation::FullNavigation(target.to_string())
            }
        }
    }

    fn is_stale(&self, generation: u64) -> bool {
        self.generation.get() != generation
    }

    async fn resolve(&self, target: &str, generation: u64) -> Result<Navigation, NavigationError> {
        let path = pathname(target).to_string();

        let response = self
            .host
            .fetch_data(&data_url(target, &self.data_query), &self.data_header)
            .await
            .map_err(|source| NavigationError::Fetch {
                path: path.clone(),
                source,
            })?;
        if self.is_stale(generation) {
            return Ok(Navigation::Superseded);
        }

        let invalid = || NavigationError::InvalidPayload {
            path: path.clone(),
            status: response.status,
        };
        let payload = serde_json::from_str::<Value>(&response.body)
            .ok()
            .and_then(DataPayload::from_value)
            .ok_or_else(invalid)?;

        match payload {
            DataPayload::Error { message } => {
                let chunk = self
                    .table
                    .error_chunk()
                    .ok_or_else(|| NavigationError::NoErrorRoute { path: path.clone() })?
                    .to_string();
                let view = View {
                    chunk,
                    pathname: path.clone(),
                    params: Params::new(),
                    props: Value::Object(Default::default()),
                    metadata: None,
                    theme: None,
                    error: Some(message),
                };
                self.show(generation, view, Navigation::ServerError).await
            }
            DataPayload::Redirect(redirect) => {
                self.host.assign_location(&redirect.destination);
                Ok(Navigation::FullNavigation(redirect.destination))
            }
            DataPayload::NotFound => match self.table.not_found_chunk() {
                Some(chunk) => {
                    let view = View {
                        chunk: chunk.to_string(),
                        pathname: path.clone(),
                        params: Params::new(),
                        props: Value::Object(Default::default()),
                        metadata: None,
                        theme: None,
                        error: None,
                    };
                    self.show(generation, view, Navigation::NotFound).await
                }
                None => {
                    self.host.render_empty();
                    *self.current.borrow_mut() = Some(CurrentRoute {
                        pathname: path,
                        chunk: None,
                        params: Params::new(),
                        props: Value::Null,
                    });
                    Ok(Navigation::NotFound)
                }
            },
            DataPayload::Page(page) => {
                if !response.is_success() {
                    return Err(invalid());
                }
                let (route, params) = self
                    .table
                    .match_path(&path)
                    .ok_or_else(|| NavigationError::NoMatch { path: path.clone() })?;
                let chunk = route.chunk.clone();
                let PagePayload {
                    props,
                    metadata,
                    theme,
                } = page;
                let view = View {
                    chunk: chunk.clone(),
                    pathname: path.clone(),
                    params,
                    props,
                    metadata,
                    theme,
                    error: None,
                };
                self.show(generation, view, Navigation::Rendered { chunk }).await
            }
        }
    }

    /// Loads the view's chunk and renders it unless superseded meanwhile
    async fn show(
        &self,
        generation: u64,
        view: View,
        navigation: Navigation,
    ) -> Result<Navigation, NavigationError> {
        self.host
            .load_chunk(&view.chunk)
            .await
            .map_err(|source| NavigationError::Chunk {
                chunk: view.chunk.clone(),
                source,
            })?;
        if self.is_stale(generation) {
            return Ok(Navigation::Superseded);
        }

        self.host.render(&view);
        *self.current.borrow_mut() = Some(CurrentRoute {
            pathname: view.pathname,
            chunk: Some(view.chunk),
            params: view.params,
            props: view.props,
        });
        Ok(navigation)
    }
}

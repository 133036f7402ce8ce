use rhtmx_protocol::RouterData;
use rhtmx_router::{compile, match_route, CompiledRoute, Params, Routable};

use crate::error::NavigationError;

/// A compiled client route and the chunk that renders it
#[derive(Debug, Clone)]
pub struct ClientRoute {
    pub route: CompiledRoute,
    pub chunk: String,
}

impl Routable for ClientRoute {
    fn compiled(&self) -> &CompiledRoute {
        &self.route
    }
}

/// Client route list, in server matching order
#[derive(Debug, Clone, Default)]
pub struct ClientRouteTable {
    routes: Vec<ClientRoute>,
    not_found_chunk: Option<String>,
    error_chunk: Option<String>,
}

impl ClientRouteTable {
    /// Recompiles every pattern the server sent
    pub fn from_router_data(data: &RouterData) -> Result<Self, NavigationError> {
        let routes = data
            .routes
            .iter()
            .map(|entry| {
                compile(&entry.pattern)
                    .map(|route| ClientRoute {
                        route,
                        chunk: entry.chunk.clone(),
                    })
                    .map_err(|source| NavigationError::Compile {
                        pattern: entry.pattern.clone(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            routes,
            not_found_chunk: data.not_found_chunk.clone(),
            error_chunk: data.error_chunk.clone(),
        })
    }

    /// First route matching `path`
    pub fn match_path(&self, path: &str) -> Option<(&ClientRoute, Params)> {
        match_route(&self.routes, path).map(|matched| (matched.route, matched.params))
    }

    pub fn routes(&self) -> &[ClientRoute] {
        &self.routes
    }

    pub fn not_found_chunk(&self) -> Option<&str> {
        self.not_found_chunk.as_deref()
    }

    pub fn error_chunk(&self) -> Option<&str> {
        self.error_chunk.as_deref()
    }
}

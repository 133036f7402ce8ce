// File: src/registry/mod.rs
// Purpose: Route registry: loaded pages, API routes and special routes

mod scan;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arc_swap::ArcSwap;
use axum::http::Method;
use rhtmx_protocol::{ClientRouteEntry, RouterData};
use rhtmx_router::{match_route, CompiledRoute, Routable, RouteMatch};

use crate::api::ApiHandler;
use crate::assets::chunk_name;
use crate::component::{Component, RenderTree};
use crate::config::Config;
use crate::error::RegistryError;
use crate::loader::ServerLoader;
use crate::middleware::Middleware;
use crate::module::{
    LoaderModule, ModuleResolver, PageModule, RenderMode, RouteModule, SourceFile, StaticParamsFn,
};

pub(crate) use scan::resolve_checked;

/// Chunk name of the not-found route
pub const NOT_FOUND_CHUNK: &str = "not-found";

/// Chunk name of the error route
pub const ERROR_CHUNK: &str = "error";

/// Where and how to discover routes
#[derive(Debug, Clone)]
pub struct RegistryOptions {
    pub app_dir: PathBuf,
    pub extensions: Vec<String>,
    pub sort_by_specificity: bool,
}

impl RegistryOptions {
    pub fn new(app_dir: impl Into<PathBuf>) -> Self {
        Self {
            app_dir: app_dir.into(),
            extensions: vec!["rs".to_string(), "rhtmx".to_string()],
            sort_by_specificity: false,
        }
    }

    pub fn from_config(config: &Config, root: impl AsRef<Path>) -> Self {
        Self {
            app_dir: config.app_dir(root),
            extensions: config.routing.extensions.clone(),
            sort_by_specificity: config.routing.sort_by_specificity,
        }
    }
}

/// A layout in a page's chain
#[derive(Clone)]
pub struct LayoutEntry {
    pub file: String,
    pub component: Arc<dyn Component>,
}

/// A page route ready to serve
pub struct LoadedRoute {
    pub route: CompiledRoute,
    /// Page file relative to the app directory
    pub file: String,
    pub component: Arc<dyn Component>,
    /// Outermost first
    pub layouts: Vec<LayoutEntry>,
    pub middleware: Vec<Arc<dyn Middleware>>,
    pub loader: Option<Arc<dyn ServerLoader>>,
    pub loader_file: Option<String>,
    pub render_mode: RenderMode,
    pub static_params: Option<StaticParamsFn>,
}

impl LoadedRoute {
    /// Joins a resolved page with its layouts and optional loader module
    pub(crate) fn assemble(
        route: CompiledRoute,
        file: &SourceFile,
        page: PageModule,
        layouts: Vec<LayoutEntry>,
        loader: Option<(String, LoaderModule)>,
    ) -> Result<Self, RegistryError> {
        let (loader_file, middleware, file_loader) = match loader {
            Some((loader_file, module)) => (Some(loader_file), module.middleware, module.loader),
            None => (None, Vec::new(), None),
        };

        let loader = match (page.loader, file_loader) {
            (Some(_), Some(_)) => {
                return Err(RegistryError::DuplicateLoader {
                    file: file.relative.clone(),
                    loader_file: loader_file.unwrap_or_default(),
                })
            }
            (inline, from_file) => inline.or(from_file),
        };

        Ok(Self {
            route,
            file: file.relative.clone(),
            component: page.component,
            layouts,
            middleware,
            loader,
            loader_file,
            render_mode: page.render_mode,
            static_params: page.static_params,
        })
    }

    pub fn pattern(&self) -> &str {
        self.route.as_str()
    }

    pub fn render_tree(&self) -> RenderTree {
        RenderTree::new(
            self.component.clone(),
            self.layouts.iter().map(|l| l.component.clone()).collect(),
        )
    }

    pub fn chunk(&self) -> String {
        chunk_name(&self.route)
    }
}

impl Routable for LoadedRoute {
    fn compiled(&self) -> &CompiledRoute {
        &self.route
    }
}

/// An API route ready to serve
pub struct ApiRoute {
    pub route: CompiledRoute,
    pub file: String,
    pub handlers: HashMap<Method, Arc<dyn ApiHandler>>,
    pub middleware: Vec<Arc<dyn Middleware>>,
    pub method_middleware: HashMap<Method, Vec<Arc<dyn Middleware>>>,
}

impl ApiRoute {
    pub fn pattern(&self) -> &str {
        self.route.as_str()
    }

    /// Handled methods in a stable order, for `Allow` headers and manifests
    pub fn methods(&self) -> Vec<Method> {
        let mut methods: Vec<Method> = self.handlers.keys().cloned().collect();
        methods.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        methods
    }

    /// Handler for a method; HEAD falls back to GET
    pub fn handler(&self, method: &Method) -> Option<(Method, Arc<dyn ApiHandler>)> {
        if let Some(handler) = self.handlers.get(method) {
            return Some((method.clone(), handler.clone()));
        }
        if method == Method::HEAD {
            return self
                .handlers
                .get(&Method::GET)
                .map(|handler| (Method::GET, handler.clone()));
        }
        None
    }

    /// Global middleware followed by the method's own
    pub fn middleware_for(&self, method: &Method) -> Vec<Arc<dyn Middleware>> {
        let mut chain = self.middleware.clone();
        if let Some(extra) = self.method_middleware.get(method) {
            chain.extend(extra.iter().cloned());
        }
        chain
    }
}

impl Routable for ApiRoute {
    fn compiled(&self) -> &CompiledRoute {
        &self.route
    }
}

/// Immutable set of routes
///
/// Built once by walking the app directory or decoding a manifest. Hot
/// reload replaces the whole value through a [`RegistryHandle`].
pub struct Registry {
    app_dir: PathBuf,
    routes: Vec<Arc<LoadedRoute>>,
    api_routes: Vec<Arc<ApiRoute>>,
    not_found: Option<Arc<LoadedRoute>>,
    error: Option<Arc<LoadedRoute>>,
}

impl Registry {
    /// Walks the app directory
    pub fn load(
        options: &RegistryOptions,
        resolver: &dyn ModuleResolver,
    ) -> Result<Self, RegistryError> {
        scan::scan(options, resolver)
    }

    pub(crate) fn from_parts(
        app_dir: PathBuf,
        routes: Vec<Arc<LoadedRoute>>,
        api_routes: Vec<Arc<ApiRoute>>,
        not_found: Option<Arc<LoadedRoute>>,
        error: Option<Arc<LoadedRoute>>,
    ) -> Self {
        Self {
            app_dir,
            routes,
            api_routes,
            not_found,
            error,
        }
    }

    /// A registry with no routes
    pub fn empty(app_dir: impl Into<PathBuf>) -> Self {
        Self::from_parts(app_dir.into(), Vec::new(), Vec::new(), None, None)
    }

    pub fn app_dir(&self) -> &Path {
        &self.app_dir
    }

    /// Page routes in matching order
    pub fn routes(&self) -> &[Arc<LoadedRoute>] {
        &self.routes
    }

    pub fn api_routes(&self) -> &[Arc<ApiRoute>] {
        &self.api_routes
    }

    pub fn not_found_route(&self) -> Option<&Arc<LoadedRoute>> {
        self.not_found.as_ref()
    }

    pub fn error_route(&self) -> Option<&Arc<LoadedRoute>> {
        self.error.as_ref()
    }

    pub fn match_page(&self, path: &str) -> Option<RouteMatch<'_, Arc<LoadedRoute>>> {
        match_route(&self.routes, path)
    }

    pub fn match_api(&self, path: &str) -> Option<RouteMatch<'_, Arc<ApiRoute>>> {
        match_route(&self.api_routes, path)
    }

    /// Client route table, in the same order the server matches
    pub fn router_data(&self, data_query: &str, data_header: &str) -> RouterData {
        RouterData {
            routes: self
                .routes
                .iter()
                .map(|route| ClientRouteEntry {
                    pattern: route.pattern().to_string(),
                    chunk: route.chunk(),
                })
                .collect(),
            not_found_chunk: self.not_found.as_ref().map(|_| NOT_FOUND_CHUNK.to_string()),
            error_chunk: self.error.as_ref().map(|_| ERROR_CHUNK.to_string()),
            data_query: data_query.to_string(),
            data_header: data_header.to_string(),
        }
    }
}

/// Shared, atomically replaceable registry reference
///
/// Readers take a snapshot with [`RegistryHandle::load`] and keep it for the
/// whole request, so a concurrent swap is never observed half-way.
#[derive(Clone)]
pub struct RegistryHandle {
    inner: Arc<ArcSwap<Registry>>,
}

impl RegistryHandle {
    pub fn new(registry: Registry) -> Self {
        Self {
            inner: Arc::new(ArcSwap::from_pointee(registry)),
        }
    }

    pub fn load(&self) -> Arc<Registry> {
        self.inner.load_full()
    }

    pub fn replace(&self, registry: Registry) {
        self.inner.store(Arc::new(registry));
    }
}

/// Resolves a module and unwraps it as a page
pub(crate) fn resolve_page(
    resolver: &dyn ModuleResolver,
    file: &SourceFile,
) -> Result<Option<PageModule>, RegistryError> {
    Ok(match resolve_checked(resolver, file)? {
        Some(RouteModule::Page(page)) => Some(page),
        _ => None,
    })
}

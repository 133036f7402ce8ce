// File: src/module.rs
// Purpose: Typed route module contract and module resolution

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use axum::http::Method;
use futures::future::BoxFuture;
use rhtmx_router::Params;
use serde::{Deserialize, Serialize};

use crate::api::ApiHandler;
use crate::component::Component;
use crate::error::RegistryError;
use crate::loader::ServerLoader;
use crate::middleware::Middleware;
use crate::renderer::TemplateComponent;

/// When a page is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RenderMode {
    #[default]
    #[serde(rename = "on-demand")]
    OnDemand,
    #[serde(rename = "build-time-static")]
    Static,
}

/// Enumerates parameter sets for a dynamic build-time-static page
pub type StaticParamsFn = Arc<dyn Fn() -> BoxFuture<'static, Result<Vec<Params>>> + Send + Sync>;

/// A page: component plus rendering options
#[derive(Clone)]
pub struct PageModule {
    pub component: Arc<dyn Component>,
    pub render_mode: RenderMode,
    pub static_params: Option<StaticParamsFn>,
    /// Inline loader; a `loader.*` file in the same directory must not also provide one
    pub loader: Option<Arc<dyn ServerLoader>>,
}

impl PageModule {
    pub fn new(component: impl Component + 'static) -> Self {
        Self {
            component: Arc::new(component),
            render_mode: RenderMode::OnDemand,
            static_params: None,
            loader: None,
        }
    }

    /// Marks the page for pre-rendering at build time
    pub fn build_time_static(mut self) -> Self {
        self.render_mode = RenderMode::Static;
        self
    }

    pub fn static_params<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Vec<Params>>> + Send + 'static,
    {
        self.static_params = Some(Arc::new(move || -> BoxFuture<'static, Result<Vec<Params>>> {
            Box::pin(f())
        }));
        self
    }

    pub fn loader(mut self, loader: impl ServerLoader + 'static) -> Self {
        self.loader = Some(Arc::new(loader));
        self
    }
}

#[derive(Clone)]
pub struct LayoutModule {
    pub component: Arc<dyn Component>,
}

impl LayoutModule {
    pub fn new(component: impl Component + 'static) -> Self {
        Self {
            component: Arc::new(component),
        }
    }
}

/// Contents of a `loader.*` file: the page's loader and middleware
#[derive(Clone, Default)]
pub struct LoaderModule {
    pub loader: Option<Arc<dyn ServerLoader>>,
    pub middleware: Vec<Arc<dyn Middleware>>,
}

impl LoaderModule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn loader(mut self, loader: impl ServerLoader + 'static) -> Self {
        self.loader = Some(Arc::new(loader));
        self
    }

    pub fn middleware(mut self, middleware: impl Middleware + 'static) -> Self {
        self.middleware.push(Arc::new(middleware));
        self
    }
}

/// Contents of a `route.*` file
#[derive(Clone, Default)]
pub struct ApiModule {
    pub handlers: HashMap<Method, Arc<dyn ApiHandler>>,
    /// Runs for every method
    pub middleware: Vec<Arc<dyn Middleware>>,
    /// Runs after `middleware` for one method
    pub method_middleware: HashMap<Method, Vec<Arc<dyn Middleware>>>,
}

impl ApiModule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handler(mut self, method: Method, handler: impl ApiHandler + 'static) -> Self {
        self.handlers.insert(method, Arc::new(handler));
        self
    }

    pub fn get(self, handler: impl ApiHandler + 'static) -> Self {
        self.handler(Method::GET, handler)
    }

    pub fn post(self, handler: impl ApiHandler + 'static) -> Self {
        self.handler(Method::POST, handler)
    }

    pub fn put(self, handler: impl ApiHandler + 'static) -> Self {
        self.handler(Method::PUT, handler)
    }

    pub fn delete(self, handler: impl ApiHandler + 'static) -> Self {
        self.handler(Method::DELETE, handler)
    }

    pub fn middleware(mut self, middleware: impl Middleware + 'static) -> Self {
        self.middleware.push(Arc::new(middleware));
        self
    }

    pub fn method_middleware(mut self, method: Method, middleware: impl Middleware + 'static) -> Self {
        self.method_middleware
            .entry(method)
            .or_default()
            .push(Arc::new(middleware));
        self
    }
}

/// A validated route module
#[derive(Clone)]
pub enum RouteModule {
    Page(PageModule),
    Layout(LayoutModule),
    Api(ApiModule),
    Loader(LoaderModule),
}

impl RouteModule {
    pub fn kind(&self) -> ModuleKind {
        match self {
            RouteModule::Page(_) => ModuleKind::Page,
            RouteModule::Layout(_) => ModuleKind::Layout,
            RouteModule::Api(_) => ModuleKind::Api,
            RouteModule::Loader(_) => ModuleKind::Loader,
        }
    }
}

impl From<PageModule> for RouteModule {
    fn from(module: PageModule) -> Self {
        RouteModule::Page(module)
    }
}

impl From<LayoutModule> for RouteModule {
    fn from(module: LayoutModule) -> Self {
        RouteModule::Layout(module)
    }
}

impl From<ApiModule> for RouteModule {
    fn from(module: ApiModule) -> Self {
        RouteModule::Api(module)
    }
}

impl From<LoaderModule> for RouteModule {
    fn from(module: LoaderModule) -> Self {
        RouteModule::Loader(module)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleKind {
    Page,
    Layout,
    Api,
    Loader,
}

impl fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ModuleKind::Page => "page",
            ModuleKind::Layout => "layout",
            ModuleKind::Api => "api",
            ModuleKind::Loader => "loader",
        })
    }
}

/// Role of a route file, from its stem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    Page,
    Layout,
    Route,
    Loader,
    NotFound,
    Error,
}

impl FileKind {
    pub fn from_stem(stem: &str) -> Option<Self> {
        match stem {
            "page" => Some(FileKind::Page),
            "layout" => Some(FileKind::Layout),
            "route" => Some(FileKind::Route),
            "loader" => Some(FileKind::Loader),
            "not-found" => Some(FileKind::NotFound),
            "error" => Some(FileKind::Error),
            _ => None,
        }
    }

    /// Module kind a file of this role must resolve to
    pub fn expected_module(self) -> ModuleKind {
        match self {
            FileKind::Page | FileKind::NotFound | FileKind::Error => ModuleKind::Page,
            FileKind::Layout => ModuleKind::Layout,
            FileKind::Route => ModuleKind::Api,
            FileKind::Loader => ModuleKind::Loader,
        }
    }
}

/// A discovered route file
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Path relative to the app directory, `/`-separated (`blog/[slug]/page.rs`)
    pub relative: String,
    /// Path on disk
    pub path: PathBuf,
    pub kind: FileKind,
}

impl SourceFile {
    /// Classifies a path relative to `app_dir`; `None` when the stem is not a route file
    pub fn from_relative(app_dir: &Path, relative: &str) -> Option<Self> {
        let relative = relative.replace('\\', "/");
        let name = relative.rsplit('/').next()?;
        let stem = name.split_once('.').map(|(stem, _)| stem).unwrap_or(name);
        let kind = FileKind::from_stem(stem)?;
        Some(Self {
            path: app_dir.join(&relative),
            relative,
            kind,
        })
    }

    /// Directory part of `relative` (`blog/[slug]`, empty for the app root)
    pub fn dir(&self) -> &str {
        self.relative
            .rsplit_once('/')
            .map(|(dir, _)| dir)
            .unwrap_or("")
    }
}

/// Maps a discovered file to its module
///
/// `Ok(None)` means the file exports nothing usable; the registry skips it
/// with a warning. Kind validation is done by the caller.
pub trait ModuleResolver: Send + Sync {
    fn resolve(&self, file: &SourceFile) -> Result<Option<RouteModule>, RegistryError>;
}

/// Compiled modules registered by relative file path
///
/// With [`ModuleCatalog::with_templates`], `.rhtmx` page and layout files
/// without a registered module are read from disk as templates.
#[derive(Clone, Default)]
pub struct ModuleCatalog {
    modules: HashMap<String, RouteModule>,
    templates: bool,
}

impl ModuleCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_templates(mut self) -> Self {
        self.templates = true;
        self
    }

    pub fn register(mut self, relative: impl Into<String>, module: impl Into<RouteModule>) -> Self {
        self.modules.insert(relative.into(), module.into());
        self
    }

    pub fn page(self, relative: impl Into<String>, page: PageModule) -> Self {
        self.register(relative, page)
    }

    pub fn layout(self, relative: impl Into<String>, component: impl Component + 'static) -> Self {
        self.register(relative, LayoutModule::new(component))
    }

    pub fn api(self, relative: impl Into<String>, api: ApiModule) -> Self {
        self.register(relative, api)
    }

    pub fn loader(self, relative: impl Into<String>, loader: LoaderModule) -> Self {
        self.register(relative, loader)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    fn load_template(&self, file: &SourceFile) -> Result<Option<RouteModule>, RegistryError> {
        let source = std::fs::read_to_string(&file.path).map_err(|source| RegistryError::Io {
            path: file.path.clone(),
            source,
        })?;
        if source.trim().is_empty() {
            return Ok(None);
        }

        let template = TemplateComponent::new(source);
        let module = match file.kind.expected_module() {
            ModuleKind::Page => RouteModule::Page(PageModule::new(template)),
            ModuleKind::Layout => RouteModule::Layout(LayoutModule::new(template)),
            ModuleKind::Api | ModuleKind::Loader => return Ok(None),
        };
        Ok(Some(module))
    }
}

impl ModuleResolver for ModuleCatalog {
    fn resolve(&self, file: &SourceFile) -> Result<Option<RouteModule>, RegistryError> {
        if let Some(module) = self.modules.get(&file.relative) {
            return Ok(Some(module.clone()));
        }

        let is_template = file.path.extension().and_then(|s| s.to_str()) == Some("rhtmx");
        if self.templates && is_template {
            return self.load_template(file);
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::component;
    use maud::html;

    fn source(relative: &str, path: PathBuf, kind: FileKind) -> SourceFile {
        SourceFile {
            relative: relative.to_string(),
            path,
            kind,
        }
    }

    #[test]
    fn test_registered_module_wins() {
        let catalog = ModuleCatalog::new().page(
            "about/page.rs",
            PageModule::new(component(|_| Ok(html! { "about" }))),
        );
        let file = source("about/page.rs", PathBuf::from("app/about/page.rs"), FileKind::Page);

        let module = catalog.resolve(&file).unwrap().unwrap();
        assert_eq!(module.kind(), ModuleKind::Page);
    }

    #[test]
    fn test_template_fallback_and_empty_template() {
        let dir = tempfile::tempdir().unwrap();
        let full = dir.path().join("page.rhtmx");
        let empty = dir.path().join("layout.rhtmx");
        std::fs::write(&full, "<h1>{props.title}</h1>").unwrap();
        std::fs::write(&empty, "   \n").unwrap();

        let catalog = ModuleCatalog::new().with_templates();
        let page = catalog
            .resolve(&source("page.rhtmx", full, FileKind::Page))
            .unwrap();
        assert!(matches!(page, Some(RouteModule::Page(_))));

        let layout = catalog
            .resolve(&source("layout.rhtmx", empty, FileKind::Layout))
            .unwrap();
        assert!(layout.is_none());
    }

    #[test]
    fn test_unregistered_source_file_is_none() {
        let catalog = ModuleCatalog::new().with_templates();
        let file = source("page.rs", PathBuf::from("app/page.rs"), FileKind::Page);
        assert!(catalog.resolve(&file).unwrap().is_none());
    }

    #[test]
    fn test_from_relative_classifies_stem() {
        let file = SourceFile::from_relative(Path::new("app"), "blog\\[slug]\\page.rs").unwrap();
        assert_eq!(file.kind, FileKind::Page);
        assert_eq!(file.relative, "blog/[slug]/page.rs");
        assert_eq!(file.path, Path::new("app").join("blog/[slug]/page.rs"));

        let special = SourceFile::from_relative(Path::new("app"), "not-found.rhtmx").unwrap();
        assert_eq!(special.kind, FileKind::NotFound);

        assert!(SourceFile::from_relative(Path::new("app"), "blog/helpers.rs").is_none());
    }

    #[test]
    fn test_source_file_dir() {
        let file = source("blog/[slug]/page.rs", PathBuf::new(), FileKind::Page);
        assert_eq!(file.dir(), "blog/[slug]");
        let root = source("page.rs", PathBuf::new(), FileKind::Page);
        assert_eq!(root.dir(), "");
    }
}

// File: src/manifest.rs
// Purpose: Build manifest encode/decode

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rhtmx_router::CompiledRoute;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ManifestError;
use crate::module::{ModuleResolver, RenderMode, RouteModule, SourceFile};
use crate::registry::{
    resolve_checked, resolve_page, ApiRoute, LayoutEntry, LoadedRoute, Registry,
};

/// A page route as recorded at build time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteEntry {
    pub pattern: CompiledRoute,
    pub file: String,
    /// Layout files, outermost first
    pub layouts: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loader: Option<String>,
    pub render_mode: RenderMode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRouteEntry {
    pub pattern: CompiledRoute,
    pub file: String,
    pub methods: Vec<String>,
}

/// The not-found or error route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecialRouteEntry {
    pub file: String,
    pub layouts: Vec<String>,
}

/// Flat, serializable snapshot of a [`Registry`]
///
/// Files are stored relative to the app directory; modules are resolved
/// again on decode, so the same resolver must be available at runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildManifest {
    pub generated_at: DateTime<Utc>,
    pub routes: Vec<RouteEntry>,
    pub api_routes: Vec<ApiRouteEntry>,
    pub not_found_route: Option<SpecialRouteEntry>,
    pub error_route: Option<SpecialRouteEntry>,
    /// Route pattern → code-split chunk name
    pub chunks: BTreeMap<String, String>,
}

impl BuildManifest {
    pub fn from_registry(registry: &Registry) -> Self {
        let routes = registry
            .routes()
            .iter()
            .map(|route| RouteEntry {
                pattern: route.route.clone(),
                file: route.file.clone(),
                layouts: layout_files(route),
                loader: route.loader_file.clone(),
                render_mode: route.render_mode,
            })
            .collect();

        let api_routes = registry
            .api_routes()
            .iter()
            .map(|api| ApiRouteEntry {
                pattern: api.route.clone(),
                file: api.file.clone(),
                methods: api.methods().iter().map(|m| m.to_string()).collect(),
            })
            .collect();

        let chunks = registry
            .routes()
            .iter()
            .map(|route| (route.pattern().to_string(), route.chunk()))
            .collect();

        Self {
            generated_at: Utc::now(),
            routes,
            api_routes,
            not_found_route: registry.not_found_route().map(|r| special_entry(r)),
            error_route: registry.error_route().map(|r| special_entry(r)),
            chunks,
        }
    }

    pub fn to_json(&self) -> Result<String, ManifestError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, ManifestError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn write(&self, path: &Path) -> Result<(), ManifestError> {
        let io_err = |source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        std::fs::write(path, self.to_json()?).map_err(io_err)?;
        info!("Wrote manifest with {} routes to {:?}", self.routes.len(), path);
        Ok(())
    }

    pub fn read(path: &Path) -> Result<Self, ManifestError> {
        let content = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Rebuilds the registry without walking the app directory
    ///
    /// Every file named in the manifest must resolve to a module of the
    /// right kind; a missing one is fatal.
    pub fn into_registry(
        &self,
        app_dir: &Path,
        resolver: &dyn ModuleResolver,
    ) -> Result<Registry, ManifestError> {
        let mut routes = Vec::with_capacity(self.routes.len());
        for entry in &self.routes {
            let file = source_file(app_dir, &entry.file)?;
            let page = resolve_page(resolver, &file)?.ok_or_else(|| missing(&entry.file))?;
            let layouts = decode_layouts(app_dir, resolver, &entry.layouts)?;

            let loader = match &entry.loader {
                Some(loader_file) => {
                    let source = source_file(app_dir, loader_file)?;
                    match resolve_checked(resolver, &source)? {
                        Some(RouteModule::Loader(module)) => Some((loader_file.clone(), module)),
                        _ => return Err(missing(loader_file)),
                    }
                }
                None => None,
            };

            let route = LoadedRoute::assemble(entry.pattern.clone(), &file, page, layouts, loader)?;
            debug!("Decoded {} -> {}", route.pattern(), route.file);
            routes.push(Arc::new(route));
        }

        let mut api_routes = Vec::with_capacity(self.api_routes.len());
        for entry in &self.api_routes {
            let file = source_file(app_dir, &entry.file)?;
            let Some(RouteModule::Api(api)) = resolve_checked(resolver, &file)? else {
                return Err(missing(&entry.file));
            };
            api_routes.push(Arc::new(ApiRoute {
                route: entry.pattern.clone(),
                file: entry.file.clone(),
                handlers: api.handlers,
                middleware: api.middleware,
                method_middleware: api.method_middleware,
            }));
        }

        let not_found = decode_special(app_dir, resolver, self.not_found_route.as_ref())?;
        let error = decode_special(app_dir, resolver, self.error_route.as_ref())?;

        info!(
            "Loaded {} routes and {} API routes from manifest",
            routes.len(),
            api_routes.len()
        );
        Ok(Registry::from_parts(
            app_dir.to_path_buf(),
            routes,
            api_routes,
            not_found,
            error,
        ))
    }
}

fn layout_files(route: &LoadedRoute) -> Vec<String> {
    route.layouts.iter().map(|l| l.file.clone()).collect()
}

fn special_entry(route: &LoadedRoute) -> SpecialRouteEntry {
    SpecialRouteEntry {
        file: route.file.clone(),
        layouts: layout_files(route),
    }
}

fn missing(file: &str) -> ManifestError {
    ManifestError::MissingModule {
        file: file.to_string(),
    }
}

fn source_file(app_dir: &Path, relative: &str) -> Result<SourceFile, ManifestError> {
    SourceFile::from_relative(app_dir, relative).ok_or_else(|| missing(relative))
}

fn decode_layouts(
    app_dir: &Path,
    resolver: &dyn ModuleResolver,
    files: &[String],
) -> Result<Vec<LayoutEntry>, ManifestError> {
    files
        .iter()
        .map(|relative| {
            let file = source_file(app_dir, relative)?;
            match resolve_checked(resolver, &file)? {
                Some(RouteModule::Layout(layout)) => Ok(LayoutEntry {
                    file: relative.clone(),
                    component: layout.component,
                }),
                _ => Err(missing(relative)),
            }
        })
        .collect()
}

fn decode_special(
    app_dir: &Path,
    resolver: &dyn ModuleResolver,
    entry: Option<&SpecialRouteEntry>,
) -> Result<Option<Arc<LoadedRoute>>, ManifestError> {
    let Some(entry) = entry else {
        return Ok(None);
    };
    let file = source_file(app_dir, &entry.file)?;
    let page = resolve_page(resolver, &file)?.ok_or_else(|| missing(&entry.file))?;
    let layouts = decode_layouts(app_dir, resolver, &entry.layouts)?;
    let route = rhtmx_router::compile("").map_err(|source| {
        crate::error::RegistryError::Compile {
            file: entry.file.clone(),
            source,
        }
    })?;
    let route = LoadedRoute::assemble(route, &file, page, layouts, None)?;
    Ok(Some(Arc::new(route)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::component;
    use crate::module::{ModuleCatalog, PageModule};
    use crate::registry::RegistryOptions;
    use maud::html;
    use pretty_assertions::assert_eq;

    fn app() -> (tempfile::TempDir, ModuleCatalog) {
        let dir = tempfile::tempdir().unwrap();
        for file in ["page.rs", "layout.rs", "blog/[slug]/page.rs", "not-found.rs"] {
            let path = dir.path().join(file);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, "").unwrap();
        }
        let page = || PageModule::new(component(|cx| Ok(html! { (cx.pathname()) })));
        let catalog = ModuleCatalog::new()
            .page("page.rs", page())
            .page("blog/[slug]/page.rs", page())
            .page("not-found.rs", page())
            .layout("layout.rs", component(|cx| Ok(cx.children())));
        (dir, catalog)
    }

    #[test]
    fn test_manifest_json_round_trip() {
        let (dir, catalog) = app();
        let registry = Registry::load(&RegistryOptions::new(dir.path()), &catalog).unwrap();
        let manifest = BuildManifest::from_registry(&registry);

        let decoded = BuildManifest::from_json(&manifest.to_json().unwrap()).unwrap();
        assert_eq!(decoded, manifest);
        assert_eq!(manifest.chunks["/blog/[slug]"], "blog-_slug");
        assert_eq!(manifest.routes[1].layouts, vec!["layout.rs".to_string()]);
        assert!(manifest.not_found_route.is_some());
    }

    #[test]
    fn test_decoded_registry_matches_identically() {
        let (dir, catalog) = app();
        let registry = Registry::load(&RegistryOptions::new(dir.path()), &catalog).unwrap();
        let decoded = BuildManifest::from_registry(&registry)
            .into_registry(dir.path(), &catalog)
            .unwrap();

        for path in ["/", "/blog/hello", "/blog/hello/", "/blog", "/nope"] {
            let before = registry.match_page(path).map(|m| (m.route.pattern().to_string(), m.params));
            let after = decoded.match_page(path).map(|m| (m.route.pattern().to_string(), m.params));
            assert_eq!(before, after, "{}", path);
        }
    }

    #[test]
    fn test_missing_module_is_fatal() {
        let (dir, catalog) = app();
        let registry = Registry::load(&RegistryOptions::new(dir.path()), &catalog).unwrap();
        let manifest = BuildManifest::from_registry(&registry);

        let result = manifest.into_registry(dir.path(), &ModuleCatalog::new());
        assert!(matches!(result, Err(ManifestError::MissingModule { .. })));
    }
}

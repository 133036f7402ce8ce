// File: src/registry/scan.rs
// Purpose: Walks the app directory and assembles the registry

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use rhtmx_router::{compile, normalize_path, sort_by_specificity, PathHierarchy};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use super::{resolve_page, ApiRoute, LayoutEntry, LoadedRoute, Registry, RegistryOptions};
use crate::error::RegistryError;
use crate::module::{FileKind, LoaderModule, ModuleResolver, RouteModule, SourceFile};

/// Resolves a file and rejects modules whose kind does not fit the file
pub(crate) fn resolve_checked(
    resolver: &dyn ModuleResolver,
    file: &SourceFile,
) -> Result<Option<RouteModule>, RegistryError> {
    let module = resolver.resolve(file)?;
    if let Some(module) = &module {
        let expected = file.kind.expected_module();
        if module.kind() != expected {
            return Err(RegistryError::ModuleKind {
                file: file.relative.clone(),
                expected,
                found: module.kind(),
            });
        }
    }
    Ok(module)
}

/// Route files in discovery order: depth-first, entries sorted by name
fn discover(app_dir: &Path, extensions: &[String]) -> Result<Vec<SourceFile>, RegistryError> {
    let mut files = Vec::new();

    let walker = WalkDir::new(app_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0 || !entry.file_name().to_string_lossy().starts_with('.')
        });

    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let extension = path.extension().and_then(|s| s.to_str()).unwrap_or("");
        if !extensions.iter().any(|allowed| allowed == extension) {
            continue;
        }

        let Ok(relative) = path.strip_prefix(app_dir) else {
            continue;
        };
        if let Some(file) = SourceFile::from_relative(app_dir, &relative.to_string_lossy()) {
            files.push(file);
        }
    }

    Ok(files)
}

/// Canonical key of a directory relative to the app root (`""` → `/`)
fn dir_key(dir: &str) -> String {
    normalize_path(dir).into_owned()
}

/// Layouts from the page's directory up to the root, outermost first
fn layout_chain(layouts: &HashMap<String, LayoutEntry>, dir: &str) -> Vec<LayoutEntry> {
    let key = dir_key(dir);
    let mut chain: Vec<LayoutEntry> = PathHierarchy::new(&key)
        .filter_map(|ancestor| layouts.get(ancestor).cloned())
        .collect();
    chain.reverse();
    chain
}

/// Rejects two route files of the same role, or a page next to an API route
fn check_conflicts(files: &[SourceFile]) -> Result<(), RegistryError> {
    let mut seen: HashMap<(&str, FileKind), &str> = HashMap::new();
    let mut endpoints: HashMap<&str, &str> = HashMap::new();

    for file in files {
        if let Some(first) = seen.insert((file.dir(), file.kind), &file.relative) {
            return Err(RegistryError::Conflict {
                dir: file.dir().to_string(),
                first: first.to_string(),
                second: file.relative.clone(),
            });
        }

        if matches!(file.kind, FileKind::Page | FileKind::Route) {
            if let Some(first) = endpoints.insert(file.dir(), &file.relative) {
                return Err(RegistryError::Conflict {
                    dir: file.dir().to_string(),
                    first: first.to_string(),
                    second: file.relative.clone(),
                });
            }
        }
    }

    Ok(())
}

pub(super) fn scan(
    options: &RegistryOptions,
    resolver: &dyn ModuleResolver,
) -> Result<Registry, RegistryError> {
    let app_dir = &options.app_dir;
    if !app_dir.is_dir() {
        return Err(RegistryError::MissingAppDir(app_dir.clone()));
    }

    let files = discover(app_dir, &options.extensions)?;
    check_conflicts(&files)?;

    let mut layouts: HashMap<String, LayoutEntry> = HashMap::new();
    let mut loaders: HashMap<String, (String, LoaderModule)> = HashMap::new();

    for file in &files {
        match file.kind {
            FileKind::Layout => match resolve_checked(resolver, file)? {
                Some(RouteModule::Layout(layout)) => {
                    layouts.insert(
                        dir_key(file.dir()),
                        LayoutEntry {
                            file: file.relative.clone(),
                            component: layout.component,
                        },
                    );
                }
                _ => warn!("Skipping {}: no layout module", file.relative),
            },
            FileKind::Loader => match resolve_checked(resolver, file)? {
                Some(RouteModule::Loader(loader)) => {
                    loaders.insert(dir_key(file.dir()), (file.relative.clone(), loader));
                }
                _ => warn!("Skipping {}: no loader module", file.relative),
            },
            _ => {}
        }
    }

    let mut routes = Vec::new();
    let mut api_routes = Vec::new();
    let mut not_found = None;
    let mut error = None;

    for file in &files {
        match file.kind {
            FileKind::Page => {
                let Some(page) = resolve_page(resolver, file)? else {
                    warn!("Skipping {}: no page module", file.relative);
                    continue;
                };
                let route = compile_for(file)?;
                let chain = layout_chain(&layouts, file.dir());
                let loader = loaders.get(&dir_key(file.dir())).cloned();

                debug!(
                    "Page {} -> {} ({} layouts)",
                    route.as_str(),
                    file.relative,
                    chain.len()
                );
                routes.push(Arc::new(LoadedRoute::assemble(route, file, page, chain, loader)?));
            }
            FileKind::Route => {
                let Some(RouteModule::Api(api)) = resolve_checked(resolver, file)? else {
                    warn!("Skipping {}: no API module", file.relative);
                    continue;
                };
                let route = compile_for(file)?;

                debug!("API {} -> {}", route.as_str(), file.relative);
                api_routes.push(Arc::new(ApiRoute {
                    route,
                    file: file.relative.clone(),
                    handlers: api.handlers,
                    middleware: api.middleware,
                    method_middleware: api.method_middleware,
                }));
            }
            FileKind::NotFound | FileKind::Error => {
                if !file.dir().is_empty() {
                    warn!("Ignoring {}: special routes live at the app root", file.relative);
                    continue;
                }
                let Some(route) = special_route(resolver, file, &layouts)? else {
                    warn!("Skipping {}: no page module", file.relative);
                    continue;
                };
                if file.kind == FileKind::NotFound {
                    not_found = Some(Arc::new(route));
                } else {
                    error = Some(Arc::new(route));
                }
            }
            FileKind::Layout | FileKind::Loader => {}
        }
    }

    if options.sort_by_specificity {
        sort_by_specificity(&mut routes);
        sort_by_specificity(&mut api_routes);
    }

    info!(
        "Discovered {} routes and {} API routes in {:?}",
        routes.len(),
        api_routes.len(),
        app_dir
    );

    Ok(Registry::from_parts(
        app_dir.clone(),
        routes,
        api_routes,
        not_found,
        error,
    ))
}

fn compile_for(file: &SourceFile) -> Result<rhtmx_router::CompiledRoute, RegistryError> {
    compile(file.dir()).map_err(|source| RegistryError::Compile {
        file: file.relative.clone(),
        source,
    })
}

/// Not-found and error routes: root layouts, inline loader only
fn special_route(
    resolver: &dyn ModuleResolver,
    file: &SourceFile,
    layouts: &HashMap<String, LayoutEntry>,
) -> Result<Option<LoadedRoute>, RegistryError> {
    let Some(page) = resolve_page(resolver, file)? else {
        return Ok(None);
    };
    let route = compile_for(file)?;
    let chain = layout_chain(layouts, file.dir());
    LoadedRoute::assemble(route, file, page, chain, None).map(Some)
}

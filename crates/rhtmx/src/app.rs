// File: src/app.rs
// Purpose: Wires configuration, registry, documents and serving together

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use tokio::task::JoinHandle;
use tracing::info;

use crate::assets::AssetManifest;
use crate::config::Config;
use crate::dispatcher::Dispatcher;
use crate::document::DocumentBuilder;
use crate::hot_reload::HotReloadWatcher;
use crate::manifest::BuildManifest;
use crate::module::ModuleResolver;
use crate::registry::{Registry, RegistryHandle, RegistryOptions};
use crate::server::{router, AssetMount};
use crate::ssg::{SsgBuilder, SsgReport};
use crate::static_files::StaticArtifacts;

/// A configured application rooted at a project directory
///
/// ```no_run
/// use rhtmx::{App, Config, ModuleCatalog};
///
/// # async fn run() -> anyhow::Result<()> {
/// let app = App::load(Config::load_default()?, ".", ModuleCatalog::new().with_templates())?;
/// let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
/// axum::serve(listener, app.router()).await?;
/// # Ok(())
/// # }
/// ```
pub struct App {
    config: Config,
    root: PathBuf,
    resolver: Arc<dyn ModuleResolver>,
    registry: RegistryHandle,
    documents: DocumentBuilder,
}

impl App {
    /// Loads the registry from `server.manifest` when set, otherwise walks
    /// the app directory
    pub fn load(
        config: Config,
        root: impl Into<PathBuf>,
        resolver: impl ModuleResolver + 'static,
    ) -> Result<Self> {
        let root = root.into();
        let resolver: Arc<dyn ModuleResolver> = Arc::new(resolver);

        let registry = match &config.server.manifest {
            Some(manifest) => {
                let path = root.join(manifest);
                BuildManifest::read(&path)?
                    .into_registry(&config.app_dir(&root), resolver.as_ref())
                    .with_context(|| format!("Failed to load routes from manifest {:?}", path))?
            }
            None => Registry::load(&RegistryOptions::from_config(&config, &root), resolver.as_ref())
                .context("Failed to discover routes")?,
        };

        let assets = match &config.build.asset_manifest {
            Some(path) => AssetManifest::load(&root.join(path), config.build.asset_prefix.as_str())?,
            None => AssetManifest::new(config.build.asset_prefix.as_str()),
        };
        let documents = DocumentBuilder::from_config(&config, assets);

        Ok(Self {
            config,
            root,
            resolver,
            registry: RegistryHandle::new(registry),
            documents,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn registry(&self) -> &RegistryHandle {
        &self.registry
    }

    pub fn documents(&self) -> &DocumentBuilder {
        &self.documents
    }

    pub fn dispatcher(&self) -> Dispatcher {
        let dispatcher = Dispatcher::new(self.registry.clone(), self.documents.clone());
        match &self.config.server.static_dir {
            Some(dir) => dispatcher.with_static_artifacts(StaticArtifacts::new(self.root.join(dir))),
            None => dispatcher,
        }
    }

    pub fn router(&self) -> Router {
        router(
            self.dispatcher(),
            Some(AssetMount {
                prefix: self.config.build.asset_prefix.clone(),
                dir: self.root.join(&self.config.build.public_dir),
            }),
        )
    }

    /// Pre-renders static routes and writes the manifest into `build.output_dir`
    pub async fn build(&self) -> Result<SsgReport> {
        let out_dir = self.root.join(&self.config.build.output_dir);
        let registry = self.registry.load();

        let report = SsgBuilder::new(&registry, &self.documents)
            .build(&out_dir)
            .await
            .context("Static generation failed")?;

        BuildManifest::from_registry(&registry).write(&self.config.manifest_output(&self.root))?;
        info!("Build finished: {} pages", report.pages.len());
        Ok(report)
    }

    /// Starts rebuilding the registry on file changes when hot reload is on
    ///
    /// `on_reload` runs after every successful rebuild.
    pub fn watch<F>(&self, on_reload: F) -> Result<Option<JoinHandle<()>>>
    where
        F: Fn() + Send + 'static,
    {
        if !self.config.dev.hot_reload {
            return Ok(None);
        }

        let paths: Vec<PathBuf> = self
            .config
            .dev
            .watch_paths
            .iter()
            .map(|path| self.root.join(path))
            .collect();
        let watcher = HotReloadWatcher::new(&paths, &self.config.routing.extensions)?;
        let options = RegistryOptions::from_config(&self.config, &self.root);

        Ok(Some(watcher.spawn_reloader(
            self.registry.clone(),
            options,
            self.resolver.clone(),
            on_reload,
        )))
    }
}

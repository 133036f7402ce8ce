// File: src/hot_reload.rs
// Purpose: File watching and atomic registry rebuilds in development

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use notify::{Event, EventKind, RecursiveMode, Watcher};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::module::ModuleResolver;
use crate::registry::{Registry, RegistryHandle, RegistryOptions};

/// Quiet period before a rebuild, so a burst of saves triggers one reload
const DEBOUNCE: Duration = Duration::from_millis(100);

/// Type of file change that occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Created,
    Modified,
    Removed,
}

/// Represents a file change event
#[derive(Debug, Clone)]
pub struct FileChange {
    pub path: PathBuf,
    pub kind: ChangeKind,
}

/// Hot reload watcher that monitors route files
pub struct HotReloadWatcher {
    tx: broadcast::Sender<FileChange>,
    _watcher: notify::RecommendedWatcher,
}

impl HotReloadWatcher {
    /// Watches `watch_paths` recursively for files with one of `extensions`
    pub fn new(watch_paths: &[PathBuf], extensions: &[String]) -> Result<Self> {
        let (tx, _) = broadcast::channel(100);
        let tx_clone = tx.clone();
        let extensions = extensions.to_vec();

        let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
            match res {
                Ok(event) => {
                    let kind = match event.kind {
                        EventKind::Create(_) => ChangeKind::Created,
                        EventKind::Modify(_) => ChangeKind::Modified,
                        EventKind::Remove(_) => ChangeKind::Removed,
                        _ => return,
                    };

                    for path in event.paths {
                        let extension = path.extension().and_then(|s| s.to_str()).unwrap_or("");
                        if !extensions.iter().any(|allowed| allowed == extension) {
                            continue;
                        }

                        info!("File changed: {:?} ({:?})", path, kind);

                        // Ignored when nobody is subscribed
                        let _ = tx_clone.send(FileChange { path, kind });
                    }
                }
                Err(e) => error!("Watch error: {:?}", e),
            }
        })?;

        for path in watch_paths {
            if path.exists() {
                watcher.watch(path, RecursiveMode::Recursive)?;
                info!("Watching: {:?}", path);
            } else {
                warn!("Path does not exist: {:?}", path);
            }
        }

        Ok(Self {
            tx,
            _watcher: watcher,
        })
    }

    /// Subscribe to file change events
    pub fn subscribe(&self) -> broadcast::Receiver<FileChange> {
        self.tx.subscribe()
    }

    /// Rebuilds the registry on every change and swaps it into `handle`
    ///
    /// The watcher lives as long as the returned task. A failed rebuild is
    /// logged and the previous registry keeps serving. `on_reload` runs after
    /// each successful swap.
    pub fn spawn_reloader<F>(
        self,
        handle: RegistryHandle,
        options: RegistryOptions,
        resolver: Arc<dyn ModuleResolver>,
        on_reload: F,
    ) -> JoinHandle<()>
    where
        F: Fn() + Send + 'static,
    {
        let mut rx = self.subscribe();

        tokio::spawn(async move {
            let _watcher = self;
            loop {
                match rx.recv().await {
                    Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => {}
                    Err(broadcast::error::RecvError::Closed) => break,
                }

                tokio::time::sleep(DEBOUNCE).await;
                while rx.try_recv().is_ok() {}

                if rebuild(&handle, &options, resolver.as_ref()) {
                    on_reload();
                }
            }
        })
    }
}

/// One rebuild attempt; returns whether the registry was replaced
pub fn rebuild(
    handle: &RegistryHandle,
    options: &RegistryOptions,
    resolver: &dyn ModuleResolver,
) -> bool {
    match Registry::load(options, resolver) {
        Ok(registry) => {
            info!(
                "Reloaded {} routes from {:?}",
                registry.routes().len(),
                options.app_dir
            );
            handle.replace(registry);
            true
        }
        Err(err) => {
            error!("Reload failed, keeping previous routes: {:#}", anyhow::Error::new(err));
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::component;
    use crate::module::{ModuleCatalog, PageModule};
    use maud::html;

    #[test]
    fn test_failed_rebuild_keeps_previous_registry() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("page.rs"), "").unwrap();
        let catalog = ModuleCatalog::new()
            .page("page.rs", PageModule::new(component(|_| Ok(html! { "home" }))));
        let options = RegistryOptions::new(dir.path());

        let handle = RegistryHandle::new(Registry::load(&options, &catalog).unwrap());
        assert_eq!(handle.load().routes().len(), 1);

        // A page next to an API route is a conflict
        std::fs::write(dir.path().join("route.rs"), "").unwrap();
        assert!(!rebuild(&handle, &options, &catalog));
        assert_eq!(handle.load().routes().len(), 1);

        std::fs::remove_file(dir.path().join("route.rs")).unwrap();
        std::fs::create_dir(dir.path().join("about")).unwrap();
        std::fs::write(dir.path().join("about/page.rs"), "").unwrap();
        let catalog = catalog.page("about/page.rs", PageModule::new(component(|_| Ok(html! { "about" }))));
        assert!(rebuild(&handle, &options, &catalog));
        assert_eq!(handle.load().routes().len(), 2);
    }
}

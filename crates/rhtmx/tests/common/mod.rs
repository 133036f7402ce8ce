#![allow(dead_code)]

use std::path::Path;

use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use rhtmx::server::router;
use rhtmx::{
    AssetManifest, Dispatcher, DocumentBuilder, ModuleCatalog, Registry, RegistryHandle,
    RegistryOptions, StaticArtifacts,
};
use tempfile::TempDir;
use tower::ServiceExt;

/// Project root with an `app/` directory holding the given (empty) files
pub fn project(files: &[&str]) -> TempDir {
    let root = tempfile::tempdir().unwrap();
    for file in files {
        let path = root.path().join("app").join(file);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, "").unwrap();
    }
    std::fs::create_dir_all(root.path().join("app")).unwrap();
    root
}

pub fn registry(root: &Path, catalog: &ModuleCatalog) -> Registry {
    Registry::load(&RegistryOptions::new(root.join("app")), catalog).unwrap()
}

pub fn dispatcher(root: &Path, catalog: &ModuleCatalog) -> Dispatcher {
    Dispatcher::new(
        RegistryHandle::new(registry(root, catalog)),
        DocumentBuilder::new(AssetManifest::new("/_rhtmx")),
    )
}

pub fn app(root: &Path, catalog: &ModuleCatalog) -> Router {
    router(dispatcher(root, catalog), None)
}

pub fn app_with_artifacts(root: &Path, catalog: &ModuleCatalog, dist: &Path) -> Router {
    router(
        dispatcher(root, catalog).with_static_artifacts(StaticArtifacts::new(dist)),
        None,
    )
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

pub async fn send(app: &Router, request: Request<Body>) -> TestResponse {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    TestResponse {
        status,
        headers,
        body: String::from_utf8(bytes.to_vec()).unwrap(),
    }
}

pub async fn get(app: &Router, uri: &str) -> TestResponse {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

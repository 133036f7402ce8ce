// File: src/server.rs
// Purpose: axum integration

use std::path::PathBuf;

use axum::extract::{Request, State};
use axum::response::Response;
use axum::Router;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::dispatcher::Dispatcher;

/// Static asset mount: URL prefix and directory
#[derive(Debug, Clone)]
pub struct AssetMount {
    pub prefix: String,
    pub dir: PathBuf,
}

/// Builds the HTTP router
///
/// Bundled assets are served under their prefix; every other request goes
/// through the dispatcher.
pub fn router(dispatcher: Dispatcher, assets: Option<AssetMount>) -> Router {
    let mut router = Router::new();

    if let Some(mount) = assets {
        let prefix = mount.prefix.trim_end_matches('/');
        if prefix.starts_with('/') && prefix.len() > 1 {
            router = router.nest_service(prefix, ServeDir::new(mount.dir));
        }
    }

    router
        .fallback(dispatch)
        .layer(TraceLayer::new_for_http())
        .with_state(dispatcher)
}

async fn dispatch(State(dispatcher): State<Dispatcher>, request: Request) -> Response {
    dispatcher.dispatch(request).await
}

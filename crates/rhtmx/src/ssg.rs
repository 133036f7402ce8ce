// File: src/ssg.rs
// Purpose: Build-time static generation of pages and their data payloads

use std::path::Path;

use maud::{html, DOCTYPE};
use rhtmx_protocol::{DataPayload, PagePayload, Redirect};
use rhtmx_router::Params;
use tracing::{debug, info, warn};

use crate::dispatcher::NOT_FOUND_HTML;
use crate::document::{DocumentBuilder, DocumentInput, DocumentKind};
use crate::error::BuildError;
use crate::loader::{LoaderOutcome, LoaderResult};
use crate::module::RenderMode;
use crate::registry::{LoadedRoute, Registry};
use crate::request_context::ServerContext;
use crate::static_files::{artifact_dir, DATA_FILE, DOCUMENT_FILE};
use crate::stream::StreamingRenderer;

/// A static route that produced no output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRoute {
    pub pattern: String,
    pub reason: String,
}

/// Outcome of a static build
#[derive(Debug, Default)]
pub struct SsgReport {
    /// URL paths written, in build order
    pub pages: Vec<String>,
    pub skipped: Vec<SkippedRoute>,
}

/// Pre-renders every build-time-static route
///
/// Middleware does not run at build time. Each enumerated path gets an
/// `index.html` and a `data.json` equal to the body a data request for that
/// path would return.
pub struct SsgBuilder<'a> {
    registry: &'a Registry,
    documents: &'a DocumentBuilder,
}

impl<'a> SsgBuilder<'a> {
    pub fn new(registry: &'a Registry, documents: &'a DocumentBuilder) -> Self {
        Self {
            registry,
            documents,
        }
    }

    pub async fn build(&self, out_dir: &Path) -> Result<SsgReport, BuildError> {
        let mut report = SsgReport::default();

        for route in self.registry.routes() {
            if route.render_mode != RenderMode::Static {
                continue;
            }

            let param_sets = if !route.route.pattern().is_dynamic() {
                vec![Params::new()]
            } else if let Some(enumerate) = &route.static_params {
                enumerate().await.map_err(|source| BuildError::StaticParams {
                    pattern: route.pattern().to_string(),
                    source,
                })?
            } else {
                warn!(
                    "Skipping {}: dynamic static route without static params",
                    route.pattern()
                );
                report.skipped.push(SkippedRoute {
                    pattern: route.pattern().to_string(),
                    reason: "no static params".to_string(),
                });
                continue;
            };

            for params in param_sets {
                let path = route.route.build_path(&params)?;
                self.render_path(route, &path, params, out_dir).await?;
                report.pages.push(path);
            }
        }

        info!(
            "Generated {} pages into {:?} ({} routes skipped)",
            report.pages.len(),
            out_dir,
            report.skipped.len()
        );
        Ok(report)
    }

    async fn render_path(
        &self,
        route: &LoadedRoute,
        path: &str,
        params: Params,
        out_dir: &Path,
    ) -> Result<(), BuildError> {
        let dir = artifact_dir(out_dir, path)?;
        let ctx = ServerContext::synthetic(path, params.clone());

        let result = match &route.loader {
            Some(loader) => loader.load(&ctx).await.map_err(|source| BuildError::Loader {
                path: path.to_string(),
                source,
            })?,
            None => LoaderResult::default(),
        };

        let (document, data) = match result.outcome() {
            LoaderOutcome::Redirect(redirect) => (
                redirect_document(redirect),
                DataPayload::Redirect(redirect.clone()),
            ),
            LoaderOutcome::NotFound => (self.not_found_document(&ctx).await?, DataPayload::NotFound),
            LoaderOutcome::Render => {
                let input = DocumentInput {
                    route,
                    kind: DocumentKind::Page,
                    pathname: path,
                    params,
                    props: result.props.clone(),
                    metadata: result.metadata.clone(),
                    error: None,
                };
                let document = self.documents.build(self.registry, input)?;
                let payload = DataPayload::Page(PagePayload {
                    props: result.props,
                    metadata: result.metadata,
                    theme: self.documents.theme().map(str::to_string),
                });
                (StreamingRenderer::render_to_string(document).await, payload)
            }
        };

        let json = serde_json::to_string(&data).map_err(|source| BuildError::Encode {
            path: path.to_string(),
            source,
        })?;
        write(&dir, DOCUMENT_FILE, document.as_bytes()).await?;
        write(&dir, DATA_FILE, json.as_bytes()).await?;
        debug!("Wrote {} -> {:?}", path, dir);
        Ok(())
    }

    async fn not_found_document(&self, ctx: &ServerContext) -> Result<String, BuildError> {
        let Some(route) = self.registry.not_found_route() else {
            return Ok(NOT_FOUND_HTML.to_string());
        };

        let result = match &route.loader {
            Some(loader) => loader.load(ctx).await.map_err(|source| BuildError::Loader {
                path: ctx.pathname.clone(),
                source,
            })?,
            None => LoaderResult::default(),
        };
        let document = self.documents.build(
            self.registry,
            DocumentInput {
                route: route.as_ref(),
                kind: DocumentKind::NotFound,
                pathname: &ctx.pathname,
                params: Params::new(),
                props: result.props,
                metadata: result.metadata,
                error: None,
            },
        )?;
        Ok(StreamingRenderer::render_to_string(document).await)
    }
}

fn redirect_document(redirect: &Redirect) -> String {
    html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                meta http-equiv="refresh" content=(format!("0; url={}", redirect.destination));
                link rel="canonical" href=(redirect.destination);
            }
            body {
                a href=(redirect.destination) { "Redirecting to " (redirect.destination) }
            }
        }
    }
    .into_string()
}

async fn write(dir: &Path, name: &str, contents: &[u8]) -> Result<(), BuildError> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| BuildError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    let file = dir.join(name);
    tokio::fs::write(&file, contents)
        .await
        .map_err(|source| BuildError::Io { path: file, source })
}

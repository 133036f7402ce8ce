// File: src/dispatcher.rs
// Purpose: Per-request state machine: middleware, loader, data or document response

use std::sync::Arc;

use anyhow::Error;
use axum::body::Body;
use axum::http::header::{ALLOW, CONTENT_TYPE, LOCATION};
use axum::http::{HeaderValue, Method, Request, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use rhtmx_protocol::{DataPayload, Metadata, PagePayload, Redirect};
use serde_json::{json, Value};
use tracing::{debug, error, info_span, warn, Instrument};

use crate::document::{DocumentBuilder, DocumentInput, DocumentKind};
use crate::loader::LoaderOutcome;
use crate::middleware::run_middleware;
use crate::registry::{ApiRoute, LoadedRoute, Registry, RegistryHandle};
use crate::request_context::{redirect_status, ServerContext};
use crate::static_files::{Artifact, ArtifactKind, StaticArtifacts};
use crate::stream::StreamingRenderer;

pub(crate) const NOT_FOUND_HTML: &str = "<!DOCTYPE html><html><head><title>404 Not Found</title></head><body><h1>404 Not Found</h1></body></html>";
pub(crate) const ERROR_HTML: &str = "<!DOCTYPE html><html><head><title>500 Internal Server Error</title></head><body><h1>500 Internal Server Error</h1></body></html>";

/// Dispatch states
///
/// `Start → MiddlewareRunning → LoaderRunning → {DataResponse | Redirect |
/// NotFound | DocumentRender} → Done`, with `ErrorRecovery` reachable from
/// every running state. `ErrorRecovery` always ends in `Done`.
enum State {
    Start,
    MiddlewareRunning(Arc<LoadedRoute>),
    LoaderRunning(Arc<LoadedRoute>),
    DataResponse(StatusCode, DataPayload),
    Redirect(Redirect),
    NotFound,
    DocumentRender {
        route: Arc<LoadedRoute>,
        props: Value,
        metadata: Option<Metadata>,
    },
    ErrorRecovery(Error),
    Done(Response),
}

impl State {
    fn name(&self) -> &'static str {
        match self {
            State::Start => "start",
            State::MiddlewareRunning(_) => "middleware",
            State::LoaderRunning(_) => "loader",
            State::DataResponse(..) => "data-response",
            State::Redirect(_) => "redirect",
            State::NotFound => "not-found",
            State::DocumentRender { .. } => "document",
            State::ErrorRecovery(_) => "error-recovery",
            State::Done(_) => "done",
        }
    }
}

/// Serves page, data and API requests against a registry snapshot
#[derive(Clone)]
pub struct Dispatcher {
    registry: RegistryHandle,
    documents: Arc<DocumentBuilder>,
    artifacts: Option<StaticArtifacts>,
}

impl Dispatcher {
    pub fn new(registry: RegistryHandle, documents: DocumentBuilder) -> Self {
        Self {
            registry,
            documents: Arc::new(documents),
            artifacts: None,
        }
    }

    /// Serves pre-rendered artifacts ahead of route matching
    pub fn with_static_artifacts(mut self, artifacts: StaticArtifacts) -> Self {
        self.artifacts = Some(artifacts);
        self
    }

    pub fn registry(&self) -> &RegistryHandle {
        &self.registry
    }

    pub fn documents(&self) -> &DocumentBuilder {
        &self.documents
    }

    /// Entry point for an incoming HTTP request
    pub async fn dispatch(&self, request: Request<Body>) -> Response {
        let ctx = match ServerContext::from_request(request).await {
            Ok(ctx) => ctx,
            Err(err) => {
                warn!("Rejecting request: {:#}", err);
                return (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large").into_response();
            }
        };

        let span = info_span!(
            "request",
            request_id = %ctx.request_id,
            method = %ctx.method,
            path = %ctx.pathname,
        );
        self.handle(ctx).instrument(span).await
    }

    /// Runs the state machine for one context
    pub async fn handle(&self, mut ctx: ServerContext) -> Response {
        let registry = self.registry.load();
        let data = self.is_data_request(&ctx);
        let mut state = State::Start;

        loop {
            debug!(state = state.name(), data, "dispatch");
            state = match state {
                State::Start => self.start(&registry, &mut ctx, data).await,
                State::MiddlewareRunning(route) => match run_middleware(&route.middleware, &mut ctx).await {
                    Err(err) => State::ErrorRecovery(err),
                    Ok(()) if ctx.response.is_ended() => State::Done(ctx.response.take_response()),
                    Ok(()) => State::LoaderRunning(route),
                },
                State::LoaderRunning(route) => self.run_loader(route, &ctx, data).await,
                State::DataResponse(status, payload) => State::Done((status, Json(payload)).into_response()),
                State::Redirect(redirect) => State::Done(redirect_response(&redirect)),
                State::NotFound => self.not_found(&registry, &mut ctx, data).await,
                State::DocumentRender {
                    route,
                    props,
                    metadata,
                } => {
                    let input = DocumentInput {
                        route: &route,
                        kind: DocumentKind::Page,
                        pathname: &ctx.pathname,
                        params: ctx.params.clone(),
                        props,
                        metadata,
                        error: None,
                    };
                    match self.documents.build(&registry, input) {
                        Ok(document) => State::Done(document_response(StatusCode::OK, document)),
                        Err(err) => State::ErrorRecovery(err.into()),
                    }
                }
                State::ErrorRecovery(err) => State::Done(self.recover(&registry, &mut ctx, data, err).await),
                State::Done(mut response) => {
                    ctx.response.apply_headers(&mut response);
                    return response;
                }
            };
        }
    }

    fn is_data_request(&self, ctx: &ServerContext) -> bool {
        ctx.query.has(self.documents.data_query())
            || ctx.headers.contains_key(self.documents.data_header())
    }

    async fn start(&self, registry: &Registry, ctx: &mut ServerContext, data: bool) -> State {
        let readable = ctx.method == Method::GET || ctx.method == Method::HEAD;

        if let (Some(artifacts), true) = (&self.artifacts, readable) {
            if let Some(artifact) = artifacts.lookup(ctx.uri.path(), data).await {
                return State::Done(artifact_response(artifact, data));
            }
        }

        if let Some(matched) = registry.match_api(&ctx.pathname) {
            let route = matched.route.clone();
            ctx.params = matched.params;
            return State::Done(call_api(&route, ctx).await);
        }

        let Some(matched) = registry.match_page(&ctx.pathname) else {
            return State::NotFound;
        };

        if !readable {
            return State::Done(
                (StatusCode::METHOD_NOT_ALLOWED, [(ALLOW, "GET, HEAD")]).into_response(),
            );
        }

        let route = matched.route.clone();
        ctx.params = matched.params;
        State::MiddlewareRunning(route)
    }

    async fn run_loader(&self, route: Arc<LoadedRoute>, ctx: &ServerContext, data: bool) -> State {
        let result = match &route.loader {
            Some(loader) => match loader.load(ctx).await {
                Ok(result) => result,
                Err(err) => return State::ErrorRecovery(err),
            },
            None => Default::default(),
        };

        match (result.outcome(), data) {
            (LoaderOutcome::Redirect(redirect), true) => {
                State::DataResponse(StatusCode::OK, DataPayload::Redirect(redirect.clone()))
            }
            (LoaderOutcome::Redirect(redirect), false) => State::Redirect(redirect.clone()),
            (LoaderOutcome::NotFound, _) => State::NotFound,
            (LoaderOutcome::Render, true) => State::DataResponse(
                StatusCode::OK,
                DataPayload::Page(PagePayload {
                    props: result.props,
                    metadata: result.metadata,
                    theme: self.documents.theme().map(str::to_string),
                }),
            ),
            (LoaderOutcome::Render, false) => State::DocumentRender {
                route,
                props: result.props,
                metadata: result.metadata,
            },
        }
    }

    async fn not_found(&self, registry: &Registry, ctx: &mut ServerContext, data: bool) -> State {
        if data {
            return State::DataResponse(StatusCode::NOT_FOUND, DataPayload::NotFound);
        }

        let Some(route) = registry.not_found_route().cloned() else {
            return State::Done(fallback(StatusCode::NOT_FOUND));
        };

        match self
            .render_special(registry, ctx, &route, DocumentKind::NotFound, None)
            .await
        {
            Ok(response) => State::Done(response),
            Err(err) => State::ErrorRecovery(err),
        }
    }

    /// Terminal error handling; never re-enters the state machine
    async fn recover(
        &self,
        registry: &Registry,
        ctx: &mut ServerContext,
        data: bool,
        err: Error,
    ) -> Response {
        error!("Request to {} failed: {:#}", ctx.pathname, err);
        let message = err.to_string();

        if data {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(DataPayload::error(message)),
            )
                .into_response();
        }

        let Some(route) = registry.error_route().cloned() else {
            return fallback(StatusCode::INTERNAL_SERVER_ERROR);
        };

        ctx.locals
            .insert("error".to_string(), json!({ "message": message }));
        match self
            .render_special(registry, ctx, &route, DocumentKind::Error, Some(message))
            .await
        {
            Ok(response) => response,
            Err(second) => {
                error!("Error route failed for {}: {:#}", ctx.pathname, second);
                fallback(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }

    /// Renders the not-found or error route with its own loader
    ///
    /// Redirect and not-found outcomes of that loader are ignored.
    async fn render_special(
        &self,
        registry: &Registry,
        ctx: &ServerContext,
        route: &LoadedRoute,
        kind: DocumentKind,
        error: Option<String>,
    ) -> Result<Response, Error> {
        let result = match &route.loader {
            Some(loader) => loader.load(ctx).await?,
            None => Default::default(),
        };

        let status = match kind {
            DocumentKind::NotFound => StatusCode::NOT_FOUND,
            DocumentKind::Error => StatusCode::INTERNAL_SERVER_ERROR,
            DocumentKind::Page => StatusCode::OK,
        };

        let document = self.documents.build(
            registry,
            DocumentInput {
                route,
                kind,
                pathname: &ctx.pathname,
                params: ctx.params.clone(),
                props: result.props,
                metadata: result.metadata,
                error,
            },
        )?;
        Ok(document_response(status, document))
    }
}

/// API routes: global then per-method middleware, then the handler
async fn call_api(route: &ApiRoute, ctx: &mut ServerContext) -> Response {
    let Some((method, handler)) = route.handler(&ctx.method) else {
        let allow = route
            .methods()
            .iter()
            .map(Method::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        return (StatusCode::METHOD_NOT_ALLOWED, [(ALLOW, allow)]).into_response();
    };

    let chain = route.middleware_for(&method);
    if let Err(err) = run_middleware(&chain, ctx).await {
        return api_error(route, err);
    }
    if ctx.response.is_ended() {
        return ctx.response.take_response();
    }

    match handler.call(ctx).await {
        Ok(response) => response,
        Err(err) => api_error(route, err),
    }
}

fn api_error(route: &ApiRoute, err: Error) -> Response {
    error!("API route {} failed: {:#}", route.pattern(), err);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(DataPayload::error(err.to_string())),
    )
        .into_response()
}

fn redirect_response(redirect: &Redirect) -> Response {
    match HeaderValue::from_str(&redirect.destination) {
        Ok(location) => (redirect_status(redirect.permanent), [(LOCATION, location)]).into_response(),
        Err(_) => {
            error!("Invalid redirect destination {:?}", redirect.destination);
            fallback(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

fn document_response(status: StatusCode, document: crate::document::Document) -> Response {
    let mut response = Response::new(Body::from_stream(StreamingRenderer::stream(document)));
    *response.status_mut() = status;
    response.headers_mut().insert(
        CONTENT_TYPE,
        HeaderValue::from_static("text/html; charset=utf-8"),
    );
    response
}

/// Replays the status the page had when it was built
fn artifact_response(artifact: Artifact, data: bool) -> Response {
    let status = match (&artifact.kind, data) {
        (ArtifactKind::Redirect(redirect), false) => return redirect_response(redirect),
        (ArtifactKind::NotFound, _) => StatusCode::NOT_FOUND,
        _ => StatusCode::OK,
    };
    let content_type = if data {
        "application/json"
    } else {
        "text/html; charset=utf-8"
    };
    (status, [(CONTENT_TYPE, content_type)], artifact.body).into_response()
}

fn fallback(status: StatusCode) -> Response {
    let body = if status == StatusCode::NOT_FOUND {
        NOT_FOUND_HTML
    } else {
        ERROR_HTML
    };
    (status, Html(body)).into_response()
}

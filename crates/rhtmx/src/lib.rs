// RHTMX - file-based routing for Rust web apps
// Pages, layouts, loaders and API routes discovered from an app directory,
// served with streaming server rendering or pre-rendered at build time

// ============================================================================
// Contracts
// ============================================================================

pub mod api;
pub mod component;
pub mod loader;
pub mod middleware;
pub mod module;
pub mod request_context;

// ============================================================================
// Routing and rendering pipeline
// ============================================================================

pub mod assets;
pub mod dispatcher;
pub mod document;
pub mod manifest;
pub mod registry;
pub mod renderer;
pub mod ssg;
pub mod static_files;
pub mod stream;

// ============================================================================
// Application wiring
// ============================================================================

pub mod app;
pub mod config;
pub mod error;
pub mod hot_reload;
pub mod server;

// Re-export Maud for components
pub use maud::{html, Markup, PreEscaped, DOCTYPE};

// Re-export framework types
pub use api::{handler_fn, ApiHandler, HandlerFn};
pub use app::App;
pub use assets::{chunk_name, AssetManifest};
pub use component::{component, Component, RenderContext, RenderTree};
pub use config::Config;
pub use dispatcher::Dispatcher;
pub use document::{Document, DocumentBuilder, DocumentInput, DocumentKind};
pub use error::{BuildError, ManifestError, RegistryError, ShellRenderError};
pub use hot_reload::{ChangeKind, FileChange, HotReloadWatcher};
pub use loader::{loader_fn, LoaderFn, LoaderOutcome, LoaderResult, ServerLoader};
pub use manifest::BuildManifest;
pub use middleware::{run_middleware, Middleware, Next};
pub use module::{
    ApiModule, FileKind, LayoutModule, LoaderModule, ModuleCatalog, ModuleKind, ModuleResolver,
    PageModule, RenderMode, RouteModule, SourceFile,
};
pub use registry::{ApiRoute, LoadedRoute, Registry, RegistryHandle, RegistryOptions};
pub use renderer::TemplateComponent;
pub use request_context::{QueryParams, RequestInfo, ResponseHandle, ServerContext};
pub use ssg::{SkippedRoute, SsgBuilder, SsgReport};
pub use static_files::{Artifact, ArtifactKind, StaticArtifacts};
pub use stream::{RenderStream, StreamingRenderer};

// Re-export the shared router and wire types
pub use rhtmx_protocol::{
    DataPayload, MetaTag, Metadata, OpenGraph, PagePayload, Redirect, TwitterCard,
};
pub use rhtmx_router::{build_path_from_pattern, compile, CompiledRoute, Params};

// Re-export commonly used types from dependencies
pub use async_trait::async_trait;
pub use axum;
pub use axum::http::StatusCode;

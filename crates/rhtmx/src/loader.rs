// File: src/loader.rs
// Purpose: Server loader contract and loader results

use std::future::Future;

use anyhow::Result;
use async_trait::async_trait;
use rhtmx_protocol::{Metadata, Redirect};
use serde::Serialize;
use serde_json::Value;

use crate::request_context::{RequestInfo, ServerContext};

/// What a loader returns
///
/// Only one outcome is operative. Precedence when several are set:
/// redirect, then not-found, then normal rendering with `props`.
#[derive(Debug, Clone, PartialEq)]
pub struct LoaderResult {
    pub props: Value,
    pub metadata: Option<Metadata>,
    pub redirect: Option<Redirect>,
    pub not_found: bool,
}

/// The operative outcome of a [`LoaderResult`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoaderOutcome<'a> {
    Redirect(&'a Redirect),
    NotFound,
    Render,
}

impl Default for LoaderResult {
    fn default() -> Self {
        Self {
            props: Value::Object(Default::default()),
            metadata: None,
            redirect: None,
            not_found: false,
        }
    }
}

impl LoaderResult {
    /// Render with the given props
    pub fn props(props: impl Serialize) -> Result<Self> {
        Ok(Self {
            props: serde_json::to_value(props)?,
            ..Self::default()
        })
    }

    pub fn redirect(redirect: Redirect) -> Self {
        Self {
            redirect: Some(redirect),
            ..Self::default()
        }
    }

    pub fn not_found() -> Self {
        Self {
            not_found: true,
            ..Self::default()
        }
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn outcome(&self) -> LoaderOutcome<'_> {
        if let Some(redirect) = &self.redirect {
            LoaderOutcome::Redirect(redirect)
        } else if self.not_found {
            LoaderOutcome::NotFound
        } else {
            LoaderOutcome::Render
        }
    }
}

/// Supplies a route's data before rendering
#[async_trait]
pub trait ServerLoader: Send + Sync {
    async fn load(&self, ctx: &ServerContext) -> Result<LoaderResult>;
}

/// Loader built from an async closure over a [`RequestInfo`] snapshot
pub struct LoaderFn<F> {
    f: F,
}

/// Wraps an async closure as a [`ServerLoader`]
///
/// ```
/// use rhtmx::{loader_fn, LoaderResult};
/// use serde_json::json;
///
/// let loader = loader_fn(|req| async move {
///     LoaderResult::props(json!({ "id": req.param("id") }))
/// });
/// # let _ = loader;
/// ```
pub fn loader_fn<F, Fut>(f: F) -> LoaderFn<F>
where
    F: Fn(RequestInfo) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<LoaderResult>> + Send + 'static,
{
    LoaderFn { f }
}

#[async_trait]
impl<F, Fut> ServerLoader for LoaderFn<F>
where
    F: Fn(RequestInfo) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<LoaderResult>> + Send + 'static,
{
    async fn load(&self, ctx: &ServerContext) -> Result<LoaderResult> {
        (self.f)(ctx.request_info()).await
    }
}

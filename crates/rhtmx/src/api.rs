// File: src/api.rs
// Purpose: API route handlers

use std::future::Future;

use anyhow::Result;
use async_trait::async_trait;
use axum::response::Response;

use crate::request_context::{RequestInfo, ServerContext};

/// Handles one HTTP method of an API route
#[async_trait]
pub trait ApiHandler: Send + Sync {
    async fn call(&self, ctx: &mut ServerContext) -> Result<Response>;
}

pub struct HandlerFn<F> {
    f: F,
}

/// Wraps an async closure over a [`RequestInfo`] snapshot as an [`ApiHandler`]
///
/// ```
/// use axum::response::IntoResponse;
/// use rhtmx::handler_fn;
///
/// let health = handler_fn(|_req| async { Ok("ok".into_response()) });
/// # let _ = health;
/// ```
pub fn handler_fn<F, Fut>(f: F) -> HandlerFn<F>
where
    F: Fn(RequestInfo) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Response>> + Send + 'static,
{
    HandlerFn { f }
}

#[async_trait]
impl<F, Fut> ApiHandler for HandlerFn<F>
where
    F: Fn(RequestInfo) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Response>> + Send + 'static,
{
    async fn call(&self, ctx: &mut ServerContext) -> Result<Response> {
        (self.f)(ctx.request_info()).await
    }
}

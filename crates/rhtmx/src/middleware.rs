// File: src/middleware.rs
// Purpose: Ordered middleware chain with early termination

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::request_context::ServerContext;

/// A step run before the loader
///
/// A middleware continues the chain with `next.run(ctx)`. It may instead end
/// the response (`ctx.response.end`, `redirect`, `json`), which skips the
/// remaining middleware and the loader. Returning without calling `next`
/// and without ending the response skips only the remaining middleware.
///
/// ```
/// use rhtmx::{async_trait, Middleware, Next, ServerContext};
///
/// struct RequireSession;
///
/// #[async_trait]
/// impl Middleware for RequireSession {
///     async fn handle(&self, ctx: &mut ServerContext, next: Next<'_>) -> anyhow::Result<()> {
///         if ctx.cookie("session").is_none() {
///             return ctx.response.redirect("/login", false);
///         }
///         next.run(ctx).await
///     }
/// }
/// ```
#[async_trait]
pub trait Middleware: Send + Sync {
    async fn handle(&self, ctx: &mut ServerContext, next: Next<'_>) -> Result<()>;
}

/// The rest of the chain after the current middleware
pub struct Next<'a> {
    chain: &'a [Arc<dyn Middleware>],
}

impl<'a> Next<'a> {
    pub fn new(chain: &'a [Arc<dyn Middleware>]) -> Self {
        Self { chain }
    }

    /// Runs the remaining middleware in declared order
    pub async fn run(self, ctx: &mut ServerContext) -> Result<()> {
        if ctx.response.is_ended() {
            return Ok(());
        }
        match self.chain.split_first() {
            Some((head, rest)) => head.handle(ctx, Next { chain: rest }).await,
            None => Ok(()),
        }
    }
}

/// Runs a whole chain against a context
pub async fn run_middleware(chain: &[Arc<dyn Middleware>], ctx: &mut ServerContext) -> Result<()> {
    Next::new(chain).run(ctx).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rhtmx_router::Params;
    use serde_json::json;

    struct Record(&'static str);

    #[async_trait]
    impl Middleware for Record {
        async fn handle(&self, ctx: &mut ServerContext, next: Next<'_>) -> Result<()> {
            let seen = ctx
                .locals
                .entry("seen")
                .or_insert_with(|| json!([]));
            if let Some(list) = seen.as_array_mut() {
                list.push(json!(self.0));
            }
            next.run(ctx).await
        }
    }

    struct Halt;

    #[async_trait]
    impl Middleware for Halt {
        async fn handle(&self, ctx: &mut ServerContext, _next: Next<'_>) -> Result<()> {
            ctx.response.html("stopped");
            Ok(())
        }
    }

    fn chain(items: Vec<Arc<dyn Middleware>>) -> Vec<Arc<dyn Middleware>> {
        items
    }

    #[tokio::test]
    async fn test_runs_in_declared_order() {
        let chain = chain(vec![Arc::new(Record("a")), Arc::new(Record("b"))]);
        let mut ctx = ServerContext::synthetic("/", Params::new());

        run_middleware(&chain, &mut ctx).await.unwrap();
        assert_eq!(ctx.locals["seen"], json!(["a", "b"]));
    }

    #[tokio::test]
    async fn test_ending_short_circuits() {
        let chain = chain(vec![
            Arc::new(Record("a")),
            Arc::new(Halt),
            Arc::new(Record("never")),
        ]);
        let mut ctx = ServerContext::synthetic("/", Params::new());

        run_middleware(&chain, &mut ctx).await.unwrap();
        assert!(ctx.response.is_ended());
        assert_eq!(ctx.locals["seen"], json!(["a"]));
    }
}

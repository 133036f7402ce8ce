// File: app/dashboard/loader.rs
// Purpose: Session check and dashboard data

use rhtmx::{
    async_trait, loader_fn, LoaderModule, LoaderResult, Middleware, Next, ServerContext,
    StatusCode,
};
use serde_json::json;

struct RequireSession;

#[async_trait]
impl Middleware for RequireSession {
    async fn handle(&self, ctx: &mut ServerContext, next: Next<'_>) -> anyhow::Result<()> {
        ctx.response.set_header("cache-control", "no-store")?;

        if ctx.cookie("session").is_none() {
            ctx.response.set_status(StatusCode::UNAUTHORIZED);
            ctx.response
                .html("<h1>Sign in required</h1><p>Set a <code>session</code> cookie and reload.</p>");
            return Ok(());
        }

        next.run(ctx).await
    }
}

pub fn module() -> LoaderModule {
    LoaderModule::new()
        .middleware(RequireSession)
        .loader(loader_fn(|req| async move {
            let user = req.cookies.get("session").cloned().unwrap_or_default();
            LoaderResult::props(json!({ "user": user }))
        }))
}

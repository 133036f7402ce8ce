// File: app/page.rs
// Purpose: Home page, pre-rendered at build time

use rhtmx::{component, html, loader_fn, LoaderResult, Metadata, PageModule};
use serde_json::json;

pub fn module() -> PageModule {
    PageModule::new(component(|cx| {
        Ok(html! {
            h1 { (cx.prop_str("headline").unwrap_or("RHTMX")) }
            p { "Pages, layouts and loaders come from the app directory." }
            ul {
                @for post in super::blog_loader::POSTS {
                    li { a href=(format!("/blog/{}", post.slug)) { (post.title) } }
                }
            }
        })
    }))
    .build_time_static()
    .loader(loader_fn(|_| async {
        LoaderResult::props(json!({ "headline": "Welcome to RHTMX" })).map(|result| {
            result.with_metadata(
                Metadata::new()
                    .title("RHTMX")
                    .description("File-based routing for Rust web apps"),
            )
        })
    }))
}

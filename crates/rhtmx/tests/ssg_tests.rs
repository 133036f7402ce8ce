mod common;

use std::fs;

use common::{app, get, project, registry};
use pretty_assertions::assert_eq;
use rhtmx::{
    component, html, loader_fn, App, AssetManifest, BuildError, Config, DocumentBuilder,
    LoaderResult, ModuleCatalog, PageModule, Params, Redirect, SsgBuilder,
};
use serde_json::json;

fn params(pairs: &[(&str, &str)]) -> Params {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn post_page() -> PageModule {
    PageModule::new(component(|cx| {
        Ok(html! { article { (cx.prop_str("slug").unwrap_or("")) } })
    }))
    .build_time_static()
    .loader(loader_fn(|req| async move {
        LoaderResult::props(json!({ "slug": req.param("slug") }))
    }))
}

fn documents() -> DocumentBuilder {
    DocumentBuilder::new(AssetManifest::new("/_rhtmx"))
}

#[tokio::test]
async fn test_static_route_writes_one_pair() {
    let root = project(&["about/page.rs"]);
    let catalog = ModuleCatalog::new().page(
        "about/page.rs",
        PageModule::new(component(|_| Ok(html! { h1 { "About" } }))).build_time_static(),
    );
    let registry = registry(root.path(), &catalog);
    let out = root.path().join("dist");

    let report = SsgBuilder::new(&registry, &documents()).build(&out).await.unwrap();

    assert_eq!(report.pages, vec!["/about".to_string()]);
    let html = fs::read_to_string(out.join("about/index.html")).unwrap();
    assert!(html.contains("<h1>About</h1>"));
    assert!(html.ends_with("</body></html>"));
    let data = fs::read_to_string(out.join("about/data.json")).unwrap();
    assert_eq!(data, r#"{"props":{},"metadata":null,"theme":null}"#);
}

#[tokio::test]
async fn test_static_route_ignores_enumerated_params() {
    let root = project(&["about/page.rs"]);
    let catalog = ModuleCatalog::new().page(
        "about/page.rs",
        PageModule::new(component(|_| Ok(html! { h1 { "About" } })))
            .build_time_static()
            .static_params(|| async {
                Ok(vec![params(&[("lang", "en")]), params(&[("lang", "fr")])])
            }),
    );
    let registry = registry(root.path(), &catalog);

    let report = SsgBuilder::new(&registry, &documents())
        .build(&root.path().join("dist"))
        .await
        .unwrap();
    assert_eq!(report.pages, vec!["/about".to_string()]);
}

#[tokio::test]
async fn test_on_demand_routes_are_not_generated() {
    let root = project(&["page.rs"]);
    let catalog = ModuleCatalog::new().page(
        "page.rs",
        PageModule::new(component(|_| Ok(html! { "home" }))),
    );
    let registry = registry(root.path(), &catalog);
    let out = root.path().join("dist");

    let report = SsgBuilder::new(&registry, &documents()).build(&out).await.unwrap();
    assert!(report.pages.is_empty());
    assert!(!out.join("index.html").exists());
}

#[tokio::test]
async fn test_dynamic_route_without_params_is_skipped() {
    let root = project(&["blog/[slug]/page.rs"]);
    let catalog = ModuleCatalog::new().page("blog/[slug]/page.rs", post_page());
    let registry = registry(root.path(), &catalog);
    let out = root.path().join("dist");

    let report = SsgBuilder::new(&registry, &documents()).build(&out).await.unwrap();

    assert!(report.pages.is_empty());
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].pattern, "/blog/[slug]");
}

#[tokio::test]
async fn test_enumerated_params_match_data_requests() {
    let root = project(&["blog/[slug]/page.rs"]);
    let catalog = ModuleCatalog::new().page(
        "blog/[slug]/page.rs",
        post_page().static_params(|| async {
            Ok(vec![params(&[("slug", "hello")]), params(&[("slug", "world")])])
        }),
    );
    let registry = registry(root.path(), &catalog);
    let out = root.path().join("dist");

    let report = SsgBuilder::new(&registry, &documents()).build(&out).await.unwrap();
    assert_eq!(report.pages, vec!["/blog/hello".to_string(), "/blog/world".to_string()]);

    let html = fs::read_to_string(out.join("blog/world/index.html")).unwrap();
    assert!(html.contains("<article>world</article>"));

    // The stored payload is byte-identical to what the server answers
    let server = app(root.path(), &catalog);
    let live = get(&server, "/blog/hello?_data").await;
    let stored = fs::read_to_string(out.join("blog/hello/data.json")).unwrap();
    assert_eq!(stored, live.body);
}

#[tokio::test]
async fn test_catch_all_output_path() {
    let root = project(&["docs/[...path]/page.rs"]);
    let catalog = ModuleCatalog::new().page(
        "docs/[...path]/page.rs",
        PageModule::new(component(|cx| Ok(html! { p { (cx.param("path").unwrap_or("")) } })))
            .build_time_static()
            .static_params(|| async { Ok(vec![params(&[("path", "guide/install")])]) }),
    );
    let registry = registry(root.path(), &catalog);
    let out = root.path().join("dist");

    let report = SsgBuilder::new(&registry, &documents()).build(&out).await.unwrap();

    assert_eq!(report.pages, vec!["/docs/guide/install".to_string()]);
    assert!(out.join("docs/guide/install/index.html").exists());
    assert!(out.join("docs/guide/install/data.json").exists());
}

#[tokio::test]
async fn test_missing_param_fails_build() {
    let root = project(&["blog/[slug]/page.rs"]);
    let catalog = ModuleCatalog::new().page(
        "blog/[slug]/page.rs",
        post_page().static_params(|| async { Ok(vec![params(&[("id", "1")])]) }),
    );
    let registry = registry(root.path(), &catalog);

    let err = SsgBuilder::new(&registry, &documents())
        .build(&root.path().join("dist"))
        .await
        .unwrap_err();
    assert!(matches!(err, BuildError::BuildPath(_)));
}

#[tokio::test]
async fn test_redirecting_page_gets_meta_refresh() {
    let root = project(&["old/page.rs"]);
    let catalog = ModuleCatalog::new().page(
        "old/page.rs",
        PageModule::new(component(|_| Ok(html! { "unused" })))
            .build_time_static()
            .loader(loader_fn(|_| async { Ok(LoaderResult::redirect(Redirect::permanent("/new"))) })),
    );
    let registry = registry(root.path(), &catalog);
    let out = root.path().join("dist");

    SsgBuilder::new(&registry, &documents()).build(&out).await.unwrap();

    let html = fs::read_to_string(out.join("old/index.html")).unwrap();
    assert!(html.contains(r#"content="0; url=/new""#));
    let data: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.join("old/data.json")).unwrap()).unwrap();
    assert_eq!(data, json!({"redirect": {"destination": "/new", "permanent": true}}));
}

#[tokio::test]
async fn test_app_build_manifest_reloads_same_routes() {
    let root = project(&["page.rs", "blog/[slug]/page.rs", "api/health/route.rs"]);
    let catalog = ModuleCatalog::new()
        .page(
            "page.rs",
            PageModule::new(component(|_| Ok(html! { "home" }))).build_time_static(),
        )
        .page("blog/[slug]/page.rs", post_page())
        .api(
            "api/health/route.rs",
            rhtmx::ApiModule::new().get(rhtmx::handler_fn(|_| async {
                Ok(axum::response::IntoResponse::into_response("ok"))
            })),
        );

    let mut config = Config::default();
    config.dev.hot_reload = false;
    let built = App::load(config.clone(), root.path(), catalog.clone()).unwrap();
    let report = built.build().await.unwrap();
    assert_eq!(report.pages, vec!["/".to_string()]);
    assert!(root.path().join("dist/index.html").exists());

    config.server.manifest = Some("dist/rhtmx-manifest.json".to_string());
    let loaded = App::load(config, root.path(), catalog).unwrap();

    let scanned = built.registry().load();
    let restored = loaded.registry().load();
    let patterns = |r: &rhtmx::Registry| {
        r.routes()
            .iter()
            .map(|route| route.pattern().to_string())
            .collect::<Vec<_>>()
    };
    assert_eq!(patterns(scanned.as_ref()), patterns(restored.as_ref()));

    for path in ["/", "/blog/x", "/api/health", "/nope"] {
        assert_eq!(
            scanned.match_page(path).map(|m| m.params),
            restored.match_page(path).map(|m| m.params),
            "{path}"
        );
        assert_eq!(
            scanned.match_api(path).is_some(),
            restored.match_api(path).is_some(),
            "{path}"
        );
    }
}

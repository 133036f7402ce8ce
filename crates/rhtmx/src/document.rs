// File: src/document.rs
// Purpose: Full HTML document around a rendered route tree

use maud::{html, Markup, PreEscaped, DOCTYPE};
use rhtmx_protocol::{
    escape_json_for_script, BootstrapPayload, Metadata, DATA_GLOBAL, DEFAULT_DATA_HEADER,
    DEFAULT_DATA_QUERY, ROUTER_GLOBAL,
};
use rhtmx_router::Params;
use serde_json::Value;

use crate::assets::AssetManifest;
use crate::component::{DeferredSection, RenderContext};
use crate::config::Config;
use crate::error::ShellRenderError;
use crate::registry::{LoadedRoute, Registry, ERROR_CHUNK, NOT_FOUND_CHUNK};

/// Which role the rendered route plays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Page,
    NotFound,
    Error,
}

/// Everything needed to render one document
pub struct DocumentInput<'a> {
    pub route: &'a LoadedRoute,
    pub kind: DocumentKind,
    pub pathname: &'a str,
    pub params: Params,
    pub props: Value,
    pub metadata: Option<Metadata>,
    /// Failure message when rendering the error route
    pub error: Option<String>,
}

/// A rendered document split for streaming
///
/// `shell` opens the document and carries the synchronously rendered tree,
/// `tail` carries the bootstrap data, scripts and closing tags. Deferred
/// sections are flushed between the two.
pub struct Document {
    pub shell: String,
    pub tail: String,
    pub deferred: Vec<DeferredSection>,
    pub bootstrap: BootstrapPayload,
}

impl Document {
    /// Shell and tail without any deferred content
    pub fn into_html(self) -> String {
        self.shell + &self.tail
    }
}

#[derive(Debug, Clone)]
pub struct DocumentBuilder {
    assets: AssetManifest,
    lang: String,
    theme: Option<String>,
    entry_scripts: Vec<String>,
    data_query: String,
    data_header: String,
}

impl DocumentBuilder {
    pub fn new(assets: AssetManifest) -> Self {
        Self {
            assets,
            lang: "en".to_string(),
            theme: None,
            entry_scripts: vec!["client.js".to_string()],
            data_query: DEFAULT_DATA_QUERY.to_string(),
            data_header: DEFAULT_DATA_HEADER.to_string(),
        }
    }

    pub fn from_config(config: &Config, assets: AssetManifest) -> Self {
        Self {
            assets,
            lang: config.app.lang.clone(),
            theme: config.app.theme.clone(),
            entry_scripts: config.app.entry_scripts.clone(),
            data_query: config.routing.data_query.clone(),
            data_header: config.routing.data_header.clone(),
        }
    }

    pub fn with_theme(mut self, theme: impl Into<String>) -> Self {
        self.theme = Some(theme.into());
        self
    }

    pub fn theme(&self) -> Option<&str> {
        self.theme.as_deref()
    }

    pub fn data_query(&self) -> &str {
        &self.data_query
    }

    pub fn data_header(&self) -> &str {
        &self.data_header
    }

    /// Renders the route tree and wraps it in a document
    ///
    /// Any failure here happens before a byte is sent.
    pub fn build(
        &self,
        registry: &Registry,
        input: DocumentInput<'_>,
    ) -> Result<Document, ShellRenderError> {
        let shell_error = |source: anyhow::Error| ShellRenderError {
            pathname: input.pathname.to_string(),
            source,
        };

        let mut cx = RenderContext::new(input.pathname, input.params.clone(), input.props.clone())
            .with_metadata(input.metadata.clone())
            .with_error(input.error.clone());
        let body = input.route.render_tree().render(&mut cx).map_err(shell_error)?;
        let deferred = cx.take_deferred();

        let bootstrap = BootstrapPayload {
            pathname: input.pathname.to_string(),
            params: input.params,
            props: input.props,
            metadata: input.metadata,
            not_found: input.kind == DocumentKind::NotFound,
            error: input.kind == DocumentKind::Error,
            theme: self.theme.clone(),
        };

        let chunk = match input.kind {
            DocumentKind::Page => input.route.chunk(),
            DocumentKind::NotFound => NOT_FOUND_CHUNK.to_string(),
            DocumentKind::Error => ERROR_CHUNK.to_string(),
        };

        let shell = self.shell(bootstrap.metadata.as_ref(), body);
        let tail = self
            .tail(registry, &bootstrap, &chunk)
            .map_err(|err| shell_error(err.into()))?;

        Ok(Document {
            shell,
            tail,
            deferred,
            bootstrap,
        })
    }

    fn shell(&self, metadata: Option<&Metadata>, body: Markup) -> String {
        let theme = self
            .theme
            .as_deref()
            .map(|theme| format!(r#" data-theme="{}""#, escape(theme)))
            .unwrap_or_default();

        format!(
            r#"{}<html lang="{}"{}>{}<body><div id="rhtmx-root">{}</div>"#,
            DOCTYPE.0,
            escape(&self.lang),
            theme,
            head(metadata).into_string(),
            body.into_string()
        )
    }

    fn tail(
        &self,
        registry: &Registry,
        bootstrap: &BootstrapPayload,
        chunk: &str,
    ) -> Result<String, serde_json::Error> {
        let data = escape_json_for_script(&serde_json::to_string(bootstrap)?);
        let router = registry.router_data(&self.data_query, &self.data_header);
        let router = escape_json_for_script(&serde_json::to_string(&router)?);

        let markup = html! {
            script {
                (PreEscaped(format!("window.{}={};window.{}={};", DATA_GLOBAL, data, ROUTER_GLOBAL, router)))
            }
            @for entry in &self.entry_scripts {
                script type="module" src=(self.assets.url(entry)) {}
            }
            script type="module" src=(self.assets.chunk_url(chunk)) {}
        };

        Ok(markup.into_string() + "</body></html>")
    }
}

fn escape(value: &str) -> String {
    html! { (value) }.into_string()
}

fn head(metadata: Option<&Metadata>) -> Markup {
    html! {
        head {
            meta charset="utf-8";
            meta name="viewport" content="width=device-width, initial-scale=1";
            @if let Some(metadata) = metadata {
                (meta_tags(metadata))
            }
        }
    }
}

fn meta_tags(metadata: &Metadata) -> Markup {
    let mut open_graph = Vec::new();
    if let Some(og) = &metadata.open_graph {
        for (property, value) in [
            ("og:title", &og.title),
            ("og:description", &og.description),
            ("og:image", &og.image),
            ("og:url", &og.url),
            ("og:type", &og.kind),
            ("og:site_name", &og.site_name),
        ] {
            if let Some(value) = value {
                open_graph.push((property, value.as_str()));
            }
        }
    }

    let mut twitter = Vec::new();
    if let Some(card) = &metadata.twitter {
        for (name, value) in [
            ("twitter:card", &card.card),
            ("twitter:site", &card.site),
            ("twitter:title", &card.title),
            ("twitter:description", &card.description),
            ("twitter:image", &card.image),
        ] {
            if let Some(value) = value {
                twitter.push((name, value.as_str()));
            }
        }
    }

    html! {
        @if let Some(title) = &metadata.title {
            title { (title) }
        }
        @if let Some(description) = &metadata.description {
            meta name="description" content=(description);
        }
        @for (property, content) in &open_graph {
            meta property=(property) content=(content);
        }
        @for (name, content) in &twitter {
            meta name=(name) content=(content);
        }
        @if let Some(canonical) = &metadata.canonical {
            link rel="canonical" href=(canonical);
        }
        @for tag in &metadata.tags {
            meta name=[tag.name.as_deref()] property=[tag.property.as_deref()] content=(tag.content);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::component;
    use crate::module::{PageModule, SourceFile};
    use crate::registry::LoadedRoute;
    use maud::html;
    use rhtmx_protocol::OpenGraph;
    use serde_json::json;
    use std::path::Path;
    use std::sync::Arc;

    fn route(pattern: &str, file: &str) -> LoadedRoute {
        let page = PageModule::new(component(|cx| {
            Ok(html! { h1 { (cx.prop_str("title").unwrap_or_default()) } })
        }));
        let source = SourceFile::from_relative(Path::new("app"), file).unwrap();
        LoadedRoute::assemble(rhtmx_router::compile(pattern).unwrap(), &source, page, vec![], None)
            .unwrap()
    }

    fn input<'a>(route: &'a LoadedRoute, kind: DocumentKind, props: Value) -> DocumentInput<'a> {
        DocumentInput {
            route,
            kind,
            pathname: "/blog/hello",
            params: Params::from([("slug".to_string(), "hello".to_string())]),
            props,
            metadata: Some(
                Metadata::new()
                    .title("Hello & welcome")
                    .description("A post")
                    .canonical("https://example.com/blog/hello")
                    .open_graph(OpenGraph {
                        kind: Some("article".into()),
                        ..Default::default()
                    })
                    .tag("robots", "noindex"),
            ),
            error: None,
        }
    }

    #[test]
    fn test_document_carries_head_tree_and_bootstrap() {
        let page = Arc::new(route("blog/[slug]", "blog/[slug]/page.rs"));
        let registry = Registry::from_parts(
            "app".into(),
            vec![page.clone()],
            vec![],
            None,
            None,
        );
        let builder = DocumentBuilder::new(AssetManifest::new("/_rhtmx")).with_theme("dark");

        let document = builder
            .build(&registry, input(&page, DocumentKind::Page, json!({"title": "Hi"})))
            .unwrap();
        let html = document.into_html();

        assert!(html.starts_with(r#"<!DOCTYPE html><html lang="en" data-theme="dark"><head>"#));
        assert!(html.contains("<title>Hello &amp; welcome</title>"));
        assert!(html.contains(r#"<meta name="description" content="A post">"#));
        assert!(html.contains(r#"<meta property="og:type" content="article">"#));
        assert!(html.contains(r#"<link rel="canonical" href="https://example.com/blog/hello">"#));
        assert!(html.contains(r#"<meta name="robots" content="noindex">"#));
        assert!(html.contains(r#"<div id="rhtmx-root"><h1>Hi</h1></div>"#));
        assert!(html.contains("window.__RHTMX_DATA__={\"pathname\":\"/blog/hello\""));
        assert!(html.contains("window.__RHTMX_ROUTER__={\"routes\":[{\"pattern\":\"/blog/[slug]\",\"chunk\":\"blog-_slug\"}]"));
        assert!(html.contains(r#"<script type="module" src="/_rhtmx/client.js"></script>"#));
        assert!(html.contains(r#"<script type="module" src="/_rhtmx/chunks/blog-_slug.js"></script>"#));
        assert!(html.ends_with("</body></html>"));
    }

    #[test]
    fn test_script_breakout_is_escaped() {
        let route = route("blog/[slug]", "blog/[slug]/page.rs");
        let registry = Registry::empty("app");
        let builder = DocumentBuilder::new(AssetManifest::new("/_rhtmx"));

        let document = builder
            .build(
                &registry,
                input(&route, DocumentKind::Page, json!({"x": "</script><script>alert(1)"})),
            )
            .unwrap();
        assert!(!document.tail.contains("</script><script>alert"));
        assert!(document.tail.contains("\\u003c/script\\u003e"));
    }

    #[test]
    fn test_special_documents_use_their_chunks_and_flags() {
        let route = route("", "not-found.rs");
        let registry = Registry::empty("app");
        let builder = DocumentBuilder::new(AssetManifest::new("/_rhtmx"));

        let document = builder
            .build(&registry, input(&route, DocumentKind::NotFound, json!({})))
            .unwrap();
        assert!(document.bootstrap.not_found);
        assert!(!document.bootstrap.error);
        assert!(document.tail.contains("/_rhtmx/chunks/not-found.js"));
    }

    #[test]
    fn test_component_failure_is_shell_error() {
        let page = PageModule::new(component(|_| Err(anyhow::anyhow!("boom"))));
        let source = SourceFile::from_relative(Path::new("app"), "page.rs").unwrap();
        let route =
            LoadedRoute::assemble(rhtmx_router::compile("").unwrap(), &source, page, vec![], None)
                .unwrap();
        let builder = DocumentBuilder::new(AssetManifest::new("/_rhtmx"));

        let err = builder
            .build(&Registry::empty("app"), input(&route, DocumentKind::Page, json!({})))
            .err()
            .unwrap();
        assert_eq!(err.pathname, "/blog/hello");
    }
}

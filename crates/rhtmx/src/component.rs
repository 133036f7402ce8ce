// File: src/component.rs
// Purpose: Component contract, render context and layout composition

use std::future::Future;
use std::sync::Arc;

use anyhow::Result;
use futures::future::BoxFuture;
use maud::{html, Markup, PreEscaped};
use rhtmx_protocol::Metadata;
use rhtmx_router::Params;
use serde_json::Value;

/// Anything that renders markup from a [`RenderContext`]
///
/// Implemented for closures, so most pages are plain functions:
///
/// ```
/// use rhtmx::{html, Component, RenderContext};
///
/// fn about(cx: &mut RenderContext) -> anyhow::Result<rhtmx::Markup> {
///     Ok(html! { h1 { "About " (cx.param("team").unwrap_or("us")) } })
/// }
///
/// fn assert_component(_: impl Component) {}
/// assert_component(about);
/// ```
pub trait Component: Send + Sync {
    fn render(&self, cx: &mut RenderContext) -> Result<Markup>;
}

impl<F> Component for F
where
    F: Fn(&mut RenderContext) -> Result<Markup> + Send + Sync,
{
    fn render(&self, cx: &mut RenderContext) -> Result<Markup> {
        self(cx)
    }
}

/// Pins a closure to the component signature
///
/// ```
/// use rhtmx::{component, html};
///
/// let hello = component(|cx| Ok(html! { p { "Hello " (cx.pathname()) } }));
/// # let _ = hello;
/// ```
pub fn component<F>(f: F) -> F
where
    F: Fn(&mut RenderContext) -> Result<Markup> + Send + Sync,
{
    f
}

/// A section registered with [`RenderContext::defer`]
pub struct DeferredSection {
    pub id: String,
    pub future: BoxFuture<'static, Result<Markup>>,
}

impl std::fmt::Debug for DeferredSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeferredSection").field("id", &self.id).finish()
    }
}

/// Everything a component can read while rendering
#[derive(Debug)]
pub struct RenderContext {
    pathname: String,
    params: Params,
    props: Value,
    metadata: Option<Metadata>,
    error: Option<String>,
    children: Option<Markup>,
    deferred: Vec<DeferredSection>,
}

impl RenderContext {
    pub fn new(pathname: impl Into<String>, params: Params, props: Value) -> Self {
        Self {
            pathname: pathname.into(),
            params,
            props,
            metadata: None,
            error: None,
            children: None,
            deferred: Vec::new(),
        }
    }

    pub fn with_metadata(mut self, metadata: Option<Metadata>) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_error(mut self, message: Option<String>) -> Self {
        self.error = message;
        self
    }

    pub fn pathname(&self) -> &str {
        &self.pathname
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn props(&self) -> &Value {
        &self.props
    }

    /// Top-level prop by key
    pub fn prop(&self, key: &str) -> Option<&Value> {
        self.props.get(key)
    }

    /// Top-level string prop by key
    pub fn prop_str(&self, key: &str) -> Option<&str> {
        self.props.get(key)?.as_str()
    }

    pub fn metadata(&self) -> Option<&Metadata> {
        self.metadata.as_ref()
    }

    /// Error message when rendering the error route
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Markup of the wrapped child when rendering a layout
    pub fn children(&self) -> Markup {
        self.children
            .clone()
            .unwrap_or_else(|| PreEscaped(String::new()))
    }

    /// Renders `fallback` now and streams the future's markup once ready
    ///
    /// Returns the placeholder to embed. When the future fails after the
    /// shell went out, the fallback stays in place.
    pub fn defer<F>(&mut self, fallback: Markup, future: F) -> Markup
    where
        F: Future<Output = Result<Markup>> + Send + 'static,
    {
        let id = format!("rhtmx-deferred-{}", self.deferred.len());
        let placeholder = html! {
            div id=(id) data-rhtmx-deferred { (fallback) }
        };
        self.deferred.push(DeferredSection {
            id,
            future: Box::pin(future),
        });
        placeholder
    }

    pub(crate) fn take_deferred(&mut self) -> Vec<DeferredSection> {
        std::mem::take(&mut self.deferred)
    }
}

/// A page wrapped by its layout chain
///
/// `layouts` is stored outermost first; composition applies the innermost
/// layout first, so the outermost one ends up at the top of the tree.
#[derive(Clone)]
pub struct RenderTree {
    page: Arc<dyn Component>,
    layouts: Vec<Arc<dyn Component>>,
}

impl RenderTree {
    pub fn new(page: Arc<dyn Component>, layouts: Vec<Arc<dyn Component>>) -> Self {
        Self { page, layouts }
    }

    pub fn render(&self, cx: &mut RenderContext) -> Result<Markup> {
        let markup = self.page.render(cx)?;
        let markup = self.layouts.iter().rev().try_fold(markup, |inner, layout| {
            cx.children = Some(inner);
            layout.render(cx)
        })?;
        cx.children = None;
        Ok(markup)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn wrap(tag: &'static str) -> Arc<dyn Component> {
        Arc::new(component(move |cx| {
            Ok(html! { (PreEscaped(format!("<{}>", tag))) (cx.children()) (PreEscaped(format!("</{}>", tag))) })
        }))
    }

    #[test]
    fn test_layouts_wrap_innermost_first() {
        let page: Arc<dyn Component> = Arc::new(component(|cx| {
            Ok(html! { p { (cx.prop_str("msg").unwrap_or_default()) } })
        }));
        let tree = RenderTree::new(page, vec![wrap("root"), wrap("section")]);

        let mut cx = RenderContext::new("/", Params::new(), json!({"msg": "hi"}));
        let markup = tree.render(&mut cx).unwrap();
        assert_eq!(markup.into_string(), "<root><section><p>hi</p></section></root>");
    }

    #[test]
    fn test_defer_returns_placeholder_and_registers_section() {
        let mut cx = RenderContext::new("/", Params::new(), json!({}));
        let placeholder = cx.defer(html! { "loading" }, async { Ok(html! { "done" }) });

        assert_eq!(
            placeholder.into_string(),
            r#"<div id="rhtmx-deferred-0" data-rhtmx-deferred>loading</div>"#
        );
        let sections = cx.take_deferred();
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].id, "rhtmx-deferred-0");
    }

    #[test]
    fn test_page_error_propagates() {
        let page: Arc<dyn Component> =
            Arc::new(component(|_| Err(anyhow::anyhow!("broken page"))));
        let tree = RenderTree::new(page, vec![wrap("root")]);
        let mut cx = RenderContext::new("/", Params::new(), json!({}));
        assert!(tree.render(&mut cx).is_err());
    }
}

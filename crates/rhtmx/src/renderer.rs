use crate::component::{Component, RenderContext};
use anyhow::Result;
use maud::{html, Markup, PreEscaped};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

/// `.rhtmx` template rendered as a component
///
/// Supports `{props.a.b}`, `{params.name}`, `{pathname}`, `{error}` and
/// `{children}`. Values are HTML-escaped except `{children}`, which is
/// already markup. Unknown variables are left untouched.
#[derive(Debug, Clone)]
pub struct TemplateComponent {
    source: String,
}

impl TemplateComponent {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    fn interpolate(&self, cx: &RenderContext) -> String {
        static VAR_REGEX: Lazy<Regex> = Lazy::new(|| {
            Regex::new(r"\{([a-zA-Z_][a-zA-Z0-9_\.]*)\}").expect("variable pattern is valid")
        });

        VAR_REGEX
            .replace_all(&self.source, |caps: &regex::Captures| {
                let name = &caps[1];
                lookup(cx, name).unwrap_or_else(|| format!("{{{}}}", name))
            })
            .to_string()
    }
}

impl Component for TemplateComponent {
    fn render(&self, cx: &mut RenderContext) -> Result<Markup> {
        Ok(PreEscaped(self.interpolate(cx)))
    }
}

fn lookup(cx: &RenderContext, path: &str) -> Option<String> {
    let mut parts = path.split('.');
    match parts.next()? {
        "children" => Some(cx.children().into_string()),
        "pathname" => Some(escape(cx.pathname())),
        "error" => cx.error().map(escape),
        "params" => {
            let value = cx.param(parts.next()?)?;
            Some(escape(value))
        }
        "props" => {
            let value = parts.try_fold(cx.props(), |current, key| current.get(key))?;
            Some(escape(&display(value)))
        }
        _ => None,
    }
}

fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn escape(text: &str) -> String {
    html! { (text) }.into_string()
}

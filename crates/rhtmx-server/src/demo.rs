// File: src/demo.rs
// Purpose: Module catalog for the demo app directory

use rhtmx::ModuleCatalog;

#[path = "../app/page.rs"]
mod home;

#[path = "../app/blog/[slug]/page.rs"]
mod blog_page;

#[path = "../app/blog/[slug]/loader.rs"]
mod blog_loader;

#[path = "../app/dashboard/page.rs"]
mod dashboard_page;

#[path = "../app/dashboard/loader.rs"]
mod dashboard_loader;

#[path = "../app/api/health/route.rs"]
mod health;

/// Compiled modules by file, with `.rhtmx` templates read from disk
pub fn catalog() -> ModuleCatalog {
    ModuleCatalog::new()
        .with_templates()
        .page("page.rs", home::module())
        .page("blog/[slug]/page.rs", blog_page::module())
        .loader("blog/[slug]/loader.rs", blog_loader::module())
        .page("dashboard/page.rs", dashboard_page::module())
        .loader("dashboard/loader.rs", dashboard_loader::module())
        .api("api/health/route.rs", health::module())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rhtmx::{Registry, RegistryOptions};
    use rstest::rstest;
    use std::path::Path;

    fn registry() -> Registry {
        let app_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("app");
        Registry::load(&RegistryOptions::new(app_dir), &catalog()).unwrap()
    }

    #[test]
    fn test_demo_app_loads() {
        let registry = registry();
        let mut patterns: Vec<&str> = registry.routes().iter().map(|r| r.pattern()).collect();
        patterns.sort();
        assert_eq!(patterns, vec!["/", "/about", "/blog/[slug]", "/dashboard"]);

        assert!(registry.match_api("/api/health").is_some());
        assert!(registry.not_found_route().is_some());
        assert!(registry.error_route().is_some());
    }

    #[test]
    fn test_blog_page_uses_loader_file() {
        let registry = registry();
        let matched = registry.match_page("/blog/streaming").unwrap();
        assert!(matched.route.loader.is_some());
        assert_eq!(matched.params.get("slug").map(String::as_str), Some("streaming"));
    }

    #[rstest]
    #[case("/", Some("/"))]
    #[case("/about/", Some("/about"))]
    #[case("/blog/hello-world", Some("/blog/[slug]"))]
    #[case("/blog", None)]
    #[case("/api/health", None)]
    fn test_demo_page_matching(#[case] path: &str, #[case] expected: Option<&str>) {
        let registry = registry();
        let matched = registry.match_page(path).map(|m| m.route.pattern().to_string());
        assert_eq!(matched.as_deref(), expected);
    }
}

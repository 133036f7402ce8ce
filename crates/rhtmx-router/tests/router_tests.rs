//! Integration tests for rhtmx-router
//!
//! Tests are organized by feature area and cover:
//! - Pattern compilation (static, dynamic, catch-all, groups)
//! - Matching and parameter extraction
//! - Trailing slash handling
//! - Path building and the match/build round trip
//! - Serialization of compiled routes

use pretty_assertions::assert_eq;
use rhtmx_router::*;
use rstest::rstest;

fn params(pairs: &[(&str, &str)]) -> Params {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

// ============================================================================
// Compilation
// ============================================================================

#[rstest]
#[case("", "/", "^/?$")]
#[case("about", "/about", "^/about/?$")]
#[case("/blog/[slug]", "/blog/[slug]", "^/blog/([^/]+)/?$")]
#[case("docs/[...path]", "/docs/[...path]", "^/docs/(.+?)/?$")]
#[case("(marketing)/pricing", "/pricing", "^/pricing/?$")]
#[case("shop/[category]/[item]", "/shop/[category]/[item]", "^/shop/([^/]+)/([^/]+)/?$")]
fn test_compile_patterns(#[case] dir: &str, #[case] pattern: &str, #[case] regex: &str) {
    let route = compile(dir).unwrap();
    assert_eq!(route.as_str(), pattern);
    assert_eq!(route.regex().as_str(), regex);
}

#[test]
fn test_catch_all_must_be_last() {
    let err = compile("/post/[...path]/extra").unwrap_err();
    assert!(matches!(err, CompileError::CatchAllNotLast { .. }));
    assert!(err.to_string().contains("/post/[...path]/extra"));
}

#[test]
fn test_param_names_follow_pattern_order() {
    let route = compile("[org]/[repo]/tree/[...path]").unwrap();
    assert_eq!(route.param_names(), &["org", "repo", "path"]);
    assert!(route.pattern().has_catch_all());
    assert!(route.pattern().is_dynamic());
}

// ============================================================================
// Matching
// ============================================================================

#[test]
fn test_blog_slug() {
    let route = compile("/blog/[slug]").unwrap();
    assert_eq!(
        route.match_path("/blog/hello-world"),
        Some(params(&[("slug", "hello-world")]))
    );
    assert_eq!(route.match_path("/blog"), None);
    assert_eq!(route.match_path("/blog/a/b"), None);
}

#[test]
fn test_catch_all_captures_remaining_segments() {
    let route = compile("docs/[...path]").unwrap();
    assert_eq!(
        route.match_path("/docs/guide/intro"),
        Some(params(&[("path", "guide/intro")]))
    );
    assert_eq!(route.match_path("/docs"), None);
}

#[rstest]
#[case("about", "/about")]
#[case("about", "/about/")]
#[case("", "/")]
#[case("", "")]
fn test_trailing_slash_matches_identically(#[case] dir: &str, #[case] path: &str) {
    assert!(compile(dir).unwrap().match_path(path).is_some());
}

#[rstest]
#[case("blog/[slug]", "/blog/x", "/blog/x/")]
#[case("docs/[...path]", "/docs/a/b", "/docs/a/b/")]
fn test_trailing_slash_yields_same_params(
    #[case] dir: &str,
    #[case] bare: &str,
    #[case] slashed: &str,
) {
    let route = compile(dir).unwrap();
    assert_eq!(route.match_path(bare), route.match_path(slashed));
}

#[test]
fn test_params_are_percent_decoded() {
    let route = compile("search/[term]").unwrap();
    let matched = route.match_path("/search/caf%C3%A9%20au%20lait").unwrap();
    assert_eq!(matched["term"], "café au lait");
}

#[test]
fn test_first_match_wins_in_declaration_order() {
    let routes = vec![
        compile("docs/[id]").unwrap(),
        compile("docs/intro").unwrap(),
    ];
    let matched = match_route(&routes, "/docs/intro").unwrap();
    assert_eq!(matched.route.as_str(), "/docs/[id]");
    assert_eq!(matched.params, params(&[("id", "intro")]));
}

#[test]
fn test_specificity_sort_lets_static_win() {
    let mut routes = vec![
        compile("docs/[id]").unwrap(),
        compile("docs/intro").unwrap(),
    ];
    sort_by_specificity(&mut routes);
    let matched = match_route(&routes, "/docs/intro").unwrap();
    assert_eq!(matched.route.as_str(), "/docs/intro");
}

#[test]
fn test_match_over_arcs() {
    use std::sync::Arc;
    let routes = vec![Arc::new(compile("a").unwrap()), Arc::new(compile("b").unwrap())];
    assert_eq!(match_route(&routes, "/b").unwrap().route.as_str(), "/b");
}

// ============================================================================
// Path building
// ============================================================================

#[test]
fn test_build_blog_round_trip() {
    let input = params(&[("slug", "my-post")]);
    let path = build_path_from_pattern("/blog/[slug]", &input).unwrap();
    assert_eq!(path, "/blog/my-post");

    let recovered = compile("/blog/[slug]").unwrap().match_path(&path).unwrap();
    assert_eq!(recovered, input);
}

#[rstest]
#[case("/tags/[tag]", &[("tag", "a b/c")])]
#[case("/docs/[...path]", &[("path", "guide/getting started")])]
#[case("/[lang]/docs/[...path]", &[("lang", "en-US"), ("path", "a/b/c")])]
fn test_round_trip_law(#[case] pattern: &str, #[case] pairs: &[(&str, &str)]) {
    let input = params(pairs);
    let route = compile(pattern).unwrap();
    let path = route.build_path(&input).unwrap();
    assert_eq!(route.match_path(&path), Some(input));
}

#[test]
fn test_catch_all_is_not_escaped() {
    let path =
        build_path_from_pattern("/docs/[...path]", &params(&[("path", "guide/intro")])).unwrap();
    assert_eq!(path, "/docs/guide/intro");
}

#[test]
fn test_missing_param_is_an_error() {
    let err = build_path_from_pattern("/blog/[slug]", &Params::new()).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("/blog/[slug]"));
    assert!(message.contains("slug"));
}

// ============================================================================
// Serialization
// ============================================================================

#[test]
fn test_compiled_route_serializes_as_pattern() {
    let route = compile("(shop)/products/[id]").unwrap();
    assert_eq!(serde_json::to_string(&route).unwrap(), "\"/products/[id]\"");
}

#[test]
fn test_compiled_route_deserializes_to_same_matcher() {
    let route = compile("docs/[...path]").unwrap();
    let json = serde_json::to_string(&route).unwrap();
    let decoded: CompiledRoute = serde_json::from_str(&json).unwrap();

    assert_eq!(decoded, route);
    assert_eq!(decoded.regex().as_str(), route.regex().as_str());
    for path in ["/docs/a", "/docs/a/b/", "/docs", "/other"] {
        assert_eq!(decoded.match_path(path), route.match_path(path));
    }
}

#[test]
fn test_invalid_pattern_fails_to_deserialize() {
    let result: Result<CompiledRoute, _> = serde_json::from_str("\"/a/[...b]/c\"");
    assert!(result.is_err());
}

/// First-match route lookup over any list of compiled routes
///
/// The server registry (pages, API routes) and the client route table share
/// this code path through the [`Routable`] trait.

use crate::{CompiledRoute, Params};

/// Anything that carries a compiled route
pub trait Routable {
    fn compiled(&self) -> &CompiledRoute;
}

impl Routable for CompiledRoute {
    fn compiled(&self) -> &CompiledRoute {
        self
    }
}

impl<T: Routable + ?Sized> Routable for std::sync::Arc<T> {
    fn compiled(&self) -> &CompiledRoute {
        (**self).compiled()
    }
}

/// Result of matching a path against a route list
#[derive(Debug)]
pub struct RouteMatch<'a, R> {
    /// The matched route
    pub route: &'a R,
    /// Extracted, percent-decoded parameters
    pub params: Params,
}

/// Returns the first route whose expression matches `path`
///
/// `path` must already be stripped of its query string. O(number of routes).
///
/// Declaration order is authoritative: a general pattern listed before an
/// overlapping specific one shadows it.
///
/// # Examples
///
/// ```
/// use rhtmx_router::{compile, match_route};
///
/// let routes = vec![compile("blog/[slug]").unwrap(), compile("blog/new").unwrap()];
///
/// // `/blog/new` is shadowed by the earlier dynamic route
/// let matched = match_route(&routes, "/blog/new").unwrap();
/// assert_eq!(matched.route.as_str(), "/blog/[slug]");
/// ```
pub fn match_route<'a, R: Routable>(routes: &'a [R], path: &str) -> Option<RouteMatch<'a, R>> {
    routes.iter().find_map(|route| {
        route
            .compiled()
            .match_path(path)
            .map(|params| RouteMatch { route, params })
    })
}

/// Stable sort from most to least specific
///
/// Opt-in only. Routes with equal priority keep their relative order.
pub fn sort_by_specificity<R: Routable>(routes: &mut [R]) {
    routes.sort_by_key(|route| route.compiled().pattern().priority());
}

use url::Url;

/// An anchor click as reported by the host's event listener
#[derive(Debug, Clone, Default)]
pub struct LinkClick<'a> {
    pub href: &'a str,
    /// `MouseEvent.button`; only the primary button (0) navigates in place
    pub button: i16,
    /// Ctrl, Meta, Shift or Alt held
    pub modifier: bool,
    pub target: Option<&'a str>,
    pub download: bool,
    pub default_prevented: bool,
}

/// Decides whether a click becomes a client-side navigation
///
/// Returns the path and query to navigate to, or `None` to let the browser
/// handle the click. Only same-origin, unmodified primary clicks on links
/// without a foreign `target` or `download` are taken. Fragment-only changes
/// on the current page are left to the browser.
///
/// ```
/// use rhtmx_client::{intercept_click, LinkClick};
/// use url::Url;
///
/// let here = Url::parse("https://example.com/blog").unwrap();
/// let click = LinkClick { href: "/blog/hello?ref=home", ..LinkClick::default() };
/// assert_eq!(intercept_click(&here, &click).as_deref(), Some("/blog/hello?ref=home"));
///
/// let external = LinkClick { href: "https://other.org/", ..LinkClick::default() };
/// assert_eq!(intercept_click(&here, &external), None);
/// ```
pub fn intercept_click(current: &Url, click: &LinkClick<'_>) -> Option<String> {
    if click.default_prevented || click.button != 0 || click.modifier || click.download {
        return None;
    }
    if matches!(click.target, Some(target) if !target.is_empty() && target != "_self") {
        return None;
    }

    let target = current.join(click.href).ok()?;
    if target.origin() != current.origin() {
        return None;
    }

    let same_document = target.path() == current.path() && target.query() == current.query();
    if same_document && target.fragment().is_some() {
        return None;
    }

    Some(match target.query() {
        Some(query) => format!("{}?{}", target.path(), query),
        None => target.path().to_string(),
    })
}

/// URL of the data request for a navigation target
///
/// Keeps the target's query and drops any fragment.
///
/// ```
/// use rhtmx_client::data_url;
///
/// assert_eq!(data_url("/blog/hello", "_data"), "/blog/hello?_data");
/// assert_eq!(data_url("/search?q=rust#top", "_data"), "/search?q=rust&_data");
/// ```
pub fn data_url(target: &str, data_query: &str) -> String {
    let target = target.split_once('#').map_or(target, |(before, _)| before);
    if target.contains('?') {
        format!("{}&{}", target, data_query)
    } else {
        format!("{}?{}", target, data_query)
    }
}

/// Path part of a navigation target
pub(crate) fn pathname(target: &str) -> &str {
    let end = target.find(['?', '#']).unwrap_or(target.len());
    &target[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn here() -> Url {
        Url::parse("https://example.com/docs/intro?tab=1").unwrap()
    }

    #[rstest]
    #[case::relative("guide", Some("/docs/guide"))]
    #[case::absolute_same_origin("https://example.com/about", Some("/about"))]
    #[case::other_port("https://example.com:8443/about", None)]
    #[case::other_scheme("http://example.com/about", None)]
    #[case::mailto("mailto:team@example.com", None)]
    #[case::fragment_only("#section", None)]
    #[case::same_path_other_query("?tab=2", Some("/docs/intro?tab=2"))]
    fn test_intercept_by_href(#[case] href: &str, #[case] expected: Option<&str>) {
        let click = LinkClick {
            href,
            ..LinkClick::default()
        };
        assert_eq!(intercept_click(&here(), &click).as_deref(), expected);
    }

    #[test]
    fn test_modified_clicks_are_left_to_browser() {
        let base = LinkClick {
            href: "/about",
            ..LinkClick::default()
        };

        for click in [
            LinkClick { modifier: true, ..base.clone() },
            LinkClick { button: 1, ..base.clone() },
            LinkClick { target: Some("_blank"), ..base.clone() },
            LinkClick { download: true, ..base.clone() },
            LinkClick { default_prevented: true, ..base.clone() },
        ] {
            assert_eq!(intercept_click(&here(), &click), None, "{:?}", click);
        }

        let self_target = LinkClick {
            target: Some("_self"),
            ..base
        };
        assert_eq!(intercept_click(&here(), &self_target).as_deref(), Some("/about"));
    }

    #[test]
    fn test_pathname_strips_query_and_fragment() {
        assert_eq!(pathname("/a/b?x=1#top"), "/a/b");
        assert_eq!(pathname("/a#top"), "/a");
        assert_eq!(pathname("/"), "/");
    }
}

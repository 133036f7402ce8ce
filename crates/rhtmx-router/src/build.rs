/// Path building: the inverse of matching
///
/// Used by static generation to turn enumerated parameter sets into concrete
/// URL paths. For every pattern `p` and complete parameter set `ps`,
/// `compile(p).match_path(build_path_from_pattern(p, ps))` recovers `ps`.

use crate::route::parser::parse_pattern;
use crate::route::pattern::encode_static;
use crate::route::{RoutePattern, Segment};
use crate::{BuildPathError, Params};

/// Substitutes parameters into a pattern string
///
/// Static text and dynamic values are percent-encoded; catch-all values are
/// inserted as literal multi-segment text.
///
/// # Examples
///
/// ```
/// use rhtmx_router::{build_path_from_pattern, Params};
///
/// let mut params = Params::new();
/// params.insert("slug".into(), "my-post".into());
/// assert_eq!(build_path_from_pattern("/blog/[slug]", &params).unwrap(), "/blog/my-post");
///
/// let mut params = Params::new();
/// params.insert("path".into(), "guide/intro".into());
/// assert_eq!(build_path_from_pattern("/docs/[...path]", &params).unwrap(), "/docs/guide/intro");
/// ```
pub fn build_path_from_pattern(pattern: &str, params: &Params) -> Result<String, BuildPathError> {
    let parsed = parse_pattern(pattern)?;
    substitute(&parsed, pattern, params)
}

pub(crate) fn substitute(
    pattern: &RoutePattern,
    display: &str,
    params: &Params,
) -> Result<String, BuildPathError> {
    let parts = pattern
        .segments()
        .iter()
        .map(|segment| match segment {
            Segment::Static(text) => Ok(encode_static(text).into_owned()),
            Segment::Dynamic(name) => lookup(params, display, name).map(|v| urlencoding::encode(v).into_owned()),
            Segment::CatchAll(name) => lookup(params, display, name).map(|v| v.trim_matches('/').to_string()),
        })
        .collect::<Result<Vec<_>, _>>()?;

    if parts.is_empty() {
        Ok("/".to_string())
    } else {
        Ok(format!("/{}", parts.join("/")))
    }
}

fn lookup<'p>(params: &'p Params, display: &str, name: &str) -> Result<&'p str, BuildPathError> {
    let value = params
        .get(name)
        .ok_or_else(|| BuildPathError::MissingParam {
            pattern: display.to_string(),
            param: name.to_string(),
        })?;
    if value.trim_matches('/').is_empty() {
        return Err(BuildPathError::EmptyParam {
            pattern: display.to_string(),
            param: name.to_string(),
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile;
    use pretty_assertions::assert_eq;

    fn params(pairs: &[(&str, &str)]) -> Params {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_build_root() {
        assert_eq!(build_path_from_pattern("/", &Params::new()).unwrap(), "/");
    }

    #[test]
    fn test_dynamic_values_are_encoded() {
        let path = build_path_from_pattern("/tags/[tag]", &params(&[("tag", "c# & rust")])).unwrap();
        assert_eq!(path, "/tags/c%23%20%26%20rust");

        let recovered = compile("/tags/[tag]").unwrap().match_path(&path).unwrap();
        assert_eq!(recovered["tag"], "c# & rust");
    }

    #[test]
    fn test_static_text_is_encoded() {
        let path = build_path_from_pattern("/café/[id]", &params(&[("id", "1")])).unwrap();
        assert_eq!(path, "/caf%C3%A9/1");
        assert!(compile("/café/[id]").unwrap().match_path(&path).is_some());
    }

    #[test]
    fn test_missing_param_names_pattern_and_param() {
        let err = build_path_from_pattern("/shop/[category]/[item]", &params(&[("category", "a")]))
            .unwrap_err();
        match err {
            BuildPathError::MissingParam { pattern, param } => {
                assert_eq!(pattern, "/shop/[category]/[item]");
                assert_eq!(param, "item");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_param_rejected() {
        let err = build_path_from_pattern("/blog/[slug]", &params(&[("slug", "")])).unwrap_err();
        assert!(matches!(err, BuildPathError::EmptyParam { .. }));
    }

    #[test]
    fn test_extra_params_are_ignored() {
        let path =
            build_path_from_pattern("/blog/[slug]", &params(&[("slug", "a"), ("page", "2")])).unwrap();
        assert_eq!(path, "/blog/a");
    }
}

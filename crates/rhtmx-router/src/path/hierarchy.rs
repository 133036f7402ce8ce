/// Lazy iterator over a canonical path and its ancestors
///
/// For `/a/b/c` yields `/a/b/c` → `/a/b` → `/a` → `/`. Used to collect the
/// layout chain of a page: one candidate directory per level, innermost first.
///
/// Borrows slices of the input, so walking costs no allocation.
///
/// # Examples
///
/// ```
/// use rhtmx_router::path::PathHierarchy;
///
/// let paths: Vec<&str> = PathHierarchy::new("/a/b/c").collect();
/// assert_eq!(paths, vec!["/a/b/c", "/a/b", "/a", "/"]);
/// ```
#[derive(Debug, Clone)]
pub struct PathHierarchy<'a> {
    current: Option<&'a str>,
}

impl<'a> PathHierarchy<'a> {
    /// Starts at `path`, which should be canonical (see [`super::normalize_path`])
    pub fn new(path: &'a str) -> Self {
        Self {
            current: Some(path),
        }
    }
}

impl<'a> Iterator for PathHierarchy<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current?;

        self.current = match current.rfind('/') {
            _ if current == "/" => None,
            Some(0) => Some("/"),
            Some(slash) => Some(&current[..slash]),
            None => None,
        };

        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_hierarchy() {
        let paths: Vec<&str> = PathHierarchy::new("/a/b/c/d").collect();
        assert_eq!(paths, vec!["/a/b/c/d", "/a/b/c", "/a/b", "/a", "/"]);

        let paths: Vec<&str> = PathHierarchy::new("/").collect();
        assert_eq!(paths, vec!["/"]);
    }

    #[test]
    fn test_path_hierarchy_relative_input_stops() {
        let paths: Vec<&str> = PathHierarchy::new("blog").collect();
        assert_eq!(paths, vec!["blog"]);
    }

    #[test]
    fn test_path_hierarchy_short_circuit() {
        let mut iter = PathHierarchy::new("/a/b/c/d");
        assert_eq!(iter.find(|&p| p == "/a/b"), Some("/a/b"));
        assert_eq!(iter.next(), Some("/a"));
    }
}

use std::collections::HashSet;
use std::hash::Hash;

use url::Url;

/// Resolves `href` against `base` and drops any `#fragment`.
///
/// Returns `None` for an empty reference or one the URL parser rejects.
///
/// # Examples
///
/// ```
/// use feedscout::util::normalize_url;
/// use url::Url;
///
/// let base = Url::parse("http://x/").unwrap();
/// assert_eq!(normalize_url(&base, "page#section").as_deref(), Some("http://x/page"));
/// assert_eq!(normalize_url(&base, ""), None);
/// ```
pub fn normalize_url(base: &Url, href: &str) -> Option<String> {
    if href.trim().is_empty() {
        return None;
    }

    let mut resolved = base.join(href).ok()?;
    resolved.set_fragment(None);
    Some(resolved.into())
}

/// Removes duplicates while keeping the first occurrence of each item in place.
pub fn unique_keep_order<T, I>(items: I) -> Vec<T>
where
    T: Eq + Hash + Clone,
    I: IntoIterator<Item = T>,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn base(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_fragment_is_stripped() {
        assert_eq!(
            normalize_url(&base("http://x/"), "page#section"),
            Some("http://x/page".to_owned())
        );
    }

    #[test]
    fn test_absolute_path_replaces_base_path() {
        assert_eq!(
            normalize_url(&base("https://example.com/blog/post"), "/feed.xml"),
            Some("https://example.com/feed.xml".to_owned())
        );
    }

    #[test]
    fn test_relative_path_resolves_against_directory() {
        assert_eq!(
            normalize_url(&base("https://example.com/blog/"), "rss.xml"),
            Some("https://example.com/blog/rss.xml".to_owned())
        );
    }

    #[test]
    fn test_absolute_href_wins() {
        assert_eq!(
            normalize_url(&base("https://example.com/"), "https://feeds.example.org/main"),
            Some("https://feeds.example.org/main".to_owned())
        );
    }

    #[test]
    fn test_protocol_relative_keeps_base_scheme() {
        assert_eq!(
            normalize_url(&base("http://example.com/"), "//cdn.example.com/feed"),
            Some("http://cdn.example.com/feed".to_owned())
        );
    }

    #[test]
    fn test_suffix_on_bare_host() {
        assert_eq!(
            normalize_url(&base("https://example.com"), "/rss/"),
            Some("https://example.com/rss/".to_owned())
        );
    }

    #[test]
    fn test_empty_href_is_none() {
        assert_eq!(normalize_url(&base("https://example.com/"), ""), None);
        assert_eq!(normalize_url(&base("https://example.com/"), "   "), None);
    }

    #[test]
    fn test_unique_keep_order() {
        assert_eq!(
            unique_keep_order(vec!["a", "b", "a", "c", "b"]),
            vec!["a", "b", "c"]
        );
    }

    #[test]
    fn test_unique_keep_order_empty() {
        let empty: Vec<String> = Vec::new();
        assert!(unique_keep_order(empty).is_empty());
    }

    proptest! {
        #[test]
        fn prop_unique_keep_order_matches_first_occurrences(
            items in prop::collection::vec(0u8..8, 0..40),
        ) {
            let deduped = unique_keep_order(items.clone());

            let mut expected = Vec::new();
            for item in &items {
                if !expected.contains(item) {
                    expected.push(*item);
                }
            }
            prop_assert_eq!(deduped, expected);
        }
    }
}

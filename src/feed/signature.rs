/// Number of leading characters inspected by [`is_xml_feed`].
const SIGNATURE_WINDOW: usize = 2048;

/// Prefixes that mark a body as an RSS/Atom document.
const FEED_PREFIXES: &[&str] = &["<?xml", "<rss", "<feed"];

/// RSS 2.0 channel element, accepted anywhere inside the window.
const CHANNEL_MARKER: &str = "<channel";

/// Substrings of a `Content-Type` header that announce XML or feed content.
const FEED_TYPE_MARKERS: &[&str] = &["xml", "rss", "atom"];

/// Cheap prefix check for RSS/Atom content.
///
/// Strips leading whitespace, takes the first 2048 characters and lowercases
/// them. The body passes if that window starts with `<?xml`, `<rss` or
/// `<feed`, or contains `<channel` anywhere. This is not an XML parse: an
/// arbitrary XML document (a sitemap, say) passes too.
///
/// # Examples
///
/// ```
/// use feedscout::feed::is_xml_feed;
///
/// assert!(is_xml_feed("  <?xml version=\"1.0\"?><rss></rss>"));
/// assert!(is_xml_feed("<FEED xmlns=\"http://www.w3.org/2005/Atom\">"));
/// assert!(!is_xml_feed("<html><body>hello</body></html>"));
/// assert!(!is_xml_feed(""));
/// ```
pub fn is_xml_feed(text: &str) -> bool {
    let head: String = text
        .trim_start()
        .chars()
        .take(SIGNATURE_WINDOW)
        .collect::<String>()
        .to_lowercase();

    if head.is_empty() {
        return false;
    }

    FEED_PREFIXES.iter().any(|prefix| head.starts_with(prefix)) || head.contains(CHANNEL_MARKER)
}

/// Returns true if a (lower-cased) content type mentions xml, rss or atom.
pub fn declares_feed_type(content_type: &str) -> bool {
    FEED_TYPE_MARKERS
        .iter()
        .any(|marker| content_type.contains(marker))
}

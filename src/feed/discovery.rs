use futures::FutureExt;
use scraper::{Html, Selector};
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use thiserror::Error;
use url::Url;

use crate::feed::fetcher::{FetchError, Fetcher, Page};
use crate::feed::signature::is_xml_feed;
use crate::util::{normalize_url, unique_keep_order};

/// Common feed locations probed when a site advertises no feed links.
pub const FEED_SUFFIXES: &[&str] = &[
    "/feed",
    "/feed/",
    "/rss",
    "/rss/",
    "/rss.xml",
    "/atom.xml",
    "/category/nutrition/feed",
    "/tag/nutrition/feed",
];

/// `type` attribute markers of an advertised feed link.
const LINK_TYPE_MARKERS: &[&str] = &["rss", "atom", "xml"];

/// Errors that escape a discovery call.
///
/// Network failures and unusable site URLs never show up here: they only
/// remove candidates.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// Discovery panicked; the payload message is kept
    #[error("discovery aborted: {0}")]
    Aborted(String),
}

/// Where the probed candidates of a site came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CandidateSource {
    /// `<link rel="alternate">` tags in the site's HTML
    AdvertisedLinks,
    /// The [`FEED_SUFFIXES`] table
    SuffixPaths,
}

/// Outcome of fetching the site URL itself.
#[derive(Debug)]
enum SelfCheck {
    /// Declared as XML/RSS/Atom and the body carries a feed signature
    Feed,
    /// Reachable, but not a feed
    Page(Page),
    Unreachable(FetchError),
}

/// Outcome of scanning the site's HTML for advertised feeds.
#[derive(Debug)]
enum LinkScan {
    Advertised(Vec<String>),
    NoLinks,
    NotHtml,
    Unreachable(FetchError),
}

/// Why a probed candidate was accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Acceptance {
    /// Feed content type and feed signature
    Declared,
    /// Feed signature behind an unrelated content type
    BodySignature,
}

/// Finds the validated RSS/Atom feeds of a site.
///
/// Runs an ordered fallback chain and returns the confirmed feed URLs,
/// de-duplicated in first-seen order:
///
/// 1. If `site_url` itself is served with an xml/rss/atom content type and
///    carries a feed signature, returns `[site_url]` without further requests.
/// 2. Otherwise, if the page is HTML, every `<link>` whose `rel` contains
///    `alternate` and whose `type` mentions rss, atom or xml becomes a
///    candidate.
/// 3. If no link was advertised, every entry of [`FEED_SUFFIXES`] resolved
///    against `site_url` becomes a candidate.
/// 4. Each candidate is fetched and kept if its body passes
///    [`is_xml_feed`](crate::feed::is_xml_feed), whatever its content type.
///
/// Fetch failures at any stage are logged and treated as "nothing found", and
/// so is a `site_url` that does not parse as an absolute URL.
///
/// # Errors
///
/// Returns [`DiscoveryError::Aborted`] if discovery panics.
pub async fn discover_feeds(
    fetcher: &Fetcher,
    site_url: &str,
) -> Result<Vec<String>, DiscoveryError> {
    catch_panic(run_stages(fetcher, site_url)).await
}

async fn run_stages(fetcher: &Fetcher, site_url: &str) -> Vec<String> {
    let base = match Url::parse(site_url) {
        Ok(base) => base,
        Err(e) => {
            tracing::warn!(site = %site_url, error = %e, "Site URL does not parse, nothing to probe");
            return Vec::new();
        }
    };

    let scan = match check_self(fetcher, site_url).await {
        SelfCheck::Feed => {
            tracing::info!(site = %site_url, "Site URL is itself a feed");
            return vec![site_url.to_owned()];
        }
        SelfCheck::Page(page) => {
            if page.url != site_url {
                tracing::debug!(site = %site_url, final_url = %page.url, "Site redirected");
            }
            scan_links(&page, &base)
        }
        SelfCheck::Unreachable(e) if e.is_transient() => {
            tracing::debug!(site = %site_url, error = %e, "Site fetch failed, retrying for link scan");
            match fetcher.fetch(site_url).await {
                Ok(page) => scan_links(&page, &base),
                Err(e) => LinkScan::Unreachable(e),
            }
        }
        SelfCheck::Unreachable(e) => LinkScan::Unreachable(e),
    };

    let (source, candidates) = match scan {
        LinkScan::Advertised(links) => (CandidateSource::AdvertisedLinks, links),
        LinkScan::NoLinks => {
            tracing::debug!(site = %site_url, "No advertised feed links, probing suffixes");
            (CandidateSource::SuffixPaths, suffix_candidates(&base))
        }
        LinkScan::NotHtml => {
            tracing::debug!(site = %site_url, "Site is not HTML, probing suffixes");
            (CandidateSource::SuffixPaths, suffix_candidates(&base))
        }
        LinkScan::Unreachable(e) => {
            tracing::warn!(site = %site_url, error = %e, "Site unreachable, probing suffixes");
            (CandidateSource::SuffixPaths, suffix_candidates(&base))
        }
    };

    let candidates = unique_keep_order(candidates);
    tracing::debug!(
        site = %site_url,
        source = ?source,
        candidates = candidates.len(),
        "Validating feed candidates"
    );

    let mut confirmed = Vec::new();
    for candidate in candidates {
        match fetcher.fetch(&candidate).await {
            Ok(page) => match classify_candidate(&page) {
                Some(acceptance) => {
                    tracing::debug!(
                        candidate = %candidate,
                        final_url = %page.url,
                        acceptance = ?acceptance,
                        "Candidate confirmed as feed"
                    );
                    confirmed.push(candidate);
                }
                None => {
                    tracing::trace!(
                        candidate = %candidate,
                        status = page.status,
                        content_type = %page.content_type,
                        "Candidate is not a feed"
                    );
                }
            },
            Err(e) => {
                tracing::debug!(candidate = %candidate, error = %e, "Candidate fetch failed, skipping");
            }
        }
    }

    unique_keep_order(confirmed)
}

/// Runs `future`, turning a panic into [`DiscoveryError::Aborted`].
async fn catch_panic<F, T>(future: F) -> Result<T, DiscoveryError>
where
    F: Future<Output = T>,
{
    AssertUnwindSafe(future)
        .catch_unwind()
        .await
        .map_err(|panic| DiscoveryError::Aborted(panic_message(panic.as_ref())))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_owned()
    }
}

async fn check_self(fetcher: &Fetcher, site_url: &str) -> SelfCheck {
    match fetcher.fetch(site_url).await {
        Ok(page) if page.declares_feed_type() && is_xml_feed(&page.body) => SelfCheck::Feed,
        Ok(page) => SelfCheck::Page(page),
        Err(e) => SelfCheck::Unreachable(e),
    }
}

fn scan_links(page: &Page, base: &Url) -> LinkScan {
    if !page.looks_like_html() {
        return LinkScan::NotHtml;
    }

    let links = find_feed_links_in_html(&page.body, base);
    if links.is_empty() {
        LinkScan::NoLinks
    } else {
        LinkScan::Advertised(links)
    }
}

/// Collects every advertised feed link of an HTML document, in document order.
///
/// A `<link>` qualifies when its `rel` contains `alternate` and its `type`
/// contains rss, atom or xml (both case-insensitive). Links without a usable
/// `href` are skipped.
fn find_feed_links_in_html(html: &str, base: &Url) -> Vec<String> {
    let Ok(selector) = Selector::parse("link") else {
        return Vec::new();
    };

    let document = Html::parse_document(html);

    document
        .select(&selector)
        .filter(|el| {
            let rel = el.value().attr("rel").unwrap_or("").to_lowercase();
            let kind = el.value().attr("type").unwrap_or("").to_lowercase();
            rel.contains("alternate") && LINK_TYPE_MARKERS.iter().any(|m| kind.contains(m))
        })
        .filter_map(|el| el.value().attr("href"))
        .filter_map(|href| normalize_url(base, href))
        .collect()
}

fn suffix_candidates(base: &Url) -> Vec<String> {
    FEED_SUFFIXES
        .iter()
        .filter_map(|suffix| normalize_url(base, suffix))
        .collect()
}

/// Accepts a probed candidate by content inspection.
///
/// The content type alone never qualifies a candidate, and a feed signature
/// is enough even when the server mislabels the response.
fn classify_candidate(page: &Page) -> Option<Acceptance> {
    if !is_xml_feed(&page.body) {
        return None;
    }

    if page.declares_feed_type() {
        Some(Acceptance::Declared)
    } else {
        Some(Acceptance::BodySignature)
    }
}

//! Sequential discovery over a list of sites.
//!
//! One site is fully processed before the next one starts, with a fixed pause
//! in between. A failing site is recorded in the audit trail and never stops
//! the batch.
use std::time::Duration;

use crate::export::{AuditResult, AuditRow};
use crate::feed::{discover_feeds, Fetcher};
use crate::util::unique_keep_order;

/// Everything a run produces.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Validated feeds of all sites, first-seen order, no duplicates
    pub feeds: Vec<String>,
    /// One or more rows per site, in input order
    pub audit: Vec<AuditRow>,
}

impl BatchReport {
    /// Number of sites whose discovery raised an error.
    pub fn error_count(&self) -> usize {
        self.audit
            .iter()
            .filter(|row| matches!(row.result, AuditResult::Error(_)))
            .count()
    }
}

/// Runs discovery for every site in order.
///
/// Prints `[i/n] <site>` progress lines and sleeps `site_delay` between sites.
pub async fn run(fetcher: &Fetcher, sites: &[String], site_delay: Duration) -> BatchReport {
    let total = sites.len();
    let mut all_feeds = Vec::new();
    let mut audit = Vec::new();

    for (index, site) in sites.iter().enumerate() {
        if index > 0 && !site_delay.is_zero() {
            tokio::time::sleep(site_delay).await;
        }

        println!("[{}/{}] {}", index + 1, total, site);

        match discover_feeds(fetcher, site).await {
            Ok(feeds) if feeds.is_empty() => {
                tracing::info!(site = %site, "No feeds found");
                audit.push(AuditRow {
                    site: site.clone(),
                    result: AuditResult::NoneFound,
                });
            }
            Ok(feeds) => {
                tracing::info!(site = %site, feeds = feeds.len(), "Feeds found");
                audit.extend(feeds.iter().map(|feed| AuditRow {
                    site: site.clone(),
                    result: AuditResult::Feed(feed.clone()),
                }));
                all_feeds.extend(feeds);
            }
            Err(e) => {
                tracing::warn!(site = %site, error = %e, "Discovery failed");
                audit.push(AuditRow {
                    site: site.clone(),
                    result: AuditResult::Error(e.to_string()),
                });
            }
        }
    }

    BatchReport {
        feeds: unique_keep_order(all_feeds),
        audit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::FetchPolicy;
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const RSS: &str = r#"<?xml version="1.0"?><rss version="2.0"><channel></channel></rss>"#;

    fn fast_fetcher() -> Fetcher {
        Fetcher::new(FetchPolicy {
            retry_delay: Duration::from_millis(10),
            ..FetchPolicy::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_run_empty_input() {
        let report = run(&fast_fetcher(), &[], Duration::ZERO).await;
        assert!(report.feeds.is_empty());
        assert!(report.audit.is_empty());
    }

    #[tokio::test]
    async fn test_run_records_feeds_and_sentinels() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/feed.xml"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(RSS, "application/rss+xml"))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/empty/"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw("<html><body></body></html>", "text/html"),
            )
            .mount(&mock_server)
            .await;

        let feed_site = format!("{}/feed.xml", mock_server.uri());
        let empty_site = format!("{}/empty/", mock_server.uri());
        let sites = vec![
            feed_site.clone(),
            "http//broken".to_owned(),
            empty_site.clone(),
            feed_site.clone(),
        ];

        let report = run(&fast_fetcher(), &sites, Duration::ZERO).await;

        // The same feed from two sites is exported once
        assert_eq!(report.feeds, vec![feed_site.clone()]);
        assert_eq!(report.audit.len(), 4);
        assert_eq!(
            report.audit[0],
            AuditRow {
                site: feed_site.clone(),
                result: AuditResult::Feed(feed_site.clone()),
            }
        );
        assert_eq!(report.audit[1].result, AuditResult::NoneFound);
        assert_eq!(
            report.audit[2],
            AuditRow {
                site: empty_site,
                result: AuditResult::NoneFound,
            }
        );
        assert_eq!(report.error_count(), 0);
    }

    #[tokio::test]
    async fn test_unparseable_http_values_get_sentinel_rows() {
        let sites = vec!["http://".to_owned(), "httpfoo".to_owned()];

        let report = run(&fast_fetcher(), &sites, Duration::ZERO).await;

        assert_eq!(
            report.audit,
            vec![
                AuditRow {
                    site: "http://".to_owned(),
                    result: AuditResult::NoneFound,
                },
                AuditRow {
                    site: "httpfoo".to_owned(),
                    result: AuditResult::NoneFound,
                },
            ]
        );
        assert!(report.feeds.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_pauses_between_sites_only() {
        let started = tokio::time::Instant::now();
        let sites = vec!["bad one".to_owned(), "bad two".to_owned(), "bad three".to_owned()];

        let report = run(&fast_fetcher(), &sites, Duration::from_millis(400)).await;

        assert_eq!(report.audit.len(), 3);
        assert_eq!(started.elapsed(), Duration::from_millis(800));
    }
}

//! Feed discovery: find and confirm the RSS/Atom feeds of a website.
//!
//! - [`signature`] - prefix heuristic that recognises feed bodies
//! - [`fetcher`] - retrying HTTP GET with size and time limits
//! - [`discovery`] - the self-check / link-scan / suffix-probe fallback chain
//!
//! # Example
//!
//! ```ignore
//! use feedscout::feed::{discover_feeds, Fetcher, FetchPolicy};
//!
//! let fetcher = Fetcher::new(FetchPolicy::default())?;
//! let feeds = discover_feeds(&fetcher, "https://example.com/").await?;
//! ```

mod discovery;
mod fetcher;
mod signature;

pub use discovery::{discover_feeds, DiscoveryError, FEED_SUFFIXES};
pub use fetcher::{FetchError, FetchPolicy, Fetcher, Page};
pub use signature::{declares_feed_type, is_xml_feed};

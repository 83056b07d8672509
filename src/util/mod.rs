//! Small helpers shared by discovery and the batch runner.
//!
//! - **URL normalization**: resolve a reference against a base and drop the fragment
//! - **De-duplication**: first occurrence wins, order is kept
//!
//! # Examples
//!
//! ```
//! use feedscout::util::{normalize_url, unique_keep_order};
//! use url::Url;
//!
//! let base = Url::parse("https://example.com/blog/").unwrap();
//! let feed = normalize_url(&base, "/feed#top").unwrap();
//! assert_eq!(feed, "https://example.com/feed");
//!
//! assert_eq!(unique_keep_order(vec![1, 2, 1, 3]), vec![1, 2, 3]);
//! ```

mod normalize;

pub use normalize::{normalize_url, unique_keep_order};

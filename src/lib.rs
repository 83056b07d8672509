//! Discovers and validates RSS/Atom feeds for a list of websites.
//!
//! For every site the [`feed::discover_feeds`] engine checks whether the URL is
//! itself a feed, then looks for `<link rel="alternate">` feed links in its
//! HTML, then probes common feed paths, and finally confirms each candidate by
//! inspecting its body. [`batch::run`] drives the engine over a list read by
//! [`input::read_site_urls`], and [`export`] writes the results.

pub mod batch;
pub mod config;
pub mod export;
pub mod feed;
pub mod input;
pub mod util;

//! Terminal client for a news-aggregator REST API.
//!
//! The interesting part is [`feed::FeedController`], which turns search
//! text, facet selections, tab and page into the reads the UI has to run.
//! [`api::ApiClient`] performs those reads, and [`ui`] drives everything
//! from a single event loop.

pub mod api;
pub mod app;
pub mod config;
pub mod feed;
pub mod forms;
pub mod keybindings;
pub mod session;
pub mod theme;
pub mod ui;
pub mod util;

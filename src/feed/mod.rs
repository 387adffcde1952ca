//! Feed query control: what the article list should show and when to ask for it.
//!
//! The feed view has two tabs. Explore is driven by search text, category and
//! author facets and a page number. My Feeds only takes a page number and is
//! assembled by the server from the user's saved preferences.
//!
//! # Architecture
//!
//! - [`filter`] - user filter inputs and their page-reset rules
//! - [`query`] - effective queries derived from filters; also the cache keys
//! - [`debounce`] - trailing-edge debounce for search keystrokes
//! - [`slot`] - one tab's result slot with caching and stale-response checks
//! - [`pagination`] - the pagination bar derived from a result envelope
//! - [`controller`] - ties the above together and emits fetch requests
//!
//! Nothing here performs I/O. The controller returns [`FetchRequest`]s and the
//! UI layer runs them against [`crate::api::ApiClient`], feeding results back
//! through [`FeedController::complete`].

pub mod controller;
pub mod debounce;
pub mod filter;
pub mod pagination;
pub mod query;
pub mod slot;

pub use controller::{FeedController, FetchRequest};
pub use filter::{FilterState, Tab};
pub use pagination::{page_links, PageEnvelope, PageLink, PaginationControl, MAX_VISIBLE_PAGES};
pub use query::{ExploreQuery, PersonalizedQuery, QueryKey, MIN_SEARCH_LEN};
pub use slot::SlotUpdate;

/// One page of articles as returned by either feed endpoint.
pub type ArticlePage = PageEnvelope<crate::api::Article>;

//! Effective queries derived from filter state.
//!
//! Each query doubles as the cache key for its result slot: two queries
//! that compare equal always ask the API for the same page.

use url::Url;

use super::filter::{FilterState, Tab};

/// Non-empty search text shorter than this is never sent.
pub const MIN_SEARCH_LEN: usize = 3;

/// `GET /articles` parameters for the Explore tab.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExploreQuery {
    pub search: String,
    pub page: u32,
    pub author_ids: Vec<i64>,
    pub category_ids: Vec<i64>,
}

impl ExploreQuery {
    /// Build from the current filters and the search text that has already
    /// settled through the debounce (not the raw text in the input box).
    pub fn from_filters(filters: &FilterState, applied_search: &str) -> Self {
        Self {
            search: applied_search.to_string(),
            page: filters.page(),
            author_ids: filters.selected_author_ids().iter().copied().collect(),
            category_ids: filters.selected_category_ids().iter().copied().collect(),
        }
    }

    /// Whether this query may hit the network: search is empty or long enough.
    pub fn is_enabled(&self) -> bool {
        self.search.is_empty() || self.search.chars().count() >= MIN_SEARCH_LEN
    }

    /// Append `search`, `page`, `author_ids[]` and `category_ids[]` pairs.
    pub fn append_to(&self, url: &mut Url) {
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair("search", &self.search);
        pairs.append_pair("page", &self.page.to_string());
        for id in &self.author_ids {
            pairs.append_pair("author_ids[]", &id.to_string());
        }
        for id in &self.category_ids {
            pairs.append_pair("category_ids[]", &id.to_string());
        }
    }
}

/// `GET /articles/my-feeds` parameters. Search and facets are not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PersonalizedQuery {
    pub page: u32,
}

impl PersonalizedQuery {
    pub fn from_filters(filters: &FilterState) -> Self {
        Self {
            page: filters.page(),
        }
    }

    pub fn append_to(&self, url: &mut Url) {
        url.query_pairs_mut()
            .append_pair("page", &self.page.to_string());
    }
}

/// A query tagged with the slot it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Explore(ExploreQuery),
    Personalized(PersonalizedQuery),
}

impl QueryKey {
    pub fn tab(&self) -> Tab {
        match self {
            QueryKey::Explore(_) => Tab::Explore,
            QueryKey::Personalized(_) => Tab::Personalized,
        }
    }

    pub fn page(&self) -> u32 {
        match self {
            QueryKey::Explore(q) => q.page,
            QueryKey::Personalized(q) => q.page,
        }
    }
}

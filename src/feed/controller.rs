//! The feed query controller: filters in, fetch requests out.

use std::num::NonZeroUsize;
use std::time::Duration;
use tokio::time::Instant;

use super::debounce::Debouncer;
use super::filter::{FilterState, Tab};
use super::pagination::PaginationControl;
use super::query::{ExploreQuery, PersonalizedQuery, QueryKey};
use super::slot::{QuerySlot, SlotUpdate};
use super::ArticlePage;

/// A read the caller should issue against the API.
///
/// `generation` must be handed back to [`FeedController::complete`] together
/// with the result so superseded responses can be recognised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub key: QueryKey,
    pub generation: u64,
}

/// Feed query controller.
///
/// Owns the filter inputs, the search debounce and one query slot per tab.
/// Every mutating call returns the fetches it wants issued; the controller
/// itself never touches the network. Results come back through
/// [`FeedController::complete`].
pub struct FeedController {
    filters: FilterState,
    /// Search text that has made it through the debounce.
    applied_search: String,
    debounce: Debouncer<String>,
    explore: QuerySlot<ExploreQuery, ArticlePage>,
    personalized: QuerySlot<PersonalizedQuery, ArticlePage>,
    /// My Feeds needs a signed-in user; without one it is never requested.
    personalized_enabled: bool,
}

impl FeedController {
    pub fn new(debounce_delay: Duration, cache_capacity: NonZeroUsize) -> Self {
        Self {
            filters: FilterState::default(),
            applied_search: String::new(),
            debounce: Debouncer::new(debounce_delay),
            explore: QuerySlot::new(cache_capacity),
            personalized: QuerySlot::new(cache_capacity),
            personalized_enabled: false,
        }
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn applied_search(&self) -> &str {
        &self.applied_search
    }

    pub fn is_search_pending(&self) -> bool {
        self.debounce.is_pending()
    }

    pub fn is_personalized_enabled(&self) -> bool {
        self.personalized_enabled
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Record a keystroke in the search box.
    ///
    /// The Explore fetch waits until the text has been quiet for the debounce
    /// delay; see [`FeedController::tick`].
    pub fn set_search_text(&mut self, text: impl Into<String>, now: Instant) -> Vec<FetchRequest> {
        let text = text.into();
        self.filters.set_search_text(text.clone());
        self.debounce.push(text, now);
        self.sync()
    }

    /// Apply the pending search text immediately (Enter in the search box).
    pub fn commit_search(&mut self) -> Vec<FetchRequest> {
        if let Some(text) = self.debounce.flush() {
            self.applied_search = text;
        }
        self.sync()
    }

    /// Advance the debounce clock. Call periodically from the event loop.
    pub fn tick(&mut self, now: Instant) -> Vec<FetchRequest> {
        match self.debounce.poll(now) {
            Some(text) => {
                tracing::debug!(search = %text, "Search text settled");
                self.applied_search = text;
                self.sync()
            }
            None => Vec::new(),
        }
    }

    pub fn toggle_category(&mut self, id: i64) -> Vec<FetchRequest> {
        self.filters.toggle_category(id);
        self.sync()
    }

    pub fn toggle_author(&mut self, id: i64) -> Vec<FetchRequest> {
        self.filters.toggle_author(id);
        self.sync()
    }

    pub fn set_page(&mut self, page: u32) -> Vec<FetchRequest> {
        self.filters.set_page(page);
        self.sync()
    }

    /// Switch the displayed tab. Both slots keep their keys, so nothing is
    /// fetched.
    pub fn set_active_tab(&mut self, tab: Tab) {
        self.filters.set_active_tab(tab);
    }

    pub fn set_personalized_enabled(&mut self, enabled: bool) -> Vec<FetchRequest> {
        self.personalized_enabled = enabled;
        if !enabled {
            self.personalized.clear();
            if self.filters.active_tab() == Tab::Personalized {
                self.filters.set_active_tab(Tab::Explore);
            }
        }
        self.sync()
    }

    /// Re-request whatever each slot currently shows.
    pub fn refresh(&mut self) -> Vec<FetchRequest> {
        let mut requests = self.sync();
        if let Some(key) = self.explore.current_key().cloned() {
            if !requests.iter().any(|r| r.key.tab() == Tab::Explore) {
                let generation = self.explore.begin(key.clone());
                requests.push(FetchRequest {
                    key: QueryKey::Explore(key),
                    generation,
                });
            }
        }
        if let Some(key) = self.personalized.current_key().copied() {
            if !requests.iter().any(|r| r.key.tab() == Tab::Personalized) {
                let generation = self.personalized.begin(key);
                requests.push(FetchRequest {
                    key: QueryKey::Personalized(key),
                    generation,
                });
            }
        }
        requests
    }

    /// Drop all filters and results, e.g. when the session ends.
    pub fn reset(&mut self) {
        self.filters = FilterState::default();
        self.applied_search.clear();
        self.debounce.cancel();
        self.explore.clear();
        self.personalized.clear();
        self.personalized_enabled = false;
    }

    /// Hand a finished fetch back to its slot.
    pub fn complete(
        &mut self,
        key: &QueryKey,
        generation: u64,
        result: Result<ArticlePage, String>,
    ) -> SlotUpdate {
        let update = match key {
            QueryKey::Explore(q) => self.explore.complete(q, generation, result),
            QueryKey::Personalized(q) => self.personalized.complete(q, generation, result),
        };
        tracing::debug!(tab = ?key.tab(), page = key.page(), generation, ?update, "Fetch completed");
        update
    }

    /// Work out which slot keys the filters now call for and start fetches
    /// for the ones that changed.
    fn sync(&mut self) -> Vec<FetchRequest> {
        let mut requests = Vec::new();

        if !self.debounce.is_pending() {
            let query = ExploreQuery::from_filters(&self.filters, &self.applied_search);
            if !query.is_enabled() {
                tracing::trace!(search = %query.search, "Search too short, explore fetch skipped");
            } else if self.explore.select(query.clone()) {
                let generation = self.explore.begin(query.clone());
                requests.push(FetchRequest {
                    key: QueryKey::Explore(query),
                    generation,
                });
            }
        }

        if self.personalized_enabled {
            let query = PersonalizedQuery::from_filters(&self.filters);
            if self.personalized.select(query) {
                let generation = self.personalized.begin(query);
                requests.push(FetchRequest {
                    key: QueryKey::Personalized(query),
                    generation,
                });
            }
        }

        requests
    }

    // ========================================================================
    // Derived view state
    // ========================================================================

    pub fn page_for(&self, tab: Tab) -> Option<&ArticlePage> {
        match tab {
            Tab::Explore => self.explore.displayed().map(AsRef::as_ref),
            Tab::Personalized => self.personalized.displayed().map(AsRef::as_ref),
        }
    }

    /// Result set for the active tab.
    pub fn active_page(&self) -> Option<&ArticlePage> {
        self.page_for(self.filters.active_tab())
    }

    pub fn is_loading(&self, tab: Tab) -> bool {
        match tab {
            Tab::Explore => self.explore.is_loading(),
            Tab::Personalized => self.personalized.is_loading(),
        }
    }

    pub fn last_error(&self, tab: Tab) -> Option<&str> {
        match tab {
            Tab::Explore => self.explore.last_error(),
            Tab::Personalized => self.personalized.last_error(),
        }
    }

    /// Pagination bar for the active tab; `None` until it has a result.
    pub fn pagination(&self) -> Option<PaginationControl> {
        self.active_page().map(PaginationControl::from_envelope)
    }
}

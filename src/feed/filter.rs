//! Filter inputs for the feed view and the tab they apply to.

use std::collections::BTreeSet;

/// Which of the two result sets the feed view shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tab {
    /// Global feed, narrowed by search text and facets.
    #[default]
    Explore,
    /// "My Feeds": built from the user's saved preferences, ignores filters.
    Personalized,
}

impl Tab {
    pub fn label(self) -> &'static str {
        match self {
            Tab::Explore => "Explore",
            Tab::Personalized => "My Feeds",
        }
    }

    pub fn other(self) -> Self {
        match self {
            Tab::Explore => Tab::Personalized,
            Tab::Personalized => Tab::Explore,
        }
    }
}

/// User-controlled filter inputs for the feed view.
///
/// Invariant: `page` goes back to 1 whenever the search text or either facet
/// selection changes. Tab switches and page changes leave the rest alone.
/// Facet ids are kept ordered so derived query keys are stable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    search_text: String,
    selected_category_ids: BTreeSet<i64>,
    selected_author_ids: BTreeSet<i64>,
    active_tab: Tab,
    page: u32,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            search_text: String::new(),
            selected_category_ids: BTreeSet::new(),
            selected_author_ids: BTreeSet::new(),
            active_tab: Tab::Explore,
            page: 1,
        }
    }
}

impl FilterState {
    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn selected_category_ids(&self) -> &BTreeSet<i64> {
        &self.selected_category_ids
    }

    pub fn selected_author_ids(&self) -> &BTreeSet<i64> {
        &self.selected_author_ids
    }

    pub fn active_tab(&self) -> Tab {
        self.active_tab
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn is_category_selected(&self, id: i64) -> bool {
        self.selected_category_ids.contains(&id)
    }

    pub fn is_author_selected(&self, id: i64) -> bool {
        self.selected_author_ids.contains(&id)
    }

    /// Typing in the search box always lands on Explore, page 1.
    pub fn set_search_text(&mut self, text: impl Into<String>) {
        self.search_text = text.into();
        self.active_tab = Tab::Explore;
        self.page = 1;
    }

    /// Add the id if absent, remove it if present.
    pub fn toggle_category(&mut self, id: i64) {
        toggle(&mut self.selected_category_ids, id);
        self.page = 1;
    }

    pub fn toggle_author(&mut self, id: i64) {
        toggle(&mut self.selected_author_ids, id);
        self.page = 1;
    }

    /// Passed through unclamped; the API decides what a valid page is.
    pub fn set_page(&mut self, page: u32) {
        self.page = page;
    }

    pub fn set_active_tab(&mut self, tab: Tab) {
        self.active_tab = tab;
    }
}

fn toggle(set: &mut BTreeSet<i64>, id: i64) {
    if !set.remove(&id) {
        set.insert(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let f = FilterState::default();
        assert_eq!(f.search_text(), "");
        assert_eq!(f.active_tab(), Tab::Explore);
        assert_eq!(f.page(), 1);
        assert!(f.selected_category_ids().is_empty());
        assert!(f.selected_author_ids().is_empty());
    }

    #[test]
    fn test_toggle_category_twice_restores_set_and_resets_page() {
        let mut f = FilterState::default();
        f.toggle_category(4);
        let original = f.selected_category_ids().clone();

        f.set_page(7);
        f.toggle_category(9);
        assert_eq!(f.page(), 1);
        assert!(f.is_category_selected(9));

        f.set_page(3);
        f.toggle_category(9);
        assert_eq!(f.page(), 1);
        assert_eq!(f.selected_category_ids(), &original);
    }

    #[test]
    fn test_toggle_author_resets_page() {
        let mut f = FilterState::default();
        f.set_page(5);
        f.toggle_author(2);
        assert_eq!(f.page(), 1);
        assert!(f.is_author_selected(2));
        f.toggle_author(2);
        assert!(!f.is_author_selected(2));
    }

    #[test]
    fn test_search_forces_explore_and_first_page() {
        let mut f = FilterState::default();
        f.set_active_tab(Tab::Personalized);
        f.set_page(4);
        f.set_search_text("rust");
        assert_eq!(f.active_tab(), Tab::Explore);
        assert_eq!(f.page(), 1);
        assert_eq!(f.search_text(), "rust");
    }

    #[test]
    fn test_set_page_does_not_clamp_or_touch_filters() {
        let mut f = FilterState::default();
        f.toggle_category(1);
        f.set_page(0);
        assert_eq!(f.page(), 0);
        f.set_page(10_000);
        assert_eq!(f.page(), 10_000);
        assert!(f.is_category_selected(1));
    }

    #[test]
    fn test_tab_switch_keeps_filters() {
        let mut f = FilterState::default();
        f.set_search_text("climate");
        f.toggle_category(3);
        f.toggle_author(8);
        f.set_page(2);

        f.set_active_tab(Tab::Personalized);
        assert_eq!(f.search_text(), "climate");
        assert!(f.is_category_selected(3));
        assert!(f.is_author_selected(8));
        assert_eq!(f.page(), 2);
    }

    #[test]
    fn test_tab_other() {
        assert_eq!(Tab::Explore.other(), Tab::Personalized);
        assert_eq!(Tab::Personalized.other(), Tab::Explore);
    }
}

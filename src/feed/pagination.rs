//! Page envelopes and the page-link strip derived from them.
//!
//! The API reports `current_page` and `last_page` with every list response;
//! nothing here recomputes them. The link strip keeps a fixed width no matter
//! how many pages exist: first page, a window around the current page, last
//! page, with ellipses over the gaps.

/// When `last_page` is at most this, every page gets its own link.
pub const MAX_VISIBLE_PAGES: u32 = 5;

/// One page of results as returned by the API.
#[derive(Debug, Clone, PartialEq)]
pub struct PageEnvelope<T> {
    pub items: Vec<T>,
    pub total_count: u64,
    pub current_page: u32,
    pub per_page: u32,
    pub last_page: u32,
}

impl<T> PageEnvelope<T> {
    /// An envelope with no items, used as the empty state.
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total_count: 0,
            current_page: 1,
            per_page: 0,
            last_page: 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// A single element of the page-link strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLink {
    Page { number: u32, active: bool },
    Ellipsis,
}

impl PageLink {
    fn page(number: u32, current: u32) -> Self {
        PageLink::Page {
            number,
            active: number == current,
        }
    }

    /// Page number this link navigates to, or `None` for an ellipsis.
    pub fn number(&self) -> Option<u32> {
        match self {
            PageLink::Page { number, .. } => Some(*number),
            PageLink::Ellipsis => None,
        }
    }
}

/// Build the page-link strip for `current` out of `last` pages.
///
/// - `last <= 5`: every page `1..=last`
/// - otherwise: `1`, `…` if `current > 3`, the window
///   `max(2, current-1)..=min(last-1, current+1)`, `…` if `current < last-2`,
///   then `last`
///
/// Out-of-range `current` values are not clamped; the window simply comes
/// out empty and only the two ends are rendered.
pub fn page_links(current: u32, last: u32) -> Vec<PageLink> {
    if last <= MAX_VISIBLE_PAGES {
        return (1..=last).map(|n| PageLink::page(n, current)).collect();
    }

    let mut links = Vec::with_capacity(7);
    links.push(PageLink::page(1, current));

    if current > 3 {
        links.push(PageLink::Ellipsis);
    }

    let window_start = current.saturating_sub(1).max(2);
    let window_end = current.saturating_add(1).min(last - 1);
    for n in window_start..=window_end {
        links.push(PageLink::page(n, current));
    }

    if current < last.saturating_sub(2) {
        links.push(PageLink::Ellipsis);
    }

    links.push(PageLink::page(last, current));
    links
}

/// Everything the pagination bar needs to draw itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationControl {
    pub current_page: u32,
    pub last_page: u32,
    pub links: Vec<PageLink>,
    pub previous_enabled: bool,
    pub next_enabled: bool,
}

impl PaginationControl {
    /// Derive the control from an envelope's page counters.
    ///
    /// A `last_page` of 0 (empty result set) is shown as a single page.
    pub fn new(current_page: u32, last_page: u32) -> Self {
        let current_page = current_page.max(1);
        let last_page = last_page.max(1);
        Self {
            current_page,
            last_page,
            links: page_links(current_page, last_page),
            previous_enabled: current_page > 1,
            next_enabled: current_page < last_page,
        }
    }

    pub fn from_envelope<T>(envelope: &PageEnvelope<T>) -> Self {
        Self::new(envelope.current_page, envelope.last_page)
    }

    /// Target of the "Previous" button, if enabled.
    pub fn previous_page(&self) -> Option<u32> {
        self.previous_enabled.then(|| self.current_page - 1)
    }

    /// Target of the "Next" button, if enabled.
    pub fn next_page(&self) -> Option<u32> {
        self.next_enabled.then(|| self.current_page + 1)
    }
}

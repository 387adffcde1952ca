//! Facet list shared by the Explore filter sidebar and the preferences picker.

use crate::app::{App, FacetEntry};
use crate::util::strip_control_chars;
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

/// Build one row per category and author, with a heading before each group.
///
/// Returns the rows and the row index of facet `cursor`, if any.
pub(super) fn facet_rows(
    app: &App,
    cursor: Option<usize>,
    is_checked: impl Fn(FacetEntry) -> bool,
) -> (Vec<ListItem<'static>>, usize) {
    let mut rows = Vec::with_capacity(app.facet_count() + 2);
    let mut cursor_row = 0;

    let heading = |text: &'static str| {
        ListItem::new(Line::from(Span::styled(text, app.style("form_label"))))
    };

    let names = app
        .categories
        .iter()
        .map(|c| (FacetEntry::Category(c.id), c.name.as_str()))
        .chain(
            app.authors
                .iter()
                .map(|a| (FacetEntry::Author(a.id), a.name.as_str())),
        );

    for (index, (entry, name)) in names.enumerate() {
        if index == 0 && !app.categories.is_empty() {
            rows.push(heading("Categories"));
        }
        if index == app.categories.len() {
            rows.push(heading("Sources"));
        }

        let checked = is_checked(entry);
        let mark = if checked { "[x] " } else { "[ ] " };
        let style: Style = if cursor == Some(index) {
            cursor_row = rows.len();
            app.style("facet_cursor")
        } else if checked {
            app.style("facet_selected")
        } else {
            app.style("facet_normal")
        };
        rows.push(ListItem::new(Line::from(Span::styled(
            format!("{}{}", mark, strip_control_chars(name)),
            style,
        ))));
    }

    (rows, cursor_row)
}

/// Render the Explore filter sidebar.
pub fn render(f: &mut Frame, app: &App, area: Rect, focused: bool) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    let filters = app.feed.filters();
    let selected = filters.selected_category_ids().len() + filters.selected_author_ids().len();
    let title = if selected > 0 {
        format!("Filters ({})", selected)
    } else {
        "Filters".to_string()
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(if focused {
            app.style("panel_border_focused")
        } else {
            app.style("panel_border")
        })
        .title(title);

    if app.facet_count() == 0 {
        let message = if app.facets_loaded {
            "No filters"
        } else {
            "Loading..."
        };
        f.render_widget(
            Paragraph::new(message)
                .style(app.style("empty_state"))
                .block(block),
            area,
        );
        return;
    }

    let cursor = focused.then_some(app.sidebar_selected);
    let (rows, cursor_row) = facet_rows(app, cursor, |entry| match entry {
        FacetEntry::Category(id) => filters.is_category_selected(id),
        FacetEntry::Author(id) => filters.is_author_selected(id),
    });

    let mut state = ListState::default();
    if focused {
        state.select(Some(cursor_row));
    }
    f.render_stateful_widget(List::new(rows).block(block), area, &mut state);
}

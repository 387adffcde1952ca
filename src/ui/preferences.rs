use crate::app::{App, FacetEntry};
use crate::forms::MIN_PREFERENCE_SELECTIONS;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListState, Paragraph},
    Frame,
};

use super::sidebar::facet_rows;

/// Render the preferences picker: every category and source with a checkbox,
/// plus counters against the minimum.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(3),
            Constraint::Length(2),
        ])
        .split(area);

    let selection = &app.preference_selection;
    let counter = |label: &str, count: usize| {
        let style = if count >= MIN_PREFERENCE_SELECTIONS {
            app.style("facet_selected")
        } else {
            app.style("form_label")
        };
        Span::styled(
            format!("{}: {}/{}", label, count, MIN_PREFERENCE_SELECTIONS),
            style,
        )
    };
    let header = vec![
        Line::from(Span::styled(
            "Choose the categories and sources for My Feeds",
            app.style("article_title"),
        )),
        Line::from(vec![
            counter("Categories", selection.category_count()),
            Span::raw("   "),
            counter("Sources", selection.author_count()),
        ]),
    ];
    f.render_widget(
        Paragraph::new(header).block(Block::default().borders(Borders::BOTTOM)),
        chunks[0],
    );

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.style("panel_border_focused"))
        .title(" Preferences ");

    if app.facet_count() == 0 {
        let message = if app.facets_loaded {
            "Nothing to choose from"
        } else {
            "Loading..."
        };
        f.render_widget(
            Paragraph::new(message)
                .style(app.style("empty_state"))
                .block(block),
            chunks[1],
        );
    } else {
        let (rows, cursor_row) =
            facet_rows(app, Some(app.preferences_selected), |entry| match entry {
                FacetEntry::Category(id) => selection.has_category(id),
                FacetEntry::Author(id) => selection.has_author(id),
            });
        let mut state = ListState::default().with_selected(Some(cursor_row));
        f.render_stateful_widget(List::new(rows).block(block), chunks[1], &mut state);
    }

    let footer = if app.preferences_pending {
        Line::from(Span::styled("Saving...", app.style("empty_state")))
    } else if let Some(error) = &app.form_error {
        Line::from(Span::styled(error.to_string(), app.style("form_error")))
    } else {
        Line::from(Span::styled(
            "Space: toggle  Enter: save  Esc: skip",
            app.style("form_label"),
        ))
    };
    f.render_widget(Paragraph::new(footer), chunks[2]);
}

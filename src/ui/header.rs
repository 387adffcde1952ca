//! Search box and tab strip at the top of the feed view.

use crate::app::App;
use crate::feed::{Tab, MIN_SEARCH_LEN};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub fn render_search(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    let text = app.feed.filters().search_text();
    let line = if text.is_empty() && !app.search_mode {
        Line::from(Span::styled(
            "Press / to search articles",
            app.style("search_placeholder"),
        ))
    } else {
        let mut spans = vec![Span::styled(text.to_string(), app.style("search_input"))];
        if app.search_mode {
            spans.push(Span::styled("_", app.style("search_input")));
        }
        let chars = text.chars().count();
        if chars > 0 && chars < MIN_SEARCH_LEN {
            spans.push(Span::styled(
                format!("  (type at least {} characters)", MIN_SEARCH_LEN),
                app.style("search_placeholder"),
            ));
        }
        Line::from(spans)
    };

    let border_style = if app.search_mode {
        app.style("panel_border_focused")
    } else {
        app.style("panel_border")
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title("Search");

    f.render_widget(Paragraph::new(line).block(block), area);
}

pub fn render_tabs(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }

    let active = app.active_tab();
    let mut spans = Vec::new();
    for tab in [Tab::Explore, Tab::Personalized] {
        if tab == Tab::Personalized && !app.feed.is_personalized_enabled() {
            continue;
        }
        let style = if tab == active {
            app.style("tab_active")
        } else {
            app.style("tab_inactive")
        };
        spans.push(Span::raw(" "));
        spans.push(Span::styled(tab.label(), style));
        if app.feed.is_loading(tab) {
            spans.push(Span::styled(" …", app.style("tab_inactive")));
        }
        spans.push(Span::raw(" "));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

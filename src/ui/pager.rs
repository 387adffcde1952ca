use crate::app::App;
use crate::feed::PageLink;
use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Render the pagination bar: `‹ Prev  1 … 4 [5] 6 … 10  Next ›`.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }
    let Some(control) = app.feed.pagination() else {
        return;
    };

    let enabled = |on: bool| {
        if on {
            app.style("page_link")
        } else {
            app.style("page_disabled")
        }
    };

    let mut spans = vec![
        Span::styled("‹ Prev", enabled(control.previous_enabled)),
        Span::raw("  "),
    ];
    for (i, link) in control.links.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw(" "));
        }
        spans.push(match link {
            PageLink::Page {
                number,
                active: true,
            } => Span::styled(format!("[{}]", number), app.style("page_active")),
            PageLink::Page { number, .. } => {
                Span::styled(number.to_string(), app.style("page_link"))
            }
            PageLink::Ellipsis => Span::styled("…", app.style("page_disabled")),
        });
    }
    spans.push(Span::raw("  "));
    spans.push(Span::styled("Next ›", enabled(control.next_enabled)));

    let bar = Paragraph::new(Line::from(spans)).alignment(Alignment::Center);
    f.render_widget(bar, area);
}

use crate::app::{App, StatusKind, View};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Render the status bar: the current message, else key hints for the view.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }

    if let Some((msg, kind, _)) = &app.status_message {
        let style = match kind {
            StatusKind::Info => app.style("status_bar"),
            StatusKind::Error => app.style("status_error"),
        };
        f.render_widget(Paragraph::new(&**msg).style(style), area);
        return;
    }

    let hints: &str = match app.view {
        View::Feed if app.search_mode => {
            "Type to search | Enter search now | Esc done | Ctrl+u clear"
        }
        View::Feed if app.session.is_authenticated() => {
            "[/]search [t]ab [Tab]focus [n/p]page [o]pen [u]ser [r]efresh [?]help [q]uit"
        }
        View::Feed => {
            "[/]search [Tab]focus [n/p]page [o]pen [l]sign in [r]efresh [?]help [q]uit"
        }
        View::Preferences => "[j/k]move [Space]toggle [Enter]save [Esc]skip",
        View::Login | View::Register => "[Tab]next field [Enter]submit [Ctrl+c]quit",
    };

    let mut spans = vec![Span::raw(hints)];
    if let Some(user) = app.session.user() {
        spans.push(Span::raw(format!("  | {}", user.email)));
    }
    f.render_widget(
        Paragraph::new(Line::from(spans)).style(app.style("status_bar")),
        area,
    );
}

use crate::app::App;
use crate::util::strip_control_chars;
use ratatui::{
    layout::Alignment,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use super::render::centered_rect;

fn joined<'a>(names: impl Iterator<Item = &'a str>) -> String {
    let list: Vec<_> = names.map(|n| strip_control_chars(n).into_owned()).collect();
    if list.is_empty() {
        "none".to_string()
    } else {
        list.join(", ")
    }
}

/// Render the signed-in user's details with their saved preferences.
pub fn render(f: &mut Frame, app: &App) {
    let Some(user) = app.session.user() else {
        return;
    };
    let area = centered_rect(60, 50, f.area());
    if area.width < 20 || area.height < 8 {
        return;
    }
    f.render_widget(Clear, area);

    let label = app.style("form_label");
    let value = app.style("article_description");
    let row = |name: &'static str, text: String| {
        Line::from(vec![
            Span::styled(format!("{:<12}", name), label),
            Span::styled(text, value),
        ])
    };

    let prefs = &user.preferences;
    let lines = vec![
        Line::from(""),
        row("Name", strip_control_chars(&user.name).into_owned()),
        row("Email", user.email.clone()),
        row(
            "Joined",
            user.created_at.clone().unwrap_or_else(|| "unknown".into()),
        ),
        Line::from(""),
        row(
            "Categories",
            joined(prefs.categories.iter().map(|c| c.name.as_str())),
        ),
        row(
            "Sources",
            joined(prefs.authors.iter().map(|a| a.name.as_str())),
        ),
        Line::from(""),
        Line::from(Span::styled(
            "P: edit preferences  L: sign out  Esc: close",
            app.style("article_meta"),
        )),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.style("panel_border_focused"))
        .title(" Profile ")
        .title_alignment(Alignment::Center);
    f.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
        area,
    );
}

//! Sign in and registration forms.

use crate::app::App;
use crate::forms::{AuthField, AuthMode};
use ratatui::{
    layout::Alignment,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use super::render::centered_rect;

fn field_line<'a>(app: &App, field: AuthField, focused: bool) -> Line<'a> {
    let label_style = if focused {
        app.style("form_input_focused")
    } else {
        app.style("form_label")
    };
    let marker = if focused { "> " } else { "  " };

    let value = match field {
        AuthField::AcceptTerms => {
            let mark = if app.auth_form.terms_accepted() { "[x]" } else { "[ ]" };
            format!("{} (Space to toggle)", mark)
        }
        f if f.is_masked() => "*".repeat(app.auth_form.value(f).chars().count()),
        f => app.auth_form.value(f).to_string(),
    };
    let cursor = if focused && field != AuthField::AcceptTerms {
        "_"
    } else {
        ""
    };

    Line::from(vec![
        Span::styled(format!("{}{:<18}", marker, field.label()), label_style),
        Span::styled(format!("{}{}", value, cursor), app.style("search_input")),
    ])
}

pub fn render(f: &mut Frame, app: &App) {
    let area = centered_rect(60, 60, f.area());
    if area.width < 20 || area.height < 8 {
        return;
    }
    f.render_widget(Clear, area);

    let form = &app.auth_form;
    let (title, switch_hint) = match form.mode() {
        AuthMode::Login => (" Sign in ", "Ctrl+r: create an account  Esc: browse without signing in"),
        AuthMode::Register => (" Create account ", "Ctrl+r: sign in instead  Esc: back"),
    };

    let mut lines = vec![Line::from("")];
    for &field in form.fields() {
        lines.push(field_line(app, field, field == form.focused()));
    }
    lines.push(Line::from(""));

    if app.auth_pending {
        lines.push(Line::from(Span::styled(
            "Submitting...",
            app.style("empty_state"),
        )));
    } else if let Some(error) = &app.form_error {
        lines.push(Line::from(Span::styled(
            error.to_string(),
            app.style("form_error"),
        )));
    } else {
        lines.push(Line::from(""));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Tab/Shift+Tab: move  Enter: submit",
        app.style("form_label"),
    )));
    lines.push(Line::from(Span::styled(switch_hint, app.style("form_label"))));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.style("panel_border_focused"))
        .title(title)
        .title_alignment(Alignment::Center);

    f.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        area,
    );
}


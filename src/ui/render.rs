//! Render functions for the TUI.
//!
//! Dispatches to the view for the current screen, then draws any overlay on
//! top.

use crate::app::{App, Focus, View};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    widgets::Paragraph,
    Frame,
};

use super::{articles, auth, header, help, pager, preferences, profile, sidebar, status};

/// Minimum terminal dimensions required for normal operation.
pub(super) const MIN_WIDTH: u16 = 60;
pub(super) const MIN_HEIGHT: u16 = 12;

pub(super) fn render(f: &mut Frame, app: &App) {
    let area = f.area();
    if area.width < 1 || area.height < 1 {
        return;
    }

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = if area.height < 3 || area.width < 20 {
            Paragraph::new("Too small")
        } else {
            Paragraph::new(format!(
                "Terminal too small\n\nMinimum: {}x{}\nCurrent: {}x{}",
                MIN_WIDTH, MIN_HEIGHT, area.width, area.height
            ))
            .alignment(Alignment::Center)
        };
        f.render_widget(msg, area);
        return;
    }

    match app.view {
        View::Login | View::Register => {
            let status_area = split_status(area).1;
            auth::render(f, app);
            status::render(f, app, status_area);
        }
        View::Preferences => {
            let (main, status_area) = split_status(area);
            preferences::render(f, app, main);
            status::render(f, app, status_area);
        }
        View::Feed => render_feed(f, app),
    }

    if app.show_profile {
        profile::render(f, app);
    }
    if app.show_help {
        help::render(f, app);
    }
}

fn split_status(area: Rect) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);
    (chunks[0], chunks[1])
}

/// Search box, tabs, article list with optional filter sidebar, pager, status.
fn render_feed(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(f.area());

    header::render_search(f, app, chunks[0]);
    header::render_tabs(f, app, chunks[1]);

    if app.sidebar_visible() {
        let main = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
            .split(chunks[2]);
        articles::render(f, app, main[0]);
        sidebar::render(f, app, main[1], app.focus == Focus::Sidebar);
    } else {
        articles::render(f, app, chunks[2]);
    }

    pager::render(f, app, chunks[3]);
    status::render(f, app, chunks[4]);
}

/// Create a centered rectangle with the given percentage of the parent area.
pub(super) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let width = area.width * percent_x / 100;
    let height = area.height * percent_y / 100;
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

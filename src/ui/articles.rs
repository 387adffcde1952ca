use crate::api::Article;
use crate::app::{App, Focus};
use crate::util::{format_date, html_to_text, initials, strip_control_chars, truncate_to_width};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

/// Metadata line under the title: date, source, category badge, author.
fn meta_line<'a>(app: &App, article: &'a Article) -> Line<'a> {
    let mut spans = Vec::new();
    let separator = || Span::styled(" · ", app.style("article_meta"));

    let date = format_date(article.published());
    if !date.is_empty() {
        spans.push(Span::styled(date, app.style("article_meta")));
    }

    if let Some(source) = article.author.as_ref().and_then(|a| a.source_id) {
        if !spans.is_empty() {
            spans.push(separator());
        }
        spans.push(Span::styled(format!("Source {}", source), app.style("article_meta")));
    }

    if let Some(category) = &article.category {
        if !spans.is_empty() {
            spans.push(separator());
        }
        spans.push(Span::styled(
            format!("[{}]", strip_control_chars(&category.name)),
            app.style("article_badge"),
        ));
    }

    if let Some(author) = &article.author {
        if !spans.is_empty() {
            spans.push(separator());
        }
        let name = strip_control_chars(&author.name);
        spans.push(Span::styled(
            format!("{} ({})", name, initials(&name)),
            app.style("article_author"),
        ));
    }

    Line::from(spans)
}

fn article_item<'a>(app: &App, article: &'a Article, width: usize, selected: bool) -> ListItem<'a> {
    let title = strip_control_chars(&article.title);
    let title_style = if selected {
        app.style("article_selected")
    } else {
        app.style("article_title")
    };

    let mut lines = vec![
        Line::from(Span::styled(
            truncate_to_width(&title, width).into_owned(),
            title_style,
        )),
        meta_line(app, article),
    ];

    if let Some(description) = article.description.as_deref() {
        let text = html_to_text(description);
        if !text.is_empty() {
            lines.push(Line::from(Span::styled(
                truncate_to_width(&text, width).into_owned(),
                app.style("article_description"),
            )));
        }
    }
    lines.push(Line::from(""));

    ListItem::new(lines)
}

/// Render the article list for the active tab.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    let is_focused = app.focus == Focus::Articles;
    let tab = app.active_tab();
    let border_style = if is_focused {
        app.style("panel_border_focused")
    } else {
        app.style("panel_border")
    };

    let title = match app.feed.active_page() {
        Some(page) if page.total_count > 0 => {
            format!("{} ({} articles)", tab.label(), page.total_count)
        }
        _ => tab.label().to_string(),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(title);

    let articles = app.articles();
    if articles.is_empty() {
        let message = if app.feed.is_loading(tab) {
            "Loading..."
        } else {
            "No articles found"
        };
        let empty = Paragraph::new(message)
            .style(app.style("empty_state"))
            .block(block);
        f.render_widget(empty, area);
        return;
    }

    let width = area.width.saturating_sub(2) as usize;
    let items: Vec<ListItem> = articles
        .iter()
        .enumerate()
        .map(|(i, article)| article_item(app, article, width, i == app.selected_article))
        .collect();

    let mut state = ListState::default().with_selected(Some(app.selected_article));
    let list = List::new(items).block(block);
    f.render_stateful_widget(list, area, &mut state);
}

//! Theme system for the TUI.
//!
//! Provides semantic color roles that map to ratatui `Style` values.
//! The `ThemeVariant` enum selects between Dark and Light palettes,
//! and `StyleMap` resolves role names to concrete styles.

use ratatui::style::{Color, Modifier, Style};
use std::collections::HashMap;

// ============================================================================
// Theme Variant
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeVariant {
    #[default]
    Dark,
    Light,
}

impl ThemeVariant {
    /// Parse a variant name from a string (case-insensitive).
    pub fn from_str_name(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "dark" => Some(Self::Dark),
            "light" => Some(Self::Light),
            _ => None,
        }
    }

    pub fn palette(self) -> ColorPalette {
        match self {
            Self::Dark => ColorPalette::dark(),
            Self::Light => ColorPalette::light(),
        }
    }

    /// Dark → Light → Dark.
    pub fn next(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Dark => "Dark",
            Self::Light => "Light",
        }
    }
}

// ============================================================================
// Color Palette
// ============================================================================

/// Every semantic UI role mapped to a `Style`.
#[derive(Debug, Clone)]
pub struct ColorPalette {
    // -- Article list --
    pub article_title: Style,
    pub article_selected: Style,
    pub article_meta: Style,
    pub article_badge: Style,
    pub article_author: Style,
    pub article_description: Style,

    // -- Facet sidebar --
    pub facet_normal: Style,
    pub facet_selected: Style,
    pub facet_cursor: Style,

    // -- Tabs and search --
    pub tab_active: Style,
    pub tab_inactive: Style,
    pub search_input: Style,
    pub search_placeholder: Style,

    // -- Pagination --
    pub page_active: Style,
    pub page_link: Style,
    pub page_disabled: Style,

    // -- Forms --
    pub form_label: Style,
    pub form_input_focused: Style,
    pub form_error: Style,

    // -- Chrome --
    pub status_bar: Style,
    pub status_error: Style,
    pub panel_border: Style,
    pub panel_border_focused: Style,
    pub empty_state: Style,
}

impl ColorPalette {
    fn dark() -> Self {
        Self {
            article_title: Style::default().add_modifier(Modifier::BOLD),
            article_selected: Style::default().bg(Color::DarkGray).fg(Color::White),
            article_meta: Style::default().fg(Color::DarkGray),
            article_badge: Style::default().fg(Color::Yellow),
            article_author: Style::default().fg(Color::Cyan),
            article_description: Style::default().fg(Color::Gray),

            facet_normal: Style::default(),
            facet_selected: Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
            facet_cursor: Style::default().bg(Color::DarkGray).fg(Color::White),

            tab_active: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            tab_inactive: Style::default().fg(Color::DarkGray),
            search_input: Style::default().fg(Color::White),
            search_placeholder: Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),

            page_active: Style::default()
                .bg(Color::Cyan)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            page_link: Style::default(),
            page_disabled: Style::default().fg(Color::DarkGray),

            form_label: Style::default().fg(Color::Gray),
            form_input_focused: Style::default().fg(Color::Cyan),
            form_error: Style::default().fg(Color::Red),

            status_bar: Style::default().bg(Color::DarkGray).fg(Color::White),
            status_error: Style::default().bg(Color::Red).fg(Color::White),
            panel_border: Style::default(),
            panel_border_focused: Style::default().fg(Color::Cyan),
            empty_state: Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        }
    }

    fn light() -> Self {
        Self {
            article_title: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            article_selected: Style::default().bg(Color::Blue).fg(Color::White),
            article_meta: Style::default().fg(Color::DarkGray),
            article_badge: Style::default().fg(Color::Magenta),
            article_author: Style::default().fg(Color::Blue),
            article_description: Style::default().fg(Color::Black),

            facet_normal: Style::default().fg(Color::Black),
            facet_selected: Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
            facet_cursor: Style::default().bg(Color::Blue).fg(Color::White),

            tab_active: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            tab_inactive: Style::default().fg(Color::DarkGray),
            search_input: Style::default().fg(Color::Black),
            search_placeholder: Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),

            page_active: Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
            page_link: Style::default().fg(Color::Black),
            page_disabled: Style::default().fg(Color::Gray),

            form_label: Style::default().fg(Color::DarkGray),
            form_input_focused: Style::default().fg(Color::Blue),
            form_error: Style::default().fg(Color::Red),

            status_bar: Style::default().bg(Color::White).fg(Color::Black),
            status_error: Style::default().bg(Color::Red).fg(Color::White),
            panel_border: Style::default().fg(Color::DarkGray),
            panel_border_focused: Style::default().fg(Color::Blue),
            empty_state: Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        }
    }
}

// ============================================================================
// Style Map
// ============================================================================

/// String-keyed style lookup used by the render code.
#[derive(Debug, Clone)]
pub struct StyleMap {
    map: HashMap<&'static str, Style>,
}

/// All semantic role names, in declaration order.
const ROLE_NAMES: [&str; 24] = [
    "article_title",
    "article_selected",
    "article_meta",
    "article_badge",
    "article_author",
    "article_description",
    "facet_normal",
    "facet_selected",
    "facet_cursor",
    "tab_active",
    "tab_inactive",
    "search_input",
    "search_placeholder",
    "page_active",
    "page_link",
    "page_disabled",
    "form_label",
    "form_input_focused",
    "form_error",
    "status_bar",
    "status_error",
    "panel_border",
    "panel_border_focused",
    "empty_state",
];

impl StyleMap {
    pub fn from_palette(p: &ColorPalette) -> Self {
        let styles: [Style; 24] = [
            p.article_title,
            p.article_selected,
            p.article_meta,
            p.article_badge,
            p.article_author,
            p.article_description,
            p.facet_normal,
            p.facet_selected,
            p.facet_cursor,
            p.tab_active,
            p.tab_inactive,
            p.search_input,
            p.search_placeholder,
            p.page_active,
            p.page_link,
            p.page_disabled,
            p.form_label,
            p.form_input_focused,
            p.form_error,
            p.status_bar,
            p.status_error,
            p.panel_border,
            p.panel_border_focused,
            p.empty_state,
        ];

        let map = ROLE_NAMES.iter().copied().zip(styles).collect();
        Self { map }
    }

    /// Resolve a role name to its `Style`. Returns `Style::default()` for unknown roles.
    pub fn resolve(&self, role: &str) -> Style {
        self.map.get(role).copied().unwrap_or_default()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dark_selection_style() {
        let palette = ThemeVariant::Dark.palette();
        assert_eq!(
            palette.article_selected,
            Style::default().bg(Color::DarkGray).fg(Color::White)
        );
    }

    #[test]
    fn light_palette_differs_from_dark() {
        let dark = ThemeVariant::Dark.palette();
        let light = ThemeVariant::Light.palette();
        assert_ne!(dark.article_selected, light.article_selected);
        assert_ne!(dark.page_active, light.page_active);
    }

    #[test]
    fn variant_from_str_name() {
        assert_eq!(ThemeVariant::from_str_name("dark"), Some(ThemeVariant::Dark));
        assert_eq!(ThemeVariant::from_str_name("Light"), Some(ThemeVariant::Light));
        assert_eq!(ThemeVariant::from_str_name("neon"), None);
    }

    #[test]
    fn variant_cycles() {
        assert_eq!(ThemeVariant::Dark.next(), ThemeVariant::Light);
        assert_eq!(ThemeVariant::Light.next().name(), "Dark");
    }

    #[test]
    fn style_map_resolves_known_roles() {
        let palette = ThemeVariant::Dark.palette();
        let sm = StyleMap::from_palette(&palette);
        assert_eq!(sm.resolve("page_active"), palette.page_active);
        assert_eq!(sm.resolve("facet_selected"), palette.facet_selected);
        assert_eq!(sm.resolve("nonexistent_role"), Style::default());
    }

    #[test]
    fn style_map_has_all_roles() {
        let sm = StyleMap::from_palette(&ThemeVariant::Light.palette());
        assert_eq!(sm.map.len(), ROLE_NAMES.len());
    }
}

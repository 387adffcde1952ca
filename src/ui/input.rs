//! Input handling for the TUI.
//!
//! Overlays capture keys first, then the search box, then the current view.

use crate::app::{App, AppEvent, FacetEntry, Focus, View};
use crate::forms::AuthMode;
use crate::keybindings::{Action as KbAction, Context as KbContext};
use crate::util::MAX_SEARCH_QUERY_LENGTH;
use crossterm::event::{KeyCode, KeyModifiers};
use tokio::sync::mpsc;
use tokio::time::Instant;

use super::helpers::{
    logout, open_selected_article, spawn_auth, spawn_facet_load, spawn_fetches,
    spawn_preferences_save,
};
use super::Action;

/// Map the current focus panel to a keybinding context for context-specific lookups.
fn focus_to_context(focus: Focus) -> KbContext {
    match focus {
        Focus::Articles => KbContext::Articles,
        Focus::Sidebar => KbContext::Sidebar,
    }
}

/// Main input dispatch function.
pub(super) fn handle_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Action {
    // Terminals report uppercase letters with SHIFT; bindings name the
    // character alone
    let modifiers = match code {
        KeyCode::Char(_) => modifiers.difference(KeyModifiers::SHIFT),
        _ => modifiers,
    };

    if app.show_help {
        return handle_help_input(app, code, modifiers);
    }

    if app.show_profile {
        return handle_profile_input(app, code, modifiers, event_tx);
    }

    match app.view {
        View::Login | View::Register => handle_form_input(app, code, modifiers, event_tx),
        View::Preferences => handle_preferences_input(app, code, modifiers, event_tx),
        View::Feed if app.search_mode => handle_search_input(app, code, modifiers, event_tx),
        View::Feed => handle_feed_input(app, code, modifiers, event_tx),
    }
}

/// Handle input while the help overlay is visible.
///
/// Captures all keys: j/k/Up/Down scroll, Esc/q/? dismiss.
fn handle_help_input(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> Action {
    match app
        .keybindings
        .action_for_key(code, modifiers, KbContext::Overlay)
    {
        Some(KbAction::Back) | Some(KbAction::ShowHelp) => {
            app.show_help = false;
            app.help_scroll_offset = 0;
        }
        Some(KbAction::NavDown) => {
            app.help_scroll_offset = app.help_scroll_offset.saturating_add(1);
        }
        Some(KbAction::NavUp) => {
            app.help_scroll_offset = app.help_scroll_offset.saturating_sub(1);
        }
        _ => {}
    }
    Action::Continue
}

fn handle_profile_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Action {
    match app
        .keybindings
        .action_for_key(code, modifiers, KbContext::Overlay)
    {
        Some(KbAction::Back) | Some(KbAction::ShowProfile) => app.show_profile = false,
        Some(KbAction::EditPreferences) => app.open_preferences(),
        Some(KbAction::Logout) => logout(app, event_tx),
        _ => {}
    }
    Action::Continue
}

// ============================================================================
// Sign in / register
// ============================================================================

fn handle_form_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Action {
    match app
        .keybindings
        .action_for_key(code, modifiers, KbContext::Form)
    {
        Some(KbAction::Quit) => return Action::Quit,
        Some(KbAction::NextField) => app.auth_form.focus_next(),
        Some(KbAction::PrevField) => app.auth_form.focus_prev(),
        Some(KbAction::SwitchAuthMode) => {
            let next = match app.auth_form.mode() {
                AuthMode::Login => AuthMode::Register,
                AuthMode::Register => AuthMode::Login,
            };
            app.open_auth(next);
        }
        Some(KbAction::Submit) => submit_auth_form(app, event_tx),
        Some(KbAction::Back) => match app.view {
            View::Register => app.open_auth(AuthMode::Login),
            // Browse Explore without signing in
            _ => {
                let requests = app.enter_feed();
                spawn_fetches(app, requests, event_tx);
            }
        },
        Some(_) => {}
        None => match code {
            KeyCode::Char(c) if !modifiers.contains(KeyModifiers::CONTROL) => {
                app.auth_form.insert_char(c);
                app.form_error = None;
            }
            KeyCode::Backspace => app.auth_form.backspace(),
            _ => {}
        },
    }
    Action::Continue
}

fn submit_auth_form(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    if app.auth_pending {
        return;
    }
    match app.auth_form.validate() {
        Ok(credentials) => {
            app.form_error = None;
            spawn_auth(app, credentials, event_tx);
        }
        Err(e) => {
            tracing::debug!(error = %e, "Form validation failed");
            app.form_error = Some(e.to_string().into());
        }
    }
}

// ============================================================================
// Preferences
// ============================================================================

fn handle_preferences_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Action {
    match app
        .keybindings
        .action_for_key(code, modifiers, KbContext::Preferences)
    {
        Some(KbAction::Quit) => return Action::Quit,
        Some(KbAction::NavDown) => app.nav_down(),
        Some(KbAction::NavUp) => app.nav_up(),
        Some(KbAction::ToggleFacet) => {
            match app.facet_entry(app.preferences_selected) {
                Some(FacetEntry::Category(id)) => app.preference_selection.toggle_category(id),
                Some(FacetEntry::Author(id)) => app.preference_selection.toggle_author(id),
                None => {}
            }
            app.form_error = None;
        }
        Some(KbAction::Submit) => {
            if app.preferences_pending {
                return Action::Continue;
            }
            match app.preference_selection.validate() {
                Ok(ids) => {
                    app.form_error = None;
                    spawn_preferences_save(app, ids, event_tx);
                }
                Err(e) => app.form_error = Some(e.to_string().into()),
            }
        }
        Some(KbAction::Back) => {
            let requests = app.enter_feed();
            spawn_fetches(app, requests, event_tx);
        }
        Some(KbAction::CycleTheme) => {
            let name = app.cycle_theme();
            app.set_status(format!("Theme: {}", name));
        }
        Some(KbAction::ShowHelp) => app.show_help = true,
        _ => {}
    }
    Action::Continue
}

// ============================================================================
// Search box
// ============================================================================

fn handle_search_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Action {
    match app
        .keybindings
        .action_for_key(code, modifiers, KbContext::Search)
    {
        Some(KbAction::Quit) => return Action::Quit,
        Some(KbAction::ExitSearch) => app.search_mode = false,
        Some(KbAction::CommitSearch) => {
            app.search_mode = false;
            let requests = app.feed.commit_search();
            spawn_fetches(app, requests, event_tx);
        }
        Some(KbAction::ClearSearch) => edit_search(app, event_tx, String::clear),
        Some(_) => {}
        None => match code {
            KeyCode::Char(c) if !modifiers.contains(KeyModifiers::CONTROL) => {
                if app.feed.filters().search_text().chars().count() >= MAX_SEARCH_QUERY_LENGTH {
                    app.set_status(format!(
                        "Search query at max length ({} chars)",
                        MAX_SEARCH_QUERY_LENGTH
                    ));
                    return Action::Continue;
                }
                edit_search(app, event_tx, |text| text.push(c));
            }
            KeyCode::Backspace => edit_search(app, event_tx, |text| {
                text.pop();
            }),
            _ => {}
        },
    }
    Action::Continue
}

/// Apply an edit to the search text. The fetch itself waits for the
/// debounce, driven by the tick handler.
fn edit_search(app: &mut App, event_tx: &mpsc::Sender<AppEvent>, edit: impl FnOnce(&mut String)) {
    let mut text = app.feed.filters().search_text().to_string();
    edit(&mut text);
    if text == app.feed.filters().search_text() {
        return;
    }
    let requests = app.feed.set_search_text(text, Instant::now());
    app.selected_article = 0;
    app.clamp_selections();
    spawn_fetches(app, requests, event_tx);
}

// ============================================================================
// Feed view
// ============================================================================

fn handle_feed_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Action {
    let context = focus_to_context(app.focus);
    let Some(action) = app.keybindings.action_for_key(code, modifiers, context) else {
        return Action::Continue;
    };

    match action {
        KbAction::Quit => return Action::Quit,
        KbAction::Back => app.focus = Focus::Articles,
        KbAction::NavDown => app.nav_down(),
        KbAction::NavUp => app.nav_up(),
        KbAction::CycleFocus => app.cycle_focus(),
        KbAction::OpenInBrowser => open_selected_article(app),
        KbAction::ToggleFacet => toggle_selected_facet(app, event_tx),
        KbAction::SwitchTab => {
            app.switch_tab();
        }
        KbAction::EnterSearch => app.search_mode = true,
        KbAction::NextPage => {
            let target = app.feed.pagination().and_then(|p| p.next_page());
            go_to_page(app, target, event_tx);
        }
        KbAction::PrevPage => {
            let target = app.feed.pagination().and_then(|p| p.previous_page());
            go_to_page(app, target, event_tx);
        }
        KbAction::FirstPage => go_to_page(app, Some(1), event_tx),
        KbAction::LastPage => {
            let target = app.feed.pagination().map(|p| p.last_page);
            go_to_page(app, target, event_tx);
        }
        KbAction::Refresh => {
            let requests = app.feed.refresh();
            spawn_fetches(app, requests, event_tx);
            if !app.facets_loaded {
                spawn_facet_load(app, event_tx);
            }
            app.set_status("Refreshing...");
        }
        KbAction::CycleTheme => {
            let name = app.cycle_theme();
            app.set_status(format!("Theme: {}", name));
        }
        KbAction::ShowHelp => app.show_help = true,
        KbAction::ShowProfile => {
            if app.session.is_authenticated() {
                app.show_profile = true;
            } else {
                app.set_status("Not signed in");
            }
        }
        KbAction::EditPreferences => {
            if app.session.is_authenticated() {
                app.open_preferences();
            } else {
                app.set_status("Sign in to choose preferences");
            }
        }
        KbAction::SignIn => {
            if app.session.is_authenticated() {
                app.set_status("Already signed in");
            } else {
                app.open_auth(AuthMode::Login);
            }
        }
        KbAction::Logout => logout(app, event_tx),
        KbAction::ExitSearch
        | KbAction::CommitSearch
        | KbAction::ClearSearch
        | KbAction::NextField
        | KbAction::PrevField
        | KbAction::Submit
        | KbAction::SwitchAuthMode => {}
    }
    Action::Continue
}

fn toggle_selected_facet(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    let requests = match app.facet_entry(app.sidebar_selected) {
        Some(FacetEntry::Category(id)) => app.feed.toggle_category(id),
        Some(FacetEntry::Author(id)) => app.feed.toggle_author(id),
        None => return,
    };
    app.selected_article = 0;
    spawn_fetches(app, requests, event_tx);
}

fn go_to_page(app: &mut App, target: Option<u32>, event_tx: &mpsc::Sender<AppEvent>) {
    let Some(page) = target else {
        return;
    };
    if page == app.feed.filters().page() {
        return;
    }
    let requests = app.feed.set_page(page);
    app.selected_article = 0;
    spawn_fetches(app, requests, event_tx);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Category;
    use crate::config::Config;
    use crate::feed::Tab;
    use crate::session::Session;
    use std::sync::Arc;

    fn feed_app() -> (App, mpsc::Sender<AppEvent>, mpsc::Receiver<AppEvent>) {
        let (tx, rx) = mpsc::channel(32);
        let mut app = App::new(&Config::default(), Session::default()).unwrap();
        app.enter_feed();
        (app, tx, rx)
    }

    fn press(app: &mut App, tx: &mpsc::Sender<AppEvent>, code: KeyCode) -> Action {
        handle_input(app, code, KeyModifiers::NONE, tx)
    }

    fn type_text(app: &mut App, tx: &mpsc::Sender<AppEvent>, text: &str) {
        for c in text.chars() {
            press(app, tx, KeyCode::Char(c));
        }
    }

    #[tokio::test]
    async fn test_quit_from_feed() {
        let (mut app, tx, _rx) = feed_app();
        assert!(matches!(press(&mut app, &tx, KeyCode::Char('q')), Action::Quit));
    }

    #[tokio::test]
    async fn test_search_box_captures_command_keys() {
        let (mut app, tx, _rx) = feed_app();
        press(&mut app, &tx, KeyCode::Char('/'));
        assert!(app.search_mode);

        // 'q' and 't' are typed, not executed
        let action = press(&mut app, &tx, KeyCode::Char('q'));
        assert!(matches!(action, Action::Continue));
        type_text(&mut app, &tx, "t");
        assert_eq!(app.feed.filters().search_text(), "qt");
        assert!(app.feed.is_search_pending());

        press(&mut app, &tx, KeyCode::Backspace);
        assert_eq!(app.feed.filters().search_text(), "q");

        press(&mut app, &tx, KeyCode::Esc);
        assert!(!app.search_mode);
        assert_eq!(app.feed.filters().search_text(), "q");
    }

    #[tokio::test]
    async fn test_enter_commits_search() {
        let (mut app, tx, _rx) = feed_app();
        press(&mut app, &tx, KeyCode::Char('/'));
        type_text(&mut app, &tx, "rust");
        press(&mut app, &tx, KeyCode::Enter);

        assert!(!app.search_mode);
        assert!(!app.feed.is_search_pending());
        assert_eq!(app.feed.applied_search(), "rust");
    }

    #[tokio::test]
    async fn test_shifted_letters_match_bindings() {
        let (mut app, tx, _rx) = feed_app();
        handle_input(&mut app, KeyCode::Char('T'), KeyModifiers::SHIFT, &tx);
        assert_eq!(app.theme_variant, crate::theme::ThemeVariant::Light);
    }

    #[tokio::test]
    async fn test_sidebar_toggle_resets_page() {
        let (mut app, tx, _rx) = feed_app();
        app.categories = Arc::new(vec![Category {
            id: 5,
            name: "Science".into(),
            slug: "science".into(),
        }]);
        app.feed.set_page(3);

        press(&mut app, &tx, KeyCode::Tab);
        assert_eq!(app.focus, Focus::Sidebar);
        press(&mut app, &tx, KeyCode::Char(' '));

        assert!(app.feed.filters().is_category_selected(5));
        assert_eq!(app.feed.filters().page(), 1);
    }

    #[tokio::test]
    async fn test_tab_switch_needs_preferences() {
        let (mut app, tx, _rx) = feed_app();
        press(&mut app, &tx, KeyCode::Char('t'));
        assert_eq!(app.active_tab(), Tab::Explore);
    }

    #[tokio::test]
    async fn test_login_form_validation_blocks_submit() {
        let (tx, _rx) = mpsc::channel(8);
        let mut app = App::new(&Config::default(), Session::default()).unwrap();
        assert_eq!(app.view, View::Login);

        press(&mut app, &tx, KeyCode::Enter);
        assert!(!app.auth_pending);
        assert_eq!(app.form_error.as_deref(), Some("Please fill in all fields"));
    }

    #[tokio::test]
    async fn test_form_switches_to_register() {
        let (tx, _rx) = mpsc::channel(8);
        let mut app = App::new(&Config::default(), Session::default()).unwrap();
        handle_input(&mut app, KeyCode::Char('r'), KeyModifiers::CONTROL, &tx);
        assert_eq!(app.view, View::Register);

        press(&mut app, &tx, KeyCode::Esc);
        assert_eq!(app.view, View::Login);
    }

    #[tokio::test]
    async fn test_escape_from_login_browses_anonymously() {
        let (tx, _rx) = mpsc::channel(8);
        let mut app = App::new(&Config::default(), Session::default()).unwrap();
        press(&mut app, &tx, KeyCode::Esc);
        assert_eq!(app.view, View::Feed);
        assert!(app.feed.is_loading(Tab::Explore));
    }

    #[tokio::test]
    async fn test_preferences_need_three_of_each() {
        let (mut app, tx, _rx) = feed_app();
        app.open_preferences();
        app.categories = Arc::new(vec![Category {
            id: 1,
            name: "World".into(),
            slug: "world".into(),
        }]);

        press(&mut app, &tx, KeyCode::Char(' '));
        assert_eq!(app.preference_selection.category_count(), 1);

        press(&mut app, &tx, KeyCode::Enter);
        assert!(!app.preferences_pending);
        assert!(app.form_error.is_some());
    }

    #[tokio::test]
    async fn test_help_overlay_captures_keys() {
        let (mut app, tx, _rx) = feed_app();
        press(&mut app, &tx, KeyCode::Char('?'));
        assert!(app.show_help);

        // 'q' closes the overlay instead of quitting
        assert!(matches!(press(&mut app, &tx, KeyCode::Char('q')), Action::Continue));
        assert!(!app.show_help);
    }
}

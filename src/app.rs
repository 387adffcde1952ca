use crate::api::{ApiClient, ApiError, Article, AuthData, Author, Category, User};
use crate::config::Config;
use crate::feed::{ArticlePage, FeedController, FetchRequest, QueryKey, Tab};
use crate::forms::{AuthForm, AuthMode, PreferenceSelection};
use crate::keybindings::KeybindingRegistry;
use crate::session::Session;
use crate::theme::{StyleMap, ThemeVariant};
use anyhow::{Context, Result};
use ratatui::style::Style;
use std::borrow::Cow;
use std::sync::Arc;
use tokio::time::Instant;

/// How long a status bar notification stays up.
pub const STATUS_TTL_SECS: u64 = 3;

// ============================================================================
// View and Focus Enums
// ============================================================================

/// Top-level screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Login,
    Register,
    Preferences, // Author / category picker
    Feed,        // Search, tabs, article list, filters, pagination
}

/// Which panel has focus in the feed view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Articles,
    Sidebar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Error,
}

/// A row of the filter sidebar or the preferences picker.
///
/// Both list every category first, then every author.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacetEntry {
    Category(i64),
    Author(i64),
}

// ============================================================================
// Events
// ============================================================================

/// Events from background tasks.
///
/// Results that depend on who is signed in carry the session `epoch` they
/// were started under; the handler drops them once the session has moved on.
pub enum AppEvent {
    /// An article page finished loading.
    ///
    /// `generation` is the slot generation from the [`FetchRequest`].
    PageLoaded {
        key: QueryKey,
        generation: u64,
        epoch: u64,
        result: Result<ArticlePage, ApiError>,
    },
    /// Author and category lists for the sidebar and preferences picker.
    FacetsLoaded {
        authors: Result<Vec<Author>, ApiError>,
        categories: Result<Vec<Category>, ApiError>,
    },
    /// Login or registration finished.
    AuthCompleted {
        mode: AuthMode,
        epoch: u64,
        result: Result<AuthData, ApiError>,
    },
    /// The user record behind a startup token.
    UserLoaded {
        epoch: u64,
        result: Result<User, ApiError>,
    },
    PreferencesSaved {
        epoch: u64,
        result: Result<User, ApiError>,
    },
    /// Server-side logout finished. The local session is already gone.
    LoggedOut { result: Result<(), ApiError> },
    /// A background task panicked.
    ///
    /// Fields:
    /// - `task`: Name of the task that panicked (e.g., "page_fetch", "login")
    /// - `error`: The panic message extracted from the panic payload
    TaskPanicked { task: &'static str, error: String },
}

// ============================================================================
// Application State
// ============================================================================

/// Central application state
pub struct App {
    pub api: ApiClient,
    pub session: Session,
    pub feed: FeedController,

    // Theme
    pub theme_variant: ThemeVariant,
    pub theme: StyleMap,

    pub keybindings: KeybindingRegistry,

    // Facets, shared by the sidebar and the preferences picker
    pub categories: Arc<Vec<Category>>,
    pub authors: Arc<Vec<Author>>,
    pub facets_loaded: bool,

    // UI State
    pub view: View,
    pub focus: Focus,
    pub selected_article: usize,
    pub sidebar_selected: usize,
    pub preferences_selected: usize,
    pub search_mode: bool,

    // Forms
    pub auth_form: AuthForm,
    /// Validation or server message shown under the form.
    pub form_error: Option<Cow<'static, str>>,
    pub auth_pending: bool,
    pub preference_selection: PreferenceSelection,
    pub preferences_pending: bool,

    pub status_message: Option<(Cow<'static, str>, StatusKind, Instant)>,

    pub show_help: bool,
    pub help_scroll_offset: usize,
    pub show_profile: bool,

    /// Dirty flag to skip unnecessary frame renders
    pub needs_redraw: bool,
}

impl App {
    pub fn new(config: &Config, session: Session) -> Result<Self> {
        let api = ApiClient::new(&config.api_base_url, config.request_timeout())
            .with_context(|| format!("Cannot use API base URL '{}'", config.api_base_url))?;

        let theme_variant = ThemeVariant::from_str_name(&config.theme).unwrap_or_else(|| {
            tracing::warn!(theme = %config.theme, "Unknown theme, using dark");
            ThemeVariant::Dark
        });

        let mut keybindings = KeybindingRegistry::new();
        for warning in keybindings.apply_overrides(&config.keybindings) {
            tracing::warn!(%warning, "Keybinding override ignored");
        }

        let view = if session.is_authenticated() {
            View::Feed
        } else {
            View::Login
        };

        Ok(Self {
            api,
            session,
            feed: FeedController::new(config.search_debounce(), config.cache_capacity()),
            theme_variant,
            theme: StyleMap::from_palette(&theme_variant.palette()),
            keybindings,
            categories: Arc::new(Vec::new()),
            authors: Arc::new(Vec::new()),
            facets_loaded: false,
            view,
            focus: Focus::Articles,
            selected_article: 0,
            sidebar_selected: 0,
            preferences_selected: 0,
            search_mode: false,
            auth_form: AuthForm::new(AuthMode::Login),
            form_error: None,
            auth_pending: false,
            preference_selection: PreferenceSelection::default(),
            preferences_pending: false,
            status_message: None,
            show_help: false,
            help_scroll_offset: 0,
            show_profile: false,
            needs_redraw: true,
        })
    }

    /// Resolve a semantic role name to its `Style`.
    pub fn style(&self, role: &str) -> Style {
        self.theme.resolve(role)
    }

    pub fn set_theme(&mut self, variant: ThemeVariant) {
        self.theme_variant = variant;
        self.theme = StyleMap::from_palette(&variant.palette());
        self.needs_redraw = true;
    }

    /// Cycle to the next theme variant. Returns its name for status display.
    pub fn cycle_theme(&mut self) -> &'static str {
        let next = self.theme_variant.next();
        self.set_theme(next);
        next.name()
    }

    // ========================================================================
    // Feed view
    // ========================================================================

    pub fn active_tab(&self) -> Tab {
        self.feed.filters().active_tab()
    }

    /// Articles of the page shown on the active tab.
    pub fn articles(&self) -> &[Article] {
        self.feed
            .active_page()
            .map(|page| page.items.as_slice())
            .unwrap_or(&[])
    }

    pub fn selected_article(&self) -> Option<&Article> {
        self.articles().get(self.selected_article)
    }

    /// The filter sidebar is only offered on Explore.
    pub fn sidebar_visible(&self) -> bool {
        self.view == View::Feed && self.active_tab() == Tab::Explore
    }

    pub fn facet_count(&self) -> usize {
        self.categories.len() + self.authors.len()
    }

    pub fn facet_entry(&self, index: usize) -> Option<FacetEntry> {
        match self.categories.get(index) {
            Some(category) => Some(FacetEntry::Category(category.id)),
            None => self
                .authors
                .get(index - self.categories.len())
                .map(|author| FacetEntry::Author(author.id)),
        }
    }

    /// Clamp all selection indices to valid ranges.
    pub fn clamp_selections(&mut self) {
        let articles = self.articles().len();
        self.selected_article = self.selected_article.min(articles.saturating_sub(1));

        let facets = self.facet_count();
        self.sidebar_selected = self.sidebar_selected.min(facets.saturating_sub(1));
        self.preferences_selected = self.preferences_selected.min(facets.saturating_sub(1));

        if self.focus == Focus::Sidebar && !self.sidebar_visible() {
            self.focus = Focus::Articles;
        }
    }

    pub fn nav_down(&mut self) {
        let facets = self.facet_count();
        let articles = self.articles().len();
        let (cursor, len) = match (self.view, self.focus) {
            (View::Preferences, _) => (&mut self.preferences_selected, facets),
            (_, Focus::Sidebar) => (&mut self.sidebar_selected, facets),
            (_, Focus::Articles) => (&mut self.selected_article, articles),
        };
        if *cursor + 1 < len {
            *cursor += 1;
        }
    }

    pub fn nav_up(&mut self) {
        let cursor = match (self.view, self.focus) {
            (View::Preferences, _) => &mut self.preferences_selected,
            (_, Focus::Sidebar) => &mut self.sidebar_selected,
            (_, Focus::Articles) => &mut self.selected_article,
        };
        *cursor = cursor.saturating_sub(1);
    }

    /// Articles ↔ filters. Stays on the article list when there are no filters.
    pub fn cycle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Articles if self.sidebar_visible() && self.facet_count() > 0 => Focus::Sidebar,
            _ => Focus::Articles,
        };
    }

    /// Switch Explore / My Feeds. My Feeds needs a user with preferences.
    ///
    /// Returns false (and explains on the status bar) when the switch is refused.
    pub fn switch_tab(&mut self) -> bool {
        let next = self.active_tab().other();
        if next == Tab::Personalized && !self.feed.is_personalized_enabled() {
            self.set_status("Sign in and choose preferences to use My Feeds");
            return false;
        }
        self.feed.set_active_tab(next);
        self.selected_article = 0;
        self.clamp_selections();
        true
    }

    /// Show the feed view and start whatever reads it needs.
    pub fn enter_feed(&mut self) -> Vec<FetchRequest> {
        self.view = View::Feed;
        self.form_error = None;
        self.clamp_selections();
        self.feed
            .set_personalized_enabled(self.session.has_preferences())
    }

    // ========================================================================
    // Forms
    // ========================================================================

    pub fn open_auth(&mut self, mode: AuthMode) {
        self.view = match mode {
            AuthMode::Login => View::Login,
            AuthMode::Register => View::Register,
        };
        self.auth_form = AuthForm::new(mode);
        self.form_error = None;
        self.auth_pending = false;
        self.search_mode = false;
        self.show_profile = false;
    }

    /// Open the preferences picker seeded with the user's saved choices.
    pub fn open_preferences(&mut self) {
        self.preference_selection = self
            .session
            .user()
            .map(PreferenceSelection::from_user)
            .unwrap_or_default();
        self.preferences_selected = 0;
        self.preferences_pending = false;
        self.form_error = None;
        self.search_mode = false;
        self.show_profile = false;
        self.view = View::Preferences;
    }

    /// Drop credentials and every result fetched with them, then ask the
    /// user to sign in again.
    pub fn end_session(&mut self) {
        self.session.invalidate();
        self.feed.reset();
        self.focus = Focus::Articles;
        self.selected_article = 0;
        self.sidebar_selected = 0;
        self.preferences_pending = false;
        self.open_auth(AuthMode::Login);
        tracing::info!(epoch = self.session.epoch(), "Session ended");
    }

    // ========================================================================
    // Status bar
    // ========================================================================

    /// Set status message (will auto-expire after 3 seconds)
    pub fn set_status(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.status_message = Some((msg.into(), StatusKind::Info, Instant::now()));
    }

    pub fn set_error(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.status_message = Some((msg.into(), StatusKind::Error, Instant::now()));
    }

    /// Clear status message if expired. Returns true if one was cleared.
    pub fn clear_expired_status(&mut self) -> bool {
        if let Some((_, _, time)) = &self.status_message {
            if time.elapsed().as_secs() >= STATUS_TTL_SECS {
                self.status_message = None;
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::PageEnvelope;
    use secrecy::SecretString;
    use std::time::Duration;

    fn test_app() -> App {
        App::new(&Config::default(), Session::default()).unwrap()
    }

    fn article(id: i64) -> Article {
        serde_json::from_value(serde_json::json!({"id": id, "title": format!("Story {id}")}))
            .unwrap()
    }

    fn load_explore(app: &mut App, count: i64) {
        let requests = app.feed.refresh();
        let request = requests
            .into_iter()
            .find(|r| r.key.tab() == Tab::Explore)
            .unwrap();
        let page = PageEnvelope {
            items: (1..=count).map(article).collect(),
            total_count: count as u64,
            current_page: 1,
            per_page: 10,
            last_page: 1,
        };
        app.feed.complete(&request.key, request.generation, Ok(page));
    }

    #[test]
    fn test_starts_on_login_without_token() {
        let app = test_app();
        assert_eq!(app.view, View::Login);
        assert!(app.selected_article().is_none());
    }

    #[test]
    fn test_starts_on_feed_with_token() {
        let app = App::new(
            &Config::default(),
            Session::with_token(SecretString::from("t")),
        )
        .unwrap();
        assert_eq!(app.view, View::Feed);
    }

    #[test]
    fn test_rejects_insecure_base_url() {
        let config = Config {
            api_base_url: "http://news.example.com/api".into(),
            ..Config::default()
        };
        assert!(App::new(&config, Session::default()).is_err());
    }

    #[test]
    fn test_unknown_theme_falls_back_to_dark() {
        let config = Config {
            theme: "neon".into(),
            ..Config::default()
        };
        let app = App::new(&config, Session::default()).unwrap();
        assert_eq!(app.theme_variant, ThemeVariant::Dark);
    }

    #[test]
    fn test_nav_stays_in_bounds() {
        let mut app = test_app();
        app.enter_feed();
        load_explore(&mut app, 3);

        app.nav_up();
        assert_eq!(app.selected_article, 0);
        for _ in 0..5 {
            app.nav_down();
        }
        assert_eq!(app.selected_article, 2);
        assert_eq!(app.selected_article().map(|a| a.id), Some(3));
    }

    #[test]
    fn test_facet_entries_list_categories_then_authors() {
        let mut app = test_app();
        app.categories = Arc::new(vec![Category {
            id: 10,
            name: "Tech".into(),
            slug: "tech".into(),
        }]);
        app.authors = Arc::new(vec![Author {
            id: 20,
            name: "Ada".into(),
            slug: "ada".into(),
        }]);

        assert_eq!(app.facet_entry(0), Some(FacetEntry::Category(10)));
        assert_eq!(app.facet_entry(1), Some(FacetEntry::Author(20)));
        assert_eq!(app.facet_entry(2), None);
    }

    #[test]
    fn test_focus_needs_visible_sidebar() {
        let mut app = test_app();
        app.enter_feed();
        app.cycle_focus();
        assert_eq!(app.focus, Focus::Articles, "no facets loaded yet");

        app.categories = Arc::new(vec![Category {
            id: 1,
            name: "World".into(),
            slug: "world".into(),
        }]);
        app.cycle_focus();
        assert_eq!(app.focus, Focus::Sidebar);
        app.cycle_focus();
        assert_eq!(app.focus, Focus::Articles);
    }

    #[test]
    fn test_my_feeds_refused_without_preferences() {
        let mut app = test_app();
        app.enter_feed();
        assert!(!app.switch_tab());
        assert_eq!(app.active_tab(), Tab::Explore);
        assert!(app.status_message.is_some());
    }

    #[test]
    fn test_end_session_resets_feed() {
        let mut app = App::new(
            &Config::default(),
            Session::with_token(SecretString::from("t")),
        )
        .unwrap();
        app.enter_feed();
        app.feed.toggle_category(4);
        let epoch = app.session.epoch();

        app.end_session();

        assert_eq!(app.view, View::Login);
        assert!(!app.session.is_authenticated());
        assert!(!app.session.is_current(epoch));
        assert!(app.feed.filters().selected_category_ids().is_empty());
        assert!(app.feed.active_page().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_expires() {
        let mut app = test_app();
        app.set_status("Hello");
        assert!(!app.clear_expired_status());

        tokio::time::advance(Duration::from_secs(STATUS_TTL_SECS)).await;
        assert!(app.clear_expired_status());
        assert!(app.status_message.is_none());
    }

    #[test]
    fn test_cycle_theme() {
        let mut app = test_app();
        assert_eq!(app.cycle_theme(), "Light");
        assert_eq!(app.theme_variant, ThemeVariant::Light);
        assert_eq!(app.cycle_theme(), "Dark");
    }
}

//! Keybinding registry: maps actions to key events with config overrides.
//!
//! Bindings are looked up per context. Command contexts fall back to the
//! global bindings; text-entry contexts do not, so typed characters reach
//! the input field.
use crossterm::event::{KeyCode, KeyModifiers};
use std::collections::HashMap;

// ============================================================================
// Action Enum
// ============================================================================

/// All user-facing actions that can be triggered by keybindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Quit,
    NavDown,
    NavUp,
    CycleFocus,
    Back,
    OpenInBrowser,
    ToggleFacet,
    SwitchTab,
    EnterSearch,
    ExitSearch,
    CommitSearch,
    ClearSearch,
    NextPage,
    PrevPage,
    FirstPage,
    LastPage,
    Refresh,
    CycleTheme,
    ShowHelp,
    ShowProfile,
    EditPreferences,
    SignIn,
    Logout,
    NextField,
    PrevField,
    Submit,
    SwitchAuthMode,
}

impl Action {
    /// Human-readable description for the help screen.
    pub fn describe(self) -> &'static str {
        match self {
            Self::Quit => "Quit application",
            Self::NavDown => "Navigate down",
            Self::NavUp => "Navigate up",
            Self::CycleFocus => "Switch between articles and filters",
            Self::Back => "Go back / dismiss",
            Self::OpenInBrowser => "Open article in browser",
            Self::ToggleFacet => "Toggle category or author filter",
            Self::SwitchTab => "Switch Explore / My Feeds",
            Self::EnterSearch => "Search articles",
            Self::ExitSearch => "Leave search box",
            Self::CommitSearch => "Search now",
            Self::ClearSearch => "Clear search text",
            Self::NextPage => "Next page",
            Self::PrevPage => "Previous page",
            Self::FirstPage => "First page",
            Self::LastPage => "Last page",
            Self::Refresh => "Reload current page",
            Self::CycleTheme => "Toggle light / dark theme",
            Self::ShowHelp => "Show help",
            Self::ShowProfile => "Show profile",
            Self::EditPreferences => "Edit feed preferences",
            Self::SignIn => "Sign in",
            Self::Logout => "Log out",
            Self::NextField => "Next field",
            Self::PrevField => "Previous field",
            Self::Submit => "Submit",
            Self::SwitchAuthMode => "Switch sign in / register",
        }
    }
}

// ============================================================================
// Context Enum
// ============================================================================

/// Dispatch context: determines which bindings are active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Context {
    Global,
    Articles,
    Sidebar,
    Search,
    Form,
    Preferences,
    Overlay,
}

impl Context {
    /// Text-entry contexts must not pick up global single-key commands.
    fn falls_back_to_global(self) -> bool {
        !matches!(self, Context::Search | Context::Form)
    }

    pub fn label(self) -> &'static str {
        match self {
            Context::Global => "General",
            Context::Articles => "Article list",
            Context::Sidebar => "Filters",
            Context::Search => "Search box",
            Context::Form => "Sign in / register",
            Context::Preferences => "Preferences",
            Context::Overlay => "Dialogs",
        }
    }
}

// ============================================================================
// Key Specification
// ============================================================================

/// A key event: code + modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeySpec {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeySpec {
    pub const fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    pub const fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }

    pub const fn ctrl(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    const fn char(c: char) -> Self {
        Self::plain(KeyCode::Char(c))
    }
}

/// Parse a key string from config into a KeySpec.
///
/// Supported formats:
/// - Single char: "q", "j", "/"
/// - Named keys: "Enter", "Esc", "Tab", "BackTab", "Up", "Down", "Backspace"
/// - Modifier combos: "Ctrl+d", "Ctrl+u"
/// - Function keys: "F1" through "F12"
fn parse_key_string(s: &str) -> Option<KeySpec> {
    let s = s.trim();

    if let Some(rest) = s.strip_prefix("Ctrl+") {
        let rest = rest.trim();
        let mut chars = rest.chars();
        return match (chars.next(), chars.next()) {
            (Some(c), None) => Some(KeySpec::ctrl(c)),
            _ => None,
        };
    }

    // Named keys (case-insensitive)
    match s.to_lowercase().as_str() {
        "enter" | "return" => return Some(KeySpec::plain(KeyCode::Enter)),
        "esc" | "escape" => return Some(KeySpec::plain(KeyCode::Esc)),
        "tab" => return Some(KeySpec::plain(KeyCode::Tab)),
        "backtab" | "shift+tab" => {
            return Some(KeySpec::new(KeyCode::BackTab, KeyModifiers::SHIFT))
        }
        "up" => return Some(KeySpec::plain(KeyCode::Up)),
        "down" => return Some(KeySpec::plain(KeyCode::Down)),
        "left" => return Some(KeySpec::plain(KeyCode::Left)),
        "right" => return Some(KeySpec::plain(KeyCode::Right)),
        "backspace" => return Some(KeySpec::plain(KeyCode::Backspace)),
        "space" => return Some(KeySpec::char(' ')),
        _ => {}
    }

    if let Some(n) = s.strip_prefix(['F', 'f']).and_then(|n| n.parse::<u8>().ok()) {
        if (1..=12).contains(&n) {
            return Some(KeySpec::plain(KeyCode::F(n)));
        }
    }

    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(KeySpec::char(c)),
        _ => None,
    }
}

/// Format a KeySpec as a human-readable string for the help screen.
fn format_key(key: &KeySpec) -> String {
    let modifier = if key.modifiers.contains(KeyModifiers::CONTROL) {
        "Ctrl+"
    } else {
        ""
    };

    let key_name = match key.code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::BackTab => "Shift+Tab".to_string(),
        KeyCode::Up => "Up".to_string(),
        KeyCode::Down => "Down".to_string(),
        KeyCode::Left => "Left".to_string(),
        KeyCode::Right => "Right".to_string(),
        KeyCode::Backspace => "Backspace".to_string(),
        KeyCode::F(n) => format!("F{}", n),
        _ => "?".to_string(),
    };

    format!("{}{}", modifier, key_name)
}

// ============================================================================
// Keybinding Registry
// ============================================================================

/// Registry of keybindings, supporting default bindings and config overrides.
///
/// The same key can map to different actions in different contexts.
pub struct KeybindingRegistry {
    /// Primary lookup: (Context, KeySpec) -> Action
    lookup: HashMap<(Context, KeySpec), Action>,
    /// All bindings for help screen enumeration
    bindings: Vec<(Context, KeySpec, Action)>,
}

impl KeybindingRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            lookup: HashMap::new(),
            bindings: Vec::new(),
        };
        registry.register_defaults();
        registry
    }

    fn bind(&mut self, context: Context, key: KeySpec, action: Action) {
        self.lookup.insert((context, key), action);
        self.bindings.push((context, key, action));
    }

    fn bind_all(&mut self, context: Context, table: &[(KeySpec, Action)]) {
        for &(key, action) in table {
            self.bind(context, key, action);
        }
    }

    fn register_defaults(&mut self) {
        // === Global (feed view) ===
        self.bind_all(
            Context::Global,
            &[
                (KeySpec::char('q'), Action::Quit),
                (KeySpec::char('j'), Action::NavDown),
                (KeySpec::plain(KeyCode::Down), Action::NavDown),
                (KeySpec::char('k'), Action::NavUp),
                (KeySpec::plain(KeyCode::Up), Action::NavUp),
                (KeySpec::plain(KeyCode::Tab), Action::CycleFocus),
                (KeySpec::plain(KeyCode::Esc), Action::Back),
                (KeySpec::char('t'), Action::SwitchTab),
                (KeySpec::char('/'), Action::EnterSearch),
                (KeySpec::char('n'), Action::NextPage),
                (KeySpec::plain(KeyCode::Right), Action::NextPage),
                (KeySpec::char('p'), Action::PrevPage),
                (KeySpec::plain(KeyCode::Left), Action::PrevPage),
                (KeySpec::char('g'), Action::FirstPage),
                (KeySpec::char('G'), Action::LastPage),
                (KeySpec::char('r'), Action::Refresh),
                (KeySpec::char('T'), Action::CycleTheme),
                (KeySpec::char('?'), Action::ShowHelp),
                (KeySpec::char('u'), Action::ShowProfile),
                (KeySpec::char('P'), Action::EditPreferences),
                (KeySpec::char('l'), Action::SignIn),
                (KeySpec::char('L'), Action::Logout),
            ],
        );

        // === Article list ===
        self.bind_all(
            Context::Articles,
            &[
                (KeySpec::plain(KeyCode::Enter), Action::OpenInBrowser),
                (KeySpec::char('o'), Action::OpenInBrowser),
            ],
        );

        // === Facet sidebar ===
        self.bind_all(
            Context::Sidebar,
            &[
                (KeySpec::char(' '), Action::ToggleFacet),
                (KeySpec::plain(KeyCode::Enter), Action::ToggleFacet),
            ],
        );

        // === Search box ===
        self.bind_all(
            Context::Search,
            &[
                (KeySpec::plain(KeyCode::Esc), Action::ExitSearch),
                (KeySpec::plain(KeyCode::Enter), Action::CommitSearch),
                (KeySpec::ctrl('u'), Action::ClearSearch),
                (KeySpec::ctrl('c'), Action::Quit),
            ],
        );

        // === Sign in / register form ===
        self.bind_all(
            Context::Form,
            &[
                (KeySpec::plain(KeyCode::Tab), Action::NextField),
                (KeySpec::plain(KeyCode::Down), Action::NextField),
                (
                    KeySpec::new(KeyCode::BackTab, KeyModifiers::SHIFT),
                    Action::PrevField,
                ),
                (KeySpec::plain(KeyCode::Up), Action::PrevField),
                (KeySpec::plain(KeyCode::Enter), Action::Submit),
                (KeySpec::ctrl('r'), Action::SwitchAuthMode),
                (KeySpec::plain(KeyCode::Esc), Action::Back),
                (KeySpec::ctrl('c'), Action::Quit),
            ],
        );

        // === Preferences picker ===
        self.bind_all(
            Context::Preferences,
            &[
                (KeySpec::char(' '), Action::ToggleFacet),
                (KeySpec::plain(KeyCode::Enter), Action::Submit),
            ],
        );

        // === Help / profile overlays ===
        self.bind_all(
            Context::Overlay,
            &[
                (KeySpec::plain(KeyCode::Esc), Action::Back),
                (KeySpec::char('q'), Action::Back),
            ],
        );
    }

    /// Apply user overrides from config keybindings map.
    ///
    /// Keys in the map are action names (e.g., "quit", "next_page").
    /// Values are key strings (e.g., "q", "Ctrl+d", "F5").
    ///
    /// Returns a list of warnings for unrecognized action names or unparseable keys.
    pub fn apply_overrides(&mut self, overrides: &HashMap<String, String>) -> Vec<String> {
        let mut warnings = Vec::new();

        for (action_name, key_str) in overrides {
            let Some(action) = parse_action_name(action_name) else {
                warnings.push(format!("Unknown action '{}', ignoring", action_name));
                continue;
            };

            let Some(key) = parse_key_string(key_str) else {
                warnings.push(format!(
                    "Cannot parse key '{}' for action '{}', ignoring",
                    key_str, action_name
                ));
                continue;
            };

            // Rebind in every context the action was bound in
            let mut contexts: Vec<Context> = Vec::new();
            for (ctx, _, a) in &self.bindings {
                if *a == action && !contexts.contains(ctx) {
                    contexts.push(*ctx);
                }
            }

            self.lookup.retain(|_, a| *a != action);
            self.bindings.retain(|(_, _, a)| *a != action);

            for ctx in contexts {
                self.bind(ctx, key, action);
            }

            tracing::info!(
                action = %action_name,
                key = %key_str,
                "Applied keybinding override"
            );
        }

        warnings
    }

    /// Look up the action for a given key in a given context.
    ///
    /// Tries the specific context first, then Global for command contexts.
    pub fn action_for_key(
        &self,
        code: KeyCode,
        modifiers: KeyModifiers,
        context: Context,
    ) -> Option<Action> {
        let key = KeySpec::new(code, modifiers);

        if let Some(&action) = self.lookup.get(&(context, key)) {
            return Some(action);
        }

        if context != Context::Global && context.falls_back_to_global() {
            return self.lookup.get(&(Context::Global, key)).copied();
        }

        None
    }

    /// Returns (context, key display string, action, description) tuples.
    pub fn all_bindings(&self) -> Vec<(Context, String, Action, &'static str)> {
        self.bindings
            .iter()
            .map(|(ctx, key, action)| (*ctx, format_key(key), *action, action.describe()))
            .collect()
    }
}

impl Default for KeybindingRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse an action name string (from config) into an Action enum.
fn parse_action_name(name: &str) -> Option<Action> {
    match name.to_lowercase().as_str() {
        "quit" => Some(Action::Quit),
        "nav_down" | "navdown" | "down" => Some(Action::NavDown),
        "nav_up" | "navup" | "up" => Some(Action::NavUp),
        "cycle_focus" | "cyclefocus" | "focus" => Some(Action::CycleFocus),
        "back" => Some(Action::Back),
        "open_in_browser" | "openinbrowser" | "open" => Some(Action::OpenInBrowser),
        "toggle_facet" | "togglefacet" | "toggle" => Some(Action::ToggleFacet),
        "switch_tab" | "switchtab" | "tab" => Some(Action::SwitchTab),
        "enter_search" | "entersearch" | "search" => Some(Action::EnterSearch),
        "exit_search" | "exitsearch" => Some(Action::ExitSearch),
        "commit_search" | "commitsearch" => Some(Action::CommitSearch),
        "clear_search" | "clearsearch" => Some(Action::ClearSearch),
        "next_page" | "nextpage" => Some(Action::NextPage),
        "prev_page" | "prevpage" | "previous_page" => Some(Action::PrevPage),
        "first_page" | "firstpage" => Some(Action::FirstPage),
        "last_page" | "lastpage" => Some(Action::LastPage),
        "refresh" | "reload" => Some(Action::Refresh),
        "cycle_theme" | "cycletheme" | "theme" => Some(Action::CycleTheme),
        "show_help" | "showhelp" | "help" => Some(Action::ShowHelp),
        "show_profile" | "showprofile" | "profile" => Some(Action::ShowProfile),
        "edit_preferences" | "editpreferences" | "preferences" => Some(Action::EditPreferences),
        "sign_in" | "signin" | "login" => Some(Action::SignIn),
        "logout" | "log_out" => Some(Action::Logout),
        "next_field" | "nextfield" => Some(Action::NextField),
        "prev_field" | "prevfield" => Some(Action::PrevField),
        "submit" => Some(Action::Submit),
        "switch_auth_mode" | "switchauthmode" => Some(Action::SwitchAuthMode),
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_has_quit() {
        let reg = KeybindingRegistry::new();
        let action = reg.action_for_key(KeyCode::Char('q'), KeyModifiers::NONE, Context::Global);
        assert_eq!(action, Some(Action::Quit));
    }

    #[test]
    fn test_articles_fall_back_to_global() {
        let reg = KeybindingRegistry::new();
        assert_eq!(
            reg.action_for_key(KeyCode::Char('n'), KeyModifiers::NONE, Context::Articles),
            Some(Action::NextPage)
        );
        assert_eq!(
            reg.action_for_key(KeyCode::Enter, KeyModifiers::NONE, Context::Articles),
            Some(Action::OpenInBrowser)
        );
    }

    #[test]
    fn test_sidebar_enter_toggles_facet() {
        let reg = KeybindingRegistry::new();
        assert_eq!(
            reg.action_for_key(KeyCode::Enter, KeyModifiers::NONE, Context::Sidebar),
            Some(Action::ToggleFacet)
        );
        assert_eq!(
            reg.action_for_key(KeyCode::Char(' '), KeyModifiers::NONE, Context::Sidebar),
            Some(Action::ToggleFacet)
        );
    }

    #[test]
    fn test_text_contexts_do_not_capture_letters() {
        let reg = KeybindingRegistry::new();
        for ctx in [Context::Search, Context::Form] {
            assert_eq!(
                reg.action_for_key(KeyCode::Char('q'), KeyModifiers::NONE, ctx),
                None
            );
            assert_eq!(
                reg.action_for_key(KeyCode::Char('n'), KeyModifiers::NONE, ctx),
                None
            );
        }
    }

    #[test]
    fn test_search_context() {
        let reg = KeybindingRegistry::new();
        assert_eq!(
            reg.action_for_key(KeyCode::Esc, KeyModifiers::NONE, Context::Search),
            Some(Action::ExitSearch)
        );
        assert_eq!(
            reg.action_for_key(KeyCode::Enter, KeyModifiers::NONE, Context::Search),
            Some(Action::CommitSearch)
        );
        assert_eq!(
            reg.action_for_key(KeyCode::Char('u'), KeyModifiers::CONTROL, Context::Search),
            Some(Action::ClearSearch)
        );
    }

    #[test]
    fn test_form_navigation() {
        let reg = KeybindingRegistry::new();
        assert_eq!(
            reg.action_for_key(KeyCode::BackTab, KeyModifiers::SHIFT, Context::Form),
            Some(Action::PrevField)
        );
        assert_eq!(
            reg.action_for_key(KeyCode::Char('r'), KeyModifiers::CONTROL, Context::Form),
            Some(Action::SwitchAuthMode)
        );
    }

    #[test]
    fn test_unknown_key_returns_none() {
        let reg = KeybindingRegistry::new();
        assert_eq!(
            reg.action_for_key(KeyCode::F(12), KeyModifiers::NONE, Context::Global),
            None
        );
    }

    #[test]
    fn test_apply_overrides_valid() {
        let mut reg = KeybindingRegistry::new();
        let mut overrides = HashMap::new();
        overrides.insert("quit".to_string(), "Ctrl+q".to_string());

        let warnings = reg.apply_overrides(&overrides);
        assert!(warnings.is_empty());

        assert_eq!(
            reg.action_for_key(KeyCode::Char('q'), KeyModifiers::NONE, Context::Global),
            None
        );
        assert_eq!(
            reg.action_for_key(KeyCode::Char('q'), KeyModifiers::CONTROL, Context::Global),
            Some(Action::Quit)
        );
        // Also rebound where Quit lived in text contexts
        assert_eq!(
            reg.action_for_key(KeyCode::Char('q'), KeyModifiers::CONTROL, Context::Form),
            Some(Action::Quit)
        );
    }

    #[test]
    fn test_apply_overrides_unknown_action() {
        let mut reg = KeybindingRegistry::new();
        let mut overrides = HashMap::new();
        overrides.insert("nonexistent_action".to_string(), "q".to_string());

        let warnings = reg.apply_overrides(&overrides);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("Unknown action"));
    }

    #[test]
    fn test_apply_overrides_bad_key() {
        let mut reg = KeybindingRegistry::new();
        let mut overrides = HashMap::new();
        overrides.insert("quit".to_string(), "Ctrl+Alt+Shift+Q".to_string());

        let warnings = reg.apply_overrides(&overrides);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("Cannot parse key"));
    }

    #[test]
    fn test_override_preserves_contexts() {
        let mut reg = KeybindingRegistry::new();
        let mut overrides = HashMap::new();
        overrides.insert("open".to_string(), "x".to_string());
        assert!(reg.apply_overrides(&overrides).is_empty());

        assert_eq!(
            reg.action_for_key(KeyCode::Char('x'), KeyModifiers::NONE, Context::Articles),
            Some(Action::OpenInBrowser)
        );
        assert_eq!(
            reg.action_for_key(KeyCode::Char('o'), KeyModifiers::NONE, Context::Articles),
            None
        );
    }

    #[test]
    fn test_parse_key_string() {
        assert_eq!(parse_key_string("Enter"), Some(KeySpec::plain(KeyCode::Enter)));
        assert_eq!(parse_key_string("esc"), Some(KeySpec::plain(KeyCode::Esc)));
        assert_eq!(
            parse_key_string("BackTab"),
            Some(KeySpec::new(KeyCode::BackTab, KeyModifiers::SHIFT))
        );
        assert_eq!(parse_key_string("space"), Some(KeySpec::char(' ')));
        assert_eq!(parse_key_string("F5"), Some(KeySpec::plain(KeyCode::F(5))));
        assert_eq!(parse_key_string("F13"), None);
        assert_eq!(parse_key_string("Ctrl+d"), Some(KeySpec::ctrl('d')));
        assert_eq!(parse_key_string("/"), Some(KeySpec::char('/')));
        assert_eq!(parse_key_string("ab"), None);
        // A bare "F" is a letter, not a function key
        assert_eq!(parse_key_string("F"), Some(KeySpec::char('F')));
    }

    #[test]
    fn test_format_key_display() {
        assert_eq!(format_key(&KeySpec::char('q')), "q");
        assert_eq!(format_key(&KeySpec::char(' ')), "Space");
        assert_eq!(format_key(&KeySpec::ctrl('r')), "Ctrl+r");
        assert_eq!(format_key(&KeySpec::plain(KeyCode::F(5))), "F5");
    }

    #[test]
    fn test_bindings_have_descriptions() {
        let reg = KeybindingRegistry::new();
        for (_, _, action, desc) in reg.all_bindings() {
            assert!(!desc.is_empty(), "{action:?} has no description");
        }
        assert_eq!(parse_action_name("next_page"), Some(Action::NextPage));
        assert_eq!(parse_action_name("Logout"), Some(Action::Logout));
    }
}

//! Application event handling.
//!
//! Applies the results of background tasks to the application state.
//! Results started under an older session epoch are dropped here.

use crate::api::{ApiError, AuthData, Author, Category, User};
use crate::app::{App, AppEvent, View};
use crate::feed::{ArticlePage, QueryKey, SlotUpdate};
use crate::forms::AuthMode;
use std::sync::Arc;
use tokio::sync::mpsc;

use super::helpers::{spawn_facet_load, spawn_fetches};

/// Handle application events from background tasks.
pub(super) fn handle_app_event(app: &mut App, event: AppEvent, event_tx: &mpsc::Sender<AppEvent>) {
    match event {
        AppEvent::PageLoaded {
            key,
            generation,
            epoch,
            result,
        } => {
            if !app.session.is_current(epoch) {
                tracing::debug!(generation, epoch, "Dropping page from an ended session");
                return;
            }
            handle_page_loaded(app, key, generation, result);
        }
        AppEvent::FacetsLoaded {
            authors,
            categories,
        } => handle_facets_loaded(app, authors, categories),
        AppEvent::AuthCompleted {
            mode,
            epoch,
            result,
        } => {
            if !app.session.is_current(epoch) {
                tracing::debug!(epoch, "Dropping stale sign-in result");
                return;
            }
            handle_auth_completed(app, mode, result, event_tx);
        }
        AppEvent::UserLoaded { epoch, result } => {
            if !app.session.is_current(epoch) {
                return;
            }
            handle_user_loaded(app, result, event_tx);
        }
        AppEvent::PreferencesSaved { epoch, result } => {
            if !app.session.is_current(epoch) {
                return;
            }
            handle_preferences_saved(app, result, event_tx);
        }
        AppEvent::LoggedOut { result } => {
            // Already signed out locally; a failure only means the server
            // token lives on until it expires.
            if let Err(e) = result {
                tracing::warn!(error = %e, "Server-side logout failed");
            }
        }
        AppEvent::TaskPanicked { task, error } => {
            tracing::error!(task, error, "Background task panicked");
            app.auth_pending = false;
            app.preferences_pending = false;
            app.set_error(format!("Internal error in {} task", task));
        }
    }
}

/// A 401 on any call means the token is no good any more.
fn expire_session(app: &mut App) {
    tracing::info!("Credentials rejected, ending session");
    app.end_session();
    app.set_error("Session expired, please sign in again");
}

fn handle_page_loaded(
    app: &mut App,
    key: QueryKey,
    generation: u64,
    result: Result<ArticlePage, ApiError>,
) {
    if let Err(e) = &result {
        if e.is_unauthorized() && app.session.is_authenticated() {
            expire_session(app);
            return;
        }
    }

    let tab = key.tab();
    let retryable = result.as_ref().err().is_some_and(ApiError::is_retryable);
    let update = app
        .feed
        .complete(&key, generation, result.map_err(|e| e.to_string()));

    match update {
        SlotUpdate::Applied | SlotUpdate::Cached => {
            if tab == app.active_tab() {
                app.clamp_selections();
            }
        }
        SlotUpdate::Failed => {
            let message = app.feed.last_error(tab).unwrap_or("request failed").to_string();
            let hint = if retryable { " (r to retry)" } else { "" };
            app.set_error(format!("Could not load {}: {}{}", tab.label(), message, hint));
        }
        SlotUpdate::FailedInBackground | SlotUpdate::Stale => {}
    }
}

fn handle_facets_loaded(
    app: &mut App,
    authors: Result<Vec<Author>, ApiError>,
    categories: Result<Vec<Category>, ApiError>,
) {
    match (authors, categories) {
        (Ok(authors), Ok(categories)) => {
            tracing::debug!(
                authors = authors.len(),
                categories = categories.len(),
                "Loaded filters"
            );
            app.authors = Arc::new(authors);
            app.categories = Arc::new(categories);
            app.facets_loaded = true;
            app.clamp_selections();
        }
        (Err(e), _) | (_, Err(e)) => {
            tracing::warn!(error = %e, "Failed to load filters");
            app.set_error(format!("Could not load filters: {}", e));
        }
    }
}

fn handle_auth_completed(
    app: &mut App,
    mode: AuthMode,
    result: Result<AuthData, ApiError>,
    event_tx: &mpsc::Sender<AppEvent>,
) {
    app.auth_pending = false;

    let auth = match result {
        Ok(auth) => auth,
        Err(e) => {
            tracing::info!(?mode, error = %e, "Sign-in failed");
            app.auth_form.clear_secrets();
            let message = match e {
                ApiError::Unauthorized => "Invalid email or password".to_string(),
                other => other.to_string(),
            };
            app.form_error = Some(message.into());
            return;
        }
    };

    let has_preferences = auth.user.has_preferences();
    tracing::info!(?mode, user_id = auth.user.id, has_preferences, "Signed in");
    app.session.sign_in(auth);

    // Results fetched anonymously may differ from what this user sees
    app.feed.reset();

    if !app.facets_loaded {
        spawn_facet_load(app, event_tx);
    }

    if mode == AuthMode::Register || !has_preferences {
        app.open_preferences();
        app.set_status("Pick at least 3 sources and 3 categories for My Feeds");
    } else {
        let requests = app.enter_feed();
        spawn_fetches(app, requests, event_tx);
        app.set_status("Signed in");
    }
}

fn handle_user_loaded(
    app: &mut App,
    result: Result<User, ApiError>,
    event_tx: &mpsc::Sender<AppEvent>,
) {
    match result {
        Ok(user) => {
            tracing::debug!(user_id = user.id, "Loaded current user");
            app.session.set_user(user);
            if app.view == View::Feed {
                let requests = app.enter_feed();
                spawn_fetches(app, requests, event_tx);
            }
        }
        Err(e) if e.is_unauthorized() => expire_session(app),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load current user");
            app.set_error(format!("Could not load profile: {}", e));
        }
    }
}

fn handle_preferences_saved(
    app: &mut App,
    result: Result<User, ApiError>,
    event_tx: &mpsc::Sender<AppEvent>,
) {
    app.preferences_pending = false;

    match result {
        Ok(user) => {
            tracing::info!(user_id = user.id, "Preferences saved");
            app.session.set_user(user);
            let mut requests = app.enter_feed();
            // My Feeds content depends on the preferences just saved
            if requests.is_empty() {
                requests = app.feed.refresh();
            }
            spawn_fetches(app, requests, event_tx);
            app.set_status("Preferences saved");
        }
        Err(e) if e.is_unauthorized() => expire_session(app),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to save preferences");
            app.form_error = Some(e.to_string().into());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::feed::{PageEnvelope, Tab};
    use crate::session::Session;
    use secrecy::SecretString;

    fn signed_in_app() -> App {
        App::new(&Config::default(), Session::with_token(SecretString::from("tok"))).unwrap()
    }

    fn page(ids: &[i64]) -> ArticlePage {
        PageEnvelope {
            items: ids
                .iter()
                .map(|&id| {
                    serde_json::from_value(serde_json::json!({"id": id, "title": "t"})).unwrap()
                })
                .collect(),
            total_count: ids.len() as u64,
            current_page: 1,
            per_page: 10,
            last_page: 1,
        }
    }

    #[tokio::test]
    async fn test_page_from_old_epoch_is_dropped() {
        let (tx, _rx) = mpsc::channel(8);
        let mut app = signed_in_app();
        let requests = app.enter_feed();
        let explore = requests[0].clone();
        let old_epoch = app.session.epoch();

        app.session.invalidate();
        app.feed.refresh();
        handle_app_event(
            &mut app,
            AppEvent::PageLoaded {
                key: explore.key,
                generation: explore.generation,
                epoch: old_epoch,
                result: Ok(page(&[1])),
            },
            &tx,
        );

        assert!(app.feed.active_page().is_none());
    }

    #[tokio::test]
    async fn test_page_applies_for_current_epoch() {
        let (tx, _rx) = mpsc::channel(8);
        let mut app = signed_in_app();
        let requests = app.enter_feed();
        let explore = requests[0].clone();

        let epoch = app.session.epoch();
        handle_app_event(
            &mut app,
            AppEvent::PageLoaded {
                key: explore.key,
                generation: explore.generation,
                epoch,
                result: Ok(page(&[1, 2])),
            },
            &tx,
        );

        assert_eq!(app.articles().len(), 2);
        assert_eq!(app.active_tab(), Tab::Explore);
    }

    #[tokio::test]
    async fn test_unauthorized_page_ends_session() {
        let (tx, _rx) = mpsc::channel(8);
        let mut app = signed_in_app();
        let requests = app.enter_feed();
        let explore = requests[0].clone();

        let epoch = app.session.epoch();
        handle_app_event(
            &mut app,
            AppEvent::PageLoaded {
                key: explore.key,
                generation: explore.generation,
                epoch,
                result: Err(ApiError::Unauthorized),
            },
            &tx,
        );

        assert_eq!(app.view, View::Login);
        assert!(!app.session.is_authenticated());
    }

    #[tokio::test]
    async fn test_failed_first_fetch_notifies() {
        let (tx, _rx) = mpsc::channel(8);
        let mut app = signed_in_app();
        let requests = app.enter_feed();
        let explore = requests[0].clone();

        let epoch = app.session.epoch();
        handle_app_event(
            &mut app,
            AppEvent::PageLoaded {
                key: explore.key,
                generation: explore.generation,
                epoch,
                result: Err(ApiError::Timeout(30)),
            },
            &tx,
        );

        assert!(app.articles().is_empty());
        assert!(!app.feed.is_loading(Tab::Explore));
        let (message, _, _) = app.status_message.as_ref().unwrap();
        assert!(message.contains("Could not load Explore"));
    }

    #[tokio::test]
    async fn test_panicked_fetch_clears_loading_and_refetches() {
        let (tx, _rx) = mpsc::channel(8);
        let mut app = App::new(&Config::default(), Session::default()).unwrap();
        let explore = app.enter_feed().remove(0);
        assert!(app.feed.is_loading(Tab::Explore));

        let result = super::super::helpers::guarded_page_fetch(async {
            if true {
                panic!("boom");
            }
            Ok(page(&[1]))
        })
        .await;
        let epoch = app.session.epoch();
        handle_app_event(
            &mut app,
            AppEvent::PageLoaded {
                key: explore.key,
                generation: explore.generation,
                epoch,
                result,
            },
            &tx,
        );

        assert!(!app.feed.is_loading(Tab::Explore));
        let (message, _, _) = app.status_message.as_ref().unwrap();
        assert!(message.contains("Internal error: boom"));
        assert_eq!(app.feed.refresh().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_login_keeps_form_and_clears_password() {
        let (tx, _rx) = mpsc::channel(8);
        let mut app = App::new(&Config::default(), Session::default()).unwrap();
        for c in "a@b.c".chars() {
            app.auth_form.insert_char(c);
        }
        app.auth_form.focus_next();
        app.auth_form.insert_char('x');
        app.auth_pending = true;
        let epoch = app.session.epoch();

        handle_app_event(
            &mut app,
            AppEvent::AuthCompleted {
                mode: AuthMode::Login,
                epoch,
                result: Err(ApiError::Unauthorized),
            },
            &tx,
        );

        assert!(!app.auth_pending);
        assert_eq!(app.view, View::Login);
        assert_eq!(app.form_error.as_deref(), Some("Invalid email or password"));
        assert_eq!(app.auth_form.value(crate::forms::AuthField::Password), "");
        assert_eq!(app.auth_form.value(crate::forms::AuthField::Email), "a@b.c");
    }

    #[tokio::test]
    async fn test_task_panic_clears_pending_flags() {
        let (tx, _rx) = mpsc::channel(8);
        let mut app = signed_in_app();
        app.preferences_pending = true;

        handle_app_event(
            &mut app,
            AppEvent::TaskPanicked {
                task: "preferences_save",
                error: "boom".into(),
            },
            &tx,
        );

        assert!(!app.preferences_pending);
        assert!(app.status_message.is_some());
    }
}

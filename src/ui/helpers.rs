//! Helper functions for UI operations.
//!
//! Background work is spawned from here. Every task reports back through an
//! `AppEvent`; a task that panics reports `AppEvent::TaskPanicked` instead.

use crate::api::{ApiError, PreferenceIds};
use crate::app::{App, AppEvent};
use crate::feed::{ArticlePage, FetchRequest};
use crate::forms::{AuthMode, Credentials};
use crate::util::validate_article_url;
use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use tokio::sync::mpsc;

/// Error message for articles without URLs
pub(super) const ERR_ARTICLE_NO_URL: &str = "Article has no link";

/// Wraps a future to catch panics and convert them to errors.
///
/// - `Ok(result)` if the future completes normally
/// - `Err(panic_message)` if the future panics
pub(super) async fn catch_task_panic<F, T>(future: F) -> Result<T, String>
where
    F: Future<Output = T>,
{
    AssertUnwindSafe(future)
        .catch_unwind()
        .await
        .map_err(|panic| {
            if let Some(s) = panic.downcast_ref::<&'static str>() {
                s.to_string()
            } else if let Some(s) = panic.downcast_ref::<String>() {
                s.clone()
            } else {
                format!("Unknown panic: {:?}", (*panic).type_id())
            }
        })
}

/// Run `work` in the background and deliver the event it produces.
fn spawn_task<F>(task: &'static str, event_tx: &mpsc::Sender<AppEvent>, work: F)
where
    F: Future<Output = AppEvent> + Send + 'static,
{
    let tx = event_tx.clone();
    tokio::spawn(async move {
        let event = match catch_task_panic(work).await {
            Ok(event) => event,
            Err(error) => {
                tracing::error!(task, error = %error, "Task panicked");
                AppEvent::TaskPanicked { task, error }
            }
        };
        if let Err(e) = tx.send(event).await {
            tracing::warn!(task, error = %e, "Failed to send task result (receiver dropped)");
        }
    });
}

/// Run a page read, turning a panic into an error for that page.
///
/// A fetch must always report back with its key and generation, otherwise
/// its slot would stay loading.
pub(super) async fn guarded_page_fetch<F>(fetch: F) -> Result<ArticlePage, ApiError>
where
    F: Future<Output = Result<ArticlePage, ApiError>>,
{
    match catch_task_panic(fetch).await {
        Ok(result) => result,
        Err(error) => {
            tracing::error!(error = %error, "Page fetch panicked");
            Err(ApiError::Internal(error))
        }
    }
}

/// Issue the page reads the feed controller asked for.
///
/// Requests are sent with the current token, and tagged with the current
/// session epoch so a logout in the meantime discards the results.
pub(super) fn spawn_fetches(
    app: &App,
    requests: Vec<FetchRequest>,
    event_tx: &mpsc::Sender<AppEvent>,
) {
    let epoch = app.session.epoch();
    for FetchRequest { key, generation } in requests {
        let api = app.api.clone();
        let token = app.session.credentials();
        tracing::debug!(tab = ?key.tab(), page = key.page(), generation, "Spawning page fetch");

        spawn_task("page_fetch", event_tx, async move {
            let result = guarded_page_fetch(api.fetch_page(&key, token.as_deref())).await;
            AppEvent::PageLoaded {
                key,
                generation,
                epoch,
                result,
            }
        });
    }
}

/// Load the author and category lists.
pub(super) fn spawn_facet_load(app: &App, event_tx: &mpsc::Sender<AppEvent>) {
    let api = app.api.clone();
    let token = app.session.credentials();

    spawn_task("facet_load", event_tx, async move {
        let (authors, categories) =
            tokio::join!(api.authors(token.as_deref()), api.categories(token.as_deref()));
        AppEvent::FacetsLoaded {
            authors,
            categories,
        }
    });
}

/// Send validated login or registration credentials.
pub(super) fn spawn_auth(app: &mut App, credentials: Credentials, event_tx: &mpsc::Sender<AppEvent>) {
    let api = app.api.clone();
    let epoch = app.session.epoch();
    app.auth_pending = true;

    match credentials {
        Credentials::Login { email, password } => {
            spawn_task("login", event_tx, async move {
                let result = api.login(&email, &password).await;
                AppEvent::AuthCompleted {
                    mode: AuthMode::Login,
                    epoch,
                    result,
                }
            });
        }
        Credentials::Register {
            name,
            email,
            password,
            confirmation,
        } => {
            spawn_task("register", event_tx, async move {
                let result = api.register(&name, &email, &password, &confirmation).await;
                AppEvent::AuthCompleted {
                    mode: AuthMode::Register,
                    epoch,
                    result,
                }
            });
        }
    }
}

/// Fetch the user behind the current token.
pub(super) fn spawn_user_load(app: &App, event_tx: &mpsc::Sender<AppEvent>) {
    let Some(token) = app.session.credentials() else {
        return;
    };
    let api = app.api.clone();
    let epoch = app.session.epoch();

    spawn_task("user_load", event_tx, async move {
        let result = api.current_user(&token).await;
        AppEvent::UserLoaded { epoch, result }
    });
}

pub(super) fn spawn_preferences_save(
    app: &mut App,
    ids: PreferenceIds,
    event_tx: &mpsc::Sender<AppEvent>,
) {
    let Some(token) = app.session.credentials() else {
        app.set_error("Sign in to save preferences");
        return;
    };
    let api = app.api.clone();
    let epoch = app.session.epoch();
    app.preferences_pending = true;

    spawn_task("preferences_save", event_tx, async move {
        let result = api.update_preferences(&token, &ids).await;
        AppEvent::PreferencesSaved { epoch, result }
    });
}

/// End the session locally right away, then tell the server.
pub(super) fn logout(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    let Some(token) = app.session.credentials() else {
        app.set_status("Not signed in");
        return;
    };
    let api = app.api.clone();
    app.end_session();
    app.set_status("Signed out");

    spawn_task("logout", event_tx, async move {
        let result = api.logout(&token).await;
        AppEvent::LoggedOut { result }
    });
}

/// Open the selected article's link in the system browser.
pub(super) fn open_selected_article(app: &mut App) {
    let Some(article) = app.selected_article() else {
        return;
    };
    let Some(url) = article.url.clone() else {
        app.set_status(ERR_ARTICLE_NO_URL);
        return;
    };

    // Validate before open::that() to keep odd schemes away from the OS opener
    match validate_article_url(&url) {
        Ok(url) => {
            if let Err(e) = open::that(url.as_str()) {
                app.set_error(format!("Failed to open browser: {}", e));
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "Refusing to open article link");
            app.set_error(e.to_string());
        }
    }
}

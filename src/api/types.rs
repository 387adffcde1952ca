use chrono::{DateTime, NaiveDateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::feed::PageEnvelope;

fn default_true() -> bool {
    true
}

/// Common response wrapper: `{success, message, data}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(default = "default_true")]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    pub data: T,
}

/// Response wrapper for endpoints whose `data` is absent or ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct Ack {
    #[serde(default = "default_true")]
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

// ============================================================================
// Articles
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ArticleCategory {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ArticleAuthor {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    /// Rendered as "Source N" in the list.
    #[serde(default)]
    pub source_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Article {
    pub id: i64,
    pub title: String,
    /// May contain HTML markup.
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub category: Option<ArticleCategory>,
    #[serde(default)]
    pub author: Option<ArticleAuthor>,
}

impl Article {
    /// Parse `published_at`. Accepts RFC 3339 and the `YYYY-MM-DD HH:MM:SS`
    /// form, the latter taken as UTC.
    pub fn published(&self) -> Option<DateTime<Utc>> {
        let raw = self.published_at.as_deref()?.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
            .ok()
            .map(|naive| naive.and_utc())
    }
}

/// `data` of both article list endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct ArticlesData {
    #[serde(default)]
    pub articles: Vec<Article>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub per_page: u32,
    #[serde(default)]
    pub last_page: u32,
}

impl From<ArticlesData> for PageEnvelope<Article> {
    fn from(data: ArticlesData) -> Self {
        PageEnvelope {
            items: data.articles,
            total_count: data.total,
            current_page: data.page,
            per_page: data.per_page,
            last_page: data.last_page,
        }
    }
}

// ============================================================================
// Facets
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Author {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub slug: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthorsData {
    pub authors: Vec<Author>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoriesData {
    pub categories: Vec<Category>,
}

// ============================================================================
// Users and auth
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserPreferences {
    #[serde(default)]
    pub authors: Vec<Author>,
    #[serde(default)]
    pub categories: Vec<Category>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub is_admin: i64,
    #[serde(default)]
    pub email_verified_at: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub preferences: UserPreferences,
}

impl User {
    /// Whether the user has any saved authors or categories.
    pub fn has_preferences(&self) -> bool {
        !self.preferences.authors.is_empty() || !self.preferences.categories.is_empty()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserData {
    pub user: User,
}

#[derive(Deserialize)]
struct RawAuthData {
    user: User,
    token: String,
    #[serde(default)]
    token_type: String,
}

/// `data` of login and registration responses.
#[derive(Deserialize)]
#[serde(from = "RawAuthData")]
pub struct AuthData {
    pub user: User,
    pub token: SecretString,
    pub token_type: String,
}

impl From<RawAuthData> for AuthData {
    fn from(raw: RawAuthData) -> Self {
        Self {
            user: raw.user,
            token: SecretString::from(raw.token),
            token_type: raw.token_type,
        }
    }
}

impl fmt::Debug for AuthData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthData")
            .field("user", &self.user)
            .field("token", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .finish()
    }
}

// ============================================================================
// Request bodies
// ============================================================================

#[derive(Serialize)]
pub(crate) struct LoginBody<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Serialize)]
pub(crate) struct RegisterBody<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub password_confirmation: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreferenceIds {
    pub author_ids: Vec<i64>,
    pub category_ids: Vec<i64>,
}

#[derive(Serialize)]
pub(crate) struct PreferencesBody<'a> {
    pub preferences: &'a PreferenceIds,
}

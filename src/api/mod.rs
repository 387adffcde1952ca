//! Typed client for the news aggregator REST API.
//!
//! Every response uses the `{success, message, data}` envelope. Article list
//! endpoints return `data: {articles, total, page, per_page, last_page}`,
//! which is mapped onto [`crate::feed::PageEnvelope`].

mod client;
mod error;
mod types;

pub use client::ApiClient;
pub use error::ApiError;
pub use types::{
    ApiResponse, Article, ArticleAuthor, ArticleCategory, ArticlesData, AuthData, Author,
    Category, PreferenceIds, User, UserPreferences,
};

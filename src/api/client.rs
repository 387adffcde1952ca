use futures::StreamExt;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use url::Url;

use super::error::ApiError;
use super::types::{
    Ack, ApiResponse, ArticlesData, AuthData, Author, AuthorsData, CategoriesData, Category,
    LoginBody, PreferenceIds, PreferencesBody, RegisterBody, User, UserData,
};
use crate::feed::{ArticlePage, ExploreQuery, PersonalizedQuery, QueryKey};

const MAX_RESPONSE_SIZE: usize = 5 * 1024 * 1024; // 5MB

/// HTTP client for the news aggregator API.
///
/// Cheap to clone; every background task gets its own handle. The bearer
/// token is passed per call so the client never outlives a session's
/// credentials.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    /// Always ends in `/` so relative endpoint paths append to it.
    base: Url,
    timeout: Duration,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .pool_max_idle_per_host(4)
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(60))
            .build()?;
        Self::with_client(http, base_url, timeout)
    }

    pub fn with_client(
        http: reqwest::Client,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let mut base = Url::parse(base_url)?;
        check_base_scheme(&base)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            http,
            base,
            timeout,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.base.join(path)?)
    }

    // ========================================================================
    // Articles
    // ========================================================================

    pub async fn articles(
        &self,
        query: &ExploreQuery,
        auth: Option<&SecretString>,
    ) -> Result<ArticlePage, ApiError> {
        let mut url = self.endpoint("articles")?;
        query.append_to(&mut url);
        tracing::debug!(page = query.page, search = %query.search, "Fetching explore articles");
        let data: ArticlesData = self.get(url, auth).await?;
        Ok(data.into())
    }

    pub async fn my_feeds(
        &self,
        query: &PersonalizedQuery,
        auth: Option<&SecretString>,
    ) -> Result<ArticlePage, ApiError> {
        let mut url = self.endpoint("articles/my-feeds")?;
        query.append_to(&mut url);
        tracing::debug!(page = query.page, "Fetching personalized articles");
        let data: ArticlesData = self.get(url, auth).await?;
        Ok(data.into())
    }

    /// Fetch the page a feed slot asked for.
    pub async fn fetch_page(
        &self,
        key: &QueryKey,
        auth: Option<&SecretString>,
    ) -> Result<ArticlePage, ApiError> {
        match key {
            QueryKey::Explore(q) => self.articles(q, auth).await,
            QueryKey::Personalized(q) => self.my_feeds(q, auth).await,
        }
    }

    pub async fn authors(&self, auth: Option<&SecretString>) -> Result<Vec<Author>, ApiError> {
        let data: AuthorsData = self.get(self.endpoint("authors")?, auth).await?;
        Ok(data.authors)
    }

    pub async fn categories(&self, auth: Option<&SecretString>) -> Result<Vec<Category>, ApiError> {
        let data: CategoriesData = self.get(self.endpoint("categories")?, auth).await?;
        Ok(data.categories)
    }

    // ========================================================================
    // Auth
    // ========================================================================

    pub async fn login(&self, email: &str, password: &SecretString) -> Result<AuthData, ApiError> {
        let body = LoginBody {
            email,
            password: password.expose_secret(),
        };
        tracing::debug!("Signing in");
        self.send_json(reqwest::Method::POST, "auth/login", &body, None)
            .await
    }

    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &SecretString,
        password_confirmation: &SecretString,
    ) -> Result<AuthData, ApiError> {
        let body = RegisterBody {
            name,
            email,
            password: password.expose_secret(),
            password_confirmation: password_confirmation.expose_secret(),
        };
        tracing::debug!("Registering account");
        self.send_json(reqwest::Method::POST, "auth/register", &body, None)
            .await
    }

    pub async fn logout(&self, auth: &SecretString) -> Result<(), ApiError> {
        let request = self.http.post(self.endpoint("auth/logout")?);
        let bytes = self.execute(request, Some(auth)).await?;
        // Some servers answer logout with an empty body
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(());
        }
        let ack: Ack = serde_json::from_slice(&bytes)?;
        if !ack.success {
            return Err(ApiError::Rejected(ack.message));
        }
        Ok(())
    }

    pub async fn current_user(&self, auth: &SecretString) -> Result<User, ApiError> {
        let data: UserData = self.get(self.endpoint("auth/me")?, Some(auth)).await?;
        Ok(data.user)
    }

    pub async fn update_preferences(
        &self,
        auth: &SecretString,
        ids: &PreferenceIds,
    ) -> Result<User, ApiError> {
        let body = PreferencesBody { preferences: ids };
        tracing::debug!(
            authors = ids.author_ids.len(),
            categories = ids.category_ids.len(),
            "Saving preferences"
        );
        let data: UserData = self
            .send_json(reqwest::Method::PATCH, "auth/user", &body, Some(auth))
            .await?;
        Ok(data.user)
    }

    // ========================================================================
    // Transport
    // ========================================================================

    async fn get<T: DeserializeOwned>(
        &self,
        url: Url,
        auth: Option<&SecretString>,
    ) -> Result<T, ApiError> {
        let bytes = self.execute(self.http.get(url), auth).await?;
        decode(&bytes)
    }

    async fn send_json<B: Serialize, T: DeserializeOwned>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: &B,
        auth: Option<&SecretString>,
    ) -> Result<T, ApiError> {
        let request = self.http.request(method, self.endpoint(path)?).json(body);
        let bytes = self.execute(request, auth).await?;
        decode(&bytes)
    }

    /// Send the request and return the body of a successful response.
    async fn execute(
        &self,
        request: reqwest::RequestBuilder,
        auth: Option<&SecretString>,
    ) -> Result<Vec<u8>, ApiError> {
        let mut request = request.header(ACCEPT, "application/json");
        if let Some(token) = auth {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token.expose_secret()));
        }

        let timeout_secs = self.timeout.as_secs();
        tokio::time::timeout(self.timeout, async {
            let response = request.send().await?;
            let status = response.status();
            if status == reqwest::StatusCode::UNAUTHORIZED {
                tracing::info!("API rejected credentials");
                return Err(ApiError::Unauthorized);
            }
            let body = read_limited_bytes(response, MAX_RESPONSE_SIZE).await?;
            if !status.is_success() {
                tracing::debug!(status = status.as_u16(), "API request failed");
                return Err(ApiError::from_status(status.as_u16(), &body));
            }
            Ok::<_, ApiError>(body)
        })
        .await
        .map_err(|_| ApiError::Timeout(timeout_secs))?
    }
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ApiError> {
    let envelope: ApiResponse<T> = serde_json::from_slice(bytes)?;
    if !envelope.success {
        return Err(ApiError::Rejected(envelope.message));
    }
    Ok(envelope.data)
}

/// Only HTTPS, or plain HTTP to the local machine for testing.
fn check_base_scheme(base: &Url) -> Result<(), ApiError> {
    match base.scheme() {
        "https" => Ok(()),
        "http" => {
            let is_localhost = matches!(base.host_str(), Some("localhost" | "127.0.0.1" | "[::1]"));
            if is_localhost {
                tracing::warn!(base_url = %base, "Using non-HTTPS API base URL (localhost only)");
                Ok(())
            } else {
                tracing::error!(base_url = %base, "Rejecting non-HTTPS base URL (HTTPS required except for localhost)");
                Err(ApiError::InsecureBaseUrl)
            }
        }
        _ => Err(ApiError::InsecureBaseUrl),
    }
}

async fn read_limited_bytes(response: reqwest::Response, limit: usize) -> Result<Vec<u8>, ApiError> {
    // Fast path: check Content-Length header
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(ApiError::ResponseTooLarge(limit));
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(ApiError::ResponseTooLarge(limit));
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use tracing::debug;

use super::{
    error_message, header_i64, page_size, token_or_missing, Category, CategorySet, Listing,
    Platform, SearchCall, SearchProvider,
};
use crate::error::SearchError;
use crate::rate_limit::{
    RateLimitedClient, SharedRateLimiter, GITHUB_BURST, GITHUB_REFILL_INTERVAL,
};

const ORGANIZATIONS: SearchCall = SearchCall::new(&[Category::Organizations]);
const REPOSITORIES: SearchCall = SearchCall::new(&[Category::Repositories]);
const USERS: SearchCall = SearchCall::new(&[Category::Users]);

#[derive(Debug, Deserialize)]
struct SearchResponse<T> {
    items: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct Account {
    login: String,
}

#[derive(Debug, Deserialize)]
struct Repository {
    full_name: String,
}

/// GitHub search, one API call per category. Every request goes through a
/// shared token bucket.
pub struct GitHubProvider {
    http: RateLimitedClient,
    base_url: String,
    token: Option<String>,
}

impl GitHubProvider {
    pub fn new(client: Client, base_url: &str, token: Option<String>) -> Self {
        let limiter = SharedRateLimiter::new(GITHUB_REFILL_INTERVAL, GITHUB_BURST);
        Self::with_limiter(client, base_url, token, limiter)
    }

    pub fn with_limiter(
        client: Client,
        base_url: &str,
        token: Option<String>,
        limiter: SharedRateLimiter,
    ) -> Self {
        Self {
            http: RateLimitedClient::new(client, limiter),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    async fn get(
        &self,
        endpoint: &str,
        query: &str,
        max_results: usize,
    ) -> Result<String, SearchError> {
        let token = token_or_missing(self.token.as_deref(), Platform::GitHub)?;
        let url = format!("{}/search/{}", self.base_url, endpoint);
        let per_page = page_size(max_results).to_string();

        let request = self
            .http
            .client()
            .get(&url)
            .query(&[("q", query), ("per_page", per_page.as_str())])
            .header("Accept", "application/vnd.github+json")
            .header("Authorization", format!("Bearer {}", token))
            .header("X-GitHub-Api-Version", "2022-11-28")
            .build()?;

        debug!("Requesting URL: {}", request.url());
        let response = self.http.execute(request).await?;
        check_status(response).await
    }

    async fn search_accounts(
        &self,
        query: &str,
        category: Category,
        max_results: usize,
    ) -> Result<Listing, SearchError> {
        let body = self.get("users", query, max_results).await?;
        let parsed: SearchResponse<Account> = decode(&body)?;
        let names = parsed.items.into_iter().map(|a| a.login).collect();
        Ok(Listing::new(category, names, max_results))
    }

    async fn search_repositories(
        &self,
        word: &str,
        max_results: usize,
    ) -> Result<Listing, SearchError> {
        let body = self.get("repositories", word, max_results).await?;
        let parsed: SearchResponse<Repository> = decode(&body)?;
        let names = parsed.items.into_iter().map(|r| r.full_name).collect();
        Ok(Listing::new(Category::Repositories, names, max_results))
    }
}

#[async_trait]
impl SearchProvider for GitHubProvider {
    fn platform(&self) -> Platform {
        Platform::GitHub
    }

    fn calls(&self, selected: &CategorySet) -> Vec<SearchCall> {
        [ORGANIZATIONS, REPOSITORIES, USERS]
            .into_iter()
            .filter(|call| selected.contains(call.covers[0]))
            .collect()
    }

    async fn search(
        &self,
        call: SearchCall,
        word: &str,
        max_results: usize,
    ) -> Vec<Result<Listing, SearchError>> {
        let result = match call.covers.first() {
            Some(Category::Organizations) => {
                let query = format!("{} type:org", word);
                self.search_accounts(&query, Category::Organizations, max_results)
                    .await
            }
            Some(Category::Repositories) => self.search_repositories(word, max_results).await,
            Some(Category::Users) => {
                self.search_accounts(word, Category::Users, max_results)
                    .await
            }
            None => return Vec::new(),
        };

        if let Ok(listing) = &result {
            debug!(
                "GitHub returned {} {:?} for '{}'",
                listing.names.len(),
                listing.category,
                word
            );
        }
        vec![result]
    }
}

async fn check_status(response: Response) -> Result<String, SearchError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.text().await?);
    }

    let headers = response.headers();
    let exhausted = header_i64(headers, "X-RateLimit-Remaining") == Some(0);
    if status == StatusCode::TOO_MANY_REQUESTS || (status == StatusCode::FORBIDDEN && exhausted) {
        let reset = header_i64(headers, "X-RateLimit-Reset")
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0));
        return Err(SearchError::RateLimited {
            platform: Platform::GitHub,
            reset,
        });
    }

    let body = response.text().await.unwrap_or_default();
    Err(SearchError::Api {
        platform: Platform::GitHub,
        status,
        message: error_message(&body),
    })
}

fn decode<T: serde::de::DeserializeOwned>(body: &str) -> Result<T, SearchError> {
    serde_json::from_str(body).map_err(|source| SearchError::Decode {
        platform: Platform::GitHub,
        source,
    })
}

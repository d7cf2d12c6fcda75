use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use super::{
    error_message, header_i64, page_size, token_or_missing, Category, CategorySet, Listing,
    Platform, SearchCall, SearchProvider,
};
use crate::error::SearchError;

/// Groups and users come back from one combined call.
const GROUPS_AND_USERS: SearchCall =
    SearchCall::new(&[Category::Organizations, Category::Users]);
const PROJECTS: SearchCall = SearchCall::new(&[Category::Repositories]);

#[derive(Debug, Deserialize)]
struct Group {
    full_path: String,
}

#[derive(Debug, Deserialize)]
struct User {
    username: String,
}

#[derive(Debug, Deserialize)]
struct Project {
    path_with_namespace: String,
}

/// GitLab search. Requests are not throttled here; GitLab enforces its own limits.
pub struct GitLabProvider {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl GitLabProvider {
    pub fn new(client: Client, base_url: &str, token: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    async fn get<T: DeserializeOwned>(
        &self,
        token: &str,
        path: &str,
        params: &[(&str, &str)],
        max_results: usize,
    ) -> Result<Vec<T>, SearchError> {
        let url = format!("{}/{}", self.base_url, path);
        let per_page = page_size(max_results).to_string();

        let request = self
            .client
            .get(&url)
            .query(params)
            .query(&[("per_page", per_page.as_str())])
            .header("PRIVATE-TOKEN", token)
            .build()?;

        debug!("Requesting URL: {}", request.url());
        let response = self.client.execute(request).await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let reset = header_i64(response.headers(), "RateLimit-Reset")
                .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0));
            return Err(SearchError::RateLimited {
                platform: Platform::GitLab,
                reset,
            });
        }

        let body = response.text().await?;
        if !status.is_success() {
            return Err(SearchError::Api {
                platform: Platform::GitLab,
                status,
                message: error_message(&body),
            });
        }

        serde_json::from_str(&body).map_err(|source| SearchError::Decode {
            platform: Platform::GitLab,
            source,
        })
    }

    /// Groups first, then users. A failed group lookup skips the user lookup.
    async fn search_groups_and_users(
        &self,
        word: &str,
        max_results: usize,
    ) -> Vec<Result<Listing, SearchError>> {
        let token = match token_or_missing(self.token.as_deref(), Platform::GitLab) {
            Ok(token) => token,
            Err(e) => return vec![Err(e)],
        };

        let mut results = Vec::with_capacity(2);

        let groups = self
            .get::<Group>(token, "groups", &[("search", word)], max_results)
            .await;
        match groups {
            Ok(groups) => {
                let names = groups.into_iter().map(|g| g.full_path).collect();
                results.push(Ok(Listing::new(Category::Organizations, names, max_results)));
            }
            Err(e) => {
                results.push(Err(e));
                return results;
            }
        }

        let users = self
            .get::<User>(
                token,
                "search",
                &[("scope", "users"), ("search", word)],
                max_results,
            )
            .await
            .map(|users| {
                let names = users.into_iter().map(|u| u.username).collect();
                Listing::new(Category::Users, names, max_results)
            });
        results.push(users);

        results
    }

    async fn search_projects(
        &self,
        word: &str,
        max_results: usize,
    ) -> Result<Listing, SearchError> {
        let token = token_or_missing(self.token.as_deref(), Platform::GitLab)?;
        let projects = self
            .get::<Project>(
                token,
                "search",
                &[("scope", "projects"), ("search", word)],
                max_results,
            )
            .await?;
        let names = projects
            .into_iter()
            .map(|p| p.path_with_namespace)
            .collect();
        Ok(Listing::new(Category::Repositories, names, max_results))
    }
}

#[async_trait]
impl SearchProvider for GitLabProvider {
    fn platform(&self) -> Platform {
        Platform::GitLab
    }

    fn calls(&self, selected: &CategorySet) -> Vec<SearchCall> {
        let mut calls = Vec::new();
        if selected.organizations || selected.users {
            calls.push(GROUPS_AND_USERS);
        }
        if selected.repositories {
            calls.push(PROJECTS);
        }
        calls
    }

    async fn search(
        &self,
        call: SearchCall,
        word: &str,
        max_results: usize,
    ) -> Vec<Result<Listing, SearchError>> {
        if call == PROJECTS {
            vec![self.search_projects(word, max_results).await]
        } else if call == GROUPS_AND_USERS {
            self.search_groups_and_users(word, max_results).await
        } else {
            Vec::new()
        }
    }
}

//! Code-hosting platforms and the search capability each of them exposes.
//!
//! The dispatcher only ever talks to [`SearchProvider`]. Each provider decides how
//! the requested [`Category`] selection maps onto its own API calls, which is not
//! one-to-one: GitHub has a search per category, GitLab answers organizations and
//! users with a single combined call.

mod github;
mod gitlab;

use std::fmt;

use async_trait::async_trait;
use reqwest::header::HeaderMap;

use crate::error::SearchError;

pub use self::github::GitHubProvider;
pub use self::gitlab::GitLabProvider;

/// The page size ceiling both platforms enforce.
const MAX_PAGE_SIZE: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    GitHub,
    GitLab,
}

impl Platform {
    /// Environment variable holding the access token for this platform.
    pub fn token_var(self) -> &'static str {
        match self {
            Platform::GitHub => "GITHUB_ACCESS_TOKEN",
            Platform::GitLab => "GITLAB_ACCESS_TOKEN",
        }
    }

    /// Name the platform uses for a category in its own vocabulary.
    pub fn label(self, category: Category) -> &'static str {
        match (self, category) {
            (Platform::GitHub, Category::Organizations) => "organizations",
            (Platform::GitHub, Category::Repositories) => "repositories",
            (Platform::GitLab, Category::Organizations) => "groups",
            (Platform::GitLab, Category::Repositories) => "projects",
            (_, Category::Users) => "users",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::GitHub => f.write_str("GitHub"),
            Platform::GitLab => f.write_str("GitLab"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Organizations,
    Repositories,
    Users,
}

/// Which categories the user asked for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategorySet {
    pub organizations: bool,
    pub repositories: bool,
    pub users: bool,
}

impl CategorySet {
    pub fn contains(&self, category: Category) -> bool {
        match category {
            Category::Organizations => self.organizations,
            Category::Repositories => self.repositories,
            Category::Users => self.users,
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.organizations || self.repositories || self.users)
    }
}

/// One outbound query a provider issues for a word. `covers` lists every category
/// the call can produce results for; the dispatcher prints only the selected ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchCall {
    pub covers: &'static [Category],
}

impl SearchCall {
    pub const fn new(covers: &'static [Category]) -> Self {
        Self { covers }
    }
}

/// Ordered names matched for one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    pub category: Category,
    pub names: Vec<String>,
}

impl Listing {
    pub fn new(category: Category, mut names: Vec<String>, max_results: usize) -> Self {
        names.truncate(max_results);
        Self { category, names }
    }
}

/// A platform that can be searched by category.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    fn platform(&self) -> Platform;

    /// Calls this platform issues for the selected categories, in order.
    fn calls(&self, selected: &CategorySet) -> Vec<SearchCall>;

    /// Runs one call for `word`. Yields a result per category the call produced;
    /// a failing request ends the call, so later categories are absent.
    async fn search(
        &self,
        call: SearchCall,
        word: &str,
        max_results: usize,
    ) -> Vec<Result<Listing, SearchError>>;
}

fn page_size(max_results: usize) -> usize {
    max_results.clamp(1, MAX_PAGE_SIZE)
}

fn token_or_missing(token: Option<&str>, platform: Platform) -> Result<&str, SearchError> {
    match token {
        Some(t) if !t.trim().is_empty() => Ok(t),
        _ => Err(SearchError::MissingCredential {
            platform,
            var: platform.token_var(),
        }),
    }
}

fn header_i64(headers: &HeaderMap, name: &str) -> Option<i64> {
    headers.get(name)?.to_str().ok()?.trim().parse().ok()
}

/// Pulls a human readable message out of an error body, falling back to the raw text.
fn error_message(body: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(json) => json
            .get("message")
            .or_else(|| json.get("error"))
            .map(|v| match v.as_str() {
                Some(s) => s.to_string(),
                None => v.to_string(),
            })
            .unwrap_or_else(|| body.trim().to_string()),
        Err(_) => body.trim().to_string(),
    }
}

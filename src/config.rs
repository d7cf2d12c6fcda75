use std::env;

use crate::args::Args;
use crate::error::{Error, Result};
use crate::platform::{CategorySet, Platform};

/// Everything a run needs, fixed once the command line has been read.
#[derive(Debug, Clone)]
pub struct Config {
    pub categories: CategorySet,
    pub max_results: usize,
    pub clean_urls: bool,
    pub simple: bool,
    pub verbose: bool,
    pub github: PlatformConfig,
    pub gitlab: PlatformConfig,
}

#[derive(Debug, Clone)]
pub struct PlatformConfig {
    pub enabled: bool,
    pub api_url: String,
    /// Checked only when a search needs it.
    pub token: Option<String>,
}

impl Config {
    /// Builds the config, taking tokens from the process environment.
    pub fn from_args(args: &Args) -> Result<Self> {
        Self::with_tokens(
            args,
            token_from_env(Platform::GitHub),
            token_from_env(Platform::GitLab),
        )
    }

    pub fn with_tokens(
        args: &Args,
        github_token: Option<String>,
        gitlab_token: Option<String>,
    ) -> Result<Self> {
        let categories = CategorySet {
            organizations: args.organizations,
            repositories: args.repositories,
            users: args.users,
        };
        if categories.is_empty() {
            return Err(Error::NoCategory);
        }

        Ok(Config {
            categories,
            max_results: args.max_results,
            clean_urls: args.clean_urls,
            simple: args.simple,
            verbose: args.verbose,
            github: PlatformConfig {
                enabled: !args.gitlab_only,
                api_url: args.github_api_url.clone(),
                token: github_token,
            },
            gitlab: PlatformConfig {
                enabled: !args.github_only,
                api_url: args.gitlab_api_url.clone(),
                token: gitlab_token,
            },
        })
    }
}

fn token_from_env(platform: Platform) -> Option<String> {
    env::var(platform.token_var())
        .ok()
        .filter(|token| !token.trim().is_empty())
}

//! # codehost-recon
//!
//! Looks up organizations, repositories and users on GitHub and GitLab that match
//! a list of candidate names, as a reconnaissance aid.
//!
//! ## Main Components
//!
//! - [`WordSet`]: normalizes input lines into deduplicated search words
//! - [`SearchProvider`]: the per-platform search capability ([`GitHubProvider`], [`GitLabProvider`])
//! - [`SharedRateLimiter`]: token bucket that throttles GitHub requests
//! - [`Dispatcher`]: runs every selected search for every word
//! - [`Printer`]: labeled or bare (pipe friendly) output
//!
//! ## Example
//!
//! ```no_run
//! use codehost_recon::{providers_for, Args, Config, Dispatcher, Printer, WordSet};
//! use clap::Parser;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     let args = Args::parse();
//!     let config = Config::from_args(&args)?;
//!
//!     let mut words = WordSet::new(config.clean_urls);
//!     words.insert_line("codingo dot com");
//!
//!     let client = codehost_recon::http_client()?;
//!     let printer = Printer::new(std::io::stdout(), config.simple);
//!     let mut dispatcher = Dispatcher::new(
//!         providers_for(&config, &client),
//!         config.categories,
//!         config.max_results,
//!         printer,
//!     );
//!     dispatcher.run(words.iter()).await?;
//!
//!     Ok(())
//! }
//! ```

mod args;
mod config;
mod dispatcher;
mod error;
mod normalizer;
mod platform;
mod printer;
mod rate_limit;

pub use crate::args::Args;
pub use crate::config::{Config, PlatformConfig};
pub use crate::dispatcher::{providers_for, Dispatcher, RunSummary};
pub use crate::error::{Error, Result, SearchError};
pub use crate::normalizer::{clean_url, variants, WordSet};
pub use crate::platform::{
    Category, CategorySet, GitHubProvider, GitLabProvider, Listing, Platform, SearchCall,
    SearchProvider,
};
pub use crate::printer::Printer;
pub use crate::rate_limit::{
    RateLimitedClient, SharedRateLimiter, TokenBucket, GITHUB_BURST, GITHUB_REFILL_INTERVAL,
};

/// HTTP client shared by both providers.
pub fn http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(concat!("codehost-recon/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(Error::Client)
}

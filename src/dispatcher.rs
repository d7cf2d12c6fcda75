use std::io::{self, Write};

use indicatif::ProgressBar;
use reqwest::Client;
use tracing::{debug, info};

use crate::config::Config;
use crate::platform::{
    Category, CategorySet, GitHubProvider, GitLabProvider, Listing, Platform, SearchCall,
    SearchProvider,
};
use crate::printer::Printer;

/// Counts for one run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub words: usize,
    pub calls: usize,
    pub failures: usize,
}

/// The providers a config enables, GitHub first.
pub fn providers_for(config: &Config, client: &Client) -> Vec<Box<dyn SearchProvider>> {
    let mut providers: Vec<Box<dyn SearchProvider>> = Vec::new();
    if config.github.enabled {
        providers.push(Box::new(GitHubProvider::new(
            client.clone(),
            &config.github.api_url,
            config.github.token.clone(),
        )));
    }
    if config.gitlab.enabled {
        providers.push(Box::new(GitLabProvider::new(
            client.clone(),
            &config.gitlab.api_url,
            config.gitlab.token.clone(),
        )));
    }
    providers
}

/// Category an error at `index` of a call is reported under: its own if selected,
/// otherwise the next selected one the call covers, wrapping around.
fn error_category(call: SearchCall, index: usize, selected: &CategorySet) -> Category {
    let own = call.covers.get(index).copied();
    call.covers
        .iter()
        .skip(index)
        .chain(call.covers.iter())
        .copied()
        .find(|category| selected.contains(*category))
        .or(own)
        .unwrap_or(Category::Organizations)
}

/// Where results and errors go, with the spinner kept out of the way.
struct Output<W: Write> {
    printer: Printer<W>,
    progress: ProgressBar,
}

impl<W: Write> Output<W> {
    fn listing(&mut self, platform: Platform, word: &str, listing: &Listing) -> io::Result<()> {
        let header = format!(
            "{} {} matching '{}'",
            platform,
            platform.label(listing.category),
            word
        );
        let printer = &mut self.printer;
        self.progress
            .suspend(|| printer.results(&header, &listing.names))
    }

    fn error(&mut self, message: &str) -> io::Result<()> {
        let printer = &mut self.printer;
        self.progress.suspend(|| printer.error(message))
    }
}

/// Runs every selected search for every word, one at a time, printing as it goes.
/// Failed searches are reported and skipped.
pub struct Dispatcher<W: Write> {
    providers: Vec<Box<dyn SearchProvider>>,
    categories: CategorySet,
    max_results: usize,
    output: Output<W>,
}

impl<W: Write> Dispatcher<W> {
    pub fn new(
        providers: Vec<Box<dyn SearchProvider>>,
        categories: CategorySet,
        max_results: usize,
        printer: Printer<W>,
    ) -> Self {
        Self {
            providers,
            categories,
            max_results,
            output: Output {
                printer,
                progress: ProgressBar::hidden(),
            },
        }
    }

    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.output.progress = progress;
        self
    }

    pub async fn run<'a, I>(&mut self, words: I) -> io::Result<RunSummary>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut summary = RunSummary::default();

        for word in words {
            summary.words += 1;
            for index in 0..self.providers.len() {
                self.search_platform(index, word, &mut summary).await?;
            }
        }

        self.output.progress.finish_and_clear();
        info!(
            "Finished {} searches over {} words ({} failed)",
            summary.calls, summary.words, summary.failures
        );
        Ok(summary)
    }

    async fn search_platform(
        &mut self,
        index: usize,
        word: &str,
        summary: &mut RunSummary,
    ) -> io::Result<()> {
        let provider = &self.providers[index];
        let platform = provider.platform();

        for call in provider.calls(&self.categories) {
            self.output
                .progress
                .set_message(format!("Searching {} for '{}'", platform, word));
            self.output.progress.tick();
            summary.calls += 1;

            let results = provider.search(call, word, self.max_results).await;
            // Results line up with the categories the call covers.
            for (index, result) in results.into_iter().enumerate() {
                match result {
                    Ok(listing) if self.categories.contains(listing.category) => {
                        self.output.listing(platform, word, &listing)?;
                    }
                    Ok(listing) => {
                        debug!(
                            "Dropping {} {} for '{}': not requested",
                            platform,
                            platform.label(listing.category),
                            word
                        );
                    }
                    Err(e) => {
                        summary.failures += 1;
                        let category = error_category(call, index, &self.categories);
                        self.output.error(&format!(
                            "Error searching {} {} for '{}': {}",
                            platform,
                            platform.label(category),
                            word,
                            e
                        ))?;
                    }
                }
            }
        }
        Ok(())
    }

    pub fn into_printer(self) -> Printer<W> {
        self.output.printer
    }
}

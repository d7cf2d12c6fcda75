use std::io;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use codehost_recon::{
    http_client, providers_for, Args, Config, Dispatcher, Error, Printer, WordSet,
};
use dotenv::dotenv;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, Level};

#[tokio::main]
async fn main() -> ExitCode {
    // Loaded before parsing so .env can also supply the API URLs.
    dotenv().ok();
    let args = Args::parse();

    let config = match Config::from_args(&args) {
        Ok(config) => config,
        Err(e) => return fail(e),
    };

    tracing_subscriber::fmt()
        .with_max_level(if config.verbose { Level::DEBUG } else { Level::WARN })
        .with_writer(io::stderr)
        .init();

    let words = match read_words(config.clean_urls) {
        Ok(words) => words,
        Err(e) => return fail(e),
    };

    let client = match http_client() {
        Ok(client) => client,
        Err(e) => return fail(e),
    };

    let printer = Printer::new(io::stdout(), config.simple);
    let mut dispatcher = Dispatcher::new(
        providers_for(&config, &client),
        config.categories,
        config.max_results,
        printer,
    )
    .with_progress(spinner(config.simple));

    match dispatcher.run(words.iter()).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Failed to write results: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn read_words(clean_urls: bool) -> Result<WordSet, Error> {
    let mut words = WordSet::new(clean_urls);
    let lines = words
        .read_lines(io::stdin().lock())
        .map_err(Error::Input)?;
    debug!("Read {} lines, {} unique words", lines, words.len());
    Ok(words)
}

fn spinner(simple: bool) -> ProgressBar {
    if simple {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .template("{spinner:.green} [{elapsed_precise}] {wide_msg}")
    {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Fatal errors go to stdout alongside results.
fn fail(e: Error) -> ExitCode {
    println!("{}", e);
    ExitCode::FAILURE
}

use clap::Parser;

/// Reconnaissance helper that looks up organizations, repositories and users on
/// GitHub and GitLab for every name read from standard input.
#[derive(Parser, Debug, Clone)]
#[clap(
    author,
    version,
    about,
    long_about = "Reads candidate organization or brand names from stdin (one per line) and \
searches GitHub and GitLab for matching organizations, repositories and users.\n\n\
Credentials are read from GITHUB_ACCESS_TOKEN and GITLAB_ACCESS_TOKEN (a .env file is honored)."
)]
pub struct Args {
    /// Search for organization names (GitLab: groups).
    #[clap(short = 'o', long = "org")]
    pub organizations: bool,

    /// Search for repository names (GitLab: projects).
    #[clap(short = 'r', long = "repo")]
    pub repositories: bool,

    /// Search for username matches.
    #[clap(short = 'u', long = "user")]
    pub users: bool,

    /// Maximum search results per category.
    #[clap(long = "max", value_name = "NUM", default_value = "10")]
    pub max_results: usize,

    /// Reduce input URLs to their host name before searching.
    #[clap(short = 'c', long = "clean")]
    pub clean_urls: bool,

    /// Search only GitHub.
    #[clap(long = "gh", conflicts_with = "gitlab_only")]
    pub github_only: bool,

    /// Search only GitLab.
    #[clap(long = "gl")]
    pub gitlab_only: bool,

    /// Simple output style for piping to another tool.
    #[clap(short = 's', long = "simple")]
    pub simple: bool,

    /// Enable debug logging on stderr.
    #[clap(short = 'v', long)]
    pub verbose: bool,

    /// Base URL of the GitHub REST API.
    #[clap(
        long,
        env = "GITHUB_API_URL",
        value_name = "URL",
        default_value = "https://api.github.com"
    )]
    pub github_api_url: String,

    /// Base URL of the GitLab REST API.
    #[clap(
        long,
        env = "GITLAB_API_URL",
        value_name = "URL",
        default_value = "https://gitlab.com/api/v4"
    )]
    pub gitlab_api_url: String,
}

use std::time::Duration;

use codehost_recon::{
    Category, CategorySet, GitHubProvider, GitLabProvider, Listing, Platform, SearchError,
    SearchProvider, SharedRateLimiter,
};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn select(organizations: bool, repositories: bool, users: bool) -> CategorySet {
    CategorySet {
        organizations,
        repositories,
        users,
    }
}

fn github(server: &MockServer, token: Option<&str>) -> GitHubProvider {
    GitHubProvider::new(
        reqwest::Client::new(),
        &server.uri(),
        token.map(str::to_string),
    )
}

fn gitlab(server: &MockServer, token: Option<&str>) -> GitLabProvider {
    GitLabProvider::new(
        reqwest::Client::new(),
        &format!("{}/api/v4", server.uri()),
        token.map(str::to_string),
    )
}

async fn run_single(
    provider: &dyn SearchProvider,
    selected: CategorySet,
    word: &str,
    max_results: usize,
) -> Vec<Result<Listing, SearchError>> {
    let calls = provider.calls(&selected);
    assert_eq!(calls.len(), 1, "expected a single call for {selected:?}");
    provider.search(calls[0], word, max_results).await
}

#[tokio::test]
async fn github_organizations_search_users_of_type_org() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/users"))
        .and(query_param("q", "acme type:org"))
        .and(query_param("per_page", "2"))
        .and(header("authorization", "Bearer gh-token"))
        .and(header("x-github-api-version", "2022-11-28"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total_count": 3,
            "items": [{"login": "acme"}, {"login": "acme-labs"}, {"login": "acme-corp"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = github(&server, Some("gh-token"));
    let results = run_single(&provider, select(true, false, false), "acme", 2).await;

    let listing = results.into_iter().next().unwrap().unwrap();
    assert_eq!(listing.category, Category::Organizations);
    assert_eq!(listing.names, vec!["acme", "acme-labs"]);
}

#[tokio::test]
async fn github_repositories_use_full_name() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/repositories"))
        .and(query_param("q", "acme"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"full_name": "acme/rockets", "name": "rockets"}]
        })))
        .mount(&server)
        .await;

    let provider = github(&server, Some("gh-token"));
    let results = run_single(&provider, select(false, true, false), "acme", 10).await;

    assert_eq!(results[0].as_ref().unwrap().names, vec!["acme/rockets"]);
}

#[tokio::test]
async fn github_exhausted_rate_limit_reports_reset_time() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/users"))
        .respond_with(
            ResponseTemplate::new(403)
                .insert_header("X-RateLimit-Remaining", "0")
                .insert_header("X-RateLimit-Reset", "1700000000")
                .set_body_json(json!({"message": "API rate limit exceeded"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let provider = github(&server, Some("gh-token"));
    let results = run_single(&provider, select(false, false, true), "acme", 10).await;

    let err = results.into_iter().next().unwrap().unwrap_err();
    match &err {
        SearchError::RateLimited { platform, reset } => {
            assert_eq!(*platform, Platform::GitHub);
            assert_eq!(reset.map(|r| r.timestamp()), Some(1_700_000_000));
        }
        other => panic!("expected rate limit error, got {other:?}"),
    }
    assert!(err.to_string().contains("resets at 2023-11-14 22:13:20 UTC"));
}

#[tokio::test]
async fn github_api_error_carries_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"message": "Bad credentials"})),
        )
        .mount(&server)
        .await;

    let provider = github(&server, Some("wrong"));
    let results = run_single(&provider, select(false, false, true), "acme", 10).await;

    let err = results.into_iter().next().unwrap().unwrap_err();
    assert!(matches!(err, SearchError::Api { .. }));
    assert_eq!(
        err.to_string(),
        "GitHub API returned 401 Unauthorized: Bad credentials"
    );
}

#[tokio::test]
async fn github_malformed_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let provider = github(&server, Some("gh-token"));
    let results = run_single(&provider, select(false, true, false), "acme", 10).await;

    assert!(matches!(
        results[0],
        Err(SearchError::Decode {
            platform: Platform::GitHub,
            ..
        })
    ));
}

#[tokio::test]
async fn github_without_token_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let provider = github(&server, None);
    let results = run_single(&provider, select(true, false, false), "acme", 10).await;

    assert!(matches!(
        results[0],
        Err(SearchError::MissingCredential { .. })
    ));
}

#[tokio::test]
async fn github_requests_take_tokens_from_the_shared_limiter() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/repositories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
        .expect(1)
        .mount(&server)
        .await;

    let limiter = SharedRateLimiter::new(Duration::from_secs(3600), 1);
    let provider = GitHubProvider::with_limiter(
        reqwest::Client::new(),
        &server.uri(),
        Some("gh-token".to_string()),
        limiter.clone(),
    );

    let results = run_single(&provider, select(false, true, false), "acme", 10).await;
    assert!(results[0].is_ok());
    assert_eq!(limiter.available().await, 0);

    // The bucket is empty, so the next search waits instead of reaching the server.
    let second = tokio::time::timeout(
        Duration::from_millis(200),
        run_single(&provider, select(false, true, false), "acme", 10),
    )
    .await;
    assert!(second.is_err());
}

#[tokio::test]
async fn gitlab_groups_and_users_come_from_one_call() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/groups"))
        .and(query_param("search", "acme"))
        .and(header("PRIVATE-TOKEN", "gl-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"full_path": "acme"},
            {"full_path": "acme/platform"}
        ])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v4/search"))
        .and(query_param("scope", "users"))
        .and(query_param("search", "acme"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"username": "acme-admin"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let provider = gitlab(&server, Some("gl-token"));
    let results = run_single(&provider, select(true, false, false), "acme", 10).await;

    let listings: Vec<Listing> = results.into_iter().map(Result::unwrap).collect();
    assert_eq!(
        listings,
        vec![
            Listing::new(
                Category::Organizations,
                vec!["acme".into(), "acme/platform".into()],
                10
            ),
            Listing::new(Category::Users, vec!["acme-admin".into()], 10),
        ]
    );
}

#[tokio::test]
async fn gitlab_failed_group_lookup_skips_users() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/groups"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"message": "boom"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v4/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let provider = gitlab(&server, Some("gl-token"));
    let results = run_single(&provider, select(false, false, true), "acme", 10).await;

    assert_eq!(results.len(), 1);
    assert!(matches!(
        results[0],
        Err(SearchError::Api {
            platform: Platform::GitLab,
            ..
        })
    ));
}

#[tokio::test]
async fn gitlab_projects_use_path_with_namespace() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/search"))
        .and(query_param("scope", "projects"))
        .and(query_param("search", "acme"))
        .and(query_param("per_page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"path_with_namespace": "acme/rockets"},
            {"path_with_namespace": "acme/anvils"}
        ])))
        .mount(&server)
        .await;

    let provider = gitlab(&server, Some("gl-token"));
    let results = run_single(&provider, select(false, true, false), "acme", 1).await;

    assert_eq!(results[0].as_ref().unwrap().names, vec!["acme/rockets"]);
}

#[tokio::test]
async fn gitlab_too_many_requests_is_rate_limited() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429).insert_header("RateLimit-Reset", "1700000000"))
        .mount(&server)
        .await;

    let provider = gitlab(&server, Some("gl-token"));
    let results = run_single(&provider, select(false, true, false), "acme", 10).await;

    assert!(matches!(
        results[0],
        Err(SearchError::RateLimited {
            platform: Platform::GitLab,
            reset: Some(_)
        })
    ));
}

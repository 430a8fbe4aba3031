//! Tests for the blocking GitHub client.

type FixtureResult<T> = Result<T, Box<dyn std::error::Error>>;

use std::sync::Arc;
use std::time::Duration;

use rstest::{fixture, rstest};
use serde_json::json;
use tokio::runtime::Runtime;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::GitHubClient;
use crate::github::error::ApiError;
use crate::github::locator::PersonalAccessToken;
use crate::github::rate_limit::{Admission, GITHUB_API_KEY, RateLimiter};
use crate::github::retry::RetryPolicy;

struct ClientFixture {
    runtime: Runtime,
    server: MockServer,
    client: GitHubClient,
}

impl ClientFixture {
    fn block_on<F: std::future::Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    fn mount(&self, mock: Mock) {
        self.block_on(mock.mount(&self.server));
    }
}

#[fixture]
fn client_fixture() -> FixtureResult<ClientFixture> {
    let runtime = Runtime::new()?;
    let server = runtime.block_on(MockServer::start());
    let token = PersonalAccessToken::new("valid-token")?;
    let limiter = Arc::new(RateLimiter::hourly(100));
    let client = GitHubClient::new(
        token,
        &server.uri(),
        limiter,
        RetryPolicy::new(2, Duration::ZERO),
    )?;
    Ok(ClientFixture {
        runtime,
        server,
        client,
    })
}

#[derive(Debug, serde::Deserialize, PartialEq, Eq)]
struct Viewer {
    login: String,
}

#[derive(Debug, serde::Deserialize)]
struct ViewerData {
    viewer: Viewer,
}

#[rstest]
fn graphql_sends_bearer_token_and_decodes_data(client_fixture: FixtureResult<ClientFixture>) {
    let fixture = client_fixture.expect("fixture should succeed");
    fixture.mount(
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(header("authorization", "Bearer valid-token"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"data": {"viewer": {"login": "octocat"}}})),
            )
            .expect(1),
    );

    let data: ViewerData = fixture
        .client
        .graphql("query { viewer { login } }", &json!({}))
        .expect("query should succeed");

    assert_eq!(data.viewer.login, "octocat");
    fixture.block_on(fixture.server.verify());
}

#[rstest]
fn exhausted_quota_header_pauses_the_shared_limiter(
    client_fixture: FixtureResult<ClientFixture>,
) {
    let fixture = client_fixture.expect("fixture should succeed");
    fixture.mount(
        Mock::given(method("GET"))
            .and(path("/rate_limit"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("x-ratelimit-limit", "5000")
                    .insert_header("x-ratelimit-remaining", "0")
                    .insert_header("x-ratelimit-reset", "99999999999")
                    .set_body_json(json!({})),
            ),
    );

    let _: serde_json::Value = fixture
        .client
        .rest_get("rate_limit", &[])
        .expect("request should succeed");

    assert!(matches!(
        fixture.client.limiter().try_consume(GITHUB_API_KEY),
        Admission::Wait(Some(_))
    ));
}

#[rstest]
fn transient_failure_is_retried_until_success(client_fixture: FixtureResult<ClientFixture>) {
    let fixture = client_fixture.expect("fixture should succeed");
    fixture.mount(
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .up_to_n_times(1)
            .with_priority(1)
            .expect(1),
    );
    fixture.mount(
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"data": {"viewer": {"login": "octocat"}}})),
            )
            .expect(1),
    );

    let data: ViewerData = fixture
        .client
        .graphql("query { viewer { login } }", &json!({}))
        .expect("second attempt should succeed");

    assert_eq!(data.viewer.login, "octocat");
    fixture.block_on(fixture.server.verify());
}

#[rstest]
fn persistent_server_errors_exhaust_retries(client_fixture: FixtureResult<ClientFixture>) {
    let fixture = client_fixture.expect("fixture should succeed");
    fixture.mount(
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({"message": "boom"})))
            .expect(3),
    );

    let error = fixture
        .client
        .graphql::<ViewerData>("query { viewer { login } }", &json!({}))
        .expect_err("every attempt fails");

    let ApiError::RetriesExhausted { attempts, last } = error else {
        panic!("expected retries to be exhausted, got {error:?}");
    };
    assert_eq!(attempts, 3);
    assert_eq!(
        *last,
        ApiError::Http {
            status: 500,
            message: "graphql failed: boom".to_owned()
        }
    );
    fixture.block_on(fixture.server.verify());
}

#[rstest]
fn fatal_graphql_errors_are_not_retried(client_fixture: FixtureResult<ClientFixture>) {
    let fixture = client_fixture.expect("fixture should succeed");
    fixture.mount(
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": null,
                "errors": [{"message": "Field 'nope' doesn't exist on type 'Query'"}]
            })))
            .expect(1),
    );

    let error = fixture
        .client
        .graphql::<ViewerData>("query { nope }", &json!({}))
        .expect_err("schema error is fatal");

    assert!(matches!(error, ApiError::GraphQl { .. }), "got {error:?}");
    fixture.block_on(fixture.server.verify());
}

#[rstest]
fn not_found_is_not_retried(client_fixture: FixtureResult<ClientFixture>) {
    let fixture = client_fixture.expect("fixture should succeed");
    fixture.mount(
        Mock::given(method("GET"))
            .and(path("/repos/octo/missing/pulls/1/files"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Not Found"})))
            .expect(1),
    );

    let error = fixture
        .client
        .rest_get::<serde_json::Value>("repos/octo/missing/pulls/1/files", &[])
        .expect_err("404 is fatal");

    assert_eq!(
        error,
        ApiError::Http {
            status: 404,
            message: "repos/octo/missing/pulls/1/files failed: Not Found".to_owned()
        }
    );
    fixture.block_on(fixture.server.verify());
}

#[rstest]
fn graphql_rate_limit_payload_is_retried(client_fixture: FixtureResult<ClientFixture>) {
    let fixture = client_fixture.expect("fixture should succeed");
    fixture.mount(
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": null,
                "errors": [{"type": "RATE_LIMITED", "message": "API rate limit exceeded"}]
            })))
            .up_to_n_times(1)
            .with_priority(1),
    );
    fixture.mount(
        Mock::given(method("POST"))
            .and(path("/graphql"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"data": {"viewer": {"login": "octocat"}}})),
            ),
    );

    let data: ViewerData = fixture
        .client
        .graphql("query { viewer { login } }", &json!({}))
        .expect("retry after rate limit should succeed");

    assert_eq!(data.viewer.login, "octocat");
}

#[rstest]
fn rest_get_forwards_query_parameters(client_fixture: FixtureResult<ClientFixture>) {
    let fixture = client_fixture.expect("fixture should succeed");
    fixture.mount(
        Mock::given(method("GET"))
            .and(path("/repos/octo/repo/pulls/7/files"))
            .and(query_param("page", "2"))
            .and(query_param("per_page", "100"))
            .and(header("accept", "application/vnd.github+json"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([{"filename": "a.rs"}])),
            )
            .expect(1),
    );

    let files: Vec<serde_json::Value> = fixture
        .client
        .rest_get(
            "/repos/octo/repo/pulls/7/files",
            &[("page", "2".to_owned()), ("per_page", "100".to_owned())],
        )
        .expect("request should succeed");

    assert_eq!(files, vec![json!({"filename": "a.rs"})]);
    fixture.block_on(fixture.server.verify());
}

#[rstest]
fn invalid_api_base_is_rejected() {
    let token = PersonalAccessToken::new("valid-token").expect("token should be valid");
    let error = GitHubClient::new(
        token,
        "not a url",
        Arc::new(RateLimiter::hourly(1)),
        RetryPolicy::default(),
    )
    .expect_err("invalid base URL");
    assert!(matches!(error, ApiError::InvalidUrl { .. }));
}

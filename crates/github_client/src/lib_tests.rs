//! Unit tests for the github_client crate.

use super::*; // Import items from lib.rs
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CALLBACK_URL: &str = "https://ci.example.com/hook";

fn create_client(mock_server: &MockServer) -> GitHubClient {
    GitHubClient::with_token("test-token", Some(&mock_server.uri())).unwrap()
}

fn hook_json(id: u64, callback_url: &str) -> serde_json::Value {
    json!({
        "type": "Repository",
        "id": id,
        "name": "web",
        "active": true,
        "events": ["push"],
        "config": {
            "url": callback_url,
            "content_type": "json",
            "insecure_ssl": "0"
        },
        "created_at": "2024-01-01T00:00:00Z",
        "updated_at": "2024-01-01T00:00:00Z",
        "url": format!("https://api.github.com/repos/acme/widgets/hooks/{id}")
    })
}

fn next_link(mock_server: &MockServer, route: &str, page: u32) -> String {
    format!(
        "<{}{route}?per_page=100&page={page}>; rel=\"next\"",
        mock_server.uri()
    )
}

#[tokio::test]
async fn test_find_repository_hook_on_last_page() {
    let mock_server = MockServer::start().await;
    let route = "/repos/acme/widgets/hooks";

    Mock::given(method("GET"))
        .and(path(route))
        .and(query_param("page", "1"))
        .and(query_param("per_page", "100"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([hook_json(1, "https://other.example.com/a")]))
                .insert_header("link", next_link(&mock_server, route, 2).as_str()),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path(route))
        .and(query_param("page", "2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([hook_json(2, "https://other.example.com/b")]))
                .insert_header("link", next_link(&mock_server, route, 3).as_str()),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path(route))
        .and(query_param("page", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([hook_json(3, CALLBACK_URL)])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server);

    let result = client
        .find_repository_hook("acme", "widgets", CALLBACK_URL)
        .await;

    if let Err(e) = &result {
        eprintln!("find_repository_hook error: {e:?}");
    }
    let hook = result.unwrap().expect("hook on the last page should be found");
    assert_eq!(hook.id, 3);
}

#[tokio::test]
async fn test_find_repository_hook_stops_without_next_page() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/acme/widgets/hooks"))
        .and(query_param("page", "1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([hook_json(1, "https://other.example.com/a")])),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server);

    let result = client
        .find_repository_hook("acme", "widgets", CALLBACK_URL)
        .await
        .unwrap();

    assert!(result.is_none());
}

#[tokio::test]
async fn test_find_repository_hook_treats_404_as_absent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/acme/widgets/hooks"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "message": "Not Found",
            "documentation_url": "https://docs.github.com/rest"
        })))
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server);

    let result = client
        .find_repository_hook("acme", "widgets", CALLBACK_URL)
        .await;

    assert!(matches!(result, Ok(None)));
}

#[tokio::test]
async fn test_find_repository_hook_surfaces_server_errors() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/acme/widgets/hooks"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({
            "message": "Service Unavailable"
        })))
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server);

    let result = client
        .find_repository_hook("acme", "widgets", CALLBACK_URL)
        .await;

    match result {
        Err(e) => assert!(e.is_transient(), "unexpected error {e:?}"),
        Ok(v) => panic!("Expected an error, got {v:?}"),
    }
}

#[tokio::test]
async fn test_find_org_repository_matches_exact_name() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/orgs/acme/repos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1, "name": "Widgets", "owner": { "login": "acme" } },
            { "id": 2, "name": "widgets", "owner": { "login": "acme" } }
        ])))
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server);

    let repo = client
        .find_org_repository("acme", "widgets")
        .await
        .unwrap()
        .expect("repository should be found");

    assert_eq!(repo.id(), 2);
}

#[tokio::test]
async fn test_find_org_repository_treats_404_as_absent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/orgs/octocat/repos"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "message": "Not Found"
        })))
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server);

    let result = client.find_org_repository("octocat", "widgets").await;

    assert!(matches!(result, Ok(None)));
}

#[tokio::test]
async fn test_find_user_repository_follows_pages() {
    let mock_server = MockServer::start().await;
    let route = "/users/octocat/repos";

    Mock::given(method("GET"))
        .and(path(route))
        .and(query_param("page", "1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{ "id": 1, "name": "spoon-knife" }]))
                .insert_header("link", next_link(&mock_server, route, 2).as_str()),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path(route))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 9, "name": "widgets", "full_name": "octocat/widgets" }
        ])))
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server);

    let repo = client
        .find_user_repository("octocat", "widgets")
        .await
        .unwrap()
        .expect("repository on page two should be found");

    assert_eq!(repo.id(), 9);
    assert_eq!(repo.owner_login(), Some("octocat"));
}

#[tokio::test]
async fn test_create_repository_hook_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/repos/acme/widgets/hooks"))
        .and(body_partial_json(json!({
            "name": "web",
            "active": true,
            "events": ["push"],
            "config": {
                "url": CALLBACK_URL,
                "content_type": "json",
                "insecure_ssl": "0",
                "secret": "s3cret"
            }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(hook_json(77, CALLBACK_URL)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server);
    let payload = WebhookPayload::new(
        true,
        vec!["push".to_string()],
        WebhookConfig {
            url: CALLBACK_URL.to_string(),
            content_type: Some("json".to_string()),
            insecure_ssl: false,
            secret: Some("s3cret".to_string()),
        },
    );

    let result = client
        .create_repository_hook("acme", "widgets", &payload)
        .await;

    if let Err(e) = &result {
        eprintln!("create_repository_hook error: {e:?}");
    }
    assert_eq!(result.unwrap().id, 77);
}

#[tokio::test]
async fn test_update_repository_hook_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/repos/acme/widgets/hooks/77"))
        .and(body_partial_json(json!({ "active": false })))
        .respond_with(ResponseTemplate::new(200).set_body_json(hook_json(77, CALLBACK_URL)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server);
    let payload = WebhookPayload::new(
        false,
        vec!["push".to_string()],
        WebhookConfig {
            url: CALLBACK_URL.to_string(),
            content_type: Some("json".to_string()),
            insecure_ssl: false,
            secret: None,
        },
    );

    let result = client
        .update_repository_hook("acme", "widgets", 77, &payload)
        .await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn test_delete_repository_hook_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/repos/acme/widgets/hooks/77"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server);

    let result = client.delete_repository_hook("acme", "widgets", 77).await;

    if let Err(e) = &result {
        eprintln!("delete_repository_hook error: {e:?}");
    }
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_delete_repository_hook_api_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/repos/acme/widgets/hooks/77"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "message": "Server Error"
        })))
        .mount(&mock_server)
        .await;

    let client = create_client(&mock_server);

    let result = client.delete_repository_hook("acme", "widgets", 77).await;

    assert!(matches!(result, Err(Error::ApiError { status: 500, .. })));
}

#[tokio::test]
async fn test_create_token_client_rejects_relative_base_url() {
    let result = create_token_client("token", Some("not a url"));

    assert!(matches!(result, Err(Error::ClientConstruction(_))));
}

#[tokio::test]
async fn test_create_token_client_rejects_non_http_scheme() {
    let result = create_token_client("token", Some("ftp://ghe.example.com/api/v3"));

    assert!(matches!(result, Err(Error::ClientConstruction(_))));
}

#[tokio::test]
async fn test_create_token_client_accepts_defaults() {
    assert!(create_token_client("token", None).is_ok());
    assert!(create_token_client("", Some("")).is_ok());
    assert!(create_token_client("token", Some("https://ghe.example.com/api/v3/")).is_ok());
}

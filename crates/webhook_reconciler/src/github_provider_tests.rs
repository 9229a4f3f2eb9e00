use super::*;
use crate::errors::ReconcileError;

fn provider() -> GitHubProvider {
    GitHubProvider::new(GitHubClient::with_token("", None).unwrap())
}

fn spec(events: &[&str]) -> WebhookSpec {
    serde_json::from_value(serde_json::json!({
        "gitHub": {},
        "repositoryOwner": "acme",
        "repositoryName": "widgets",
        "webhookURL": "https://ci.example.com/hook",
        "events": events
    }))
    .unwrap()
}

fn actual_hook() -> Webhook {
    serde_json::from_value(serde_json::json!({
        "type": "Repository",
        "id": 12345,
        "name": "web",
        "active": true,
        "events": ["pull_request", "push"],
        "config": {
            "url": "https://ci.example.com/hook",
            "content_type": "json",
            "insecure_ssl": "0",
            "secret": "********"
        },
        "created_at": "2024-01-01T00:00:00Z",
        "updated_at": "2024-06-01T00:00:00Z",
        "url": "https://api.github.com/repos/acme/widgets/hooks/12345",
        "test_url": "https://api.github.com/repos/acme/widgets/hooks/12345/test",
        "ping_url": "https://api.github.com/repos/acme/widgets/hooks/12345/pings",
        "last_response": { "code": 200, "status": "active", "message": "OK" }
    }))
    .unwrap()
}

#[test]
fn test_github_events_deduplicates_and_sorts() {
    let events = github_events(&["push".into(), "issues".into(), "push".into()]).unwrap();

    assert_eq!(events, vec!["issues", "push"]);
}

#[test]
fn test_github_events_rejects_unknown_name() {
    let error = github_events(&["push".into(), "not_a_real_event".into()]).unwrap_err();

    assert_eq!(
        error,
        ValidationError::UnknownEventType("not_a_real_event".to_string())
    );
}

#[test]
fn test_github_events_accepts_repository_hook_events() {
    let names: Vec<String> = [
        "deploy_key",
        "dependabot_alert",
        "repository_vulnerability_alert",
        "project_card",
        "repository_ruleset",
        "security_and_analysis",
        "custom_property_values",
    ]
    .iter()
    .map(|name| name.to_string())
    .collect();

    let events = github_events(&names).unwrap();

    assert_eq!(events.len(), names.len());
    assert!(events.contains(&"deploy_key".to_string()));
}

#[test]
fn test_github_events_defaults_to_push() {
    assert_eq!(github_events(&[]).unwrap(), vec!["push"]);
}

#[tokio::test]
async fn test_empty_event_list_matches_stored_default() {
    let provider = provider();
    let mut hook = actual_hook();
    hook.events = vec!["push".to_string()];

    let view = provider
        .build_desired_view(&spec(&[]), &SecretString::from(String::new()))
        .unwrap();

    assert_eq!(view.events, vec!["push"]);
    assert!(provider
        .normalize_desired_view(&view)
        .is_equivalent(&provider.normalize_actual_view(&hook)));
}

#[tokio::test]
async fn test_desired_view_trims_callback_url() {
    let mut spec = spec(&["push"]);
    spec.webhook_url = "  https://ci.example.com/hook \n".to_string();

    let view = provider()
        .build_desired_view(&spec, &SecretString::from(String::new()))
        .unwrap();

    assert_eq!(view.config.url, "https://ci.example.com/hook");
}

#[tokio::test]
async fn test_desired_view_carries_secret_and_settings() {
    let mut spec = spec(&["push"]);
    spec.insecure_ssl = true;
    spec.content_type = "form".to_string();

    let view = provider()
        .build_desired_view(&spec, &SecretString::from("s3cret".to_string()))
        .unwrap();

    assert_eq!(view.name, "web");
    assert!(view.active);
    assert_eq!(view.events, vec!["push"]);
    assert_eq!(view.config.secret.as_deref(), Some("s3cret"));
    assert_eq!(view.config.content_type.as_deref(), Some("form"));
    assert!(view.config.insecure_ssl);
}

#[tokio::test]
async fn test_desired_view_rejects_unknown_event() {
    let result = provider().build_desired_view(
        &spec(&["not_a_real_event"]),
        &SecretString::from(String::new()),
    );

    assert!(matches!(
        result,
        Err(ReconcileError::Validation(ValidationError::UnknownEventType(_)))
    ));
}

#[tokio::test]
async fn test_volatile_fields_and_secret_are_ignored() {
    let provider = provider();
    let view = provider
        .build_desired_view(
            &spec(&["push", "pull_request"]),
            &SecretString::from("different".to_string()),
        )
        .unwrap();

    let desired = provider.normalize_desired_view(&view);
    let actual = provider.normalize_actual_view(&actual_hook());

    assert!(desired.is_equivalent(&actual), "{:?}", desired.differences(&actual));
}

#[tokio::test]
async fn test_insecure_ssl_encodings_compare_equal() {
    let provider = provider();
    let mut hook = actual_hook();
    hook.config = serde_json::from_value(serde_json::json!({
        "url": "https://ci.example.com/hook",
        "content_type": "json",
        "insecure_ssl": 1
    }))
    .unwrap();
    let mut spec = spec(&["push", "pull_request"]);
    spec.insecure_ssl = true;

    let view = provider
        .build_desired_view(&spec, &SecretString::from(String::new()))
        .unwrap();

    assert!(provider
        .normalize_desired_view(&view)
        .is_equivalent(&provider.normalize_actual_view(&hook)));
}

#[tokio::test]
async fn test_inactive_hook_differs() {
    let provider = provider();
    let mut hook = actual_hook();
    hook.active = false;
    let view = provider
        .build_desired_view(&spec(&["push", "pull_request"]), &SecretString::from(String::new()))
        .unwrap();

    let differences = provider
        .normalize_desired_view(&view)
        .differences(&provider.normalize_actual_view(&hook));

    assert_eq!(differences, vec!["active"]);
}

use super::*;

fn hook() -> ComparableHook {
    ComparableHook {
        url: "https://ci.example.com/hook".to_string(),
        events: BTreeSet::from(["push".to_string(), "pull_request".to_string()]),
        active: Some(true),
        content_type: Some("json".to_string()),
        insecure_ssl: false,
        branch_filter: None,
    }
}

#[test]
fn test_identical_hooks_are_equivalent() {
    assert!(hook().is_equivalent(&hook()));
    assert!(hook().differences(&hook()).is_empty());
}

#[test]
fn test_event_order_is_ignored() {
    let a = hook();
    let mut b = hook();
    b.events = ["pull_request", "push"].iter().map(|e| e.to_string()).collect();

    assert!(a.is_equivalent(&b));
}

#[test]
fn test_each_compared_field_is_detected() {
    let base = hook();

    let mut other = hook();
    other.url = "https://ci.example.com/other".to_string();
    assert_eq!(base.differences(&other), vec!["url"]);

    let mut other = hook();
    other.events.insert("release".to_string());
    assert_eq!(base.differences(&other), vec!["events"]);

    let mut other = hook();
    other.active = Some(false);
    assert_eq!(base.differences(&other), vec!["active"]);

    let mut other = hook();
    other.content_type = Some("form".to_string());
    assert_eq!(base.differences(&other), vec!["content_type"]);

    let mut other = hook();
    other.insecure_ssl = true;
    assert_eq!(base.differences(&other), vec!["insecure_ssl"]);

    let mut other = hook();
    other.branch_filter = Some("main".to_string());
    assert_eq!(base.differences(&other), vec!["branch_filter"]);
}

#[test]
fn test_multiple_differences_are_reported_in_order() {
    let base = hook();
    let mut other = hook();
    other.insecure_ssl = true;
    other.url = "https://elsewhere.example.com".to_string();

    assert_eq!(base.differences(&other), vec!["url", "insecure_ssl"]);
}

#[test]
fn test_normalize_branch_filter() {
    assert_eq!(normalize_branch_filter(None), None);
    assert_eq!(normalize_branch_filter(Some("")), None);
    assert_eq!(normalize_branch_filter(Some("  ")), None);
    assert_eq!(
        normalize_branch_filter(Some("release/*")),
        Some("release/*".to_string())
    );
}

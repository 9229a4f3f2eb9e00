use super::*;

#[test]
fn test_project_deserialization_ignores_unknown_fields() {
    let json = r#"{
        "id": 4,
        "description": null,
        "name": "Diaspora Client",
        "path": "diaspora-client",
        "path_with_namespace": "diaspora/diaspora-client",
        "namespace": { "id": 3, "name": "Diaspora", "full_path": "diaspora", "kind": "group" },
        "default_branch": "main"
    }"#;

    let project: Project = serde_json::from_str(json).unwrap();

    assert_eq!(project.id, 4);
    assert_eq!(project.name, "Diaspora Client");
    assert_eq!(project.owner(), Some("diaspora"));
}

#[test]
fn test_project_without_namespace() {
    let project: Project = serde_json::from_str(r#"{ "id": 1, "name": "widgets" }"#).unwrap();

    assert_eq!(project.owner(), None);
    assert!(project.path_with_namespace.is_none());
}

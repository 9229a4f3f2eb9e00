use super::*;
use std::fs;
use tempfile::TempDir;

const SAMPLE: &str = r#"
timeout_seconds = 10

[secrets]
backend = "file"
base_path = "/var/run/secrets"

[[webhooks]]
namespace = "ci"
name = "widgets-hook"
repositoryOwner = "acme"
repositoryName = "widgets"
webhookURL = "https://ci.example.com/hook"
events = ["push_events"]
webhookSecret = { name = "hook-secret" }

[webhooks.gitLab]
gitAPIServerURL = "https://gitlab.example.com"
gitServerCredentials = { name = "gitlab-token" }

[[webhooks]]
namespace = "ci"
name = "gadgets-hook"
repositoryOwner = "acme"
repositoryName = "gadgets"
webhookURL = "https://ci.example.com/hook"
events = ["push", "pull_request"]
insecureSSL = true

[webhooks.gitHub]
"#;

fn write_config(dir: &TempDir, content: &str) -> PathBuf {
    let path = dir.path().join(DEFAULT_CONFIG_FILENAME);
    fs::write(&path, content).expect("Failed to write config");
    path
}

#[test]
fn test_app_config_default() {
    let config: AppConfig = toml::from_str("").unwrap();

    assert_eq!(config.secrets.backend, SecretBackend::Env);
    assert_eq!(config.timeout_seconds, DEFAULT_TIMEOUT_SECONDS);
    assert!(config.webhooks.is_empty());
}

#[test]
fn test_app_config_load_sample() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let path = write_config(&temp_dir, SAMPLE);

    let config = AppConfig::load(&path).unwrap();

    assert_eq!(config.timeout(), Duration::from_secs(10));
    assert_eq!(config.secrets.backend, SecretBackend::File);
    assert_eq!(config.webhooks.len(), 2);

    let gitlab = &config.webhooks[0];
    assert_eq!(gitlab.display_name(), "ci/widgets-hook");
    assert_eq!(
        gitlab.gitlab.as_ref().unwrap().git_server_credentials.name,
        "gitlab-token"
    );
    assert!(gitlab.active);
    assert_eq!(gitlab.content_type, "json");

    let github = &config.webhooks[1];
    assert!(github.github.is_some());
    assert!(github.insecure_ssl);
    assert!(github.validate().is_ok());
}

#[test]
fn test_app_config_load_invalid_toml() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let path = write_config(&temp_dir, "invalid = toml = syntax");

    let result = AppConfig::load(&path);

    if let Err(Error::Config(msg)) = result {
        assert!(msg.contains("Failed to parse configuration file"));
    } else {
        panic!("Expected Config error");
    }
}

#[test]
fn test_app_config_load_nonexistent_file() {
    let result = AppConfig::load(&PathBuf::from("nonexistent_config.toml"));

    if let Err(Error::Config(msg)) = result {
        assert!(msg.contains("Configuration file not found"));
    } else {
        panic!("Expected Config error");
    }
}

#[test]
fn test_select_by_name_and_display_name() {
    let config: AppConfig = toml::from_str(SAMPLE).unwrap();

    let all = config.select(&[]).unwrap();
    assert_eq!(all.len(), 2);

    let selected = config
        .select(&["ci/gadgets-hook".to_string(), "widgets-hook".to_string()])
        .unwrap();
    assert_eq!(selected[0].name, "gadgets-hook");
    assert_eq!(selected[1].name, "widgets-hook");
}

#[test]
fn test_select_unknown_name() {
    let config: AppConfig = toml::from_str(SAMPLE).unwrap();

    let result = config.select(&["missing".to_string()]);

    assert!(matches!(result, Err(Error::InvalidArguments(_))));
}

#[test]
fn test_file_backend_requires_base_path() {
    let secrets = SecretsConfig {
        backend: SecretBackend::File,
        base_path: None,
    };

    assert!(matches!(secrets.resolver(), Err(Error::Config(_))));

    let secrets = SecretsConfig {
        backend: SecretBackend::File,
        base_path: Some(PathBuf::from("/var/run/secrets")),
    };
    assert!(secrets.resolver().is_ok());
}

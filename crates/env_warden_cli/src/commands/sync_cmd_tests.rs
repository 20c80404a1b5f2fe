use super::*;
use github_client::GitHubClient;
use octocrab::Octocrab;
use serde_json::json;
use std::fs;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn create_test_client(mock_server: &MockServer) -> Arc<dyn EnvironmentClient> {
    let octocrab = Octocrab::builder()
        .base_uri(mock_server.uri())
        .unwrap()
        .personal_token("test-token".to_string())
        .build()
        .unwrap();
    Arc::new(GitHubClient::new(octocrab))
}

fn repository() -> RepositoryIdentity {
    "octo-org/app".parse().unwrap()
}

fn write_document(dir: &TempDir, content: &str) -> PathBuf {
    let path = dir.path().join("environments.yaml");
    fs::write(&path, content).expect("Failed to write document");
    path
}

#[tokio::test]
async fn test_missing_document_is_an_error() {
    let mock_server = MockServer::start().await;
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let args = SyncArgs {
        config_path: temp_dir.path().join("missing.yaml"),
        dry_run: false,
    };

    let error = execute(&args, create_test_client(&mock_server), repository())
        .await
        .unwrap_err();

    assert!(error
        .to_string()
        .starts_with("Failed to load config from "));
}

#[tokio::test]
async fn test_dry_run_only_reads() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octo-org/app/environments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total_count": 1,
            "environments": [{ "id": 7, "name": "legacy" }]
        })))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/octo-org/app/environments/production"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "message": "Not Found",
            "documentation_url": "https://docs.github.com/rest"
        })))
        .mount(&mock_server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let args = SyncArgs {
        config_path: write_document(&temp_dir, "environments:\n  production:\n    wait_timer: 5\n"),
        dry_run: true,
    };

    let outputs = execute(&args, create_test_client(&mock_server), repository())
        .await
        .unwrap();

    assert_eq!(outputs.get("status"), Some("success"));
    assert_eq!(
        outputs.get("message"),
        Some("All environments configured successfully")
    );
}

#[tokio::test]
async fn test_list_failure_is_reported_in_outputs() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/octo-org/app/environments"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "message": "Bad credentials",
            "documentation_url": "https://docs.github.com/rest"
        })))
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let args = SyncArgs {
        config_path: write_document(&temp_dir, "environments: []\n"),
        dry_run: false,
    };

    let outputs = execute(&args, create_test_client(&mock_server), repository())
        .await
        .unwrap();

    assert!(outputs.is_failure());
    assert_eq!(
        outputs.get("message"),
        Some("Failed to get environments: Bad credentials")
    );
}

use super::*;
use crate::test_support::{environment, repository, Call, MockEnvironmentClient};
use crate::EnvWardenError;
use github_client::models::{EnvironmentUpdatePayload, Reviewer};
use github_client::Error;
use serde_json::json;

fn applier(client: &Arc<MockEnvironmentClient>) -> EnvironmentApplier {
    EnvironmentApplier::new(client.clone(), repository())
}

#[tokio::test]
async fn test_create_sends_single_put_with_resolved_reviewer() {
    let client = Arc::new(MockEnvironmentClient::new());
    let desired = EnvironmentConfig {
        reviewers: Some(vec![Reviewer::user(1, "alice")]),
        ..Default::default()
    };

    let outcome = applier(&client)
        .configure("production", &desired)
        .await
        .unwrap();

    assert_eq!(outcome.status, ApplyStatus::Success);
    assert_eq!(outcome.message, "Update successful: environment created.");
    assert_eq!(
        client.mutating_calls(),
        vec![Call::CreateOrUpdate(
            "production".to_string(),
            EnvironmentUpdatePayload {
                reviewers: Some(vec![Reviewer::user(1, "alice")]),
                ..Default::default()
            }
        )]
    );
    let body = serde_json::to_value(&client.put_payloads()[0].1).unwrap();
    assert_eq!(
        body,
        json!({ "reviewers": [{ "type": "User", "id": 1, "login": "alice" }] })
    );
}

#[tokio::test]
async fn test_update_reports_configuration_updated() {
    let client = Arc::new(
        MockEnvironmentClient::new().with_environment(
            "production",
            environment(json!({
                "name": "production",
                "protection_rules": [{ "type": "wait_timer", "wait_timer": 5 }]
            })),
        ),
    );
    let desired = EnvironmentConfig {
        wait_timer: Some(15),
        ..Default::default()
    };

    let outcome = applier(&client)
        .configure("production", &desired)
        .await
        .unwrap();

    assert_eq!(outcome.status, ApplyStatus::Success);
    assert_eq!(
        outcome.message,
        "Update successful: environment configuration updated."
    );
    assert_eq!(client.put_payloads()[0].1.wait_timer, Some(15));
}

#[tokio::test]
async fn test_matching_configuration_is_a_fixed_point() {
    let client = Arc::new(
        MockEnvironmentClient::new().with_environment(
            "production",
            environment(json!({
                "name": "production",
                "protection_rules": [
                    { "type": "wait_timer", "wait_timer": 5 },
                    {
                        "type": "required_reviewers",
                        "prevent_self_review": true,
                        "reviewers": [{ "type": "User", "reviewer": { "id": 1, "login": "alice" } }]
                    }
                ]
            })),
        ),
    );
    let desired = EnvironmentConfig {
        wait_timer: Some(5),
        reviewers: Some(vec![Reviewer::user(1, "alice")]),
        prevent_self_review: Some(true),
        deployment_branch_policy: None,
    };

    let outcome = applier(&client)
        .configure("production", &desired)
        .await
        .unwrap();

    assert_eq!(outcome.status, ApplyStatus::NoChange);
    assert_eq!(outcome.message, "No update required: environment is up to date.");
    assert!(client.mutating_calls().is_empty());
}

#[tokio::test]
async fn test_put_failure_propagates() {
    let client = Arc::new(
        MockEnvironmentClient::new().with_put_error(Error::api("Validation Failed", Some(422))),
    );

    let error = applier(&client)
        .configure("production", &EnvironmentConfig::default())
        .await
        .unwrap_err();

    assert_eq!(error.to_string(), "Validation Failed");
}

#[tokio::test]
async fn test_delete_missing_environment_is_no_change() {
    let client = Arc::new(MockEnvironmentClient::new());

    let outcome = applier(&client).delete("staging").await.unwrap();

    assert_eq!(outcome.status, ApplyStatus::NoChange);
    assert_eq!(
        outcome.message,
        "No update required: environment 'staging' does not exist."
    );
    assert_eq!(
        client.calls(),
        vec![Call::GetEnvironment("staging".to_string())]
    );
}

#[tokio::test]
async fn test_delete_null_record_is_no_change() {
    let client = Arc::new(MockEnvironmentClient::new().with_null_environment("staging"));

    let outcome = applier(&client).delete("staging").await.unwrap();

    assert_eq!(outcome.status, ApplyStatus::NoChange);
    assert!(client.mutating_calls().is_empty());
}

#[tokio::test]
async fn test_delete_existing_environment() {
    let client = Arc::new(MockEnvironmentClient::new().with_empty_environment("staging"));

    let outcome = applier(&client).delete("staging").await.unwrap();

    assert_eq!(outcome.status, ApplyStatus::Success);
    assert_eq!(outcome.message, "Update successful: environment 'staging' deleted.");
    assert_eq!(
        client.mutating_calls(),
        vec![Call::Delete("staging".to_string())]
    );
}

#[tokio::test]
async fn test_delete_existence_check_failure_propagates() {
    let client = Arc::new(
        MockEnvironmentClient::new()
            .with_environment_error("staging", Error::api("Server Error", Some(500))),
    );

    let error = applier(&client).delete("staging").await.unwrap_err();

    assert!(matches!(error, EnvWardenError::GitHub(_)));
    assert!(client.mutating_calls().is_empty());
}

#[tokio::test]
async fn test_delete_failure_propagates() {
    let client = Arc::new(
        MockEnvironmentClient::new()
            .with_empty_environment("staging")
            .with_delete_error(Error::api("Must have admin rights", Some(403))),
    );

    let error = applier(&client).delete("staging").await.unwrap_err();

    assert_eq!(error.to_string(), "Must have admin rights");
}

#[test]
fn test_status_strings() {
    assert_eq!(ApplyStatus::Success.to_string(), "success");
    assert_eq!(ApplyStatus::NoChange.to_string(), "nochange");
}

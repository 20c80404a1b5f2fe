use super::*;
use env_warden_core::EnvWardenError;

#[test]
fn test_config_error_display() {
    let error = Error::Config("No token provided".to_string());
    assert_eq!(error.to_string(), "Configuration error: No token provided");
}

#[test]
fn test_wrapped_errors_keep_their_message() {
    let error: Error = github_client::Error::api("Not Found", Some(404)).into();
    assert_eq!(error.to_string(), "Not Found");

    let error: Error = EnvWardenError::config_load("envs.yaml", "missing").into();
    assert_eq!(error.to_string(), "Failed to load config from envs.yaml: missing");
}

#[test]
fn test_write_outputs_error_display() {
    let error = Error::WriteOutputs {
        path: "/tmp/out".to_string(),
        source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
    };
    assert_eq!(error.to_string(), "Failed to write outputs to /tmp/out: denied");
}

#[test]
fn test_error_is_send_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Error>();
}

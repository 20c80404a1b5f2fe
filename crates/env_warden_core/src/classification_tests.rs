use super::*;

#[test]
fn test_is_not_found_matches_substring() {
    assert!(is_not_found(&Error::api("Not Found", Some(404))));
    assert!(is_not_found(&Error::api(
        "HttpError: Not Found - https://docs.github.com",
        None
    )));
}

#[test]
fn test_is_not_found_ignores_status_alone() {
    // The message is the signal, not the status code
    assert!(!is_not_found(&Error::api("Gone", Some(404))));
    assert!(!is_not_found(&Error::api("not found", None)));
}

#[test]
fn test_team_access_failure_sentinel() {
    assert!(is_team_access_failure(&Error::api("API Error", None)));
    assert!(!is_team_access_failure(&Error::api("API Error!", None)));
}

#[test]
fn test_team_access_failure_status_codes() {
    assert!(is_team_access_failure(&Error::api("Forbidden", Some(403))));
    assert!(is_team_access_failure(&Error::api("Gone", Some(404))));
    assert!(!is_team_access_failure(&Error::api("Server Error", Some(500))));
}

#[test]
fn test_team_access_failure_message_patterns() {
    for message in [
        "Team devs does not have access to org/repo",
        "Not Found",
        "Resource not accessible by integration",
        "Not Found or access denied",
    ] {
        assert!(
            is_team_access_failure(&Error::api(message, None)),
            "{message} should be an access failure"
        );
    }
}

#[test]
fn test_unexpected_errors_are_not_access_failures() {
    assert!(!is_team_access_failure(&Error::api("Network failure", None)));
    assert!(!is_team_access_failure(&Error::AuthError(
        "Bad credentials".to_string()
    )));
}

use stagehand::error::{CommandFailedDetails, TargetDetails};
use stagehand::output::{exit_code_for_error, map_cmd_result_to_json, CliResponse};
use stagehand::Error;

#[test]
fn command_failed_serializes_stdout_stderr() {
    let err = Error::command_failed(CommandFailedDetails {
        command: "git merge --ff-only origin/main".to_string(),
        exit_code: 128,
        stdout: "some stdout".to_string(),
        stderr: "fatal: Not possible to fast-forward, aborting.".to_string(),
        target: TargetDetails {
            host: Some("web1.example.net".to_string()),
        },
    });

    let json = CliResponse::<()>::from_error(&err).to_json().unwrap();

    assert!(json.contains("\"code\": \"command.failed\""));
    assert!(json.contains("some stdout"));
    assert!(json.contains("Not possible to fast-forward"));
    assert!(json.contains("\"exitCode\": 128"));
    assert!(json.contains("web1.example.net"));
}

#[test]
fn command_failure_surfaces_the_underlying_exit_code() {
    let err = Error::command_failed(CommandFailedDetails {
        command: "false".to_string(),
        exit_code: 7,
        stdout: String::new(),
        stderr: String::new(),
        target: TargetDetails { host: None },
    });

    let (_value, exit_code) = map_cmd_result_to_json::<serde_json::Value>(Err(err));

    assert_eq!(exit_code, 7);
}

#[test]
fn command_failure_without_usable_code_maps_to_20() {
    let err = Error::command_failed(CommandFailedDetails {
        command: "interrupted".to_string(),
        exit_code: -1,
        stdout: String::new(),
        stderr: String::new(),
        target: TargetDetails { host: None },
    });

    assert_eq!(exit_code_for_error(&err), 20);
}

#[test]
fn validation_errors_map_to_exit_code_2() {
    let err = Error::validation_invalid_argument("length", "Secret length must be at least 1", None);
    assert_eq!(exit_code_for_error(&err), 2);

    let err = Error::config_missing_key("host");
    assert_eq!(exit_code_for_error(&err), 2);
}

#[test]
fn env_errors_map_to_exit_code_3() {
    assert_eq!(exit_code_for_error(&Error::env_missing_key("KEY", ".env")), 3);
    assert_eq!(
        exit_code_for_error(&Error::env_type_coercion("FLAG", "true", "boolean", ".env")),
        3
    );
    assert_eq!(
        exit_code_for_error(&Error::env_malformed_line(".env", 4, "oops")),
        3
    );
}

#[test]
fn connection_and_transfer_errors_have_distinct_codes() {
    assert_eq!(
        exit_code_for_error(&Error::ssh_connect_failed("web1.example.net", "timed out")),
        10
    );
    assert_eq!(
        exit_code_for_error(&Error::transfer_failed("a", "b", "broken pipe")),
        21
    );
}

#[test]
fn missing_config_key_carries_a_hint() {
    let err = Error::config_missing_key("domain");
    let json = CliResponse::<()>::from_error(&err).to_json().unwrap();

    assert!(json.contains("\"code\": \"config.missing_key\""));
    assert!(json.contains("hints"));
    assert!(json.contains("--domain"));
}

#[test]
fn success_envelope_wraps_data() {
    let json = CliResponse::success(serde_json::json!({"command": "deploy"}))
        .to_json()
        .unwrap();

    assert!(json.contains("\"success\": true"));
    assert!(json.contains("\"command\": \"deploy\""));
    assert!(!json.contains("\"error\""));
}

//! A deployment whose local gate fails must stop before any remote work.

use stagehand::config::ProjectConfig;
use stagehand::deploy;

#[test]
fn failing_branch_gate_halts_before_remote_steps() {
    // A branch name nothing ever checks out: the first fail-fast step
    // (verify-branch) fails whether or not the test runs inside a git
    // checkout. The host is an invalid TLD, so had the pipeline reached a
    // remote step the error would be ssh.connect_failed instead.
    let config = ProjectConfig::new(
        None,
        Some("never-an-actual-branch".to_string()),
        None,
        Some("host.invalid".to_string()),
        Some("site.invalid".to_string()),
        None,
    );

    let err = deploy::deploy(&config, false).unwrap_err();

    assert!(
        matches!(
            err.code.as_str(),
            "command.failed" | "validation.invalid_argument"
        ),
        "expected a local gate failure, got {}",
        err.code.as_str()
    );
}

#[test]
fn unset_host_fails_before_any_step_runs() {
    let config = ProjectConfig::default();
    let err = deploy::deploy(&config, false).unwrap_err();
    assert_eq!(err.code.as_str(), "config.missing_key");
}

//! Source-control plumbing: host-tracking remotes and repository creation.

use serde::Serialize;

use crate::core::config::ProjectConfig;
use crate::core::error::Result;
use crate::core::session::Session;
use crate::log_status;
use crate::utils::shell;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchResult {
    pub remote_alias: String,
    pub remote_spec: String,
}

/// Make sure a git remote for the target host exists locally, then fetch
/// from it. Creation tolerates an already-existing remote; the fetch does
/// not tolerate failure.
pub fn ensure_remote_and_fetch(config: &ProjectConfig, local: &mut Session) -> Result<FetchResult> {
    let remote_spec = format!("{}:{}", config.host()?, config.domain()?);

    let added = local.try_run(&shell::render(
        "git",
        &["remote", "add", &config.remote_alias, &remote_spec],
    ))?;
    if !added.success {
        log_status!("repo", "Remote '{}' already present", config.remote_alias);
    }

    local.run(&shell::render("git", &["fetch", &config.remote_alias]))?;

    Ok(FetchResult {
        remote_alias: config.remote_alias.clone(),
        remote_spec,
    })
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryResult {
    pub service: String,
    pub organization: String,
    pub repository: String,
    pub branch: String,
}

/// Create a private GitHub repository and push the configured branch.
pub fn create_github_repository(
    config: &ProjectConfig,
    organization: &str,
    repository: &str,
    local: &mut Session,
) -> Result<RepositoryResult> {
    local.run(&shell::render(
        "gh",
        &[
            "repo",
            "create",
            &format!("{}/{}", organization, repository),
            "--private",
        ],
    ))?;
    local.run(&shell::render(
        "git",
        &["push", "-u", "origin", &config.branch],
    ))?;

    Ok(RepositoryResult {
        service: "github".to_string(),
        organization: organization.to_string(),
        repository: repository.to_string(),
        branch: config.branch.clone(),
    })
}

/// Create a private Bitbucket repository via its API and push the
/// configured branch.
pub fn create_bitbucket_repository(
    config: &ProjectConfig,
    username: &str,
    password: &str,
    organization: &str,
    repository: &str,
    local: &mut Session,
) -> Result<RepositoryResult> {
    local.run(&shell::render(
        "curl",
        &[
            "-X",
            "POST",
            "-u",
            &format!("{}:{}", username, password),
            "-H",
            "content-type: application/json",
            &format!(
                "https://api.bitbucket.org/2.0/repositories/{}/{}",
                organization, repository
            ),
            "-d",
            r#"{"scm": "git", "is_private": true, "forking_policy": "no_public_forks"}"#,
        ],
    ))?;
    local.run(&shell::render(
        "git",
        &[
            "remote",
            "add",
            "origin",
            &format!("git@bitbucket.org:{}/{}.git", organization, repository),
        ],
    ))?;
    local.run(&shell::render(
        "git",
        &["push", "-u", "origin", &config.branch],
    ))?;

    Ok(RepositoryResult {
        service: "bitbucket".to_string(),
        organization: organization.to_string(),
        repository: repository.to_string(),
        branch: config.branch.clone(),
    })
}

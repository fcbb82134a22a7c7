use std::path::PathBuf;

use clap::{Args, ValueEnum};
use serde::Serialize;

use stagehand::config::ProjectConfig;
use stagehand::envfile::EnvFile;
use stagehand::repo::{self, FetchResult, RepositoryResult};
use stagehand::session::Session;
use stagehand::Error;

use super::CmdResult;
use crate::tty;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Service {
    Github,
    Bitbucket,
}

#[derive(Args)]
pub struct RepoArgs {
    /// Hosting service to create the repository on
    #[arg(long, value_enum, default_value = "github")]
    pub service: Service,

    /// Organization owning the new repository
    #[arg(long)]
    pub organization: Option<String>,

    /// Repository name (defaults to the configured domain)
    #[arg(long)]
    pub repository: Option<String>,
}

#[derive(Serialize)]
pub struct FetchOutput {
    pub command: String,
    #[serde(flatten)]
    pub result: FetchResult,
}

#[derive(Serialize)]
pub struct RepoOutput {
    pub command: String,
    #[serde(flatten)]
    pub result: RepositoryResult,
}

pub fn fetch(config: &ProjectConfig) -> CmdResult<FetchOutput> {
    let mut local = Session::local();
    let result = repo::ensure_remote_and_fetch(config, &mut local)?;

    Ok((
        FetchOutput {
            command: "fetch-from-host".to_string(),
            result,
        },
        0,
    ))
}

pub fn create(args: RepoArgs, config: &ProjectConfig) -> CmdResult<RepoOutput> {
    let box_env = load_box_env()?;
    let defaults = |key: &str| -> String {
        box_env
            .as_ref()
            .map(|env| env.str_or(key, ""))
            .unwrap_or_default()
    };

    let mut local = Session::local();

    let result = match args.service {
        Service::Github => {
            let organization = resolve(
                args.organization,
                "Organization",
                defaults("GITHUB_ORGANIZATION"),
            )?;
            let repository = resolve(
                args.repository,
                "Repository",
                config.domain().unwrap_or("").to_string(),
            )?;
            repo::create_github_repository(config, &organization, &repository, &mut local)?
        }
        Service::Bitbucket => {
            let username = resolve(None, "Username", defaults("BITBUCKET_USERNAME"))?;
            let password = resolve(None, "Password", defaults("BITBUCKET_PASSWORD"))?;
            let organization = resolve(
                args.organization,
                "Organization",
                defaults("BITBUCKET_ORGANIZATION"),
            )?;
            let repository = resolve(
                args.repository,
                "Repository",
                config.domain().unwrap_or("").to_string(),
            )?;
            repo::create_bitbucket_repository(
                config,
                &username,
                &password,
                &organization,
                &repository,
                &mut local,
            )?
        }
    };

    Ok((
        RepoOutput {
            command: "create-remote-repository-and-push".to_string(),
            result,
        },
        0,
    ))
}

/// Operator defaults live in `~/.box.env`; a missing file is fine, a
/// malformed one is not.
fn load_box_env() -> stagehand::Result<Option<EnvFile>> {
    let path = PathBuf::from(shellexpand::tilde("~/.box.env").to_string());
    if !path.exists() {
        return Ok(None);
    }
    EnvFile::load(&path).map(Some)
}

/// Resolve a value from, in order: explicit flag, interactive prompt with
/// a default, the bare default.
fn resolve(flag: Option<String>, label: &str, default: String) -> stagehand::Result<String> {
    if let Some(value) = flag {
        return Ok(value);
    }

    let value = if tty::is_stdin_tty() {
        let input = tty::prompt(&format!("{} [{}]: ", label, default))?;
        if input.is_empty() {
            default
        } else {
            input
        }
    } else {
        default
    };

    if value.is_empty() {
        return Err(Error::validation_invalid_argument(
            label.to_lowercase(),
            format!("{} is required", label),
            None,
        ));
    }
    Ok(value)
}

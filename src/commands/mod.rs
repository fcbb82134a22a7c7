use clap::Args;

use stagehand::config::ProjectConfig;

pub type CmdResult<T> = stagehand::Result<(T, i32)>;

/// Configuration flags shared by every subcommand. Defaults follow the
/// project conventions; host and domain stay optional because purely local
/// commands never need them.
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Application package name inside the project tree
    #[arg(long, global = true)]
    pub app: Option<String>,

    /// Branch that is deployed and provisioned
    #[arg(long, global = true)]
    pub branch: Option<String>,

    /// Name of the local git remote pointing at the target host
    #[arg(long, global = true)]
    pub remote: Option<String>,

    /// Target host
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// Target domain; also the project directory name on the host
    #[arg(long, global = true)]
    pub domain: Option<String>,

    /// Local project root
    #[arg(long, global = true)]
    pub project_root: Option<String>,
}

impl GlobalArgs {
    pub fn to_config(&self) -> ProjectConfig {
        ProjectConfig::new(
            self.app.clone(),
            self.branch.clone(),
            self.remote.clone(),
            self.host.clone(),
            self.domain.clone(),
            self.project_root.clone(),
        )
    }
}

pub mod db;
pub mod deploy;
pub mod dev;
pub mod local;
pub mod provision;
pub mod repo;
pub mod style;

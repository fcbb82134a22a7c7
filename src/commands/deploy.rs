use clap::Args;
use serde::Serialize;

use stagehand::config::ProjectConfig;
use stagehand::deploy;
use stagehand::pipeline::PipelineReport;

use super::CmdResult;

#[derive(Args)]
pub struct DeployArgs {
    /// Skip the static asset sync step (e.g. when no assets changed)
    #[arg(long)]
    pub skip_static: bool,
}

#[derive(Serialize)]
pub struct DeployOutput {
    pub command: String,
    pub host: String,
    pub domain: String,
    pub branch: String,
    pub report: PipelineReport,
}

pub fn run(args: DeployArgs, config: &ProjectConfig) -> CmdResult<DeployOutput> {
    let report = deploy::deploy(config, args.skip_static)?;

    Ok((
        DeployOutput {
            command: "deploy".to_string(),
            host: config.host()?.to_string(),
            domain: config.domain()?.to_string(),
            branch: config.branch.clone(),
            report,
        },
        0,
    ))
}

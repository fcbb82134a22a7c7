use clap::Args;
use serde::Serialize;

use stagehand::config::ProjectConfig;
use stagehand::local::{self, LocalEnvResult};
use stagehand::session::Session;

use super::CmdResult;

#[derive(Args)]
pub struct UpgradeArgs {
    /// Avoid pre-release versions of packages
    #[arg(long)]
    pub stable: bool,
}

#[derive(Serialize)]
pub struct LocalOutput {
    pub command: String,
}

#[derive(Serialize)]
pub struct SetupOutput {
    pub command: String,
    #[serde(flatten)]
    pub result: LocalEnvResult,
}

pub fn update() -> CmdResult<LocalOutput> {
    let mut session = Session::local();
    local::update(&mut session)?;

    Ok((
        LocalOutput {
            command: "update-local-environment".to_string(),
        },
        0,
    ))
}

pub fn setup(config: &ProjectConfig) -> CmdResult<SetupOutput> {
    let mut session = Session::local();
    let result = local::setup(config, &mut session)?;

    Ok((
        SetupOutput {
            command: "setup-local-environment".to_string(),
            result,
        },
        0,
    ))
}

pub fn upgrade(args: UpgradeArgs) -> CmdResult<LocalOutput> {
    let mut session = Session::local();
    local::upgrade(&mut session, args.stable)?;

    Ok((
        LocalOutput {
            command: "upgrade-requirements".to_string(),
        },
        0,
    ))
}

pub fn freeze() -> CmdResult<LocalOutput> {
    let mut session = Session::local();
    local::freeze(&mut session)?;

    Ok((
        LocalOutput {
            command: "freeze-requirements".to_string(),
        },
        0,
    ))
}

pub fn make_messages() -> CmdResult<LocalOutput> {
    let mut session = Session::local();
    local::make_messages(&mut session)?;

    Ok((
        LocalOutput {
            command: "make-messages".to_string(),
        },
        0,
    ))
}

pub fn compile_messages() -> CmdResult<LocalOutput> {
    let mut session = Session::local();
    local::compile_messages(&mut session)?;

    Ok((
        LocalOutput {
            command: "compile-messages".to_string(),
        },
        0,
    ))
}

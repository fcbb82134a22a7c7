use clap::Args;
use serde::Serialize;

use stagehand::devserver;

use super::CmdResult;

#[derive(Args)]
pub struct DevServerArgs {
    /// Address the backend advertises for browser access
    #[arg(long, default_value = "127.0.0.1")]
    pub bind: String,

    /// Backend server port (the front-end watcher uses 4000)
    #[arg(long, default_value_t = 8000)]
    pub port: u16,
}

#[derive(Serialize)]
pub struct DevServerOutput {
    pub command: String,
}

/// Interactive: child output goes straight to the terminal and the JSON
/// envelope is skipped by the response mode.
pub fn run(args: DevServerArgs) -> CmdResult<DevServerOutput> {
    let exit_code = devserver::run(&args.bind, args.port)?;

    Ok((
        DevServerOutput {
            command: "development-server".to_string(),
        },
        exit_code,
    ))
}

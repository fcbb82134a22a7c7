use serde::Serialize;

use stagehand::config::ProjectConfig;
use stagehand::session::Session;
use stagehand::style;

use super::CmdResult;

#[derive(Serialize)]
pub struct StyleOutput {
    pub command: String,
}

pub fn check(config: &ProjectConfig) -> CmdResult<StyleOutput> {
    let mut session = Session::local();
    style::check(config, &mut session)?;

    Ok((
        StyleOutput {
            command: "check-style".to_string(),
        },
        0,
    ))
}

pub fn format(config: &ProjectConfig) -> CmdResult<StyleOutput> {
    let mut session = Session::local();
    style::format(config, &mut session)?;

    Ok((
        StyleOutput {
            command: "format-code".to_string(),
        },
        0,
    ))
}

use serde::Serialize;

use stagehand::config::ProjectConfig;
use stagehand::db::{self, PullDatabaseResult};

use super::CmdResult;

#[derive(Serialize)]
pub struct DbOutput {
    pub command: String,
    #[serde(flatten)]
    pub result: PullDatabaseResult,
}

pub fn pull(config: &ProjectConfig) -> CmdResult<DbOutput> {
    let result = db::pull_database_copy(config)?;

    Ok((
        DbOutput {
            command: "pull-database-copy".to_string(),
            result,
        },
        0,
    ))
}

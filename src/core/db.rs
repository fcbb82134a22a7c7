//! Database synchronization from the target host.

use std::path::Path;

use serde::Serialize;

use crate::core::config::ProjectConfig;
use crate::core::envfile::EnvFile;
use crate::core::error::Result;
use crate::core::session::Session;
use crate::log_status;
use crate::utils::shell;

/// 'password' hashed with a constant salt, so pulling a copy does not force
/// everyone to log in again.
const KNOWN_PASSWORD_HASH: &str =
    "pbkdf2_sha256$216000$salt$xuFh/Jmp9ZyNeO4k67igyjH9t5hHZ84M69rSfrV2W/g=";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PullDatabaseResult {
    pub database: String,
    pub host: String,
    pub remote_env: String,
}

/// Tail of a connection URL: the database name.
pub fn dbname_from_dsn(dsn: &str) -> &str {
    dsn.rsplit('/').next().unwrap_or(dsn)
}

/// Replace the local database with a copy of the target host's and reset
/// all application passwords to a known value.
pub fn pull_database_copy(config: &ProjectConfig) -> Result<PullDatabaseResult> {
    let host = config.host()?.to_string();
    let domain = config.domain()?.to_string();

    let server_dsn = {
        let mut remote = Session::remote(&host);
        let env = EnvFile::fetch(&mut remote, &format!("{}/.env", domain))?;
        env.url("DATABASE_URL")?
        // the remote session closes here
    };

    let local_env = EnvFile::load(Path::new(".env"))?;
    let local_dsn = local_env.url("DATABASE_URL")?;
    let database = dbname_from_dsn(&local_dsn).to_string();

    let mut local = Session::local();

    let dropped = local.try_run(&shell::render("dropdb", &["--if-exists", &database]))?;
    if !dropped.success {
        log_status!("db", "dropdb: {}", dropped.stderr.trim());
    }
    local.run(&shell::render("createdb", &[&database]))?;

    // Stream the dump straight from the host into the fresh local database.
    local.run(&format!(
        "ssh {} -C {} | psql {}",
        shell::quote_arg(&host),
        shell::quote_arg(&format!("pg_dump -Ox {}", server_dsn)),
        shell::quote_arg(&local_dsn),
    ))?;

    reset_passwords(&mut local)?;

    Ok(PullDatabaseResult {
        database,
        host,
        remote_env: format!("{}/.env", domain),
    })
}

fn reset_passwords(session: &mut Session) -> Result<()> {
    let script = format!(
        "pw='{}';from django.contrib.auth import get_user_model as g;\
         g()._base_manager.update(password=pw)",
        KNOWN_PASSWORD_HASH
    );
    session.run(&shell::render(
        "venv/bin/python",
        &["manage.py", "shell", "-c", &script],
    ))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dsn_tail_is_the_database_name() {
        assert_eq!(
            dbname_from_dsn("postgres://user:pw@localhost:5432/shop_example_com"),
            "shop_example_com"
        );
        assert_eq!(dbname_from_dsn("justaname"), "justaname");
    }
}

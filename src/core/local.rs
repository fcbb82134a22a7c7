//! Local development-environment maintenance.
//!
//! Creates and refreshes the virtualenv and node_modules, keeps the local
//! `.env` seeded, and regenerates the dependency lockfile.

use std::path::Path;

use serde::Serialize;

use crate::core::config::ProjectConfig;
use crate::core::db;
use crate::core::envfile::EnvFile;
use crate::core::error::{Error, Result};
use crate::core::provision;
use crate::core::secrets;
use crate::core::session::Session;
use crate::log_status;
use crate::utils::io;
use crate::utils::shell;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalEnvResult {
    pub database: String,
    pub env_created: bool,
}

/// Pick the newest python3 interpreter available on PATH.
fn python3(session: &mut Session) -> Result<String> {
    const CANDIDATES: [&str; 4] = ["python3.12", "python3.11", "python3.10", "python3"];

    for candidate in CANDIDATES {
        let probe = session.try_run(&shell::render("command", &["-v", candidate]))?;
        if probe.success && !probe.stdout.trim().is_empty() {
            return Ok(candidate.to_string());
        }
    }

    Err(
        Error::internal_io("no python3 interpreter found on PATH".to_string(), None)
            .with_hint("Install python3 or add it to PATH"),
    )
}

/// Update virtualenv and node_modules to match the lockfiles, then migrate.
pub fn update(session: &mut Session) -> Result<()> {
    if !Path::new("venv").exists() {
        let python = python3(session)?;
        session.run(&shell::render(&python, &["-m", "venv", "venv"]))?;
    }
    session.run("venv/bin/python -m pip install -U pip wheel setuptools")?;
    session.run("venv/bin/python -m pip install -r requirements.txt")?;
    session.run(&shell::render("find", &[".", "-name", "*.pyc", "-delete"]))?;
    session.run("yarn")?;
    session.run("venv/bin/python manage.py migrate")?;
    Ok(())
}

/// Set up a local environment from scratch: wipe the dependency trees,
/// seed `.env`, create the database, then run a normal update.
pub fn setup(config: &ProjectConfig, session: &mut Session) -> Result<LocalEnvResult> {
    session.run("rm -rf node_modules venv")?;

    let env_created = ensure_local_env(config)?;
    let database = local_database_name(config)?;

    // The database may exist from a previous checkout; that is fine.
    let created = session.try_run(&shell::render("createdb", &[&database]))?;
    if !created.success {
        log_status!("local", "createdb: {}", created.stderr.trim());
    }

    update(session)?;

    Ok(LocalEnvResult {
        database,
        env_created,
    })
}

/// Write a local `.env` if none exists. Returns whether one was written.
pub fn ensure_local_env(config: &ProjectConfig) -> Result<bool> {
    let dotenv = Path::new(".env");
    if dotenv.exists() {
        return Ok(false);
    }

    let secret_key = secrets::generate(50, None)?;
    let database = provision::identifier_from_domain(config.domain()?);

    let content = format!(
        "DATABASE_URL=postgres://localhost:5432/{database}\n\
         CACHE_URL=hiredis://localhost:6379/1/?key_prefix={database}\n\
         SECRET_KEY={secret_key}\n\
         SENTRY_DSN=\n\
         ALLOWED_HOSTS=[\"*\"]\n\
         DEBUG=True\n"
    );
    io::write_file(dotenv, &content, "write local .env")?;
    log_status!("local", "Seeded .env for database '{}'", database);
    Ok(true)
}

/// Name of the local database, derived from the local `.env`.
pub fn local_database_name(config: &ProjectConfig) -> Result<String> {
    ensure_local_env(config)?;
    let env = EnvFile::load(Path::new(".env"))?;
    let dsn = env.url("DATABASE_URL")?;
    Ok(db::dbname_from_dsn(&dsn).to_string())
}

/// Re-create the virtualenv with the newest versions of all libraries and
/// freeze the result. `stable` avoids pre-release versions.
pub fn upgrade(session: &mut Session, stable: bool) -> Result<()> {
    session.run("rm -rf venv")?;
    let python = python3(session)?;
    session.run(&shell::render(&python, &["-m", "venv", "venv"]))?;
    session.run("venv/bin/python -m pip install -U pip wheel setuptools")?;

    let mut install = vec!["-m", "pip", "install", "-U", "-r", "requirements-to-freeze.txt"];
    if !stable {
        install.push("--pre");
    }
    session.run(&shell::render("venv/bin/python", &install))?;

    freeze(session)
}

/// Regenerate `requirements.txt` from the current virtualenv state.
pub fn freeze(session: &mut Session) -> Result<()> {
    session.run(
        "(printf \"# AUTOGENERATED, DO NOT EDIT\\n\\n\"; venv/bin/python -m pip freeze -l) \
         > requirements.txt",
    )?;
    Ok(())
}

/// Update the translation catalogs.
pub fn make_messages(session: &mut Session) -> Result<()> {
    session.run(
        "venv/bin/python manage.py makemessages -a --add-location file -i venv -i htmlcov",
    )?;
    session.run(
        "venv/bin/python manage.py makemessages -a --add-location file \
         -i venv -i htmlcov -i node_modules -i lib -d djangojs",
    )?;
    Ok(())
}

/// Compile the translation catalogs.
pub fn compile_messages(session: &mut Session) -> Result<()> {
    session.run(
        "venv/bin/python manage.py compilemessages -i venv -i htmlcov -i node_modules -i lib",
    )?;
    Ok(())
}

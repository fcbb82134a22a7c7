//! Coding-style gate and formatter battery.
//!
//! These are thin templates over external tools; the interesting part is
//! that the style gate is the first fail-fast step of every deploy and the
//! body of the pre-commit hook.

use crate::core::config::ProjectConfig;
use crate::core::error::{Error, Result};
use crate::core::session::Session;
use crate::utils::shell;

/// Fail unless the current branch matches the configured one. A deploy from
/// the wrong branch must never push.
pub fn ensure_branch(config: &ProjectConfig, session: &mut Session) -> Result<()> {
    let output = session.run("git rev-parse --abbrev-ref HEAD")?;
    let current = output.stdout.trim();

    if current != config.branch {
        return Err(Error::validation_invalid_argument(
            "branch",
            format!(
                "Current branch is '{}', should be '{}'",
                current, config.branch
            ),
            Some(current.to_string()),
        ));
    }
    Ok(())
}

/// Run the full style gate: Python linting, framework checks, then the
/// front-end linters.
pub fn check(config: &ProjectConfig, session: &mut Session) -> Result<()> {
    session.run(&shell::render(
        "pipx",
        &["run", "--spec", "flake8>=3.8.3", "flake8", "."],
    ))?;
    session.run("venv/bin/python manage.py check")?;
    session.run(&shell::render(
        "node_modules/.bin/prettier",
        &[
            "--list-different",
            "--no-semi",
            "*.js",
            &format!("{}/static/**/*.js", config.app),
            &format!("{}/static/**/*.scss", config.app),
        ],
    ))?;
    session.run(&shell::render(
        "node_modules/.bin/eslint",
        &["*.js", &format!("{}/static", config.app)],
    ))?;
    Ok(())
}

/// Rewrite the tree with the formatter battery.
pub fn format(config: &ProjectConfig, session: &mut Session) -> Result<()> {
    session.run(&shell::render(
        "pipx",
        &[
            "run",
            "--spec",
            "isort>=5.4",
            "isort",
            "--virtual-env",
            "venv",
            "--profile=black",
            "--lines-after-imports=2",
            "--combine-as",
            ".",
        ],
    ))?;
    session.run(&shell::render(
        "pipx",
        &["run", "--spec", "black>=20.8b1", "black", "."],
    ))?;
    session.run(&shell::render(
        "node_modules/.bin/prettier",
        &[
            "--write",
            "--no-semi",
            "*.js",
            &format!("{}/static/**/*.js", config.app),
            &format!("{}/static/**/*.scss", config.app),
        ],
    ))?;
    Ok(())
}

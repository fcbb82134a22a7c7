//! Pre-commit hook installation.
//!
//! The hook runs the style gate before every local commit. Installation is
//! re-checked on every invocation but an existing hook is never overwritten.

use crate::core::config::ProjectConfig;
use crate::core::error::Result;
use crate::log_status;
use crate::utils::io;

const HOOK_SCRIPT: &str = "#!/bin/sh\nstagehand check-style\n";

/// Install the pre-commit hook if the project is a git checkout and no hook
/// exists yet. Returns whether a hook was written.
pub fn install_pre_commit(config: &ProjectConfig) -> Result<bool> {
    let hooks_dir = config.project_root.join(".git").join("hooks");
    if !hooks_dir.is_dir() {
        // Not a repository (unpacked tarball, test sandbox); nothing to do.
        return Ok(false);
    }

    let hook_path = hooks_dir.join("pre-commit");
    if hook_path.exists() {
        return Ok(false);
    }

    io::write_executable(&hook_path, HOOK_SCRIPT, "install pre-commit hook")?;
    log_status!("hooks", "Installed pre-commit hook");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn config_at(root: &Path) -> ProjectConfig {
        ProjectConfig::new(None, None, None, None, None, Some(root.display().to_string()))
    }

    #[test]
    fn installs_into_a_fresh_checkout() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join(".git/hooks")).unwrap();

        assert!(install_pre_commit(&config_at(dir.path())).unwrap());

        let hook = dir.path().join(".git/hooks/pre-commit");
        assert_eq!(std::fs::read_to_string(&hook).unwrap(), HOOK_SCRIPT);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&hook).unwrap().permissions().mode();
            assert_eq!(mode & 0o111, 0o111);
        }
    }

    #[test]
    fn second_install_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join(".git/hooks")).unwrap();

        assert!(install_pre_commit(&config_at(dir.path())).unwrap());
        assert!(!install_pre_commit(&config_at(dir.path())).unwrap());
    }

    #[test]
    fn existing_hook_is_preserved() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join(".git/hooks")).unwrap();
        let hook = dir.path().join(".git/hooks/pre-commit");
        std::fs::write(&hook, "#!/bin/sh\nmake lint\n").unwrap();

        assert!(!install_pre_commit(&config_at(dir.path())).unwrap());
        assert_eq!(
            std::fs::read_to_string(&hook).unwrap(),
            "#!/bin/sh\nmake lint\n"
        );
    }

    #[test]
    fn skips_outside_a_repository() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!install_pre_commit(&config_at(dir.path())).unwrap());
    }
}

//! Per-invocation project configuration.
//!
//! Built once from CLI flags and defaults, then passed by reference into
//! every operation. Nothing here is global or persisted; pipelines stay
//! testable with an injected value.

use std::path::PathBuf;

use crate::core::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct ProjectConfig {
    /// Application package name inside the project tree.
    pub app: String,
    /// Branch that is deployed and provisioned.
    pub branch: String,
    /// Name of the local git remote pointing at the target host.
    pub remote_alias: String,
    /// Project root on the local machine.
    pub project_root: PathBuf,
    host: Option<String>,
    domain: Option<String>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            app: "app".to_string(),
            branch: "main".to_string(),
            remote_alias: "production".to_string(),
            project_root: PathBuf::from("."),
            host: None,
            domain: None,
        }
    }
}

impl ProjectConfig {
    pub fn new(
        app: Option<String>,
        branch: Option<String>,
        remote_alias: Option<String>,
        host: Option<String>,
        domain: Option<String>,
        project_root: Option<String>,
    ) -> Self {
        let defaults = Self::default();
        Self {
            app: app.unwrap_or(defaults.app),
            branch: branch.unwrap_or(defaults.branch),
            remote_alias: remote_alias.unwrap_or(defaults.remote_alias),
            project_root: project_root
                .map(|root| PathBuf::from(shellexpand::tilde(&root).to_string()))
                .unwrap_or(defaults.project_root),
            host,
            domain,
        }
    }

    /// Target host, required for every remote operation.
    pub fn host(&self) -> Result<&str> {
        self.host
            .as_deref()
            .ok_or_else(|| Error::config_missing_key("host"))
    }

    /// Target domain; also the project directory name on the host.
    pub fn domain(&self) -> Result<&str> {
        self.domain
            .as_deref()
            .ok_or_else(|| Error::config_missing_key("domain"))
    }

    /// Change the process working directory to the project root.
    ///
    /// Kept separate from construction and from hook installation; the
    /// top-level CLI binding invokes the two explicitly.
    pub fn enter_project_root(&self) -> Result<()> {
        std::env::set_current_dir(&self.project_root).map_err(|e| {
            Error::internal_io(
                e.to_string(),
                Some(format!("chdir {}", self.project_root.display())),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_conventions() {
        let config = ProjectConfig::default();
        assert_eq!(config.app, "app");
        assert_eq!(config.branch, "main");
        assert_eq!(config.remote_alias, "production");
    }

    #[test]
    fn unset_host_is_a_config_error() {
        let config = ProjectConfig::default();
        let err = config.host().unwrap_err();
        assert_eq!(err.code.as_str(), "config.missing_key");
    }

    #[test]
    fn explicit_values_override_defaults() {
        let config = ProjectConfig::new(
            Some("shop".to_string()),
            Some("production".to_string()),
            None,
            Some("web1.example.net".to_string()),
            Some("shop.example.com".to_string()),
            None,
        );
        assert_eq!(config.app, "shop");
        assert_eq!(config.branch, "production");
        assert_eq!(config.host().unwrap(), "web1.example.net");
        assert_eq!(config.domain().unwrap(), "shop.example.com");
    }
}

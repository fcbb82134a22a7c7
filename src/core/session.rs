//! Command execution against the local machine or one remote host.
//!
//! Every executed command line is echoed to stderr before it runs; the echo
//! is the operator's audit trail and is not configurable. Remote sessions
//! multiplex over an OpenSSH control master that is established lazily on
//! the first command and torn down when the session is dropped. Agent
//! forwarding is on for every remote session so that source-control
//! operations on the host can use the operator's local credentials.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::core::error::{CommandFailedDetails, Error, Result, TargetDetails};
use crate::log_status;
use crate::utils::shell;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Local,
    Remote { host: String },
}

#[derive(Debug)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
    pub exit_code: i32,
}

/// One logical session against a target. Exclusively owned by the scope
/// that created it; working-directory changes are stack-scoped.
pub struct Session {
    target: Target,
    dir_stack: Vec<String>,
    control: Option<ControlMaster>,
}

static SESSION_SEQ: AtomicU64 = AtomicU64::new(0);

impl Session {
    pub fn local() -> Self {
        Self {
            target: Target::Local,
            dir_stack: Vec::new(),
            control: None,
        }
    }

    /// Construct a remote session. No connection is made until the first
    /// command runs.
    pub fn remote(host: impl Into<String>) -> Self {
        Self {
            target: Target::Remote { host: host.into() },
            dir_stack: Vec::new(),
            control: None,
        }
    }

    pub fn target_label(&self) -> &str {
        match &self.target {
            Target::Local => "local",
            Target::Remote { host } => host,
        }
    }

    /// Whether the underlying network session has been established.
    pub fn is_connected(&self) -> bool {
        self.control.is_some()
    }

    /// Run `command` with the given working directory pushed for the
    /// duration of the closure. The previous directory stack is restored
    /// whether the closure succeeds or fails.
    pub fn in_dir<T>(
        &mut self,
        dir: impl Into<String>,
        f: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        self.dir_stack.push(dir.into());
        let result = f(self);
        self.dir_stack.pop();
        result
    }

    /// Fail-fast execution: a non-zero exit becomes a `command.failed`
    /// error carrying the command line, exit code and captured output.
    pub fn run(&mut self, command: &str) -> Result<CommandOutput> {
        let line = self.shell_line(command);
        let output = self.execute(&line)?;
        if output.success {
            return Ok(output);
        }

        Err(Error::command_failed(CommandFailedDetails {
            command: line,
            exit_code: output.exit_code,
            stdout: output.stdout,
            stderr: output.stderr,
            target: self.target_details(),
        }))
    }

    /// Tolerant execution: the result is handed back regardless of exit
    /// status and the caller decides whether to log and proceed.
    /// Connection establishment failures still propagate.
    pub fn try_run(&mut self, command: &str) -> Result<CommandOutput> {
        let line = self.shell_line(command);
        self.execute(&line)
    }

    fn target_details(&self) -> TargetDetails {
        TargetDetails {
            host: match &self.target {
                Target::Local => None,
                Target::Remote { host } => Some(host.clone()),
            },
        }
    }

    /// Compose the effective command line: the scoped directory stack as a
    /// `cd` chain, then the command itself.
    pub(crate) fn shell_line(&self, command: &str) -> String {
        if self.dir_stack.is_empty() {
            return command.to_string();
        }

        let mut parts: Vec<String> = self
            .dir_stack
            .iter()
            .map(|dir| format!("cd {}", shell::quote_path(dir)))
            .collect();
        parts.push(command.to_string());
        parts.join(" && ")
    }

    fn execute(&mut self, line: &str) -> Result<CommandOutput> {
        // Unconditional audit echo of the exact line about to run.
        eprintln!("[{}] $ {}", self.target_label(), line);

        match self.target.clone() {
            Target::Local => run_local(line),
            Target::Remote { host } => {
                let control_path = self.ensure_connected()?.to_path_buf();
                let output = Command::new("ssh")
                    .args(ssh_options(&control_path))
                    .arg(&host)
                    .arg(line)
                    .output()
                    .map_err(|e| {
                        Error::internal_io(e.to_string(), Some("spawn ssh".to_string()))
                    })?;

                let result = to_command_output(output);
                // ssh exit 255 is a connection error, not a remote command failure
                if result.exit_code == 255 {
                    return Err(Error::ssh_connect_failed(&host, result.stderr));
                }
                Ok(result)
            }
        }
    }

    fn ensure_connected(&mut self) -> Result<&Path> {
        let Target::Remote { host } = self.target.clone() else {
            return Err(Error::internal_io(
                "local session has no network connection".to_string(),
                None,
            ));
        };

        if self.control.is_none() {
            let control_path = std::env::temp_dir().join(format!(
                "stagehand-{}-{}.sock",
                std::process::id(),
                SESSION_SEQ.fetch_add(1, Ordering::Relaxed),
            ));

            // Agent forwarding belongs on the master; multiplexed channels
            // inherit it.
            let output = Command::new("ssh")
                .args(["-fN", "-A", "-o", "ControlMaster=yes"])
                .arg("-o")
                .arg(format!("ControlPath={}", control_path.display()))
                .args(connection_options())
                .arg(&host)
                .output()
                .map_err(|e| Error::internal_io(e.to_string(), Some("spawn ssh".to_string())))?;

            if !output.status.success() {
                return Err(Error::ssh_connect_failed(
                    &host,
                    String::from_utf8_lossy(&output.stderr).to_string(),
                ));
            }

            log_status!("ssh", "Session to {} established", host);
            self.control = Some(ControlMaster { host, control_path });
        }

        match &self.control {
            Some(control) => Ok(control.control_path.as_path()),
            None => Err(Error::internal_io(
                "control master not established".to_string(),
                None,
            )),
        }
    }

    /// Copy a local file to the target. Binary-transparent.
    pub fn upload(&mut self, local: &Path, remote: &str) -> Result<()> {
        match self.target.clone() {
            Target::Local => {
                std::fs::copy(local, remote).map_err(|e| {
                    Error::transfer_failed(local.display().to_string(), remote, e.to_string())
                })?;
                Ok(())
            }
            Target::Remote { host } => {
                let control_path = self.ensure_connected()?.to_path_buf();
                let destination = format!("{}:{}", host, remote);
                eprintln!(
                    "[{}] $ scp {} {}",
                    self.target_label(),
                    local.display(),
                    destination
                );

                let output = Command::new("scp")
                    .arg("-q")
                    .args(scp_options(&control_path))
                    .arg(local)
                    .arg(&destination)
                    .output()
                    .map_err(|e| {
                        Error::transfer_failed(
                            local.display().to_string(),
                            destination.clone(),
                            e.to_string(),
                        )
                    })?;

                if !output.status.success() {
                    return Err(Error::transfer_failed(
                        local.display().to_string(),
                        destination,
                        String::from_utf8_lossy(&output.stderr).to_string(),
                    ));
                }
                Ok(())
            }
        }
    }

    /// Copy a file from the target to a local path. Binary-transparent.
    pub fn download(&mut self, remote: &str, local: &Path) -> Result<()> {
        match self.target.clone() {
            Target::Local => {
                std::fs::copy(remote, local).map_err(|e| {
                    Error::transfer_failed(remote, local.display().to_string(), e.to_string())
                })?;
                Ok(())
            }
            Target::Remote { host } => {
                let control_path = self.ensure_connected()?.to_path_buf();
                let source = format!("{}:{}", host, remote);
                eprintln!(
                    "[{}] $ scp {} {}",
                    self.target_label(),
                    source,
                    local.display()
                );

                let output = Command::new("scp")
                    .arg("-q")
                    .args(scp_options(&control_path))
                    .arg(&source)
                    .arg(local)
                    .output()
                    .map_err(|e| {
                        Error::transfer_failed(
                            source.clone(),
                            local.display().to_string(),
                            e.to_string(),
                        )
                    })?;

                if !output.status.success() {
                    return Err(Error::transfer_failed(
                        source,
                        local.display().to_string(),
                        String::from_utf8_lossy(&output.stderr).to_string(),
                    ));
                }
                Ok(())
            }
        }
    }
}

/// Options shared by every remote invocation once the master exists.
fn ssh_options(control_path: &Path) -> Vec<String> {
    let mut options = vec![
        // Agent forwarding is the default for every remote session.
        "-A".to_string(),
        "-o".to_string(),
        format!("ControlPath={}", control_path.display()),
    ];
    options.extend(connection_options());
    options
}

fn scp_options(control_path: &Path) -> Vec<String> {
    let mut options = vec![
        "-o".to_string(),
        format!("ControlPath={}", control_path.display()),
    ];
    options.extend(connection_options());
    options
}

/// Timeout and keepalive options preventing hangs on stalled connections
/// or unexpected prompts.
fn connection_options() -> Vec<String> {
    [
        "BatchMode=yes",
        "ConnectTimeout=10",
        "ServerAliveInterval=15",
        "ServerAliveCountMax=3",
    ]
    .iter()
    .flat_map(|opt| ["-o".to_string(), opt.to_string()])
    .collect()
}

fn run_local(line: &str) -> Result<CommandOutput> {
    let output = Command::new("sh")
        .args(["-c", line])
        .output()
        .map_err(|e| Error::internal_io(e.to_string(), Some("spawn sh".to_string())))?;
    Ok(to_command_output(output))
}

fn to_command_output(output: std::process::Output) -> CommandOutput {
    CommandOutput {
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        success: output.status.success(),
        exit_code: output.status.code().unwrap_or(-1),
    }
}

struct ControlMaster {
    host: String,
    control_path: PathBuf,
}

impl Drop for ControlMaster {
    fn drop(&mut self) {
        // Ask the master to exit; stale sockets are cleaned up regardless.
        let _ = Command::new("ssh")
            .args(["-O", "exit"])
            .arg("-o")
            .arg(format!("ControlPath={}", self.control_path.display()))
            .arg(&self.host)
            .output();
        let _ = std::fs::remove_file(&self.control_path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_session_connects_lazily() {
        let session = Session::remote("app.example.com");
        assert!(!session.is_connected());
        assert_eq!(session.target_label(), "app.example.com");
    }

    #[test]
    fn shell_line_prefixes_scoped_directories() {
        let mut session = Session::local();
        assert_eq!(session.shell_line("git fetch"), "git fetch");

        session.dir_stack.push("example.com".to_string());
        session.dir_stack.push("sub dir".to_string());
        assert_eq!(
            session.shell_line("git fetch"),
            "cd 'example.com' && cd 'sub dir' && git fetch"
        );
    }

    #[test]
    fn in_dir_restores_stack_after_success() {
        let mut session = Session::local();
        session
            .in_dir("somewhere", |s| {
                assert_eq!(s.shell_line("ls"), "cd 'somewhere' && ls");
                Ok(())
            })
            .unwrap();
        assert_eq!(session.shell_line("ls"), "ls");
    }

    #[test]
    fn in_dir_restores_stack_after_failure() {
        let mut session = Session::local();
        let result: Result<()> = session.in_dir("somewhere", |_| {
            Err(Error::internal_io("boom".to_string(), None))
        });
        assert!(result.is_err());
        assert_eq!(session.shell_line("ls"), "ls");
    }

    #[test]
    fn run_after_failed_scope_uses_prior_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::local();

        let _ = session.in_dir(dir.path().display().to_string(), |s| {
            s.run("false").map(|_| ())
        });

        // The failed scope must not leak its directory into this run.
        let out = session.run("pwd").unwrap();
        assert_ne!(out.stdout.trim(), dir.path().display().to_string());
    }

    #[test]
    fn run_fails_fast_with_exit_status() {
        let mut session = Session::local();
        let err = session.run("exit 3").unwrap_err();
        assert_eq!(err.code.as_str(), "command.failed");
        assert_eq!(err.exit_status, Some(3));
    }

    #[test]
    fn try_run_tolerates_nonzero_exit() {
        let mut session = Session::local();
        let out = session.try_run("echo oops >&2; exit 5").unwrap();
        assert!(!out.success);
        assert_eq!(out.exit_code, 5);
        assert_eq!(out.stderr.trim(), "oops");
    }

    #[test]
    fn local_transfer_copies_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("a.bin");
        let destination = dir.path().join("b.bin");
        std::fs::write(&source, b"\x00\xffpayload").unwrap();

        let mut session = Session::local();
        session
            .upload(&source, &destination.display().to_string())
            .unwrap();
        assert_eq!(std::fs::read(&destination).unwrap(), b"\x00\xffpayload");
    }

    #[test]
    fn local_transfer_missing_source_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::local();
        let err = session
            .download("/definitely/not/here", &dir.path().join("out"))
            .unwrap_err();
        assert_eq!(err.code.as_str(), "transfer.failed");
    }
}

//! Local development server: backend dev server and front-end watcher as
//! two supervised child processes.
//!
//! Both children share one interrupt-driven cancellation signal. When the
//! operator interrupts, or when either child exits on its own, both are
//! terminated and reaped before returning, so neither can be orphaned.
//! Ordering between the two is unspecified; they only need to be alive
//! concurrently.

use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::core::error::{Error, Result};
use crate::log_status;
use crate::utils::shell;

const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Run both development processes until interrupt or first exit. Returns
/// the exit code the process should finish with.
pub fn run(bind: &str, port: u16) -> Result<i32> {
    log_status!("server", "Starting server at http://{}:{}/", bind, port);

    let backend = format!("venv/bin/python manage.py runserver 0.0.0.0:{}", port);
    let frontend = format!(
        "HOST={} node_modules/.bin/webpack-dev-server --host 0.0.0.0 --port 4000 --hot",
        shell::quote_arg(bind),
    );

    let interrupted = Arc::new(AtomicBool::new(false));
    {
        let flag = Arc::clone(&interrupted);
        ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst))
            .map_err(|e| Error::internal_io(e.to_string(), Some("install interrupt handler".to_string())))?;
    }

    let mut children = Vec::with_capacity(2);
    children.push(spawn(&backend)?);
    match spawn(&frontend) {
        Ok(child) => children.push(child),
        Err(err) => {
            // Never leave the first child orphaned behind a spawn failure.
            for (_, child) in children.iter_mut() {
                let _ = child.kill();
                let _ = child.wait();
            }
            return Err(err);
        }
    }

    let mut exit_code = 0;
    'supervise: loop {
        if interrupted.load(Ordering::SeqCst) {
            log_status!("server", "Interrupted, shutting down");
            break;
        }

        for (line, child) in children.iter_mut() {
            let status = child
                .try_wait()
                .map_err(|e| Error::internal_io(e.to_string(), Some("poll child".to_string())))?;
            if let Some(status) = status {
                let code = status.code().unwrap_or(-1);
                log_status!("server", "'{}' exited with {}", line, code);
                if code != 0 {
                    exit_code = code;
                }
                break 'supervise;
            }
        }

        std::thread::sleep(POLL_INTERVAL);
    }

    // Terminating one terminates the other: kill both, then wait for both.
    for (_, child) in children.iter_mut() {
        let _ = child.kill();
    }
    for (_, child) in children.iter_mut() {
        let _ = child.wait();
    }

    if interrupted.load(Ordering::SeqCst) {
        return Ok(0);
    }
    Ok(exit_code)
}

fn spawn(line: &str) -> Result<(String, Child)> {
    // Same audit echo as session-run commands.
    eprintln!("[local] $ {}", line);

    let child = Command::new("sh")
        .args(["-c", line])
        // Keep child output arriving as it happens, not on buffer flushes.
        .env("PYTHONUNBUFFERED", "yes")
        .stdin(Stdio::null())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .map_err(|e| Error::internal_io(e.to_string(), Some(format!("spawn '{}'", line))))?;

    Ok((line.to_string(), child))
}

//! The deployment pipeline: update code on an already-provisioned host and
//! restart its service.
//!
//! Ordering is deliberate. The style gate and the push run before any
//! remote mutation so a broken build never reaches the server; the
//! fast-forward-only merge guarantees this tool never rewrites the remote
//! working copy's history; static assets are synchronized before collection
//! so the collection step sees the final asset tree.

use crate::core::config::ProjectConfig;
use crate::core::error::Result;
use crate::core::pipeline::{Pipeline, PipelineReport, Step};
use crate::core::provision;
use crate::core::repo;
use crate::core::session::Session;
use crate::core::style;
use crate::log_status;
use crate::utils::shell;

struct DeployContext {
    config: ProjectConfig,
    local: Session,
    remote: Session,
    skip_static: bool,
}

/// Deploy once.
pub fn deploy(config: &ProjectConfig, skip_static: bool) -> Result<PipelineReport> {
    // Resolve required configuration before any step runs.
    let host = config.host()?.to_string();
    config.domain()?;

    let pipeline = Pipeline::new("deploy")
        .step(Step::fail_fast("verify-branch", |cx: &mut DeployContext| {
            style::ensure_branch(&cx.config, &mut cx.local)
        }))
        .step(Step::fail_fast("check-style", |cx: &mut DeployContext| {
            style::check(&cx.config, &mut cx.local)
        }))
        .step(Step::fail_fast("push-branch", |cx: &mut DeployContext| {
            cx.local
                .run(&shell::render("git", &["push", "origin", &cx.config.branch]))
                .map(|_| ())
        }))
        .step(Step::fail_fast("build-assets", |cx: &mut DeployContext| {
            cx.local
                .run("NODE_ENV=production node_modules/.bin/webpack -p --bail")
                .map(|_| ())
        }))
        .step(Step::fail_fast("update-remote-checkout", |cx: &mut DeployContext| {
            let branch = cx.config.branch.clone();
            let domain = cx.config.domain()?.to_string();
            cx.remote.in_dir(domain, |session| {
                session.run(&shell::render("git", &["checkout", &branch]))?;
                session.run("git fetch origin")?;
                // A non-fast-forward state is a conflict for the operator
                // to resolve; it is never auto-resolved here.
                session.run(&shell::render(
                    "git",
                    &["merge", "--ff-only", &format!("origin/{}", branch)],
                ))?;
                session.run(&shell::render("find", &[".", "-name", "*.pyc", "-delete"]))?;
                Ok(())
            })
        }))
        .step(Step::fail_fast("install-remote-requirements", |cx: &mut DeployContext| {
            let domain = cx.config.domain()?.to_string();
            cx.remote.in_dir(domain, |session| {
                session.run("venv/bin/python -m pip install -U pip wheel setuptools")?;
                session.run("venv/bin/python -m pip install -r requirements.txt")?;
                Ok(())
            })
        }))
        .step(Step::fail_fast("apply-migrations", |cx: &mut DeployContext| {
            let domain = cx.config.domain()?.to_string();
            cx.remote.in_dir(domain, |session| {
                session.run("venv/bin/python manage.py migrate")?;
                Ok(())
            })
        }))
        .step(Step::fail_fast("sync-static-assets", |cx: &mut DeployContext| {
            if cx.skip_static {
                log_status!("deploy", "Static asset sync skipped");
                return Ok(());
            }
            let destination =
                format!("{}:{}/static/", cx.config.host()?, cx.config.domain()?);
            cx.local
                .run(&shell::render(
                    "rsync",
                    &["-pthrz", "--delete", "--stats", "static/", &destination],
                ))
                .map(|_| ())
        }))
        .step(Step::fail_fast("collect-static", |cx: &mut DeployContext| {
            let domain = cx.config.domain()?.to_string();
            cx.remote.in_dir(domain, |session| {
                session.run("venv/bin/python manage.py collectstatic --noinput")?;
                Ok(())
            })
        }))
        // Informational readiness check; never blocks the deployment.
        .step(Step::tolerate("deployment-self-check", |cx: &mut DeployContext| {
            let domain = cx.config.domain()?.to_string();
            cx.remote.in_dir(domain, |session| {
                session.run("venv/bin/python manage.py check --deploy")?;
                Ok(())
            })
        }))
        .step(Step::fail_fast("restart-service", |cx: &mut DeployContext| {
            let unit = provision::service_unit(cx.config.domain()?);
            cx.remote
                .run(&shell::render("systemctl", &["--user", "restart", &unit]))
                .map(|_| ())
        }))
        .step(Step::fail_fast("fetch-from-host", |cx: &mut DeployContext| {
            repo::ensure_remote_and_fetch(&cx.config, &mut cx.local).map(|_| ())
        }));

    let mut cx = DeployContext {
        config: config.clone(),
        local: Session::local(),
        remote: Session::remote(host),
        skip_static,
    };
    pipeline.run(&mut cx)
}

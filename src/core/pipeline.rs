//! Ordered step execution with per-step failure policy.
//!
//! Pipelines are strictly sequential. A failing fail-fast step aborts the
//! run with its error; a failing tolerate step is logged with its exit code
//! and captured output and execution continues. The runner inspects plain
//! `Result` values; there is no other control flow.

use serde::Serialize;

use crate::core::error::{Error, Result};
use crate::log_status;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Propagate the failure and abort the pipeline.
    FailFast,
    /// Record the failure and continue with the next step.
    Tolerate,
}

/// A named unit of work over a pipeline context.
pub struct Step<Cx> {
    pub name: &'static str,
    pub policy: FailurePolicy,
    run: Box<dyn Fn(&mut Cx) -> Result<()>>,
}

impl<Cx> Step<Cx> {
    pub fn fail_fast(name: &'static str, run: impl Fn(&mut Cx) -> Result<()> + 'static) -> Self {
        Self {
            name,
            policy: FailurePolicy::FailFast,
            run: Box::new(run),
        }
    }

    pub fn tolerate(name: &'static str, run: impl Fn(&mut Cx) -> Result<()> + 'static) -> Self {
        Self {
            name,
            policy: FailurePolicy::Tolerate,
            run: Box::new(run),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum StepStatus {
    Completed,
    Tolerated {
        exit_code: Option<i32>,
        error: String,
    },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepOutcome {
    pub name: &'static str,
    #[serde(flatten)]
    pub status: StepStatus,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineReport {
    pub pipeline: &'static str,
    pub steps: Vec<StepOutcome>,
}

pub struct Pipeline<Cx> {
    name: &'static str,
    steps: Vec<Step<Cx>>,
}

impl<Cx> Pipeline<Cx> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            steps: Vec::new(),
        }
    }

    pub fn step(mut self, step: Step<Cx>) -> Self {
        self.steps.push(step);
        self
    }

    /// Execute all steps in order against `cx`.
    pub fn run(&self, cx: &mut Cx) -> Result<PipelineReport> {
        let mut outcomes = Vec::with_capacity(self.steps.len());

        for step in &self.steps {
            log_status!("pipeline", "{}: {}", self.name, step.name);

            match (step.run)(cx) {
                Ok(()) => outcomes.push(StepOutcome {
                    name: step.name,
                    status: StepStatus::Completed,
                }),
                Err(err) if step.policy == FailurePolicy::FailFast => return Err(err),
                Err(err) => {
                    log_tolerated(step.name, &err);
                    outcomes.push(StepOutcome {
                        name: step.name,
                        status: StepStatus::Tolerated {
                            exit_code: err.exit_status,
                            error: err.message.clone(),
                        },
                    });
                }
            }
        }

        Ok(PipelineReport {
            pipeline: self.name,
            steps: outcomes,
        })
    }
}

/// Tolerated failures still reach the operator's audit trail, with the exit
/// code and whatever output the command produced.
fn log_tolerated(name: &str, err: &Error) {
    match err.exit_status {
        Some(code) => eprintln!("[pipeline] '{}' failed (exit {}), continuing", name, code),
        None => eprintln!("[pipeline] '{}' failed, continuing", name),
    }
    for stream in ["stdout", "stderr"] {
        if let Some(text) = err.details.get(stream).and_then(|v| v.as_str()) {
            if !text.trim().is_empty() {
                eprintln!("[pipeline]   {}: {}", stream, text.trim_end());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::{CommandFailedDetails, TargetDetails};

    fn failing_step(name: &'static str, policy: FailurePolicy) -> Step<Vec<&'static str>> {
        let run = move |log: &mut Vec<&'static str>| {
            log.push(name);
            Err(Error::command_failed(CommandFailedDetails {
                command: "false".to_string(),
                exit_code: 7,
                stdout: String::new(),
                stderr: "boom".to_string(),
                target: TargetDetails { host: None },
            }))
        };
        match policy {
            FailurePolicy::FailFast => Step::fail_fast(name, run),
            FailurePolicy::Tolerate => Step::tolerate(name, run),
        }
    }

    fn passing_step(name: &'static str) -> Step<Vec<&'static str>> {
        Step::fail_fast(name, move |log: &mut Vec<&'static str>| {
            log.push(name);
            Ok(())
        })
    }

    #[test]
    fn fail_fast_halts_subsequent_steps() {
        let pipeline = Pipeline::new("test")
            .step(passing_step("first"))
            .step(failing_step("middle", FailurePolicy::FailFast))
            .step(passing_step("last"));

        let mut log = Vec::new();
        let err = pipeline.run(&mut log).unwrap_err();

        assert_eq!(log, vec!["first", "middle"]);
        assert_eq!(err.exit_status, Some(7));
    }

    #[test]
    fn tolerated_failure_does_not_halt() {
        let pipeline = Pipeline::new("test")
            .step(passing_step("first"))
            .step(failing_step("middle", FailurePolicy::Tolerate))
            .step(passing_step("last"));

        let mut log = Vec::new();
        let report = pipeline.run(&mut log).unwrap();

        assert_eq!(log, vec!["first", "middle", "last"]);
        assert_eq!(report.steps.len(), 3);
        assert_eq!(report.steps[0].status, StepStatus::Completed);
        assert_eq!(
            report.steps[1].status,
            StepStatus::Tolerated {
                exit_code: Some(7),
                error: "Command failed".to_string(),
            }
        );
        assert_eq!(report.steps[2].status, StepStatus::Completed);
    }

    #[test]
    fn empty_pipeline_reports_no_steps() {
        let pipeline: Pipeline<Vec<&'static str>> = Pipeline::new("empty");
        let report = pipeline.run(&mut Vec::new()).unwrap();
        assert!(report.steps.is_empty());
    }
}

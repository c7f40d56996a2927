//! Virtual network plumbing between the host bridge and the container.
//!
//! The plumbing drives the standard host utilities (`ip`, `sysctl`,
//! `iptables`); the contract is the resulting kernel state, not the
//! mechanism. Each side of the launch is expressed as an ordered plan of
//! [`PlumbStep`]s so the exact command lines stay testable without
//! privileges.

pub mod container;
pub mod host;

use std::process::Command;

use minibox_common::error::{MiniboxError, Result};

/// Failure policy of a single plumbing command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// A non-zero exit aborts the launch.
    Fatal,
    /// A non-zero exit is tolerated, e.g. when the device already exists.
    Tolerated,
}

/// One external networking command together with its failure policy.
#[derive(Debug)]
pub struct PlumbStep {
    op: &'static str,
    command: String,
    policy: FailurePolicy,
}

impl PlumbStep {
    /// A step whose failure aborts the launch.
    #[must_use]
    pub fn fatal(op: &'static str, command: String) -> Self {
        Self {
            op,
            command,
            policy: FailurePolicy::Fatal,
        }
    }

    /// A step whose failure is tolerated.
    #[must_use]
    pub fn tolerated(op: &'static str, command: String) -> Self {
        Self {
            op,
            command,
            policy: FailurePolicy::Tolerated,
        }
    }

    /// The full command line, space-separated.
    #[must_use]
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Short label for this step, used in diagnostics.
    #[must_use]
    pub fn op(&self) -> &'static str {
        self.op
    }

    /// This step's failure policy.
    #[must_use]
    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Runs the command, applying the failure policy to its exit status.
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be spawned, or if it exits
    /// non-zero and the policy is [`FailurePolicy::Fatal`].
    pub fn run(&self) -> Result<()> {
        let mut parts = self.command.split_whitespace();
        let Some(program) = parts.next() else {
            return Err(MiniboxError::Command {
                command: self.command.clone(),
                detail: "empty command".into(),
            });
        };

        let status = Command::new(program)
            .args(parts)
            .status()
            .map_err(|e| MiniboxError::Command {
                command: self.command.clone(),
                detail: e.to_string(),
            })?;

        if status.success() {
            tracing::debug!(op = self.op, command = %self.command, "plumbing step done");
            return Ok(());
        }
        match self.policy {
            FailurePolicy::Tolerated => {
                tracing::debug!(op = self.op, %status, "plumbing step tolerated");
                Ok(())
            }
            FailurePolicy::Fatal => Err(MiniboxError::Command {
                command: self.command.clone(),
                detail: format!("{} failed with {status}", self.op),
            }),
        }
    }
}

/// Runs a plan in order, stopping at the first fatal failure.
///
/// # Errors
///
/// Returns the error of the first step that fails fatally.
pub fn run_plan(steps: &[PlumbStep]) -> Result<()> {
    for step in steps {
        step.run()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;

    #[test]
    fn fatal_step_reports_failed_command_line() {
        let step = PlumbStep::fatal("false step", "false".into());
        let err = step.run().expect_err("false must fail");
        let msg = format!("{err}");
        assert!(msg.contains("false step"));
    }

    #[test]
    fn tolerated_step_swallows_failure() {
        let step = PlumbStep::tolerated("false step", "false".into());
        assert!(step.run().is_ok());
    }

    #[test]
    fn successful_step_passes_either_policy() {
        assert!(PlumbStep::fatal("true step", "true".into()).run().is_ok());
        assert!(PlumbStep::tolerated("true step", "true".into())
            .run()
            .is_ok());
    }

    #[test]
    fn missing_program_is_an_error() {
        let step = PlumbStep::fatal("ghost", "no-such-program-anywhere".into());
        assert!(step.run().is_err());
    }
}

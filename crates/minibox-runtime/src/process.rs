//! Final process-image replacement inside the container.

use std::convert::Infallible;
use std::ffi::CString;

use minibox_common::error::{MiniboxError, Result};

/// Replaces the current process image with the requested command.
///
/// The environment is inherited verbatim; nothing is scrubbed. On success
/// this never returns.
///
/// # Errors
///
/// Returns an error if the command is empty, a token contains an interior
/// NUL byte, or `execv(2)` fails.
pub fn exec_command(command: &[String]) -> Result<Infallible> {
    let Some(program) = command.first() else {
        return Err(MiniboxError::Request {
            message: "command must not be empty".into(),
        });
    };

    let argv = command
        .iter()
        .map(|token| CString::new(token.as_str()))
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|_| MiniboxError::Request {
            message: "command token contains a NUL byte".into(),
        })?;

    match nix::unistd::execv(&argv[0], &argv) {
        Ok(never) => match never {},
        Err(e) => Err(MiniboxError::Exec {
            program: program.clone(),
            source: e.into(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_command_is_rejected() {
        let err = exec_command(&[]).expect_err("empty command");
        assert!(matches!(err, MiniboxError::Request { .. }));
    }

    #[test]
    fn nul_byte_in_token_is_rejected() {
        let command = vec!["/bin/echo".to_owned(), "a\0b".to_owned()];
        let err = exec_command(&command).expect_err("NUL token");
        assert!(matches!(err, MiniboxError::Request { .. }));
    }

    #[test]
    fn missing_executable_reports_exec_error() {
        let command = vec!["/no/such/file".to_owned()];
        let err = exec_command(&command).expect_err("missing executable");
        match err {
            MiniboxError::Exec { program, .. } => assert_eq!(program, "/no/such/file"),
            other => panic!("unexpected error: {other}"),
        }
    }
}

//! Child processes as nested operations.
//!
//! The child's environment is cleared and replaced by the scope's effective
//! environment, so it sees exactly what the scope computed and nothing the
//! parent process may have in its own environment.

use crate::error::CommandError;
use crate::Environment;
use std::process::{ExitStatus, Stdio};
use tokio::process::Command;
use tracing::debug;

/// Runs `program` with `args` under `env` and waits for it to exit.
///
/// Standard input, output and error are inherited.
///
/// # Errors
///
/// - [`CommandError::NotFound`]: `program` is not on the `PATH` of `env`
/// - [`CommandError::Io`]: the process could not be spawned or waited on
pub async fn run_command(
    program: &str,
    args: &[String],
    env: &Environment,
) -> Result<ExitStatus, CommandError> {
    let mut cmd = Command::new(program);
    cmd.args(args);
    cmd.env_clear();
    cmd.envs(env.iter());
    cmd.stdin(Stdio::inherit());
    cmd.stdout(Stdio::inherit());
    cmd.stderr(Stdio::inherit());

    debug!("Running {} with {} variables", program, env.len());

    let mut child = cmd.spawn().map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            CommandError::NotFound(program.to_string())
        } else {
            CommandError::Io {
                program: program.to_string(),
                source: e,
            }
        }
    })?;

    child.wait().await.map_err(|e| CommandError::Io {
        program: program.to_string(),
        source: e,
    })
}

/// Maps a child's exit status onto the exit code to report for it.
///
/// On Unix a child killed by a signal reports `128 + signal`, as shells do.
pub fn exit_code(status: ExitStatus) -> u8 {
    if let Some(code) = status.code() {
        return u8::try_from(code).unwrap_or(1);
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return u8::try_from(128 + signal).unwrap_or(1);
        }
    }

    1
}

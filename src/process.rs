//! Running external inspection tools and capturing what they print.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;

use tracing::{debug, trace};

use crate::error::{FindStringError, Result};
use crate::types::SubprocessOutcome;

/// Run `command` with `arguments`, feeding it `input` on stdin when given.
///
/// Both output streams are drained concurrently until the child exits, so a
/// chatty child never stalls on a full pipe. Blocks until the child exits;
/// there is no timeout.
pub fn run<S: AsRef<str>>(
    command: &Path,
    arguments: &[S],
    input: Option<&[u8]>,
) -> Result<SubprocessOutcome> {
    if !command.exists() {
        return Err(FindStringError::CommandNotFound(command.to_path_buf()));
    }

    let mut cmd = Command::new(command);
    cmd.args(arguments.iter().map(|a| a.as_ref()))
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .stdin(if input.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        });

    trace!(command = %command.display(), "spawning");
    let mut child = cmd.spawn()?;

    // The writer gets its own thread so a child that fills stdout before
    // consuming its input cannot deadlock against us.
    let writer = match (input, child.stdin.take()) {
        (Some(bytes), Some(mut stdin)) => {
            let bytes = bytes.to_vec();
            Some(thread::spawn(move || -> std::io::Result<()> {
                stdin.write_all(&bytes)?;
                // stdin is dropped here, closing the pipe
                Ok(())
            }))
        }
        _ => None,
    };

    let output = child.wait_with_output()?;

    if let Some(handle) = writer {
        match handle.join() {
            Ok(Err(e)) => debug!(command = %command.display(), "writing stdin failed: {}", e),
            Err(_) => debug!(command = %command.display(), "stdin writer panicked"),
            Ok(Ok(())) => {}
        }
    }

    let exit_code = output.status.code().unwrap_or(-1);
    debug!(
        command = %command.display(),
        exit_code,
        stdout_len = output.stdout.len(),
        stderr_len = output.stderr.len(),
        "command finished"
    );

    Ok(SubprocessOutcome {
        exit_code,
        stdout: output.stdout,
        stderr: output.stderr,
    })
}

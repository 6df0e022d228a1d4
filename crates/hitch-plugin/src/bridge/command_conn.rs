//! Duplex stream over a spawned tunnel process's standard IO.

use std::ffi::OsString;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use tracing::debug;

use super::BRIDGE_TARGET;
use crate::error::BridgeError;

/// Connection to the daemon through a child process.
///
/// Reads come from the child's stdout and writes go to its stdin; no framing
/// is added. The child's stderr is inherited so its diagnostics reach the
/// user. Dropping the connection closes stdin, kills the child if it is still
/// running, and reaps it.
pub struct CommandConn {
    program: PathBuf,
    child: Child,
    stdin: Option<ChildStdin>,
    stdout: ChildStdout,
}

impl CommandConn {
    /// Spawns `program` with `args` and connects to its standard IO.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Spawn`] when the process cannot be started and
    /// [`BridgeError::MissingPipe`] when its stdio was not captured.
    pub fn spawn(program: &Path, args: &[OsString]) -> Result<Self, BridgeError> {
        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit());

        debug!(
            target: BRIDGE_TARGET,
            program = %program.display(),
            ?args,
            "spawning tunnel process"
        );

        let mut child = command.spawn().map_err(|source| BridgeError::Spawn {
            program: program.to_path_buf(),
            source,
        })?;

        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            reap(&mut child);
            return Err(BridgeError::MissingPipe {
                program: program.to_path_buf(),
                stream: "standard streams",
            });
        };

        Ok(Self {
            program: program.to_path_buf(),
            child,
            stdin: Some(stdin),
            stdout,
        })
    }

    /// Executable backing this connection.
    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// OS process identifier of the tunnel.
    #[must_use]
    pub fn id(&self) -> u32 {
        self.child.id()
    }

    /// Closes the write half, signalling end of input to the tunnel.
    pub fn close_write(&mut self) {
        self.stdin = None;
    }
}

impl Read for CommandConn {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stdout.read(buf)
    }
}

impl Write for CommandConn {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.stdin.as_mut() {
            Some(stdin) => stdin.write(buf),
            None => Err(write_closed()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.stdin.as_mut() {
            Some(stdin) => stdin.flush(),
            None => Err(write_closed()),
        }
    }
}

impl Drop for CommandConn {
    fn drop(&mut self) {
        self.close_write();
        reap(&mut self.child);
    }
}

fn write_closed() -> io::Error {
    io::Error::new(io::ErrorKind::BrokenPipe, "tunnel write half is closed")
}

fn reap(child: &mut Child) {
    if matches!(child.try_wait(), Ok(None)) {
        drop(child.kill());
    }
    match child.wait() {
        Ok(status) => debug!(target: BRIDGE_TARGET, ?status, "tunnel process reaped"),
        Err(error) => debug!(target: BRIDGE_TARGET, %error, "failed to reap tunnel process"),
    }
}

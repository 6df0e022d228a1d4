//! Error taxonomy for plugin runs.
//!
//! Every failure a plugin run can produce converges on [`PluginError`], which
//! the run orchestrator alone translates into user-visible text and a process
//! exit code. [`StatusError`] is the one structured variant: it carries its
//! own status line and exit code so plugins can report failures without the
//! generic error formatting.

use std::error::Error as StdError;
use std::io;
use std::path::PathBuf;

use clap::error::ErrorKind;
use thiserror::Error;

use crate::telemetry::TelemetryError;

/// Boxed error returned by plugin command handlers.
pub type BoxedCommandError = Box<dyn StdError + Send + Sync>;

/// A failure carrying a status line and exit code of its own.
///
/// A status error always signals failure: an unset (zero) or out-of-range
/// code still exits with status 1.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("status: {status}, code: {code}")]
pub struct StatusError {
    status: String,
    code: i32,
}

impl StatusError {
    /// Creates a status error with the given message and exit code.
    pub fn new(status: impl Into<String>, code: i32) -> Self {
        Self {
            status: status.into(),
            code,
        }
    }

    /// Status line shown to the user; may be empty.
    #[must_use]
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Exit code requested by the plugin.
    #[must_use]
    pub const fn code(&self) -> i32 {
        self.code
    }

    /// Process exit status for this failure, never zero.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        u8::try_from(self.code)
            .ok()
            .filter(|code| *code != 0)
            .unwrap_or(1)
    }
}

/// Errors raised while resolving or dialing the daemon tunnel.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The tunnel executable could not be located.
    #[error("tunnel executable '{program}' not found")]
    ProgramNotFound {
        /// Program as configured.
        program: String,
    },

    /// The tunnel process could not be spawned.
    #[error("failed to spawn tunnel executable '{}': {source}", program.display())]
    Spawn {
        /// Resolved executable path.
        program: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The spawned tunnel did not expose one of its standard streams.
    #[error("tunnel executable '{}' did not expose its {stream}", program.display())]
    MissingPipe {
        /// Resolved executable path.
        program: PathBuf,
        /// Name of the missing stream.
        stream: &'static str,
    },

    /// The daemon client was requested before the plugin command initialised it.
    #[error("daemon client requested before initialisation")]
    Uninitialised,
}

/// Errors surfaced to the run orchestrator.
#[derive(Debug, Error)]
pub enum PluginError {
    /// Argument parsing failed, or help/version output was requested.
    #[error("{0}")]
    CliUsage(clap::Error),

    /// The daemon client could not be initialised.
    #[error("failed to initialise daemon client: {0}")]
    Connection(#[from] BridgeError),

    /// The plugin reported a structured failure.
    #[error(transparent)]
    Status(#[from] StatusError),

    /// Telemetry could not be configured.
    #[error("failed to initialise telemetry: {0}")]
    Telemetry(#[from] TelemetryError),

    /// The plugin metadata could not be serialised.
    #[error("failed to serialise plugin metadata: {0}")]
    SerialiseMetadata(#[source] serde_json::Error),

    /// The plugin metadata could not be written.
    #[error("failed to emit plugin metadata: {0}")]
    EmitMetadata(#[source] io::Error),

    /// No subcommand was selected.
    #[error("a subcommand of '{name}' must be provided")]
    MissingCommand {
        /// Command lacking a subcommand.
        name: String,
    },

    /// A plugin command handler failed.
    #[error("{0}")]
    Command(#[source] BoxedCommandError),
}

impl PluginError {
    /// Wraps a plugin-defined failure.
    pub fn command(error: impl Into<BoxedCommandError>) -> Self {
        Self::Command(error.into())
    }

    /// Reports whether this error is a help or version request rather than
    /// a failure.
    ///
    /// A bare invocation with no arguments counts as a help request.
    #[must_use]
    pub fn is_informational(&self) -> bool {
        matches!(
            self,
            Self::CliUsage(error) if !error.use_stderr()
                || error.kind() == ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
        )
    }
}

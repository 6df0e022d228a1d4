//! Process environment consulted while a plugin boots.

use std::env;
use std::ffi::OsString;
use std::str::FromStr;

use thiserror::Error;

use crate::{DEFAULT_PROGRAM, LOG_FORMAT_ENV, LogFormat, LogFormatParseError, REEXEC_ENV};

/// Environment-derived settings for a plugin process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PluginEnvironment {
    reexec_program: Option<OsString>,
    log_format: LogFormat,
}

/// Errors raised while reading the plugin environment.
#[derive(Debug, Error)]
pub enum EnvironmentError {
    /// The log format variable held an unsupported value.
    #[error("invalid {variable} value '{value}': {source}")]
    LogFormat {
        /// Variable that was read.
        variable: &'static str,
        /// Offending value.
        value: String,
        /// Underlying parse failure.
        #[source]
        source: LogFormatParseError,
    },
}

impl PluginEnvironment {
    /// Reads the settings from the current process environment.
    ///
    /// # Errors
    ///
    /// Returns [`EnvironmentError`] when a variable holds an unsupported value.
    pub fn from_env() -> Result<Self, EnvironmentError> {
        Self::from_lookup(|key| env::var_os(key))
    }

    /// Reads the settings through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`EnvironmentError`] when a variable holds an unsupported value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, EnvironmentError>
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let reexec_program = lookup(REEXEC_ENV).filter(|value| !value.is_empty());
        let log_format = match lookup(LOG_FORMAT_ENV) {
            Some(raw) if !raw.is_empty() => {
                let value = raw.to_string_lossy().into_owned();
                LogFormat::from_str(&value).map_err(|source| EnvironmentError::LogFormat {
                    variable: LOG_FORMAT_ENV,
                    value,
                    source,
                })?
            }
            _ => LogFormat::default(),
        };
        Ok(Self {
            reexec_program,
            log_format,
        })
    }

    /// Overrides the program re-executed for tunnelling.
    #[must_use]
    pub fn with_reexec_program(mut self, program: impl Into<OsString>) -> Self {
        let program = program.into();
        self.reexec_program = (!program.is_empty()).then_some(program);
        self
    }

    /// Program the connection bridge re-executes.
    #[must_use]
    pub fn tunnel_program(&self) -> OsString {
        self.reexec_program
            .clone()
            .unwrap_or_else(|| OsString::from(DEFAULT_PROGRAM))
    }

    /// Log format requested for plugin telemetry.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }
}

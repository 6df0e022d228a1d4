//! CLI context handed to plugin commands.

use std::io::Write;

use hitch_config::{GlobalOptions, PluginEnvironment};

use crate::bridge::ApiClient;
use crate::error::{BridgeError, PluginError};
use crate::telemetry;

/// Streams, parsed global flags and the daemon client for one plugin run.
///
/// The context starts uninitialised: global options are defaults and no
/// client exists. The run orchestrator initialises it only when a real
/// plugin command is about to execute.
pub struct PluginCli<'io> {
    stdout: &'io mut dyn Write,
    stderr: &'io mut dyn Write,
    environment: PluginEnvironment,
    options: GlobalOptions,
    client: Option<ApiClient>,
}

impl<'io> PluginCli<'io> {
    /// Creates a context writing to the given streams.
    pub fn new(
        stdout: &'io mut dyn Write,
        stderr: &'io mut dyn Write,
        environment: PluginEnvironment,
    ) -> Self {
        Self {
            stdout,
            stderr,
            environment,
            options: GlobalOptions::default(),
            client: None,
        }
    }

    /// Standard output stream.
    pub fn out(&mut self) -> &mut dyn Write {
        &mut *self.stdout
    }

    /// Standard error stream.
    pub fn err(&mut self) -> &mut dyn Write {
        &mut *self.stderr
    }

    /// Process environment the plugin booted with.
    #[must_use]
    pub const fn environment(&self) -> &PluginEnvironment {
        &self.environment
    }

    /// Global flags parsed ahead of the plugin name.
    #[must_use]
    pub const fn options(&self) -> &GlobalOptions {
        &self.options
    }

    /// Daemon client installed during initialisation.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Uninitialised`] outside a real command run.
    pub fn client(&mut self) -> Result<&mut ApiClient, BridgeError> {
        self.client.as_mut().ok_or(BridgeError::Uninitialised)
    }

    /// Reports whether a daemon client has been installed.
    #[must_use]
    pub const fn is_initialised(&self) -> bool {
        self.client.is_some()
    }

    /// Applies the global flags, configures telemetry, then builds the
    /// daemon client through `initialise_client`.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::Telemetry`] or [`PluginError::Connection`]; the
    /// context keeps no client on failure.
    pub(crate) fn initialise<F>(
        &mut self,
        options: GlobalOptions,
        initialise_client: F,
    ) -> Result<(), PluginError>
    where
        F: FnOnce(&PluginEnvironment) -> Result<ApiClient, BridgeError>,
    {
        telemetry::initialise(&options, self.environment.log_format())?;
        self.options = options;
        let client = initialise_client(&self.environment)?;
        self.client = Some(client);
        Ok(())
    }

    /// Drops the daemon client, tearing down any live tunnel.
    pub(crate) fn release(&mut self) {
        self.client = None;
    }
}

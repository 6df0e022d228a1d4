//! Top-level run orchestration for plugin binaries.
//!
//! [`run`] is what a plugin's `main` calls. It boots the CLI context,
//! assembles the command tree, and answers metadata queries without touching
//! the daemon; only a real plugin command triggers the client factory. All
//! failures are turned into output and an exit code here and nowhere else.

use std::env;
use std::ffi::OsString;
use std::io::{self, Write};
use std::process::ExitCode;

use clap::FromArgMatches;
use hitch_config::{GlobalOptions, PluginEnvironment};
use tracing::debug;

use crate::bridge::{ClientFactory, TunnelClientFactory};
use crate::cli::PluginCli;
use crate::command::{Phase, Plugin, assemble};
use crate::error::PluginError;
use crate::metadata::{Metadata, write_metadata};

/// Tracing target for run orchestration.
const RUN_TARGET: &str = "hitch_plugin::run";

/// Runs `plugin` with the process arguments and standard streams.
///
/// Call this from the plugin's `main` and return its exit code.
#[must_use]
pub fn run<P>(plugin: &P, metadata: &Metadata) -> ExitCode
where
    P: Plugin,
{
    let mut stdout = io::stdout().lock();
    let mut stderr = io::stderr().lock();
    let environment = match PluginEnvironment::from_env() {
        Ok(environment) => environment,
        Err(error) => {
            drop(writeln!(stderr, "{error}"));
            return ExitCode::FAILURE;
        }
    };
    let mut cli = PluginCli::new(&mut stdout, &mut stderr, environment);
    PluginRunner::new(plugin, metadata).run(env::args_os(), &mut cli)
}

/// Runs a plugin against explicit arguments, streams and client factory.
pub struct PluginRunner<'a, P> {
    plugin: &'a P,
    metadata: &'a Metadata,
    factory: &'a dyn ClientFactory,
}

impl<'a, P> PluginRunner<'a, P>
where
    P: Plugin,
{
    /// Creates a runner using the tunnelling client factory.
    pub fn new(plugin: &'a P, metadata: &'a Metadata) -> Self {
        Self {
            plugin,
            metadata,
            factory: &TunnelClientFactory,
        }
    }

    /// Replaces the client factory invoked for real commands.
    #[must_use]
    pub fn with_client_factory(mut self, factory: &'a dyn ClientFactory) -> Self {
        self.factory = factory;
        self
    }

    /// Runs the plugin with `args` (program name first) and returns the
    /// process exit code.
    ///
    /// The daemon client, and any tunnel it opened, is released before this
    /// returns.
    pub fn run<I>(&self, args: I, cli: &mut PluginCli<'_>) -> ExitCode
    where
        I: IntoIterator<Item = OsString>,
    {
        let args: Vec<OsString> = args.into_iter().collect();
        let result = self.dispatch(&args, cli);
        cli.release();
        report(result, cli)
    }

    fn dispatch(&self, args: &[OsString], cli: &mut PluginCli<'_>) -> Result<(), PluginError> {
        let command = self.plugin.command();
        let name = command.get_name().to_owned();
        let fallback = command.get_about().map(ToString::to_string);

        let matches = assemble(command)
            .try_get_matches_from(args)
            .map_err(PluginError::CliUsage)?;
        let phase = Phase::select(&matches).ok_or_else(|| PluginError::MissingCommand {
            name: name.clone(),
        })?;

        match phase {
            Phase::Describe => write_metadata(self.metadata, fallback.as_deref(), cli.out()),
            Phase::Execute(plugin_matches) => {
                let options =
                    GlobalOptions::from_arg_matches(&matches).map_err(PluginError::CliUsage)?;
                let plugin_args = args.get(1..).unwrap_or_default();
                cli.initialise(options, |environment| {
                    self.factory.create(&name, plugin_args, environment)
                })?;
                debug!(target: RUN_TARGET, plugin = %name, "executing plugin command");
                self.plugin.execute(cli, plugin_matches)
            }
        }
    }
}

/// Maps a run result to its exit code, writing any user-facing text.
///
/// Status errors print their status line (when non-empty) and exit with
/// their own non-zero code; help and version output goes to stdout with
/// success; every other error prints its message and exits 1. Clap's rendered
/// text already ends in a newline.
fn report(result: Result<(), PluginError>, cli: &mut PluginCli<'_>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(PluginError::Status(status)) => {
            if !status.status().is_empty() {
                drop(writeln!(cli.err(), "{}", status.status()));
            }
            ExitCode::from(status.exit_code())
        }
        Err(error) if error.is_informational() => {
            drop(write!(cli.out(), "{error}"));
            ExitCode::SUCCESS
        }
        Err(PluginError::CliUsage(error)) => {
            drop(write!(cli.err(), "{error}"));
            ExitCode::FAILURE
        }
        Err(error) => {
            drop(writeln!(cli.err(), "{error}"));
            ExitCode::FAILURE
        }
    }
}

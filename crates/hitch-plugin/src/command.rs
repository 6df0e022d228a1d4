//! Plugin command contract and assembly of the root command tree.
//!
//! The assembled root mirrors how the parent `hitch` binary sees the plugin:
//! the parent's global flags sit on the root, followed by exactly two
//! subcommands, the plugin's own command and the hidden metadata query.

use clap::{ArgMatches, Args, Command};
use hitch_config::{DEFAULT_PROGRAM, GlobalOptions, METADATA_SUBCOMMAND, PLUGIN_NAME_PREFIX};

use crate::cli::PluginCli;
use crate::error::PluginError;

/// A plugin command run as if it were a built-in `hitch` subcommand.
pub trait Plugin {
    /// Returns the plugin's command.
    ///
    /// The command name is the plugin name (`hitch-<name>` without the
    /// prefix) and its `about` text doubles as the metadata short
    /// description when none is supplied.
    fn command(&self) -> Command;

    /// Runs the command selected by `matches`.
    ///
    /// The daemon client is initialised before this is called and is
    /// available through [`PluginCli::client`].
    ///
    /// # Errors
    ///
    /// Returns [`PluginError`] when the command fails; use
    /// [`StatusError`](crate::StatusError) for a custom status line and
    /// exit code.
    fn execute(&self, cli: &mut PluginCli<'_>, matches: &ArgMatches) -> Result<(), PluginError>;
}

/// Builds the root command for `plugin`.
///
/// The root is named `hitch-<name>` but renders usage under the parent's
/// binary name, so `hitch-hello hello greet --help` shows
/// `Usage: hitch hello greet`. Running the plugin with no arguments yields
/// a help request rather than a usage error.
///
/// Clap never prints or exits on its own here: callers parse with
/// `try_get_matches_from` and hand errors to the run orchestrator.
#[must_use]
pub fn assemble(plugin: Command) -> Command {
    let name = plugin.get_name().to_owned();
    let root = Command::new(format!("{PLUGIN_NAME_PREFIX}{name}"))
        .bin_name(DEFAULT_PROGRAM)
        .about(format!("{PLUGIN_NAME_PREFIX}{name} is a Hitch CLI plugin"))
        .override_usage(format!("{DEFAULT_PROGRAM} [OPTIONS] {name} [ARG...]"))
        .disable_help_subcommand(true)
        .disable_version_flag(true)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(plugin)
        .subcommand(metadata_command());
    GlobalOptions::augment_args(root)
}

fn metadata_command() -> Command {
    Command::new(METADATA_SUBCOMMAND)
        .about("Print plugin metadata as JSON")
        .hide(true)
}

/// Phase of a plugin run selected by the parsed arguments.
#[derive(Debug)]
pub(crate) enum Phase<'m> {
    /// Answer the metadata query; no daemon access.
    Describe,
    /// Run the plugin's command with its matches.
    Execute(&'m ArgMatches),
}

impl<'m> Phase<'m> {
    pub(crate) fn select(matches: &'m ArgMatches) -> Option<Self> {
        match matches.subcommand()? {
            (METADATA_SUBCOMMAND, _) => Some(Self::Describe),
            (_, plugin_matches) => Some(Self::Execute(plugin_matches)),
        }
    }
}

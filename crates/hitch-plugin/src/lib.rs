//! Framework for building `hitch` CLI plugins.
//!
//! A plugin is a standalone executable, `hitch-<name>`, that the parent
//! `hitch` binary re-executes when the user runs `hitch [OPTIONS] <name>`.
//! This crate makes such an executable behave like a built-in subcommand:
//!
//! - it answers the hidden `hitch-cli-plugin-metadata` query with a JSON
//!   description, without touching the daemon ([`metadata`]);
//! - it parses the parent's global flags ahead of its own command
//!   ([`command`]);
//! - it reaches the daemon by re-executing the parent as
//!   `hitch <global flags> system dial-stdio` and speaking through that
//!   process's standard IO ([`global_flags`], [`bridge`]).
//!
//! # Example
//!
//! ```rust,no_run
//! use std::io::Write;
//! use std::process::ExitCode;
//!
//! use clap::{ArgMatches, Command};
//! use hitch_plugin::{Metadata, Plugin, PluginCli, PluginError};
//!
//! struct Hello;
//!
//! impl Plugin for Hello {
//!     fn command(&self) -> Command {
//!         Command::new("hello").about("Say hello")
//!     }
//!
//!     fn execute(&self, cli: &mut PluginCli<'_>, _: &ArgMatches) -> Result<(), PluginError> {
//!         writeln!(cli.out(), "hello").map_err(PluginError::command)
//!     }
//! }
//!
//! fn main() -> ExitCode {
//!     hitch_plugin::run(&Hello, &Metadata::new().with_vendor("Example"))
//! }
//! ```

pub mod bridge;
mod cli;
pub mod command;
pub mod error;
pub mod global_flags;
pub mod metadata;
mod run;
pub mod telemetry;

#[cfg(test)]
mod tests;

pub use self::bridge::{ApiClient, ClientFactory, Dialer, Duplex, TunnelClientFactory};
pub use self::cli::PluginCli;
pub use self::command::Plugin;
pub use self::error::{BridgeError, PluginError, StatusError};
pub use self::metadata::Metadata;
pub use self::run::{PluginRunner, run};

//! Reference `hitch` plugin exercising the plugin framework end to end.
//!
//! `hitch hello greet` prints a greeting, `hitch hello ping` round-trips one
//! line through the daemon tunnel, and `hitch hello fail` reports a
//! structured failure. The metadata leaves the short description unset so
//! the command's `about` text is advertised instead.

use std::io::{BufRead, BufReader};

use clap::{Arg, ArgMatches, Command, value_parser};
use hitch_plugin::{Metadata, Plugin, PluginCli, PluginError, StatusError};
use thiserror::Error;

/// Line written to the daemon by `hello ping`.
const PING: &[u8] = b"PING\n";

/// The `hello` plugin.
#[derive(Debug, Default, Clone, Copy)]
pub struct HelloPlugin;

/// Errors raised by `hello` subcommands.
#[derive(Debug, Error)]
pub enum HelloError {
    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    Output(#[source] std::io::Error),
    /// Talking to the daemon through the tunnel failed.
    #[error("daemon tunnel I/O failed: {0}")]
    Tunnel(#[source] std::io::Error),
    /// The daemon closed the tunnel without replying.
    #[error("daemon closed the tunnel without replying")]
    NoReply,
}

impl From<HelloError> for PluginError {
    fn from(error: HelloError) -> Self {
        Self::command(error)
    }
}

/// Metadata advertised to the parent CLI.
#[must_use]
pub fn metadata() -> Metadata {
    Metadata::new()
        .with_vendor("Hitch")
        .with_version(env!("CARGO_PKG_VERSION"))
}

impl Plugin for HelloPlugin {
    fn command(&self) -> Command {
        Command::new("hello")
            .about("Say hello over the daemon tunnel")
            .subcommand_required(true)
            .subcommand(
                Command::new("greet")
                    .about("Print a greeting")
                    .arg(Arg::new("name").default_value("world")),
            )
            .subcommand(Command::new("ping").about("Round-trip a line through the daemon"))
            .subcommand(
                Command::new("fail")
                    .about("Exit with a custom status")
                    .arg(Arg::new("message").long("message").default_value(""))
                    .arg(
                        Arg::new("code")
                            .long("code")
                            .allow_negative_numbers(true)
                            .value_parser(value_parser!(i32))
                            .default_value("1"),
                    ),
            )
    }

    fn execute(&self, cli: &mut PluginCli<'_>, matches: &ArgMatches) -> Result<(), PluginError> {
        match matches.subcommand() {
            Some(("greet", greet)) => {
                let name = greet.get_one::<String>("name").map_or("world", String::as_str);
                writeln!(cli.out(), "Hello, {name}!").map_err(HelloError::Output)?;
                Ok(())
            }
            Some(("ping", _)) => ping(cli),
            Some(("fail", fail)) => {
                let message = fail
                    .get_one::<String>("message")
                    .cloned()
                    .unwrap_or_default();
                let code = fail.get_one::<i32>("code").copied().unwrap_or(1);
                Err(StatusError::new(message, code).into())
            }
            _ => Err(PluginError::MissingCommand {
                name: String::from("hello"),
            }),
        }
    }
}

fn ping(cli: &mut PluginCli<'_>) -> Result<(), PluginError> {
    let connection = cli.client()?.connection()?;
    connection.write_all(PING).map_err(HelloError::Tunnel)?;
    connection.flush().map_err(HelloError::Tunnel)?;

    let mut reply = String::new();
    let read = BufReader::new(connection)
        .read_line(&mut reply)
        .map_err(HelloError::Tunnel)?;
    if read == 0 {
        return Err(HelloError::NoReply.into());
    }

    writeln!(cli.out(), "{}", reply.trim_end()).map_err(HelloError::Output)?;
    Ok(())
}

//! Shared doubles for plugin framework tests.

use std::cell::{Cell, RefCell};
use std::ffi::OsString;
use std::io::{self, BufRead, BufReader, Cursor, Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use clap::{Arg, ArgMatches, Command, value_parser};
use hitch_config::PluginEnvironment;

use crate::bridge::{ApiClient, ClientFactory, Duplex};
use crate::cli::PluginCli;
use crate::command::Plugin;
use crate::error::{BridgeError, PluginError, StatusError};

/// In-memory duplex stream: reads replay `inbound`, writes land in `outbound`.
pub(crate) struct Loopback {
    inbound: Cursor<Vec<u8>>,
    outbound: Arc<Mutex<Vec<u8>>>,
    dropped: Arc<AtomicBool>,
}

impl Loopback {
    pub(crate) fn boxed(reply: &[u8], sink: &Arc<Mutex<Vec<u8>>>) -> Box<dyn Duplex> {
        Self::tracked(reply, sink, &Arc::new(AtomicBool::new(false)))
    }

    pub(crate) fn tracked(
        reply: &[u8],
        sink: &Arc<Mutex<Vec<u8>>>,
        dropped: &Arc<AtomicBool>,
    ) -> Box<dyn Duplex> {
        Box::new(Self {
            inbound: Cursor::new(reply.to_vec()),
            outbound: Arc::clone(sink),
            dropped: Arc::clone(dropped),
        })
    }
}

impl Read for Loopback {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inbound.read(buf)
    }
}

impl Write for Loopback {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.outbound
            .lock()
            .map_err(|_| io::Error::other("loopback sink poisoned"))?
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for Loopback {
    fn drop(&mut self) {
        self.dropped.store(true, Ordering::SeqCst);
    }
}

/// Client factory that records its calls and serves loopback connections.
#[derive(Default)]
pub(crate) struct RecordingFactory {
    pub(crate) calls: Cell<usize>,
    pub(crate) received: RefCell<Vec<OsString>>,
    pub(crate) fail: Cell<bool>,
    pub(crate) sent: Arc<Mutex<Vec<u8>>>,
    pub(crate) connection_dropped: Arc<AtomicBool>,
}

impl ClientFactory for RecordingFactory {
    fn create(
        &self,
        _plugin_name: &str,
        args: &[OsString],
        _environment: &PluginEnvironment,
    ) -> Result<ApiClient, BridgeError> {
        self.calls.set(self.calls.get() + 1);
        self.received.replace(args.to_vec());
        if self.fail.get() {
            return Err(BridgeError::ProgramNotFound {
                program: String::from("hitch"),
            });
        }
        let sink = Arc::clone(&self.sent);
        let dropped = Arc::clone(&self.connection_dropped);
        Ok(ApiClient::new(move || {
            Ok(Loopback::tracked(b"pong\n", &sink, &dropped))
        }))
    }
}

/// Plugin exercising each outcome the orchestrator has to map.
pub(crate) struct DemoPlugin {
    pub(crate) executed: Cell<bool>,
    pub(crate) had_client: Cell<bool>,
}

impl DemoPlugin {
    pub(crate) const fn new() -> Self {
        Self {
            executed: Cell::new(false),
            had_client: Cell::new(false),
        }
    }
}

impl Plugin for DemoPlugin {
    fn command(&self) -> Command {
        Command::new("demo")
            .about("Demo plugin")
            .subcommand_required(true)
            .subcommand(Command::new("noop"))
            .subcommand(Command::new("talk"))
            .subcommand(Command::new("boom"))
            .subcommand(Command::new("sulk"))
            .subcommand(
                Command::new("status")
                    .arg(Arg::new("message").long("message").default_value(""))
                    .arg(
                        Arg::new("code")
                            .long("code")
                            .allow_negative_numbers(true)
                            .value_parser(value_parser!(i32))
                            .default_value("0"),
                    ),
            )
    }

    fn execute(&self, cli: &mut PluginCli<'_>, matches: &ArgMatches) -> Result<(), PluginError> {
        self.executed.set(true);
        self.had_client.set(cli.is_initialised());
        match matches.subcommand() {
            Some(("talk", _)) => talk(cli),
            Some(("boom", _)) => Err(PluginError::command("demo exploded")),
            Some(("sulk", _)) => {
                cli.client()?.connection()?;
                Err(StatusError::new("sulking", 4).into())
            }
            Some(("status", status)) => {
                let message = status
                    .get_one::<String>("message")
                    .cloned()
                    .unwrap_or_default();
                let code = status.get_one::<i32>("code").copied().unwrap_or_default();
                Err(StatusError::new(message, code).into())
            }
            _ => Ok(()),
        }
    }
}

fn talk(cli: &mut PluginCli<'_>) -> Result<(), PluginError> {
    let connection = cli.client()?.connection()?;
    connection
        .write_all(b"hi\n")
        .map_err(PluginError::command)?;
    let mut reply = String::new();
    BufReader::new(connection)
        .read_line(&mut reply)
        .map_err(PluginError::command)?;
    writeln!(cli.out(), "{}", reply.trim_end()).map_err(PluginError::command)
}

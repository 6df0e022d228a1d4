//! Connection bridge tunnelling daemon traffic through the parent CLI.
//!
//! Rather than duplicating the parent's context, host and TLS resolution, a
//! plugin re-executes the parent as `hitch <global flags> system dial-stdio`
//! and treats that process's standard input and output as a raw duplex byte
//! stream to the daemon. The pieces are split so each can be substituted:
//! - [`Duplex`] is any bidirectional byte stream.
//! - [`Dialer`] produces a stream on demand; closures qualify.
//! - [`ApiClient`] owns the dialer and the single live connection.
//! - [`CommandConnectionHelper`] is the production dialer, spawning the
//!   tunnel process as a [`CommandConn`].
//! - [`ClientFactory`] is the deferred initialiser the run orchestrator
//!   invokes only when a real plugin command executes.

mod command_conn;
mod helper;

use std::ffi::OsString;
use std::io::{Read, Write};

use hitch_config::PluginEnvironment;
use tracing::debug;

pub use command_conn::CommandConn;
pub use helper::{CommandConnectionHelper, TunnelClientFactory};

use crate::error::BridgeError;

/// Tracing target for bridge operations.
const BRIDGE_TARGET: &str = "hitch_plugin::bridge";

/// A bidirectional byte stream carrying daemon API traffic.
pub trait Duplex: Read + Write + Send {}

impl<T> Duplex for T where T: Read + Write + Send + ?Sized {}

/// Produces a fresh daemon stream each time it is dialed.
#[cfg_attr(test, mockall::automock)]
pub trait Dialer {
    /// Opens a new stream to the daemon.
    ///
    /// # Errors
    ///
    /// Returns a [`BridgeError`] when the stream cannot be established.
    fn dial(&self) -> Result<Box<dyn Duplex>, BridgeError>;
}

impl<F> Dialer for F
where
    F: Fn() -> Result<Box<dyn Duplex>, BridgeError>,
{
    fn dial(&self) -> Result<Box<dyn Duplex>, BridgeError> {
        self()
    }
}

/// Daemon API client whose transport is supplied by a [`Dialer`].
///
/// The client dials lazily on first use and keeps that connection for the
/// rest of the command. Dropping the client drops the connection, which for
/// a [`CommandConn`] reaps the tunnel process.
pub struct ApiClient {
    dialer: Box<dyn Dialer>,
    connection: Option<Box<dyn Duplex>>,
}

impl ApiClient {
    /// Creates a client that dials through `dialer`.
    pub fn new(dialer: impl Dialer + 'static) -> Self {
        Self {
            dialer: Box::new(dialer),
            connection: None,
        }
    }

    /// Returns the live connection, dialing on first use.
    ///
    /// # Errors
    ///
    /// Returns a [`BridgeError`] when dialing fails.
    pub fn connection(&mut self) -> Result<&mut dyn Duplex, BridgeError> {
        let connection = match self.connection.take() {
            Some(connection) => connection,
            None => {
                debug!(target: BRIDGE_TARGET, "dialing daemon");
                self.dialer.dial()?
            }
        };
        Ok(&mut **self.connection.insert(connection))
    }

    /// Reports whether a connection has been dialed and not yet closed.
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// Drops the live connection; the next use dials again.
    pub fn close(&mut self) {
        if self.connection.take().is_some() {
            debug!(target: BRIDGE_TARGET, "closed daemon connection");
        }
    }
}

/// Deferred initialiser producing the daemon client for a plugin command.
pub trait ClientFactory {
    /// Builds the client for `plugin_name` invoked with `args` (program name
    /// excluded).
    ///
    /// # Errors
    ///
    /// Returns a [`BridgeError`] when the client's transport cannot be
    /// prepared.
    fn create(
        &self,
        plugin_name: &str,
        args: &[OsString],
        environment: &PluginEnvironment,
    ) -> Result<ApiClient, BridgeError>;
}

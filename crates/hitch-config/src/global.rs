//! Global flags recognised by the parent `hitch` binary.
//!
//! Plugins attach these to their root command so that flags written before
//! the plugin name parse exactly as they would for a built-in subcommand.

use std::path::PathBuf;

use clap::Args;

use crate::LogLevel;

/// Connection and configuration flags parsed ahead of any subcommand.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalOptions {
    /// Location of client config files.
    #[arg(long = "config", value_name = "DIR")]
    pub config_dir: Option<PathBuf>,
    /// Name of the context to use to connect to the daemon.
    #[arg(short = 'c', long, value_name = "NAME")]
    pub context: Option<String>,
    /// Enable debug mode.
    #[arg(short = 'D', long)]
    pub debug: bool,
    /// Daemon socket to connect to.
    #[arg(short = 'H', long = "host", value_name = "HOST")]
    pub hosts: Vec<String>,
    /// Set the logging level.
    #[arg(short = 'l', long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,
    /// Use TLS; implied by --tlsverify.
    #[arg(long)]
    pub tls: bool,
    /// Trust certs signed only by this CA.
    #[arg(long, value_name = "FILE")]
    pub tlscacert: Option<PathBuf>,
    /// Path to TLS certificate file.
    #[arg(long, value_name = "FILE")]
    pub tlscert: Option<PathBuf>,
    /// Path to TLS key file.
    #[arg(long, value_name = "FILE")]
    pub tlskey: Option<PathBuf>,
    /// Use TLS and verify the remote.
    #[arg(long)]
    pub tlsverify: bool,
}

impl GlobalOptions {
    /// Returns the effective log filter, honouring `--debug`.
    #[must_use]
    pub const fn log_filter(&self) -> &'static str {
        if self.debug {
            LogLevel::Debug.filter_directive()
        } else {
            self.log_level.filter_directive()
        }
    }

    /// Reports whether TLS is requested either directly or via verification.
    #[must_use]
    pub const fn uses_tls(&self) -> bool {
        self.tls || self.tlsverify
    }
}

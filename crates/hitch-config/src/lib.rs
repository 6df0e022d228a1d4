//! Shared configuration surface for the Hitch CLI and its plugins.
//!
//! A plugin is an executable named `hitch-<name>` that the parent `hitch`
//! binary re-executes when the user runs `hitch [OPTIONS] <name> ...`. Both
//! sides must agree on the constants below, on the global flag set parsed
//! ahead of the plugin name, and on the environment variables consulted when
//! the plugin boots. Keeping them in one crate stops the two halves of the
//! protocol drifting apart.

mod environment;
mod global;
mod logging;

pub use environment::{EnvironmentError, PluginEnvironment};
pub use global::GlobalOptions;
pub use logging::{LogFormat, LogFormatParseError, LogLevel};

/// Prefix shared by every plugin executable name.
pub const PLUGIN_NAME_PREFIX: &str = "hitch-";

/// Hidden subcommand a plugin answers with its JSON metadata.
pub const METADATA_SUBCOMMAND: &str = "hitch-cli-plugin-metadata";

/// Environment variable naming the executable that dispatched into the plugin.
///
/// Wrapped installations set this so the tunnel re-invokes the wrapper rather
/// than whichever `hitch` happens to be first on `PATH`.
pub const REEXEC_ENV: &str = "HITCH_CLI_PLUGIN_ORIGINAL_CLI_COMMAND";

/// Program re-executed for tunnelling when [`REEXEC_ENV`] is unset or empty.
pub const DEFAULT_PROGRAM: &str = "hitch";

/// Trailing tokens selecting the stdio tunnel on the re-executed parent.
pub const DIAL_STDIO_COMMAND: [&str; 2] = ["system", "dial-stdio"];

/// Environment variable selecting the plugin log format.
pub const LOG_FORMAT_ENV: &str = "HITCH_LOG_FORMAT";

/// Schema version stamped into plugin metadata by default.
pub const METADATA_SCHEMA_VERSION: &str = "0.1.0";

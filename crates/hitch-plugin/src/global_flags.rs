//! Reconstruction of the parent's global flags from the plugin's argv.
//!
//! The parent `hitch` binary re-executes `hitch-<name>` with its own argument
//! vector, so every token ahead of the plugin name is a global flag the
//! parent already parsed. Replaying exactly those tokens on
//! `hitch ... system dial-stdio` makes the tunnel resolve the same context,
//! host and TLS material the user selected.
//!
//! The scan is textual. It relies on the parent's dispatch guaranteeing that
//! the plugin name appears as a standalone token marking the end of the
//! global flags; a flag value that happens to equal the plugin name ends the
//! scan early, exactly as the parent's own dispatch would.

use std::ffi::{OsStr, OsString};

use hitch_config::DIAL_STDIO_COMMAND;

/// Returns the tokens preceding the first occurrence of `plugin_name`.
///
/// `args` excludes the program name. When the plugin name never appears the
/// whole vector is returned.
pub fn global_flags<'a, S>(args: &'a [S], plugin_name: &str) -> &'a [S]
where
    S: AsRef<OsStr>,
{
    let end = args
        .iter()
        .position(|arg| arg.as_ref() == OsStr::new(plugin_name))
        .unwrap_or(args.len());
    args.get(..end).unwrap_or(args)
}

/// Builds the argument list for the re-executed parent: the global flags
/// followed by the stdio tunnel subcommand.
pub fn tunnel_arguments<S>(args: &[S], plugin_name: &str) -> Vec<OsString>
where
    S: AsRef<OsStr>,
{
    global_flags(args, plugin_name)
        .iter()
        .map(|arg| arg.as_ref().to_os_string())
        .chain(DIAL_STDIO_COMMAND.iter().map(OsString::from))
        .collect()
}

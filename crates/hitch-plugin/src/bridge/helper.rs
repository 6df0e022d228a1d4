//! Resolution of the tunnel executable and the production client factory.

use std::env;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use hitch_config::PluginEnvironment;
use tracing::debug;

use super::{ApiClient, BRIDGE_TARGET, ClientFactory, CommandConn, Dialer, Duplex};
use crate::error::BridgeError;
use crate::global_flags::tunnel_arguments;

/// Dialer spawning a resolved executable with fixed arguments per dial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandConnectionHelper {
    program: PathBuf,
    args: Vec<OsString>,
}

impl CommandConnectionHelper {
    /// Resolves `program` against `PATH` and prepares to spawn it with `args`.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::ProgramNotFound`] when the executable cannot be
    /// located.
    pub fn new(program: &OsStr, args: Vec<OsString>) -> Result<Self, BridgeError> {
        let search_path = env::var_os("PATH");
        Self::with_search_path(program, args, search_path.as_deref())
    }

    /// Resolves `program` against an explicit search path.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::ProgramNotFound`] when the executable cannot be
    /// located.
    pub fn with_search_path(
        program: &OsStr,
        args: Vec<OsString>,
        search_path: Option<&OsStr>,
    ) -> Result<Self, BridgeError> {
        let resolved =
            locate_program(program, search_path).ok_or_else(|| BridgeError::ProgramNotFound {
                program: program.to_string_lossy().into_owned(),
            })?;
        debug!(
            target: BRIDGE_TARGET,
            program = %resolved.display(),
            "resolved tunnel executable"
        );
        Ok(Self {
            program: resolved,
            args,
        })
    }

    /// Resolved executable path.
    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Arguments passed on every dial.
    #[must_use]
    pub fn args(&self) -> &[OsString] {
        &self.args
    }
}

impl Dialer for CommandConnectionHelper {
    fn dial(&self) -> Result<Box<dyn Duplex>, BridgeError> {
        let conn = CommandConn::spawn(&self.program, &self.args)?;
        Ok(Box::new(conn))
    }
}

/// Client factory tunnelling through `hitch <global flags> system dial-stdio`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TunnelClientFactory;

impl ClientFactory for TunnelClientFactory {
    fn create(
        &self,
        plugin_name: &str,
        args: &[OsString],
        environment: &PluginEnvironment,
    ) -> Result<ApiClient, BridgeError> {
        let helper = tunnel_helper(plugin_name, args, environment)?;
        Ok(ApiClient::new(helper))
    }
}

/// Resolves the parent executable and the `system dial-stdio` arguments
/// forwarded to it.
fn tunnel_helper(
    plugin_name: &str,
    args: &[OsString],
    environment: &PluginEnvironment,
) -> Result<CommandConnectionHelper, BridgeError> {
    let program = environment.tunnel_program();
    CommandConnectionHelper::new(&program, tunnel_arguments(args, plugin_name))
}

/// Finds an executable for `program`.
///
/// Programs containing a path separator are checked in place; bare names are
/// searched for in each directory of `search_path`.
fn locate_program(program: &OsStr, search_path: Option<&OsStr>) -> Option<PathBuf> {
    if program.is_empty() {
        return None;
    }
    let candidate = Path::new(program);
    if candidate.components().count() > 1 {
        return is_executable(candidate).then(|| candidate.to_path_buf());
    }
    env::split_paths(search_path?).find_map(|dir| {
        let direct = dir.join(program);
        if is_executable(&direct) {
            return Some(direct);
        }
        let suffix = env::consts::EXE_SUFFIX;
        if suffix.is_empty() {
            return None;
        }
        let mut with_suffix = program.to_os_string();
        with_suffix.push(suffix);
        let suffixed = dir.join(with_suffix);
        is_executable(&suffixed).then_some(suffixed)
    })
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .is_ok_and(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

//! Binary entrypoint for the `hello` reference plugin.

use std::process::ExitCode;

use hitch_plugin_hello::{HelloPlugin, metadata};

fn main() -> ExitCode {
    hitch_plugin::run(&HelloPlugin, &metadata())
}

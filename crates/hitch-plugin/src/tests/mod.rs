//! Crate-level orchestration and BDD tests.

use std::ffi::OsString;
use std::process::ExitCode;
use std::sync::atomic::Ordering;

use hitch_config::{METADATA_SUBCOMMAND, PluginEnvironment};

use crate::cli::PluginCli;
use crate::metadata::Metadata;
use crate::run::PluginRunner;

pub(crate) mod support;

use support::{DemoPlugin, RecordingFactory};

struct Outcome {
    exit: ExitCode,
    stdout: String,
    stderr: String,
}

fn run_demo(
    plugin: &DemoPlugin,
    factory: Option<&RecordingFactory>,
    environment: PluginEnvironment,
    args: &[&str],
) -> Outcome {
    let metadata = Metadata::new().with_vendor("Hitch");
    let argv: Vec<OsString> = std::iter::once("hitch-demo")
        .chain(args.iter().copied())
        .map(OsString::from)
        .collect();
    let mut stdout: Vec<u8> = Vec::new();
    let mut stderr: Vec<u8> = Vec::new();
    let exit = {
        let mut cli = PluginCli::new(&mut stdout, &mut stderr, environment);
        let runner = PluginRunner::new(plugin, &metadata);
        match factory {
            Some(factory) => runner.with_client_factory(factory).run(argv, &mut cli),
            None => runner.run(argv, &mut cli),
        }
    };
    Outcome {
        exit,
        stdout: String::from_utf8(stdout).expect("stdout utf8"),
        stderr: String::from_utf8(stderr).expect("stderr utf8"),
    }
}

#[test]
fn metadata_query_needs_no_tunnel_executable() {
    let plugin = DemoPlugin::new();
    let environment = PluginEnvironment::default().with_reexec_program("/nonexistent/hitch");
    let outcome = run_demo(&plugin, None, environment, &[METADATA_SUBCOMMAND]);

    assert_eq!(outcome.exit, ExitCode::SUCCESS);
    assert_eq!(outcome.stderr, "");
    let parsed: Metadata = serde_json::from_str(&outcome.stdout).expect("metadata parses");
    assert_eq!(parsed.short_description(), "Demo plugin");
    assert!(!plugin.executed.get());
}

#[test]
fn real_command_fails_fast_without_tunnel_executable() {
    let plugin = DemoPlugin::new();
    let environment = PluginEnvironment::default().with_reexec_program("/nonexistent/hitch");
    let outcome = run_demo(&plugin, None, environment, &["demo", "noop"]);

    assert_eq!(outcome.exit, ExitCode::FAILURE);
    assert!(
        outcome.stderr.contains("/nonexistent/hitch"),
        "stderr: {}",
        outcome.stderr
    );
    assert!(!plugin.executed.get(), "command ran with a half-initialised client");
}

#[test]
fn client_is_available_while_command_runs() {
    let plugin = DemoPlugin::new();
    let factory = RecordingFactory::default();
    let outcome = run_demo(
        &plugin,
        Some(&factory),
        PluginEnvironment::default(),
        &["demo", "noop"],
    );

    assert_eq!(outcome.exit, ExitCode::SUCCESS);
    assert!(plugin.had_client.get());
}

#[test]
fn tunnel_is_released_when_run_returns() {
    let plugin = DemoPlugin::new();
    let factory = RecordingFactory::default();
    let outcome = run_demo(
        &plugin,
        Some(&factory),
        PluginEnvironment::default(),
        &["demo", "talk"],
    );

    assert_eq!(outcome.exit, ExitCode::SUCCESS);
    assert_eq!(outcome.stdout, "pong\n");
    assert_eq!(factory.sent.lock().expect("sent").as_slice(), b"hi\n");
    assert!(factory.connection_dropped.load(Ordering::SeqCst));
}

#[test]
fn tunnel_is_released_when_command_fails() {
    let plugin = DemoPlugin::new();
    let factory = RecordingFactory::default();
    let outcome = run_demo(
        &plugin,
        Some(&factory),
        PluginEnvironment::default(),
        &["demo", "sulk"],
    );

    assert_eq!(outcome.exit, ExitCode::from(4));
    assert_eq!(outcome.stderr, "sulking\n");
    assert!(factory.connection_dropped.load(Ordering::SeqCst));
}

#[test]
fn command_errors_print_their_message() {
    let plugin = DemoPlugin::new();
    let factory = RecordingFactory::default();
    let outcome = run_demo(
        &plugin,
        Some(&factory),
        PluginEnvironment::default(),
        &["demo", "boom"],
    );

    assert_eq!(outcome.exit, ExitCode::FAILURE);
    assert_eq!(outcome.stderr, "demo exploded\n");
}

#[test]
fn factory_sees_arguments_without_program_name() {
    let plugin = DemoPlugin::new();
    let factory = RecordingFactory::default();
    run_demo(
        &plugin,
        Some(&factory),
        PluginEnvironment::default(),
        &["-D", "demo", "noop"],
    );
    let received = factory.received.borrow().clone();
    assert_eq!(received, ["-D", "demo", "noop"]);
}

#[test]
fn usage_errors_end_with_a_single_newline() {
    let plugin = DemoPlugin::new();
    let factory = RecordingFactory::default();
    let outcome = run_demo(
        &plugin,
        Some(&factory),
        PluginEnvironment::default(),
        &["--bogus", "demo", "noop"],
    );

    assert_eq!(outcome.exit, ExitCode::FAILURE);
    assert!(outcome.stderr.contains("--bogus"), "stderr: {}", outcome.stderr);
    assert!(
        outcome.stderr.ends_with('\n') && !outcome.stderr.ends_with("\n\n"),
        "stderr: {:?}",
        outcome.stderr
    );
}

#[test]
fn bare_invocation_prints_help_to_stdout() {
    let plugin = DemoPlugin::new();
    let factory = RecordingFactory::default();
    let outcome = run_demo(&plugin, Some(&factory), PluginEnvironment::default(), &[]);

    assert_eq!(outcome.exit, ExitCode::SUCCESS);
    assert_eq!(outcome.stderr, "");
    assert!(
        outcome.stdout.contains("hitch [OPTIONS] demo [ARG...]"),
        "stdout: {}",
        outcome.stdout
    );
    assert_eq!(factory.calls.get(), 0);
}

#[test]
fn flags_without_plugin_command_are_a_usage_error() {
    let plugin = DemoPlugin::new();
    let factory = RecordingFactory::default();
    let outcome = run_demo(
        &plugin,
        Some(&factory),
        PluginEnvironment::default(),
        &["--context", "prod"],
    );

    assert_eq!(outcome.exit, ExitCode::FAILURE);
    assert_eq!(outcome.stdout, "");
    assert!(!outcome.stderr.is_empty());
}

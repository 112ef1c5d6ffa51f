//! `sispack` CLI entrypoint.
//!
//! This binary packages a Python for S60 application into a SIS archive using
//! the Symbian SDK's `uidcrc` and `makesis` tools.

use camino::Utf8Path;
use clap::Parser;
use sispack::cli::Cli;
use sispack::config::PackagerConfig;
use sispack::dirs::{BaseDirs, SystemBaseDirs};
use sispack::error::{PackagerError, Result};
use sispack::executor::SystemCommandExecutor;
use sispack::output::{report_retained_staging, report_success, write_stderr_line};
use sispack::pipeline::{Toolset, artifact_sha256, make_package};
use std::io::Write;

fn main() {
    let cli = Cli::parse();
    init_logging(&cli);

    let mut stderr = std::io::stderr();
    let run_result = run(&cli, &mut stderr);
    let exit_code = exit_code_for_run_result(run_result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn init_logging(cli: &Cli) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_filter()))
        .format_timestamp(None)
        .init();
}

fn run(cli: &Cli, stderr: &mut dyn Write) -> Result<()> {
    let dirs = SystemBaseDirs::new();
    let dirs_ref = dirs.as_ref().map(|d| d as &dyn BaseDirs);

    let mut config = PackagerConfig::load(cli.config.as_deref(), dirs_ref)?;
    cli.apply_overrides(&mut config);

    let executor = SystemCommandExecutor;
    let toolset = Toolset::from_config(&executor, &config, dirs_ref);
    let request = cli.to_request();

    if !cli.quiet {
        write_stderr_line(stderr, format!("Packaging {}...", request.source));
    }

    let outcome = match make_package(&request, &toolset) {
        Ok(outcome) => outcome,
        Err(err) => {
            if let Some(kept) =
                staging_kept_after_failure(request.keep_staging, &toolset.staging_dir, &err)
            {
                report_retained_staging(stderr, kept);
            }
            return Err(err);
        }
    };

    if !cli.quiet {
        let digest = match artifact_sha256(&outcome.artifact) {
            Ok(digest) => Some(digest),
            Err(err) => {
                log::warn!("could not hash {}: {err}", outcome.artifact);
                None
            }
        };
        report_success(stderr, &outcome, digest.as_deref());
    }

    Ok(())
}

/// Staging directory a failed run left behind, shown even under `--quiet`.
fn staging_kept_after_failure<'a>(
    keep_staging: bool,
    staging_dir: &'a Utf8Path,
    err: &PackagerError,
) -> Option<&'a Utf8Path> {
    (keep_staging && !err.is_input_error() && staging_dir.is_dir()).then_some(staging_dir)
}

fn exit_code_for_run_result(result: Result<()>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            write_stderr_line(stderr, format!("ERROR {err}"));
            1
        }
    }
}

//! User-facing progress and summary output.
//!
//! Diagnostics go through `log`; the lines here are the run's own report and
//! are written to stderr regardless of the log level, unless `--quiet` is set.

use crate::pipeline::PackageOutcome;
use camino::Utf8Path;
use std::fmt::Display;
use std::io::Write;

/// Write one line to `stderr`, ignoring write failures.
pub fn write_stderr_line(stderr: &mut dyn Write, message: impl Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort output; ignore write failures.
    }
}

/// Format the summary printed after a successful run.
///
/// # Example
///
/// ```
/// use camino::Utf8PathBuf;
/// use sispack::output::success_message;
/// use sispack::pipeline::PackageOutcome;
/// use sispack::uid::Uid;
///
/// let outcome = PackageOutcome {
///     artifact: Utf8PathBuf::from("snake.sis"),
///     app_name: "snake".to_owned(),
///     uid: Uid::new(0x1234_5678),
///     tool_output: String::new(),
///     retained_staging: None,
/// };
/// assert_eq!(
///     success_message(&outcome),
///     "Created snake.sis for snake (UID 0x12345678)"
/// );
/// ```
#[must_use]
pub fn success_message(outcome: &PackageOutcome) -> String {
    format!(
        "Created {} for {} (UID {})",
        outcome.artifact, outcome.app_name, outcome.uid
    )
}

/// Write the full success report: tool output, summary, digest and any
/// retained staging directory.
pub fn report_success(stderr: &mut dyn Write, outcome: &PackageOutcome, sha256: Option<&str>) {
    let tool_output = outcome.tool_output.trim_end();
    if !tool_output.is_empty() {
        write_stderr_line(stderr, tool_output);
    }
    write_stderr_line(stderr, success_message(outcome));
    if let Some(digest) = sha256 {
        write_stderr_line(stderr, format!("  sha256 {digest}"));
    }
    if let Some(kept) = &outcome.retained_staging {
        report_retained_staging(stderr, kept);
    }
}

/// Point at a staging directory left on disk, after success or failure.
pub fn report_retained_staging(stderr: &mut dyn Write, kept: &Utf8Path) {
    write_stderr_line(stderr, format!("  staging files kept in {kept}"));
}

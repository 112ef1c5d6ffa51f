//! Archive creation via the SDK `makesis` tool.

use crate::error::{PackagerError, Result};
use crate::executor::{CommandExecutor, combined_output};
use camino::Utf8Path;

/// Default program name of the archive builder.
pub const DEFAULT_MAKESIS: &str = "makesis";

/// Runs `makesis -d<search dir> <pkg> <sis>`.
#[derive(Clone)]
pub struct PackagingInvoker<'a> {
    executor: &'a dyn CommandExecutor,
    program: String,
}

impl<'a> PackagingInvoker<'a> {
    /// Create an invoker that runs `program` through `executor`.
    #[must_use]
    pub fn new(executor: &'a dyn CommandExecutor, program: impl Into<String>) -> Self {
        Self {
            executor,
            program: program.into(),
        }
    }

    /// Build `sis` from descriptor `pkg`, resolving relative sources against
    /// `search_dir`. Returns the tool's raw combined output.
    ///
    /// # Errors
    ///
    /// Returns [`PackagerError::PackagingToolFailed`] if the tool cannot be
    /// spawned, exits unsuccessfully, or prints nothing.
    pub fn invoke(&self, search_dir: &Utf8Path, pkg: &Utf8Path, sis: &Utf8Path) -> Result<String> {
        let search_arg = format!("-d{search_dir}");
        let output = self
            .executor
            .run(&self.program, &[search_arg.as_str(), pkg.as_str(), sis.as_str()])
            .map_err(|err| self.failed(err.to_string()))?;

        let text = combined_output(&output);
        if !output.status.success() || text.trim().is_empty() {
            log::debug!("{} exited with {}", self.program, output.status);
            return Err(self.failed(text));
        }

        log::debug!("{} created {sis}", self.program);
        Ok(text)
    }

    fn failed(&self, output: String) -> PackagerError {
        PackagerError::PackagingToolFailed {
            tool: self.program.clone(),
            output,
        }
    }
}

impl std::fmt::Debug for PackagingInvoker<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PackagingInvoker")
            .field("executor", &"<CommandExecutor>")
            .field("program", &self.program)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{ExpectedCall, StubExecutor, failure_output, stdout_output};
    use rstest::rstest;

    const OK_OUTPUT: &str = "Processing snake.pkg...\nCreating snake.sis\n";

    fn invoke(executor: &StubExecutor) -> Result<String> {
        PackagingInvoker::new(executor, DEFAULT_MAKESIS).invoke(
            Utf8Path::new("/tmp/stage"),
            Utf8Path::new("/tmp/stage/snake.pkg"),
            Utf8Path::new("out/snake.sis"),
        )
    }

    #[test]
    fn passes_search_dir_descriptor_and_output() {
        let executor = StubExecutor::new(vec![ExpectedCall {
            cmd: "makesis",
            args: Some(vec![
                "-d/tmp/stage".to_owned(),
                "/tmp/stage/snake.pkg".to_owned(),
                "out/snake.sis".to_owned(),
            ]),
            result: Ok(stdout_output(OK_OUTPUT)),
        }]);

        let output = invoke(&executor).expect("makesis succeeds");
        assert_eq!(output, OK_OUTPUT);
        executor.assert_finished();
    }

    #[rstest]
    #[case::silent(stdout_output(""), "")]
    #[case::nonzero_exit(failure_output("Error in pkg file line 3"), "Error in pkg file line 3")]
    fn failures_carry_raw_output(
        #[case] response: std::process::Output,
        #[case] expected: &str,
    ) {
        let executor = StubExecutor::new(vec![ExpectedCall {
            cmd: "makesis",
            args: None,
            result: Ok(response),
        }]);

        let err = invoke(&executor).expect_err("makesis fails");
        assert!(matches!(
            err,
            PackagerError::PackagingToolFailed { tool, output } if tool == "makesis" && output == expected
        ));
    }

    #[test]
    fn spawn_failure_is_packaging_failure() {
        let executor = StubExecutor::new(vec![ExpectedCall {
            cmd: "makesis",
            args: None,
            result: Err(std::io::Error::other("No such file or directory").into()),
        }]);

        let err = invoke(&executor).expect_err("makesis missing");
        assert!(err.is_tool_failure());
        assert!(err.to_string().contains("No such file or directory"));
    }
}

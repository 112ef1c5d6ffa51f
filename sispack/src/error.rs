//! Error types for the packaging pipeline.
//!
//! Every stage of a packaging run fails with its own variant so callers can
//! tell a bad identifier apart from a missing SDK tool or a staging failure.
//! Variants carry the path or raw tool output needed to diagnose the problem.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that can occur while packaging an application.
#[derive(Debug, Error)]
pub enum PackagerError {
    /// The source path does not exist.
    #[error("file or directory not found: {path}")]
    SourceNotFound {
        /// Path supplied as the packaging source.
        path: Utf8PathBuf,
    },

    /// A directory source has no `default.py` entry script.
    #[error("no default.py found in {dir}")]
    EntryScriptNotFound {
        /// Directory that was searched.
        dir: Utf8PathBuf,
    },

    /// A single-file source is not a Python script.
    #[error("source file does not end in .py: {path}")]
    UnsupportedSourceFile {
        /// The rejected file.
        path: Utf8PathBuf,
    },

    /// The application name cannot be used as a file name in staging.
    #[error("invalid application name: {name:?}")]
    InvalidAppName {
        /// The rejected name.
        name: String,
    },

    /// No UID was supplied and the entry script declares none.
    #[error("no SYMBIAN_UID found in {script}")]
    MissingIdentifier {
        /// Entry script that was searched for the marker.
        script: Utf8PathBuf,
    },

    /// A supplied or extracted UID is not `0x` followed by eight hex digits.
    #[error("invalid UID: {value}")]
    InvalidIdentifier {
        /// The rejected value.
        value: String,
    },

    /// Creating, populating, or removing the staging directory failed.
    #[error("staging failed at {path}: {source}")]
    StagingIo {
        /// Path being operated on when the failure occurred.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A template resource could not be read.
    #[error("template {path} is unavailable: {source}")]
    TemplateUnavailable {
        /// Path of the missing or unreadable template.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The binary stub template is too small for the selected layout.
    #[error("binary template is {actual} bytes; layout requires at least {required}")]
    TemplateTooShort {
        /// Minimum length demanded by the layout.
        required: usize,
        /// Length of the supplied template.
        actual: usize,
    },

    /// Two staged files map to the same install destination.
    #[error("manifest conflict: {first} and {second} both install to {destination}")]
    ManifestConflict {
        /// Install-time destination claimed twice.
        destination: String,
        /// First staged file claiming it.
        first: String,
        /// Second staged file claiming it.
        second: String,
    },

    /// The descriptor template lacks a required placeholder.
    #[error("descriptor template is missing the {placeholder} placeholder")]
    DescriptorTemplate {
        /// The absent placeholder, braces included.
        placeholder: &'static str,
    },

    /// The `uidcrc` utility could not produce a checksum.
    #[error("'{tool}' utility failed: {reason}; make sure the Symbian SDK is installed and configured")]
    ChecksumServiceUnavailable {
        /// Program that was invoked.
        tool: String,
        /// Description of the failure.
        reason: String,
    },

    /// The `makesis` tool failed to build the archive.
    #[error("'{tool}' failed to create the SIS file:\n{output}")]
    PackagingToolFailed {
        /// Program that was invoked.
        tool: String,
        /// Raw combined output of the tool, verbatim.
        output: String,
    },

    /// The configuration file could not be read or parsed.
    #[error("invalid configuration at {path}: {reason}")]
    Config {
        /// Path to the configuration file.
        path: Utf8PathBuf,
        /// Description of the problem.
        reason: String,
    },

    /// An I/O operation outside staging failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Test stub received an unexpected or mismatched command invocation.
    #[cfg(any(test, feature = "test-support"))]
    #[error("stub mismatch: {message}")]
    StubMismatch {
        /// Description of what was expected versus what was received.
        message: String,
    },
}

impl PackagerError {
    /// Wraps an I/O error raised while touching the staging directory.
    pub(crate) fn staging(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::StagingIo {
            path: path.into(),
            source,
        }
    }

    /// Returns true when the failure came from an external SDK tool.
    #[must_use]
    pub fn is_tool_failure(&self) -> bool {
        matches!(
            self,
            Self::ChecksumServiceUnavailable { .. } | Self::PackagingToolFailed { .. }
        )
    }

    /// Returns true when the failure happened before staging began.
    #[must_use]
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::SourceNotFound { .. }
                | Self::EntryScriptNotFound { .. }
                | Self::UnsupportedSourceFile { .. }
                | Self::InvalidAppName { .. }
                | Self::MissingIdentifier { .. }
                | Self::InvalidIdentifier { .. }
        )
    }
}

/// Result type alias using [`PackagerError`].
pub type Result<T> = std::result::Result<T, PackagerError>;

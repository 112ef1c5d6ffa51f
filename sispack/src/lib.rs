//! Python for S60 SIS packager library.
//!
//! This crate turns a Python for S60 script or application directory into an
//! installable SIS archive. It patches a prebuilt `.app` launcher stub with the
//! application's UID, stages the application files, writes a `makesis`
//! package descriptor, and runs the Symbian SDK tools. The `sispack` binary is
//! a thin wrapper around [`pipeline::make_package`].
//!
//! # Modules
//!
//! - [`checksum`] - UID checksums via `uidcrc`
//! - [`cli`] - Command-line argument definitions
//! - [`config`] - `sispack.toml` configuration loading
//! - [`descriptor`] - `.pkg` descriptor rendering
//! - [`dirs`] - Directory resolution abstraction for platform-specific paths
//! - [`error`] - Error types for every packaging step
//! - [`executor`] - External command execution
//! - [`makesis`] - Archive creation via `makesis`
//! - [`manifest`] - Staged file to install path mapping
//! - [`output`] - User-facing progress and summary output
//! - [`patcher`] - Binary `.app` stub patching
//! - [`pipeline`] - End-to-end packaging orchestration
//! - [`source`] - Entry script and application name resolution
//! - [`staging`] - Staging directory lifecycle
//! - [`template`] - Template resources and stub layouts
//! - [`uid`] - Application UID parsing and extraction

pub mod checksum;
pub mod cli;
pub mod config;
pub mod descriptor;
pub mod dirs;
pub mod error;
pub mod executor;
pub mod makesis;
pub mod manifest;
pub mod output;
pub mod patcher;
pub mod pipeline;
pub mod source;
pub mod staging;
pub mod template;
pub mod uid;

#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;

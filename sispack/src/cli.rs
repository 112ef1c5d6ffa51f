//! CLI argument definitions for the `sispack` binary.
//!
//! Flags keep the spelling of the classic `py2sis` tool (`--uid`,
//! `--appname`, `--presdk20`, `--leavetemp`) so existing build scripts keep
//! working.

use crate::config::PackagerConfig;
use crate::pipeline::PackagingRequest;
use crate::template::TemplateVariant;
use camino::Utf8PathBuf;
use clap::Parser;

/// Package a Python for S60 application into a SIS archive.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "sispack")]
#[command(version, about)]
#[command(long_about = concat!(
    "Package a Python for S60 application into an installable SIS archive.\n\n",
    "The source is either a single .py script or a directory whose default.py is ",
    "the entry point. The application UID comes from --uid or from a ",
    "`SYMBIAN_UID = 0x........` line in the entry script.\n\n",
    "The Symbian SDK tools uidcrc and makesis must be installed, and the template ",
    "directory must hold the pyapp, pyrsc and pypkg templates.",
))]
#[command(after_help = concat!(
    "EXAMPLES:\n",
    "  Package a directory, reading the UID from default.py:\n",
    "    $ sispack snake/\n\n",
    "  Package a single script with an explicit UID and name:\n",
    "    $ sispack snake.py snake.sis --uid=0x01234567 --appname=Snake\n\n",
    "  Build for pre-SDK 2.0 phones and keep the staging files:\n",
    "    $ sispack snake/ --presdk20 --leavetemp\n\n",
    "CONFIGURATION:\n",
    "  Defaults are read from sispack.toml in the platform config directory,\n",
    "  or from the file given with --config. RUST_LOG overrides the log level.",
))]
pub struct Cli {
    /// Source script or directory.
    #[arg(value_name = "SRC")]
    pub source: Utf8PathBuf,

    /// Path of the created SIS file [default: APPNAME.sis].
    #[arg(value_name = "SISFILE")]
    pub sisfile: Option<Utf8PathBuf>,

    /// Symbian UID for the application, e.g. 0x01234567.
    #[arg(long, value_name = "UID")]
    pub uid: Option<String>,

    /// Name of the application.
    #[arg(long = "appname", value_name = "NAME")]
    pub app_name: Option<String>,

    /// Use a format suitable for pre-SDK 2.0 phones.
    #[arg(long = "presdk20")]
    pub pre_sdk20: bool,

    /// Leave temporary files in place.
    #[arg(long = "leavetemp")]
    pub leave_temp: bool,

    /// Configuration file [default: platform config directory].
    #[arg(long, value_name = "FILE")]
    pub config: Option<Utf8PathBuf>,

    /// Directory holding the template files.
    #[arg(long, value_name = "DIR")]
    pub templates_dir: Option<Utf8PathBuf>,

    /// Staging directory [default: per-process temporary directory].
    #[arg(long, value_name = "DIR")]
    pub staging_dir: Option<Utf8PathBuf>,

    /// Increase log verbosity (repeatable: -v, -vv, -vvv).
    #[arg(
        short,
        long = "verbose",
        action = clap::ArgAction::Count,
        conflicts_with = "quiet"
    )]
    pub verbosity: u8,

    /// Suppress progress output (errors still shown).
    #[arg(short, long, conflicts_with = "verbosity")]
    pub quiet: bool,
}

impl Cli {
    /// Build the packaging request described by the arguments.
    #[must_use]
    pub fn to_request(&self) -> PackagingRequest {
        PackagingRequest {
            source: self.source.clone(),
            output: self.sisfile.clone(),
            uid: self.uid.clone(),
            app_name: self.app_name.clone(),
            variant: TemplateVariant::from_legacy_flag(self.pre_sdk20),
            keep_staging: self.leave_temp,
        }
    }

    /// Apply directory overrides on top of file configuration.
    pub fn apply_overrides(&self, config: &mut PackagerConfig) {
        if let Some(dir) = &self.templates_dir {
            config.templates_dir = Some(dir.clone());
        }
        if let Some(dir) = &self.staging_dir {
            config.staging_dir = Some(dir.clone());
        }
    }

    /// Default `env_logger` filter for the requested verbosity.
    #[must_use]
    pub const fn log_filter(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbosity {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;

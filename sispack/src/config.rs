//! Packager configuration loaded from `sispack.toml`.
//!
//! Every key is optional; an absent file yields the defaults. Command-line
//! flags are applied on top by the binary.
//!
//! ```toml
//! templates_dir = "/opt/s60/py2sis/templates"
//! staging_dir = "/tmp/sispack-build"
//! uidcrc_program = "uidcrc"
//! makesis_program = "/opt/s60/epoc32/tools/makesis"
//! ```

use crate::checksum::DEFAULT_UIDCRC;
use crate::dirs::{BaseDirs, TEMPLATES_DIR_NAME};
use crate::error::{PackagerError, Result};
use crate::makesis::DEFAULT_MAKESIS;
use crate::staging::default_staging_dir;
use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;

/// Settings shared by every packaging run.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct PackagerConfig {
    /// Directory holding the `.app`, `.rsc` and `.pkg` templates.
    pub templates_dir: Option<Utf8PathBuf>,
    /// Staging directory; defaults to a per-process temporary path.
    pub staging_dir: Option<Utf8PathBuf>,
    /// Program run to checksum UIDs.
    pub uidcrc_program: String,
    /// Program run to build the SIS archive.
    pub makesis_program: String,
}

impl Default for PackagerConfig {
    fn default() -> Self {
        Self {
            templates_dir: None,
            staging_dir: None,
            uidcrc_program: DEFAULT_UIDCRC.to_owned(),
            makesis_program: DEFAULT_MAKESIS.to_owned(),
        }
    }
}

impl PackagerConfig {
    /// Parse configuration text read from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`PackagerError::Config`] if the text is not valid TOML or
    /// contains unknown keys.
    pub fn from_toml(text: &str, path: &Utf8Path) -> Result<Self> {
        toml::from_str(text).map_err(|e| PackagerError::Config {
            path: path.to_owned(),
            reason: e.to_string(),
        })
    }

    /// Load configuration from `explicit`, or from the default location.
    ///
    /// An explicit path must exist. The default file is optional.
    ///
    /// # Errors
    ///
    /// Returns [`PackagerError::Config`] if the chosen file cannot be read or
    /// parsed.
    pub fn load(explicit: Option<&Utf8Path>, dirs: Option<&dyn BaseDirs>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_file(path);
        }

        match dirs.and_then(|d| d.config_file()) {
            Some(path) if path.is_file() => Self::load_file(&path),
            Some(path) => {
                log::debug!("no configuration at {path}; using defaults");
                Ok(Self::default())
            }
            None => Ok(Self::default()),
        }
    }

    fn load_file(path: &Utf8Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| PackagerError::Config {
            path: path.to_owned(),
            reason: e.to_string(),
        })?;
        log::debug!("loaded configuration from {path}");
        Self::from_toml(&text, path)
    }

    /// Templates directory: configured, else the platform data directory,
    /// else `templates` relative to the working directory.
    #[must_use]
    pub fn resolve_templates_dir(&self, dirs: Option<&dyn BaseDirs>) -> Utf8PathBuf {
        self.templates_dir
            .clone()
            .or_else(|| dirs.and_then(|d| d.templates_dir()))
            .unwrap_or_else(|| Utf8PathBuf::from(TEMPLATES_DIR_NAME))
    }

    /// Staging directory: configured, else a per-process temporary path.
    #[must_use]
    pub fn resolve_staging_dir(&self) -> Utf8PathBuf {
        self.staging_dir.clone().unwrap_or_else(default_staging_dir)
    }
}

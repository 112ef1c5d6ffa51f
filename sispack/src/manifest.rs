//! Install manifest construction.
//!
//! Every file in the staging directory becomes one [`ManifestEntry`] mapping
//! its staged location to the on-device path it installs to.

use crate::error::{PackagerError, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::collections::HashMap;
use std::fmt;
use walkdir::WalkDir;

/// Device path separator.
const DEVICE_SEPARATOR: char = '\\';

/// On-device directory an application installs into.
///
/// `!:` lets the installer pick the drive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallRoot(String);

impl InstallRoot {
    /// Install root of application `app_name`: `!:\system\apps\<app_name>\`.
    #[must_use]
    pub fn for_app(app_name: &str) -> Self {
        Self(format!(r"!:\system\apps\{app_name}\"))
    }

    /// Rendered root, ending in a separator.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn destination(&self, relative: &Utf8Path) -> String {
        let mut dest = self.0.clone();
        for (i, component) in relative.components().enumerate() {
            if i > 0 {
                dest.push(DEVICE_SEPARATOR);
            }
            dest.push_str(component.as_str());
        }
        dest
    }
}

impl fmt::Display for InstallRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A staged file and where it installs on the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    /// Path relative to the staging root.
    pub source: Utf8PathBuf,
    /// Absolute on-device destination.
    pub destination: String,
}

/// List every regular file under `staging_root` with its install destination.
///
/// Entries are ordered by path. Destinations are compared case-insensitively,
/// matching the device filesystem.
///
/// # Errors
///
/// - [`PackagerError::StagingIo`] if the directory cannot be walked.
/// - [`PackagerError::ManifestConflict`] if two files map to the same
///   destination.
pub fn build(staging_root: &Utf8Path, install_root: &InstallRoot) -> Result<Vec<ManifestEntry>> {
    let mut entries = Vec::new();
    let mut claimed: HashMap<String, Utf8PathBuf> = HashMap::new();

    for entry in WalkDir::new(staging_root).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            PackagerError::staging(staging_root, std::io::Error::other(e.to_string()))
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let source = relative_path(staging_root, entry.path())?;
        let destination = install_root.destination(&source);

        if let Some(first) = claimed.insert(destination.to_lowercase(), source.clone()) {
            return Err(PackagerError::ManifestConflict {
                destination,
                first: first.into_string(),
                second: source.into_string(),
            });
        }

        entries.push(ManifestEntry {
            source,
            destination,
        });
    }

    log::debug!("manifest has {} entries under {install_root}", entries.len());
    Ok(entries)
}

fn relative_path(root: &Utf8Path, path: &std::path::Path) -> Result<Utf8PathBuf> {
    let relative = path.strip_prefix(root).map_err(|e| {
        PackagerError::staging(root, std::io::Error::other(e.to_string()))
    })?;
    Utf8PathBuf::try_from(relative.to_owned()).map_err(|e| {
        PackagerError::staging(
            root,
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()),
        )
    })
}

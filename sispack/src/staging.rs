//! Staging directory lifecycle.
//!
//! The staging area holds a filtered copy of the application source plus the
//! generated stub, resource, and descriptor files that `makesis` consumes.
//! It is recreated empty at the start of each run and removed when the run
//! ends, unless the caller asks to keep it for inspection.

use crate::error::{PackagerError, Result};
use crate::source::{ENTRY_SCRIPT, ResolvedSource, SourceKind};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use walkdir::WalkDir;

/// Extensions of compiled Python artefacts never shipped in a package.
pub const EXCLUDED_EXTENSIONS: &[&str] = &["pyc", "pyo"];

/// A resource copied into the staging root under a fixed name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedResource {
    /// File to copy.
    pub from: Utf8PathBuf,
    /// Name of the copy inside the staging root.
    pub name: String,
}

/// Exclusively owned staging directory for one packaging run.
///
/// Dropping a staging area that was neither disposed nor retained removes
/// the directory, so early returns and panics do not leak it.
#[derive(Debug)]
pub struct StagingArea {
    root: Utf8PathBuf,
    armed: bool,
}

impl StagingArea {
    /// Remove any existing tree at `root` and create it empty.
    ///
    /// # Errors
    ///
    /// Returns [`PackagerError::StagingIo`] if the old tree cannot be removed
    /// or the directory cannot be created.
    pub fn prepare(root: impl Into<Utf8PathBuf>) -> Result<Self> {
        let root = root.into();
        if root.exists() {
            log::debug!("removing stale staging directory {root}");
            fs::remove_dir_all(&root).map_err(|e| PackagerError::staging(&root, e))?;
        }
        fs::create_dir_all(&root).map_err(|e| PackagerError::staging(&root, e))?;

        Ok(Self { root, armed: true })
    }

    /// Return the staging root.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.root
    }

    /// Copy the application source and fixed-name resources into staging.
    ///
    /// A directory source is copied recursively, keeping its layout and
    /// skipping [`EXCLUDED_EXTENSIONS`]. A single script is staged as
    /// `default.py`. Returns the staged paths, relative to the root.
    ///
    /// # Errors
    ///
    /// Returns [`PackagerError::StagingIo`] on the first failed copy. The
    /// partially populated area must then be disposed.
    pub fn populate(
        &self,
        source: &ResolvedSource,
        resources: &[StagedResource],
    ) -> Result<Vec<Utf8PathBuf>> {
        let mut staged = match source.kind {
            SourceKind::Directory => self.copy_tree(&source.root)?,
            SourceKind::File => {
                self.copy_file(&source.root, Utf8Path::new(ENTRY_SCRIPT))?;
                vec![Utf8PathBuf::from(ENTRY_SCRIPT)]
            }
        };

        for resource in resources {
            let relative = Utf8PathBuf::from(&resource.name);
            self.copy_file(&resource.from, &relative)?;
            staged.push(relative);
        }

        log::debug!("staged {} file(s) in {}", staged.len(), self.root);
        Ok(staged)
    }

    /// Write generated bytes to `name` inside the staging root.
    ///
    /// # Errors
    ///
    /// Returns [`PackagerError::StagingIo`] if the write fails.
    pub fn write_file(&self, name: &str, contents: impl AsRef<[u8]>) -> Result<Utf8PathBuf> {
        let path = self.root.join(name);
        fs::write(&path, contents).map_err(|e| PackagerError::staging(&path, e))?;
        Ok(path)
    }

    /// Remove the staging directory.
    ///
    /// # Errors
    ///
    /// Returns [`PackagerError::StagingIo`] if removal fails.
    pub fn dispose(mut self) -> Result<()> {
        self.armed = false;
        remove_tree(&self.root)
    }

    /// Keep the staging directory on disk and return its path.
    #[must_use]
    pub fn retain(mut self) -> Utf8PathBuf {
        self.armed = false;
        std::mem::take(&mut self.root)
    }

    fn copy_tree(&self, src_root: &Utf8Path) -> Result<Vec<Utf8PathBuf>> {
        let mut staged = Vec::new();
        let walker = WalkDir::new(src_root).sort_by_file_name();

        for entry in walker {
            let entry = entry.map_err(|e| walk_error(src_root, e))?;
            if !entry.file_type().is_file() || is_excluded(entry.path()) {
                continue;
            }

            let path = utf8_path(entry.path())?;
            let relative = path.strip_prefix(src_root).map_err(|e| {
                PackagerError::staging(&path, std::io::Error::other(e.to_string()))
            })?;
            self.copy_file(&path, relative)?;
            staged.push(relative.to_owned());
        }

        Ok(staged)
    }

    fn copy_file(&self, from: &Utf8Path, relative: &Utf8Path) -> Result<()> {
        let dest = self.root.join(relative);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(|e| PackagerError::staging(parent, e))?;
        }
        fs::copy(from, &dest).map_err(|e| PackagerError::StagingIo {
            path: dest.clone(),
            source: std::io::Error::new(e.kind(), format!("failed to copy {from}: {e}")),
        })?;
        Ok(())
    }
}

impl Drop for StagingArea {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if let Err(err) = remove_tree(&self.root) {
            log::warn!("failed to clean up staging directory: {err}");
        }
    }
}

/// Default staging location, unique to this process.
#[must_use]
pub fn default_staging_dir() -> Utf8PathBuf {
    let tmp = Utf8PathBuf::try_from(std::env::temp_dir())
        .unwrap_or_else(|_| Utf8PathBuf::from("."));
    tmp.join(format!("sispack-{}", std::process::id()))
}

fn remove_tree(root: &Utf8Path) -> Result<()> {
    match fs::remove_dir_all(root) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(PackagerError::staging(root, e)),
    }
}

fn is_excluded(path: &std::path::Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| EXCLUDED_EXTENSIONS.contains(&ext))
}

fn utf8_path(path: &std::path::Path) -> Result<Utf8PathBuf> {
    Utf8PathBuf::try_from(path.to_owned()).map_err(|e| {
        PackagerError::staging(
            Utf8PathBuf::from(path.to_string_lossy().into_owned()),
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()),
        )
    })
}

fn walk_error(root: &Utf8Path, err: walkdir::Error) -> PackagerError {
    let path = err
        .path()
        .and_then(|p| Utf8Path::from_path(p))
        .map_or_else(|| root.to_owned(), Utf8Path::to_owned);
    PackagerError::staging(path, std::io::Error::other(err.to_string()))
}

//! Entry script and application name resolution.
//!
//! A packaging source is either a single `.py` script or a directory whose
//! `default.py` is the entry point.

use crate::error::{PackagerError, Result};
use camino::{Utf8Path, Utf8PathBuf};

/// File name of the entry script inside a source directory.
pub const ENTRY_SCRIPT: &str = "default.py";

/// Extension a single-file source must carry.
pub const SOURCE_EXTENSION: &str = "py";

/// Shape of the packaging source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// A lone script, staged as `default.py`.
    File,
    /// A directory tree copied wholesale.
    Directory,
}

/// Outcome of resolving a packaging source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSource {
    /// The source path as given.
    pub root: Utf8PathBuf,
    /// Script whose text declares the UID.
    pub entry_script: Utf8PathBuf,
    /// Name used when the request does not set one.
    pub default_app_name: String,
    /// Whether the source is a file or a directory.
    pub kind: SourceKind,
}

impl ResolvedSource {
    /// Read the entry script's text.
    ///
    /// Scripts are often Latin-1; bytes that are not UTF-8 are replaced so
    /// the ASCII `SYMBIAN_UID` marker can still be found.
    ///
    /// # Errors
    ///
    /// Returns [`PackagerError::Io`] if the script cannot be read.
    pub fn read_entry_script(&self) -> Result<String> {
        let bytes = std::fs::read(&self.entry_script)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Resolve `path` to its entry script and default application name.
///
/// # Errors
///
/// - [`PackagerError::SourceNotFound`] if `path` does not exist.
/// - [`PackagerError::UnsupportedSourceFile`] for a file without a `.py`
///   extension.
/// - [`PackagerError::EntryScriptNotFound`] for a directory lacking
///   `default.py`.
///
/// # Examples
///
/// ```no_run
/// use camino::Utf8Path;
/// use sispack::source::{SourceKind, resolve};
///
/// let source = resolve(Utf8Path::new("apps/snake"))?;
/// assert_eq!(source.kind, SourceKind::Directory);
/// assert_eq!(source.default_app_name, "snake");
/// # Ok::<(), sispack::error::PackagerError>(())
/// ```
pub fn resolve(path: &Utf8Path) -> Result<ResolvedSource> {
    if !path.exists() {
        return Err(PackagerError::SourceNotFound {
            path: path.to_owned(),
        });
    }

    if path.is_file() {
        resolve_file(path)
    } else {
        resolve_directory(path)
    }
}

fn resolve_file(path: &Utf8Path) -> Result<ResolvedSource> {
    let stem = match (path.extension(), path.file_stem()) {
        (Some(SOURCE_EXTENSION), Some(stem)) if !stem.is_empty() => stem,
        _ => {
            return Err(PackagerError::UnsupportedSourceFile {
                path: path.to_owned(),
            });
        }
    };

    Ok(ResolvedSource {
        root: path.to_owned(),
        entry_script: path.to_owned(),
        default_app_name: stem.to_owned(),
        kind: SourceKind::File,
    })
}

fn resolve_directory(path: &Utf8Path) -> Result<ResolvedSource> {
    let entry_script = path.join(ENTRY_SCRIPT);
    if !entry_script.is_file() {
        return Err(PackagerError::EntryScriptNotFound {
            dir: path.to_owned(),
        });
    }

    Ok(ResolvedSource {
        root: path.to_owned(),
        entry_script,
        default_app_name: directory_name(path),
        kind: SourceKind::Directory,
    })
}

/// Check that `name` can name the generated `.app`, `.rsc` and `.pkg` files.
///
/// # Errors
///
/// Returns [`PackagerError::InvalidAppName`] if `name` is empty, `.` or `..`,
/// or contains a path separator.
pub fn validate_app_name(name: &str) -> Result<()> {
    let has_separator = name.contains(['/', '\\']);
    if name.is_empty() || name == "." || name == ".." || has_separator {
        return Err(PackagerError::InvalidAppName {
            name: name.to_owned(),
        });
    }
    Ok(())
}

/// Base name of a directory, tolerating trailing separators and `.`.
fn directory_name(path: &Utf8Path) -> String {
    if let Some(name) = path.file_name() {
        return name.to_owned();
    }
    path.canonicalize_utf8()
        .ok()
        .and_then(|p| p.file_name().map(str::to_owned))
        .unwrap_or_else(|| path.as_str().to_owned())
}

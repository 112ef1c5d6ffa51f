//! Platform directory lookup.
//!
//! Resolution goes through the [`BaseDirs`] trait so tests can point the
//! packager at temporary directories.

use camino::Utf8PathBuf;
use directories_next::ProjectDirs;

/// Name of the configuration file inside the config directory.
pub const CONFIG_FILE_NAME: &str = "sispack.toml";

/// Name of the templates directory inside the data directory.
pub const TEMPLATES_DIR_NAME: &str = "templates";

/// Abstraction over platform-specific directories.
pub trait BaseDirs {
    /// Directory holding `sispack.toml`.
    fn config_dir(&self) -> Option<Utf8PathBuf>;

    /// Directory holding installed resources such as templates.
    fn data_dir(&self) -> Option<Utf8PathBuf>;

    /// Default configuration file path.
    fn config_file(&self) -> Option<Utf8PathBuf> {
        self.config_dir().map(|dir| dir.join(CONFIG_FILE_NAME))
    }

    /// Default templates directory.
    fn templates_dir(&self) -> Option<Utf8PathBuf> {
        self.data_dir().map(|dir| dir.join(TEMPLATES_DIR_NAME))
    }
}

/// [`BaseDirs`] backed by the platform conventions of `directories-next`.
#[derive(Debug, Clone)]
pub struct SystemBaseDirs {
    project: ProjectDirs,
}

impl SystemBaseDirs {
    /// Look up the project directories for `sispack`.
    ///
    /// Returns `None` when no home directory can be determined.
    #[must_use]
    pub fn new() -> Option<Self> {
        ProjectDirs::from("", "", "sispack").map(|project| Self { project })
    }
}

impl BaseDirs for SystemBaseDirs {
    fn config_dir(&self) -> Option<Utf8PathBuf> {
        Utf8PathBuf::from_path_buf(self.project.config_dir().to_path_buf()).ok()
    }

    fn data_dir(&self) -> Option<Utf8PathBuf> {
        Utf8PathBuf::from_path_buf(self.project.data_dir().to_path_buf()).ok()
    }
}

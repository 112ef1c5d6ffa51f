//! Packaging pipeline orchestration.
//!
//! [`make_package`] runs one packaging request end to end: resolve the source
//! and UID, checksum the UID, stage the application with its patched stub and
//! resource file, describe it in a `.pkg` file, and hand everything to
//! `makesis`. Any failure aborts the run and is returned unchanged.

use crate::checksum::ChecksumService;
use crate::config::PackagerConfig;
use crate::descriptor;
use crate::dirs::BaseDirs;
use crate::error::Result;
use crate::executor::CommandExecutor;
use crate::makesis::PackagingInvoker;
use crate::manifest::{self, InstallRoot};
use crate::patcher;
use crate::source::{self, ResolvedSource};
use crate::staging::{StagedResource, StagingArea};
use crate::template::{TemplateSet, TemplateVariant};
use crate::uid::{Uid, resolve_identifier};
use camino::{Utf8Path, Utf8PathBuf};
use sha2::{Digest, Sha256};
use std::io::Read;

/// What to package and how.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackagingRequest {
    /// Script or directory to package.
    pub source: Utf8PathBuf,
    /// Archive path; defaults to `<app_name>.sis` in the working directory.
    pub output: Option<Utf8PathBuf>,
    /// Explicit UID text, overriding the script's `SYMBIAN_UID`.
    pub uid: Option<String>,
    /// Application name; defaults to the source's base name.
    pub app_name: Option<String>,
    /// Template generation to package against.
    pub variant: TemplateVariant,
    /// Keep the staging directory after the run, successful or not.
    pub keep_staging: bool,
}

/// External collaborators and locations used by a run.
pub struct Toolset<'a> {
    /// Runs `uidcrc` and `makesis`.
    pub executor: &'a dyn CommandExecutor,
    /// Directory holding the template resources.
    pub templates_dir: Utf8PathBuf,
    /// Staging directory, recreated for each run.
    pub staging_dir: Utf8PathBuf,
    /// Checksum program.
    pub uidcrc_program: String,
    /// Archive builder program.
    pub makesis_program: String,
}

impl<'a> Toolset<'a> {
    /// Build a toolset from loaded configuration.
    #[must_use]
    pub fn from_config(
        executor: &'a dyn CommandExecutor,
        config: &PackagerConfig,
        dirs: Option<&dyn BaseDirs>,
    ) -> Self {
        Self {
            executor,
            templates_dir: config.resolve_templates_dir(dirs),
            staging_dir: config.resolve_staging_dir(),
            uidcrc_program: config.uidcrc_program.clone(),
            makesis_program: config.makesis_program.clone(),
        }
    }
}

impl std::fmt::Debug for Toolset<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Toolset")
            .field("executor", &"<CommandExecutor>")
            .field("templates_dir", &self.templates_dir)
            .field("staging_dir", &self.staging_dir)
            .field("uidcrc_program", &self.uidcrc_program)
            .field("makesis_program", &self.makesis_program)
            .finish()
    }
}

/// Result of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageOutcome {
    /// The archive `makesis` produced.
    pub artifact: Utf8PathBuf,
    /// Application name used for the stub, resource and install directory.
    pub app_name: String,
    /// UID the stub was patched with.
    pub uid: Uid,
    /// Raw combined `makesis` output.
    pub tool_output: String,
    /// Staging directory left on disk, when retention was requested.
    pub retained_staging: Option<Utf8PathBuf>,
}

/// Identity of the application being packaged.
struct Target {
    source: ResolvedSource,
    app_name: String,
    uid: Uid,
    artifact: Utf8PathBuf,
}

/// Package `request` into a SIS archive.
///
/// Identifier problems are reported before the staging directory is touched.
/// On failure the staging directory is removed unless
/// [`PackagingRequest::keep_staging`] is set, in which case its path is
/// logged.
///
/// # Errors
///
/// Returns the first failure of any step; see
/// [`PackagerError`](crate::error::PackagerError) for the
/// variants each step produces.
pub fn make_package(request: &PackagingRequest, toolset: &Toolset<'_>) -> Result<PackageOutcome> {
    let target = resolve_target(request)?;
    log::info!(
        "packaging {} as {} with UID {}",
        target.source.root,
        target.app_name,
        target.uid
    );

    let checksum = ChecksumService::new(toolset.executor, toolset.uidcrc_program.as_str())
        .checksum(target.uid)?;
    let templates = TemplateSet::load(&toolset.templates_dir, request.variant)?;

    let staging = StagingArea::prepare(toolset.staging_dir.clone())?;
    match build_in_staging(&target, &templates, checksum, &staging, toolset) {
        Ok(tool_output) => {
            let retained_staging = finish_staging(staging, request.keep_staging)?;
            log::info!("created {}", target.artifact);
            Ok(PackageOutcome {
                artifact: target.artifact,
                app_name: target.app_name,
                uid: target.uid,
                tool_output,
                retained_staging,
            })
        }
        Err(err) => {
            if request.keep_staging {
                let kept = staging.retain();
                log::warn!("packaging failed; staging directory kept at {kept}");
            } else if let Err(cleanup) = staging.dispose() {
                log::warn!("{cleanup}");
            }
            Err(err)
        }
    }
}

fn resolve_target(request: &PackagingRequest) -> Result<Target> {
    let source = source::resolve(&request.source)?;
    let script_text = if request.uid.is_some() {
        String::new()
    } else {
        source.read_entry_script()?
    };
    let uid = resolve_identifier(request.uid.as_deref(), &script_text, &source.entry_script)?;

    let app_name = request
        .app_name
        .clone()
        .unwrap_or_else(|| source.default_app_name.clone());
    source::validate_app_name(&app_name)?;
    let artifact = request
        .output
        .clone()
        .unwrap_or_else(|| default_artifact_path(&app_name));

    Ok(Target {
        source,
        app_name,
        uid,
        artifact,
    })
}

fn build_in_staging(
    target: &Target,
    templates: &TemplateSet,
    checksum: u32,
    staging: &StagingArea,
    toolset: &Toolset<'_>,
) -> Result<String> {
    let app_name = target.app_name.as_str();
    let resources = [StagedResource {
        from: templates.rsc_path.clone(),
        name: format!("{app_name}.rsc"),
    }];
    staging.populate(&target.source, &resources)?;

    let stub = patcher::patch(&templates.app, target.uid, checksum, templates.variant.layout())?;
    patcher::write_stub(&staging.path().join(format!("{app_name}.app")), &stub)?;

    let entries = manifest::build(staging.path(), &InstallRoot::for_app(app_name))?;
    let pkg_path = staging.path().join(format!("{app_name}.pkg"));
    descriptor::write(&pkg_path, &templates.pkg, app_name, target.uid, &entries)?;

    PackagingInvoker::new(toolset.executor, toolset.makesis_program.as_str()).invoke(
        staging.path(),
        &pkg_path,
        &target.artifact,
    )
}

fn finish_staging(staging: StagingArea, keep: bool) -> Result<Option<Utf8PathBuf>> {
    if keep {
        let kept = staging.retain();
        log::info!("staging directory kept at {kept}");
        Ok(Some(kept))
    } else {
        staging.dispose()?;
        Ok(None)
    }
}

/// Default archive path: `<app_name>.sis` in the working directory.
#[must_use]
pub fn default_artifact_path(app_name: &str) -> Utf8PathBuf {
    Utf8PathBuf::from(format!("{app_name}.sis"))
}

/// SHA-256 of the archive at `path`, as lowercase hex.
///
/// # Errors
///
/// Returns [`PackagerError::Io`](crate::error::PackagerError::Io) if the file
/// cannot be read.
pub fn artifact_sha256(path: &Utf8Path) -> Result<String> {
    let mut file = std::fs::File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];
    loop {
        let bytes_read = file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

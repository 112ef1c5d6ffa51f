//! `.pkg` package descriptor rendering.
//!
//! The descriptor is the template text with `{app_name}` and `{uid}` filled
//! in, followed by one `"<source>"\t\t-"<destination>"` line per manifest
//! entry.

use crate::error::{PackagerError, Result};
use crate::manifest::ManifestEntry;
use crate::uid::Uid;
use camino::Utf8Path;

/// Placeholder replaced by the application name.
pub const APP_NAME_PLACEHOLDER: &str = "{app_name}";

/// Placeholder replaced by the application UID.
pub const UID_PLACEHOLDER: &str = "{uid}";

/// Render the descriptor text.
///
/// # Errors
///
/// Returns [`PackagerError::DescriptorTemplate`] if `template` lacks either
/// placeholder.
///
/// # Examples
///
/// ```
/// use sispack::descriptor::render;
/// use sispack::manifest::ManifestEntry;
/// use sispack::uid::Uid;
///
/// let entries = [ManifestEntry {
///     source: "default.py".into(),
///     destination: r"!:\system\apps\snake\default.py".to_owned(),
/// }];
/// let text = render("#{\"{app_name}\"},({uid})\n", "snake", Uid::new(0x1234_5678), &entries)?;
/// assert!(text.starts_with("#{\"snake\"},(0x12345678)\n"));
/// # Ok::<(), sispack::error::PackagerError>(())
/// ```
pub fn render(
    template: &str,
    app_name: &str,
    uid: Uid,
    manifest: &[ManifestEntry],
) -> Result<String> {
    for placeholder in [APP_NAME_PLACEHOLDER, UID_PLACEHOLDER] {
        if !template.contains(placeholder) {
            return Err(PackagerError::DescriptorTemplate { placeholder });
        }
    }

    let mut text = template
        .replace(APP_NAME_PLACEHOLDER, app_name)
        .replace(UID_PLACEHOLDER, &uid.to_string());
    if !text.is_empty() && !text.ends_with('\n') {
        text.push('\n');
    }

    for entry in manifest {
        text.push_str(&format!(
            "\"{}\"\t\t-\"{}\"\n",
            entry.source, entry.destination
        ));
    }
    Ok(text)
}

/// Render the descriptor and write it to `path`.
///
/// # Errors
///
/// Fails as [`render`] does, or with [`PackagerError::StagingIo`] if the file
/// cannot be written.
pub fn write(
    path: &Utf8Path,
    template: &str,
    app_name: &str,
    uid: Uid,
    manifest: &[ManifestEntry],
) -> Result<()> {
    let text = render(template, app_name, uid, manifest)?;
    std::fs::write(path, text).map_err(|e| PackagerError::staging(path, e))?;
    log::debug!("wrote descriptor {path} with {} file(s)", manifest.len());
    Ok(())
}

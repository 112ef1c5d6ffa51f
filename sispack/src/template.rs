//! Template resources and binary stub layouts.
//!
//! Each [`TemplateVariant`] names three files in the templates directory: the
//! `.app` binary stub, the `.rsc` resource file, and the `.pkg` descriptor
//! text. The variant also fixes the [`StubLayout`] the patcher applies.

use crate::error::{PackagerError, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::fmt;

/// Offset of the duplicate UID field in current-layout `.app` stubs.
pub const SECONDARY_UID_OFFSET: usize = 0x3a4;

/// Which generation of templates a package targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TemplateVariant {
    /// S60 SDK 2.0 and later.
    #[default]
    Current,
    /// Phones predating SDK 2.0.
    Legacy,
}

impl TemplateVariant {
    /// Select the variant from the `--presdk20` flag.
    #[must_use]
    pub const fn from_legacy_flag(legacy: bool) -> Self {
        if legacy { Self::Legacy } else { Self::Current }
    }

    /// File name of the binary `.app` stub template.
    #[must_use]
    pub const fn app_template(self) -> &'static str {
        match self {
            Self::Current => "pyapp_template.tmp",
            Self::Legacy => "pyapp_template_pre_SDK20.tmp",
        }
    }

    /// File name of the resource file template.
    #[must_use]
    pub const fn rsc_template(self) -> &'static str {
        match self {
            Self::Current => "pyrsc_template.tmp",
            Self::Legacy => "pyrsc_template_pre_SDK20.tmp",
        }
    }

    /// File name of the `.pkg` descriptor template.
    #[must_use]
    pub const fn pkg_template(self) -> &'static str {
        match self {
            Self::Current => "pypkg_template.tmp",
            Self::Legacy => "pypkg_template_pre_SDK20.tmp",
        }
    }

    /// Field layout of this variant's binary stub.
    #[must_use]
    pub const fn layout(self) -> StubLayout {
        match self {
            Self::Current => StubLayout {
                secondary_uid_offset: Some(SECONDARY_UID_OFFSET),
            },
            Self::Legacy => StubLayout {
                secondary_uid_offset: None,
            },
        }
    }
}

impl fmt::Display for TemplateVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Current => f.write_str("current"),
            Self::Legacy => f.write_str("pre-SDK 2.0"),
        }
    }
}

/// Field offsets of a `.app` binary stub.
///
/// The header fields (`[8, 32)`) are shared by every layout; only the
/// duplicate UID field is optional.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StubLayout {
    /// Offset of the duplicate UID field, if the layout has one.
    pub secondary_uid_offset: Option<usize>,
}

impl StubLayout {
    /// Offset of the primary UID field.
    pub const UID_OFFSET: usize = 8;
    /// Offset of the externally computed checksum field.
    pub const CRC1_OFFSET: usize = 12;
    /// Offset of the baseline checksum, replaced by the derived checksum.
    pub const CRC2_OFFSET: usize = 24;
    /// End of the fixed header region.
    pub const HEADER_END: usize = 28;

    /// Minimum template length needed to patch every field.
    #[must_use]
    pub const fn min_len(self) -> usize {
        match self.secondary_uid_offset {
            Some(offset) if offset + 4 > Self::HEADER_END => offset + 4,
            _ => Self::HEADER_END,
        }
    }
}

/// Template resources loaded for one packaging run.
#[derive(Debug, Clone)]
pub struct TemplateSet {
    /// Variant the resources belong to.
    pub variant: TemplateVariant,
    /// Unpatched `.app` stub bytes.
    pub app: Vec<u8>,
    /// Path of the resource template, copied verbatim into staging.
    pub rsc_path: Utf8PathBuf,
    /// Descriptor template text.
    pub pkg: String,
}

impl TemplateSet {
    /// Load the variant's templates from `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`PackagerError::TemplateUnavailable`] if any of the three
    /// files is missing or unreadable.
    pub fn load(dir: &Utf8Path, variant: TemplateVariant) -> Result<Self> {
        let app_path = dir.join(variant.app_template());
        let app = std::fs::read(&app_path).map_err(|source| {
            PackagerError::TemplateUnavailable {
                path: app_path.clone(),
                source,
            }
        })?;

        let rsc_path = dir.join(variant.rsc_template());
        if let Err(source) = std::fs::metadata(&rsc_path) {
            return Err(PackagerError::TemplateUnavailable {
                path: rsc_path,
                source,
            });
        }

        let pkg_path = dir.join(variant.pkg_template());
        let pkg = std::fs::read_to_string(&pkg_path).map_err(|source| {
            PackagerError::TemplateUnavailable {
                path: pkg_path.clone(),
                source,
            }
        })?;

        log::debug!("loaded {variant} templates from {dir}");
        Ok(Self {
            variant,
            app,
            rsc_path,
            pkg,
        })
    }
}

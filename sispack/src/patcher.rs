//! Binary `.app` stub patching.
//!
//! The stub template is a prebuilt launcher whose header carries the
//! application UID and two checksums. Patching rewrites those fields, plus
//! the duplicate UID in current-layout stubs, and copies every other byte
//! through untouched:
//!
//! | bytes        | written value                              |
//! |--------------|--------------------------------------------|
//! | `[8, 12)`    | UID                                        |
//! | `[12, 16)`   | checksum reported by `uidcrc`              |
//! | `[24, 28)`   | `uid + baseline` (wrapping), where baseline is the original content of these bytes |
//! | `[off, off+4)` | UID again, current layout only           |
//!
//! All fields are little-endian 32-bit integers.

use crate::error::{PackagerError, Result};
use crate::template::StubLayout;
use crate::uid::Uid;
use camino::Utf8Path;

/// Patch a copy of `template` for `uid`.
///
/// `checksum` is the value `uidcrc` computed for the UID triple. The result
/// has the same length as `template`; the input is never modified.
///
/// # Errors
///
/// Returns [`PackagerError::TemplateTooShort`] if `template` is smaller than
/// [`StubLayout::min_len`].
///
/// # Examples
///
/// ```
/// use sispack::patcher::patch;
/// use sispack::template::TemplateVariant;
/// use sispack::uid::Uid;
///
/// let template = vec![0u8; 32];
/// let stub = patch(&template, Uid::new(0x1234_5678), 0xaabb_ccdd, TemplateVariant::Legacy.layout())?;
/// assert_eq!(&stub[8..12], &[0x78, 0x56, 0x34, 0x12]);
/// # Ok::<(), sispack::error::PackagerError>(())
/// ```
pub fn patch(template: &[u8], uid: Uid, checksum: u32, layout: StubLayout) -> Result<Vec<u8>> {
    let required = layout.min_len();
    if template.len() < required {
        return Err(PackagerError::TemplateTooShort {
            required,
            actual: template.len(),
        });
    }

    // Read before any field is overwritten.
    let baseline = read_u32_le(template, StubLayout::CRC2_OFFSET);
    let derived = uid.value().wrapping_add(baseline);

    let mut stub = template.to_vec();
    write_field(&mut stub, StubLayout::UID_OFFSET, uid.to_le_bytes());
    write_field(&mut stub, StubLayout::CRC1_OFFSET, checksum.to_le_bytes());
    write_field(&mut stub, StubLayout::CRC2_OFFSET, derived.to_le_bytes());
    if let Some(offset) = layout.secondary_uid_offset {
        write_field(&mut stub, offset, uid.to_le_bytes());
    }

    log::trace!(
        "patched {} byte stub: uid {uid}, crc1 {checksum:#010x}, crc2 {derived:#010x}",
        stub.len()
    );
    Ok(stub)
}

/// Write a patched stub to `path`.
///
/// # Errors
///
/// Returns [`PackagerError::StagingIo`] if the file cannot be written.
pub fn write_stub(path: &Utf8Path, stub: &[u8]) -> Result<()> {
    std::fs::write(path, stub).map_err(|e| PackagerError::staging(path, e))
}

/// Callers must have checked `offset + 4 <= buf.len()`.
fn read_u32_le(buf: &[u8], offset: usize) -> u32 {
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&buf[offset..offset + 4]);
    u32::from_le_bytes(bytes)
}

fn write_field(buf: &mut [u8], offset: usize, value: [u8; 4]) {
    buf[offset..offset + 4].copy_from_slice(&value);
}

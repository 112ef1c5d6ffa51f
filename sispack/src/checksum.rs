//! UID checksum via the SDK `uidcrc` utility.
//!
//! An executable's UID triple is `(0x10000079, 0x100039CE, uid)`. `uidcrc`
//! prints the triple back followed by its checksum, e.g.
//! `0x10000079 0x100039ce 0x12345678 0x3f0e9c0a`.

use crate::error::{PackagerError, Result};
use crate::executor::CommandExecutor;
use crate::uid::Uid;

/// UID1 of a Symbian executable.
pub const UID1_EXECUTABLE: &str = "0x10000079";

/// UID2 of a Symbian application.
pub const UID2_APPLICATION: &str = "0x100039CE";

/// Default program name of the checksum utility.
pub const DEFAULT_UIDCRC: &str = "uidcrc";

/// Computes UID checksums by running `uidcrc`.
#[derive(Clone)]
pub struct ChecksumService<'a> {
    executor: &'a dyn CommandExecutor,
    program: String,
}

impl<'a> ChecksumService<'a> {
    /// Create a service that runs `program` through `executor`.
    #[must_use]
    pub fn new(executor: &'a dyn CommandExecutor, program: impl Into<String>) -> Self {
        Self {
            executor,
            program: program.into(),
        }
    }

    /// Compute the checksum of the application UID triple.
    ///
    /// # Errors
    ///
    /// Returns [`PackagerError::ChecksumServiceUnavailable`] if the tool
    /// cannot be spawned, prints nothing, or prints an unexpected line.
    pub fn checksum(&self, uid: Uid) -> Result<u32> {
        let uid_text = uid.to_string();
        let output = self
            .executor
            .run(&self.program, &[UID1_EXECUTABLE, UID2_APPLICATION, uid_text.as_str()])
            .map_err(|err| self.unavailable(err.to_string()))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let line = stdout.trim();
        if line.is_empty() {
            return Err(self.unavailable("no output".to_owned()));
        }

        let crc = parse_uidcrc_line(line).ok_or_else(|| {
            self.unavailable(format!("unexpected output \"{line}\""))
        })?;
        log::debug!("uidcrc checksum for {uid} is {crc:#010x}");
        Ok(crc)
    }

    fn unavailable(&self, reason: String) -> PackagerError {
        PackagerError::ChecksumServiceUnavailable {
            tool: self.program.clone(),
            reason,
        }
    }
}

impl std::fmt::Debug for ChecksumService<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChecksumService")
            .field("executor", &"<CommandExecutor>")
            .field("program", &self.program)
            .finish()
    }
}

/// Extract the checksum from a `uid1 uid2 uid3 crc` line.
fn parse_uidcrc_line(line: &str) -> Option<u32> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    let [_, _, _, crc] = fields.as_slice() else {
        return None;
    };
    let digits = crc.strip_prefix("0x").or_else(|| crc.strip_prefix("0X"))?;
    u32::from_str_radix(digits, 16).ok()
}

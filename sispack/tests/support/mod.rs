//! Test support for packaging integration tests.
//!
//! Provides a fake Symbian toolchain and an on-disk workspace holding
//! templates and application sources.

#![allow(dead_code)]

use camino::{Utf8Path, Utf8PathBuf};
use sispack::error::Result;
use sispack::executor::CommandExecutor;
use sispack::pipeline::Toolset;
use sispack::template::SECONDARY_UID_OFFSET;
use sispack::test_utils::{failure_output, stdout_output};
use std::cell::RefCell;
use std::fs;
use std::process::Output;
use tempfile::TempDir;
use walkdir::WalkDir;

/// Checksum the fake `uidcrc` reports for every UID.
pub const FAKE_CRC: u32 = 0x3f0e_9c0a;

/// Baseline checksum written into the fake `.app` template.
pub const TEMPLATE_BASELINE: u32 = 0x0000_1000;

/// How the fake `makesis` behaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MakesisBehaviour {
    /// Write the archive and report progress.
    #[default]
    Succeed,
    /// Print nothing and write nothing.
    Silent,
    /// Exit unsuccessfully with a diagnostic.
    Fail,
}

/// What the fake `makesis` saw in the staging directory.
#[derive(Debug, Clone, Default)]
pub struct MakesisSnapshot {
    /// Staged files, relative to the staging root, sorted.
    pub staged: Vec<String>,
    /// Descriptor text.
    pub descriptor: String,
    /// Bytes of the staged `.app` stub.
    pub stub: Vec<u8>,
    /// Bytes of the staged `default.py`.
    pub default_py: Vec<u8>,
}

/// Stand-in for `uidcrc` and `makesis`.
#[derive(Debug, Default)]
pub struct FakeToolchain {
    makesis: MakesisBehaviour,
    uidcrc_silent: bool,
    calls: RefCell<Vec<String>>,
    snapshot: RefCell<Option<MakesisSnapshot>>,
}

impl FakeToolchain {
    pub fn new(makesis: MakesisBehaviour) -> Self {
        Self {
            makesis,
            ..Self::default()
        }
    }

    /// Toolchain whose `uidcrc` prints nothing.
    pub fn with_silent_uidcrc() -> Self {
        Self {
            uidcrc_silent: true,
            ..Self::default()
        }
    }

    /// Names of the programs invoked, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    /// Staging contents captured when `makesis` ran.
    pub fn snapshot(&self) -> Option<MakesisSnapshot> {
        self.snapshot.borrow().clone()
    }

    fn uidcrc(&self, args: &[&str]) -> Output {
        if self.uidcrc_silent {
            return stdout_output("");
        }
        let line = format!("{} {FAKE_CRC:#010x}\r\n", args.join(" "));
        stdout_output(&line)
    }

    fn makesis(&self, args: &[&str]) -> Output {
        let [search, pkg, sis] = args else {
            return failure_output("usage: makesis [-d<dir>] <pkg> [sis]");
        };
        let search = Utf8Path::new(search.trim_start_matches("-d"));
        self.snapshot.replace(Some(capture(search, Utf8Path::new(pkg))));

        match self.makesis {
            MakesisBehaviour::Succeed => {
                let archive = Utf8Path::new(sis);
                if let Some(parent) = archive.parent() {
                    fs::create_dir_all(parent).expect("create archive dir");
                }
                fs::write(archive, format!("SIS built from {pkg}")).expect("write archive");
                stdout_output(&format!("Processing {pkg}...\nCreated {sis}\n"))
            }
            MakesisBehaviour::Silent => stdout_output(""),
            MakesisBehaviour::Fail => failure_output("Error in pkg file line 3"),
        }
    }
}

impl CommandExecutor for FakeToolchain {
    fn run(&self, cmd: &str, args: &[&str]) -> Result<Output> {
        self.calls.borrow_mut().push(cmd.to_owned());
        match cmd {
            "uidcrc" => Ok(self.uidcrc(args)),
            "makesis" => Ok(self.makesis(args)),
            other => Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{other}: command not found"),
            )
            .into()),
        }
    }
}

fn capture(search: &Utf8Path, pkg: &Utf8Path) -> MakesisSnapshot {
    let mut staged = Vec::new();
    let mut stub = Vec::new();
    for entry in WalkDir::new(search) {
        let entry = entry.expect("walk staging dir");
        if !entry.file_type().is_file() {
            continue;
        }
        let path = Utf8Path::from_path(entry.path()).expect("utf8 staged path");
        if path.extension() == Some("app") {
            stub = fs::read(path).expect("read staged stub");
        }
        let relative = path.strip_prefix(search).expect("under staging root");
        staged.push(relative.as_str().replace('\\', "/"));
    }
    staged.sort();
    let descriptor = fs::read_to_string(pkg).unwrap_or_default();
    let default_py = fs::read(search.join("default.py")).unwrap_or_default();
    MakesisSnapshot {
        staged,
        descriptor,
        stub,
        default_py,
    }
}

/// Temporary workspace with templates and application sources.
pub struct Workspace {
    _temp: TempDir,
    pub root: Utf8PathBuf,
}

impl Workspace {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("temp dir creation succeeds");
        let root = Utf8PathBuf::try_from(temp.path().to_owned()).expect("utf8 temp path");
        let workspace = Self { _temp: temp, root };
        workspace.write_templates();
        workspace
    }

    pub fn templates_dir(&self) -> Utf8PathBuf {
        self.root.join("templates")
    }

    pub fn staging_dir(&self) -> Utf8PathBuf {
        self.root.join("stage")
    }

    pub fn toolset<'a>(&self, executor: &'a dyn CommandExecutor) -> Toolset<'a> {
        Toolset {
            executor,
            templates_dir: self.templates_dir(),
            staging_dir: self.staging_dir(),
            uidcrc_program: "uidcrc".to_owned(),
            makesis_program: "makesis".to_owned(),
        }
    }

    /// Write `contents` to `relative` under the workspace root.
    pub fn write(&self, relative: &str, contents: &str) -> Utf8PathBuf {
        let path = self.root.join(relative);
        fs::create_dir_all(path.parent().expect("has parent")).expect("mkdir");
        fs::write(&path, contents).expect("write");
        path
    }

    /// Create an application directory `name` declaring `uid`.
    pub fn app_dir(&self, name: &str, uid: &str) -> Utf8PathBuf {
        self.write(
            &format!("{name}/default.py"),
            &format!("import appuifw\nSYMBIAN_UID = {uid}\n"),
        );
        self.write(&format!("{name}/lib/helpers.py"), "def helper(): pass\n");
        self.write(&format!("{name}/lib/helpers.pyc"), "compiled");
        self.root.join(name)
    }

    fn write_templates(&self) {
        let dir = self.templates_dir();
        fs::create_dir_all(&dir).expect("mkdir templates");
        for suffix in ["", "_pre_SDK20"] {
            fs::write(dir.join(format!("pyapp_template{suffix}.tmp")), app_template())
                .expect("write app template");
            fs::write(dir.join(format!("pyrsc_template{suffix}.tmp")), b"RSC")
                .expect("write rsc template");
        }
        fs::write(
            dir.join("pypkg_template.tmp"),
            "&EN\n#{\"{app_name}\"},({uid}),1,0,0\n(0x101F6F88), 0, 0, 0, {\"Series60ProductID\"}\n",
        )
        .expect("write pkg template");
        fs::write(
            dir.join("pypkg_template_pre_SDK20.tmp"),
            "&EN\n#{\"{app_name}\"},({uid}),1,0,0\n",
        )
        .expect("write legacy pkg template");
    }
}

/// `.app` template large enough for the current layout.
pub fn app_template() -> Vec<u8> {
    let mut bytes = vec![0xaa_u8; SECONDARY_UID_OFFSET + 64];
    bytes[24..28].copy_from_slice(&TEMPLATE_BASELINE.to_le_bytes());
    bytes
}

/// Little-endian field at `offset`.
pub fn field(bytes: &[u8], offset: usize) -> u32 {
    let mut word = [0u8; 4];
    word.copy_from_slice(&bytes[offset..offset + 4]);
    u32::from_le_bytes(word)
}

//! End-to-end packaging tests against a fake Symbian toolchain.

mod support;

use camino::Utf8PathBuf;
use rstest::{fixture, rstest};
use sispack::error::PackagerError;
use sispack::pipeline::{PackagingRequest, artifact_sha256, make_package};
use sispack::template::{SECONDARY_UID_OFFSET, TemplateVariant};
use support::{FAKE_CRC, FakeToolchain, MakesisBehaviour, TEMPLATE_BASELINE, Workspace, field};

#[fixture]
fn workspace() -> Workspace {
    Workspace::new()
}

fn request_for(source: Utf8PathBuf, workspace: &Workspace) -> PackagingRequest {
    PackagingRequest {
        source,
        output: Some(workspace.root.join("dist/app.sis")),
        ..PackagingRequest::default()
    }
}

#[rstest]
fn directory_source_is_packaged_end_to_end(workspace: Workspace) {
    let app = workspace.app_dir("snake", "0x12345678");
    let toolchain = FakeToolchain::new(MakesisBehaviour::Succeed);
    let request = request_for(app, &workspace);

    let outcome = make_package(&request, &workspace.toolset(&toolchain)).expect("package");

    assert_eq!(toolchain.calls(), ["uidcrc", "makesis"]);
    assert!(outcome.artifact.is_file());
    assert!(outcome.tool_output.contains("Created"));
    assert!(!workspace.staging_dir().exists(), "staging should be removed");
    assert_eq!(artifact_sha256(&outcome.artifact).expect("hash").len(), 64);

    let snapshot = toolchain.snapshot().expect("makesis ran");
    assert_eq!(
        snapshot.staged,
        [
            "default.py",
            "lib/helpers.py",
            "snake.app",
            "snake.pkg",
            "snake.rsc"
        ]
    );
}

#[rstest]
fn stub_fields_are_patched_for_current_phones(workspace: Workspace) {
    let app = workspace.app_dir("snake", "0x12345678");
    let toolchain = FakeToolchain::new(MakesisBehaviour::Succeed);

    make_package(&request_for(app, &workspace), &workspace.toolset(&toolchain))
        .expect("package");

    let stub = toolchain.snapshot().expect("makesis ran").stub;
    assert_eq!(stub.len(), support::app_template().len());
    assert_eq!(field(&stub, 8), 0x1234_5678);
    assert_eq!(field(&stub, 12), FAKE_CRC);
    assert_eq!(field(&stub, 24), 0x1234_5678 + TEMPLATE_BASELINE);
    assert_eq!(field(&stub, SECONDARY_UID_OFFSET), 0x1234_5678);
    assert_eq!(stub[28], 0xaa);
}

#[rstest]
fn legacy_stub_keeps_secondary_field(workspace: Workspace) {
    let app = workspace.app_dir("snake", "0x12345678");
    let toolchain = FakeToolchain::new(MakesisBehaviour::Succeed);
    let request = PackagingRequest {
        variant: TemplateVariant::Legacy,
        ..request_for(app, &workspace)
    };

    make_package(&request, &workspace.toolset(&toolchain)).expect("package");

    let snapshot = toolchain.snapshot().expect("makesis ran");
    assert_eq!(field(&snapshot.stub, 8), 0x1234_5678);
    assert_eq!(field(&snapshot.stub, SECONDARY_UID_OFFSET), 0xaaaa_aaaa);
    assert!(!snapshot.descriptor.contains("Series60ProductID"));
}

#[rstest]
fn descriptor_lists_every_staged_file(workspace: Workspace) {
    let app = workspace.app_dir("snake", "0x12345678");
    let toolchain = FakeToolchain::new(MakesisBehaviour::Succeed);

    make_package(&request_for(app, &workspace), &workspace.toolset(&toolchain))
        .expect("package");

    let descriptor = toolchain.snapshot().expect("makesis ran").descriptor;
    let lines: Vec<&str> = descriptor.lines().collect();
    assert_eq!(lines[1], "#{\"snake\"},(0x12345678),1,0,0");
    assert!(lines.contains(&"\"snake.app\"\t\t-\"!:\\system\\apps\\snake\\snake.app\""));
    assert!(lines.contains(&"\"lib/helpers.py\"\t\t-\"!:\\system\\apps\\snake\\lib\\helpers.py\""));
    assert!(!descriptor.contains(".pyc"));
    assert!(!descriptor.contains("snake.pkg"));
}

#[rstest]
fn single_script_is_packaged_as_default_py(workspace: Workspace) {
    let script = workspace.write("scripts/hello.py", "SYMBIAN_UID = 0x0ABCDEF0\n");
    let toolchain = FakeToolchain::new(MakesisBehaviour::Succeed);

    let outcome = make_package(&request_for(script, &workspace), &workspace.toolset(&toolchain))
        .expect("package");

    assert_eq!(outcome.app_name, "hello");
    let snapshot = toolchain.snapshot().expect("makesis ran");
    assert_eq!(snapshot.staged, ["default.py", "hello.app", "hello.pkg", "hello.rsc"]);
    assert_eq!(field(&snapshot.stub, 8), 0x0abc_def0);
}

#[rstest]
fn latin1_script_is_packaged_byte_for_byte(workspace: Workspace) {
    let script = workspace.root.join("cafe.py");
    let body = b"# caf\xe9\nSYMBIAN_UID = 0x12345678\n";
    std::fs::write(&script, body).expect("write latin-1 script");
    let toolchain = FakeToolchain::new(MakesisBehaviour::Succeed);

    let outcome = make_package(&request_for(script, &workspace), &workspace.toolset(&toolchain))
        .expect("package");

    assert_eq!(outcome.app_name, "cafe");
    let snapshot = toolchain.snapshot().expect("makesis ran");
    assert_eq!(field(&snapshot.stub, 8), 0x1234_5678);
    assert_eq!(snapshot.default_py, body);
}

#[rstest]
fn escaping_app_name_writes_nothing_outside_staging(workspace: Workspace) {
    let app = workspace.app_dir("snake", "0x12345678");
    let toolchain = FakeToolchain::default();
    let request = PackagingRequest {
        app_name: Some("../escaped".to_owned()),
        ..request_for(app, &workspace)
    };

    let err = make_package(&request, &workspace.toolset(&toolchain)).expect_err("bad name");

    assert!(matches!(err, PackagerError::InvalidAppName { .. }));
    assert!(toolchain.calls().is_empty());
    for ext in ["app", "rsc", "pkg"] {
        assert!(!workspace.root.join(format!("escaped.{ext}")).exists());
    }
}

#[rstest]
#[case::not_hex("bad-id")]
#[case::too_long("0x123456789")]
#[case::no_prefix("12345678")]
fn invalid_uid_fails_before_any_tool_runs(workspace: Workspace, #[case] uid: &str) {
    let app = workspace.app_dir("snake", "0x12345678");
    let toolchain = FakeToolchain::new(MakesisBehaviour::Succeed);
    let request = PackagingRequest {
        uid: Some(uid.to_owned()),
        ..request_for(app, &workspace)
    };

    let err = make_package(&request, &workspace.toolset(&toolchain)).expect_err("invalid uid");

    assert!(matches!(err, PackagerError::InvalidIdentifier { .. }));
    assert!(toolchain.calls().is_empty());
    assert!(!workspace.staging_dir().exists());
}

#[rstest]
fn silent_makesis_is_a_packaging_failure(workspace: Workspace) {
    let app = workspace.app_dir("snake", "0x12345678");
    let toolchain = FakeToolchain::new(MakesisBehaviour::Silent);

    let err = make_package(&request_for(app, &workspace), &workspace.toolset(&toolchain))
        .expect_err("makesis silent");

    assert!(matches!(
        err,
        PackagerError::PackagingToolFailed { ref output, .. } if output.is_empty()
    ));
    assert!(!workspace.staging_dir().exists());
    assert!(!workspace.root.join("dist/app.sis").exists());
}

#[rstest]
fn failed_run_keeps_staging_when_asked(workspace: Workspace) {
    let app = workspace.app_dir("snake", "0x12345678");
    let toolchain = FakeToolchain::new(MakesisBehaviour::Fail);
    let request = PackagingRequest {
        keep_staging: true,
        ..request_for(app, &workspace)
    };

    let err = make_package(&request, &workspace.toolset(&toolchain)).expect_err("makesis fails");

    assert!(err.to_string().contains("Error in pkg file line 3"));
    assert!(workspace.staging_dir().join("snake.pkg").is_file());
}

#[rstest]
fn silent_uidcrc_stops_the_run(workspace: Workspace) {
    let app = workspace.app_dir("snake", "0x12345678");
    let toolchain = FakeToolchain::with_silent_uidcrc();

    let err = make_package(&request_for(app, &workspace), &workspace.toolset(&toolchain))
        .expect_err("uidcrc silent");

    assert!(matches!(err, PackagerError::ChecksumServiceUnavailable { .. }));
    assert_eq!(toolchain.calls(), ["uidcrc"]);
}

#[rstest]
fn missing_templates_are_reported(workspace: Workspace) {
    let app = workspace.app_dir("snake", "0x12345678");
    std::fs::remove_dir_all(workspace.templates_dir()).expect("remove templates");
    let toolchain = FakeToolchain::default();

    let err = make_package(&request_for(app, &workspace), &workspace.toolset(&toolchain))
        .expect_err("templates missing");

    assert!(matches!(err, PackagerError::TemplateUnavailable { .. }));
    assert!(!workspace.staging_dir().exists());
}

#[rstest]
fn stale_staging_contents_are_discarded(workspace: Workspace) {
    let app = workspace.app_dir("snake", "0x12345678");
    workspace.write("stage/leftover/old.py", "stale");
    let toolchain = FakeToolchain::default();

    make_package(&request_for(app, &workspace), &workspace.toolset(&toolchain))
        .expect("package");

    let snapshot = toolchain.snapshot().expect("makesis ran");
    assert!(snapshot.staged.iter().all(|name| !name.starts_with("leftover")));
}

//! Unit tests for `FlowComposer` and the `transfer` service.

#![allow(clippy::expect_used)]

use std::collections::BTreeMap;

use provisio::application::{
    Cancellation, FlowComposer, RemoteExecutor, cancellation, provision, transfer,
};
use provisio::domain::{
    BackoffPolicy, ExecError, InterpolationContext, ProvisionError, ProvisioningFlow,
    ServicePlan, TransferError, TransferSource,
};
use provisio::plugins::registry;
use serde_yaml::Value;
use tempfile::TempDir;

use crate::mocks::{RecordingCommunicator, RecordingUi, Stall, StallingCommunicator, count_prefixed};

struct Fixture {
    comm: RecordingCommunicator,
    ui: RecordingUi,
    policy: BackoffPolicy,
    executor: RemoteExecutor,
    ctx: InterpolationContext,
}

impl Fixture {
    fn new(comm: RecordingCommunicator) -> Self {
        Self {
            comm,
            ui: RecordingUi::default(),
            policy: BackoffPolicy::immediate(1),
            executor: RemoteExecutor::new("/tmp"),
            ctx: InterpolationContext::default(),
        }
    }

    fn composer(&self) -> FlowComposer<'_, RecordingUi, RecordingCommunicator, BackoffPolicy> {
        FlowComposer {
            ui: &self.ui,
            communicator: &self.comm,
            policy: &self.policy,
            executor: &self.executor,
            ctx: &self.ctx,
        }
    }
}

fn config_flow() -> ProvisioningFlow {
    ProvisioningFlow::new("config")
        .upload(TransferSource::content("app.conf", "listen 80;\n"), "/etc/app.conf")
        .commands(["systemctl reload app"])
}

// ── FlowComposer ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_flow_uploads_before_running_commands() {
    let fx = Fixture::new(RecordingCommunicator::new());

    fx.composer()
        .run(&Cancellation::never(), &config_flow())
        .await
        .expect("flow succeeds");

    let uploads = fx.comm.uploads.borrow();
    assert_eq!(uploads.len(), 2);
    assert_eq!(uploads[0].0, "/etc/app.conf");
    assert_eq!(uploads[0].1, b"listen 80;\n");
    assert!(uploads[1].0.starts_with("/tmp/script_"));
    assert!(
        String::from_utf8_lossy(&uploads[1].1).ends_with("systemctl reload app\n")
    );
}

#[tokio::test]
async fn test_flow_transfer_failure_names_source_and_destination() {
    let fx = Fixture::new(RecordingCommunicator::new().with_uploads([Some("no space left")]));

    let err = fx
        .composer()
        .run(&Cancellation::never(), &config_flow())
        .await
        .expect_err("upload fails");

    match &err {
        ProvisionError::Transfer {
            source_path,
            destination,
            error: TransferError::Upload { .. },
        } => {
            assert_eq!(source_path, "<app.conf, 11 bytes>");
            assert_eq!(destination, "/etc/app.conf");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().contains("/etc/app.conf"));
    // Fail fast: the batch never ran.
    assert!(fx.comm.commands.borrow().is_empty());
    assert_eq!(*fx.ui.errors.borrow(), vec!["Upload failed: no space left"]);
}

#[tokio::test]
async fn test_flow_restore_failure_hints_at_trailing_slash() {
    let fx = Fixture::new(
        RecordingCommunicator::new().with_uploads([Some("Error restoring file /etc/app.conf")]),
    );

    let err = fx
        .composer()
        .run(&Cancellation::never(), &config_flow())
        .await
        .expect_err("restore fails");

    assert!(matches!(
        err,
        ProvisionError::Transfer {
            error: TransferError::Restore { .. },
            ..
        }
    ));
    let errors = fx.ui.errors.borrow();
    assert_eq!(errors.len(), 2);
    assert!(errors[0].contains("folder without a trailing slash"));
}

#[tokio::test]
async fn test_flow_exec_failure_names_flow() {
    let fx = Fixture::new(RecordingCommunicator::new().with_exit_codes([Some(0), Some(3)]));

    let err = fx
        .composer()
        .run(&Cancellation::never(), &config_flow())
        .await
        .expect_err("script fails");

    match err {
        ProvisionError::Exec { flow, error } => {
            assert_eq!(flow, "config");
            assert!(matches!(error, ExecError::NonZeroExit { code: 3, .. }));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_plan_stops_at_first_failing_flow() {
    let fx = Fixture::new(RecordingCommunicator::new().with_exit_codes([Some(0), Some(1)]));
    let plan = ServicePlan::new("demo")
        .then(ProvisioningFlow::new("first").commands(["false"]))
        .then(ProvisioningFlow::new("second").commands(["echo never"]));

    let err = fx
        .composer()
        .run_plan(&Cancellation::never(), &plan)
        .await
        .expect_err("first flow fails");

    assert!(matches!(err, ProvisionError::Exec { ref flow, .. } if flow == "first"));
    assert_eq!(fx.comm.script_paths().len(), 1);
}

#[tokio::test]
async fn test_plan_runs_flows_in_order() {
    let fx = Fixture::new(RecordingCommunicator::new());
    let plan = ServicePlan::new("demo")
        .then(ProvisioningFlow::new("first").commands(["echo one"]))
        .then(ProvisioningFlow::new("second").commands(["echo two"]));

    fx.composer()
        .run_plan(&Cancellation::never(), &plan)
        .await
        .expect("plan succeeds");

    let uploads = fx.comm.uploads.borrow();
    assert_eq!(uploads.len(), 2);
    assert!(String::from_utf8_lossy(&uploads[0].1).contains("echo one"));
    assert!(String::from_utf8_lossy(&uploads[1].1).contains("echo two"));
}

#[tokio::test]
async fn test_flow_path_source_is_interpolated() {
    let dir = TempDir::new().expect("tempdir");
    let war = dir.path().join("app.war");
    std::fs::write(&war, b"PK").expect("write war");

    let mut fx = Fixture::new(RecordingCommunicator::new());
    fx.ctx = InterpolationContext::default().var("Dist", dir.path().to_string_lossy());
    let flow = ProvisioningFlow::new("deploy").upload(
        TransferSource::path("{{ .Dist }}/app.war"),
        "/home/ubuntu/",
    );

    fx.composer()
        .run(&Cancellation::never(), &flow)
        .await
        .expect("flow succeeds");

    let uploads = fx.comm.uploads.borrow();
    assert_eq!(uploads[0].0, "/home/ubuntu/app.war");
    assert_eq!(uploads[0].1, b"PK");
    assert_eq!(*fx.ui.tracked.borrow(), vec![("app.war".to_string(), 2)]);
}

#[tokio::test]
async fn test_flow_cancelled_before_start() {
    let (handle, cancel) = cancellation();
    handle.cancel();
    let fx = Fixture::new(RecordingCommunicator::new());

    let err = fx
        .composer()
        .run(&cancel, &config_flow())
        .await
        .expect_err("cancelled");

    assert!(err.is_cancelled());
    assert!(fx.comm.uploads.borrow().is_empty());
}

#[tokio::test]
async fn test_flow_content_to_directory_keeps_label_as_file_name() {
    let fx = Fixture::new(RecordingCommunicator::new());
    let flow = ProvisioningFlow::new("config")
        .upload(TransferSource::content("app.conf", "x"), "/etc/app/");

    fx.composer()
        .run(&Cancellation::never(), &flow)
        .await
        .expect("flow succeeds");

    let uploads = fx.comm.uploads.borrow();
    assert_eq!(uploads[0].0, "/etc/app/app.conf");
    assert_eq!(uploads[0].1, b"x");
    assert_eq!(*fx.ui.tracked.borrow(), vec![("app.conf".to_string(), 1)]);
}

#[tokio::test]
async fn test_flow_content_label_without_file_name_uses_fallback() {
    let fx = Fixture::new(RecordingCommunicator::new());
    let flow = ProvisioningFlow::new("config")
        .upload(TransferSource::content("..", "x"), "/etc/app/");

    fx.composer()
        .run(&Cancellation::never(), &flow)
        .await
        .expect("flow succeeds");

    assert_eq!(fx.comm.uploads.borrow()[0].0, "/etc/app/content");
}

fn staged_fixture(staging: &TempDir, comm: RecordingCommunicator) -> Fixture {
    let mut fx = Fixture::new(comm);
    fx.executor = RemoteExecutor::new("/tmp").with_staging_dir(staging.path());
    fx
}

fn assert_nothing_staged(staging: &TempDir) {
    assert_eq!(count_prefixed(staging.path(), "provisio-upload"), 0);
    assert_eq!(count_prefixed(staging.path(), "provisio-shell"), 0);
}

#[tokio::test]
async fn test_flow_removes_staged_files_after_success() {
    let staging = TempDir::new().expect("tempdir");
    let fx = staged_fixture(&staging, RecordingCommunicator::new());

    fx.composer()
        .run(&Cancellation::never(), &config_flow())
        .await
        .expect("flow succeeds");

    assert_eq!(fx.comm.uploads.borrow().len(), 2);
    assert_nothing_staged(&staging);
}

#[tokio::test]
async fn test_flow_removes_staged_files_after_upload_failure() {
    let staging = TempDir::new().expect("tempdir");
    let fx = staged_fixture(
        &staging,
        RecordingCommunicator::new().with_uploads([Some("no space left")]),
    );

    fx.composer()
        .run(&Cancellation::never(), &config_flow())
        .await
        .expect_err("upload fails");

    assert_nothing_staged(&staging);
}

#[tokio::test]
async fn test_flow_removes_staged_files_after_script_failure() {
    let staging = TempDir::new().expect("tempdir");
    let fx = staged_fixture(
        &staging,
        RecordingCommunicator::new().with_exit_codes([Some(0), Some(4)]),
    );

    fx.composer()
        .run(&Cancellation::never(), &config_flow())
        .await
        .expect_err("script fails");

    assert_nothing_staged(&staging);
}

#[tokio::test]
async fn test_flow_cancelled_during_content_upload() {
    let staging = TempDir::new().expect("tempdir");
    let (handle, cancel) = cancellation();
    let comm = StallingCommunicator::new(handle, Stall::Upload);
    let ui = RecordingUi::default();
    let policy = BackoffPolicy::immediate(3);
    let executor = RemoteExecutor::new("/tmp").with_staging_dir(staging.path());
    let ctx = InterpolationContext::default();
    let composer = FlowComposer {
        ui: &ui,
        communicator: &comm,
        policy: &policy,
        executor: &executor,
        ctx: &ctx,
    };

    let err = composer
        .run(&cancel, &config_flow())
        .await
        .expect_err("cancelled mid-upload");

    assert!(err.is_cancelled(), "{err}");
    assert_eq!(*comm.uploads.borrow(), 1);
    assert_eq!(*comm.starts.borrow(), 0);
    assert_nothing_staged(&staging);
}

// ── transfer ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_transfer_directory_uses_recursive_upload() {
    let dir = TempDir::new().expect("tempdir");
    let comm = RecordingCommunicator::new();
    let ui = RecordingUi::default();
    let source = dir.path().to_string_lossy().into_owned();

    transfer(
        &Cancellation::never(),
        &ui,
        &comm,
        &InterpolationContext::default(),
        &source,
        "/srv/site",
    )
    .await
    .expect("directory upload succeeds");

    assert_eq!(
        *comm.dirs.borrow(),
        vec![("/srv/site".to_string(), dir.path().to_path_buf())]
    );
    assert!(comm.uploads.borrow().is_empty());
    assert_eq!(*ui.says.borrow(), vec![format!("Uploading {source} => /srv/site")]);
}

#[tokio::test]
async fn test_transfer_missing_source_is_stat_error() {
    let comm = RecordingCommunicator::new();
    let ui = RecordingUi::default();

    let err = transfer(
        &Cancellation::never(),
        &ui,
        &comm,
        &InterpolationContext::default(),
        "/definitely/not/here.txt",
        "/tmp/",
    )
    .await
    .expect_err("source is missing");

    assert!(matches!(err, TransferError::Stat { .. }));
}

#[tokio::test]
async fn test_transfer_undefined_variable_is_interpolation_error() {
    let comm = RecordingCommunicator::new();
    let ui = RecordingUi::default();

    let err = transfer(
        &Cancellation::never(),
        &ui,
        &comm,
        &InterpolationContext::default(),
        "{{ .Missing }}/file",
        "/tmp/",
    )
    .await
    .expect_err("variable is undefined");

    assert!(matches!(err, TransferError::Interpolate { which: "source", .. }));
    assert!(ui.says.borrow().is_empty());
}

// ── provision ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_provision_shell_runs_configured_commands() {
    let mut plugin = registry::lookup("shell-provisioner").expect("registered");
    let raw: Value = serde_yaml::from_str("commands: [\"echo hello\"]").expect("yaml");
    plugin.prepare(&[raw]).expect("valid config");

    let comm = RecordingCommunicator::new();
    let ui = RecordingUi::default();
    provision(
        &Cancellation::never(),
        &ui,
        &comm,
        &BackoffPolicy::immediate(1),
        &RemoteExecutor::new("/tmp"),
        plugin.as_ref(),
        &BTreeMap::new(),
    )
    .await
    .expect("provision succeeds");

    let uploads = comm.uploads.borrow();
    assert_eq!(uploads.len(), 1);
    assert!(String::from_utf8_lossy(&uploads[0].1).ends_with("echo hello\n"));
}

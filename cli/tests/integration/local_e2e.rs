//! End-to-end tests against the local machine as the target.
//!
//! Uses `LocalCommunicator` with a real `bash`, so commands and uploads take
//! effect on disk inside a temp directory.

#![cfg(unix)]
#![allow(clippy::expect_used)]

use std::cell::RefCell;
use std::io::Read;
use std::time::Duration;

use assert_cmd::Command;
use predicates::prelude::*;
use provisio::application::{Cancellation, ProvisionUi, RemoteExecutor, transfer};
use provisio::domain::{BackoffPolicy, ExecError, InterpolationContext};
use provisio::infra::command_runner::TokioCommandRunner;
use provisio::infra::local::LocalCommunicator;
use tempfile::TempDir;

#[derive(Default)]
struct CollectingUi {
    messages: RefCell<Vec<String>>,
}

impl ProvisionUi for CollectingUi {
    fn say(&self, _: &str) {}
    fn message(&self, message: &str) {
        self.messages.borrow_mut().push(message.to_string());
    }
    fn error(&self, _: &str) {}
    fn track_progress<'a>(
        &self,
        _: &str,
        _: u64,
        _: u64,
        reader: Box<dyn Read + 'a>,
    ) -> Box<dyn Read + 'a> {
        reader
    }
}

fn local() -> LocalCommunicator<TokioCommandRunner> {
    LocalCommunicator::new(TokioCommandRunner::new(Duration::from_secs(30)))
}

#[tokio::test]
async fn test_batch_shares_one_shell_session() {
    let scratch = TempDir::new().expect("tempdir");
    let ui = CollectingUi::default();
    let executor = RemoteExecutor::new(scratch.path().to_string_lossy());

    executor
        .execute(
            &Cancellation::never(),
            &ui,
            &local(),
            &BackoffPolicy::immediate(1),
            &["export GREETING=hello", "cd /", "echo \"$GREETING from $(pwd)\""],
        )
        .await
        .expect("batch succeeds");

    assert!(
        ui.messages.borrow().iter().any(|m| m == "hello from /"),
        "{:?}",
        ui.messages.borrow()
    );
}

#[tokio::test]
async fn test_batch_stops_at_first_failing_command() {
    let scratch = TempDir::new().expect("tempdir");
    let marker = scratch.path().join("marker");
    let ui = CollectingUi::default();
    let executor = RemoteExecutor::new(scratch.path().to_string_lossy());

    let err = executor
        .execute(
            &Cancellation::never(),
            &ui,
            &local(),
            &BackoffPolicy::immediate(2),
            &["exit 4".to_string(), format!("touch {}", marker.display())],
        )
        .await
        .expect_err("script exits non-zero");

    assert!(matches!(err, ExecError::NonZeroExit { code: 4, .. }), "{err}");
    assert!(!marker.exists());
}

#[tokio::test]
async fn test_transfer_file_to_directory_keeps_name() {
    let src = TempDir::new().expect("tempdir");
    let dst = TempDir::new().expect("tempdir");
    let file = src.path().join("index.html");
    std::fs::write(&file, "<html></html>").expect("write source");

    let destination = format!("{}/site/", dst.path().display());
    transfer(
        &Cancellation::never(),
        &CollectingUi::default(),
        &local(),
        &InterpolationContext::default(),
        &file.to_string_lossy(),
        &destination,
    )
    .await
    .expect("upload succeeds");

    let copied = std::fs::read_to_string(dst.path().join("site/index.html")).expect("copied");
    assert_eq!(copied, "<html></html>");
}

#[tokio::test]
async fn test_transfer_directory_recursively() {
    let src = TempDir::new().expect("tempdir");
    let dst = TempDir::new().expect("tempdir");
    std::fs::create_dir_all(src.path().join("static/js")).expect("mkdir");
    std::fs::write(src.path().join("static/js/app.js"), "main()").expect("write");

    let destination = dst.path().join("www");
    transfer(
        &Cancellation::never(),
        &CollectingUi::default(),
        &local(),
        &InterpolationContext::default(),
        &src.path().to_string_lossy(),
        &destination.to_string_lossy(),
    )
    .await
    .expect("upload succeeds");

    assert!(destination.join("static/js/app.js").is_file());
}

#[test]
fn test_provision_command_against_local_target() {
    let dir = TempDir::new().expect("tempdir");
    let out = dir.path().join("out.txt");
    let body = format!(
        "provisioner: shell-provisioner\n\
         target:\n  kind: local\n\
         scratch_dir: {scratch}\n\
         retry:\n  max_attempts: 1\n\
         config:\n  commands:\n    - export GREETING=hello\n    - echo $GREETING > {out}\n",
        scratch = dir.path().display(),
        out = out.display(),
    );
    let path = dir.path().join("provisio.yaml");
    std::fs::write(&path, body).expect("write provisioning file");

    Command::new(assert_cmd::cargo::cargo_bin!("provisio"))
        .env("NO_COLOR", "1")
        .args(["provision", "-f"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Provisioning complete"));

    assert_eq!(std::fs::read_to_string(&out).expect("output written"), "hello\n");
}

#[test]
fn test_provision_failing_command_exits_one() {
    let dir = TempDir::new().expect("tempdir");
    let body = format!(
        "provisioner: shell-provisioner\n\
         target:\n  kind: local\n\
         scratch_dir: {}\n\
         retry:\n  max_attempts: 1\n\
         config:\n  commands: [\"exit 9\"]\n",
        dir.path().display(),
    );
    let path = dir.path().join("provisio.yaml");
    std::fs::write(&path, body).expect("write provisioning file");

    Command::new(assert_cmd::cargo::cargo_bin!("provisio"))
        .env("NO_COLOR", "1")
        .args(["provision", "-f"])
        .arg(&path)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("exited with status 9"));
}

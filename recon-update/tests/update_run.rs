//! Update runs against the simulated record API

use recon_common::executor::DRY_RUN_CODE;
use recon_common::pipeline::DUPLICATE_CODE;
use recon_common::RunContext;
use recon_common::executor::ActionError;
use recon_update::api::{ApiResponse, UpdateRequest};
use recon_update::{load_updates, run_updates, RecordApi, RecordField, RecordUpdater, Session, SimulatedRecordApi};
use std::path::Path;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

const SHEET: &str = "equipment_id,License Plate,Color\nEQ1,ABC123,Red\nEQ2,XYZ789,\neq1,DEF456,Blue\nEQ3,,\n";

fn sheet(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("updates.csv");
    std::fs::write(&path, SHEET).unwrap();
    path
}

fn updater() -> RecordUpdater<SimulatedRecordApi> {
    RecordUpdater::new(
        SimulatedRecordApi::new().with_rejects(&["EQ2"]),
        Session { id: "session-test".into() },
    )
}

fn log_rows(path: &Path) -> Vec<Vec<String>> {
    let mut reader = csv::Reader::from_path(path).unwrap();
    assert_eq!(
        reader.headers().unwrap().iter().collect::<Vec<_>>(),
        vec!["record_id", "response_code", "status", "detail", "timestamp"]
    );
    reader
        .records()
        .map(|r| r.unwrap().iter().take(3).map(String::from).collect())
        .collect()
}

#[tokio::test]
async fn test_run_logs_success_rejection_and_duplicate() {
    let dir = TempDir::new().unwrap();
    let updates = load_updates(&sheet(&dir), &[RecordField::LicensePlate, RecordField::Color]).unwrap();
    let ctx = RunContext::new(false);

    let report = run_updates(&ctx, &updates, &updater(), dir.path()).await.unwrap();

    assert_eq!(report.summary.succeeded, 1);
    assert_eq!(report.summary.failed, 1);
    assert_eq!(report.summary.skipped, 1);

    let log_path = report.log_path.unwrap();
    assert_eq!(log_path, dir.path().join("update_log.csv"));
    assert_eq!(
        log_rows(&log_path),
        vec![
            vec!["EQ1", "200", "Success"],
            vec!["EQ2", "500", "Failed"],
            vec!["eq1", DUPLICATE_CODE, "Skipped"],
        ]
    );
}

#[tokio::test]
async fn test_dry_run_has_same_rows_as_real_run() {
    let dir = TempDir::new().unwrap();
    let updates = load_updates(&sheet(&dir), &[RecordField::LicensePlate, RecordField::Color]).unwrap();

    let dry_dir = dir.path().join("dry");
    let report = run_updates(&RunContext::new(true), &updates, &updater(), &dry_dir)
        .await
        .unwrap();
    let dry = log_rows(&report.log_path.unwrap());

    let real_dir = dir.path().join("real");
    let report = run_updates(&RunContext::new(false), &updates, &updater(), &real_dir)
        .await
        .unwrap();
    let real = log_rows(&report.log_path.unwrap());

    let ids = |rows: &[Vec<String>]| rows.iter().map(|r| r[0].clone()).collect::<Vec<_>>();
    assert_eq!(ids(&dry), ids(&real));
    assert_eq!(dry[0][1], DRY_RUN_CODE);
    assert_eq!(dry[1][1], DRY_RUN_CODE);
    assert_eq!(dry[2][1], DUPLICATE_CODE);
}

#[tokio::test]
async fn test_empty_update_set_writes_no_log() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("blank.csv");
    std::fs::write(&path, "equipment_id,Color\nEQ1,\nEQ2,  \n").unwrap();

    let updates = load_updates(&path, &[RecordField::Color]).unwrap();
    assert!(updates.is_empty());

    let out = dir.path().join("out");
    assert!(run_updates(&RunContext::new(false), &updates, &updater(), &out).await.is_none());
    assert!(!out.exists());
}

#[tokio::test]
async fn test_cancelled_run_still_writes_partial_log() {
    let dir = TempDir::new().unwrap();
    let updates = load_updates(&sheet(&dir), &[RecordField::LicensePlate]).unwrap();
    let ctx = RunContext::new(false);
    ctx.cancel.cancel();

    let report = run_updates(&ctx, &updates, &updater(), dir.path()).await.unwrap();
    assert!(report.summary.cancelled);
    assert!(log_rows(&report.log_path.unwrap()).is_empty());
}

/// Answers the update, then requests a stop
struct StopAfterFirst {
    inner: SimulatedRecordApi,
    cancel: CancellationToken,
}

#[async_trait::async_trait]
impl RecordApi for StopAfterFirst {
    async fn update(&self, session: &Session, request: &UpdateRequest) -> Result<ApiResponse, ActionError> {
        let response = self.inner.update(session, request).await;
        self.cancel.cancel();
        response
    }
}

#[tokio::test]
async fn test_stop_mid_run_logs_only_completed_rows() {
    let dir = TempDir::new().unwrap();
    let updates = load_updates(&sheet(&dir), &[RecordField::LicensePlate]).unwrap();
    let ctx = RunContext::new(false);
    let updater = RecordUpdater::new(
        StopAfterFirst {
            inner: SimulatedRecordApi::new(),
            cancel: ctx.cancel.clone(),
        },
        Session { id: "session-test".into() },
    );

    let report = run_updates(&ctx, &updates, &updater, dir.path()).await.unwrap();

    assert!(report.summary.cancelled);
    assert_eq!(report.summary.total(), 1);
    assert_eq!(log_rows(&report.log_path.unwrap()), vec![vec!["EQ1", "200", "Success"]]);
}

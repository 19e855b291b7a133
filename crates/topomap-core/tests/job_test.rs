//! Job lifecycle tests against in-memory collaborators.
#![allow(clippy::unwrap_used)]

mod common;

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use common::{MemoryStore, StaticAccess, device, graph, link};
use topomap_core::{
    DeviceId, JobController, JobState, MapStatus, ReconcileConfig, ScanMappingJob, TopologyGraph,
    TopologyMappingJob,
};

const PROJECT: &str = "plant-a";

fn design() -> TopologyGraph {
    graph(
        vec![
            device(1, "TSN-G5008", "192.168.127.1"),
            device(2, "EDS-4008", "192.168.127.2"),
        ],
        vec![link(1, (1, 1), (2, 1))],
        None,
    )
}

fn discovered() -> TopologyGraph {
    graph(
        vec![
            device(101, "TSN-G5008", "10.0.0.1"),
            device(102, "EDS-4008", "10.0.0.2"),
        ],
        vec![link(1, (101, 1), (102, 1))],
        Some(101),
    )
}

fn mapping_job(access: StaticAccess) -> TopologyMappingJob<StaticAccess, MemoryStore> {
    TopologyMappingJob::new(
        Arc::new(access),
        Arc::new(MemoryStore::with(PROJECT, design())),
        PROJECT,
        ReconcileConfig::default(),
    )
}

#[tokio::test]
async fn mapping_job_finishes_with_report() {
    let ctl = JobController::new();
    ctl.start(mapping_job(StaticAccess::new(discovered())))
        .await
        .unwrap();

    let status = ctl.wait().await;
    assert_eq!(status.state, JobState::Finished);
    assert_eq!(status.progress, 100);
    assert!(status.finished_at.is_some());

    let output = ctl.output().await.unwrap();
    let result = &output.reconciliation.result;
    assert!(result.deploy);
    assert_eq!(result.count(MapStatus::Success), 2);
    assert_eq!(output.reconciliation.carry_over.ip_settings.len(), 2);
    assert!(output.discovery_errors.is_empty());
}

#[tokio::test]
async fn self_links_are_reported_not_fatal() {
    let mut online = discovered();
    online.links.push(link(9, (102, 3), (102, 4)));

    let ctl = JobController::new();
    ctl.start(mapping_job(StaticAccess::new(online))).await.unwrap();

    assert_eq!(ctl.wait().await.state, JobState::Finished);
    let output = ctl.output().await.unwrap();
    assert_eq!(output.discovery_errors.len(), 1);
    assert!(output.reconciliation.result.deploy);
    assert_eq!(output.reconciliation.online.links.len(), 1);
}

#[tokio::test]
async fn stop_during_discovery_aborts() {
    let mut access = StaticAccess::new(discovered());
    access.delay = Some(Duration::from_secs(60));

    let ctl = JobController::new();
    ctl.start(mapping_job(access)).await.unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(ctl.status().state, JobState::Running);

    let status = ctl.stop().await;
    assert_eq!(status.state, JobState::Aborted);
    assert!(ctl.output().await.is_none());
}

#[tokio::test]
async fn discovery_timeout_fails_the_job() {
    let mut access = StaticAccess::new(discovered());
    access.delay = Some(Duration::from_secs(60));
    let mut job = mapping_job(access);
    job.config.discovery_timeout = Some(Duration::from_millis(10));

    let ctl = JobController::new();
    ctl.start(job).await.unwrap();
    let status = ctl.wait().await;
    assert_eq!(status.state, JobState::Failed);
    assert!(status.error.unwrap().contains("Topology discovery failed"));
}

#[tokio::test]
async fn missing_online_root_fails_without_output() {
    let mut online = discovered();
    online.source_device_id = Some(DeviceId(555));

    let ctl = JobController::new();
    ctl.start(mapping_job(StaticAccess::new(online))).await.unwrap();

    let status = ctl.wait().await;
    assert_eq!(status.state, JobState::Failed);
    assert!(status.error.unwrap().contains("Root device 555"));
    assert!(ctl.output().await.is_none());
}

#[tokio::test]
async fn unknown_project_fails() {
    let job = TopologyMappingJob::new(
        Arc::new(StaticAccess::new(discovered())),
        Arc::new(MemoryStore::default()),
        "nope",
        ReconcileConfig::default(),
    );
    let ctl = JobController::new();
    ctl.start(job).await.unwrap();
    let status = ctl.wait().await;
    assert_eq!(status.state, JobState::Failed);
    assert!(status.error.unwrap().contains("unknown project"));
}

#[tokio::test]
async fn scan_job_pairs_remaining_devices() {
    let mut online = discovered();
    online.devices.push(device(103, "EDS-4008", "10.0.0.3"));

    let job = ScanMappingJob {
        access: Arc::new(StaticAccess::new(online)),
        store: Arc::new(MemoryStore::with(PROJECT, design())),
        project_id: PROJECT.into(),
        remaining: Some(BTreeSet::from([DeviceId(1), DeviceId(2)])),
        config: ReconcileConfig::default(),
    };

    let ctl = JobController::new();
    ctl.start(job).await.unwrap();
    assert_eq!(ctl.wait().await.state, JobState::Finished);

    let output = ctl.output().await.unwrap();
    assert_eq!(output.result.count(MapStatus::Success), 2);
    assert_eq!(output.result.count(MapStatus::NotFound), 1);
    assert!(!output.result.deploy);
    assert!(output.carry_over.is_empty());
}

//! End-to-end reconciliation scenarios on hand-built graphs.
#![allow(clippy::unwrap_used)]

mod common;

use pretty_assertions::assert_eq;

use common::{ctx, device, graph, link};
use topomap_core::reconcile::reconcile;
use topomap_core::reconcile::report::IP_DUPLICATED_MESSAGE;
use topomap_core::{
    CoreError, DeviceId, DeviceType, MapStatus, MappingResult, TopologyGraph, TopologyMatch,
    TopologyMatcher,
};

fn run(offline: &TopologyGraph, online: &TopologyGraph) -> MappingResult {
    reconcile(&TopologyMatcher, &ctx(), offline, online, |_, _| {})
        .unwrap()
        .result
}

fn status_of(result: &MappingResult, offline_id: i64) -> MapStatus {
    result.row_for_offline(DeviceId(offline_id)).unwrap().status
}

fn error_of(result: &MappingResult, offline_id: i64) -> Option<String> {
    result.row_for_offline(DeviceId(offline_id)).unwrap().error.clone()
}

// ── Fixtures ────────────────────────────────────────────────────────

/// Ring 1-2-3-4-1 with a distinct root model on device 1.
fn ring(base: i64, net: &str) -> TopologyGraph {
    let ip = |n: i64| format!("{net}.{n}");
    graph(
        vec![
            device(base + 1, "TSN-G5008", &ip(1)),
            device(base + 2, "EDS-4008", &ip(2)),
            device(base + 3, "EDS-4008", &ip(3)),
            device(base + 4, "EDS-4008", &ip(4)),
        ],
        vec![
            link(1, (base + 1, 1), (base + 2, 1)),
            link(2, (base + 2, 2), (base + 3, 1)),
            link(3, (base + 3, 2), (base + 4, 2)),
            link(4, (base + 4, 1), (base + 1, 2)),
        ],
        None,
    )
}

/// Line 1-2-3 with a distinct root model on device 1.
fn line(base: i64, net: &str) -> TopologyGraph {
    let ip = |n: i64| format!("{net}.{n}");
    graph(
        vec![
            device(base + 1, "TSN-G5008", &ip(1)),
            device(base + 2, "EDS-4008", &ip(2)),
            device(base + 3, "EDS-4008", &ip(3)),
        ],
        vec![
            link(1, (base + 1, 1), (base + 2, 1)),
            link(2, (base + 2, 2), (base + 3, 1)),
        ],
        None,
    )
}

fn rooted(mut g: TopologyGraph, root: i64) -> TopologyGraph {
    g.source_device_id = Some(DeviceId(root));
    g
}

// ── Properties ──────────────────────────────────────────────────────

#[test]
fn isomorphic_graphs_map_cleanly() {
    let offline = ring(0, "192.168.127");
    let online = rooted(ring(100, "10.0.0"), 101);

    let outcome = reconcile(&TopologyMatcher, &ctx(), &offline, &online, |_, _| {}).unwrap();
    let result = &outcome.result;

    assert!(result.deploy);
    assert_eq!(result.rows.len(), 4);
    assert!(result.rows.iter().all(|r| r.status == MapStatus::Success));
    assert_eq!(outcome.source, Some(DeviceId(1)));
    assert_eq!(
        result.row_for_offline(DeviceId(3)).unwrap().online_device_id,
        Some(DeviceId(103))
    );

    // Every device changes address, so every device gets an IP entry.
    assert_eq!(outcome.carry_over.ip_settings.len(), 4);
    assert_eq!(outcome.carry_over.devices.len(), 4);

    // The discovered graph comes back layered.
    let far = outcome.online.devices.iter().find(|d| d.id == DeviceId(103)).unwrap();
    assert_eq!(far.distance, Some(2));
}

#[test]
fn repeated_runs_are_identical() {
    let offline = line(0, "192.168.127");
    let mut online = rooted(line(100, "192.168.127"), 101);
    online.devices[1].modules.ethernet.insert(2, 42);

    let first = run(&offline, &online);
    let second = run(&offline, &online);
    assert_eq!(first, second);

    let ids: Vec<u32> = first.rows.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[test]
fn single_missing_port_fails_the_device() {
    let offline = line(0, "192.168.127");
    let mut online = rooted(line(100, "192.168.127"), 101);
    online.links.retain(|l| l.id != 2);

    let result = run(&offline, &online);

    assert_eq!(status_of(&result, 1), MapStatus::Success);
    assert_eq!(status_of(&result, 2), MapStatus::Failed);
    assert_eq!(error_of(&result, 2).as_deref(), Some("Port (Eth1/2) not found"));
    assert_eq!(status_of(&result, 3), MapStatus::NotFound);
    assert!(!result.deploy);

    // The unreachable real device is listed as a benign extra.
    let extra = result.rows.last().unwrap();
    assert_eq!(extra.online_device_id, Some(DeviceId(103)));
    assert_eq!(extra.status, MapStatus::Skip);
}

#[test]
fn co_occurring_missing_ports_downgrade_to_warnings() {
    // Triangle 1-2-3; the 2-3 cable is missing on site.
    let design = |base: i64| {
        graph(
            vec![
                device(base + 1, "TSN-G5008", "192.168.127.1"),
                device(base + 2, "EDS-4008", "192.168.127.2"),
                device(base + 3, "EDS-4008", "192.168.127.3"),
            ],
            vec![
                link(1, (base + 1, 1), (base + 2, 1)),
                link(2, (base + 1, 2), (base + 3, 1)),
                link(3, (base + 2, 2), (base + 3, 2)),
            ],
            None,
        )
    };
    let offline = design(0);
    let mut online = rooted(design(100), 101);
    online.links.retain(|l| l.id != 3);

    let result = run(&offline, &online);

    assert_eq!(status_of(&result, 1), MapStatus::Success);
    assert_eq!(status_of(&result, 2), MapStatus::Warning);
    assert_eq!(status_of(&result, 3), MapStatus::Warning);
    assert_eq!(error_of(&result, 3).as_deref(), Some("Port (Eth1/2) not found"));
    assert!(result.deploy);
}

#[test]
fn module_mismatch_in_the_middle_of_a_line() {
    let offline = line(0, "192.168.127");
    let mut online = rooted(line(100, "192.168.127"), 101);
    online.devices[1].modules.ethernet.insert(2, 42);

    let result = run(&offline, &online);

    assert_eq!(status_of(&result, 1), MapStatus::Success);
    assert_eq!(status_of(&result, 2), MapStatus::Failed);
    assert_eq!(error_of(&result, 2).as_deref(), Some("Check Ethernet Module failed"));
    assert_eq!(status_of(&result, 3), MapStatus::Success);
    assert!(!result.deploy);
}

#[test]
fn unreachable_design_device_is_not_found() {
    let mut offline = line(0, "192.168.127");
    offline.devices.push(device(4, "X", "192.168.127.40"));
    let online = rooted(line(100, "192.168.127"), 101);

    let result = run(&offline, &online);

    assert_eq!(status_of(&result, 4), MapStatus::NotFound);
    assert_eq!(error_of(&result, 4).as_deref(), Some("Online device not found"));
    assert!(!result.deploy);
}

#[test]
fn extra_device_reusing_a_mapped_ip_is_flagged() {
    let offline = line(0, "192.168.127");
    let mut online = rooted(line(100, "10.0.0"), 101);
    online
        .devices
        .push(device(150, "EDS-2016", "192.168.127.2"));

    let result = run(&offline, &online);

    let extra = result
        .rows
        .iter()
        .find(|r| r.online_device_id == Some(DeviceId(150)))
        .unwrap();
    assert_eq!(extra.status, MapStatus::Failed);
    assert_eq!(extra.error.as_deref(), Some(IP_DUPLICATED_MESSAGE));
    assert_eq!(extra.id, 4);
    assert!(!result.deploy);
}

// ── Eligibility and structure ───────────────────────────────────────

#[test]
fn end_stations_and_foreign_devices_are_skipped() {
    let mut offline = line(0, "192.168.127");
    let mut host = device(4, "PC", "192.168.127.100");
    host.device_type = DeviceType::EndStation;
    let mut foreign = device(5, "C9300", "192.168.127.200");
    foreign.vendor = "Cisco".into();
    offline.devices.extend([host, foreign]);
    offline.links.push(link(3, (3, 2), (4, 1)));
    offline.links.push(link(4, (3, 3), (5, 1)));

    let online = rooted(line(100, "192.168.127"), 101);
    let result = run(&offline, &online);

    assert_eq!(status_of(&result, 3), MapStatus::Success);
    assert_eq!(status_of(&result, 4), MapStatus::Skip);
    assert_eq!(status_of(&result, 5), MapStatus::Skip);
    assert!(result.deploy);
}

#[test]
fn no_usable_root_yields_only_not_found_and_skip() {
    let offline = line(0, "192.168.127");
    // Online root model matches nothing in the design.
    let mut online = rooted(line(100, "192.168.127"), 101);
    online.devices[0].model_name = "MDS-G4012".into();

    let result = run(&offline, &online);
    assert!(result
        .rows
        .iter()
        .all(|r| matches!(r.status, MapStatus::NotFound | MapStatus::Skip)));
    assert!(!result.deploy);
}

#[test]
fn online_root_outside_its_graph_is_structural() {
    let offline = line(0, "192.168.127");
    let online = rooted(line(100, "192.168.127"), 999);

    let err = reconcile(&TopologyMatcher, &ctx(), &offline, &online, |_, _| {}).unwrap_err();
    assert!(matches!(err, CoreError::RootDeviceNotFound { .. }));
}

#[test]
fn unknown_profile_on_a_paired_device_is_structural() {
    let offline = rooted(line(0, "192.168.127"), 1);
    let mut online = rooted(line(100, "192.168.127"), 101);
    online.devices[1].profile_id = Some(topomap_core::ProfileId(99));

    let err = TopologyMatcher
        .match_topology(&ctx(), &offline, &online)
        .unwrap_err();
    assert!(matches!(err, CoreError::ProfileNotFound { .. }));
}

#[test]
fn built_in_power_ignores_power_modules() {
    let offline = line(0, "192.168.127");
    let mut online = rooted(line(100, "192.168.127"), 101);
    // Root is a fixed-PSU model: a power module difference does not matter.
    online.devices[0].profile_id = Some(common::PROFILE_BUILT_IN_POWER);
    online.devices[0].modules.power.insert(1, 5);
    // Device 2 has swappable PSUs: it does.
    online.devices[1].modules.power.insert(1, 5);

    let result = run(&offline, &online);
    assert_eq!(status_of(&result, 1), MapStatus::Success);
    assert_eq!(status_of(&result, 2), MapStatus::Failed);
    assert_eq!(error_of(&result, 2).as_deref(), Some("Check Power Module failed"));
}

#[test]
fn design_self_link_is_rejected() {
    let mut offline = line(0, "192.168.127");
    offline.links.push(link(9, (3, 3), (3, 4)));
    let online = rooted(line(100, "192.168.127"), 101);

    let err = reconcile(&TopologyMatcher, &ctx(), &offline, &online, |_, _| {}).unwrap_err();
    assert!(matches!(
        err,
        CoreError::SelfLink { device_id: DeviceId(3), .. }
    ));
}

// ── Pairing rules ───────────────────────────────────────────────────

#[test]
fn several_missing_ports_join_into_one_error() {
    // Star 1 -> {2, 3, 4}; only the 1-2 cable exists on site.
    let star = |base: i64| {
        graph(
            vec![
                device(base + 1, "TSN-G5008", "192.168.127.1"),
                device(base + 2, "EDS-4008", "192.168.127.2"),
                device(base + 3, "EDS-4008", "192.168.127.3"),
                device(base + 4, "EDS-4008", "192.168.127.4"),
            ],
            vec![
                link(1, (base + 1, 1), (base + 2, 1)),
                link(2, (base + 1, 2), (base + 3, 1)),
                link(3, (base + 1, 3), (base + 4, 1)),
            ],
            None,
        )
    };
    let offline = star(0);
    let mut online = rooted(star(100), 101);
    online.links.retain(|l| l.id == 1);

    let result = run(&offline, &online);

    assert_eq!(status_of(&result, 1), MapStatus::Failed);
    assert_eq!(
        error_of(&result, 1).as_deref(),
        Some("Port (Eth1/2) not found, Port (Eth1/3) not found")
    );
    assert_eq!(status_of(&result, 2), MapStatus::Success);
    assert_eq!(status_of(&result, 3), MapStatus::NotFound);
    assert_eq!(status_of(&result, 4), MapStatus::NotFound);
    assert!(!result.deploy);
}

#[test]
fn one_online_device_is_never_claimed_twice() {
    // Design root reaches 2 on port 1 and 3 on port 2. On site both root
    // ports are cabled to the same switch.
    let offline = graph(
        vec![
            device(1, "TSN-G5008", "192.168.127.1"),
            device(2, "EDS-4008", "192.168.127.2"),
            device(3, "EDS-4008", "192.168.127.3"),
        ],
        vec![link(1, (1, 1), (2, 1)), link(2, (1, 2), (3, 1))],
        None,
    );
    let online = graph(
        vec![
            device(101, "TSN-G5008", "10.0.0.1"),
            device(102, "EDS-4008", "10.0.0.2"),
        ],
        vec![link(11, (101, 1), (102, 1)), link(12, (101, 2), (102, 2))],
        Some(101),
    );

    let outcome = reconcile(&TopologyMatcher, &ctx(), &offline, &online, |_, _| {}).unwrap();
    let result = &outcome.result;

    let row2 = result.row_for_offline(DeviceId(2)).unwrap();
    assert_eq!(row2.online_device_id, Some(DeviceId(102)));
    assert_eq!(row2.status, MapStatus::Success);

    let row3 = result.row_for_offline(DeviceId(3)).unwrap();
    assert_eq!(row3.online_device_id, None);
    assert_eq!(row3.status, MapStatus::NotFound);
    assert_eq!(row3.error.as_deref(), Some("Online device not found"));

    let claimed: Vec<DeviceId> = result.rows.iter().filter_map(|r| r.online_device_id).collect();
    assert_eq!(claimed, vec![DeviceId(101), DeviceId(102)]);
    assert!(!result.deploy);
    assert!(outcome.carry_over.ip_settings.is_empty());
}

#[test]
fn model_mismatch_row_shows_both_models() {
    let offline = line(0, "192.168.127");
    let mut online = rooted(line(100, "192.168.127"), 101);
    online.devices[1].model_name = "EDS-2016".into();

    let result = run(&offline, &online);

    let row = result.row_for_offline(DeviceId(2)).unwrap();
    assert_eq!(row.status, MapStatus::Failed);
    assert_eq!(row.error.as_deref(), Some("Check Model Name failed"));
    assert_eq!(row.model_name, "EDS-4008");
    assert_eq!(row.online_model_name.as_deref(), Some("EDS-2016"));
}

use crate::ScenarioError;
use crate::flowmon::{DropReason, FlowId, FlowStatsSource, Metric, UndefinedReason};
use crate::net::GroupKind;
use crate::routing::RoutingProtocolChoice;
use crate::scenario::{Scenario, ScenarioConfig, run_scenario};
use crate::sim::SimTime;
use crate::topo::WifiParams;
use crate::traffic::EPHEMERAL_PORT_BASE;
use std::net::Ipv4Addr;

#[test]
fn default_scenario_produces_request_and_reply_flows() {
    let out = run_scenario(&ScenarioConfig::default()).expect("run");

    assert_eq!(out.protocol, RoutingProtocolChoice::Dsdv);
    assert_eq!(out.report.flows.len(), 2);

    let req = out.report.flow(FlowId(1)).expect("request flow");
    let tuple = req.tuple.expect("classified");
    assert_eq!(tuple.source_address, Ipv4Addr::new(10, 1, 3, 3));
    assert_eq!(tuple.destination_address, Ipv4Addr::new(10, 1, 2, 4));
    assert_eq!(tuple.source_port, EPHEMERAL_PORT_BASE);
    assert_eq!(tuple.destination_port, 9);
    assert_eq!(req.tx_packets, 8);
    assert_eq!(req.rx_packets, 8);
    assert_eq!(req.lost_packets, 0);
    assert!(req.mean_delay_s.is_defined());
    assert!(req.throughput_mbps.is_defined());

    let reply = out.report.flow(FlowId(2)).expect("reply flow");
    let tuple = reply.tuple.expect("classified");
    assert_eq!(tuple.source_address, Ipv4Addr::new(10, 1, 2, 4));
    assert_eq!(tuple.destination_port, EPHEMERAL_PORT_BASE);
    assert_eq!(reply.rx_packets, 8);

    assert!(out.report.completion_time > SimTime::from_secs(9));
    assert!(out.report.completion_time < SimTime::from_secs(10));
    assert_eq!(out.finished_at, SimTime::from_secs(20));
}

#[test]
fn traffic_endpoints_are_last_station_and_last_lan_node() {
    let scenario = Scenario::build(&ScenarioConfig::default()).expect("build");
    let plan = scenario.traffic.expect("traffic installed");
    let topo = &scenario.world.topo;

    assert_eq!(Some(plan.initiator), topo.wifi_stations.last());
    assert_eq!(Some(plan.responder), topo.lan.last());
    assert_eq!(plan.destination, Ipv4Addr::new(10, 1, 2, 4));
    // 路由器装配发生在运行之前
    assert_eq!(scenario.routing.calls.len(), 3);
    assert_eq!(scenario.sim.now(), SimTime::ZERO);
}

#[test]
fn unknown_protocol_fails_before_building() {
    let cfg = ScenarioConfig {
        protocol: 3,
        ..Default::default()
    };
    let err = Scenario::build(&cfg).err().expect("must fail");
    assert!(matches!(err, ScenarioError::UnknownProtocol(3)));
    assert!(err.is_configuration());
}

#[test]
fn dsr_and_aodv_runs_deliver_traffic() {
    for protocol in [0, 1] {
        let cfg = ScenarioConfig {
            protocol,
            mobility_type: 0,
            ..Default::default()
        };
        let out = run_scenario(&cfg).expect("run");
        assert_eq!(out.report.flows.len(), 2, "protocol {protocol}");
        assert_eq!(out.report.flows[0].rx_packets, 8, "protocol {protocol}");
    }
}

#[test]
fn dsr_without_stations_skips_wireless_and_has_no_flows() {
    let cfg = ScenarioConfig {
        protocol: 1,
        n_wifi: 0,
        ..Default::default()
    };
    let scenario = Scenario::build(&cfg).expect("build");
    assert!(scenario.routing.skipped_wireless);
    assert!(
        scenario
            .routing
            .calls
            .iter()
            .all(|c| !matches!(c.group(), GroupKind::WifiAp | GroupKind::WifiStations))
    );
    assert!(scenario.traffic.is_none());

    let out = scenario.run();
    assert!(out.report.flows.is_empty());
    assert_eq!(out.report.completion_time, SimTime::ZERO);
}

#[test]
fn out_of_range_station_loses_every_request() {
    let cfg = ScenarioConfig {
        mobility_type: 9,
        wifi: WifiParams {
            range_m: 1.0,
            ..Default::default()
        },
        ..Default::default()
    };
    let mut scenario = Scenario::build(&cfg).expect("build");
    let stop = scenario.stop;
    scenario.sim.run_until(stop, &mut scenario.world);
    let dropped = scenario.world.flowmon.flow_stats()[&FlowId(1)]
        .packets_dropped
        .get(&DropReason::OutOfRange)
        .copied();
    assert_eq!(dropped, Some(8));

    let out = run_scenario(&cfg).expect("run");
    assert_eq!(out.report.flows.len(), 1);
    let req = &out.report.flows[0];
    assert_eq!(req.tx_packets, 8);
    assert_eq!(req.lost_packets, 8);
    assert_eq!(
        req.mean_delay_s,
        Metric::Undefined(UndefinedReason::NoPacketsReceived)
    );
}

#[test]
fn packets_still_in_flight_at_stop_are_not_lost() {
    let cfg = ScenarioConfig {
        stop_time_s: 5.0,
        ..Default::default()
    };
    let out = run_scenario(&cfg).expect("run");
    let req = out.report.flow(FlowId(1)).expect("request flow");
    assert_eq!(req.tx_packets, 4);
    assert_eq!(req.rx_packets, 3);
    assert_eq!(req.lost_packets, 0);
}

#[test]
fn invalid_echo_window_is_a_configuration_error() {
    let mut cfg = ScenarioConfig::default();
    cfg.echo.client_start_s = 0.5;
    let err = run_scenario(&cfg).err().expect("must fail");
    assert!(matches!(err, ScenarioError::InvalidTrafficWindow { .. }));
}

#[test]
fn config_file_fills_missing_fields_with_defaults() {
    let dir = std::env::temp_dir().join(format!("manet-rs-cfg-{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    let path = dir.join("scenario.json");
    std::fs::write(&path, r#"{ "protocol": 0, "n_wifi": 5, "echo": { "port": 7 } }"#)
        .expect("write config");

    let cfg = ScenarioConfig::from_json_file(&path).expect("load");
    assert_eq!(cfg.protocol, 0);
    assert_eq!(cfg.n_wifi, 5);
    assert_eq!(cfg.n_csma, 3);
    assert_eq!(cfg.echo.port, 7);
    assert_eq!(cfg.echo.packet_size, 1024);

    let missing = ScenarioConfig::from_json_file(&dir.join("nope.json")).unwrap_err();
    assert!(matches!(missing, ScenarioError::Io { .. }));
}

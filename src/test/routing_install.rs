use crate::ScenarioError;
use crate::net::{GroupKind, NodeGroup};
use crate::routing::{
    InstallCall, Installation, NodeRouting, ProtocolStacks, RoutingBackend,
    RoutingProtocolChoice, TableDrivenProtocol, install_routing,
};
use crate::topo::{HetNetOpts, build_hetnet};

/// 只记录调用的后端
#[derive(Default)]
struct Recorder {
    calls: Vec<(GroupKind, Option<TableDrivenProtocol>, usize)>,
}

impl RoutingBackend for Recorder {
    fn install_stack(&mut self, group: &NodeGroup, protocol: TableDrivenProtocol) {
        self.calls.push((group.kind, Some(protocol), group.len()));
    }

    fn install_source_routing(&mut self, group: &NodeGroup) {
        self.calls.push((group.kind, None, group.len()));
    }
}

fn opts(n_wifi: usize) -> HetNetOpts {
    HetNetOpts {
        n_csma: 3,
        n_wifi,
        ..Default::default()
    }
}

#[test]
fn selector_values_map_to_protocols() {
    assert_eq!(
        RoutingProtocolChoice::try_from(0).unwrap(),
        RoutingProtocolChoice::Aodv
    );
    assert_eq!(
        RoutingProtocolChoice::try_from(1).unwrap(),
        RoutingProtocolChoice::Dsr
    );
    assert_eq!(
        RoutingProtocolChoice::try_from(2).unwrap(),
        RoutingProtocolChoice::Dsdv
    );
    assert!(matches!(
        RoutingProtocolChoice::try_from(3),
        Err(ScenarioError::UnknownProtocol(3))
    ));
    assert!(matches!(
        RoutingProtocolChoice::try_from(-1),
        Err(ScenarioError::UnknownProtocol(-1))
    ));
    assert_eq!(RoutingProtocolChoice::Dsr.installation(), Installation::PerNodeAgent);
    assert_eq!(RoutingProtocolChoice::Dsdv.to_string(), "DSDV");
}

#[test]
fn table_driven_protocols_use_shared_stack_on_lan_ap_and_stations() {
    let topo = build_hetnet(&opts(3));
    for (choice, protocol) in [
        (RoutingProtocolChoice::Aodv, TableDrivenProtocol::Aodv),
        (RoutingProtocolChoice::Dsdv, TableDrivenProtocol::Dsdv),
    ] {
        let mut rec = Recorder::default();
        let report = install_routing(choice, &topo, &mut rec);

        assert_eq!(
            rec.calls,
            vec![
                (GroupKind::Lan, Some(protocol), 4),
                (GroupKind::WifiAp, Some(protocol), 1),
                (GroupKind::WifiStations, Some(protocol), 3),
            ]
        );
        assert!(!report.skipped_wireless);
        assert!(report.calls.iter().all(|c| c.group() != GroupKind::Backbone));
    }
}

#[test]
fn dsr_installs_on_every_group_when_wireless_present() {
    let topo = build_hetnet(&opts(2));
    let mut rec = Recorder::default();
    let report = install_routing(RoutingProtocolChoice::Dsr, &topo, &mut rec);

    let groups: Vec<GroupKind> = rec.calls.iter().map(|c| c.0).collect();
    assert_eq!(
        groups,
        [
            GroupKind::Backbone,
            GroupKind::Lan,
            GroupKind::WifiAp,
            GroupKind::WifiStations
        ]
    );
    assert!(rec.calls.iter().all(|c| c.1.is_none()));
    assert_eq!(
        report.calls[0],
        InstallCall::SourceRouting {
            group: GroupKind::Backbone
        }
    );
}

#[test]
fn dsr_skips_wireless_groups_without_wireless_devices() {
    let topo = build_hetnet(&opts(0));
    let mut rec = Recorder::default();
    let report = install_routing(RoutingProtocolChoice::Dsr, &topo, &mut rec);

    let groups: Vec<GroupKind> = rec.calls.iter().map(|c| c.0).collect();
    assert_eq!(groups, [GroupKind::Backbone, GroupKind::Lan]);
    assert!(report.skipped_wireless);
}

#[test]
fn protocol_stacks_keep_first_installation_per_node() {
    let topo = build_hetnet(&opts(2));
    let mut stacks = ProtocolStacks::default();
    install_routing(RoutingProtocolChoice::Aodv, &topo, &mut stacks);

    // b0 不在任何被安装的组里
    assert!(!stacks.is_routable(topo.backbone.nodes()[0]));
    assert_eq!(
        stacks.routing_of(topo.gateway()),
        Some(NodeRouting::Table(TableDrivenProtocol::Aodv))
    );
    assert_eq!(stacks.len(), 1 + 3 + 2);

    let mut dsr = ProtocolStacks::default();
    install_routing(RoutingProtocolChoice::Dsr, &topo, &mut dsr);
    assert!(dsr.is_routable(topo.backbone.nodes()[0]));
    assert_eq!(dsr.routing_of(topo.gateway()), Some(NodeRouting::SourceRouted));
    assert_eq!(dsr.len(), topo.node_count());
}

use crate::net::{AddressError, AddressPlan, NodeId, Subnet};
use crate::topo::{HetNetOpts, build_hetnet};
use proptest::prelude::*;
use std::net::Ipv4Addr;

fn opts(n_csma: usize, n_wifi: usize) -> HetNetOpts {
    HetNetOpts {
        n_csma,
        n_wifi,
        ..Default::default()
    }
}

#[test]
fn default_plan_assigns_three_consecutive_subnets() {
    let topo = build_hetnet(&opts(3, 3));
    let addressing = AddressPlan::default().assign(&topo).expect("assign");

    let subnets: Vec<String> = addressing.subnets().map(|s| s.to_string()).collect();
    assert_eq!(subnets, ["10.1.1.0/24", "10.1.2.0/24", "10.1.3.0/24"]);

    let backbone = topo.backbone_segment().id;
    assert_eq!(
        addressing.address_of(NodeId(0), backbone),
        Some(Ipv4Addr::new(10, 1, 1, 1))
    );
    assert_eq!(
        addressing.address_of(topo.gateway(), backbone),
        Some(Ipv4Addr::new(10, 1, 1, 2))
    );

    let lan = topo.lan_segment().id;
    assert_eq!(
        addressing.address_of(topo.gateway(), lan),
        Some(Ipv4Addr::new(10, 1, 2, 1))
    );
    assert_eq!(
        addressing.address_of(topo.lan.last().unwrap(), lan),
        Some(Ipv4Addr::new(10, 1, 2, 4))
    );
}

#[test]
fn wifi_subnet_numbers_stations_before_access_point() {
    let topo = build_hetnet(&opts(3, 3));
    let addressing = AddressPlan::default().assign(&topo).expect("assign");
    let wifi = topo.wifi_segment().expect("wifi segment").id;

    for (i, &sta) in topo.wifi_stations.nodes().iter().enumerate() {
        assert_eq!(
            addressing.address_of(sta, wifi),
            Some(Ipv4Addr::new(10, 1, 3, i as u8 + 1))
        );
    }
    assert_eq!(
        addressing.address_of(topo.gateway(), wifi),
        Some(Ipv4Addr::new(10, 1, 3, 4))
    );
    assert_eq!(
        addressing.node_of(Ipv4Addr::new(10, 1, 3, 4)),
        Some(topo.gateway())
    );
}

#[test]
fn wifi_subnet_is_reserved_without_stations() {
    let topo = build_hetnet(&opts(2, 0));
    let addressing = AddressPlan::default().assign(&topo).expect("assign");

    let assignments = addressing.assignments();
    assert_eq!(assignments.len(), 3);
    assert_eq!(assignments[2].subnet.to_string(), "10.1.3.0/24");
    assert!(assignments[2].interfaces.is_empty());
}

#[test]
fn plan_rejects_bad_prefix_and_misaligned_base() {
    assert_eq!(
        AddressPlan::new(Ipv4Addr::new(10, 0, 0, 0), 31).unwrap_err(),
        AddressError::InvalidPrefix(31)
    );
    assert!(matches!(
        AddressPlan::new(Ipv4Addr::new(10, 1, 1, 5), 24),
        Err(AddressError::MisalignedBase { prefix_len: 24, .. })
    ));
}

#[test]
fn lan_larger_than_subnet_is_rejected() {
    let topo = build_hetnet(&opts(254, 1));
    let err = AddressPlan::default().assign(&topo).unwrap_err();
    assert!(matches!(
        err,
        AddressError::HostsExhausted {
            capacity: 254,
            needed: 255,
            ..
        }
    ));
}

#[test]
fn plan_stops_at_end_of_address_space() {
    let mut plan = AddressPlan::new(Ipv4Addr::new(255, 255, 254, 0), 24).expect("plan");
    plan.next_subnet().expect("first");
    plan.next_subnet().expect("second");
    assert_eq!(
        plan.next_subnet().unwrap_err(),
        AddressError::SpaceExhausted { allocated: 2 }
    );
}

#[test]
fn subnet_helpers() {
    let s = Subnet::new(Ipv4Addr::new(10, 1, 2, 0), 24);
    assert_eq!(s.netmask(), Ipv4Addr::new(255, 255, 255, 0));
    assert_eq!(s.host_capacity(), 254);
    assert_eq!(s.host(1), Some(Ipv4Addr::new(10, 1, 2, 1)));
    assert_eq!(s.host(255), None);
    assert!(s.contains(Ipv4Addr::new(10, 1, 2, 200)));
    assert!(!s.overlaps(Subnet::new(Ipv4Addr::new(10, 1, 3, 0), 24)));
    assert!(s.overlaps(Subnet::new(Ipv4Addr::new(10, 1, 0, 0), 16)));
}

proptest! {
    #[test]
    fn assigned_subnets_never_overlap_and_addresses_are_unique(
        n_csma in 0usize..40,
        n_wifi in 0usize..40,
        prefix_len in 24u8..=26,
    ) {
        let topo = build_hetnet(&opts(n_csma, n_wifi));
        let mut plan = AddressPlan::new(Ipv4Addr::new(10, 1, 1, 0), prefix_len).unwrap();
        let addressing = plan.assign(&topo).unwrap();

        let subnets: Vec<Subnet> = addressing.subnets().collect();
        for (i, a) in subnets.iter().enumerate() {
            for b in &subnets[i + 1..] {
                prop_assert!(!a.overlaps(*b));
            }
        }

        let mut seen = std::collections::HashSet::new();
        for assignment in addressing.assignments() {
            for iface in &assignment.interfaces {
                prop_assert!(assignment.subnet.contains(iface.address));
                prop_assert!(seen.insert(iface.address));
            }
        }
    }
}

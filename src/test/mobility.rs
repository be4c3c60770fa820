use crate::mobility::{
    CourseChange, FAST_SPEED_MPS, GridPositionAllocator, MobilityMode, MobilityModels,
    MobilityProfile, SLOW_SPEED_MPS, Vector2, WALK_BOUNDS, select_profiles,
};
use crate::scenario::{Scenario, ScenarioConfig};
use crate::sim::{SimTime, Simulator};
use crate::topo::{HetNetOpts, build_hetnet};
use std::cell::RefCell;
use std::rc::Rc;

fn topo(n_wifi: usize) -> crate::topo::HetTopology {
    build_hetnet(&HetNetOpts {
        n_csma: 3,
        n_wifi,
        ..Default::default()
    })
}

#[test]
fn mode_selectors_map_to_exact_speeds() {
    assert_eq!(MobilityMode::from_selector(0).walk_speed(), Some(28.0));
    assert_eq!(MobilityMode::from_selector(1).walk_speed(), Some(1.4));
    assert_eq!(FAST_SPEED_MPS, 28.0);
    assert_eq!(SLOW_SPEED_MPS, 1.4);
    assert_eq!(MobilityMode::from_selector(5), MobilityMode::Unrecognized(5));
    assert_eq!(MobilityMode::Unrecognized(5).walk_speed(), None);
}

#[test]
fn grid_allocator_fills_rows_of_three() {
    let grid = GridPositionAllocator::default();
    assert_eq!(grid.position(0), Vector2::new(0.0, 0.0));
    assert_eq!(grid.position(2), Vector2::new(10.0, 0.0));
    assert_eq!(grid.position(3), Vector2::new(0.0, 10.0));
    assert_eq!(grid.position(4), Vector2::new(5.0, 10.0));
}

#[test]
fn stations_walk_and_ap_takes_next_grid_slot() {
    let topo = topo(3);
    let plan = select_profiles(MobilityMode::Fast, &topo, &GridPositionAllocator::default());

    assert_eq!(plan.assignments.len(), 4);
    for (i, &sta) in topo.wifi_stations.nodes().iter().enumerate() {
        match plan.profile_of(sta) {
            Some(MobilityProfile::RandomWalk {
                initial,
                speed_mps,
                bounds,
            }) => {
                assert_eq!(*initial, GridPositionAllocator::default().position(i));
                assert_eq!(*speed_mps, 28.0);
                assert_eq!(*bounds, WALK_BOUNDS);
            }
            other => panic!("station {sta} got {other:?}"),
        }
    }
    assert_eq!(
        plan.profile_of(topo.gateway()),
        Some(&MobilityProfile::Stationary {
            position: Vector2::new(0.0, 10.0)
        })
    );
    assert!(plan.profile_of(topo.backbone.nodes()[0]).is_none());
}

#[test]
fn unrecognized_mode_leaves_stations_at_grid_positions() {
    let topo = topo(2);
    let plan = select_profiles(
        MobilityMode::from_selector(7),
        &topo,
        &GridPositionAllocator::default(),
    );

    for &sta in topo.wifi_stations.nodes() {
        let profile = plan.profile_of(sta).expect("station profile");
        assert!(matches!(profile, MobilityProfile::Stationary { .. }));
        assert_eq!(profile.speed_mps(), 0.0);
    }
}

#[test]
fn random_walk_stays_in_bounds_and_respects_speed() {
    let topo = topo(3);
    let plan = select_profiles(MobilityMode::Fast, &topo, &GridPositionAllocator::default());
    let mut sim = Simulator::default();
    let mut models = MobilityModels::new(42);
    models.install(&plan, &mut sim);

    let sta = topo.wifi_stations.nodes()[0];
    assert!(models.is_mobile(sta));
    assert!(!models.is_mobile(topo.gateway()));

    let mut prev = models.position_at(sta, SimTime::ZERO).expect("position");
    assert_eq!(prev, Vector2::new(0.0, 0.0));
    for s in 0..30u64 {
        let epoch = SimTime::from_secs(s);
        models.advance_epoch(sta, epoch);
        for step in 1..=4u64 {
            let t = epoch.saturating_add(SimTime::from_millis(250 * step));
            let p = models.position_at(sta, t).expect("position");
            assert!(WALK_BOUNDS.contains(p), "{p} out of bounds at {t}");
            assert!(p.distance(prev) <= FAST_SPEED_MPS * 0.25 + 1e-9);
            prev = p;
        }
    }
}

#[test]
fn same_seed_gives_same_trajectory() {
    let topo = topo(1);
    let plan = select_profiles(MobilityMode::Slow, &topo, &GridPositionAllocator::default());
    let sta = topo.wifi_stations.nodes()[0];

    let trace = |seed: u64| {
        let mut sim = Simulator::default();
        let mut models = MobilityModels::new(seed);
        models.install(&plan, &mut sim);
        (0..10u64)
            .map(|s| {
                models.advance_epoch(sta, SimTime::from_secs(s));
                let t = SimTime::from_secs(s).saturating_add(SimTime::from_millis(500));
                models.position_at(sta, t)
            })
            .collect::<Vec<_>>()
    };
    assert_eq!(trace(7), trace(7));
}

#[test]
fn course_change_hook_fires_once_per_epoch() {
    let topo = topo(1);
    let plan = select_profiles(MobilityMode::Slow, &topo, &GridPositionAllocator::default());
    let sta = topo.wifi_stations.nodes()[0];
    let mut sim = Simulator::default();
    let mut models = MobilityModels::new(1);
    models.install(&plan, &mut sim);

    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    models.on_course_change(
        sta,
        Box::new(move |c: &CourseChange| sink.borrow_mut().push(c.at)),
    );

    for s in 0..3u64 {
        models.advance_epoch(sta, SimTime::from_secs(s));
    }
    assert_eq!(
        *seen.borrow(),
        vec![SimTime::ZERO, SimTime::from_secs(1), SimTime::from_secs(2)]
    );
    assert_eq!(models.advance_epoch(topo.gateway(), SimTime::ZERO), None);
}

#[test]
fn access_point_never_moves_during_a_run() {
    let cfg = ScenarioConfig {
        mobility_type: 0,
        ..Default::default()
    };
    let mut scenario = Scenario::build(&cfg).expect("build");
    let ap = scenario.world.topo.gateway();
    let start = scenario
        .world
        .mobility
        .position_at(ap, SimTime::ZERO)
        .expect("ap position");

    for s in 1..=20u64 {
        let t = SimTime::from_secs(s);
        scenario.sim.run_until(t, &mut scenario.world);
        assert_eq!(scenario.world.mobility.position_at(ap, t), Some(start));
    }
    assert_eq!(start, Vector2::new(0.0, 10.0));
}

//! 场景运行
//!
//! 装配顺序：协议校验 -> 拓扑 -> 地址 -> 移动性 -> 路由 -> 流量 -> 运行 -> 归约。
//! 所有配置都在 `run_until` 之前完成；流记录只在它返回之后读取。

use super::config::ScenarioConfig;
use super::world::HetNetWorld;
use crate::error::ScenarioError;
use crate::flowmon::{FlowMonitor, MAX_PER_HOP_DELAY, ScenarioReport};
use crate::mobility::{
    GridPositionAllocator, MobilityMode, MobilityModels, MobilityPlan, select_profiles,
};
use crate::net::{AddressPlan, Network};
use crate::routing::{InstallReport, ProtocolStacks, RoutingProtocolChoice, install_routing};
use crate::sim::{SimTime, Simulator};
use crate::topo::build_hetnet;
use crate::traffic::{EchoApps, TrafficPlan, install_echo};
use tracing::info;

/// 装配完成、尚未运行的场景
pub struct Scenario {
    pub sim: Simulator,
    pub world: HetNetWorld,
    pub protocol: RoutingProtocolChoice,
    pub mobility: MobilityPlan,
    pub routing: InstallReport,
    pub traffic: Option<TrafficPlan>,
    pub stop: SimTime,
}

/// 运行结果
#[derive(Debug, Clone)]
pub struct ScenarioOutcome {
    pub protocol: RoutingProtocolChoice,
    pub report: ScenarioReport,
    pub traffic: Option<TrafficPlan>,
    pub events: u64,
    pub finished_at: SimTime,
}

impl Scenario {
    /// 按配置装配场景。未知的协议选择值在构建任何状态之前返回错误。
    #[tracing::instrument(skip_all, fields(protocol = cfg.protocol, n_csma = cfg.n_csma, n_wifi = cfg.n_wifi))]
    pub fn build(cfg: &ScenarioConfig) -> Result<Self, ScenarioError> {
        let protocol = RoutingProtocolChoice::try_from(cfg.protocol)?;
        cfg.echo.validate()?;
        let mut plan = AddressPlan::new(cfg.address_base, cfg.prefix_len)?;

        let topo = build_hetnet(&cfg.topology_opts());
        let addressing = plan.assign(&topo)?;

        let mut sim = Simulator::default();
        let mode = MobilityMode::from_selector(cfg.mobility_type);
        let mobility_plan = select_profiles(mode, &topo, &GridPositionAllocator::default());
        let mut mobility = MobilityModels::new(cfg.seed);
        mobility.install(&mobility_plan, &mut sim);

        let mut stacks = ProtocolStacks::default();
        let routing = install_routing(protocol, &topo, &mut stacks);
        let net = Network::build(topo.node_count(), topo.segments(), |n| {
            stacks.is_routable(n)
        });

        let (apps, traffic) =
            match install_echo(&cfg.echo, &topo, &addressing, &mut mobility, &mut sim)? {
                Some((apps, plan)) => (apps, Some(plan)),
                None => (EchoApps::default(), None),
            };

        let world = HetNetWorld {
            topo,
            addressing,
            stacks,
            mobility,
            net,
            flowmon: FlowMonitor::default(),
            apps,
        };

        Ok(Self {
            sim,
            world,
            protocol,
            mobility: mobility_plan,
            routing,
            traffic,
            stop: SimTime::from_secs_f64(cfg.stop_time_s),
        })
    }

    /// 运行到停止时刻，然后归约流记录
    pub fn run(mut self) -> ScenarioOutcome {
        info!("Starting Simulation");
        let events = self.sim.run_until(self.stop, &mut self.world);
        info!("Ended Simulation");

        let now = self.sim.now();
        self.world
            .flowmon
            .check_for_lost_packets(now, MAX_PER_HOP_DELAY);
        let report = ScenarioReport::from_source(&self.world.flowmon);
        for flow in &report.flows {
            info!("{flow}");
        }
        info!(completion_time = %report.completion_time, "全部流的最后接收时刻");

        ScenarioOutcome {
            protocol: self.protocol,
            report,
            traffic: self.traffic,
            events,
            finished_at: now,
        }
    }
}

/// 装配并运行一次场景
pub fn run_scenario(cfg: &ScenarioConfig) -> Result<ScenarioOutcome, ScenarioError> {
    Ok(Scenario::build(cfg)?.run())
}

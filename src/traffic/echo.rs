//! UDP echo 流量场景
//!
//! 响应端在 LAN 最后一个节点上监听固定端口；发起端在最后一个 STA 上按固定
//! 间隔发送定长请求。目的地址取响应端的 LAN 地址，使流量穿过
//! 无线 -> AP -> 有线 的完整异构路径。

use crate::error::ScenarioError;
use crate::mobility::{CourseChange, MobilityModels};
use crate::net::{Addressing, NodeId};
use crate::scenario::HetNetWorld;
use crate::sim::{Event, SimTime, Simulator, World};
use crate::topo::HetTopology;
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;
use tracing::{info, warn};

/// 发起端使用的第一个临时端口
pub const EPHEMERAL_PORT_BASE: u16 = 49153;

/// echo 流量参数（时间单位：秒）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EchoConfig {
    pub port: u16,
    pub server_start_s: f64,
    pub server_stop_s: f64,
    pub client_start_s: f64,
    pub client_stop_s: f64,
    pub max_packets: u32,
    pub interval_s: f64,
    pub packet_size: u32,
}

impl Default for EchoConfig {
    fn default() -> Self {
        Self {
            port: 9,
            server_start_s: 1.0,
            server_stop_s: 10.0,
            client_start_s: 2.0,
            client_stop_s: 10.0,
            max_packets: 100,
            interval_s: 1.0,
            packet_size: 1024,
        }
    }
}

impl EchoConfig {
    /// 发起端窗口必须在响应端启动之后开始，并且不晚于响应端停止
    pub fn validate(&self) -> Result<(), ScenarioError> {
        let server_start = SimTime::from_secs_f64(self.server_start_s);
        let server_stop = SimTime::from_secs_f64(self.server_stop_s);
        let client_start = SimTime::from_secs_f64(self.client_start_s);
        let client_stop = SimTime::from_secs_f64(self.client_stop_s);
        let ok = server_start < server_stop
            && client_start < client_stop
            && client_start > server_start
            && client_stop <= server_stop;
        if ok {
            Ok(())
        } else {
            Err(ScenarioError::InvalidTrafficWindow {
                server_start,
                server_stop,
                client_start,
                client_stop,
            })
        }
    }
}

/// 响应端
#[derive(Debug, Clone)]
pub struct EchoServerApp {
    pub node: NodeId,
    pub address: Ipv4Addr,
    pub port: u16,
    pub start: SimTime,
    pub stop: SimTime,
    pub received: u64,
    pub echoed: u64,
}

impl EchoServerApp {
    pub fn is_active(&self, now: SimTime) -> bool {
        now >= self.start && now < self.stop
    }
}

/// 发起端
#[derive(Debug, Clone)]
pub struct EchoClientApp {
    pub node: NodeId,
    pub address: Ipv4Addr,
    pub port: u16,
    pub remote: Ipv4Addr,
    pub remote_port: u16,
    pub start: SimTime,
    pub stop: SimTime,
    pub interval: SimTime,
    pub max_packets: u32,
    pub packet_size: u32,
    pub sent: u32,
    pub received: u32,
}

impl EchoClientApp {
    /// 当前时刻能否再发一个请求
    pub fn can_send(&self, now: SimTime) -> bool {
        now >= self.start && now < self.stop && self.sent < self.max_packets
    }
}

/// 装在世界里的应用实例
#[derive(Debug, Clone, Default)]
pub struct EchoApps {
    pub server: Option<EchoServerApp>,
    pub client: Option<EchoClientApp>,
}

/// 流量场景的端点摘要
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrafficPlan {
    pub responder: NodeId,
    pub initiator: NodeId,
    pub destination: Ipv4Addr,
}

/// 安装 echo 流量场景。
///
/// 没有 STA 时不存在发起端：跳过安装并返回 `Ok(None)`。
#[tracing::instrument(skip_all)]
pub fn install_echo(
    cfg: &EchoConfig,
    topo: &HetTopology,
    addressing: &Addressing,
    mobility: &mut MobilityModels,
    sim: &mut Simulator,
) -> Result<Option<(EchoApps, TrafficPlan)>, ScenarioError> {
    cfg.validate()?;

    let Some(initiator) = topo.wifi_stations.last() else {
        warn!("没有无线 STA，跳过 echo 流量安装");
        return Ok(None);
    };
    let Some(responder) = topo.lan.last() else {
        warn!("LAN 为空，跳过 echo 流量安装");
        return Ok(None);
    };

    let lan_seg = topo.lan_segment().id;
    let Some(destination) = addressing.address_of(responder, lan_seg) else {
        warn!(node = %responder, "响应端没有 LAN 地址，跳过 echo 流量安装");
        return Ok(None);
    };
    let wifi_seg = topo.wifi_segment().map(|s| s.id);
    let Some(source) = wifi_seg
        .and_then(|seg| addressing.address_of(initiator, seg))
        .or_else(|| addressing.primary_address(initiator))
    else {
        warn!(node = %initiator, "发起端没有地址，跳过 echo 流量安装");
        return Ok(None);
    };

    let server = EchoServerApp {
        node: responder,
        address: destination,
        port: cfg.port,
        start: SimTime::from_secs_f64(cfg.server_start_s),
        stop: SimTime::from_secs_f64(cfg.server_stop_s),
        received: 0,
        echoed: 0,
    };
    let client = EchoClientApp {
        node: initiator,
        address: source,
        port: EPHEMERAL_PORT_BASE,
        remote: destination,
        remote_port: cfg.port,
        start: SimTime::from_secs_f64(cfg.client_start_s),
        stop: SimTime::from_secs_f64(cfg.client_stop_s),
        interval: SimTime::from_secs_f64(cfg.interval_s),
        max_packets: cfg.max_packets,
        packet_size: cfg.packet_size,
        sent: 0,
        received: 0,
    };

    sim.schedule(client.start, SendEchoRequest);

    let context = format!("/NodeList/{}/MobilityModel/CourseChange", initiator.0);
    mobility.on_course_change(
        initiator,
        Box::new(move |c: &CourseChange| {
            info!(
                target: "course_change",
                at = %c.at,
                "{} x = {}, y = {}",
                context,
                c.position.x,
                c.position.y
            );
        }),
    );

    info!(
        responder = %responder,
        initiator = %initiator,
        %destination,
        port = cfg.port,
        "echo 流量已安装"
    );

    let plan = TrafficPlan {
        responder,
        initiator,
        destination,
    };
    Ok(Some((
        EchoApps {
            server: Some(server),
            client: Some(client),
        },
        plan,
    )))
}

/// 事件：发起端发送下一个请求，并按间隔调度下一次
#[derive(Debug)]
pub struct SendEchoRequest;

impl Event for SendEchoRequest {
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World) {
        let w = HetNetWorld::from_dyn(world);
        if let Some(next) = w.echo_client_send(sim) {
            sim.schedule(next, SendEchoRequest);
        }
    }
}

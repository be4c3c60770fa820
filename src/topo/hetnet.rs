//! 异构网络拓扑构建
//!
//! 拓扑结构：
//!
//! ```text
//!   b0 ==p2p== b1 ----csma---- l1 .. lN
//!               )))
//!           wifi AP  <- s0 .. sM
//! ```
//!
//! b1 是唯一的网关：骨干第二个端点、LAN 首成员、无线 AP 是同一个节点。
//! 本模块只创建节点与链路段，不涉及地址和路由协议。

use crate::net::{
    DeviceId, DeviceRole, GroupKind, LinkSegment, Medium, NetDevice, NodeGroup, NodeId,
    NodeRegistry, SegmentId,
};
use crate::sim::SimTime;
use serde::{Deserialize, Serialize};
use tracing::info;

/// 点对点骨干参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointToPointParams {
    pub data_rate_bps: u64,
    pub delay: SimTime,
}

impl Default for PointToPointParams {
    fn default() -> Self {
        Self {
            data_rate_bps: 5_000_000,
            delay: SimTime::from_millis(2),
        }
    }
}

/// CSMA LAN 参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsmaParams {
    pub data_rate_bps: u64,
    pub delay: SimTime,
}

impl Default for CsmaParams {
    fn default() -> Self {
        Self {
            data_rate_bps: 100_000_000,
            delay: SimTime::from_nanos(6_560),
        }
    }
}

/// 无线小区参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WifiParams {
    pub ssid: String,
    pub data_rate_bps: u64,
    pub delay: SimTime,
    pub range_m: f64,
}

impl Default for WifiParams {
    fn default() -> Self {
        Self {
            ssid: "manet-ssid".to_string(),
            data_rate_bps: 54_000_000,
            delay: SimTime::from_micros(50),
            range_m: 100.0,
        }
    }
}

/// 拓扑配置
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HetNetOpts {
    /// LAN 上除网关外的额外节点数
    pub n_csma: usize,
    /// 无线 STA 数
    pub n_wifi: usize,
    pub backbone: PointToPointParams,
    pub lan: CsmaParams,
    pub wifi: WifiParams,
}

/// 构建完成的异构拓扑
#[derive(Debug, Clone)]
pub struct HetTopology {
    pub nodes: NodeRegistry,
    pub backbone: NodeGroup,
    pub lan: NodeGroup,
    pub wifi_stations: NodeGroup,
    pub wifi_ap: NodeGroup,
    segments: Vec<LinkSegment>,
    backbone_seg: SegmentId,
    lan_seg: SegmentId,
    wifi_seg: Option<SegmentId>,
}

impl HetTopology {
    pub fn segments(&self) -> &[LinkSegment] {
        &self.segments
    }

    pub fn segment(&self, id: SegmentId) -> Option<&LinkSegment> {
        self.segments.get(id.0)
    }

    pub fn backbone_segment(&self) -> &LinkSegment {
        &self.segments[self.backbone_seg.0]
    }

    pub fn lan_segment(&self) -> &LinkSegment {
        &self.segments[self.lan_seg.0]
    }

    /// 无线小区；没有 STA 时不创建
    pub fn wifi_segment(&self) -> Option<&LinkSegment> {
        self.wifi_seg.map(|id| &self.segments[id.0])
    }

    pub fn has_wireless_devices(&self) -> bool {
        self.wifi_segment().is_some_and(|s| !s.devices().is_empty())
    }

    /// 网关：骨干第二端点 = LAN 根 = AP
    pub fn gateway(&self) -> NodeId {
        self.lan.nodes()[0]
    }

    /// 按固定顺序列出全部节点组
    pub fn groups(&self) -> [&NodeGroup; 4] {
        [&self.backbone, &self.lan, &self.wifi_stations, &self.wifi_ap]
    }

    pub fn group(&self, kind: GroupKind) -> &NodeGroup {
        match kind {
            GroupKind::Backbone => &self.backbone,
            GroupKind::Lan => &self.lan,
            GroupKind::WifiStations => &self.wifi_stations,
            GroupKind::WifiAp => &self.wifi_ap,
        }
    }

    /// 不同节点身份的数量
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

struct SegmentBuilder {
    segments: Vec<LinkSegment>,
    next_device: usize,
}

impl SegmentBuilder {
    fn add(
        &mut self,
        name: &str,
        medium: Medium,
        members: impl IntoIterator<Item = (NodeId, DeviceRole)>,
    ) -> SegmentId {
        let id = SegmentId(self.segments.len());
        let devices = members
            .into_iter()
            .map(|(node, role)| {
                let dev = NetDevice {
                    id: DeviceId(self.next_device),
                    node,
                    segment: id,
                    role,
                };
                self.next_device += 1;
                dev
            })
            .collect();
        self.segments.push(LinkSegment::new(id, name, medium, devices));
        id
    }
}

/// 构建异构拓扑
///
/// 节点身份数 = 2 + n_csma + n_wifi；网关出现在骨干、LAN、AP 三个组中，只计一次。
#[tracing::instrument(skip(opts), fields(n_csma = opts.n_csma, n_wifi = opts.n_wifi))]
pub fn build_hetnet(opts: &HetNetOpts) -> HetTopology {
    let mut nodes = NodeRegistry::default();
    let mut backbone = NodeGroup::new(GroupKind::Backbone);
    let mut lan = NodeGroup::new(GroupKind::Lan);
    let mut wifi_stations = NodeGroup::new(GroupKind::WifiStations);
    let mut wifi_ap = NodeGroup::new(GroupKind::WifiAp);

    nodes.create("b0", &mut backbone);
    let gateway = nodes.create("b1", &mut backbone);

    nodes.add_to(gateway, &mut lan);
    for i in 0..opts.n_csma {
        nodes.create(format!("l{}", i + 1), &mut lan);
    }

    for i in 0..opts.n_wifi {
        nodes.create(format!("s{i}"), &mut wifi_stations);
    }
    nodes.add_to(gateway, &mut wifi_ap);

    let mut sb = SegmentBuilder {
        segments: Vec::with_capacity(3),
        next_device: 0,
    };

    let backbone_seg = sb.add(
        "backbone",
        Medium::PointToPoint {
            data_rate_bps: opts.backbone.data_rate_bps,
            delay: opts.backbone.delay,
        },
        backbone.nodes().iter().map(|&n| (n, DeviceRole::Wired)),
    );

    let lan_seg = sb.add(
        "lan",
        Medium::Csma {
            data_rate_bps: opts.lan.data_rate_bps,
            delay: opts.lan.delay,
        },
        lan.nodes().iter().map(|&n| (n, DeviceRole::Wired)),
    );

    let wifi_seg = (!wifi_stations.is_empty()).then(|| {
        let members = wifi_stations
            .nodes()
            .iter()
            .map(|&n| (n, DeviceRole::Station))
            .chain(wifi_ap.nodes().iter().map(|&n| (n, DeviceRole::AccessPoint)));
        sb.add(
            "wifi",
            Medium::Wifi {
                ssid: opts.wifi.ssid.clone(),
                data_rate_bps: opts.wifi.data_rate_bps,
                delay: opts.wifi.delay,
                range_m: opts.wifi.range_m,
            },
            members,
        )
    });

    info!(
        nodes = nodes.len(),
        backbone = backbone.len(),
        lan = lan.len(),
        stations = wifi_stations.len(),
        wireless = wifi_seg.is_some(),
        "🏗️  拓扑构建完成"
    );

    HetTopology {
        nodes,
        backbone,
        lan,
        wifi_stations,
        wifi_ap,
        segments: sb.segments,
        backbone_seg,
        lan_seg,
        wifi_seg,
    }
}

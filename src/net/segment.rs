//! 链路段类型
//!
//! 链路段把两个或更多节点的设备连到同一种介质上。创建后不可变。

use super::id::{DeviceId, NodeId, SegmentId};
use crate::sim::SimTime;
use serde::{Deserialize, Serialize};

/// 传输介质及其参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Medium {
    /// 点对点链路
    PointToPoint { data_rate_bps: u64, delay: SimTime },
    /// 共享总线 LAN（CSMA）
    Csma { data_rate_bps: u64, delay: SimTime },
    /// 基础设施模式无线小区
    Wifi {
        ssid: String,
        data_rate_bps: u64,
        /// 信道接入 + 传播的固定时延
        delay: SimTime,
        /// 超出该距离（米）的 STA<->AP 帧被丢弃
        range_m: f64,
    },
}

impl Medium {
    pub fn data_rate_bps(&self) -> u64 {
        match self {
            Medium::PointToPoint { data_rate_bps, .. }
            | Medium::Csma { data_rate_bps, .. }
            | Medium::Wifi { data_rate_bps, .. } => *data_rate_bps,
        }
    }

    pub fn delay(&self) -> SimTime {
        match self {
            Medium::PointToPoint { delay, .. }
            | Medium::Csma { delay, .. }
            | Medium::Wifi { delay, .. } => *delay,
        }
    }

    pub fn is_wireless(&self) -> bool {
        matches!(self, Medium::Wifi { .. })
    }

    /// 计算传输指定字节数所需的时间
    pub fn tx_time(&self, bytes: u32) -> SimTime {
        // ceil(bytes*8 / bps) 秒 -> 纳秒
        let bps = self.data_rate_bps();
        if bps == 0 {
            return SimTime(u64::MAX / 4);
        }
        let bits = (bytes as u128).saturating_mul(8);
        let nanos = (bits.saturating_mul(1_000_000_000u128) + (bps as u128 - 1)) / bps as u128;
        SimTime(nanos.min(u64::MAX as u128) as u64)
    }
}

/// 设备在链路段上的角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceRole {
    Wired,
    Station,
    AccessPoint,
}

/// 网络设备：节点挂在某个链路段上的接口
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetDevice {
    pub id: DeviceId,
    pub node: NodeId,
    pub segment: SegmentId,
    pub role: DeviceRole,
}

/// 链路段
#[derive(Debug, Clone)]
pub struct LinkSegment {
    pub id: SegmentId,
    pub name: String,
    pub medium: Medium,
    devices: Vec<NetDevice>,
}

impl LinkSegment {
    pub(crate) fn new(
        id: SegmentId,
        name: impl Into<String>,
        medium: Medium,
        devices: Vec<NetDevice>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            medium,
            devices,
        }
    }

    /// 段上的设备，按安装顺序
    pub fn devices(&self) -> &[NetDevice] {
        &self.devices
    }

    pub fn devices_with_role(&self, role: DeviceRole) -> impl Iterator<Item = &NetDevice> {
        self.devices.iter().filter(move |d| d.role == role)
    }

    pub fn attaches(&self, node: NodeId) -> bool {
        self.devices.iter().any(|d| d.node == node)
    }

    pub fn device_of(&self, node: NodeId) -> Option<&NetDevice> {
        self.devices.iter().find(|d| d.node == node)
    }

    /// 两个节点能否在本段上直接交换帧。
    ///
    /// 无线小区工作在基础设施模式：只有 STA<->AP 相邻，STA 之间不直连。
    pub fn adjacent(&self, a: NodeId, b: NodeId) -> bool {
        if a == b {
            return false;
        }
        let (Some(da), Some(db)) = (self.device_of(a), self.device_of(b)) else {
            return false;
        };
        if self.medium.is_wireless() {
            matches!(
                (da.role, db.role),
                (DeviceRole::Station, DeviceRole::AccessPoint)
                    | (DeviceRole::AccessPoint, DeviceRole::Station)
            )
        } else {
            true
        }
    }
}

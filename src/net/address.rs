//! IPv4 地址规划
//!
//! 按固定顺序为每个网段分配互不重叠的子网：骨干 -> LAN -> 无线
//! （STA 与 AP 共用同一个无线子网，STA 先编号，AP 随后）。

use super::id::{DeviceId, NodeId, SegmentId};
use super::segment::{DeviceRole, LinkSegment, NetDevice};
use crate::topo::HetTopology;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;
use thiserror::Error;
use tracing::{debug, info};

/// 地址分配错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("invalid prefix length /{0} (expected 8..=30)")]
    InvalidPrefix(u8),
    #[error("base address {base} is not aligned to /{prefix_len}")]
    MisalignedBase { base: Ipv4Addr, prefix_len: u8 },
    #[error("address space exhausted after {allocated} subnets")]
    SpaceExhausted { allocated: usize },
    #[error("subnet {candidate} overlaps already assigned {existing}")]
    Overlap { candidate: Subnet, existing: Subnet },
    #[error("subnet {subnet} has room for {capacity} hosts, {needed} requested")]
    HostsExhausted {
        subnet: Subnet,
        capacity: u32,
        needed: usize,
    },
}

/// 子网：网络地址 + 前缀长度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Subnet {
    pub network: Ipv4Addr,
    pub prefix_len: u8,
}

impl Subnet {
    pub fn new(network: Ipv4Addr, prefix_len: u8) -> Self {
        Self {
            network,
            prefix_len,
        }
    }

    fn mask(self) -> u32 {
        if self.prefix_len == 0 {
            0
        } else {
            u32::MAX << (32 - u32::from(self.prefix_len.min(32)))
        }
    }

    fn block_size(self) -> u64 {
        1u64 << (32 - u32::from(self.prefix_len.min(32)))
    }

    fn first(self) -> u32 {
        u32::from(self.network) & self.mask()
    }

    fn last(self) -> u32 {
        self.first() | !self.mask()
    }

    pub fn netmask(self) -> Ipv4Addr {
        Ipv4Addr::from(self.mask())
    }

    pub fn contains(self, addr: Ipv4Addr) -> bool {
        u32::from(addr) & self.mask() == self.first()
    }

    pub fn overlaps(self, other: Subnet) -> bool {
        self.first() <= other.last() && other.first() <= self.last()
    }

    /// 可分配主机数（去掉网络地址与广播地址）
    pub fn host_capacity(self) -> u32 {
        u32::try_from(self.block_size().saturating_sub(2)).unwrap_or(u32::MAX)
    }

    /// 第 `n` 个主机地址（从 1 开始）
    pub fn host(self, n: u32) -> Option<Ipv4Addr> {
        if n == 0 || n > self.host_capacity() {
            return None;
        }
        Some(Ipv4Addr::from(self.first() + n))
    }
}

impl fmt::Display for Subnet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network, self.prefix_len)
    }
}

/// 单个设备的接口地址
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceAddress {
    pub device: DeviceId,
    pub node: NodeId,
    pub segment: SegmentId,
    pub address: Ipv4Addr,
}

/// 某个子网上的全部接口
#[derive(Debug, Clone)]
pub struct SubnetAssignment {
    pub subnet: Subnet,
    pub interfaces: Vec<InterfaceAddress>,
}

/// 地址分配结果，按分配顺序：骨干、LAN、无线
#[derive(Debug, Clone, Default)]
pub struct Addressing {
    assignments: Vec<SubnetAssignment>,
}

impl Addressing {
    pub fn assignments(&self) -> &[SubnetAssignment] {
        &self.assignments
    }

    pub fn subnets(&self) -> impl Iterator<Item = Subnet> + '_ {
        self.assignments.iter().map(|a| a.subnet)
    }

    pub fn interfaces(&self) -> impl Iterator<Item = &InterfaceAddress> {
        self.assignments.iter().flat_map(|a| a.interfaces.iter())
    }

    /// 节点在指定链路段上的地址
    pub fn address_of(&self, node: NodeId, segment: SegmentId) -> Option<Ipv4Addr> {
        self.interfaces()
            .find(|i| i.node == node && i.segment == segment)
            .map(|i| i.address)
    }

    /// 反查地址所属节点
    pub fn node_of(&self, addr: Ipv4Addr) -> Option<NodeId> {
        self.interfaces()
            .find(|i| i.address == addr)
            .map(|i| i.node)
    }

    /// 节点的第一个接口地址（用作报文源地址的兜底）
    pub fn primary_address(&self, node: NodeId) -> Option<Ipv4Addr> {
        self.interfaces().find(|i| i.node == node).map(|i| i.address)
    }
}

/// 地址规划器：从基址开始逐个分配等长子网
#[derive(Debug, Clone)]
pub struct AddressPlan {
    next: u64,
    prefix_len: u8,
    allocated: Vec<Subnet>,
}

impl Default for AddressPlan {
    fn default() -> Self {
        Self {
            next: u64::from(u32::from(Ipv4Addr::new(10, 1, 1, 0))),
            prefix_len: 24,
            allocated: Vec::new(),
        }
    }
}

impl AddressPlan {
    pub fn new(base: Ipv4Addr, prefix_len: u8) -> Result<Self, AddressError> {
        if !(8..=30).contains(&prefix_len) {
            return Err(AddressError::InvalidPrefix(prefix_len));
        }
        let candidate = Subnet::new(base, prefix_len);
        if candidate.first() != u32::from(base) {
            return Err(AddressError::MisalignedBase { base, prefix_len });
        }
        Ok(Self {
            next: u64::from(u32::from(base)),
            prefix_len,
            allocated: Vec::new(),
        })
    }

    pub fn allocated(&self) -> &[Subnet] {
        &self.allocated
    }

    /// 分配下一个子网
    pub fn next_subnet(&mut self) -> Result<Subnet, AddressError> {
        let network = u32::try_from(self.next).map_err(|_| AddressError::SpaceExhausted {
            allocated: self.allocated.len(),
        })?;
        let candidate = Subnet::new(Ipv4Addr::from(network), self.prefix_len);
        if let Some(existing) = self.allocated.iter().find(|s| s.overlaps(candidate)) {
            return Err(AddressError::Overlap {
                candidate,
                existing: *existing,
            });
        }
        self.next += candidate.block_size();
        self.allocated.push(candidate);
        debug!(subnet = %candidate, "分配子网");
        Ok(candidate)
    }

    /// 按 骨干 -> LAN -> 无线 STA -> 无线 AP 的顺序给拓扑分配地址。
    ///
    /// 没有无线设备时仍保留无线子网，保证各网段编号与节点数无关。
    #[tracing::instrument(skip_all)]
    pub fn assign(&mut self, topo: &HetTopology) -> Result<Addressing, AddressError> {
        let mut out = Addressing::default();

        let backbone = self.next_subnet()?;
        out.assignments.push(number_devices(
            backbone,
            topo.backbone_segment().devices().iter(),
        )?);

        let lan = self.next_subnet()?;
        out.assignments
            .push(number_devices(lan, topo.lan_segment().devices().iter())?);

        let wifi = self.next_subnet()?;
        let wifi_devices: Vec<_> = match topo.wifi_segment() {
            Some(seg) => stations_then_ap(seg),
            None => Vec::new(),
        };
        out.assignments
            .push(number_devices(wifi, wifi_devices.into_iter())?);

        info!(
            backbone = %backbone,
            lan = %lan,
            wifi = %wifi,
            interfaces = out.interfaces().count(),
            "地址分配完成"
        );
        Ok(out)
    }
}

fn stations_then_ap(seg: &LinkSegment) -> Vec<&NetDevice> {
    seg.devices_with_role(DeviceRole::Station)
        .chain(seg.devices_with_role(DeviceRole::AccessPoint))
        .collect()
}

fn number_devices<'a>(
    subnet: Subnet,
    devices: impl ExactSizeIterator<Item = &'a NetDevice>,
) -> Result<SubnetAssignment, AddressError> {
    let needed = devices.len();
    if needed > subnet.host_capacity() as usize {
        return Err(AddressError::HostsExhausted {
            subnet,
            capacity: subnet.host_capacity(),
            needed,
        });
    }
    let interfaces = devices
        .zip(1u32..)
        .filter_map(|(dev, n)| {
            subnet.host(n).map(|address| InterfaceAddress {
                device: dev.id,
                node: dev.node,
                segment: dev.segment,
                address,
            })
        })
        .collect();
    Ok(SubnetAssignment { subnet, interfaces })
}

//! 数据包类型
//!
//! 带 IPv4/UDP 头信息的数据包，以及沿预计算路径逐跳前进的游标。

use super::id::NodeId;
use crate::flowmon::FiveTuple;
use std::net::Ipv4Addr;

/// IPv4 (20) + UDP (8) 头部字节数
pub const IP_UDP_HEADER_BYTES: u32 = 28;
/// IP 协议号：UDP
pub const PROTO_UDP: u8 = 17;

/// 应用层载荷
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payload {
    EchoRequest { seq: u32 },
    EchoReply { seq: u32 },
}

/// 网络数据包
#[derive(Debug, Clone)]
pub struct Packet {
    pub id: u64,
    pub protocol: u8,
    pub src_addr: Ipv4Addr,
    pub dst_addr: Ipv4Addr,
    pub src_port: u16,
    pub dst_port: u16,
    /// 线上长度（含 IP/UDP 头）
    pub size_bytes: u32,
    pub payload: Payload,
    pub route: Vec<NodeId>,
    pub hop: usize, // 当前所在节点在 route 中的索引
}

impl Packet {
    /// 应用层载荷长度
    pub fn payload_bytes(&self) -> u32 {
        self.size_bytes.saturating_sub(IP_UDP_HEADER_BYTES)
    }

    pub fn five_tuple(&self) -> FiveTuple {
        FiveTuple {
            protocol: self.protocol,
            source_address: self.src_addr,
            destination_address: self.dst_addr,
            source_port: self.src_port,
            destination_port: self.dst_port,
        }
    }

    /// 获取目标节点
    pub fn dst(&self) -> Option<NodeId> {
        self.route.last().copied()
    }

    /// 获取当前所在节点
    pub fn at(&self) -> Option<NodeId> {
        self.route.get(self.hop).copied()
    }

    /// 获取下一跳节点（如果有）
    pub fn next(&self) -> Option<NodeId> {
        self.route.get(self.hop + 1).copied()
    }

    /// 前进到下一跳
    pub fn advance(mut self) -> Self {
        self.hop += 1;
        self
    }
}

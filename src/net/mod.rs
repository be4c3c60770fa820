//! 网络模型
//!
//! 节点身份与节点组、链路段与设备、IPv4 地址规划，以及一个最短跳数的
//! 参考转发平面。

mod address;
mod deliver_packet;
mod id;
mod network;
mod node;
mod packet;
mod routing;
mod segment;
mod stats;

pub use address::{
    AddressError, AddressPlan, Addressing, InterfaceAddress, Subnet, SubnetAssignment,
};
pub use deliver_packet::DeliverPacket;
pub use id::{DeviceId, NodeId, SegmentId};
pub use network::{Network, segment_between};
pub use node::{GroupKind, NodeGroup, NodeInfo, NodeRegistry};
pub use packet::{IP_UDP_HEADER_BYTES, PROTO_UDP, Packet, Payload};
pub use routing::RoutingTable;
pub use segment::{DeviceRole, LinkSegment, Medium, NetDevice};
pub use stats::Stats;

//! 场景世界
//!
//! 持有运行期全部状态，并实现逐跳转发与 echo 应用的收发逻辑。

use crate::flowmon::{DropReason, FlowMonitor};
use crate::mobility::MobilityModels;
use crate::net::{
    Addressing, DeliverPacket, IP_UDP_HEADER_BYTES, Medium, Network, NodeId, PROTO_UDP, Packet,
    Payload, segment_between,
};
use crate::routing::ProtocolStacks;
use crate::sim::{SimTime, Simulator, World};
use crate::topo::HetTopology;
use crate::traffic::EchoApps;
use std::any::Any;
use std::net::Ipv4Addr;
use tracing::{debug, info, trace};

pub struct HetNetWorld {
    pub topo: HetTopology,
    pub addressing: Addressing,
    pub stacks: ProtocolStacks,
    pub mobility: MobilityModels,
    pub net: Network,
    pub flowmon: FlowMonitor,
    pub apps: EchoApps,
}

impl World for HetNetWorld {
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

struct Datagram {
    src_addr: Ipv4Addr,
    dst_addr: Ipv4Addr,
    src_port: u16,
    dst_port: u16,
    payload_bytes: u32,
    payload: Payload,
}

impl HetNetWorld {
    /// 事件里取回具体世界类型
    pub fn from_dyn(world: &mut dyn World) -> &mut HetNetWorld {
        world
            .as_any_mut()
            .downcast_mut::<HetNetWorld>()
            .expect("world must be HetNetWorld")
    }

    /// 从 `from` 发出一个 UDP 包：登记到流量监控后沿路由转发
    fn originate(&mut self, from: NodeId, d: Datagram, sim: &mut Simulator) {
        let now = sim.now();
        let dst_node = self.addressing.node_of(d.dst_addr);
        let route = dst_node
            .and_then(|dst| self.net.route(from, dst))
            .unwrap_or_default();
        let pkt = Packet {
            id: self.net.next_packet_id(),
            protocol: PROTO_UDP,
            src_addr: d.src_addr,
            dst_addr: d.dst_addr,
            src_port: d.src_port,
            dst_port: d.dst_port,
            size_bytes: d.payload_bytes.saturating_add(IP_UDP_HEADER_BYTES),
            payload: d.payload,
            route,
            hop: 0,
        };
        self.flowmon.report_first_tx(&pkt, now);
        self.net.stats.sent_pkts += 1;

        if pkt.route.is_empty() {
            debug!(pkt_id = pkt.id, from = %from, dst = %d.dst_addr, "没有可用路由");
            self.drop_packet(&pkt, DropReason::NoRoute);
            return;
        }
        self.deliver(from, pkt, sim);
    }

    /// 包到达节点：未到目的地则继续转发，否则交给应用
    pub fn deliver(&mut self, to: NodeId, pkt: Packet, sim: &mut Simulator) {
        if pkt.next().is_some() {
            self.forward_from(to, pkt, sim);
            return;
        }
        let now = sim.now();
        self.flowmon.report_last_rx(&pkt, now);
        self.net.stats.delivered_pkts += 1;
        self.net.stats.delivered_bytes += u64::from(pkt.size_bytes);
        self.on_app_receive(to, &pkt, sim);
    }

    fn forward_from(&mut self, from: NodeId, pkt: Packet, sim: &mut Simulator) {
        let Some(next) = pkt.next() else {
            return;
        };
        let now = sim.now();
        let Some(seg) = segment_between(self.topo.segments(), from, next) else {
            self.drop_packet(&pkt, DropReason::NoRoute);
            return;
        };

        if let Medium::Wifi { range_m, .. } = seg.medium {
            let a = self.mobility.position_at(from, now);
            let b = self.mobility.position_at(next, now);
            let in_range = matches!((a, b), (Some(a), Some(b)) if a.distance(b) <= range_m);
            if !in_range {
                debug!(pkt_id = pkt.id, from = %from, to = %next, ?a, ?b, "无线跳超出通信距离");
                self.drop_packet(&pkt, DropReason::OutOfRange);
                return;
            }
        }

        let arrive = self.net.transmit(seg, from, pkt.size_bytes, now);
        trace!(pkt_id = pkt.id, from = %from, to = %next, arrive = %arrive, "转发");
        sim.schedule(
            arrive,
            DeliverPacket {
                to: next,
                pkt: pkt.advance(),
            },
        );
    }

    fn drop_packet(&mut self, pkt: &Packet, reason: DropReason) {
        self.net.stats.dropped_pkts += 1;
        self.flowmon.report_drop(pkt, reason);
    }

    fn on_app_receive(&mut self, at: NodeId, pkt: &Packet, sim: &mut Simulator) {
        let now = sim.now();
        match pkt.payload {
            Payload::EchoRequest { seq } => {
                let Some(server) = self.apps.server.as_mut() else {
                    return;
                };
                if server.node != at || server.port != pkt.dst_port || !server.is_active(now) {
                    trace!(pkt_id = pkt.id, "echo 请求无人接收");
                    return;
                }
                server.received += 1;
                server.echoed += 1;
                info!(at = %now, seq, from = %pkt.src_addr, "Server received {} bytes", pkt.payload_bytes());
                let reply = Datagram {
                    src_addr: pkt.dst_addr,
                    dst_addr: pkt.src_addr,
                    src_port: pkt.dst_port,
                    dst_port: pkt.src_port,
                    payload_bytes: pkt.payload_bytes(),
                    payload: Payload::EchoReply { seq },
                };
                self.originate(at, reply, sim);
            }
            Payload::EchoReply { seq } => {
                let Some(client) = self.apps.client.as_mut() else {
                    return;
                };
                if client.node != at || client.port != pkt.dst_port {
                    return;
                }
                client.received += 1;
                info!(at = %now, seq, from = %pkt.src_addr, "Client received {} bytes", pkt.payload_bytes());
            }
        }
    }

    /// 发起端发送一个请求；返回下一次发送时刻
    pub fn echo_client_send(&mut self, sim: &mut Simulator) -> Option<SimTime> {
        let now = sim.now();
        let client = self.apps.client.as_mut()?;
        if !client.can_send(now) {
            return None;
        }
        let seq = client.sent;
        client.sent += 1;
        let node = client.node;
        let d = Datagram {
            src_addr: client.address,
            dst_addr: client.remote,
            src_port: client.port,
            dst_port: client.remote_port,
            payload_bytes: client.packet_size,
            payload: Payload::EchoRequest { seq },
        };
        let next = now.saturating_add(client.interval);
        let more = client.interval > SimTime::ZERO && client.can_send(next);
        info!(at = %now, seq, to = %d.dst_addr, "Client sent {} bytes", d.payload_bytes);

        self.originate(node, d, sim);
        more.then_some(next)
    }
}

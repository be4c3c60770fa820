//! 数据包到达事件

use super::id::NodeId;
use super::packet::Packet;
use crate::scenario::HetNetWorld;
use crate::sim::{Event, Simulator, World};
use tracing::trace;

/// 事件：把一个 packet 交给某个节点处理。
#[derive(Debug)]
pub struct DeliverPacket {
    pub to: NodeId,
    pub pkt: Packet,
}

impl Event for DeliverPacket {
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World) {
        let DeliverPacket { to, pkt } = *self;
        trace!(pkt_id = pkt.id, to = %to, hop = pkt.hop, now = %sim.now(), "📨 数据包到达节点");
        HetNetWorld::from_dyn(world).deliver(to, pkt, sim);
    }
}

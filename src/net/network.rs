//! 参考转发平面
//!
//! 只负责三件事：在可路由节点之间算路、按链路段串行化发送时间、
//! 分配包序号。丢包判定（无线距离、无路由）由世界对象结合移动性完成。

use std::collections::HashMap;

use super::id::{NodeId, SegmentId};
use super::routing::RoutingTable;
use super::segment::LinkSegment;
use super::stats::Stats;
use crate::sim::SimTime;
use tracing::{debug, trace};

#[derive(Debug, Default)]
pub struct Network {
    adj: Vec<Vec<NodeId>>,
    rev_adj: Vec<Vec<NodeId>>,
    routes: RoutingTable,
    /// (链路段, 发送节点) -> 发送器空闲时刻
    busy_until: HashMap<(SegmentId, NodeId), SimTime>,
    next_pkt_id: u64,
    pub stats: Stats,
}

impl Network {
    /// 由链路段与“节点是否可路由”判定构建邻接关系
    pub fn build(
        node_count: usize,
        segments: &[LinkSegment],
        routable: impl Fn(NodeId) -> bool,
    ) -> Self {
        let mut adj = vec![Vec::new(); node_count];
        let mut rev_adj = vec![Vec::new(); node_count];
        for seg in segments {
            for a in seg.devices() {
                for b in seg.devices() {
                    if !seg.adjacent(a.node, b.node) || !routable(a.node) || !routable(b.node) {
                        continue;
                    }
                    if !adj[a.node.0].contains(&b.node) {
                        adj[a.node.0].push(b.node);
                        rev_adj[b.node.0].push(a.node);
                    }
                }
            }
        }
        let edges: usize = adj.iter().map(Vec::len).sum();
        debug!(nodes = node_count, edges, "构建转发邻接表");
        Self {
            adj,
            rev_adj,
            routes: RoutingTable::new(),
            ..Default::default()
        }
    }

    /// 源到目的的完整转发路径
    pub fn route(&mut self, src: NodeId, dst: NodeId) -> Option<Vec<NodeId>> {
        if src.0 >= self.adj.len() || dst.0 >= self.adj.len() {
            return None;
        }
        self.routes.ensure_built(&self.adj, &self.rev_adj);
        self.routes.path(src, dst)
    }

    pub fn neighbors(&self, node: NodeId) -> &[NodeId] {
        self.adj.get(node.0).map_or(&[], Vec::as_slice)
    }

    pub fn next_packet_id(&mut self) -> u64 {
        let id = self.next_pkt_id;
        self.next_pkt_id = self.next_pkt_id.wrapping_add(1);
        id
    }

    /// 在链路段上从 `from` 发送 `bytes`，返回到达对端的时刻
    pub fn transmit(
        &mut self,
        seg: &LinkSegment,
        from: NodeId,
        bytes: u32,
        now: SimTime,
    ) -> SimTime {
        let busy = self.busy_until.entry((seg.id, from)).or_insert(SimTime::ZERO);
        let start = now.max(*busy);
        let tx_time = seg.medium.tx_time(bytes);
        let depart = start.saturating_add(tx_time);
        *busy = depart;
        let arrive = depart.saturating_add(seg.medium.delay());
        trace!(
            segment = %seg.name,
            from = %from,
            now = ?now,
            start = ?start,
            tx_time = ?tx_time,
            arrive = ?arrive,
            "计算传输时间"
        );
        arrive
    }
}

/// 两个节点直接相邻的第一个链路段
pub fn segment_between(segments: &[LinkSegment], a: NodeId, b: NodeId) -> Option<&LinkSegment> {
    segments.iter().find(|s| s.adjacent(a, b))
}

//! 最短跳数路由
//!
//! 路由协议本身由外部协作方实现；这里只需要一个确定性的参考转发路径：
//! 在“可路由节点”构成的图上，为每个 (from, dst) 预计算最短跳数下一跳。

use std::collections::{HashMap, VecDeque};

use super::id::NodeId;

#[derive(Debug, Default, Clone)]
pub struct RoutingTable {
    dirty: bool,
    /// (from, dst) -> 等价最短路径下一跳（升序）
    next_hops: HashMap<(NodeId, NodeId), Vec<NodeId>>,
}

impl RoutingTable {
    pub fn new() -> Self {
        Self {
            dirty: true,
            next_hops: HashMap::new(),
        }
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// 确保路由表基于当前拓扑是最新的。
    ///
    /// `adj[from]` 为从 `from` 出发的所有出边邻居；
    /// `rev_adj[to]` 为所有能到达 `to` 的前驱节点集合。
    pub fn ensure_built(&mut self, adj: &[Vec<NodeId>], rev_adj: &[Vec<NodeId>]) {
        if !self.dirty {
            return;
        }

        let n = adj.len();
        self.next_hops.clear();

        // 对每个 dst 在反向图上做 BFS，得到到 dst 的最短跳数 dist[*]；
        // 满足 dist[next] = dist[from] - 1 的邻居即为下一跳候选。
        let mut dist: Vec<i32> = vec![i32::MAX; n];
        let mut q: VecDeque<NodeId> = VecDeque::new();

        for dst_idx in 0..n {
            dist.fill(i32::MAX);
            q.clear();

            dist[dst_idx] = 0;
            q.push_back(NodeId(dst_idx));

            while let Some(v) = q.pop_front() {
                let dv = dist[v.0];
                for &pred in &rev_adj[v.0] {
                    if dist[pred.0] == i32::MAX {
                        dist[pred.0] = dv.saturating_add(1);
                        q.push_back(pred);
                    }
                }
            }

            for from_idx in 0..n {
                if from_idx == dst_idx {
                    continue;
                }
                let df = dist[from_idx];
                if df == i32::MAX {
                    continue; // unreachable
                }
                let mut cands: Vec<NodeId> = adj[from_idx]
                    .iter()
                    .copied()
                    .filter(|nh| dist[nh.0] == df - 1)
                    .collect();
                if !cands.is_empty() {
                    cands.sort();
                    self.next_hops.insert((NodeId(from_idx), NodeId(dst_idx)), cands);
                }
            }
        }

        self.dirty = false;
    }

    /// 获取 (from, dst) 的下一跳候选集合。
    pub fn next_hops(&self, from: NodeId, dst: NodeId) -> Option<&[NodeId]> {
        self.next_hops.get(&(from, dst)).map(|v| v.as_slice())
    }

    /// 沿最小编号的下一跳走出完整路径（含两端）；不可达返回 None。
    pub fn path(&self, src: NodeId, dst: NodeId) -> Option<Vec<NodeId>> {
        let mut path = vec![src];
        let mut at = src;
        while at != dst {
            let nh = *self.next_hops(at, dst)?.first()?;
            path.push(nh);
            at = nh;
            if path.len() > self.next_hops.len() + 2 {
                return None;
            }
        }
        Some(path)
    }
}
